//! 试卷文本题目提取
//!
//! ## 流程
//!
//! ```text
//! 原始文本 → clean_text → split_segments
//!     ↓
//! PrimaryStrategy（整段正则）
//!     ↓ 结果少于 FALLBACK_THRESHOLD 时
//! FallbackStrategy（逐行扫描，只处理主策略未接受的文本段）
//!     ↓
//! remove_duplicates（题干前 50 字符）
//! ```
//!
//! 提取结果只用于后续人工标注答案，尽量多召回，不保证准确。

pub mod fallback;
pub mod preprocess;
pub mod primary;
pub mod validation;

use tracing::info;

use crate::models::question::ExtractedQuestion;

pub use fallback::FallbackStrategy;
pub use primary::PrimaryStrategy;

/// 主策略结果少于该数量时追加备用策略的结果
pub const FALLBACK_THRESHOLD: usize = 10;

/// 写出提取结果时使用的表头，归一化时会被识别并丢弃
pub const EXTRACT_HEADER: [&str; 6] = [
    "Question",
    "Option A",
    "Option B",
    "Option C",
    "Option D",
    "Réponse correcte",
];

/// 一种从文本段中提取题目的策略
pub trait BlockStrategy {
    fn name(&self) -> &'static str;

    /// 解析单个文本段，未通过合法性检查时返回 None
    fn parse(&self, segment: &str) -> Option<ExtractedQuestion>;

    /// 返回通过合法性检查的题目，顺序与文本段顺序一致
    fn extract(&self, segments: &[&str]) -> Vec<ExtractedQuestion> {
        segments
            .iter()
            .filter_map(|segment| self.parse(segment))
            .collect()
    }
}

/// 从整份试卷文本中提取题目
pub fn extract_questions(text: &str) -> Vec<ExtractedQuestion> {
    let cleaned = preprocess::clean_text(text);
    let segments = preprocess::split_segments(&cleaned);

    let mut questions = Vec::new();
    let mut missed = Vec::new();
    for segment in segments {
        match PrimaryStrategy.parse(segment) {
            Some(question) => questions.push(question),
            None => missed.push(segment),
        }
    }
    info!("{} 策略提取到 {} 道题", PrimaryStrategy.name(), questions.len());

    // 备用策略只处理主策略没有接受的文本段
    if questions.len() < FALLBACK_THRESHOLD {
        let extra = FallbackStrategy.extract(&missed);
        info!(
            "结果少于 {} 道，{} 策略提取到 {} 道题",
            FALLBACK_THRESHOLD,
            FallbackStrategy.name(),
            extra.len()
        );
        questions.extend(extra);
    }

    let total = questions.len();
    let unique = validation::remove_duplicates(questions);
    if unique.len() < total {
        info!("去重移除 {} 道重复题目", total - unique.len());
    }

    unique
}

/// 把提取结果渲染为带表头的分隔文本
pub fn render_extracted(questions: &[ExtractedQuestion], delimiter: char) -> String {
    let mut out = EXTRACT_HEADER.join(&delimiter.to_string());
    out.push('\n');
    for question in questions {
        out.push_str(&question.to_row(delimiter));
        out.push('\n');
    }
    out
}
