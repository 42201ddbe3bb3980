//! 主策略：整段正则匹配
//!
//! 每段文本形如 `<大题号>.<小题号> 题干`，后跟四行以 A-D 开头的选项，
//! 最后一个选项一直延续到段尾。

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

use super::preprocess::clean_fragment;
use super::validation::is_valid_question;
use super::BlockStrategy;
use crate::models::question::{ExtractedQuestion, Letter};

static QUESTION_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)(\d+\.\d+)\s+(.*?)\s*\n\s*([A-D])[.\s]+(.*?)\s*\n\s*([A-D])[.\s]+(.*?)\s*\n\s*([A-D])[.\s]+(.*?)\s*\n\s*([A-D])[.\s]+(.*)\z",
    )
    .unwrap()
});

pub struct PrimaryStrategy;

impl PrimaryStrategy {
    fn parse_segment(segment: &str) -> Option<ExtractedQuestion> {
        let caps = QUESTION_BLOCK.captures(segment)?;
        let number = &caps[1];
        let stem_text = clean_fragment(&caps[2]);

        // 以识别出的字母为键，重复字母时后者覆盖前者
        let mut by_letter: HashMap<&str, String> = HashMap::new();
        for pair in 0..4 {
            let letter = caps.get(3 + pair * 2)?.as_str();
            let text = caps.get(4 + pair * 2).map(|m| m.as_str()).unwrap_or("");
            by_letter.insert(letter, clean_fragment(text));
        }

        let mut options: [String; 4] = Default::default();
        for (slot, letter) in options.iter_mut().zip(Letter::ALL) {
            *slot = by_letter.remove(letter.to_string().as_str())?;
        }

        if !is_valid_question(&stem_text, &options) {
            debug!("主策略丢弃题目 {}: {}", number, stem_text);
            return None;
        }

        Some(ExtractedQuestion {
            stem: format!("{} {}", number, stem_text),
            options,
        })
    }
}

impl BlockStrategy for PrimaryStrategy {
    fn name(&self) -> &'static str {
        "primary"
    }

    fn parse(&self, segment: &str) -> Option<ExtractedQuestion> {
        Self::parse_segment(segment)
    }
}
