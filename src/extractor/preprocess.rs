//! 文本预处理与分段

use once_cell::sync::Lazy;
use regex::Regex;

static HORIZONTAL_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static LINE_LEADING_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]+").unwrap());
static SEGMENT_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\d+\.\d+").unwrap());
static FRAGMENT_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[>\s]*").unwrap());
static ANY_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// 统一引号，压缩水平空白，保留换行
pub fn clean_text(text: &str) -> String {
    let text = text.replace(['“', '”'], "\"").replace(['‘', '’'], "'");
    let text = HORIZONTAL_SPACE.replace_all(&text, " ");
    LINE_LEADING_SPACE.replace_all(&text, "\n").into_owned()
}

/// 在每个"换行 + 题号"之前切分，分隔用的换行不保留
pub fn split_segments(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;

    for m in SEGMENT_START.find_iter(text) {
        segments.push(&text[start..m.start()]);
        // 跳过换行符本身
        start = m.start() + 1;
    }
    segments.push(&text[start..]);

    segments
}

/// 清理题干或选项：去掉开头的 `>` 和空白，内部空白压缩为单个空格
pub fn clean_fragment(text: &str) -> String {
    let text = FRAGMENT_PREFIX.replace(text.trim(), "");
    ANY_SPACE.replace_all(&text, " ").trim().to_string()
}
