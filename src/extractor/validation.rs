//! 候选题目的合法性检查与去重

use phf::phf_set;
use std::collections::HashSet;

use crate::models::question::ExtractedQuestion;

/// 出现在题干中即说明是试卷页眉/页脚的关键词（子串匹配）
static BOILERPLATE_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "page",
    "sur",
    "coefficient",
    "durée",
    "épreuve",
    "attention",
    "recommandations",
};

/// 去重时比较的题干前缀长度（字符数）
const DEDUP_PREFIX_CHARS: usize = 50;

/// 检查题干（不含题号）和四个选项是否像一道真实的题目
pub fn is_valid_question(stem_text: &str, options: &[String; 4]) -> bool {
    if stem_text.chars().count() < 10 {
        return false;
    }
    if options.iter().any(|o| o.is_empty()) {
        return false;
    }
    if options[0].chars().count() < 2 || options[1].chars().count() < 2 {
        return false;
    }

    let lowered = stem_text.to_lowercase();
    !BOILERPLATE_KEYWORDS.iter().any(|kw| lowered.contains(*kw))
}

fn dedup_key(stem: &str) -> String {
    stem.chars()
        .take(DEDUP_PREFIX_CHARS)
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

/// 按题干前 50 个字符（小写、去空白）去重，保留第一次出现的题目
pub fn remove_duplicates(questions: Vec<ExtractedQuestion>) -> Vec<ExtractedQuestion> {
    let mut seen = HashSet::new();
    questions
        .into_iter()
        .filter(|q| seen.insert(dedup_key(&q.stem)))
        .collect()
}
