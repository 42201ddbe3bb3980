//! 备用策略：逐行扫描
//!
//! 主策略结果太少时使用。先找到题号行，再在其后各行中依次寻找 A-D 选项。

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::preprocess::clean_fragment;
use super::validation::is_valid_question;
use super::BlockStrategy;
use crate::models::question::{ExtractedQuestion, Letter};

/// 一段文本少于这么多非空行时直接跳过
const MIN_BLOCK_LINES: usize = 5;

static NUMBER_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+\.\d+)\s+(.*)").unwrap());

/// 每个字母三条规则，按顺序尝试
static OPTION_RULES: Lazy<Vec<(Letter, [Regex; 3])>> = Lazy::new(|| {
    Letter::ALL
        .iter()
        .map(|&letter| {
            let rules = [
                Regex::new(&format!(r"^{}[.\s]+(.*)", letter)).unwrap(),
                Regex::new(&format!(r"^{}\s+(.*)", letter)).unwrap(),
                Regex::new(&format!(r"^{}\.\s+(.*)", letter)).unwrap(),
            ];
            (letter, rules)
        })
        .collect()
});

/// 用某个字母的规则匹配一行，返回第一条命中规则捕获的文本
fn match_option(rules: &[Regex; 3], line: &str) -> Option<String> {
    rules
        .iter()
        .find_map(|rule| rule.captures(line))
        .map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()).unwrap_or_default())
}

pub struct FallbackStrategy;

impl FallbackStrategy {
    fn parse_segment(segment: &str) -> Option<ExtractedQuestion> {
        let lines: Vec<&str> = segment
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        if lines.len() < MIN_BLOCK_LINES {
            return None;
        }

        let (position, number, stem_text) = lines.iter().enumerate().find_map(|(i, line)| {
            NUMBER_LINE
                .captures(line)
                .map(|caps| (i, caps[1].to_string(), clean_fragment(&caps[2])))
        })?;

        // 每个字母保留第一次非空的匹配
        let mut options: [String; 4] = Default::default();
        for line in &lines[position + 1..] {
            for (slot, (_, rules)) in options.iter_mut().zip(OPTION_RULES.iter()) {
                if !slot.is_empty() {
                    continue;
                }
                if let Some(text) = match_option(rules, line) {
                    *slot = text;
                    break;
                }
            }
        }

        if options.iter().any(|o| o.is_empty()) {
            return None;
        }

        if !is_valid_question(&stem_text, &options) {
            debug!("备用策略丢弃题目 {}: {}", number, stem_text);
            return None;
        }

        Some(ExtractedQuestion {
            stem: format!("{} {}", number, stem_text),
            options,
        })
    }
}

impl BlockStrategy for FallbackStrategy {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn parse(&self, segment: &str) -> Option<ExtractedQuestion> {
        Self::parse_segment(segment)
    }
}
