//! 题目处理上下文
//!
//! 封装"我正在处理哪个文件的第几题"这一信息

use std::fmt::Display;

/// 题目处理上下文
#[derive(Debug, Clone)]
pub struct QuestionCtx {
    /// 文件索引（仅用于日志显示，从1开始）
    pub file_index: usize,

    /// 文件名（不含扩展名）
    pub file_stem: String,

    /// 题目在文件中的索引（从1开始）
    pub question_index: usize,

    /// 文件中的题目总数
    pub total: usize,
}

impl QuestionCtx {
    /// 创建新的题目上下文
    pub fn new(file_index: usize, file_stem: impl Into<String>, question_index: usize, total: usize) -> Self {
        Self {
            file_index,
            file_stem: file_stem.into(),
            question_index,
            total,
        }
    }
}

impl Display for QuestionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[文件 #{} {} 题目 {}/{}]",
            self.file_index, self.file_stem, self.question_index, self.total
        )
    }
}
