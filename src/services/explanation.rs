//! 解析生成能力的抽象
//!
//! 流程层只依赖 [`ExplanationService`]，真实实现见 [`crate::services::LlmService`]。

use async_trait::async_trait;

use crate::error::LlmError;

/// 无法构建 prompt 时写入的解析
pub const INVALID_PROMPT_EXPLANATION: &str = "[ERREUR - Prompt non généré]";

/// 给一段 prompt，返回一段解析文本
#[async_trait]
pub trait ExplanationService: Send + Sync {
    /// 单次调用，不重试
    async fn explain(&self, prompt: &str) -> Result<String, LlmError>;
}

/// 把换行折叠为单个空格并去掉首尾空白
pub fn collapse_line_breaks(text: &str) -> String {
    text.trim()
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .trim()
        .to_string()
}

/// 调用失败时写入的解析，保留底层错误信息
pub fn error_explanation(error: &LlmError) -> String {
    format!("[ERREUR - {}]", error)
}
