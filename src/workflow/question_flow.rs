//! 题目处理流程 - 流程层
//!
//! 核心职责：定义"一道题"的完整处理流程
//!
//! 流程顺序：
//! 1. 构建 prompt（不合法时写入占位解析，不调用 LLM）
//! 2. 等待请求间隔 → 调用 LLM（失败时按策略重试）
//! 3. 折叠换行后写回解析；彻底失败时写入带错误信息的解析

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::question::QuestionRecord;
use crate::services::explanation::{
    collapse_line_breaks, error_explanation, ExplanationService, INVALID_PROMPT_EXPLANATION,
};
use crate::services::prompt::{build_prompt, PromptVariant};
use crate::utils::logging::truncate_text;
use crate::workflow::question_ctx::QuestionCtx;
use crate::workflow::scheduling::{Pacer, RetryPolicy};

/// 题目处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// 成功生成解析
    Generated,
    /// 无法构建 prompt，未调用 LLM
    Invalid,
    /// LLM 调用彻底失败
    Failed,
}

/// 题目处理流程
///
/// - 编排单道题的处理流程
/// - 任何情况下都不返回错误，失败信息写入解析字段
/// - 只依赖业务能力（services）
pub struct QuestionFlow {
    service: Arc<dyn ExplanationService>,
    variant: PromptVariant,
    retry: RetryPolicy,
    pacer: Pacer,
    verbose_logging: bool,
}

impl QuestionFlow {
    /// 创建新的题目处理流程
    pub fn new(config: &Config, service: Arc<dyn ExplanationService>, variant: PromptVariant) -> Self {
        Self {
            service,
            variant,
            retry: RetryPolicy::from_config(config),
            pacer: Pacer::new(Duration::from_millis(config.request_delay_ms)),
            verbose_logging: config.verbose_logging,
        }
    }

    pub fn variant(&self) -> PromptVariant {
        self.variant
    }

    pub async fn run(&mut self, record: &mut QuestionRecord, ctx: &QuestionCtx) -> ProcessResult {
        if self.verbose_logging {
            info!("{} 题干: {}", ctx, truncate_text(&record.question, 80));
        }

        let Some(prompt) = build_prompt(record, self.variant) else {
            warn!(
                "{} ⚠️ 无法生成 prompt（答案: '{}'），跳过 LLM 调用",
                ctx, record.correct
            );
            record.explanation = INVALID_PROMPT_EXPLANATION.to_string();
            return ProcessResult::Invalid;
        };

        debug!("{} prompt ({}): {}", ctx, self.variant, prompt);

        self.pacer.wait().await;

        match self.retry.call(self.service.as_ref(), &prompt).await {
            Ok(text) => {
                record.explanation = collapse_line_breaks(&text);
                info!("{} ✓ 解析已生成", ctx);
                ProcessResult::Generated
            }
            Err(e) => {
                warn!("{} ❌ LLM 调用失败: {}", ctx, e);
                record.explanation = error_explanation(&e);
                ProcessResult::Failed
            }
        }
    }
}
