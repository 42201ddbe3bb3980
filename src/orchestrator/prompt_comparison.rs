//! Prompt 对比 - 编排层
//!
//! 对同一道题分别用 V1 和 V2 生成解析，打乱顺序后交给评审者选择，
//! 全部题目结束后统计票数并保存偏好。

use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::question::QuestionRecord;
use crate::services::explanation::{collapse_line_breaks, ExplanationService};
use crate::services::prompt::{build_prompt, PromptVariant};
use crate::services::PreferenceStore;
use crate::workflow::{Pacer, QuestionCtx, RetryPolicy};

/// 评审者的选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    First,
    Second,
    /// 不投票
    Skip,
}

/// 打乱顺序后的一对解析
#[derive(Debug, Clone)]
pub struct BlindedPair {
    pub first: (PromptVariant, String),
    pub second: (PromptVariant, String),
}

impl BlindedPair {
    /// 随机决定 V1 和 V2 的展示顺序
    pub fn shuffled<R: Rng>(v1: String, v2: String, rng: &mut R) -> Self {
        let v1 = (PromptVariant::V1, v1);
        let v2 = (PromptVariant::V2, v2);
        if rng.gen_bool(0.5) {
            Self { first: v1, second: v2 }
        } else {
            Self { first: v2, second: v1 }
        }
    }

    /// 把投票还原为对应的 prompt 版本
    pub fn variant_for(&self, vote: Vote) -> Option<PromptVariant> {
        match vote {
            Vote::First => Some(self.first.0),
            Vote::Second => Some(self.second.0),
            Vote::Skip => None,
        }
    }
}

/// 投票来源（命令行交互或测试桩）
#[async_trait]
pub trait VoteSource: Send {
    /// 展示一对解析并返回选择，评审者看不到版本号
    async fn vote(
        &mut self,
        ctx: &QuestionCtx,
        record: &QuestionRecord,
        first: &str,
        second: &str,
    ) -> Result<Vote>;
}

/// 票数统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromptComparison {
    pub v1_votes: usize,
    pub v2_votes: usize,
    /// 无法生成或被跳过的题目数
    pub skipped: usize,
}

impl PromptComparison {
    pub fn record_vote(&mut self, variant: PromptVariant) {
        match variant {
            PromptVariant::V1 => self.v1_votes += 1,
            PromptVariant::V2 => self.v2_votes += 1,
        }
    }

    /// 是否至少有一张有效票
    pub fn has_votes(&self) -> bool {
        self.v1_votes + self.v2_votes > 0
    }

    /// 平票时选 V1
    pub fn preferred(&self) -> PromptVariant {
        if self.v1_votes >= self.v2_votes {
            PromptVariant::V1
        } else {
            PromptVariant::V2
        }
    }
}

/// 对一批记录进行盲评对比，结束后把胜出版本写入偏好文件
pub async fn compare_prompts<R: Rng>(
    config: &Config,
    service: &dyn ExplanationService,
    records: &[QuestionRecord],
    votes: &mut dyn VoteSource,
    rng: &mut R,
    store: &PreferenceStore,
    stop: &AtomicBool,
) -> Result<PromptComparison> {
    let retry = RetryPolicy::from_config(config);
    let mut pacer = Pacer::new(Duration::from_millis(config.request_delay_ms));
    let mut tally = PromptComparison::default();
    let total = records.len();

    for (index, record) in records.iter().enumerate() {
        if stop.load(Ordering::SeqCst) {
            warn!("⏹️ 收到停止信号，对比在第 {}/{} 题前结束", index + 1, total);
            break;
        }

        let ctx = QuestionCtx::new(1, "compare", index + 1, total);

        let (Some(p1), Some(p2)) = (
            build_prompt(record, PromptVariant::V1),
            build_prompt(record, PromptVariant::V2),
        ) else {
            warn!("{} ⚠️ 无法生成 prompt（答案: '{}'），跳过", ctx, record.correct);
            tally.skipped += 1;
            continue;
        };

        pacer.wait().await;
        let e1 = retry.call(service, &p1).await;
        pacer.wait().await;
        let e2 = retry.call(service, &p2).await;

        let (e1, e2) = match (e1, e2) {
            (Ok(e1), Ok(e2)) => (collapse_line_breaks(&e1), collapse_line_breaks(&e2)),
            (Err(e), _) | (_, Err(e)) => {
                warn!("{} ❌ LLM 调用失败: {}，跳过", ctx, e);
                tally.skipped += 1;
                continue;
            }
        };

        let pair = BlindedPair::shuffled(e1, e2, rng);
        let vote = votes.vote(&ctx, record, &pair.first.1, &pair.second.1).await?;
        match pair.variant_for(vote) {
            Some(variant) => tally.record_vote(variant),
            None => tally.skipped += 1,
        }
    }

    if !tally.has_votes() {
        warn!(
            "🗳️ 对比结束: 没有有效投票（跳过 {}），偏好文件 {} 保持不变",
            tally.skipped,
            store.path().display()
        );
        return Ok(tally);
    }

    let preferred = tally.preferred();
    info!(
        "🗳️ 对比结束: V1 {} 票 | V2 {} 票 | 跳过 {} → 选用 {}",
        tally.v1_votes, tally.v2_votes, tally.skipped, preferred
    );
    store.save(preferred).await?;
    info!("💾 偏好已保存到 {}", store.path().display());

    Ok(tally)
}
