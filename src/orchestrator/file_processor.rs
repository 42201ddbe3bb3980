//! 单个文件处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责处理单个输入文件的所有记录，是文件级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **遍历记录**：按顺序循环处理 `Vec<QuestionRecord>`
//! 2. **流程调度**：复用调用方传入的 `QuestionFlow`
//! 3. **中断检查**：每条记录开始前检查停止标志
//! 4. **写出结果**：已处理的记录写成分隔文件和 JSON
//! 5. **统计输出**：记录生成/无效/失败数量

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

use crate::config::Config;
use crate::models::InputFile;
use crate::services::output_writer::{write_outputs, OutputPaths};
use crate::utils::logging::{log_file_complete, log_file_start};
use crate::workflow::{ProcessResult, QuestionCtx, QuestionFlow};

/// 单个文件的处理结果
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub stem: String,
    pub outputs: OutputPaths,
    /// 写出的记录数
    pub records: usize,
    pub generated: usize,
    pub invalid: usize,
    pub failed: usize,
    /// 是否因停止标志提前结束
    pub interrupted: bool,
}

/// 处理单个文件
///
/// # 参数
/// - `input`: 已加载的输入文件
/// - `file_index`: 文件索引（从 1 开始，用于日志）
/// - `total_files`: 本次处理的文件总数
/// - `flow`: 题目处理流程（跨文件复用，保证请求间隔）
/// - `config`: 配置
/// - `stop`: 停止标志
///
/// # 返回
/// 只有写出结果失败时返回错误
pub async fn process_file(
    input: InputFile,
    file_index: usize,
    total_files: usize,
    flow: &mut QuestionFlow,
    config: &Config,
    stop: &AtomicBool,
) -> Result<FileOutcome> {
    let InputFile {
        stem, mut records, ..
    } = input;
    let total = records.len();

    log_file_start(file_index, total_files, &stem, total);

    let mut generated = 0;
    let mut invalid = 0;
    let mut failed = 0;
    let mut processed = 0;

    for (index, record) in records.iter_mut().enumerate() {
        if stop.load(Ordering::SeqCst) {
            warn!(
                "⏹️ 收到停止信号，{} 在第 {}/{} 题前停止",
                stem,
                index + 1,
                total
            );
            break;
        }

        let ctx = QuestionCtx::new(file_index, stem.as_str(), index + 1, total);
        match flow.run(record, &ctx).await {
            ProcessResult::Generated => generated += 1,
            ProcessResult::Invalid => invalid += 1,
            ProcessResult::Failed => failed += 1,
        }
        processed += 1;
    }

    let interrupted = processed < total;
    // 中断时只写出已完成的记录
    records.truncate(processed);

    let outputs = write_outputs(&records, &config.output_dir, &stem, config.delimiter).await?;

    let outcome = FileOutcome {
        stem,
        outputs,
        records: processed,
        generated,
        invalid,
        failed,
        interrupted,
    };
    log_file_complete(&outcome);

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::models::question::QuestionRecord;
    use crate::services::{ExplanationService, PromptVariant};
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Arc;

    struct Fixed;

    #[async_trait]
    impl ExplanationService for Fixed {
        async fn explain(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok("Parce que.".to_string())
        }
    }

    fn input(correct: &[&str]) -> InputFile {
        InputFile {
            path: PathBuf::from("bia.csv"),
            stem: "bia".to_string(),
            records: correct
                .iter()
                .map(|c| QuestionRecord {
                    question: "Une question ?".to_string(),
                    a: "un".to_string(),
                    b: "deux".to_string(),
                    c: "trois".to_string(),
                    d: "quatre".to_string(),
                    correct: c.to_string(),
                    ..Default::default()
                })
                .collect(),
        }
    }

    fn config(out: &std::path::Path) -> Config {
        Config {
            request_delay_ms: 0,
            max_retries: 0,
            output_dir: out.to_path_buf(),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_counts_and_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let mut flow = QuestionFlow::new(&config, Arc::new(Fixed), PromptVariant::V1);

        let outcome = process_file(input(&["A", "Z", "C"]), 1, 1, &mut flow, &config, &AtomicBool::new(false))
            .await
            .unwrap();

        assert_eq!(outcome.generated, 2);
        assert_eq!(outcome.invalid, 1);
        assert_eq!(outcome.failed, 0);
        assert!(!outcome.interrupted);

        let csv = std::fs::read_to_string(&outcome.outputs.delimited).unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.lines().nth(1).unwrap().ends_with("$[ERREUR - Prompt non généré]"));
    }

    #[tokio::test]
    async fn test_stop_flag_writes_nothing_processed() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let mut flow = QuestionFlow::new(&config, Arc::new(Fixed), PromptVariant::V1);

        let outcome = process_file(input(&["A", "B"]), 1, 1, &mut flow, &config, &AtomicBool::new(true))
            .await
            .unwrap();

        assert!(outcome.interrupted);
        assert_eq!(outcome.records, 0);
        assert_eq!(std::fs::read_to_string(&outcome.outputs.json).unwrap(), "[]");
    }
}
