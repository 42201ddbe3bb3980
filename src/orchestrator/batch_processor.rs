//! 批量文件处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责多个输入文件的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **确定 prompt 版本**：命令行/配置优先，否则读取偏好文件
//! 2. **逐个加载**：按顺序读取输入文件，读取失败的文件记录下来后继续
//! 3. **顺序处理**：一次只处理一个文件，委托 file_processor
//! 4. **打包输出**：按配置把各文件的 JSON 打包
//! 5. **全局统计**：汇总为 `BatchReport` 返回给调用方

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::load_records;
use crate::orchestrator::file_processor::{process_file, FileOutcome};
use crate::services::output_writer::write_bundle;
use crate::services::{BundleMode, ExplanationService, PreferenceStore, PromptVariant};
use crate::utils::logging::{log_startup, print_final_stats};
use crate::workflow::QuestionFlow;

/// 打包目录名（位于输出目录下）
pub const BUNDLE_DIR_NAME: &str = "quiz_structures";

/// 返回本次运行中未被占用的输出名，重名时追加 `_2`、`_3`……
pub fn unique_stem(used: &mut HashSet<String>, stem: &str) -> String {
    let mut candidate = stem.to_string();
    let mut n = 2;
    while !used.insert(candidate.clone()) {
        candidate = format!("{}_{}", stem, n);
        n += 1;
    }
    candidate
}

/// 一次批量处理的结果
#[derive(Debug, Default)]
pub struct BatchReport {
    /// 本次使用的 prompt 版本
    pub variant: PromptVariant,
    /// 成功处理的文件，顺序与输入一致
    pub files: Vec<FileOutcome>,
    /// 无法读取的文件及原因
    pub unreadable: Vec<(PathBuf, String)>,
    /// 打包目录
    pub bundle: Option<PathBuf>,
    /// 是否因停止标志提前结束
    pub interrupted: bool,
}

impl BatchReport {
    pub fn total_generated(&self) -> usize {
        self.files.iter().map(|f| f.generated).sum()
    }

    pub fn total_invalid(&self) -> usize {
        self.files.iter().map(|f| f.invalid).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.files.iter().map(|f| f.failed).sum()
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    service: Arc<dyn ExplanationService>,
    stop: Arc<AtomicBool>,
}

impl App {
    pub fn new(config: Config, service: Arc<dyn ExplanationService>) -> Self {
        Self {
            config,
            service,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 停止标志，置位后在下一条记录开始前停止
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// 确定本次使用的 prompt 版本
    pub async fn resolve_variant(&self) -> PromptVariant {
        match self.config.prompt_variant {
            Some(variant) => variant,
            None => PreferenceStore::new(&self.config.preference_file).load().await,
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&self, files: &[PathBuf]) -> Result<BatchReport> {
        let variant = self.resolve_variant().await;
        log_startup(&self.config, variant, files.len());

        // 先读取模板，避免 LLM 调用完成后才发现模板缺失
        let template = self.load_template().await?;

        let mut report = BatchReport {
            variant,
            ..Default::default()
        };
        let mut flow = QuestionFlow::new(&self.config, self.service.clone(), variant);
        let mut used_stems = HashSet::new();

        for (index, path) in files.iter().enumerate() {
            if self.stop.load(Ordering::SeqCst) {
                warn!("⏹️ 收到停止信号，跳过剩余 {} 个文件", files.len() - index);
                report.interrupted = true;
                break;
            }

            let mut input = match load_records(path, self.config.delimiter).await {
                Ok(input) => input,
                Err(e) => {
                    error!("❌ 无法处理文件 {}: {:#}", path.display(), e);
                    report.unreadable.push((path.clone(), format!("{:#}", e)));
                    continue;
                }
            };

            let stem = unique_stem(&mut used_stems, &input.stem);
            if stem != input.stem {
                warn!(
                    "⚠️ 输出名 {} 已被占用，{} 的结果改写为 {}",
                    input.stem,
                    path.display(),
                    stem
                );
                input.stem = stem;
            }

            let outcome = process_file(
                input,
                index + 1,
                files.len(),
                &mut flow,
                &self.config,
                &self.stop,
            )
            .await?;

            report.interrupted |= outcome.interrupted;
            report.files.push(outcome);
        }

        let outputs: Vec<_> = report.files.iter().map(|f| f.outputs.clone()).collect();
        report.bundle = write_bundle(
            &outputs,
            self.config.bundle_mode,
            template.as_deref(),
            &self.config.output_dir.join(BUNDLE_DIR_NAME),
        )
        .await?;

        print_final_stats(&report);
        Ok(report)
    }

    async fn load_template(&self) -> Result<Option<String>> {
        if self.config.bundle_mode != BundleMode::JsonWithViewer {
            return Ok(None);
        }
        let path: &Path = self
            .config
            .html_template
            .as_deref()
            .context("viewer 打包方式需要通过 --template 或 html_template 指定 HTML 模板")?;

        let template = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("无法读取 HTML 模板: {}", path.display()))?;
        info!("📄 已加载 HTML 模板: {}", path.display());
        Ok(Some(template))
    }
}
