//! # QCM Explain
//!
//! 为 QCM（选择题）题库批量生成答案解析，并从试卷文本中提取题目
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 数据层（Models / Extractor）
//! - `models/` - `QuestionRecord`、归一化规则、分隔文件加载
//! - `extractor/` - 从试卷文本中提取题目（主策略 + 备用策略 + 去重）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单条记录
//! - `prompt` - 构建 V1/V2 prompt 及合法性检查
//! - `LlmService` - 调用 LLM 生成解析
//! - `output_writer` - 写出分隔文件、JSON 和打包目录
//! - `PreferenceStore` - 读写所选 prompt 版本
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一道题"的完整处理流程
//! - `QuestionCtx` - 上下文封装（文件 + 题目序号）
//! - `QuestionFlow` - 流程编排（prompt → 间隔 → LLM/重试 → 写回解析）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量文件处理器
//! - `orchestrator/file_processor` - 单个文件处理器
//! - `orchestrator/prompt_comparison` - V1/V2 盲评对比
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod extractor;
pub mod logger;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use extractor::{extract_questions, render_extracted};
pub use models::{load_records, ExtractedQuestion, InputFile, Letter, QuestionRecord};
pub use orchestrator::{compare_prompts, App, BatchReport, FileOutcome, PromptComparison};
pub use services::{BundleMode, ExplanationService, LlmService, PreferenceStore, PromptVariant};
pub use workflow::{ProcessResult, QuestionCtx, QuestionFlow};
