//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量文件处理器
//! - 确定 prompt 版本（配置或偏好文件）
//! - 按顺序加载并处理输入文件，读取失败的文件不影响其他文件
//! - 按配置打包输出
//! - 汇总 `BatchReport`
//!
//! ### `file_processor` - 单个文件处理器
//! - 遍历单个文件的所有记录（Vec<QuestionRecord>）
//! - 复用 QuestionFlow
//! - 检查停止标志
//! - 写出分隔文件和 JSON
//!
//! ### `prompt_comparison` - Prompt 对比
//! - 同一道题生成 V1/V2 两份解析，盲评投票
//! - 保存胜出版本
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<PathBuf>)
//!     ↓
//! file_processor (处理 Vec<QuestionRecord>)
//!     ↓
//! workflow::QuestionFlow (处理单条记录)
//!     ↓
//! services (能力层：prompt / llm / output / preference)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管批量，file_processor 管单个文件
//! 2. **顺序执行**：同一时间只有一次 LLM 调用
//! 3. **向下依赖**：编排层 → workflow → services
//! 4. **无业务逻辑**：只做调度和统计，不做具体业务判断

pub mod batch_processor;
pub mod file_processor;
pub mod prompt_comparison;

// 重新导出主要类型
pub use batch_processor::{App, BatchReport};
pub use file_processor::{process_file, FileOutcome};
pub use prompt_comparison::{compare_prompts, PromptComparison, Vote, VoteSource};
