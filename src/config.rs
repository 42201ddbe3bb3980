//! 程序配置
//!
//! 配置的优先级（由低到高）：默认值 → 环境变量 → TOML 配置文件 → 命令行参数

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::services::output_writer::BundleMode;
use crate::services::prompt::PromptVariant;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 单次回答的最大 token 数
    pub llm_max_tokens: u32,
    /// 采样温度（保持较低，回答更稳定）
    pub llm_temperature: f32,
    // --- 调度配置 ---
    /// 两次 LLM 请求之间的间隔（毫秒）
    pub request_delay_ms: u64,
    /// 调用失败后的额外重试次数
    pub max_retries: u32,
    /// 第一次重试前的等待时间（毫秒），之后每次翻倍
    pub retry_backoff_ms: u64,
    // --- 文件配置 ---
    /// 输入/输出分隔符
    pub delimiter: char,
    /// 输出目录
    pub output_dir: PathBuf,
    /// 记录所选 prompt 版本的文件
    pub preference_file: PathBuf,
    /// 固定使用的 prompt 版本，为空时读取 preference_file
    pub prompt_variant: Option<PromptVariant>,
    /// 打包方式
    pub bundle_mode: BundleMode,
    /// HTML 查看器模板
    pub html_template: Option<PathBuf>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            llm_max_tokens: 256,
            llm_temperature: 0.3,
            request_delay_ms: 500,
            max_retries: 2,
            retry_backoff_ms: 1000,
            delimiter: '$',
            output_dir: PathBuf::from("out"),
            preference_file: PathBuf::from("selected_prompt.txt"),
            prompt_variant: None,
            bundle_mode: BundleMode::None,
            html_template: None,
            verbose_logging: false,
        }
    }
}

/// TOML 配置文件中可出现的字段，全部可选
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub llm_api_key: Option<String>,
    pub llm_api_base_url: Option<String>,
    pub llm_model_name: Option<String>,
    pub llm_max_tokens: Option<u32>,
    pub llm_temperature: Option<f32>,
    pub request_delay_ms: Option<u64>,
    pub max_retries: Option<u32>,
    pub retry_backoff_ms: Option<u64>,
    pub delimiter: Option<char>,
    pub output_dir: Option<PathBuf>,
    pub preference_file: Option<PathBuf>,
    pub prompt_variant: Option<PromptVariant>,
    pub bundle_mode: Option<BundleMode>,
    pub html_template: Option<PathBuf>,
    pub verbose_logging: Option<bool>,
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_max_tokens: env_parse("LLM_MAX_TOKENS").unwrap_or(default.llm_max_tokens),
            llm_temperature: env_parse("LLM_TEMPERATURE").unwrap_or(default.llm_temperature),
            request_delay_ms: env_parse("REQUEST_DELAY_MS").unwrap_or(default.request_delay_ms),
            max_retries: env_parse("MAX_RETRIES").unwrap_or(default.max_retries),
            retry_backoff_ms: env_parse("RETRY_BACKOFF_MS").unwrap_or(default.retry_backoff_ms),
            delimiter: env_parse("DELIMITER").unwrap_or(default.delimiter),
            output_dir: std::env::var("OUTPUT_DIR").map(PathBuf::from).unwrap_or(default.output_dir),
            preference_file: std::env::var("PREFERENCE_FILE").map(PathBuf::from).unwrap_or(default.preference_file),
            prompt_variant: default.prompt_variant,
            bundle_mode: default.bundle_mode,
            html_template: default.html_template,
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(default.verbose_logging),
        }
    }

    /// 读取 TOML 配置文件并覆盖到当前配置上
    pub fn with_toml_file(self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        let file: FileConfig = toml::from_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))?;
        Ok(self.merge(file))
    }

    /// 用文件配置中出现的字段覆盖当前值
    pub fn merge(self, file: FileConfig) -> Self {
        Self {
            llm_api_key: file.llm_api_key.unwrap_or(self.llm_api_key),
            llm_api_base_url: file.llm_api_base_url.unwrap_or(self.llm_api_base_url),
            llm_model_name: file.llm_model_name.unwrap_or(self.llm_model_name),
            llm_max_tokens: file.llm_max_tokens.unwrap_or(self.llm_max_tokens),
            llm_temperature: file.llm_temperature.unwrap_or(self.llm_temperature),
            request_delay_ms: file.request_delay_ms.unwrap_or(self.request_delay_ms),
            max_retries: file.max_retries.unwrap_or(self.max_retries),
            retry_backoff_ms: file.retry_backoff_ms.unwrap_or(self.retry_backoff_ms),
            delimiter: file.delimiter.unwrap_or(self.delimiter),
            output_dir: file.output_dir.unwrap_or(self.output_dir),
            preference_file: file.preference_file.unwrap_or(self.preference_file),
            prompt_variant: file.prompt_variant.or(self.prompt_variant),
            bundle_mode: file.bundle_mode.unwrap_or(self.bundle_mode),
            html_template: file.html_template.or(self.html_template),
            verbose_logging: file.verbose_logging.unwrap_or(self.verbose_logging),
        }
    }
}
