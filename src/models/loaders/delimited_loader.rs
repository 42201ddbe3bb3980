use crate::models::normalizer::normalize_text;
use crate::models::question::QuestionRecord;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 一个已加载的输入文件
#[derive(Debug, Clone)]
pub struct InputFile {
    pub path: PathBuf,
    /// 不含扩展名的文件名，用于命名输出
    pub stem: String,
    pub records: Vec<QuestionRecord>,
}

/// 读取分隔文件并归一化为记录列表
///
/// 读取失败（不存在、非 UTF-8 等）是唯一会返回错误的情况。
pub async fn load_records(path: &Path, delimiter: char) -> Result<InputFile> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取输入文件: {}", path.display()))?;

    let records = normalize_text(&content, delimiter);
    tracing::debug!("{} 共解析 {} 条记录", path.display(), records.len());

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "questions".to_string());

    Ok(InputFile {
        path: path.to_path_buf(),
        stem,
        records,
    })
}
