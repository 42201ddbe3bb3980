//! Prompt 偏好存储 - 业务能力层
//!
//! 只负责读写"当前选用哪个 prompt 版本"，不关心流程

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::services::prompt::PromptVariant;

/// Prompt 偏好存储
///
/// 文件内容只有一行：`V1` 或 `V2`
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取偏好
    ///
    /// 文件不存在、读取失败或内容无法识别时返回 V1
    pub async fn load(&self) -> PromptVariant {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content.trim().parse().unwrap_or_else(|_| {
                warn!(
                    "偏好文件 {} 内容无法识别: '{}'，使用 V1",
                    self.path.display(),
                    content.trim()
                );
                PromptVariant::V1
            }),
            Err(e) => {
                debug!("未读取到偏好文件 {}: {}，使用 V1", self.path.display(), e);
                PromptVariant::V1
            }
        }
    }

    /// 写入偏好（覆盖原文件）
    pub async fn save(&self, variant: PromptVariant) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("无法创建目录: {}", parent.display()))?;
        }

        tokio::fs::write(&self.path, variant.token())
            .await
            .with_context(|| format!("无法写入偏好文件: {}", self.path.display()))?;

        debug!("已保存 prompt 偏好 {} 到 {}", variant, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_defaults_to_v1() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::new(dir.path().join("selected_prompt.txt"));
        assert_eq!(store.load().await, PromptVariant::V1);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::new(dir.path().join("prefs").join("selected_prompt.txt"));

        store.save(PromptVariant::V2).await.unwrap();
        assert_eq!(store.load().await, PromptVariant::V2);
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "V2");
    }

    #[tokio::test]
    async fn test_garbage_defaults_to_v1() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selected_prompt.txt");
        std::fs::write(&path, "prompt numéro trois\n").unwrap();

        assert_eq!(PreferenceStore::new(path).load().await, PromptVariant::V1);
    }
}
