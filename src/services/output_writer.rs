//! 输出写入服务 - 业务能力层
//!
//! 负责把一批记录写成分隔文件和 JSON，以及把多个文件的 JSON 打包成目录

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;
use tracing::{debug, info};

use crate::error::AppError;
use crate::models::question::QuestionRecord;

/// HTML 模板中需要替换为 JSON 文件名的占位符
pub const HTML_JSON_PLACEHOLDER: &str = "BIA_Annales_2016.json";

/// 打包方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BundleMode {
    /// 不打包
    #[default]
    #[serde(rename = "none")]
    None,
    /// 所有 JSON 平铺到同一目录
    #[serde(rename = "json")]
    Json,
    /// 每个输入文件一个子目录，包含 JSON 和 HTML 查看器
    #[serde(rename = "viewer")]
    JsonWithViewer,
}

impl fmt::Display for BundleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BundleMode::None => "none",
            BundleMode::Json => "json",
            BundleMode::JsonWithViewer => "viewer",
        };
        f.write_str(name)
    }
}

impl FromStr for BundleMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(BundleMode::None),
            "json" => Ok(BundleMode::Json),
            "viewer" => Ok(BundleMode::JsonWithViewer),
            other => Err(AppError::invalid_value("bundle", other, "none, json, viewer")),
        }
    }
}

/// 一个输入文件生成的输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// 输入文件名（不含扩展名）
    pub stem: String,
    pub delimited: PathBuf,
    pub json: PathBuf,
}

/// 把记录序列化为分隔文本，每行一条，无表头
pub fn render_delimited(records: &[QuestionRecord], delimiter: char) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&record.to_row(delimiter));
        out.push('\n');
    }
    out
}

/// 把记录序列化为带 2 空格缩进的 JSON 数组
pub fn render_json(records: &[QuestionRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}

/// 写出 `<stem>_enriched.csv` 和 `<stem>.json`
pub async fn write_outputs(
    records: &[QuestionRecord],
    out_dir: &Path,
    stem: &str,
    delimiter: char,
) -> Result<OutputPaths> {
    fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("无法创建输出目录: {}", out_dir.display()))?;

    let delimited = out_dir.join(format!("{}_enriched.csv", stem));
    let json = out_dir.join(format!("{}.json", stem));

    fs::write(&delimited, render_delimited(records, delimiter))
        .await
        .with_context(|| format!("无法写入文件: {}", delimited.display()))?;

    let json_text = render_json(records)
        .with_context(|| format!("无法序列化 JSON: {}", json.display()))?;
    fs::write(&json, json_text)
        .await
        .with_context(|| format!("无法写入文件: {}", json.display()))?;

    debug!("已写出 {} 和 {}", delimited.display(), json.display());

    Ok(OutputPaths {
        stem: stem.to_string(),
        delimited,
        json,
    })
}

/// 用 JSON 文件名替换模板中的占位符
pub fn render_viewer(template: &str, json_file_name: &str) -> String {
    template.replace(HTML_JSON_PLACEHOLDER, json_file_name)
}

/// 把一批输出打包到 `dest` 目录
///
/// 返回打包目录；`BundleMode::None` 时不做任何事并返回 None。
pub async fn write_bundle(
    outputs: &[OutputPaths],
    mode: BundleMode,
    template: Option<&str>,
    dest: &Path,
) -> Result<Option<PathBuf>> {
    if mode == BundleMode::None || outputs.is_empty() {
        return Ok(None);
    }

    fs::create_dir_all(dest)
        .await
        .with_context(|| format!("无法创建打包目录: {}", dest.display()))?;

    for output in outputs {
        let json_name = output
            .json
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("{}.json", output.stem));

        match mode {
            BundleMode::Json => {
                copy_file(&output.json, &dest.join(&json_name)).await?;
            }
            BundleMode::JsonWithViewer => {
                let template = template.context("viewer 打包方式需要提供 HTML 模板")?;
                let folder = dest.join(&output.stem);
                fs::create_dir_all(&folder)
                    .await
                    .with_context(|| format!("无法创建目录: {}", folder.display()))?;

                copy_file(&output.json, &folder.join(&json_name)).await?;

                let html_path = folder.join(format!("{}.html", output.stem));
                fs::write(&html_path, render_viewer(template, &json_name))
                    .await
                    .with_context(|| format!("无法写入文件: {}", html_path.display()))?;
            }
            BundleMode::None => {}
        }
    }

    info!("📦 已打包 {} 个文件到 {}", outputs.len(), dest.display());
    Ok(Some(dest.to_path_buf()))
}

async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to)
        .await
        .with_context(|| format!("无法复制 {} 到 {}", from.display(), to.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<QuestionRecord> {
        vec![QuestionRecord {
            question: "Quelle est la couleur du ciel ?".to_string(),
            a: "Bleu".to_string(),
            b: "Vert".to_string(),
            c: "Rouge".to_string(),
            d: "Jaune".to_string(),
            correct: "A".to_string(),
            image: None,
            explanation: "Le ciel est bleu car...".to_string(),
        }]
    }

    #[test]
    fn test_render_delimited() {
        assert_eq!(
            render_delimited(&records(), '$'),
            "Quelle est la couleur du ciel ?$Bleu$Vert$Rouge$Jaune$A$$Le ciel est bleu car...\n"
        );
    }

    #[test]
    fn test_render_json_layout() {
        let json = render_json(&records()).unwrap();
        assert!(json.starts_with("[\n  {\n    \"question\": \"Quelle est la couleur du ciel ?\""));
        assert!(json.contains("\"image\": null"));
        // 字段顺序与列顺序一致
        let pos = |key: &str| json.find(&format!("\"{}\"", key)).unwrap();
        assert!(pos("question") < pos("a"));
        assert!(pos("d") < pos("correct"));
        assert!(pos("correct") < pos("image"));
        assert!(pos("image") < pos("explanation"));
    }

    #[test]
    fn test_bundle_mode_parse() {
        assert_eq!("viewer".parse::<BundleMode>().unwrap(), BundleMode::JsonWithViewer);
        assert_eq!("JSON".parse::<BundleMode>().unwrap(), BundleMode::Json);
        assert!("zip".parse::<BundleMode>().is_err());
    }

    #[tokio::test]
    async fn test_viewer_bundle_layout() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let paths = write_outputs(&records(), &out, "bia_2019", '$').await.unwrap();
        assert!(paths.delimited.ends_with("bia_2019_enriched.csv"));

        let template = "<script>fetch('BIA_Annales_2016.json')</script>";
        let dest = dir.path().join("quiz_structures");
        let bundle = write_bundle(&[paths], BundleMode::JsonWithViewer, Some(template), &dest)
            .await
            .unwrap();
        assert_eq!(bundle.as_deref(), Some(dest.as_path()));

        let html = std::fs::read_to_string(dest.join("bia_2019").join("bia_2019.html")).unwrap();
        assert_eq!(html, "<script>fetch('bia_2019.json')</script>");
        assert!(dest.join("bia_2019").join("bia_2019.json").exists());
    }

    #[tokio::test]
    async fn test_viewer_bundle_requires_template() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_outputs(&records(), dir.path(), "x", '$').await.unwrap();
        let result = write_bundle(&[paths], BundleMode::JsonWithViewer, None, &dir.path().join("b")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_none_mode_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_outputs(&records(), dir.path(), "x", '$').await.unwrap();
        let dest = dir.path().join("bundle");
        let result = write_bundle(&[paths], BundleMode::None, None, &dest).await.unwrap();
        assert!(result.is_none());
        assert!(!dest.exists());
    }
}
