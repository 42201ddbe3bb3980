/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

use crate::config::Config;
use crate::orchestrator::{BatchReport, FileOutcome};
use crate::services::prompt::PromptVariant;

/// 记录程序启动信息
pub fn log_startup(config: &Config, variant: PromptVariant, file_count: usize) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 开始生成解析 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🧠 模型: {} | Prompt: {}", config.llm_model_name, variant);
    info!(
        "📄 待处理文件: {} 个 | 请求间隔: {} ms | 重试次数: {}",
        file_count, config.request_delay_ms, config.max_retries
    );
    info!("{}", "=".repeat(60));
}

/// 记录文件开始处理
pub fn log_file_start(file_index: usize, total_files: usize, stem: &str, question_count: usize) {
    info!("\n{}", "─".repeat(60));
    info!(
        "📂 [{}/{}] 开始处理 {} ({} 道题)",
        file_index, total_files, stem, question_count
    );
}

/// 记录文件处理完成
pub fn log_file_complete(outcome: &FileOutcome) {
    info!(
        "✓ {} 完成: 生成 {} | 无效 {} | 失败 {}{}",
        outcome.stem,
        outcome.generated,
        outcome.invalid,
        outcome.failed,
        if outcome.interrupted { " | 已中断" } else { "" }
    );
    info!("💾 {}", outcome.outputs.delimited.display());
    info!("💾 {}", outcome.outputs.json.display());
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(report: &BatchReport) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!(
        "📄 文件: 成功 {}/{}",
        report.files.len(),
        report.files.len() + report.unreadable.len()
    );
    for (path, reason) in &report.unreadable {
        info!("   ✗ {}: {}", path.display(), reason);
    }
    info!("✅ 解析生成: {}", report.total_generated());
    info!("⚠️ 无效题目: {}", report.total_invalid());
    info!("❌ 调用失败: {}", report.total_failed());
    if let Some(bundle) = &report.bundle {
        info!("📦 打包目录: {}", bundle.display());
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("été", 3), "été");
        assert_eq!(truncate_text("", 3), "");
    }
}
