//! 日志工具模块
//!
//! 提供日志初始化以及格式化输出的辅助函数

use std::collections::BTreeMap;
use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化 tracing 日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 重复初始化（例如测试中）时忽略错误
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 医学题目生成");
    info!("🤖 模型: {}", config.llm_model_name);
    info!(
        "📝 题型: {} | 出题角度: {}",
        config.question_type,
        config.focus.name()
    );
    info!("📦 文本块上限: {} 字符", config.chunk_size);
    info!("{}", "=".repeat(60));
}

/// 记录阶段开始
pub fn log_stage(step: usize, total: usize, name: &str) {
    info!("\n{}", "─".repeat(60));
    info!("▶ 第 {}/{} 步: {}", step, total, name);
    info!("{}", "─".repeat(60));
}

/// 运行统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub pages: usize,
    pub chunks_total: usize,
    pub chunks_processed: usize,
    pub chunks_skipped: usize,
    /// 因临时错误跳过的文本块编号
    pub skipped_chunks: Vec<usize>,
    pub questions_generated: usize,
    pub questions_accepted: usize,
    pub questions_rejected: usize,
    /// 按拒绝原因统计
    pub rejections: BTreeMap<&'static str, usize>,
    /// 是否被中途取消
    pub aborted: bool,
}

/// 打印最终统计信息
pub fn print_final_stats(stats: &RunStats, output_path: &Path) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📄 页数: {}", stats.pages);
    info!(
        "📦 文本块: 处理 {}/{}，跳过 {}",
        stats.chunks_processed, stats.chunks_total, stats.chunks_skipped
    );
    if !stats.skipped_chunks.is_empty() {
        info!("   跳过的文本块: {:?}", stats.skipped_chunks);
    }
    info!("🤖 生成题目: {}", stats.questions_generated);
    info!("✅ 通过校验: {}", stats.questions_accepted);
    info!("❌ 未通过: {}", stats.questions_rejected);
    for (kind, count) in &stats.rejections {
        info!("   - {}: {}", kind, count);
    }
    if stats.aborted {
        info!("⚠️ 运行被中途取消，只保存了已生成的题目");
    }
    info!("{}", "=".repeat(60));
    info!("\n文档已保存至: {}", output_path.display());
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
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdefgh", 3), "abc...");
        assert_eq!(truncate_text("心肌梗死", 2), "心肌...");
    }
}
