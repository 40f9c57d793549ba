//! 日志工具模块
//!
//! 提供日志初始化和输出的辅助函数

use crate::config::Config;
use crate::models::{LookupStatus, OrderDetails};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// `RUST_LOG` 优先；否则默认 `order_intake=info`，详细模式下为 `debug`。
/// 日志写到 stderr，stdout 只留给命令结果。
pub fn init(verbose: bool) {
    let default_directive = if verbose {
        "order_intake=debug"
    } else {
        "order_intake=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // 重复初始化（测试中常见）时忽略错误
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `config`: 当前配置
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 订单入库工具");
    info!("🗄️ 数据库: {}", config.db_path);
    info!("📊 最大并发扫描数: {}", config.max_concurrent_scans);
    info!("{}", "=".repeat(60));

    for key in config.missing_required() {
        warn!("⚠️ 环境变量 {} 未设置，相关功能将不可用", key);
    }
}

/// 记录一次入库的统计信息
///
/// # 参数
/// - `collected`: 本次得到的订单详情
/// - `saved`: 实际写入数据库的明细行数
pub fn log_intake_summary(collected: &[OrderDetails], saved: usize) {
    let found = collected
        .iter()
        .filter(|d| d.status == LookupStatus::Found)
        .count();
    let seed = collected
        .iter()
        .filter(|d| d.status == LookupStatus::SeedEquipment)
        .count();
    let failed = collected.len() - found - seed;

    info!("\n{}", "─".repeat(60));
    info!("📊 入库统计");
    info!("  订单总数: {}", collected.len());
    info!("  ✓ 查询成功: {}", found);
    info!("  🌱 种子设备: {}", seed);
    info!("  ❌ 查询失败: {}", failed);
    info!("  💾 新增明细: {}", saved);
    info!("{}", "─".repeat(60));
}

/// 截断文本用于日志预览（按字符计数，不会切断多字节字符）
///
/// # 参数
/// - `text`: 原始文本
/// - `max_chars`: 最大字符数
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_respects_char_boundaries() {
        assert_eq!(truncate_text("납품확인서 ORDER#", 5), "납품확인서...");
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("exact", 5), "exact");
    }
}
