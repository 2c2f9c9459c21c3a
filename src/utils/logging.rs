//! 日志工具模块
//!
//! 日志全部走 stderr，stdout 留给最终的 JSON 报告。

use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// # 参数
/// - `verbose`: 是否输出 debug 级别日志（RUST_LOG 优先）
pub fn init(verbose: bool) {
    let default_directive = if verbose {
        "ai_content_check=debug"
    } else {
        "ai_content_check=info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// 截断长文本用于日志显示和结果预览
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
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
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_text("short", 100), "short");
    }

    #[test]
    fn test_truncate_long_text() {
        let long = "x".repeat(150);
        let truncated = truncate_text(&long, 100);
        assert_eq!(truncated.chars().count(), 103);
        assert!(truncated.ends_with("..."));
    }
}
