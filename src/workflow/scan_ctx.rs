//! 扫描上下文
//!
//! 封装"我正在检测第几个段落（或分块）"这一信息

use std::fmt::Display;

use crate::models::RunMode;

/// 单次扫描的上下文
///
/// 包含处理一个段落 / 分块所需的全部上下文信息
#[derive(Debug, Clone)]
pub struct ScanCtx {
    /// 段落索引（整文模式下是分块索引），用于日志和截图命名
    pub index: usize,
    /// 整文模式下本分块包含的段落索引
    pub member_indices: Option<Vec<usize>>,
    /// 运行模式
    pub mode: RunMode,
    /// 截图输出目录
    pub screenshot_dir: String,
    /// 是否保存额外的调试截图
    pub debug_artifacts: bool,
}

impl ScanCtx {
    /// 逐段模式的上下文
    pub fn for_unit(index: usize, screenshot_dir: String, debug_artifacts: bool) -> Self {
        Self {
            index,
            member_indices: None,
            mode: RunMode::PerParagraph,
            screenshot_dir,
            debug_artifacts,
        }
    }

    /// 整文模式的上下文
    pub fn for_chunk(
        index: usize,
        member_indices: Vec<usize>,
        screenshot_dir: String,
        debug_artifacts: bool,
    ) -> Self {
        Self {
            index,
            member_indices: Some(member_indices),
            mode: RunMode::FullText,
            screenshot_dir,
            debug_artifacts,
        }
    }

    /// 截图路径，按索引确定性命名
    ///
    /// # 参数
    /// - `suffix`: 调试截图的后缀（如 "-before"），None 表示结果截图
    pub fn screenshot_path(&self, suffix: Option<&str>) -> String {
        format!(
            "{}/ai-check-p{}{}.png",
            self.screenshot_dir,
            self.index,
            suffix.unwrap_or("")
        )
    }
}

impl Display for ScanCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[段落 {} 模式 {}]", self.index, self.mode.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screenshot_path_deterministic() {
        let ctx = ScanCtx::for_unit(3, ".".to_string(), false);
        assert_eq!(ctx.screenshot_path(None), "./ai-check-p3.png");
        assert_eq!(
            ctx.screenshot_path(Some("-before")),
            "./ai-check-p3-before.png"
        );
    }

    #[test]
    fn test_chunk_ctx_carries_members() {
        let ctx = ScanCtx::for_chunk(0, vec![0, 1, 2], ".".to_string(), false);
        assert_eq!(ctx.mode, RunMode::FullText);
        assert_eq!(ctx.member_indices.as_deref(), Some(&[0, 1, 2][..]));
    }
}
