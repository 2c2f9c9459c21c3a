//! 单次扫描流程 - 流程层
//!
//! 核心职责：定义"一个段落（或分块）"的完整检测流程
//!
//! 流程顺序：
//! 1. 注入文本（含验证与升级）
//! 2. 定位并点击扫描控件
//! 3. 等待结果渲染
//! 4. 截图 + 收割结果
//!
//! 找不到扫描按钮只产出一个失败结果，不向上抛错。

use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::infrastructure::JsExecutor;
use crate::models::{RunMode, ScanResult};
use crate::services::{ActionOutcome, ElementLocator, ResultExtractor};
use crate::utils::logging::truncate_text;
use crate::workflow::scan_ctx::ScanCtx;
use crate::workflow::wait::WaitPolicy;

/// 扫描流程
///
/// - 编排完整的单段检测流程
/// - 不持有任何资源（page）
/// - 只依赖业务能力（services）
pub struct ScanFlow {
    locator: ElementLocator,
    extractor: ResultExtractor,
    wait_policy: WaitPolicy,
    inject_settle: Duration,
}

impl ScanFlow {
    /// 创建扫描流程
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            locator: ElementLocator::new(),
            extractor: ResultExtractor::new(Default::default())?,
            wait_policy: WaitPolicy::from_config(config),
            inject_settle: Duration::from_millis(config.inject_settle_millis),
        })
    }

    /// 对一段文本执行完整检测
    pub async fn run(
        &self,
        executor: &JsExecutor,
        text: &str,
        ctx: &ScanCtx,
    ) -> Result<ScanResult> {
        info!("[段落 {}] 开始检测: {}", ctx.index, truncate_text(text, 80));

        if ctx.debug_artifacts {
            self.debug_screenshot(executor, ctx, "-before").await;
        }

        // 注入文本并验证
        let content = self.locator.inject_text(executor, text).await?;
        debug!(
            "[段落 {}] 注入后编辑器内容 ({} 字符): {}",
            ctx.index,
            content.chars().count(),
            truncate_text(&content, 60)
        );

        if ctx.debug_artifacts {
            self.debug_screenshot(executor, ctx, "-after-paste").await;
        }

        sleep(self.inject_settle).await;

        // 定位并触发扫描
        match self.locator.locate_and_trigger_scan(executor).await? {
            ActionOutcome::Clicked { label, strategy } => {
                info!(
                    "[段落 {}] ✓ 已点击扫描按钮 '{}' ({})",
                    ctx.index, label, strategy
                );
            }
            ActionOutcome::NotFound { buttons_found } => {
                warn!(
                    "[段落 {}] ⚠️ 找不到扫描按钮，跳过提取",
                    ctx.index
                );
                let mut result = ScanResult::failed(
                    ctx.index,
                    truncate_text(text, 100),
                    "Could not find scan button".to_string(),
                    Some(buttons_found),
                );
                stamp_mode(&mut result, ctx);
                return Ok(result);
            }
        }

        // 等待站点异步出结果
        self.wait_policy.wait_for_results(executor).await?;

        // 滚回顶部让结果区域进入视口
        executor
            .eval("(() => { window.scrollTo(0, 0); return true; })()")
            .await?;
        sleep(Duration::from_millis(500)).await;

        // 结果截图
        let screenshot_path = ctx.screenshot_path(None);
        let screenshot = match executor.screenshot(&screenshot_path).await {
            Ok(_) => {
                debug!("[段落 {}] 截图已保存: {}", ctx.index, screenshot_path);
                Some(screenshot_path)
            }
            Err(e) => {
                warn!("[段落 {}] 截图失败: {}", ctx.index, e);
                None
            }
        };

        // 收割结果
        let extraction = self.extractor.extract(executor).await?;

        info!(
            "[段落 {}] ✓ 检测完成: 标记 {} 处, 分数 {} 个",
            ctx.index,
            extraction.flagged.len(),
            extraction.scores.len()
        );

        let mut result = ScanResult {
            paragraph_index: ctx.index,
            text_checked: truncate_text(text, 100),
            is_clean: extraction.flagged.is_empty(),
            flagged_sentences: extraction.flagged,
            scores: extraction.scores,
            overall: extraction.overall,
            screenshot,
            error: None,
            buttons_found: None,
            mode: None,
            paragraph_indices: None,
        };
        stamp_mode(&mut result, ctx);
        Ok(result)
    }

    /// 调试截图，失败只记日志
    async fn debug_screenshot(&self, executor: &JsExecutor, ctx: &ScanCtx, suffix: &str) {
        let path = ctx.screenshot_path(Some(suffix));
        if let Err(e) = executor.screenshot(&path).await {
            debug!("[段落 {}] 调试截图失败: {}", ctx.index, e);
        }
    }
}

/// 整文模式的结果要带上模式和成员段落索引
pub(crate) fn stamp_mode(result: &mut ScanResult, ctx: &ScanCtx) {
    if ctx.mode == RunMode::FullText {
        result.mode = Some(RunMode::FullText);
        result.paragraph_indices = ctx.member_indices.clone();
    }
}
