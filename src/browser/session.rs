//! 浏览器会话管理
//!
//! 负责一次运行内唯一浏览器会话的完整生命周期：
//! 启动、导航、关闭拦截弹窗、释放资源。
//! 不跨运行保留任何状态。

use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{BrowserError, Result};
use crate::models::locator::{click_first_visible_js, locate_and_js, DISMISS_STRATEGIES, INPUT_STRATEGIES};

/// 一次运行内唯一的浏览器会话
///
/// 由编排层独占持有；close() 幂等，所有退出路径都必须调用。
pub struct Session {
    browser: Option<Browser>,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl Session {
    /// 启动浏览器、导航到目标站点并做好交互准备
    ///
    /// 导航失败是运行级错误；弹窗关闭和编辑器探测失败只记日志。
    pub async fn open(config: &Config) -> Result<Session> {
        info!("🚀 启动浏览器会话...");
        debug!("目标 URL: {}", config.target_url);

        let mut builder = BrowserConfig::builder();
        if config.headless {
            builder = builder.new_headless_mode();
        } else {
            builder = builder.with_head();
        }
        let browser_config = builder
            .window_size(config.viewport_width, config.viewport_height)
            .viewport(Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
                device_scale_factor: None,
                emulating_mobile: false,
                is_landscape: false,
                has_touch: false,
            })
            .args(vec![
                "--disable-gpu",           // 无头模式下禁用 GPU
                "--no-sandbox",            // 防止沙盒权限问题导致的崩溃
                "--disable-dev-shm-usage", // 防止共享内存不足
            ])
            .build()
            .map_err(|e| BrowserError::ConfigurationFailed { source: e.into() })?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| BrowserError::LaunchFailed {
                source: Box::new(e),
            })?;
        debug!("浏览器启动成功");

        // 在后台处理浏览器事件
        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        // 等待浏览器状态同步
        sleep(Duration::from_millis(300)).await;

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                // 页面都没建起来也要释放浏览器
                handler_task.abort();
                let mut browser = browser;
                if let Err(close_err) = browser.close().await {
                    warn!("关闭浏览器失败: {}", close_err);
                }
                return Err(BrowserError::PageCreationFailed {
                    source: Box::new(e),
                }
                .into());
            }
        };

        let mut session = Session {
            browser: Some(browser),
            page,
            handler_task,
        };

        if let Err(e) = session.prepare(config).await {
            // 配置或导航失败也要释放浏览器资源
            session.close().await;
            return Err(e);
        }

        session.dismiss_interstitial().await;
        session.probe_editor().await;

        if config.verbose_logging {
            session
                .save_landing_screenshot(&config.screenshot_dir)
                .await;
        }

        info!("✅ 会话就绪: {}", config.target_url);
        Ok(session)
    }

    /// 获取页面引用（用于创建 JsExecutor）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 释放所有浏览器资源；幂等
    pub async fn close(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            debug!("正在关闭浏览器会话...");
            if let Err(e) = browser.close().await {
                warn!("关闭浏览器失败: {}", e);
            }
            self.handler_task.abort();
            info!("✓ 浏览器会话已关闭");
        }
    }

    /// 设置 User-Agent 并导航
    async fn prepare(&self, config: &Config) -> Result<()> {
        self.page
            .set_user_agent(SetUserAgentOverrideParams::new(config.user_agent.clone()))
            .await
            .map_err(|e| BrowserError::ConfigurationFailed {
                source: Box::new(e),
            })?;
        self.navigate(config).await
    }

    /// 带超时的导航
    async fn navigate(&self, config: &Config) -> Result<()> {
        info!("正在导航到检测站点...");
        let nav = timeout(
            Duration::from_secs(config.navigation_timeout_secs),
            self.page.goto(config.target_url.clone()),
        )
        .await;

        match nav {
            Ok(Ok(_)) => debug!("页面导航成功"),
            Ok(Err(e)) => {
                return Err(BrowserError::NavigationFailed {
                    url: config.target_url.clone(),
                    detail: e.to_string(),
                }
                .into())
            }
            Err(_) => {
                return Err(BrowserError::NavigationFailed {
                    url: config.target_url.clone(),
                    detail: format!("{} 秒内未完成加载", config.navigation_timeout_secs),
                }
                .into())
            }
        }

        // 等待前端渲染
        sleep(Duration::from_secs(config.post_nav_delay_secs)).await;
        Ok(())
    }

    /// 尽力关闭 cookie / 同意弹窗，失败不致命
    async fn dismiss_interstitial(&self) {
        let script = click_first_visible_js(DISMISS_STRATEGIES);
        match self.page.evaluate(script).await {
            Ok(result) => match result.into_value::<Option<String>>() {
                Ok(Some(which)) => {
                    info!("✓ 已关闭拦截弹窗: {}", which);
                    sleep(Duration::from_millis(500)).await;
                }
                Ok(None) => debug!("没有发现拦截弹窗"),
                Err(e) => debug!("弹窗关闭脚本返回异常: {}", e),
            },
            Err(e) => debug!("弹窗关闭尝试失败（忽略）: {}", e),
        }
    }

    /// 探测输入编辑器是否存在，不存在时输出页面诊断信息
    async fn probe_editor(&self) {
        let script = locate_and_js(
            INPUT_STRATEGIES,
            "const rect = el.getBoundingClientRect();",
            r#"{
                found: true,
                tag: el.tagName,
                id: el.id,
                testid: el.getAttribute('data-testid'),
                width: rect.width,
                height: rect.height
            }"#,
        );

        match self.page.evaluate(script).await {
            Ok(result) => match result.into_value::<serde_json::Value>() {
                Ok(info) if !info.is_null() => debug!("编辑器信息: {}", info),
                _ => {
                    warn!("⚠️ 未找到输入编辑器，后续注入可能失败");
                    self.log_editor_diagnostics().await;
                }
            },
            Err(e) => debug!("编辑器探测失败: {}", e),
        }
    }

    /// 把页面上所有可编辑元素 / 文本域的摘要写进调试日志
    async fn log_editor_diagnostics(&self) {
        let script = r#"(() => {
            const editables = Array.from(document.querySelectorAll('[contenteditable]')).map((e) => ({
                tag: e.tagName,
                id: e.id,
                cls: e.getAttribute('class') || '',
                testid: e.getAttribute('data-testid')
            }));
            const textareas = Array.from(document.querySelectorAll('textarea')).map((e) => ({
                id: e.id,
                cls: e.getAttribute('class') || '',
                placeholder: e.placeholder
            }));
            return { editables, textareas };
        })()"#;

        if let Ok(result) = self.page.evaluate(script).await {
            if let Ok(diag) = result.into_value::<serde_json::Value>() {
                debug!("页面可编辑元素: {}", diag);
            }
        }
    }

    /// 调试模式下保存落地页截图
    async fn save_landing_screenshot(&self, dir: &str) {
        let path = format!("{}/ai-check-landing.png", dir);
        let shot = self
            .page
            .save_screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(false)
                    .build(),
                &path,
            )
            .await;
        match shot {
            Ok(_) => debug!("落地页截图已保存: {}", path),
            Err(e) => debug!("落地页截图失败: {}", e),
        }
    }
}
