//! 元素定位服务 - 业务能力层
//!
//! 把"文本输入框""扫描按钮"这类逻辑角色解析成具体页面元素。
//! 策略表见 models::locator；这里负责逐条尝试、注入验证和
//! 点击的多级回退。找不到动作控件只是单个段落的失败，
//! 调用方拿着按钮清单继续处理后面的段落。

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::infrastructure::JsExecutor;
use crate::models::locator::{
    locate_and_js, LocatorStrategy, ACTION_FALLBACK_KEYWORDS, ACTION_STRATEGIES, INPUT_STRATEGIES,
    TARGET_MARK_ATTR,
};

/// 动作角色的定位结果
#[derive(Debug)]
pub enum ActionOutcome {
    /// 扫描控件已点击
    Clicked { label: String, strategy: String },
    /// 策略表和兜底扫描全部落空；附带页面上观察到的按钮文本
    NotFound { buttons_found: Vec<String> },
}

/// 元素定位服务
///
/// 职责：
/// - 输入角色：定位编辑器并注入文本，注入后验证内容
/// - 动作角色：定位并点击扫描控件
/// - 不认识段落 / 分块，不关心流程顺序
pub struct ElementLocator {
    /// 注入验证的最小内容长度，低于它就升级注入手段
    min_content_chars: usize,
}

impl ElementLocator {
    /// 创建元素定位服务
    pub fn new() -> Self {
        Self {
            min_content_chars: 10,
        }
    }

    /// 向输入编辑器注入文本
    ///
    /// 注入手段按顺序升级：粘贴事件模拟 → insertText 命令 → 逐键输入。
    /// 每一步之后重读编辑器内容验证，最终返回实际观察到的内容
    /// （内容过短也不报错，交给调用方记录）。
    pub async fn inject_text(&self, executor: &JsExecutor, text: &str) -> Result<String> {
        // 1. 清空编辑器
        let clear = locate_and_js(
            INPUT_STRATEGIES,
            r#"el.focus();
               document.execCommand('selectAll', false, null);
               document.execCommand('delete', false, null);"#,
            "true",
        );
        executor.eval(clear).await.context("清空编辑器失败")?;
        sleep(Duration::from_millis(300)).await;

        // 2. 模拟粘贴事件（React contenteditable 吃这一套）
        let paste_body = format!(
            r#"el.focus();
               const dt = new DataTransfer();
               dt.setData('text/plain', {text});
               const evt = new ClipboardEvent('paste', {{
                   bubbles: true,
                   cancelable: true,
                   clipboardData: dt
               }});
               el.dispatchEvent(evt);"#,
            text = serde_json::to_string(text)?
        );
        executor
            .eval(locate_and_js(INPUT_STRATEGIES, &paste_body, "true"))
            .await
            .context("粘贴事件派发失败")?;
        sleep(Duration::from_millis(500)).await;

        let mut content = self.read_editor(executor).await?;

        // 3. 粘贴事件没生效，改用 insertText 命令
        if content.chars().count() < self.min_content_chars {
            debug!("粘贴事件未填充编辑器，尝试 insertText 命令");
            let insert_body = format!(
                r#"el.focus();
                   document.execCommand('selectAll', false, null);
                   document.execCommand('insertText', false, {text});"#,
                text = serde_json::to_string(text)?
            );
            executor
                .eval(locate_and_js(INPUT_STRATEGIES, &insert_body, "true"))
                .await
                .context("insertText 命令失败")?;
            sleep(Duration::from_millis(500)).await;
            content = self.read_editor(executor).await?;
        }

        // 4. 仍然失败，退回逐键输入
        if content.chars().count() < self.min_content_chars {
            debug!("insertText 也失败了，退回键盘逐键输入");
            self.type_into_editor(executor, text).await;
            content = self.read_editor(executor).await?;
        }

        Ok(content)
    }

    /// 定位并点击扫描控件
    ///
    /// 策略表逐条尝试；全部落空后扫描页面上所有按钮做关键词
    /// 模糊匹配；再失败就带着按钮清单返回 NotFound。
    pub async fn locate_and_trigger_scan(&self, executor: &JsExecutor) -> Result<ActionOutcome> {
        for strategy in ACTION_STRATEGIES {
            let mark_body = format!(
                r#"document.querySelectorAll('[{attr}]').forEach((n) => n.removeAttribute('{attr}'));
                   el.setAttribute('{attr}', '1');"#,
                attr = TARGET_MARK_ATTR
            );
            let script = locate_and_js(
                std::slice::from_ref(strategy),
                &mark_body,
                "(el.textContent || '').trim()",
            );
            let label: Option<String> = executor.eval_as(script).await?;
            if let Some(label) = label {
                debug!("找到扫描按钮 (策略: {})", strategy.describe());
                self.click_marked(executor).await?;
                return Ok(ActionOutcome::Clicked {
                    label,
                    strategy: strategy.describe(),
                });
            }
        }

        // 兜底：枚举所有按钮做模糊匹配
        debug!("策略表用尽，尝试兜底按钮扫描...");
        let buttons = self.collect_buttons(executor).await?;
        for label in buttons.iter().filter(|l| !l.is_empty()) {
            debug!("  发现按钮: '{}'", label);
        }

        if let Some(idx) = find_action_candidate(&buttons, ACTION_FALLBACK_KEYWORDS) {
            debug!("通过文本搜索找到扫描按钮: '{}'", buttons[idx]);
            self.mark_button_by_index(executor, idx).await?;
            self.click_marked(executor).await?;
            return Ok(ActionOutcome::Clicked {
                label: buttons[idx].clone(),
                strategy: "fallback:keyword".to_string(),
            });
        }

        warn!("⚠️ 找不到扫描按钮！页面共有 {} 个按钮", buttons.len());
        Ok(ActionOutcome::NotFound {
            buttons_found: buttons,
        })
    }

    /// 读取编辑器当前文本内容
    async fn read_editor(&self, executor: &JsExecutor) -> Result<String> {
        let script = locate_and_js(INPUT_STRATEGIES, "", "(el.textContent || '').trim()");
        let value: Option<String> = executor.eval_as(script).await?;
        Ok(value.unwrap_or_default())
    }

    /// 逐键输入回退：点击编辑器后用驱动发送按键事件
    async fn type_into_editor(&self, executor: &JsExecutor, text: &str) {
        let combined = combined_input_selector();
        match executor.page().find_element(combined.as_str()).await {
            Ok(element) => {
                if let Err(e) = element.click().await {
                    debug!("点击编辑器失败: {}", e);
                }
                sleep(Duration::from_millis(300)).await;
                if let Err(e) = element.type_str(text).await {
                    debug!("键盘输入失败: {}", e);
                }
                sleep(Duration::from_millis(500)).await;
            }
            Err(e) => debug!("键盘输入回退失败，找不到编辑器: {}", e),
        }
    }

    /// 点击带临时标记的元素：受信点击优先，JS 点击兜底
    async fn click_marked(&self, executor: &JsExecutor) -> Result<()> {
        let selector = format!("[{}='1']", TARGET_MARK_ATTR);
        let clicked = match executor.page().find_element(selector.as_str()).await {
            Ok(element) => match element.click().await {
                Ok(_) => true,
                Err(e) => {
                    debug!("受信点击失败，退回 JS 点击: {}", e);
                    false
                }
            },
            Err(e) => {
                debug!("标记元素查找失败，退回 JS 点击: {}", e);
                false
            }
        };

        if !clicked {
            let script = format!(
                r#"(() => {{
                    const el = document.querySelector("[{attr}='1']");
                    if (el) el.click();
                    return !!el;
                }})()"#,
                attr = TARGET_MARK_ATTR
            );
            let ok: bool = executor.eval_as(script).await?;
            if !ok {
                anyhow::bail!("标记的扫描按钮已经消失");
            }
        }

        // 清理临时标记；点击可能触发重渲染，清理失败只记日志
        let cleanup = format!(
            r#"(() => {{
                document.querySelectorAll('[{attr}]').forEach((n) => n.removeAttribute('{attr}'));
                return true;
            }})()"#,
            attr = TARGET_MARK_ATTR
        );
        if let Err(e) = executor.eval(cleanup).await {
            debug!("清理标记属性失败: {}", e);
        }
        Ok(())
    }

    /// 枚举页面上所有按钮的文本
    async fn collect_buttons(&self, executor: &JsExecutor) -> Result<Vec<String>> {
        let script = r#"(() =>
            Array.from(document.querySelectorAll('button')).map((el) => (el.textContent || '').trim())
        )()"#;
        executor.eval_as(script).await.context("无法枚举页面按钮")
    }

    /// 按索引给按钮打上临时标记
    async fn mark_button_by_index(&self, executor: &JsExecutor, index: usize) -> Result<()> {
        let script = format!(
            r#"(() => {{
                document.querySelectorAll('[{attr}]').forEach((n) => n.removeAttribute('{attr}'));
                const els = document.querySelectorAll('button');
                const el = els[{index}];
                if (!el) return false;
                el.setAttribute('{attr}', '1');
                return true;
            }})()"#,
            attr = TARGET_MARK_ATTR,
            index = index
        );
        let ok: bool = executor.eval_as(script).await?;
        if !ok {
            anyhow::bail!("兜底按钮索引 {} 已失效", index);
        }
        Ok(())
    }
}

/// 把输入策略表里的 CSS 选择器拼成组合选择器（逐键回退用）
fn combined_input_selector() -> String {
    INPUT_STRATEGIES
        .iter()
        .filter_map(|s| match s {
            LocatorStrategy::Css(sel) => Some(*sel),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// 在按钮文本里模糊匹配动作关键词，返回第一个命中的索引
fn find_action_candidate(labels: &[String], keywords: &[&str]) -> Option<usize> {
    labels.iter().position(|label| {
        let lower = label.to_lowercase();
        keywords.iter().any(|kw| lower.contains(kw))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_action_candidate_first_match_wins() {
        let labels = vec![
            "Login".to_string(),
            "Scan now".to_string(),
            "Check for AI".to_string(),
        ];
        assert_eq!(
            find_action_candidate(&labels, ACTION_FALLBACK_KEYWORDS),
            Some(1)
        );
    }

    #[test]
    fn test_find_action_candidate_case_insensitive() {
        let labels = vec!["SUBMIT".to_string()];
        assert_eq!(
            find_action_candidate(&labels, ACTION_FALLBACK_KEYWORDS),
            Some(0)
        );
    }

    #[test]
    fn test_find_action_candidate_no_match() {
        let labels = vec!["Login".to_string(), "Sign up".to_string(), String::new()];
        assert_eq!(find_action_candidate(&labels, ACTION_FALLBACK_KEYWORDS), None);
    }

    #[test]
    fn test_combined_input_selector() {
        let combined = combined_input_selector();
        assert!(combined.starts_with("#aidr-input-editor, "));
        assert!(combined.ends_with(r#"[contenteditable="true"]"#));
    }
}
