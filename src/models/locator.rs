//! 定位策略表
//!
//! 目标站点的标记没有稳定契约：元素 ID、按钮文案、结果结构都可能变。
//! 所以所有"逻辑角色 → 具体元素"的解析都走声明式的有序策略表，
//! 逐条尝试，第一个产生可见命中的策略获胜。新增回退手段只需要
//! 往表里追加一条，不用改控制流。

use serde::Serialize;

/// 定位策略：把一个逻辑角色解析成具体页面元素的一种候选手段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorStrategy {
    /// CSS / 属性选择器匹配
    Css(&'static str),
    /// 按可见文本匹配 button 元素（大小写不敏感的包含匹配）
    ButtonLabel(&'static str),
}

impl LocatorStrategy {
    /// 用于日志的策略描述
    pub fn describe(&self) -> String {
        match self {
            LocatorStrategy::Css(sel) => format!("css:{}", sel),
            LocatorStrategy::ButtonLabel(label) => format!("button:{}", label),
        }
    }
}

/// 输入角色（文本编辑器）的策略表，最具体的排最前
pub const INPUT_STRATEGIES: &[LocatorStrategy] = &[
    LocatorStrategy::Css("#aidr-input-editor"),
    LocatorStrategy::Css(r#"[data-testid="aidr-input-editor"]"#),
    LocatorStrategy::Css(r#"[contenteditable="true"]"#),
];

/// 动作角色（触发扫描的控件）的策略表
pub const ACTION_STRATEGIES: &[LocatorStrategy] = &[
    LocatorStrategy::ButtonLabel("Check for AI"),
    LocatorStrategy::ButtonLabel("Scan for AI"),
    LocatorStrategy::ButtonLabel("Scan"),
    LocatorStrategy::ButtonLabel("Check"),
    LocatorStrategy::ButtonLabel("Analyze"),
    LocatorStrategy::ButtonLabel("Detect"),
    LocatorStrategy::Css(r#"[data-testid*="scan"]"#),
    LocatorStrategy::Css(r#"[data-testid*="check"]"#),
    LocatorStrategy::Css(r#"[data-testid*="detect"]"#),
    LocatorStrategy::Css(r#"[data-testid*="submit"]"#),
];

/// 动作角色兜底扫描用的关键词（模糊匹配按钮文本）
pub const ACTION_FALLBACK_KEYWORDS: &[&str] = &["scan", "check", "analyze", "detect", "submit"];

/// 拦截弹窗（cookie / 同意对话框）的关闭策略表
pub const DISMISS_STRATEGIES: &[LocatorStrategy] = &[
    LocatorStrategy::ButtonLabel("Accept"),
    LocatorStrategy::ButtonLabel("Accept All"),
    LocatorStrategy::ButtonLabel("Got it"),
    LocatorStrategy::ButtonLabel("Close"),
    LocatorStrategy::Css(r#"[aria-label="Close"]"#),
    LocatorStrategy::ButtonLabel("I agree"),
];

/// 定位命中后用来从 Rust 侧重新找到元素的临时标记属性
pub const TARGET_MARK_ATTR: &str = "data-ai-check-target";

#[derive(Serialize)]
struct StrategyRepr<'a> {
    kind: &'static str,
    value: &'a str,
}

fn strategies_json(strategies: &[LocatorStrategy]) -> String {
    let reprs: Vec<StrategyRepr<'_>> = strategies
        .iter()
        .map(|s| match s {
            LocatorStrategy::Css(sel) => StrategyRepr {
                kind: "css",
                value: sel,
            },
            LocatorStrategy::ButtonLabel(label) => StrategyRepr {
                kind: "label",
                value: label,
            },
        })
        .collect();
    // 静态表序列化不会失败
    serde_json::to_string(&reprs).unwrap_or_else(|_| "[]".to_string())
}

/// JS 前置片段：策略表 + 可见性判断 + 逐条匹配
///
/// 可见性口径：有布局盒（offsetParent 非空）且边界框非零。
/// 同一策略内的并列命中按文档序取第一个。
fn finder_prelude(strategies: &[LocatorStrategy]) -> String {
    format!(
        r#"
        const strategies = {};
        const visible = (el) => {{
            const rect = el.getBoundingClientRect();
            return el.offsetParent !== null && rect.width > 0 && rect.height > 0;
        }};
        const matchOne = (s) => {{
            if (s.kind === 'css') {{
                for (const el of document.querySelectorAll(s.value)) {{
                    if (visible(el)) return el;
                }}
                return null;
            }}
            for (const el of document.querySelectorAll('button')) {{
                const text = (el.textContent || '').trim();
                if (text.toLowerCase().includes(s.value.toLowerCase()) && visible(el)) {{
                    return el;
                }}
            }}
            return null;
        }};
        const locate = () => {{
            for (const s of strategies) {{
                const el = matchOne(s);
                if (el) return el;
            }}
            return null;
        }};
        "#,
        strategies_json(strategies)
    )
}

/// 生成"定位第一个可见命中"的 JS，返回元素则执行 `body`
///
/// `body` 里可以使用 `el` 变量；脚本整体返回 `onFound` 表达式的值，
/// 未命中返回 null。
pub fn locate_and_js(strategies: &[LocatorStrategy], body: &str, on_found: &str) -> String {
    format!(
        r#"(() => {{
            {}
            const el = locate();
            if (!el) return null;
            {}
            return {};
        }})()"#,
        finder_prelude(strategies),
        body,
        on_found
    )
}

/// 生成"按序尝试并点击第一个可见命中"的 JS
///
/// 返回命中策略的描述字符串，未命中返回 null。
pub fn click_first_visible_js(strategies: &[LocatorStrategy]) -> String {
    format!(
        r#"(() => {{
            {}
            for (const s of strategies) {{
                const el = matchOne(s);
                if (el) {{
                    el.click();
                    return s.kind + ':' + s.value;
                }}
            }}
            return null;
        }})()"#,
        finder_prelude(strategies)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_strategies_most_specific_first() {
        // ID 选择器必须排在通用 contenteditable 之前
        assert_eq!(
            INPUT_STRATEGIES[0],
            LocatorStrategy::Css("#aidr-input-editor")
        );
        assert_eq!(
            INPUT_STRATEGIES[INPUT_STRATEGIES.len() - 1],
            LocatorStrategy::Css(r#"[contenteditable="true"]"#)
        );
    }

    #[test]
    fn test_action_labels_before_attribute_patterns() {
        // 文案匹配比 data-testid 模式更具体，排在前面
        let first_css = ACTION_STRATEGIES
            .iter()
            .position(|s| matches!(s, LocatorStrategy::Css(_)))
            .unwrap();
        let last_label = ACTION_STRATEGIES
            .iter()
            .rposition(|s| matches!(s, LocatorStrategy::ButtonLabel(_)))
            .unwrap();
        assert!(last_label < first_css);
    }

    #[test]
    fn test_strategies_json_escaping() {
        let json = strategies_json(&[LocatorStrategy::Css(r#"[data-testid="x"]"#)]);
        // 双引号被正确转义，能嵌进 JS 源码
        assert!(json.contains(r#"\"x\""#));
    }

    #[test]
    fn test_generated_js_contains_selectors() {
        let js = click_first_visible_js(DISMISS_STRATEGIES);
        assert!(js.contains("Accept"));
        assert!(js.contains("aria-label"));
        assert!(js.contains("matchOne"));
    }

    #[test]
    fn test_locate_and_js_embeds_body() {
        let js = locate_and_js(
            INPUT_STRATEGIES,
            &format!("el.setAttribute('{}', '1');", TARGET_MARK_ATTR),
            "(el.textContent || '').trim()",
        );
        assert!(js.contains(TARGET_MARK_ATTR));
        assert!(js.contains("aidr-input-editor"));
    }
}
