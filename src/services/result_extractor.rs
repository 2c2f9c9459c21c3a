//! 结果提取服务 - 业务能力层
//!
//! 扫描触发并等待结束后，从渲染页面收割结构化结果。
//! 三个互相独立的启发式（样式、class 关键词、分数控件）在页面里
//! 一次性跑完，去重与整体指标解析在 Rust 侧完成。

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::infrastructure::JsExecutor;
use crate::models::{FlaggedSpan, OverallMetrics};

/// 读取页面全文的脚本
const BODY_TEXT_JS: &str = "document.body ? document.body.textContent : ''";

/// 高亮配色判定阈值
///
/// 这些阈值是对着当前观察到的主题调出来的策略参数，不是机制。
/// 站点换主题后的表现未经验证；调整只应该发生在这里，
/// 不动提取控制流。
#[derive(Debug, Clone, Copy)]
pub struct HighlightPalette {
    /// 暖色高亮（黄/橙/红）：红通道下限
    pub warm_red_min: u8,
    /// 暖色高亮：蓝通道上限
    pub warm_blue_max: u8,
    /// 粉/紫高亮：红通道下限
    pub flag_red_min: u8,
    /// 粉/紫高亮：蓝通道下限
    pub flag_blue_min: u8,
    /// 粉/紫高亮：绿通道上限
    pub flag_green_max: u8,
}

impl Default for HighlightPalette {
    fn default() -> Self {
        Self {
            warm_red_min: 200,
            warm_blue_max: 150,
            flag_red_min: 200,
            flag_blue_min: 150,
            flag_green_max: 150,
        }
    }
}

/// 提取策略的全部可调参数
#[derive(Debug, Clone)]
pub struct ExtractPolicy {
    pub palette: HighlightPalette,
    /// 与标记 UI 相关的 class 关键词
    pub flag_class_keywords: &'static [&'static str],
    /// 与分数 / 百分比控件相关的 class 关键词
    pub score_class_keywords: &'static [&'static str],
    /// 有意义文本的最小长度
    pub min_span_chars: usize,
}

impl Default for ExtractPolicy {
    fn default() -> Self {
        Self {
            palette: HighlightPalette::default(),
            flag_class_keywords: &["highlight", "ai-", "flag", "detected", "human", "generated"],
            score_class_keywords: &["score", "percent", "result", "meter", "gauge", "progress"],
            min_span_chars: 10,
        }
    }
}

/// 页面脚本返回的原始发现（未去重）
#[derive(Debug, Deserialize)]
struct RawFindings {
    flagged: Vec<FlaggedSpan>,
    scores: Vec<String>,
}

/// 一次提取的产物
#[derive(Debug)]
pub struct Extraction {
    pub flagged: Vec<FlaggedSpan>,
    pub scores: Vec<String>,
    pub overall: Option<OverallMetrics>,
}

/// 整体指标的短语模板
struct MetricPatterns {
    ai_generated: Regex,
    ai_refined: Regex,
    human_written: Regex,
    likely_ai: Regex,
    headline: Regex,
}

impl MetricPatterns {
    fn compile() -> Result<Self> {
        Ok(Self {
            ai_generated: Regex::new(r"(?i)AI-generated[\s\x{A0}]*(\d+)%")?,
            ai_refined: Regex::new(r"(?i)Human-written\s*&\s*AI-refined[\s\x{A0}]*(\d+)%")?,
            human_written: Regex::new(r"(?i)Human-written[\s\x{A0}]*(\d+)%")?,
            likely_ai: Regex::new(r"(?i)(\d+)%\s*of text is likely AI")?,
            headline: Regex::new(r"(?i)(\d+)%\s*of text")?,
        })
    }

    fn capture_pct(re: &Regex, body: &str) -> Option<u32> {
        re.captures(body)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

/// 结果提取服务
pub struct ResultExtractor {
    policy: ExtractPolicy,
    patterns: MetricPatterns,
}

impl ResultExtractor {
    /// 创建结果提取服务
    pub fn new(policy: ExtractPolicy) -> Result<Self> {
        Ok(Self {
            policy,
            patterns: MetricPatterns::compile()?,
        })
    }

    /// 收割当前页面上的检测结果
    ///
    /// # 返回
    /// 去重后的标记文本、分数控件原始文本、整体指标（可能缺失）
    pub async fn extract(&self, executor: &JsExecutor) -> Result<Extraction> {
        let raw: RawFindings = executor
            .eval_as(self.harvest_script())
            .await
            .context("收割脚本执行失败")?;
        debug!(
            "启发式共产出 {} 条发现, {} 个分数",
            raw.flagged.len(),
            raw.scores.len()
        );

        let flagged = dedupe_spans(raw.flagged);

        let body: String = executor
            .eval_as(BODY_TEXT_JS)
            .await
            .context("读取页面文本失败")?;
        let overall = self.parse_overall(&body);

        Ok(Extraction {
            flagged,
            scores: raw.scores,
            overall,
        })
    }

    /// 生成在页面里跑三个启发式的脚本
    fn harvest_script(&self) -> String {
        let pal = &self.policy.palette;
        format!(
            r#"(() => {{
                const results = [];
                const minLen = {min_len};
                for (const el of document.querySelectorAll('span, mark')) {{
                    const style = getComputedStyle(el);
                    const bg = style.backgroundColor;
                    const text = (el.textContent || '').trim();
                    if (!text || text.length < minLen) continue;
                    if (bg === 'rgba(0, 0, 0, 0)' || bg === 'transparent' || bg === 'rgb(255, 255, 255)') continue;
                    const m = bg.match(/rgb\((\d+),\s*(\d+),\s*(\d+)\)/);
                    if (m) {{
                        const r = Number(m[1]), g = Number(m[2]), b = Number(m[3]);
                        if (r > {warm_red_min} && b < {warm_blue_max}) {{
                            results.push({{ text, bg, tag: el.tagName, cls: el.getAttribute('class') || '' }});
                        }}
                        if (r > {flag_red_min} && b > {flag_blue_min} && g < {flag_green_max}) {{
                            results.push({{ text, bg, tag: el.tagName, cls: el.getAttribute('class') || '' }});
                        }}
                    }}
                }}
                for (const el of document.querySelectorAll({flag_selector})) {{
                    const text = (el.textContent || '').trim();
                    if (text && text.length > minLen) {{
                        results.push({{
                            text,
                            bg: getComputedStyle(el).backgroundColor,
                            tag: el.tagName,
                            cls: el.getAttribute('class') || '',
                            method: 'class-match'
                        }});
                    }}
                }}
                const scores = [];
                for (const el of document.querySelectorAll({score_selector})) {{
                    const text = (el.textContent || '').trim();
                    if (text) scores.push(text);
                }}
                return {{ flagged: results, scores }};
            }})()"#,
            min_len = self.policy.min_span_chars,
            warm_red_min = pal.warm_red_min,
            warm_blue_max = pal.warm_blue_max,
            flag_red_min = pal.flag_red_min,
            flag_blue_min = pal.flag_blue_min,
            flag_green_max = pal.flag_green_max,
            flag_selector = json_str(&class_selector(self.policy.flag_class_keywords)),
            score_selector = json_str(&class_selector(self.policy.score_class_keywords)),
        )
    }

    /// 从页面全文解析整体百分比指标；一个都没匹配到时返回 None
    fn parse_overall(&self, body: &str) -> Option<OverallMetrics> {
        let metrics = OverallMetrics {
            ai_generated: MetricPatterns::capture_pct(&self.patterns.ai_generated, body),
            ai_refined: MetricPatterns::capture_pct(&self.patterns.ai_refined, body),
            human_written: MetricPatterns::capture_pct(&self.patterns.human_written, body),
            likely_ai_pct: MetricPatterns::capture_pct(&self.patterns.likely_ai, body),
            headline_pct: MetricPatterns::capture_pct(&self.patterns.headline, body),
        };
        if metrics.is_empty() {
            None
        } else {
            Some(metrics)
        }
    }
}

/// 按文本内容去重，首次出现优先，保持发现顺序
pub fn dedupe_spans(spans: Vec<FlaggedSpan>) -> Vec<FlaggedSpan> {
    let mut seen = std::collections::HashSet::new();
    spans
        .into_iter()
        .filter(|s| seen.insert(s.text.clone()))
        .collect()
}

/// 把 class 关键词拼成属性包含选择器
fn class_selector(keywords: &[&str]) -> String {
    keywords
        .iter()
        .map(|k| format!(r#"[class*="{}"]"#, k))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 字符串安全地嵌进 JS 源码
fn json_str(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}
