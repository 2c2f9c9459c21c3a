//! 扫描结果与最终报告
//!
//! 报告以 JSON 形式写到 stdout，字段名沿用站点自动化工具的既有输出，
//! 下游脚本按这些键名消费。

use serde::{Deserialize, Serialize};

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    /// 逐段提交
    #[serde(rename = "per-paragraph")]
    PerParagraph,
    /// 整文分块提交
    #[serde(rename = "full-text")]
    FullText,
}

impl RunMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RunMode::PerParagraph => "per-paragraph",
            RunMode::FullText => "full-text",
        }
    }
}

/// 页面上被标记的一段文本
///
/// `method` 只在类名启发式命中时出现（"class-match"），
/// 样式启发式的发现没有这个字段。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedSpan {
    /// 被标记的文本内容
    pub text: String,
    /// 元素的计算背景色（原样保留，如 "rgb(255, 214, 0)"）
    pub bg: String,
    /// 元素标签名
    pub tag: String,
    /// 元素 class 属性
    #[serde(default)]
    pub cls: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// 从页面全文中模式匹配出的整体百分比指标
///
/// 任何子集都可能缺失；全部缺失时整个对象不出现在输出里。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_generated: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_refined: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub human_written: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likely_ai_pct: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline_pct: Option<u32>,
}

impl OverallMetrics {
    /// 是否一个指标都没有匹配到
    pub fn is_empty(&self) -> bool {
        self.ai_generated.is_none()
            && self.ai_refined.is_none()
            && self.human_written.is_none()
            && self.likely_ai_pct.is_none()
            && self.headline_pct.is_none()
    }
}

/// 单个段落（或分块）的检测结果
///
/// 成功和失败共用一个结构：失败时只填 `error` 和诊断字段，
/// 运行会继续处理后面的段落。
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    /// 段落索引（整文模式下是分块索引）
    pub paragraph_index: usize,
    /// 被检测文本的预览（最多 100 字符）
    pub text_checked: String,
    /// 去重后的标记文本（首次出现优先，保持发现顺序）
    pub flagged_sentences: Vec<FlaggedSpan>,
    /// 分数类控件的原始文本，不做数值解析
    pub scores: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall: Option<OverallMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    /// 没有任何标记即视为干净
    pub is_clean: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 找不到扫描按钮时，页面上观察到的全部按钮文本
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buttons_found: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<RunMode>,
    /// 整文模式下本分块包含的段落索引
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraph_indices: Option<Vec<usize>>,
}

impl ScanResult {
    /// 构建失败结果（扫描没有执行，只有错误与诊断信息）
    pub fn failed(
        paragraph_index: usize,
        text_checked: String,
        error: String,
        buttons_found: Option<Vec<String>>,
    ) -> Self {
        Self {
            paragraph_index,
            text_checked,
            flagged_sentences: Vec::new(),
            scores: Vec::new(),
            overall: None,
            screenshot: None,
            is_clean: true,
            error: Some(error),
            buttons_found,
            mode: None,
            paragraph_indices: None,
        }
    }
}

/// 一次运行的最终输出
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub paragraphs: Vec<ScanResult>,
    /// 合格段落总数（与运行模式无关）
    pub total: usize,
    pub mode: RunMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> ScanResult {
        ScanResult {
            paragraph_index: 0,
            text_checked: "preview".to_string(),
            flagged_sentences: Vec::new(),
            scores: Vec::new(),
            overall: None,
            screenshot: Some("ai-check-p0.png".to_string()),
            is_clean: true,
            error: None,
            buttons_found: None,
            mode: None,
            paragraph_indices: None,
        }
    }

    #[test]
    fn test_overall_absent_when_none() {
        // 没有匹配到任何指标时，序列化结果里不应出现 overall 键
        let json = serde_json::to_value(sample_result()).unwrap();
        assert!(json.get("overall").is_none());
        assert!(json.get("error").is_none());
        assert_eq!(json.get("is_clean"), Some(&serde_json::Value::Bool(true)));
    }

    #[test]
    fn test_overall_present_when_partial() {
        let mut result = sample_result();
        result.overall = Some(OverallMetrics {
            ai_generated: Some(72),
            ..Default::default()
        });
        let json = serde_json::to_value(result).unwrap();
        let overall = json.get("overall").expect("overall 应该存在");
        assert_eq!(overall.get("ai_generated").and_then(|v| v.as_u64()), Some(72));
        // 未匹配的指标不应出现
        assert!(overall.get("human_written").is_none());
    }

    #[test]
    fn test_failed_result_shape() {
        let result = ScanResult::failed(
            3,
            "preview".to_string(),
            "Could not find scan button".to_string(),
            Some(vec!["Login".to_string(), "Sign up".to_string()]),
        );
        let json = serde_json::to_value(result).unwrap();
        assert_eq!(
            json.get("error").and_then(|v| v.as_str()),
            Some("Could not find scan button")
        );
        assert_eq!(
            json.get("buttons_found").and_then(|v| v.as_array()).map(|a| a.len()),
            Some(2)
        );
        assert!(json.get("screenshot").is_none());
    }

    #[test]
    fn test_run_mode_serialization() {
        assert_eq!(
            serde_json::to_value(RunMode::PerParagraph).unwrap(),
            serde_json::Value::String("per-paragraph".to_string())
        );
        assert_eq!(RunMode::FullText.as_str(), "full-text");
    }

    #[test]
    fn test_report_shape() {
        let report = Report {
            paragraphs: vec![sample_result()],
            total: 1,
            mode: RunMode::PerParagraph,
        };
        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json.get("total").and_then(|v| v.as_u64()), Some(1));
        assert_eq!(
            json.get("mode").and_then(|v| v.as_str()),
            Some("per-paragraph")
        );
    }
}
