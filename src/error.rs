use std::fmt;

/// 应用程序错误类型
///
/// 只有启动错误和导航错误会作为运行级失败向上传播（非零退出码），
/// 单个段落的失败不走这里，而是嵌入到该段落的 ScanResult 中。
#[derive(Debug)]
pub enum AppError {
    /// 启动阶段错误（浏览器交互之前）
    Setup(SetupError),
    /// 浏览器相关错误
    Browser(BrowserError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Setup(e) => write!(f, "启动错误: {}", e),
            AppError::Browser(e) => write!(f, "浏览器错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Setup(e) => Some(e),
            AppError::Browser(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

impl AppError {
    /// 生成写到 stdout 的结构化错误文档
    ///
    /// stdout 是机器可读的契约，"无合格段落" 保持原工具的英文文案，
    /// 便于下游按固定字符串识别。
    pub fn error_document(&self) -> serde_json::Value {
        match self {
            AppError::Setup(SetupError::NoQualifyingUnits { min_words }) => {
                serde_json::json!({
                    "error": format!("No paragraphs found with {}+ words", min_words)
                })
            }
            other => serde_json::json!({ "error": other.to_string() }),
        }
    }
}

/// 启动阶段错误
#[derive(Debug)]
pub enum SetupError {
    /// 无法读取输入文件
    InputRead {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 输入中没有达到最小词数的段落
    NoQualifyingUnits { min_words: usize },
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::InputRead { path, source } => {
                write!(f, "无法读取输入文件 {}: {}", path, source)
            }
            SetupError::NoQualifyingUnits { min_words } => {
                write!(f, "没有找到 {} 词以上的段落", min_words)
            }
        }
    }
}

impl std::error::Error for SetupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SetupError::InputRead { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            SetupError::NoQualifyingUnits { .. } => None,
        }
    }
}

/// 浏览器相关错误
#[derive(Debug)]
pub enum BrowserError {
    /// 浏览器配置失败
    ConfigurationFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 启动浏览器失败
    LaunchFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 创建页面失败
    PageCreationFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 导航失败（含超时）
    NavigationFailed { url: String, detail: String },
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserError::ConfigurationFailed { source } => {
                write!(f, "浏览器配置失败: {}", source)
            }
            BrowserError::LaunchFailed { source } => {
                write!(f, "启动浏览器失败: {}", source)
            }
            BrowserError::PageCreationFailed { source } => {
                write!(f, "创建页面失败: {}", source)
            }
            BrowserError::NavigationFailed { url, detail } => {
                write!(f, "导航到 {} 失败: {}", url, detail)
            }
        }
    }
}

impl std::error::Error for BrowserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrowserError::ConfigurationFailed { source }
            | BrowserError::LaunchFailed { source }
            | BrowserError::PageCreationFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            BrowserError::NavigationFailed { .. } => None,
        }
    }
}

impl From<SetupError> for AppError {
    fn from(e: SetupError) -> Self {
        AppError::Setup(e)
    }
}

impl From<BrowserError> for AppError {
    fn from(e: BrowserError) -> Self {
        AppError::Browser(e)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Other(format!("{:#}", e))
    }
}

/// 应用级 Result 别名（运行级失败专用）
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_qualifying_units_document() {
        let err = AppError::Setup(SetupError::NoQualifyingUnits { min_words: 40 });
        let doc = err.error_document();
        assert_eq!(
            doc.get("error").and_then(|v| v.as_str()),
            Some("No paragraphs found with 40+ words")
        );
    }

    #[test]
    fn test_navigation_document_contains_url() {
        let err = AppError::Browser(BrowserError::NavigationFailed {
            url: "https://example.com".to_string(),
            detail: "超时".to_string(),
        });
        let doc = err.error_document();
        let msg = doc.get("error").and_then(|v| v.as_str()).unwrap_or("");
        assert!(msg.contains("https://example.com"));
    }
}
