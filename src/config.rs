use crate::cli::Cli;

/// 程序配置
///
/// 所有组件都显式接收这个对象，不使用任何全局可变状态。
#[derive(Clone, Debug)]
pub struct Config {
    /// 目标检测站点 URL
    pub target_url: String,
    /// 段落的最小词数（站点声明的分析下限）
    pub min_paragraph_words: usize,
    /// 整文模式下每个分块的词数上限（站点免费档的限制）
    pub chunk_word_limit: usize,
    /// 导航超时（秒）
    pub navigation_timeout_secs: u64,
    /// 导航完成后的等待（秒），等待前端渲染
    pub post_nav_delay_secs: u64,
    /// 注入文本后的短暂停顿（毫秒）
    pub inject_settle_millis: u64,
    /// 触发扫描后的固定等待（秒），站点没有完成信号
    pub settle_delay_secs: u64,
    /// 等待之后结果区域的轮询间隔（毫秒）
    pub result_poll_interval_millis: u64,
    /// 结果区域稳定性轮询的最大次数（0 表示只做固定等待）
    pub result_poll_max: usize,
    /// 相邻段落之间的停顿（秒），避免异步 UI 状态互相干扰
    pub unit_pause_secs: u64,
    /// 截图输出目录
    pub screenshot_dir: String,
    /// 浏览器视口宽度
    pub viewport_width: u32,
    /// 浏览器视口高度
    pub viewport_height: u32,
    /// 浏览器 User-Agent
    pub user_agent: String,
    /// 是否无头模式
    pub headless: bool,
    /// 是否显示详细日志（同时启用额外的调试截图）
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_url: "https://quillbot.com/ai-content-detector".to_string(),
            min_paragraph_words: 40,
            chunk_word_limit: 1200,
            navigation_timeout_secs: 60,
            post_nav_delay_secs: 5,
            inject_settle_millis: 1000,
            settle_delay_secs: 8,
            result_poll_interval_millis: 500,
            result_poll_max: 4,
            unit_pause_secs: 1,
            screenshot_dir: ".".to_string(),
            viewport_width: 1280,
            viewport_height: 900,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                         AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/122.0.0.0 Safari/537.36"
                .to_string(),
            headless: true,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            target_url: std::env::var("TARGET_URL").unwrap_or(default.target_url),
            min_paragraph_words: std::env::var("MIN_PARAGRAPH_WORDS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.min_paragraph_words),
            chunk_word_limit: std::env::var("CHUNK_WORD_LIMIT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.chunk_word_limit),
            navigation_timeout_secs: std::env::var("NAVIGATION_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.navigation_timeout_secs),
            post_nav_delay_secs: std::env::var("POST_NAV_DELAY_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.post_nav_delay_secs),
            inject_settle_millis: std::env::var("INJECT_SETTLE_MILLIS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.inject_settle_millis),
            settle_delay_secs: std::env::var("SETTLE_DELAY_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.settle_delay_secs),
            result_poll_interval_millis: std::env::var("RESULT_POLL_INTERVAL_MILLIS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.result_poll_interval_millis),
            result_poll_max: std::env::var("RESULT_POLL_MAX").ok().and_then(|v| v.parse().ok()).unwrap_or(default.result_poll_max),
            unit_pause_secs: std::env::var("UNIT_PAUSE_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.unit_pause_secs),
            screenshot_dir: std::env::var("SCREENSHOT_DIR").unwrap_or(default.screenshot_dir),
            viewport_width: std::env::var("VIEWPORT_WIDTH").ok().and_then(|v| v.parse().ok()).unwrap_or(default.viewport_width),
            viewport_height: std::env::var("VIEWPORT_HEIGHT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.viewport_height),
            user_agent: std::env::var("USER_AGENT").unwrap_or(default.user_agent),
            headless: std::env::var("HEADLESS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.headless),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 在环境配置之上叠加命令行参数
    ///
    /// --debug 同时意味着：详细日志、额外调试截图、有头浏览器
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if cli.debug {
            self.verbose_logging = true;
            self.headless = false;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.min_paragraph_words, 40);
        assert_eq!(config.chunk_word_limit, 1200);
        assert_eq!(config.settle_delay_secs, 8);
        assert!(config.headless);
        assert!(!config.verbose_logging);
    }

    #[test]
    fn test_with_cli_debug() {
        let cli = Cli {
            text_file: PathBuf::from("input.txt"),
            paragraph: None,
            full_text: false,
            debug: true,
        };
        let config = Config::default().with_cli(&cli);
        assert!(config.verbose_logging);
        assert!(!config.headless);
    }
}
