use std::path::PathBuf;

use clap::Parser;

/// 命令行参数
///
/// 用法：`ai_content_check <text_file> [--paragraph N] [--full-text] [--debug]`
#[derive(Parser, Debug, Clone)]
#[command(name = "ai_content_check", about = "把文本送入 AI 内容检测站点并提取结构化结果")]
pub struct Cli {
    /// 待检测的文本文件（UTF-8 纯文本，空行分段）
    pub text_file: PathBuf,

    /// 只检测指定段落（0 起始索引）
    #[arg(long)]
    pub paragraph: Option<usize>,

    /// 整文模式：按词数上限把段落打包成分块，每个分块只交互一次
    #[arg(long, default_value_t = false)]
    pub full_text: bool,

    /// 调试模式：详细日志、额外截图、有头浏览器
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::parse_from(["ai_content_check", "essay.txt"]);
        assert_eq!(cli.text_file, PathBuf::from("essay.txt"));
        assert_eq!(cli.paragraph, None);
        assert!(!cli.full_text);
        assert!(!cli.debug);
    }

    #[test]
    fn test_parse_all_flags() {
        let cli = Cli::parse_from([
            "ai_content_check",
            "essay.txt",
            "--paragraph",
            "2",
            "--full-text",
            "--debug",
        ]);
        assert_eq!(cli.paragraph, Some(2));
        assert!(cli.full_text);
        assert!(cli.debug);
    }
}
