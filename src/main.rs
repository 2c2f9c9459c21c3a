use clap::Parser;
use tracing::error;

use ai_content_check::cli::Cli;
use ai_content_check::config::Config;
use ai_content_check::error::Result;
use ai_content_check::models::Report;
use ai_content_check::orchestrator::App;
use ai_content_check::utils::logging;

#[tokio::main]
async fn main() {
    // 解析命令行
    let cli = Cli::parse();

    // 加载配置（环境变量 + 命令行叠加）
    let config = Config::from_env().with_cli(&cli);

    // 初始化日志（stderr；stdout 留给 JSON 报告）
    logging::init(config.verbose_logging);

    match run(config, &cli).await {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(doc) => println!("{}", doc),
            Err(e) => {
                error!("序列化报告失败: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            error!("{}", e);
            // 启动 / 导航错误输出结构化错误文档并以非零码退出
            println!("{}", e.error_document());
            std::process::exit(1);
        }
    }
}

async fn run(config: Config, cli: &Cli) -> Result<Report> {
    App::initialize(config, cli).await?.run().await
}
