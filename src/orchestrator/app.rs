//! 应用编排器 - 编排层
//!
//! ## 职责
//!
//! 1. **启动准备**：读取输入、分段、制定运行计划（全部发生在浏览器启动之前）
//! 2. **资源所有者**：唯一持有 Session 和 JsExecutor 的模块
//! 3. **生命周期保证**：无论扫描循环成败，会话都会被关闭
//! 4. **全局统计**：汇总本次运行的干净 / 标记 / 失败数量
//!
//! 状态机：Init → SessionOpen → {PerUnitLoop | BatchLoop} → SessionClose → Done

use tracing::{debug, info, warn};

use crate::browser::Session;
use crate::cli::Cli;
use crate::config::Config;
use crate::error::{Result, SetupError};
use crate::infrastructure::JsExecutor;
use crate::models::{ContentUnit, Report};
use crate::orchestrator::run_processor::{self, RunPlan};
use crate::text::{ChunkPlanner, Segmenter};
use crate::utils::logging::truncate_text;
use crate::workflow::ScanFlow;

/// 应用主结构
pub struct App {
    config: Config,
    plan: RunPlan,
    session: Session,
    executor: JsExecutor,
}

impl App {
    /// 初始化应用
    ///
    /// 启动类错误（读不到文件、没有合格段落）在这里直接返回，
    /// 此时还没有打开任何浏览器。
    pub async fn initialize(config: Config, cli: &Cli) -> Result<Self> {
        log_startup(&config);

        // 读取输入文本
        let text = tokio::fs::read_to_string(&cli.text_file)
            .await
            .map_err(|e| SetupError::InputRead {
                path: cli.text_file.display().to_string(),
                source: Box::new(e),
            })?;

        // 分段（浏览器交互之前的最后一道门槛）
        let segmenter = Segmenter::new(config.min_paragraph_words);
        let units: Vec<ContentUnit> = segmenter.segment(&text).collect();

        info!(
            "✓ 找到 {} 个合格段落 (≥{} 词)",
            units.len(),
            config.min_paragraph_words
        );
        for unit in &units {
            debug!(
                "  P{}: {} 词 — {}",
                unit.index,
                unit.word_count,
                truncate_text(&unit.text, 60)
            );
        }

        if units.is_empty() {
            return Err(SetupError::NoQualifyingUnits {
                min_words: config.min_paragraph_words,
            }
            .into());
        }

        let total_words: usize = units.iter().map(|u| u.word_count).sum();
        debug!("总词数: {}", total_words);

        let plan = build_plan(units, cli, &config);

        // 打开浏览器会话
        let session = Session::open(&config).await?;
        let executor = JsExecutor::new(session.page().clone());

        Ok(Self {
            config,
            plan,
            session,
            executor,
        })
    }

    /// 驱动扫描循环直到产出报告
    ///
    /// 会话在所有退出路径上都会被关闭，包括扫描循环报错时。
    pub async fn run(mut self) -> Result<Report> {
        let flow = match ScanFlow::new(&self.config) {
            Ok(flow) => flow,
            Err(e) => {
                self.session.close().await;
                return Err(e.into());
            }
        };

        let outcome =
            run_processor::process_run(&self.executor, &flow, &self.plan, &self.config).await;

        // SessionClose：成功失败都走这里
        self.session.close().await;

        let report = outcome?;
        print_final_stats(&report);
        Ok(report)
    }
}

/// 根据命令行参数制定运行计划
fn build_plan(units: Vec<ContentUnit>, cli: &Cli, config: &Config) -> RunPlan {
    if cli.full_text {
        let planner = ChunkPlanner::new(config.chunk_word_limit);
        let chunks = planner.plan(&units);
        info!("📦 整文模式: {} 个分块", chunks.len());
        RunPlan::FullText {
            total_units: units.len(),
            chunks,
        }
    } else if let Some(index) = cli.paragraph {
        let total = units.len();
        let unit = units.into_iter().nth(index);
        if unit.is_none() {
            warn!("⚠️ 段落 {} 超出范围 (共 {} 段)", index, total);
        }
        RunPlan::Single { unit, total }
    } else {
        RunPlan::PerUnit { units }
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - AI 内容检测模式");
    info!("🎯 目标站点: {}", config.target_url);
    info!(
        "开始时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
}

fn print_final_stats(report: &Report) {
    let failed = report
        .paragraphs
        .iter()
        .filter(|r| r.error.is_some())
        .count();
    let clean = report
        .paragraphs
        .iter()
        .filter(|r| r.error.is_none() && r.is_clean)
        .count();
    let flagged = report.paragraphs.len() - failed - clean;

    info!("\n{}", "=".repeat(60));
    info!("📊 全部检测完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 干净: {}", clean);
    info!("⚠️ 有标记: {}", flagged);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunMode;
    use std::path::PathBuf;

    fn cli(paragraph: Option<usize>, full_text: bool) -> Cli {
        Cli {
            text_file: PathBuf::from("input.txt"),
            paragraph,
            full_text,
            debug: false,
        }
    }

    fn units(counts: &[usize]) -> Vec<ContentUnit> {
        counts
            .iter()
            .enumerate()
            .map(|(i, n)| {
                let text = (0..*n)
                    .map(|k| format!("w{}", k))
                    .collect::<Vec<_>>()
                    .join(" ");
                ContentUnit::new(i, text)
            })
            .collect()
    }

    #[test]
    fn test_default_plan_is_per_unit() {
        let plan = build_plan(units(&[45, 50]), &cli(None, false), &Config::default());
        assert_eq!(plan.mode(), RunMode::PerParagraph);
        assert_eq!(plan.total_units(), 2);
        assert!(matches!(plan, RunPlan::PerUnit { ref units } if units.len() == 2));
    }

    #[test]
    fn test_single_plan_out_of_range_is_empty() {
        // 越界不报错：计划为空，总数保持不变
        let plan = build_plan(units(&[45, 50]), &cli(Some(7), false), &Config::default());
        assert_eq!(plan.total_units(), 2);
        assert!(matches!(plan, RunPlan::Single { unit: None, .. }));
    }

    #[test]
    fn test_full_text_plan_packs_chunks() {
        let mut config = Config::default();
        config.chunk_word_limit = 100;
        let plan = build_plan(units(&[60, 60, 60]), &cli(None, true), &config);
        assert_eq!(plan.mode(), RunMode::FullText);
        assert_eq!(plan.total_units(), 3);
        match plan {
            RunPlan::FullText { chunks, .. } => {
                // 每个段落恰好出现在一个分块里，顺序保持
                let covered: Vec<usize> = chunks
                    .iter()
                    .flat_map(|c| c.member_indices.clone())
                    .collect();
                assert_eq!(covered, vec![0, 1, 2]);
            }
            _ => panic!("应该是整文计划"),
        }
    }
}
