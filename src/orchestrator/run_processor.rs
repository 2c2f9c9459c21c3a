//! 顺序扫描处理器 - 编排层
//!
//! 页面是唯一的可变 UI 状态，并发注入会把它弄脏，
//! 所以循环严格串行，段落之间留固定停顿。

use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::infrastructure::JsExecutor;
use crate::models::{Chunk, ContentUnit, Report, RunMode, ScanResult};
use crate::utils::logging::truncate_text;
use crate::workflow::scan_flow::stamp_mode;
use crate::workflow::{ScanCtx, ScanFlow};

/// 运行计划
#[derive(Debug)]
pub enum RunPlan {
    /// 逐段处理全部段落
    PerUnit { units: Vec<ContentUnit> },
    /// 只处理指定段落；越界时为空
    Single {
        unit: Option<ContentUnit>,
        total: usize,
    },
    /// 整文模式：按分块处理
    FullText {
        chunks: Vec<Chunk>,
        total_units: usize,
    },
}

impl RunPlan {
    /// 报告里的运行模式字符串
    pub fn mode(&self) -> RunMode {
        match self {
            RunPlan::FullText { .. } => RunMode::FullText,
            _ => RunMode::PerParagraph,
        }
    }

    /// 合格段落总数（与模式无关）
    pub fn total_units(&self) -> usize {
        match self {
            RunPlan::PerUnit { units } => units.len(),
            RunPlan::Single { total, .. } => *total,
            RunPlan::FullText { total_units, .. } => *total_units,
        }
    }
}

/// 按计划驱动整个扫描循环并汇总报告
pub async fn process_run(
    executor: &JsExecutor,
    flow: &ScanFlow,
    plan: &RunPlan,
    config: &Config,
) -> Result<Report> {
    let mut results = Vec::new();

    match plan {
        RunPlan::PerUnit { units } => {
            for unit in units {
                log_scan_start(unit.index, units.len());
                let ctx = ScanCtx::for_unit(
                    unit.index,
                    config.screenshot_dir.clone(),
                    config.verbose_logging,
                );
                results.push(scan_one(executor, flow, &unit.text, &ctx).await);
                sleep(Duration::from_secs(config.unit_pause_secs)).await;
            }
        }
        RunPlan::Single { unit, .. } => {
            if let Some(unit) = unit {
                info!("\n[段落 {}] {}", unit.index, "─".repeat(30));
                let ctx = ScanCtx::for_unit(
                    unit.index,
                    config.screenshot_dir.clone(),
                    config.verbose_logging,
                );
                results.push(scan_one(executor, flow, &unit.text, &ctx).await);
            }
        }
        RunPlan::FullText { chunks, .. } => {
            for (chunk_index, chunk) in chunks.iter().enumerate() {
                log_scan_start(chunk_index, chunks.len());
                debug!(
                    "分块 {}: 段落 {:?}, {} 词",
                    chunk_index, chunk.member_indices, chunk.word_count
                );
                let ctx = ScanCtx::for_chunk(
                    chunk_index,
                    chunk.member_indices.clone(),
                    config.screenshot_dir.clone(),
                    config.verbose_logging,
                );
                results.push(scan_one(executor, flow, &chunk.text, &ctx).await);
                sleep(Duration::from_secs(config.unit_pause_secs)).await;
            }
        }
    }

    Ok(Report {
        paragraphs: results,
        total: plan.total_units(),
        mode: plan.mode(),
    })
}

/// 执行一次扫描；任何错误都收敛成该段落的失败结果
async fn scan_one(
    executor: &JsExecutor,
    flow: &ScanFlow,
    text: &str,
    ctx: &ScanCtx,
) -> ScanResult {
    match flow.run(executor, text, ctx).await {
        Ok(result) => result,
        Err(e) => {
            error!("[段落 {}] ❌ 处理过程中发生错误: {:#}", ctx.index, e);
            let mut result = ScanResult::failed(
                ctx.index,
                truncate_text(text, 100),
                format!("{:#}", e),
                None,
            );
            stamp_mode(&mut result, ctx);
            result
        }
    }
}

// ========== 日志辅助函数 ==========

fn log_scan_start(index: usize, total: usize) {
    info!("\n[段落 {}] {}", index, "─".repeat(30));
    info!("[段落 {}] 处理第 {}/{} 个", index, index + 1, total);
}
