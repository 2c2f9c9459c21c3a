//! # AI Content Check
//!
//! 一个把长文本送入第三方 AI 内容检测站点并提取结构化结果的 Rust 应用程序
//!
//! 目标站点没有公开 API，只能驱动浏览器操作它的页面表单；页面标记也没有
//! 稳定契约，所以定位和提取都建立在分层回退策略之上。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 eval() / screenshot() 能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个段落
//! - `ElementLocator` - 输入注入 / 扫描按钮定位能力
//! - `ResultExtractor` - 结果收割能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个段落"的完整检测流程
//! - `ScanCtx` - 上下文封装（索引 + 模式 + 截图目录）
//! - `ScanFlow` - 流程编排（注入 → 点击 → 等待 → 提取）
//! - `WaitPolicy` - 站点无完成信号，固定等待 + 有界稳定轮询
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 运行生命周期，独占浏览器会话
//! - `orchestrator/run_processor` - 严格串行的段落循环
//!
//! 另有 `text/`（分段与分块）、`browser/`（会话管理）、`models/`（数据
//! 模型与策略表）作为支撑模块。
//!
//! ## 模块结构

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod text;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::Session;
pub use cli::Cli;
pub use config::Config;
pub use error::{AppError, Result};
pub use infrastructure::JsExecutor;
pub use models::{Chunk, ContentUnit, FlaggedSpan, Report, RunMode, ScanResult};
pub use orchestrator::App;
pub use text::{ChunkPlanner, Segmenter};
pub use workflow::{ScanCtx, ScanFlow, WaitPolicy};
