//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整次运行的生命周期和资源管理，是系统的"指挥中心"。
//!
//! ### `app` - 应用编排器
//! - 读取输入、分段、制定运行计划
//! - 唯一持有浏览器会话（Session、JsExecutor）
//! - 保证会话在所有退出路径上被关闭
//! - 输出全局统计信息
//!
//! ### `run_processor` - 顺序扫描处理器
//! - 按计划遍历段落 / 分块，严格串行
//! - 创建并复用 ScanFlow
//! - 单个段落失败只产出错误结果，循环继续
//! - 段落之间插入固定停顿
//!
//! ## 层次关系
//!
//! app → run_processor → workflow::ScanFlow → services → infrastructure

pub mod app;
pub mod run_processor;

pub use app::App;
pub use run_processor::RunPlan;
