pub mod scan_ctx;
pub mod scan_flow;
pub mod wait;

pub use scan_ctx::ScanCtx;
pub use scan_flow::ScanFlow;
pub use wait::WaitPolicy;
