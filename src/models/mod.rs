pub mod locator;
pub mod report;
pub mod unit;

pub use locator::LocatorStrategy;
pub use report::{FlaggedSpan, OverallMetrics, Report, RunMode, ScanResult};
pub use unit::{Chunk, ContentUnit};
