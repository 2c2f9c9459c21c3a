pub mod chunker;
pub mod segmenter;

pub use chunker::ChunkPlanner;
pub use segmenter::Segmenter;
