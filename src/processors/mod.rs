//! Text processors: placeholder masking, batching and the TSV pipeline

pub mod batcher;
pub mod placeholders;
pub mod tsv;
