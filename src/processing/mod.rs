//! Document digest pipeline: segmentation, relevance ranking, and extractive summarization.

pub mod boost;
pub mod headings;
pub mod normalize;
pub mod ranking;
pub mod segmentation;
mod service;
pub mod summarize;
pub mod types;

pub use boost::{BoostTable, BoostTableError, HeadlineBoost, KeywordBoost};
pub use ranking::rank_blocks;
pub use segmentation::segment_document;
pub use service::{DigestService, RunRequest};
pub use summarize::summarize;
pub use types::{ContentBlock, PipelineError, RankedBlock};
