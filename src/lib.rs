pub mod config;
pub mod error;
pub mod export;
pub mod lineage;
pub mod pipeline;
pub mod recorder;
pub mod reports;
pub mod types;

pub use error::{LineageError, Result};
pub use pipeline::LineagePipeline;
