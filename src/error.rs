use crate::toolchain::ToolFailure;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MixfftError {
    #[error("Invalid structure size {0}: must be a power of two in [2, 1024]")]
    InvalidSize(usize),

    #[error("Malformed genome: expected {expected} genes, got {actual}")]
    MalformedGenome { expected: usize, actual: usize },

    #[error("Invalid gene value {value} at index {index}: genes must be 0 or 1")]
    InvalidGene { index: usize, value: u8 },

    /// Raised by `?` where a collaborator is driven directly. The evaluation
    /// pipeline never returns it; it scores tool failures with sentinels.
    #[error("External tool failure: {0}")]
    ExternalTool(#[from] ToolFailure),

    #[error("Cache inconsistency: {0}")]
    CacheInconsistency(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, MixfftError>;
