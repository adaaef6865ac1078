pub mod cache;
pub mod reports;

pub use cache::{CacheStats, InMemoryResultCache, ResultCache};
pub use reports::{write_json, BestSolution, RunSummary, SolutionReport};
