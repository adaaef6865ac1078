pub mod fidelity;
pub mod objectives;
pub mod pipeline;

pub use fidelity::{Complex, FidelityScorer, GoldenReference, StimulusSet};
pub use pipeline::{EvaluationPipeline, PopulationEvaluation, SharedObserver};
