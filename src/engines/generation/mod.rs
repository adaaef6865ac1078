pub mod context;
pub mod diversity;
pub mod genome;
pub mod operators;
pub mod problem;
pub mod progress;
pub mod sampling;

pub use context::RunContext;
pub use diversity::PopulationDiversity;
pub use genome::Genome;
pub use operators::{CrossoverKind, GenomeOperators, MutationKind, StageEdit, UnitEdit};
pub use problem::MixedPrecisionProblem;
pub use progress::{EvolutionHistory, GenerationObserver, LoggingObserver, SilentObserver};
pub use sampling::SamplingStrategy;
