pub mod evaluation;
pub mod evolution;
pub mod manager;
pub mod toolchain;
pub mod traits;

pub use evaluation::{ConstraintLimits, EvaluationConfig, ObjectiveWeights};
pub use evolution::EvolutionConfig;
pub use manager::{AppConfig, ConfigManager};
pub use toolchain::{SimulationBackend, SynthesisBackend, ToolchainConfig};
pub use traits::ConfigSection;
