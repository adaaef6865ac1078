pub mod model;
pub mod phenotype;
pub mod statistics;

pub use model::{StructureModel, GENES_PER_UNIT, MAX_SIZE, MIN_SIZE};
pub use phenotype::{Phenotype, StageConfig, UnitConfig};
pub use statistics::{PrecisionCounts, PrecisionStatistics, StageStatistics};
