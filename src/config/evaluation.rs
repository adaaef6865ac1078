use super::traits::{check_positive, ConfigSection};
use crate::engines::structure::StructureModel;
use crate::error::MixfftError;
use serde::{Deserialize, Serialize};

/// Multipliers applied to the three objectives
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveWeights {
    pub power: f64,
    pub area: f64,
    pub performance: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            power: 1.0,
            area: 1.0,
            performance: 1.0,
        }
    }
}

/// Feasibility thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintLimits {
    pub max_power: f64,   // W
    pub max_area: u64,    // LUTs
    pub min_sqnr_db: f64,
}

impl Default for ConstraintLimits {
    fn default() -> Self {
        Self {
            max_power: 3.0,
            max_area: 10_000,
            min_sqnr_db: 20.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Points of the butterfly network; power of two in [2, 1024]
    pub size: usize,
    /// Concurrent evaluation tasks
    pub workers: usize,
    pub weights: ObjectiveWeights,
    pub limits: ConstraintLimits,
    /// `None` keeps every result for the run
    pub cache_capacity: Option<usize>,
    pub stimulus_vectors: usize,
    pub stimulus_seed: u64,
    /// Write a JSON report for each freshly measured solution
    pub save_reports: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            size: 8,
            workers: 4,
            weights: ObjectiveWeights::default(),
            limits: ConstraintLimits::default(),
            cache_capacity: None,
            stimulus_vectors: 100,
            stimulus_seed: 42,
            save_reports: false,
        }
    }
}

impl ConfigSection for EvaluationConfig {
    fn section_name() -> &'static str {
        "evaluation"
    }

    fn validate(&self) -> Result<(), MixfftError> {
        StructureModel::build(self.size)?;

        if self.workers == 0 {
            return Err(MixfftError::Configuration(
                "Worker count must be at least 1".to_string(),
            ));
        }
        if self.cache_capacity == Some(0) {
            return Err(MixfftError::Configuration(
                "Cache capacity must be positive when set".to_string(),
            ));
        }
        check_positive("Max power", self.limits.max_power)?;
        if self.limits.max_area == 0 {
            return Err(MixfftError::Configuration(
                "Max area must be positive".to_string(),
            ));
        }
        for (name, weight) in [
            ("Power weight", self.weights.power),
            ("Area weight", self.weights.area),
            ("Performance weight", self.weights.performance),
        ] {
            if !(weight >= 0.0) {
                return Err(MixfftError::Configuration(format!(
                    "{} must be non-negative, got {}",
                    name, weight
                )));
            }
        }
        Ok(())
    }
}
