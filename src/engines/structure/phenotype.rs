use crate::precision::PrecisionFormat;
use serde::{Deserialize, Serialize};

/// Decoded design: one entry per pipeline stage.
///
/// Always produced by `StructureModel::decode`; never edited on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phenotype {
    pub size: usize,
    pub stages: Vec<StageConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    pub stage: usize,
    pub group_size: usize,
    pub num_groups: usize,
    pub units: Vec<UnitConfig>,
}

/// One butterfly: its precision pair and where it sits in the network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitConfig {
    pub unit_in_stage: usize,
    pub global_index: usize,
    pub group: usize,
    pub unit_in_group: usize,
    pub primary: PrecisionFormat,   // multiplier and twiddle ROM
    pub secondary: PrecisionFormat, // adder / subtractor
    pub input_a: usize,
    pub input_b: usize,
    pub twiddle_index: usize,
}

impl Phenotype {
    pub fn num_stages(&self) -> usize {
        self.stages.len()
    }

    pub fn total_units(&self) -> usize {
        self.stages.iter().map(|s| s.units.len()).sum()
    }

    /// All units in global (stage-major) order
    pub fn units(&self) -> impl Iterator<Item = &UnitConfig> {
        self.stages.iter().flat_map(|s| s.units.iter())
    }
}
