use super::phenotype::Phenotype;
use crate::precision::PrecisionFormat;
use serde::{Deserialize, Serialize};

/// Low/high counts for the two gene roles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecisionCounts {
    pub low_primary: usize,
    pub high_primary: usize,
    pub low_secondary: usize,
    pub high_secondary: usize,
}

impl PrecisionCounts {
    fn record(&mut self, primary: PrecisionFormat, secondary: PrecisionFormat) {
        match primary {
            PrecisionFormat::Fp4 => self.low_primary += 1,
            PrecisionFormat::Fp8 => self.high_primary += 1,
        }
        match secondary {
            PrecisionFormat::Fp4 => self.low_secondary += 1,
            PrecisionFormat::Fp8 => self.high_secondary += 1,
        }
    }

    pub fn units(&self) -> usize {
        self.low_primary + self.high_primary
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageStatistics {
    pub stage: usize,
    pub counts: PrecisionCounts,
}

/// Precision distribution of a design, overall and per stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecisionStatistics {
    pub total_units: usize,
    pub overall: PrecisionCounts,
    pub stages: Vec<StageStatistics>,
}

impl PrecisionStatistics {
    pub fn of(phenotype: &Phenotype) -> Self {
        let mut overall = PrecisionCounts::default();
        let stages = phenotype
            .stages
            .iter()
            .map(|stage| {
                let mut counts = PrecisionCounts::default();
                for unit in &stage.units {
                    counts.record(unit.primary, unit.secondary);
                    overall.record(unit.primary, unit.secondary);
                }
                StageStatistics {
                    stage: stage.stage,
                    counts,
                }
            })
            .collect();

        Self {
            total_units: phenotype.total_units(),
            overall,
            stages,
        }
    }

    pub fn high_primary_ratio(&self) -> f64 {
        ratio(self.overall.high_primary, self.total_units)
    }

    pub fn high_secondary_ratio(&self) -> f64 {
        ratio(self.overall.high_secondary, self.total_units)
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "FP8 mult={}/{} ({:.1}%), FP8 add={}/{} ({:.1}%)",
            self.overall.high_primary,
            self.total_units,
            self.high_primary_ratio() * 100.0,
            self.overall.high_secondary,
            self.total_units,
            self.high_secondary_ratio() * 100.0,
        )
    }
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}
