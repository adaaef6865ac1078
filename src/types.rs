use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A single gene: 0 selects the low-precision format, 1 the high-precision one.
pub type Gene = u8;

pub const GENE_LOW: Gene = 0;
pub const GENE_HIGH: Gene = 1;

/// Number of objectives and constraints produced per genome.
pub const OBJECTIVES: usize = 3;
pub const CONSTRAINTS: usize = 3;

/// `[power, area, performance_error]`, all minimized
pub type ObjectiveVector = [f64; OBJECTIVES];
/// `[power_violation, area_violation, sqnr_violation]`, feasible when <= 0
pub type ConstraintVector = [f64; CONSTRAINTS];

pub type ObjectiveMatrix = Vec<ObjectiveVector>;
pub type ConstraintMatrix = Vec<ConstraintVector>;

/// Content digest of a genome, used as the cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenomeDigest(String);

impl GenomeDigest {
    /// Order-sensitive SHA-256 over the gene sequence
    pub fn of(genes: &[Gene]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(genes);
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for log lines
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl fmt::Display for GenomeDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Measured cost and fidelity of one design
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub power: f64,   // Watts
    pub area: u64,    // LUTs
    pub sqnr_db: f64,
    pub mae: f64,
}

/// Numerical fidelity of a simulated design against the golden reference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fidelity {
    pub sqnr_db: f64,
    pub mae: f64,
}

/// Power and resource usage reported by synthesis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynthesisMetrics {
    pub power: f64,
    pub area: u64,
}
