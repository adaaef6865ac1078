pub mod fp4;
pub mod fp8;

use crate::types::{Gene, GENE_HIGH, GENE_LOW};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two low-bit formats a unit can be built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrecisionFormat {
    Fp4,
    Fp8,
}

impl PrecisionFormat {
    pub fn from_gene(gene: Gene) -> Option<Self> {
        match gene {
            GENE_LOW => Some(PrecisionFormat::Fp4),
            GENE_HIGH => Some(PrecisionFormat::Fp8),
            _ => None,
        }
    }

    pub fn gene(self) -> Gene {
        match self {
            PrecisionFormat::Fp4 => GENE_LOW,
            PrecisionFormat::Fp8 => GENE_HIGH,
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            PrecisionFormat::Fp4 => 4,
            PrecisionFormat::Fp8 => 8,
        }
    }

    pub fn encode(self, value: f64) -> u8 {
        match self {
            PrecisionFormat::Fp4 => fp4::encode(value),
            PrecisionFormat::Fp8 => fp8::encode(value),
        }
    }

    pub fn decode(self, code: u8) -> f64 {
        match self {
            PrecisionFormat::Fp4 => fp4::decode(code),
            PrecisionFormat::Fp8 => fp8::decode(code),
        }
    }

    /// Snap a value onto this format's grid
    pub fn quantize(self, value: f64) -> f64 {
        self.decode(self.encode(value))
    }
}

impl fmt::Display for PrecisionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrecisionFormat::Fp4 => write!(f, "FP4"),
            PrecisionFormat::Fp8 => write!(f, "FP8"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gene_mapping() {
        assert_eq!(PrecisionFormat::from_gene(0), Some(PrecisionFormat::Fp4));
        assert_eq!(PrecisionFormat::from_gene(1), Some(PrecisionFormat::Fp8));
        assert_eq!(PrecisionFormat::from_gene(2), None);
        assert_eq!(PrecisionFormat::Fp8.gene(), 1);
    }

    #[test]
    fn test_quantize_is_idempotent() {
        for &v in &[-3.7, -0.3, 0.0, 0.02, 0.7071, 1.0, 13.5] {
            for format in [PrecisionFormat::Fp4, PrecisionFormat::Fp8] {
                let once = format.quantize(v);
                assert_eq!(format.quantize(once), once, "{} {}", format, v);
            }
        }
    }
}
