use crate::types::{Gene, GENE_HIGH, GENE_LOW};
use rand::Rng;

/// Genome representation for precision exploration
///
/// A genome is a flat sequence of binary genes that deterministically maps to
/// a butterfly-network phenotype. Gene `2u` picks the multiplier precision of
/// unit `u`, gene `2u + 1` its adder precision:
/// - `0` selects the 4-bit format
/// - `1` selects the 8-bit format
///
/// # Why a flat genome instead of the phenotype directly?
///
/// Genetic operators work best on simple, linear structures:
/// - **Crossover**: Swapping unit or stage blocks is array slicing
/// - **Mutation**: Flipping individual genes is straightforward
/// - **No invalid states**: Any binary genome of the right length decodes
///
/// Genomes are never edited in place once handed out; operators copy first.
///
/// # Conversion
///
/// Use `StructureModel::decode()` to convert Genome -> Phenotype
///
/// # Example
///
/// ```
/// use mixfft::engines::structure::StructureModel;
///
/// let model = StructureModel::build(4).unwrap();
/// let genome = vec![1, 0, 1, 0, 0, 0, 0, 1];
/// let phenotype = model.decode(&genome).unwrap();
/// assert_eq!(phenotype.num_stages(), 2);
/// ```
pub type Genome = Vec<Gene>;

/// Every gene set to `gene`
pub fn filled(length: usize, gene: Gene) -> Genome {
    vec![gene; length]
}

/// Each gene independently 0 or 1 with equal probability
pub fn uniform<R: Rng + ?Sized>(length: usize, rng: &mut R) -> Genome {
    (0..length).map(|_| rng.gen_range(GENE_LOW..=GENE_HIGH)).collect()
}

/// Each gene is low-precision with probability `low_probability`
pub fn biased<R: Rng + ?Sized>(length: usize, low_probability: f64, rng: &mut R) -> Genome {
    (0..length)
        .map(|_| {
            if rng.gen::<f64>() < low_probability {
                GENE_LOW
            } else {
                GENE_HIGH
            }
        })
        .collect()
}

/// Number of high-precision genes
pub fn high_count(genome: &[Gene]) -> usize {
    genome.iter().filter(|&&g| g == GENE_HIGH).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generators_stay_binary() {
        let mut rng = StdRng::seed_from_u64(7);
        let u = uniform(500, &mut rng);
        let b = biased(500, 0.7, &mut rng);
        assert!(u.iter().chain(b.iter()).all(|&g| g <= GENE_HIGH));
        assert_eq!(high_count(&filled(12, GENE_HIGH)), 12);
    }

    #[test]
    fn test_biased_respects_probability() {
        let mut rng = StdRng::seed_from_u64(11);
        let genome = biased(10_000, 0.7, &mut rng);
        let low_ratio = 1.0 - high_count(&genome) as f64 / genome.len() as f64;
        assert!((low_ratio - 0.7).abs() < 0.03, "low ratio {}", low_ratio);
    }
}
