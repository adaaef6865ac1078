use crate::engines::generation::context::RunContext;
use crate::engines::generation::genome::{self, Genome};
use crate::engines::structure::StructureModel;
use crate::types::{Gene, GENE_HIGH, GENE_LOW};
use serde::{Deserialize, Serialize};

/// How the first generation is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingStrategy {
    /// Canonical designs first, then uniformly random fill
    Seeded,
    /// Uniformly random genomes only
    Uniform,
}

impl SamplingStrategy {
    pub fn initial_population(
        &self,
        structure: &StructureModel,
        pop_size: usize,
        ctx: &mut RunContext,
    ) -> Vec<Genome> {
        let length = structure.genome_length();
        let mut population = match self {
            SamplingStrategy::Seeded => canonical_genomes(structure, ctx),
            SamplingStrategy::Uniform => Vec::new(),
        };
        population.truncate(pop_size);

        while population.len() < pop_size {
            population.push(genome::uniform(length, ctx.rng()));
        }

        log::debug!(
            "Sampled {} genomes of length {} ({:?})",
            population.len(),
            length,
            self
        );
        population
    }
}

/// Hand-picked starting points, in order:
/// 1. all low precision
/// 2. all high precision
/// 3. low in the first half of the stages, high in the rest
/// 4. the inverse of 3
/// 5. high multipliers, low adders
/// 6. low multipliers, high adders
/// 7. random, 70% low
/// 8. random, 30% low
pub fn canonical_genomes(structure: &StructureModel, ctx: &mut RunContext) -> Vec<Genome> {
    let length = structure.genome_length();
    let half = structure.num_stages() / 2;

    let by_stage = |early: Gene, late: Gene| -> Genome {
        (0..structure.num_stages())
            .flat_map(|stage| {
                let gene = if stage >= half { late } else { early };
                std::iter::repeat(gene).take(structure.genes_per_stage())
            })
            .collect()
    };
    let by_role = |primary: Gene, secondary: Gene| -> Genome {
        (0..structure.total_units())
            .flat_map(|_| [primary, secondary])
            .collect()
    };

    let mut genomes = vec![
        genome::filled(length, GENE_LOW),
        genome::filled(length, GENE_HIGH),
        by_stage(GENE_LOW, GENE_HIGH),
        by_stage(GENE_HIGH, GENE_LOW),
        by_role(GENE_HIGH, GENE_LOW),
        by_role(GENE_LOW, GENE_HIGH),
    ];
    for low_probability in [0.7, 0.3] {
        genomes.push(genome::biased(length, low_probability, ctx.rng()));
    }
    genomes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order_for_size_4() {
        let structure = StructureModel::build(4).unwrap();
        let mut ctx = RunContext::seeded(42, 10);
        let population = SamplingStrategy::Seeded.initial_population(&structure, 6, &mut ctx);

        assert_eq!(population.len(), 6);
        assert_eq!(population[0], vec![0; 8]);
        assert_eq!(population[1], vec![1; 8]);
        assert_eq!(population[2], vec![0, 0, 0, 0, 1, 1, 1, 1]);
        assert_eq!(population[3], vec![1, 1, 1, 1, 0, 0, 0, 0]);
        assert_eq!(population[4], vec![1, 0, 1, 0, 1, 0, 1, 0]);
        assert_eq!(population[5], vec![0, 1, 0, 1, 0, 1, 0, 1]);
    }

    #[test]
    fn test_truncated_below_canonical_count() {
        let structure = StructureModel::build(8).unwrap();
        let mut ctx = RunContext::seeded(42, 10);
        let population = SamplingStrategy::Seeded.initial_population(&structure, 3, &mut ctx);
        assert_eq!(population.len(), 3);
        assert_eq!(population[2].len(), structure.genome_length());
    }

    #[test]
    fn test_random_fill_is_valid_and_reproducible() {
        let structure = StructureModel::build(16).unwrap();
        let a = SamplingStrategy::Seeded.initial_population(&structure, 30, &mut RunContext::seeded(42, 10));
        let b = SamplingStrategy::Seeded.initial_population(&structure, 30, &mut RunContext::seeded(42, 10));

        assert_eq!(a.len(), 30);
        assert_eq!(a, b);
        for genome in &a {
            assert!(structure.validate(genome).is_ok());
        }
    }

    #[test]
    fn test_uniform_strategy() {
        let structure = StructureModel::build(8).unwrap();
        let mut ctx = RunContext::seeded(1, 10);
        let population = SamplingStrategy::Uniform.initial_population(&structure, 5, &mut ctx);
        assert_eq!(population.len(), 5);
        assert!(population.iter().all(|g| structure.validate(g).is_ok()));
    }

    #[test]
    fn test_progressive_for_size_2() {
        // One stage: half == 0 so the only stage counts as "late"
        let structure = StructureModel::build(2).unwrap();
        let mut ctx = RunContext::seeded(1, 10);
        let genomes = canonical_genomes(&structure, &mut ctx);
        assert_eq!(genomes[2], vec![1, 1]);
        assert_eq!(genomes[3], vec![0, 0]);
    }
}
