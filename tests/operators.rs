use mixfft::config::EvolutionConfig;
use mixfft::engines::generation::{
    CrossoverKind, GenomeOperators, MutationKind, PopulationDiversity, RunContext,
    SamplingStrategy,
};
use mixfft::engines::structure::StructureModel;
use std::sync::Arc;

fn operators(size: usize, mutation: MutationKind, crossover: CrossoverKind) -> GenomeOperators {
    let config = EvolutionConfig {
        mutation,
        crossover,
        mutation_rate: 0.3,
        crossover_rate: 1.0,
        ..EvolutionConfig::default()
    };
    GenomeOperators::new(Arc::new(StructureModel::build(size).unwrap()), &config)
}

#[test]
fn test_offspring_stay_decodable_across_seeds() {
    for kind in [CrossoverKind::UnitTwoPoint, CrossoverKind::StageExchange] {
        for mutation in [MutationKind::Unit, MutationKind::Stage] {
            let ops = operators(32, mutation, kind);
            let structure = ops.structure().clone();

            for seed in 0..20 {
                let mut ctx = RunContext::seeded(seed, 50);
                let parents =
                    SamplingStrategy::Uniform.initial_population(&structure, 2, &mut ctx);
                let (c1, c2) = ops.crossover(&parents[0], &parents[1], &mut ctx).unwrap();

                // Crossover only moves genes between children at the same position
                for i in 0..structure.genome_length() {
                    assert_eq!(
                        c1[i] + c2[i],
                        parents[0][i] + parents[1][i],
                        "seed {} gene {}",
                        seed,
                        i
                    );
                }

                for child in [c1, c2] {
                    let mutated = ops.mutate(&child, &mut ctx).unwrap();
                    let phenotype = structure.decode(&mutated).unwrap();
                    assert_eq!(structure.encode(&phenotype).unwrap(), mutated);
                }
            }
        }
    }
}

#[test]
fn test_stage_exchange_swaps_whole_stages_only() {
    let ops = operators(16, MutationKind::Unit, CrossoverKind::StageExchange);
    let structure = ops.structure().clone();
    let low = vec![0u8; structure.genome_length()];
    let high = vec![1u8; structure.genome_length()];

    for seed in 0..10 {
        let mut ctx = RunContext::seeded(seed, 10);
        let (c1, c2) = ops.crossover(&low, &high, &mut ctx).unwrap();

        let swapped: Vec<usize> = (0..structure.num_stages())
            .filter(|&stage| structure.stage_genes(stage).all(|i| c1[i] == 1))
            .collect();
        assert_eq!(swapped.len(), 1, "seed {}", seed);
        assert_eq!(c1.iter().filter(|&&g| g == 1).count(), structure.genes_per_stage());
        assert_eq!(c2.iter().filter(|&&g| g == 0).count(), structure.genes_per_stage());
    }
}

#[test]
fn test_seeded_sampling_covers_both_extremes() {
    let structure = StructureModel::build(64).unwrap();
    let mut ctx = RunContext::seeded(11, 10);
    let population = SamplingStrategy::Seeded.initial_population(&structure, 40, &mut ctx);

    let diversity = PopulationDiversity::analyze(&population);
    assert_eq!(diversity.population_size, 40);
    assert_eq!(diversity.min_high_count, 0);
    assert_eq!(diversity.max_high_count, structure.genome_length());
    assert!(diversity.uniqueness() > 0.9);
}
