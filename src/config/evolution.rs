use super::traits::{check_probability, ConfigSection};
use crate::engines::generation::operators::{CrossoverKind, MutationKind};
use crate::engines::generation::sampling::SamplingStrategy;
use crate::error::MixfftError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub num_generations: usize,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    pub mutation: MutationKind,
    pub crossover: CrossoverKind,
    /// Linearly decay the unit mutation rate to zero over `num_generations`
    pub anneal_mutation: bool,
    pub sampling: SamplingStrategy,
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 30,
            num_generations: 100,
            mutation_rate: 0.05,
            crossover_rate: 0.9,
            mutation: MutationKind::Unit,
            crossover: CrossoverKind::StageExchange,
            anneal_mutation: true,
            sampling: SamplingStrategy::Seeded,
            seed: Some(42),
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), MixfftError> {
        if self.population_size == 0 {
            return Err(MixfftError::Configuration(
                "Population size must be at least 1".to_string(),
            ));
        }
        if self.num_generations == 0 {
            return Err(MixfftError::Configuration(
                "Number of generations must be at least 1".to_string(),
            ));
        }
        check_probability("Mutation rate", self.mutation_rate)?;
        check_probability("Crossover rate", self.crossover_rate)?;
        Ok(())
    }
}
