use crate::engines::generation::genome::{high_count, Genome};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Spread of a population's precision choices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationDiversity {
    pub population_size: usize,
    pub mean_high_ratio: f64,
    pub std_high_ratio: f64,
    pub min_high_count: usize,
    pub max_high_count: usize,
    pub unique_genomes: usize,
}

impl PopulationDiversity {
    pub fn analyze(population: &[Genome]) -> Self {
        if population.is_empty() {
            return Self {
                population_size: 0,
                mean_high_ratio: 0.0,
                std_high_ratio: 0.0,
                min_high_count: 0,
                max_high_count: 0,
                unique_genomes: 0,
            };
        }

        let counts: Vec<usize> = population.iter().map(|g| high_count(g)).collect();
        let ratios: Vec<f64> = population
            .iter()
            .zip(&counts)
            .map(|(g, &c)| if g.is_empty() { 0.0 } else { c as f64 / g.len() as f64 })
            .collect();

        let n = ratios.len() as f64;
        let mean = ratios.iter().sum::<f64>() / n;
        let variance = ratios.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

        let unique: HashSet<&Genome> = population.iter().collect();

        Self {
            population_size: population.len(),
            mean_high_ratio: mean,
            std_high_ratio: variance.sqrt(),
            min_high_count: counts.iter().copied().min().unwrap_or(0),
            max_high_count: counts.iter().copied().max().unwrap_or(0),
            unique_genomes: unique.len(),
        }
    }

    /// Fraction of distinct genomes
    pub fn uniqueness(&self) -> f64 {
        if self.population_size == 0 {
            0.0
        } else {
            self.unique_genomes as f64 / self.population_size as f64
        }
    }
}
