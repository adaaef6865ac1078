use crate::data::cache::CacheStats;
use crate::engines::evaluation::objectives::is_feasible;
use crate::engines::evaluation::PopulationEvaluation;
use crate::engines::generation::diversity::PopulationDiversity;
use crate::engines::generation::genome::Genome;
use crate::engines::structure::PrecisionStatistics;
use crate::error::Result;
use crate::types::{ConstraintVector, EvaluationResult, Gene, GenomeDigest, ObjectiveVector};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything known about one freshly measured design
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionReport {
    pub design_name: String,
    pub size: usize,
    pub generation: usize,
    pub solution_id: usize,
    pub digest: GenomeDigest,
    pub genome: String,
    pub result: EvaluationResult,
    pub objectives: ObjectiveVector,
    pub constraints: ConstraintVector,
    pub statistics: PrecisionStatistics,
    pub timestamp: DateTime<Utc>,
}

/// Best solution found for one objective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestSolution {
    pub solution_id: usize,
    pub genome: String,
    pub objectives: ObjectiveVector,
    pub feasible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub size: usize,
    pub generation: usize,
    pub population_size: usize,
    pub feasible: usize,
    pub cache_hits: usize,
    pub cache: CacheStats,
    pub diversity: PopulationDiversity,
    pub best_power: Option<BestSolution>,
    pub best_area: Option<BestSolution>,
    pub best_performance: Option<BestSolution>,
    pub timestamp: DateTime<Utc>,
}

impl RunSummary {
    pub fn build(
        size: usize,
        population: &[Genome],
        evaluation: &PopulationEvaluation,
        cache: CacheStats,
    ) -> Self {
        let best = |objective: usize| -> Option<BestSolution> {
            evaluation
                .objectives
                .iter()
                .enumerate()
                .filter(|(_, o)| !o[objective].is_nan())
                .min_by(|(_, a), (_, b)| a[objective].total_cmp(&b[objective]))
                .map(|(i, o)| BestSolution {
                    solution_id: i,
                    genome: population.get(i).map(|g| genome_string(g)).unwrap_or_default(),
                    objectives: *o,
                    feasible: evaluation.constraints.get(i).map(is_feasible).unwrap_or(false),
                })
        };

        Self {
            size,
            generation: evaluation.generation,
            population_size: evaluation.len(),
            feasible: evaluation.feasible_count(),
            cache_hits: evaluation.cache_hits,
            cache,
            diversity: PopulationDiversity::analyze(population),
            best_power: best(0),
            best_area: best(1),
            best_performance: best(2),
            timestamp: Utc::now(),
        }
    }
}

/// Compact `0101...` rendering of a genome
pub fn genome_string(genome: &[Gene]) -> String {
    genome.iter().map(|g| char::from(b'0' + g)).collect()
}

pub fn write_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluation() -> PopulationEvaluation {
        PopulationEvaluation {
            generation: 0,
            digests: vec![GenomeDigest::of(&[0, 0]), GenomeDigest::of(&[1, 1])],
            results: vec![
                EvaluationResult { power: 0.2, area: 900, sqnr_db: 5.0, mae: 0.3 },
                EvaluationResult { power: 0.9, area: 400, sqnr_db: 30.0, mae: 0.01 },
            ],
            objectives: vec![[0.2, 900.0, 0.46], [0.9, 400.0, 0.04]],
            constraints: vec![[-2.8, -9100.0, 15.0], [-2.1, -9600.0, -10.0]],
            cache_hits: 1,
        }
    }

    #[test]
    fn test_summary_picks_best_per_objective() {
        let population = vec![vec![0, 0], vec![1, 1]];
        let summary = RunSummary::build(2, &population, &evaluation(), CacheStats::default());

        assert_eq!(summary.feasible, 1);
        assert_eq!(summary.best_power.as_ref().unwrap().solution_id, 0);
        assert!(!summary.best_power.as_ref().unwrap().feasible);
        assert_eq!(summary.best_area.as_ref().unwrap().genome, "11");
        assert!(summary.best_performance.unwrap().feasible);
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        let population = vec![vec![0, 0], vec![1, 1]];
        let summary = RunSummary::build(2, &population, &evaluation(), CacheStats::default());
        write_json(&path, &summary).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["population_size"], 2);
        assert_eq!(value["best_area"]["solution_id"], 1);
    }

    #[test]
    fn test_genome_string() {
        assert_eq!(genome_string(&[0, 1, 1, 0]), "0110");
    }
}
