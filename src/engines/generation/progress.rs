use crate::types::{ObjectiveMatrix, ObjectiveVector};
use serde::{Deserialize, Serialize};

/// Hooks fired around each population evaluation
pub trait GenerationObserver: Send {
    fn on_generation_start(&mut self, generation: usize, population_size: usize);
    fn on_generation_complete(&mut self, generation: usize, objectives: &ObjectiveMatrix, cache_hits: usize);
    fn on_solution_evaluated(&mut self, solution: usize, total: usize);
}

pub struct LoggingObserver;

impl GenerationObserver for LoggingObserver {
    fn on_generation_start(&mut self, generation: usize, population_size: usize) {
        log::info!("Generation {} starting ({} solutions)...", generation + 1, population_size);
    }

    fn on_generation_complete(&mut self, generation: usize, objectives: &ObjectiveMatrix, cache_hits: usize) {
        let best = best_per_objective(objectives);
        log::info!(
            "Generation {} complete. Best power: {:.4}, best area: {:.0}, best error: {:.4}, cache hits: {}",
            generation + 1,
            best[0],
            best[1],
            best[2],
            cache_hits
        );
    }

    fn on_solution_evaluated(&mut self, solution: usize, total: usize) {
        if solution % 10 == 0 || solution == total {
            log::info!("  Evaluated {}/{} solutions", solution, total);
        }
    }
}

/// Observer that ignores everything
pub struct SilentObserver;

impl GenerationObserver for SilentObserver {
    fn on_generation_start(&mut self, _generation: usize, _population_size: usize) {}
    fn on_generation_complete(&mut self, _generation: usize, _objectives: &ObjectiveMatrix, _cache_hits: usize) {}
    fn on_solution_evaluated(&mut self, _solution: usize, _total: usize) {}
}

/// Column-wise minimum of an objective matrix; `+inf` where empty
pub fn best_per_objective(objectives: &ObjectiveMatrix) -> ObjectiveVector {
    objectives.iter().fold([f64::INFINITY; 3], |mut best, row| {
        for (b, &v) in best.iter_mut().zip(row) {
            *b = b.min(v);
        }
        best
    })
}

/// One objective matrix per evaluated generation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvolutionHistory {
    pub generations: Vec<ObjectiveMatrix>,
}

impl EvolutionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, objectives: ObjectiveMatrix) {
        self.generations.push(objectives);
    }

    pub fn len(&self) -> usize {
        self.generations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    /// Best value of each objective per generation
    pub fn best_per_generation(&self) -> Vec<ObjectiveVector> {
        self.generations.iter().map(best_per_objective).collect()
    }
}
