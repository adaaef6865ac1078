use super::fidelity::{GoldenReference, StimulusSet};
use super::objectives::{self, combine, sentinel_fidelity, sentinel_synthesis};
use crate::config::{AppConfig, ConstraintLimits, EvaluationConfig, ObjectiveWeights, ToolchainConfig};
use crate::data::cache::ResultCache;
use crate::data::reports::{genome_string, write_json, SolutionReport};
use crate::engines::generation::context::RunContext;
use crate::engines::generation::genome::Genome;
use crate::engines::generation::progress::GenerationObserver;
use crate::engines::structure::{Phenotype, PrecisionStatistics, StructureModel};
use crate::error::Result;
use crate::toolchain::{
    simulator_from_config, synthesizer_from_config, Renderer, SimulationJob, Simulator, SynthesisJob,
    Synthesizer, VerilogRenderer,
};
use crate::types::{ConstraintMatrix, EvaluationResult, Gene, GenomeDigest, ObjectiveMatrix};
use chrono::Utc;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Shared handle for an observer called from evaluation tasks
pub type SharedObserver = Mutex<Box<dyn GenerationObserver>>;

/// Everything measured for one population, in population order
#[derive(Debug, Clone)]
pub struct PopulationEvaluation {
    pub generation: usize,
    pub digests: Vec<GenomeDigest>,
    pub results: Vec<EvaluationResult>,
    pub objectives: ObjectiveMatrix,
    pub constraints: ConstraintMatrix,
    pub cache_hits: usize,
}

impl PopulationEvaluation {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn feasible_count(&self) -> usize {
        self.constraints.iter().filter(|c| objectives::is_feasible(c)).count()
    }

    pub fn into_matrices(self) -> (ObjectiveMatrix, ConstraintMatrix) {
        (self.objectives, self.constraints)
    }
}

struct Outcome {
    result: EvaluationResult,
    cache_hit: bool,
}

/// Turns a population into objective and constraint matrices.
///
/// One task per genome runs on a bounded pool: digest, cache lookup, render,
/// synthesis, simulation. Tool failures are absorbed into sentinel values so a
/// single bad design never aborts the batch.
pub struct EvaluationPipeline {
    structure: Arc<StructureModel>,
    renderer: Arc<dyn Renderer>,
    synthesizer: Arc<dyn Synthesizer>,
    simulator: Arc<dyn Simulator>,
    reference: Arc<GoldenReference>,
    weights: ObjectiveWeights,
    limits: ConstraintLimits,
    designs_dir: PathBuf,
    reports_dir: PathBuf,
    clock_period_ns: f64,
    save_reports: bool,
    pool: rayon::ThreadPool,
}

impl EvaluationPipeline {
    pub fn new(
        structure: Arc<StructureModel>,
        evaluation: &EvaluationConfig,
        toolchain: &ToolchainConfig,
        renderer: Arc<dyn Renderer>,
        synthesizer: Arc<dyn Synthesizer>,
        simulator: Arc<dyn Simulator>,
    ) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(evaluation.workers)
            .thread_name(|i| format!("mixfft-eval-{}", i))
            .build()?;

        std::fs::create_dir_all(&toolchain.designs_dir)?;
        std::fs::create_dir_all(&toolchain.reports_dir)?;

        let stimuli = StimulusSet::generate(
            structure.size(),
            evaluation.stimulus_vectors,
            evaluation.stimulus_seed,
        );
        log::info!(
            "Golden reference: {} vectors of {} points",
            stimuli.len(),
            structure.size()
        );

        Ok(Self {
            structure,
            renderer,
            synthesizer,
            simulator,
            reference: Arc::new(GoldenReference::compute(stimuli)),
            weights: evaluation.weights,
            limits: evaluation.limits,
            designs_dir: toolchain.designs_dir.clone(),
            reports_dir: toolchain.reports_dir.clone(),
            clock_period_ns: toolchain.clock_period_ns,
            save_reports: evaluation.save_reports,
            pool,
        })
    }

    /// Pipeline wired to the configured production collaborators
    pub fn from_config(structure: Arc<StructureModel>, config: &AppConfig) -> Result<Self> {
        Self::new(
            structure,
            &config.evaluation,
            &config.toolchain,
            Arc::new(VerilogRenderer::new()),
            synthesizer_from_config(&config.toolchain),
            simulator_from_config(&config.toolchain),
        )
    }

    pub fn structure(&self) -> &StructureModel {
        &self.structure
    }

    pub fn reference(&self) -> &GoldenReference {
        &self.reference
    }

    pub fn evaluate(&self, population: &[Genome], ctx: &RunContext) -> Result<PopulationEvaluation> {
        self.evaluate_observed(population, ctx, None)
    }

    /// Evaluate a population; malformed genomes fail the whole call before
    /// any work is dispatched.
    ///
    /// Repeated genomes within one population are measured once; later
    /// copies count as cache hits.
    pub fn evaluate_observed(
        &self,
        population: &[Genome],
        ctx: &RunContext,
        observer: Option<&SharedObserver>,
    ) -> Result<PopulationEvaluation> {
        let phenotypes: Vec<Phenotype> = population
            .iter()
            .map(|genome| self.structure.decode(genome))
            .collect::<Result<_>>()?;
        let digests: Vec<GenomeDigest> = population.iter().map(|g| GenomeDigest::of(g)).collect();

        // unique[slot[i]] is the first index holding the same genome as i
        let mut unique: Vec<usize> = Vec::new();
        let mut seen: HashMap<&GenomeDigest, usize> = HashMap::new();
        let slot: Vec<usize> = digests
            .iter()
            .enumerate()
            .map(|(i, digest)| {
                *seen.entry(digest).or_insert_with(|| {
                    unique.push(i);
                    unique.len() - 1
                })
            })
            .collect();

        let generation = ctx.begin_generation();
        let cache = Arc::clone(ctx.cache());
        let total = unique.len();
        let completed = AtomicUsize::new(0);

        let measured: Vec<Outcome> = self.pool.install(|| {
            unique
                .par_iter()
                .map(|&index| {
                    let outcome = self.evaluate_one(
                        index,
                        generation,
                        &population[index],
                        &digests[index],
                        &phenotypes[index],
                        cache.as_ref(),
                    );

                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(observer) = observer {
                        observer
                            .lock()
                            .unwrap_or_else(|e| e.into_inner())
                            .on_solution_evaluated(done, total);
                    }
                    outcome
                })
                .collect()
        });

        let results: Vec<EvaluationResult> = slot.iter().map(|&s| measured[s].result).collect();
        let cache_hits = slot
            .iter()
            .enumerate()
            .filter(|&(i, &s)| unique[s] != i || measured[s].cache_hit)
            .count();
        let objectives = results
            .iter()
            .map(|r| objectives::objectives(r, &self.weights))
            .collect();
        let constraints = results
            .iter()
            .map(|r| objectives::constraints(r, &self.limits))
            .collect();

        log::debug!(
            "Generation {}: {} solutions ({} distinct), {} cache hits",
            generation,
            population.len(),
            total,
            cache_hits
        );

        Ok(PopulationEvaluation {
            generation,
            digests,
            results,
            objectives,
            constraints,
            cache_hits,
        })
    }

    fn evaluate_one(
        &self,
        index: usize,
        generation: usize,
        genome: &[Gene],
        digest: &GenomeDigest,
        phenotype: &Phenotype,
        cache: &dyn ResultCache,
    ) -> Outcome {
        if let Some(result) = cache.get(digest) {
            log::debug!("Solution {} ({}) found in cache", index, digest.short());
            return Outcome {
                result,
                cache_hit: true,
            };
        }

        let design_name = format!("fft_{}_sol{}_gen{}", self.structure.size(), index, generation);
        let result = self.measure(&design_name, digest, phenotype);
        cache.put(digest.clone(), result);

        let stats = PrecisionStatistics::of(phenotype);
        log::info!(
            "Solution {}: Power={:.4}W, Area={} LUTs, SQNR={:.2}dB, MAE={:.6} | {}",
            index,
            result.power,
            result.area,
            result.sqnr_db,
            result.mae,
            stats.summary()
        );

        if self.save_reports {
            let report = SolutionReport {
                design_name: design_name.clone(),
                size: self.structure.size(),
                generation,
                solution_id: index,
                digest: digest.clone(),
                genome: genome_string(genome),
                result,
                objectives: objectives::objectives(&result, &self.weights),
                constraints: objectives::constraints(&result, &self.limits),
                statistics: stats,
                timestamp: Utc::now(),
            };
            let path = self.reports_dir.join(format!("{}_result.json", design_name));
            if let Err(e) = write_json(&path, &report) {
                log::warn!("Could not save report for {}: {}", design_name, e);
            }
        }

        Outcome {
            result,
            cache_hit: false,
        }
    }

    /// Render, synthesize and simulate one design, substituting sentinels for
    /// whichever stage fails.
    fn measure(&self, design_name: &str, digest: &GenomeDigest, phenotype: &Phenotype) -> EvaluationResult {
        let artifact = self
            .designs_dir
            .join(format!("{}.{}", design_name, self.renderer.extension()));

        if let Err(e) = std::fs::write(&artifact, self.renderer.render(phenotype)) {
            log::error!(
                "[{}] Could not write {}: {}",
                digest.short(),
                artifact.display(),
                e
            );
            return objectives::sentinel_result(&self.limits);
        }

        let metrics_path = self.reports_dir.join(format!("{}_metrics.csv", design_name));
        let synthesis = self
            .synthesizer
            .synthesize(&SynthesisJob {
                design_name,
                artifact: &artifact,
                metrics_path: &metrics_path,
                clock_period_ns: self.clock_period_ns,
            })
            .unwrap_or_else(|e| {
                log::error!("[{}] Synthesis failed for {}: {}", digest.short(), design_name, e);
                sentinel_synthesis(&self.limits)
            });

        let module_name = self.renderer.module_name(phenotype);
        let fidelity = self
            .simulator
            .simulate(&SimulationJob {
                design_name,
                module_name: &module_name,
                artifact: &artifact,
                phenotype,
                reference: &self.reference,
            })
            .unwrap_or_else(|e| {
                log::error!("[{}] Simulation failed for {}: {}", digest.short(), design_name, e);
                sentinel_fidelity()
            });

        combine(synthesis, fidelity)
    }
}
