use mixfft::config::{EvaluationConfig, EvolutionConfig, ToolchainConfig};
use mixfft::data::{InMemoryResultCache, ResultCache};
use mixfft::engines::evaluation::objectives::{is_feasible, SENTINEL_MAE, SENTINEL_SQNR_DB};
use mixfft::engines::evaluation::EvaluationPipeline;
use mixfft::engines::generation::{
    MixedPrecisionProblem, RunContext, SamplingStrategy, SilentObserver,
};
use mixfft::engines::structure::StructureModel;
use mixfft::error::MixfftError;
use mixfft::toolchain::{
    QuantizedModelSimulator, SimulationJob, Simulator, SynthesisJob, Synthesizer, ToolFailure,
    VerilogRenderer,
};
use mixfft::types::{Fidelity, GenomeDigest, SynthesisMetrics};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Fixed synthesis figures; fails for designs with no low-precision multiplier
#[derive(Default)]
struct StubSynthesizer {
    calls: AtomicUsize,
}

impl Synthesizer for StubSynthesizer {
    fn synthesize(&self, job: &SynthesisJob<'_>) -> Result<SynthesisMetrics, ToolFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = std::fs::read_to_string(job.artifact)?;
        if !text.contains("MULT_PRECISION(0)") {
            return Err(ToolFailure::Timeout {
                tool: "stub".to_string(),
                seconds: 600,
            });
        }
        Ok(SynthesisMetrics {
            power: 0.5,
            area: 1000,
        })
    }
}

/// Fixed fidelity; fails when the first unit multiplies at high precision
#[derive(Default)]
struct StubSimulator {
    calls: AtomicUsize,
}

impl Simulator for StubSimulator {
    fn simulate(&self, job: &SimulationJob<'_>) -> Result<Fidelity, ToolFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let first = job.phenotype.units().next().map(|u| u.primary.gene());
        if first == Some(1) {
            return Err(ToolFailure::Unparseable {
                tool: "stub".to_string(),
                reason: "no output".to_string(),
            });
        }
        Ok(Fidelity {
            sqnr_db: 25.0,
            mae: 0.01,
        })
    }
}

struct Harness {
    _dir: TempDir,
    pipeline: EvaluationPipeline,
    synth: Arc<StubSynthesizer>,
    sim: Arc<StubSimulator>,
}

fn harness(size: usize, workers: usize) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let toolchain = ToolchainConfig {
        designs_dir: dir.path().join("designs"),
        reports_dir: dir.path().join("reports"),
        ..ToolchainConfig::default()
    };
    let evaluation = EvaluationConfig {
        size,
        workers,
        stimulus_vectors: 4,
        ..EvaluationConfig::default()
    };
    let synth = Arc::new(StubSynthesizer::default());
    let sim = Arc::new(StubSimulator::default());
    let pipeline = EvaluationPipeline::new(
        Arc::new(StructureModel::build(size).unwrap()),
        &evaluation,
        &toolchain,
        Arc::new(VerilogRenderer::new()),
        synth.clone(),
        sim.clone(),
    )
    .unwrap();

    Harness {
        _dir: dir,
        pipeline,
        synth,
        sim,
    }
}

#[test]
fn test_size_8_end_to_end_with_stubs() {
    let h = harness(8, 2);
    let ctx = RunContext::seeded(42, 10);

    let evaluation = h.pipeline.evaluate(&[vec![0; 24]], &ctx).unwrap();
    let (objectives, constraints) = evaluation.into_matrices();

    assert_eq!(objectives.len(), 1);
    assert_eq!(objectives[0][0], 0.5);
    assert_eq!(objectives[0][1], 1000.0);
    assert!((objectives[0][2] - (1.0 / 26.0 + 0.01)).abs() < 1e-12);
    assert_eq!(constraints[0], [-2.5, -9000.0, -5.0]);
    assert!(is_feasible(&constraints[0]));
}

#[test]
fn test_identical_genomes_measured_once() {
    let h = harness(8, 4);
    let ctx = RunContext::seeded(42, 10);
    let genome = vec![0u8; 24];
    let mut other = genome.clone();
    other[23] = 1;

    let first = h
        .pipeline
        .evaluate(&[genome.clone(), genome.clone(), other.clone()], &ctx)
        .unwrap();
    assert_eq!(h.synth.calls.load(Ordering::SeqCst), 2);
    assert_eq!(h.sim.calls.load(Ordering::SeqCst), 2);
    assert_eq!(first.cache_hits, 1);
    assert_eq!(first.results[0], first.results[1]);

    let second = h.pipeline.evaluate(&[other, genome], &ctx).unwrap();
    assert_eq!(h.synth.calls.load(Ordering::SeqCst), 2);
    assert_eq!(h.sim.calls.load(Ordering::SeqCst), 2);
    assert_eq!(second.cache_hits, 2);
    assert_eq!(second.generation, 1);
    assert_eq!(ctx.cache().len(), 2);
}

#[test]
fn test_failing_genome_gets_sentinels_and_siblings_survive() {
    let h = harness(8, 3);
    let ctx = RunContext::seeded(42, 10);
    // Every second adder at high precision, all multipliers low
    let mixed: Vec<u8> = (0..24).map(|i| (i % 4 == 3) as u8).collect();
    let population = vec![vec![0; 24], vec![1; 24], mixed];

    let evaluation = h.pipeline.evaluate(&population, &ctx).unwrap();

    let failed = evaluation.results[1];
    assert_eq!(failed.power, 6.0);
    assert_eq!(failed.area, 20_000);
    assert_eq!(failed.sqnr_db, SENTINEL_SQNR_DB);
    assert_eq!(failed.mae, SENTINEL_MAE);
    assert!(evaluation.constraints[1].iter().all(|&c| c > 0.0));

    for i in [0, 2] {
        assert_eq!(evaluation.results[i].power, 0.5);
        assert_eq!(evaluation.results[i].sqnr_db, 25.0);
        assert!(is_feasible(&evaluation.constraints[i]));
    }
    assert_eq!(evaluation.feasible_count(), 2);
}

#[test]
fn test_partial_failure_keeps_the_other_measurement() {
    let h = harness(4, 1);
    let ctx = RunContext::seeded(1, 10);
    // First unit multiplies at high precision, the rest are low: synthesis
    // succeeds, simulation fails
    let genome = vec![1, 0, 0, 0, 0, 0, 0, 0];

    let evaluation = h.pipeline.evaluate(&[genome], &ctx).unwrap();
    let result = evaluation.results[0];
    assert_eq!(result.power, 0.5);
    assert_eq!(result.area, 1000);
    assert_eq!(result.sqnr_db, SENTINEL_SQNR_DB);
    assert_eq!(result.mae, SENTINEL_MAE);
}

#[test]
fn test_results_are_index_stable() {
    let h = harness(16, 4);
    let mut ctx = RunContext::seeded(7, 10);
    let structure = StructureModel::build(16).unwrap();
    let population = SamplingStrategy::Seeded.initial_population(&structure, 24, &mut ctx);

    let evaluation = h.pipeline.evaluate(&population, &ctx).unwrap();
    assert_eq!(evaluation.len(), population.len());
    for (i, genome) in population.iter().enumerate() {
        assert_eq!(evaluation.digests[i], GenomeDigest::of(genome));
        let simulation_failed = evaluation.results[i].sqnr_db == SENTINEL_SQNR_DB;
        assert_eq!(simulation_failed, genome[0] == 1, "solution {}", i);
    }
}

#[test]
fn test_malformed_genome_is_a_hard_error() {
    let h = harness(8, 2);
    let ctx = RunContext::seeded(42, 10);
    let result = h.pipeline.evaluate(&[vec![0; 24], vec![0; 23]], &ctx);

    assert!(matches!(
        result,
        Err(MixfftError::MalformedGenome { expected: 24, actual: 23 })
    ));
    assert_eq!(h.synth.calls.load(Ordering::SeqCst), 0);
    // The rejected call does not consume a generation number
    assert_eq!(ctx.generation(), 0);
}

#[test]
fn test_problem_drives_a_short_run() {
    let dir = tempfile::tempdir().unwrap();
    let toolchain = ToolchainConfig {
        designs_dir: dir.path().join("designs"),
        reports_dir: dir.path().join("reports"),
        ..ToolchainConfig::default()
    };
    let evaluation = EvaluationConfig {
        size: 8,
        workers: 2,
        stimulus_vectors: 8,
        save_reports: true,
        ..EvaluationConfig::default()
    };
    let evolution = EvolutionConfig {
        population_size: 10,
        num_generations: 3,
        ..EvolutionConfig::default()
    };
    let synth = Arc::new(StubSynthesizer::default());
    let pipeline = EvaluationPipeline::new(
        Arc::new(StructureModel::build(8).unwrap()),
        &evaluation,
        &toolchain,
        Arc::new(VerilogRenderer::new()),
        synth.clone(),
        Arc::new(QuantizedModelSimulator),
    )
    .unwrap();
    let cache: Arc<dyn ResultCache> = Arc::new(InMemoryResultCache::unbounded());
    let context = RunContext::new(Some(3), evolution.num_generations, Arc::clone(&cache));
    let mut problem = MixedPrecisionProblem::new(&evolution, pipeline, context)
        .with_observer(Box::new(SilentObserver));

    assert_eq!(problem.num_variables(), 24);
    assert_eq!(problem.num_objectives(), 3);
    assert_eq!(problem.num_constraints(), 3);
    let (lower, upper) = problem.bounds();
    assert!(lower.iter().all(|&g| g == 0) && upper.iter().all(|&g| g == 1));

    let mut population = problem.sample(evolution.population_size);
    for _ in 0..evolution.num_generations {
        let (objectives, constraints) = problem.evaluate(&population).unwrap();
        assert_eq!(objectives.len(), population.len());
        assert_eq!(constraints.len(), population.len());

        let matings: Vec<_> = population
            .chunks(2)
            .filter(|pair| pair.len() == 2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect();
        let offspring = problem.crossover(&matings).unwrap();
        population = problem.mutate(&offspring).unwrap();
    }

    assert_eq!(problem.history().len(), 3);
    assert_eq!(problem.context().generation(), 3);
    // Never more measurements than distinct genomes
    assert!(synth.calls.load(Ordering::SeqCst) <= cache.len());
    let reports = std::fs::read_dir(dir.path().join("reports"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with("_result.json"))
        .count();
    assert_eq!(reports, cache.len());
}
