use anyhow::Context;
use clap::Parser;
use mixfft::config::ConfigManager;
use mixfft::data::{write_json, InMemoryResultCache, ResultCache, RunSummary};
use mixfft::engines::evaluation::EvaluationPipeline;
use mixfft::engines::generation::{MixedPrecisionProblem, RunContext};
use mixfft::engines::structure::StructureModel;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "mixfft",
    version,
    about = "Mixed-precision FFT design-space explorer"
)]
struct Cli {
    /// TOML configuration file (built-in defaults when omitted)
    config: Option<PathBuf>,
    /// Write the effective configuration to this path and exit
    #[arg(long, value_name = "PATH")]
    save_config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let manager = ConfigManager::new();
    if let Some(path) = &cli.config {
        manager
            .load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?;
    }
    if let Some(path) = &cli.save_config {
        manager.save_to_file(path)?;
        log::info!("Wrote configuration to {}", path.display());
        return Ok(());
    }
    let config = manager.get();

    config.toolchain.initialize_directories()?;
    let structure = Arc::new(StructureModel::build(config.evaluation.size)?);
    log::info!(
        "FFT-{}: {} stages x {} units, {} genes",
        structure.size(),
        structure.num_stages(),
        structure.units_per_stage(),
        structure.genome_length()
    );

    let cache: Arc<dyn ResultCache> = Arc::new(InMemoryResultCache::from_capacity(
        config.evaluation.cache_capacity,
    ));
    let context = RunContext::new(
        config.evolution.seed,
        config.evolution.num_generations,
        Arc::clone(&cache),
    );
    let pipeline = EvaluationPipeline::from_config(Arc::clone(&structure), &config)?;
    let mut problem = MixedPrecisionProblem::new(&config.evolution, pipeline, context);

    let population = problem.sample(config.evolution.population_size);
    let evaluation = problem.evaluate_detailed(&population)?;
    let summary = RunSummary::build(structure.size(), &population, &evaluation, cache.stats());

    let results_dir = &config.toolchain.results_dir;
    let size = structure.size();
    write_json(
        results_dir.join(format!("objectives_fft{}.json", size)),
        &evaluation.objectives,
    )?;
    write_json(
        results_dir.join(format!("constraints_fft{}.json", size)),
        &evaluation.constraints,
    )?;
    write_json(
        results_dir.join(format!("history_fft{}.json", size)),
        problem.history(),
    )?;
    write_json(results_dir.join(format!("summary_fft{}.json", size)), &summary)?;

    log::info!(
        "Evaluated {} solutions, {} feasible. Results in {}",
        evaluation.len(),
        summary.feasible,
        results_dir.display()
    );
    Ok(())
}
