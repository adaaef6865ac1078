pub mod icarus;
pub mod model;
pub mod process;
pub mod render;
pub mod vivado;

pub use icarus::IcarusSimulator;
pub use model::QuantizedModelSimulator;
pub use render::{Renderer, VerilogRenderer};
pub use vivado::VivadoSynthesizer;

use crate::config::{SimulationBackend, SynthesisBackend, ToolchainConfig};
use crate::engines::evaluation::fidelity::GoldenReference;
use crate::engines::structure::Phenotype;
use crate::types::{Fidelity, SynthesisMetrics};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Why an external collaborator could not produce a measurement
#[derive(Error, Debug)]
pub enum ToolFailure {
    #[error("failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} timed out after {seconds}s")]
    Timeout { tool: String, seconds: u64 },

    #[error("{tool} exited with status {code:?}: {stderr}")]
    NonZeroExit {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("could not parse {tool} output: {reason}")]
    Unparseable { tool: String, reason: String },

    #[error("metric '{0}' missing from report")]
    MissingMetric(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Inputs for one synthesis run
#[derive(Debug, Clone, Copy)]
pub struct SynthesisJob<'a> {
    pub design_name: &'a str,
    pub artifact: &'a Path,
    pub metrics_path: &'a Path,
    pub clock_period_ns: f64,
}

/// Inputs for one simulation run
#[derive(Debug, Clone, Copy)]
pub struct SimulationJob<'a> {
    pub design_name: &'a str,
    /// Top module declared in the artifact
    pub module_name: &'a str,
    pub artifact: &'a Path,
    pub phenotype: &'a Phenotype,
    pub reference: &'a GoldenReference,
}

/// Turns a rendered design into power and area figures
pub trait Synthesizer: Send + Sync {
    fn synthesize(&self, job: &SynthesisJob<'_>) -> Result<SynthesisMetrics, ToolFailure>;
}

/// Runs a rendered design against the golden reference
pub trait Simulator: Send + Sync {
    fn simulate(&self, job: &SimulationJob<'_>) -> Result<Fidelity, ToolFailure>;
}

pub fn synthesizer_from_config(config: &ToolchainConfig) -> Arc<dyn Synthesizer> {
    match config.synthesis {
        SynthesisBackend::Vivado => Arc::new(VivadoSynthesizer::from_config(config)),
    }
}

pub fn simulator_from_config(config: &ToolchainConfig) -> Arc<dyn Simulator> {
    match config.simulation {
        SimulationBackend::Icarus => Arc::new(IcarusSimulator::from_config(config)),
        SimulationBackend::Model => Arc::new(QuantizedModelSimulator),
    }
}
