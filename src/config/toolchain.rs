use super::traits::{check_positive, ConfigSection};
use crate::error::MixfftError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisBackend {
    Vivado,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationBackend {
    Icarus,
    /// In-process quantized transform, no HDL simulator needed
    Model,
}

/// External tool locations and working directories
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    pub synthesis: SynthesisBackend,
    pub simulation: SimulationBackend,

    pub vivado_path: PathBuf,
    pub synthesis_script: PathBuf,
    pub fpga_part: String,
    pub clock_period_ns: f64,
    pub synthesis_timeout_secs: u64,

    pub iverilog_path: PathBuf,
    pub vvp_path: PathBuf,
    pub simulation_timeout_secs: u64,

    pub verilog_sources_dir: PathBuf,
    pub designs_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub simulation_dir: PathBuf,
    pub results_dir: PathBuf,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            synthesis: SynthesisBackend::Vivado,
            simulation: SimulationBackend::Icarus,
            vivado_path: PathBuf::from("/tools/Xilinx/Vivado/2023.2/bin/vivado"),
            synthesis_script: PathBuf::from("./vivado_synthesis.tcl"),
            fpga_part: "xc7z020clg484-1".to_string(),
            clock_period_ns: 10.0,
            synthesis_timeout_secs: 600,
            iverilog_path: PathBuf::from("iverilog"),
            vvp_path: PathBuf::from("vvp"),
            simulation_timeout_secs: 120,
            verilog_sources_dir: PathBuf::from("./verilog_sources"),
            designs_dir: PathBuf::from("./generated_designs"),
            reports_dir: PathBuf::from("./reports"),
            simulation_dir: PathBuf::from("./sim"),
            results_dir: PathBuf::from("./results"),
        }
    }
}

impl ToolchainConfig {
    /// Create every working directory
    pub fn initialize_directories(&self) -> Result<(), MixfftError> {
        for dir in [
            &self.verilog_sources_dir,
            &self.designs_dir,
            &self.reports_dir,
            &self.simulation_dir,
            &self.results_dir,
        ] {
            std::fs::create_dir_all(dir)?;
        }
        log::info!("Initialized directory structure");
        Ok(())
    }
}

impl ConfigSection for ToolchainConfig {
    fn section_name() -> &'static str {
        "toolchain"
    }

    fn validate(&self) -> Result<(), MixfftError> {
        check_positive("Clock period", self.clock_period_ns)?;
        if self.synthesis_timeout_secs == 0 || self.simulation_timeout_secs == 0 {
            return Err(MixfftError::Configuration(
                "Tool timeouts must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}
