use super::process::run_with_timeout;
use super::{SynthesisJob, Synthesizer, ToolFailure};
use crate::config::ToolchainConfig;
use crate::types::SynthesisMetrics;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

const TOOL: &str = "vivado";
pub const POWER_METRIC: &str = "total_power_w";
pub const AREA_METRIC: &str = "lut_count";

/// Batch-mode Vivado run driven by a TCL script.
///
/// The script receives `<artifact> <metrics.csv> <clock_ns> <part>` and must
/// write a `Metric,Value` CSV containing at least total power and LUT count.
#[derive(Debug, Clone)]
pub struct VivadoSynthesizer {
    vivado_path: PathBuf,
    script: PathBuf,
    part: String,
    timeout: Duration,
}

impl VivadoSynthesizer {
    pub fn from_config(config: &ToolchainConfig) -> Self {
        Self {
            vivado_path: config.vivado_path.clone(),
            script: config.synthesis_script.clone(),
            part: config.fpga_part.clone(),
            timeout: Duration::from_secs(config.synthesis_timeout_secs),
        }
    }
}

impl Synthesizer for VivadoSynthesizer {
    fn synthesize(&self, job: &SynthesisJob<'_>) -> Result<SynthesisMetrics, ToolFailure> {
        log::debug!("Running Vivado synthesis for {}", job.design_name);

        // A stale report from an earlier run must not be mistaken for this one
        if job.metrics_path.exists() {
            std::fs::remove_file(job.metrics_path)?;
        }

        let mut cmd = Command::new(&self.vivado_path);
        cmd.arg("-mode")
            .arg("batch")
            .arg("-source")
            .arg(&self.script)
            .arg("-tclargs")
            .arg(job.artifact)
            .arg(job.metrics_path)
            .arg(job.clock_period_ns.to_string())
            .arg(&self.part);

        let output = run_with_timeout(cmd, TOOL, self.timeout)?;
        log::debug!(
            "Vivado finished {} in {:.1}s",
            job.design_name,
            output.elapsed.as_secs_f64()
        );

        read_metrics_csv(job.metrics_path)
    }
}

pub fn read_metrics_csv(path: &Path) -> Result<SynthesisMetrics, ToolFailure> {
    let text = std::fs::read_to_string(path)?;
    parse_metrics_csv(&text)
}

#[derive(Debug, Deserialize)]
struct MetricRow {
    #[serde(rename = "Metric")]
    metric: String,
    #[serde(rename = "Value")]
    value: String,
}

/// Parse a `Metric,Value` table. Both metrics must be present and numeric.
pub fn parse_metrics_csv(text: &str) -> Result<SynthesisMetrics, ToolFailure> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers().map_err(csv_failure)?;
    for column in ["Metric", "Value"] {
        if !headers.iter().any(|h| h == column) {
            return Err(unparseable(&format!("missing '{}' column", column)));
        }
    }

    let mut power = None;
    let mut area = None;

    for row in reader.deserialize::<MetricRow>() {
        let row = row.map_err(csv_failure)?;
        let value = row.value.as_str();

        match row.metric.as_str() {
            POWER_METRIC => {
                let parsed: f64 = value
                    .parse()
                    .map_err(|_| unparseable(&format!("bad power value '{}'", value)))?;
                if !parsed.is_finite() || parsed < 0.0 {
                    return Err(unparseable(&format!("power out of range: {}", parsed)));
                }
                power = Some(parsed);
            }
            AREA_METRIC => {
                // Reports occasionally print counts as floats
                let parsed = value
                    .parse::<u64>()
                    .ok()
                    .or_else(|| {
                        value
                            .parse::<f64>()
                            .ok()
                            .filter(|v| v.is_finite() && *v >= 0.0)
                            .map(|v| v.round() as u64)
                    })
                    .ok_or_else(|| unparseable(&format!("bad LUT count '{}'", value)))?;
                area = Some(parsed);
            }
            _ => {}
        }
    }

    Ok(SynthesisMetrics {
        power: power.ok_or_else(|| ToolFailure::MissingMetric(POWER_METRIC.to_string()))?,
        area: area.ok_or_else(|| ToolFailure::MissingMetric(AREA_METRIC.to_string()))?,
    })
}

fn csv_failure(e: csv::Error) -> ToolFailure {
    unparseable(&e.to_string())
}

fn unparseable(reason: &str) -> ToolFailure {
    ToolFailure::Unparseable {
        tool: TOOL.to_string(),
        reason: reason.to_string(),
    }
}
