use super::model::bit_reverse;
use super::process::run_with_timeout;
use super::{SimulationJob, Simulator, ToolFailure};
use crate::config::ToolchainConfig;
use crate::engines::evaluation::fidelity::{Complex, FidelityScorer, GoldenReference};
use crate::precision::fp8;
use crate::types::Fidelity;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

const SIM_TIMEOUT_MARKER: &str = "ERROR: Simulation timeout";

/// Icarus Verilog flow: testbench + stimulus files, `iverilog`, then `vvp`.
#[derive(Debug, Clone)]
pub struct IcarusSimulator {
    iverilog_path: PathBuf,
    vvp_path: PathBuf,
    sources_dir: PathBuf,
    work_dir: PathBuf,
    timeout: Duration,
}

impl IcarusSimulator {
    pub fn from_config(config: &ToolchainConfig) -> Self {
        Self {
            iverilog_path: config.iverilog_path.clone(),
            vvp_path: config.vvp_path.clone(),
            sources_dir: config.verilog_sources_dir.clone(),
            work_dir: config.simulation_dir.clone(),
            timeout: Duration::from_secs(config.simulation_timeout_secs),
        }
    }

    /// Shared Verilog sources, sorted for a stable compile order
    fn library_sources(&self) -> Result<Vec<PathBuf>, ToolFailure> {
        if !self.sources_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut sources: Vec<PathBuf> = std::fs::read_dir(&self.sources_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("v"))
            .collect();
        sources.sort();
        Ok(sources)
    }
}

struct SimFiles {
    testbench: PathBuf,
    stim_real: PathBuf,
    stim_imag: PathBuf,
    output: PathBuf,
    executable: PathBuf,
}

impl SimFiles {
    fn new(dir: &Path, design_name: &str) -> Self {
        Self {
            testbench: dir.join(format!("tb_{}.v", design_name)),
            stim_real: dir.join(format!("{}_stim_real.hex", design_name)),
            stim_imag: dir.join(format!("{}_stim_imag.hex", design_name)),
            output: dir.join(format!("{}_output.txt", design_name)),
            executable: dir.join(format!("{}.vvp", design_name)),
        }
    }
}

impl Simulator for IcarusSimulator {
    fn simulate(&self, job: &SimulationJob<'_>) -> Result<Fidelity, ToolFailure> {
        std::fs::create_dir_all(&self.work_dir)?;
        let files = SimFiles::new(&self.work_dir, job.design_name);

        let (real_hex, imag_hex) = stimulus_hex(job.reference);
        std::fs::write(&files.stim_real, real_hex)?;
        std::fs::write(&files.stim_imag, imag_hex)?;
        std::fs::write(
            &files.testbench,
            testbench(job.design_name, job.module_name, job.reference, &files),
        )?;
        if files.output.exists() {
            std::fs::remove_file(&files.output)?;
        }

        let mut compile = Command::new(&self.iverilog_path);
        compile
            .arg("-g2012")
            .arg("-o")
            .arg(&files.executable)
            .arg("-I")
            .arg(&self.sources_dir)
            .arg(&files.testbench)
            .arg(job.artifact)
            .args(self.library_sources()?);
        run_with_timeout(compile, "iverilog", self.timeout)?;

        let mut run = Command::new(&self.vvp_path);
        run.arg(&files.executable);
        let output = run_with_timeout(run, "vvp", self.timeout)?;
        if output.stdout.contains(SIM_TIMEOUT_MARKER) {
            return Err(ToolFailure::Unparseable {
                tool: "vvp".to_string(),
                reason: "testbench watchdog fired before all vectors completed".to_string(),
            });
        }

        let text = std::fs::read_to_string(&files.output)?;
        let samples = parse_output(&text)?;
        FidelityScorer::score_flat(job.reference, &samples).map_err(|reason| ToolFailure::Unparseable {
            tool: "vvp".to_string(),
            reason,
        })
    }
}

/// One 16-bit hex word per line carrying the 8-bit code in its low byte.
/// Each vector is written in bit-reversed order, matching the network's
/// input wiring.
pub fn stimulus_hex(reference: &GoldenReference) -> (String, String) {
    let n = reference.size();
    let bits = n.trailing_zeros() as usize;
    let mut real = String::new();
    let mut imag = String::new();

    for vector in reference.inputs() {
        for i in 0..n {
            let sample = vector[bit_reverse(i, bits)];
            let _ = writeln!(real, "{:04x}", fp8::encode(sample.re) as u16);
            let _ = writeln!(imag, "{:04x}", fp8::encode(sample.im) as u16);
        }
    }
    (real, imag)
}

/// Parse `hhhh hhhh` lines, decoding the low byte of each word as 8-bit
pub fn parse_output(text: &str) -> Result<Vec<Complex>, ToolFailure> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|line| {
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(re), Some(im), None) => Ok(Complex::new(decode_word(re)?, decode_word(im)?)),
                _ => Err(ToolFailure::Unparseable {
                    tool: "vvp".to_string(),
                    reason: format!("unexpected output line '{}'", line),
                }),
            }
        })
        .collect()
}

fn decode_word(word: &str) -> Result<f64, ToolFailure> {
    let value = u32::from_str_radix(word, 16).map_err(|_| ToolFailure::Unparseable {
        tool: "vvp".to_string(),
        reason: format!("'{}' is not a hex word", word),
    })?;
    Ok(fp8::decode((value & 0xFF) as u8))
}

fn testbench(design_name: &str, module_name: &str, reference: &GoldenReference, files: &SimFiles) -> String {
    let n = reference.size();
    let vectors = reference.len();
    let watchdog_ns = 1_000 + vectors * 100;

    format!(
        r#"`timescale 1ns/1ps

module tb_{design};
    localparam N = {n};
    localparam V = {vectors};

    reg clk;
    reg rst;
    reg start;
    reg [15:0] stim_real [0:N*V-1];
    reg [15:0] stim_imag [0:N*V-1];
    reg [15:0] data_in_real [N-1:0];
    reg [15:0] data_in_imag [N-1:0];
    wire [15:0] data_out_real [N-1:0];
    wire [15:0] data_out_imag [N-1:0];
    wire done;

    integer i, v, out_file;

    {module} dut (
        .clk(clk),
        .rst(rst),
        .start(start),
        .data_in_real(data_in_real),
        .data_in_imag(data_in_imag),
        .data_out_real(data_out_real),
        .data_out_imag(data_out_imag),
        .done(done)
    );

    initial begin
        clk = 0;
        forever #5 clk = ~clk;
    end

    initial begin
        $readmemh("{stim_real}", stim_real);
        $readmemh("{stim_imag}", stim_imag);
        out_file = $fopen("{output}", "w");

        rst = 1;
        start = 0;
        #20 rst = 0;

        for (v = 0; v < V; v = v + 1) begin
            for (i = 0; i < N; i = i + 1) begin
                data_in_real[i] = stim_real[v*N + i];
                data_in_imag[i] = stim_imag[v*N + i];
            end
            @(negedge clk) start = 1;
            @(negedge clk) start = 0;
            wait(done);
            #1;
            for (i = 0; i < N; i = i + 1) begin
                $fwrite(out_file, "%h %h\n", data_out_real[i], data_out_imag[i]);
            end
            @(negedge clk);
        end

        $fclose(out_file);
        $finish;
    end

    initial begin
        #{watchdog};
        $display("{marker}!");
        $finish;
    end
endmodule
"#,
        design = design_name,
        n = n,
        vectors = vectors,
        module = module_name,
        stim_real = files.stim_real.display(),
        stim_imag = files.stim_imag.display(),
        output = files.output.display(),
        watchdog = watchdog_ns,
        marker = SIM_TIMEOUT_MARKER,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::evaluation::fidelity::StimulusSet;

    #[test]
    fn test_parse_output_decodes_low_byte() {
        // 0x38 is 1.0 and 0xb8 is -1.0; the high byte is ignored
        let samples = parse_output("0038 ffb8\n\n0000 0080\n").unwrap();
        assert_eq!(samples, vec![Complex::new(1.0, -1.0), Complex::new(0.0, -0.0)]);
    }

    #[test]
    fn test_parse_output_rejects_garbage() {
        assert!(parse_output("00xx 0000").is_err());
        assert!(parse_output("0038").is_err());
        assert!(parse_output("0038 0038 0038").is_err());
    }

    #[test]
    fn test_stimulus_files() {
        let reference = GoldenReference::compute(StimulusSet::generate(4, 0, 1));
        let (real, imag) = stimulus_hex(&reference);
        let real: Vec<&str> = real.lines().collect();
        assert_eq!(real.len(), 4 * reference.len());
        // DC vector first
        assert!(real[..4].iter().all(|&w| w == "0038"));
        // Impulse last, only sample 0 set, which bit-reverses to slot 0
        assert_eq!(&real[8..12], &["0038", "0000", "0000", "0000"]);
        assert_eq!(imag.lines().count(), 12);
    }

    #[test]
    fn test_testbench_names_module_and_files() {
        let reference = GoldenReference::compute(StimulusSet::generate(8, 2, 1));
        let files = SimFiles::new(Path::new("sim"), "fft_8_sol0_gen0");
        let tb = testbench("fft_8_sol0_gen0", "mixed_fft_8", &reference, &files);
        assert!(tb.contains("module tb_fft_8_sol0_gen0;"));
        assert!(tb.contains("mixed_fft_8 dut ("));
        assert!(tb.contains("localparam V = 5;"));
        assert!(tb.contains("fft_8_sol0_gen0_stim_real.hex"));
    }
}
