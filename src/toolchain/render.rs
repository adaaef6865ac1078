use crate::engines::structure::{Phenotype, PrecisionStatistics};
use std::fmt::Write;

/// Pure `Phenotype -> text` conversion for a hardware description language
pub trait Renderer: Send + Sync {
    /// Name of the top module the artifact declares
    fn module_name(&self, phenotype: &Phenotype) -> String;

    fn render(&self, phenotype: &Phenotype) -> String;

    /// File extension for written artifacts
    fn extension(&self) -> &'static str {
        "v"
    }
}

/// Renders a fully parallel radix-2 network as a Verilog top module.
///
/// Each unit becomes a `twiddle_factor_unified` ROM at the unit's multiplier
/// precision plus a `mixed_butterfly` parameterised by both precisions. Both
/// submodules come from the shared sources directory.
#[derive(Debug, Clone, Default)]
pub struct VerilogRenderer;

impl VerilogRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for VerilogRenderer {
    fn module_name(&self, phenotype: &Phenotype) -> String {
        format!("mixed_fft_{}", phenotype.size)
    }

    // `write!` into a String cannot fail
    fn render(&self, phenotype: &Phenotype) -> String {
        let n = phenotype.size;
        let last = phenotype.num_stages();
        let stats = PrecisionStatistics::of(phenotype);
        let mut v = String::new();

        let _ = writeln!(v, "// Mixed-precision radix-2 FFT, {} points", n);
        let _ = writeln!(v, "// Units: {}, {}", phenotype.total_units(), stats.summary());
        let _ = writeln!(v);
        let _ = writeln!(v, "module {} (", self.module_name(phenotype));
        let _ = writeln!(v, "    input clk,");
        let _ = writeln!(v, "    input rst,");
        let _ = writeln!(v, "    input start,");
        let _ = writeln!(v, "    input [15:0] data_in_real [{}:0],", n - 1);
        let _ = writeln!(v, "    input [15:0] data_in_imag [{}:0],", n - 1);
        let _ = writeln!(v, "    output reg [15:0] data_out_real [{}:0],", n - 1);
        let _ = writeln!(v, "    output reg [15:0] data_out_imag [{}:0],", n - 1);
        let _ = writeln!(v, "    output reg done");
        let _ = writeln!(v, ");");
        let _ = writeln!(v);

        let _ = writeln!(v, "    // Stage interconnect");
        for stage in 0..=last {
            let _ = writeln!(v, "    wire [15:0] stage{}_real [{}:0];", stage, n - 1);
            let _ = writeln!(v, "    wire [15:0] stage{}_imag [{}:0];", stage, n - 1);
        }
        let _ = writeln!(v);

        for i in 0..n {
            let _ = writeln!(v, "    assign stage0_real[{i}] = data_in_real[{i}];", i = i);
            let _ = writeln!(v, "    assign stage0_imag[{i}] = data_in_imag[{i}];", i = i);
        }
        let _ = writeln!(v);

        for stage in &phenotype.stages {
            let s = stage.stage;
            let _ = writeln!(v, "    // Stage {}: {} units", s, stage.units.len());
            for unit in &stage.units {
                let bf = unit.unit_in_stage;
                let (a, b) = (unit.input_a, unit.input_b);
                let _ = writeln!(
                    v,
                    "    // Unit {}: mult={}, add={}",
                    unit.global_index, unit.primary, unit.secondary
                );
                let _ = writeln!(v, "    wire [15:0] twiddle_s{}_bf{};", s, bf);
                let _ = writeln!(v, "    twiddle_factor_unified #(");
                let _ = writeln!(v, "        .MAX_N(1024),");
                let _ = writeln!(v, "        .PRECISION({})", unit.primary.gene());
                let _ = writeln!(v, "    ) twiddle_rom_s{}_bf{} (", s, bf);
                let _ = writeln!(v, "        .k({}),", unit.twiddle_index);
                let _ = writeln!(v, "        .n({}),", n);
                let _ = writeln!(v, "        .twiddle_out(twiddle_s{}_bf{})", s, bf);
                let _ = writeln!(v, "    );");
                let _ = writeln!(v, "    mixed_butterfly #(");
                let _ = writeln!(v, "        .MULT_PRECISION({}),", unit.primary.gene());
                let _ = writeln!(v, "        .ADD_PRECISION({})", unit.secondary.gene());
                let _ = writeln!(
                    v,
                    "    ) bf_s{}_g{}_b{} (",
                    s, unit.group, unit.unit_in_group
                );
                let _ = writeln!(v, "        .A({{stage{s}_real[{a}], stage{s}_imag[{a}]}}),", s = s, a = a);
                let _ = writeln!(v, "        .B({{stage{s}_real[{b}], stage{s}_imag[{b}]}}),", s = s, b = b);
                let _ = writeln!(v, "        .W(twiddle_s{}_bf{}),", s, bf);
                let _ = writeln!(v, "        .X({{stage{t}_real[{a}], stage{t}_imag[{a}]}}),", t = s + 1, a = a);
                let _ = writeln!(v, "        .Y({{stage{t}_real[{b}], stage{t}_imag[{b}]}})", t = s + 1, b = b);
                let _ = writeln!(v, "    );");
                let _ = writeln!(v);
            }
        }

        let _ = writeln!(v, "    integer i;");
        let _ = writeln!(v, "    always @(posedge clk) begin");
        let _ = writeln!(v, "        if (rst) begin");
        let _ = writeln!(v, "            done <= 1'b0;");
        let _ = writeln!(v, "            for (i = 0; i < {}; i = i + 1) begin", n);
        let _ = writeln!(v, "                data_out_real[i] <= 16'h0;");
        let _ = writeln!(v, "                data_out_imag[i] <= 16'h0;");
        let _ = writeln!(v, "            end");
        let _ = writeln!(v, "        end else if (start) begin");
        let _ = writeln!(v, "            for (i = 0; i < {}; i = i + 1) begin", n);
        let _ = writeln!(v, "                data_out_real[i] <= stage{}_real[i];", last);
        let _ = writeln!(v, "                data_out_imag[i] <= stage{}_imag[i];", last);
        let _ = writeln!(v, "            end");
        let _ = writeln!(v, "            done <= 1'b1;");
        let _ = writeln!(v, "        end else begin");
        let _ = writeln!(v, "            done <= 1'b0;");
        let _ = writeln!(v, "        end");
        let _ = writeln!(v, "    end");
        let _ = writeln!(v);
        let _ = writeln!(v, "endmodule");

        v
    }
}
