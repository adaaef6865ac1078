use super::{SimulationJob, Simulator, ToolFailure};
use crate::engines::evaluation::fidelity::{Complex, FidelityScorer};
use crate::engines::structure::Phenotype;
use crate::precision::PrecisionFormat;
use crate::types::Fidelity;
use std::f64::consts::PI;

/// In-process stand-in for an HDL simulator.
///
/// Runs the same radix-2 DIT network the renderer emits, rounding through
/// each unit's formats: the twiddle and the twiddle product through the
/// multiplier precision, the sum and difference through the adder precision.
/// Inputs enter as 8-bit values, as they do in the testbench.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuantizedModelSimulator;

impl Simulator for QuantizedModelSimulator {
    fn simulate(&self, job: &SimulationJob<'_>) -> Result<Fidelity, ToolFailure> {
        let outputs: Vec<Vec<Complex>> = job
            .reference
            .inputs()
            .iter()
            .map(|input| transform(job.phenotype, input, quantize))
            .collect();

        FidelityScorer::score(job.reference, &outputs).map_err(|reason| ToolFailure::Unparseable {
            tool: "model".to_string(),
            reason,
        })
    }
}

fn quantize(format: PrecisionFormat, value: Complex) -> Complex {
    value.map(|v| format.quantize(v))
}

/// Bit-reverse the low `bits` bits of `index`
pub fn bit_reverse(index: usize, bits: usize) -> usize {
    if bits == 0 {
        return 0;
    }
    index.reverse_bits() >> (usize::BITS as usize - bits)
}

/// `W_N^k = e^(-2 pi i k / N)`
pub fn twiddle(k: usize, n: usize) -> Complex {
    Complex::cis(-2.0 * PI * k as f64 / n as f64)
}

/// Evaluate the butterfly network on one input vector.
///
/// `round` is applied at every point a value crosses a precision boundary:
/// input load, twiddle ROM, multiplier output and adder outputs.
pub fn transform<F>(phenotype: &Phenotype, input: &[Complex], round: F) -> Vec<Complex>
where
    F: Fn(PrecisionFormat, Complex) -> Complex,
{
    let n = phenotype.size;
    let bits = phenotype.num_stages();

    let mut data: Vec<Complex> = (0..n)
        .map(|i| round(PrecisionFormat::Fp8, input[bit_reverse(i, bits)]))
        .collect();

    for stage in &phenotype.stages {
        let mut next = data.clone();
        for unit in &stage.units {
            let w = round(unit.primary, twiddle(unit.twiddle_index, n));
            let t = round(unit.primary, w * data[unit.input_b]);
            let a = data[unit.input_a];
            next[unit.input_a] = round(unit.secondary, a + t);
            next[unit.input_b] = round(unit.secondary, a - t);
        }
        data = next;
    }

    data
}
