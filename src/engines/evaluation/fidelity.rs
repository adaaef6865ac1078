use crate::types::Fidelity;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::ops::{Add, Mul, Sub};

/// SQNR reported when every vector reproduces the reference exactly
pub const PERFECT_SQNR_DB: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Complex = Complex { re: 0.0, im: 0.0 };
    pub const ONE: Complex = Complex { re: 1.0, im: 0.0 };

    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// `e^(i * theta)`
    pub fn cis(theta: f64) -> Self {
        Self::new(theta.cos(), theta.sin())
    }

    pub fn norm_sqr(self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    pub fn abs(self) -> f64 {
        self.re.hypot(self.im)
    }

    /// Apply `f` to both components
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(f(self.re), f(self.im))
    }
}

impl Add for Complex {
    type Output = Complex;
    fn add(self, rhs: Complex) -> Complex {
        Complex::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Complex {
    type Output = Complex;
    fn sub(self, rhs: Complex) -> Complex {
        Complex::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for Complex {
    type Output = Complex;
    fn mul(self, rhs: Complex) -> Complex {
        Complex::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

/// Test vectors: seeded Gaussian noise followed by DC, a single tone and an
/// impulse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StimulusSet {
    pub size: usize,
    pub vectors: Vec<Vec<Complex>>,
}

impl StimulusSet {
    pub fn generate(size: usize, random_vectors: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut vectors: Vec<Vec<Complex>> = (0..random_vectors)
            .map(|_| {
                (0..size)
                    .map(|_| Complex::new(rng.sample(StandardNormal), rng.sample(StandardNormal)))
                    .collect()
            })
            .collect();

        vectors.push(vec![Complex::ONE; size]);
        vectors.push(
            (0..size)
                .map(|n| Complex::cis(2.0 * PI * n as f64 / size as f64))
                .collect(),
        );
        let mut impulse = vec![Complex::ZERO; size];
        if let Some(first) = impulse.first_mut() {
            *first = Complex::ONE;
        }
        vectors.push(impulse);

        Self { size, vectors }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

/// Exact discrete Fourier transform, `X[k] = sum x[n] e^(-2 pi i k n / N)`
pub fn dft(input: &[Complex]) -> Vec<Complex> {
    let n = input.len();
    (0..n)
        .map(|k| {
            input.iter().enumerate().fold(Complex::ZERO, |acc, (j, &x)| {
                // Reduce k*j first to keep the angle small for large N
                let phase = ((k * j) % n) as f64;
                acc + x * Complex::cis(-2.0 * PI * phase / n as f64)
            })
        })
        .collect()
}

/// Stimuli paired with their full-precision transforms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldenReference {
    pub stimuli: StimulusSet,
    pub outputs: Vec<Vec<Complex>>,
}

impl GoldenReference {
    pub fn compute(stimuli: StimulusSet) -> Self {
        let outputs = stimuli.vectors.iter().map(|v| dft(v)).collect();
        Self { stimuli, outputs }
    }

    pub fn size(&self) -> usize {
        self.stimuli.size
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn inputs(&self) -> &[Vec<Complex>] {
        &self.stimuli.vectors
    }
}

/// `10 log10(P_signal / P_noise)` with powers as mean squared magnitudes.
/// `+inf` when there is no noise.
pub fn sqnr_db(golden: &[Complex], approx: &[Complex]) -> f64 {
    let n = golden.len().max(1) as f64;
    let signal: f64 = golden.iter().map(|g| g.norm_sqr()).sum::<f64>() / n;
    let noise: f64 = golden
        .iter()
        .zip(approx)
        .map(|(&g, &a)| (g - a).norm_sqr())
        .sum::<f64>()
        / n;

    if noise == 0.0 {
        return f64::INFINITY;
    }
    10.0 * (signal / noise).log10()
}

pub fn mean_absolute_error(golden: &[Complex], approx: &[Complex]) -> f64 {
    let n = golden.len().max(1) as f64;
    golden
        .iter()
        .zip(approx)
        .map(|(&g, &a)| (g - a).abs())
        .sum::<f64>()
        / n
}

/// Averages per-vector fidelity against a golden reference
pub struct FidelityScorer;

impl FidelityScorer {
    /// Score one output vector per reference vector.
    ///
    /// SQNR and MAE are averaged over the vectors with finite SQNR. When every
    /// vector is noise-free the SQNR is `PERFECT_SQNR_DB`. Returns an error
    /// message when the shapes disagree or nothing can be scored.
    pub fn score(reference: &GoldenReference, outputs: &[Vec<Complex>]) -> Result<Fidelity, String> {
        if outputs.len() != reference.len() {
            return Err(format!(
                "expected {} output vectors, got {}",
                reference.len(),
                outputs.len()
            ));
        }

        let mut scored = Vec::with_capacity(outputs.len());
        let mut noise_free = 0usize;

        for (i, (golden, approx)) in reference.outputs.iter().zip(outputs).enumerate() {
            if approx.len() != golden.len() {
                return Err(format!(
                    "vector {} has {} samples, expected {}",
                    i,
                    approx.len(),
                    golden.len()
                ));
            }
            let sqnr = sqnr_db(golden, approx);
            let mae = mean_absolute_error(golden, approx);
            if sqnr == f64::INFINITY {
                noise_free += 1;
            } else if sqnr.is_finite() && mae.is_finite() {
                scored.push((sqnr, mae));
            }
        }

        if !scored.is_empty() {
            let n = scored.len() as f64;
            return Ok(Fidelity {
                sqnr_db: scored.iter().map(|(s, _)| s).sum::<f64>() / n,
                mae: scored.iter().map(|(_, m)| m).sum::<f64>() / n,
            });
        }
        if noise_free > 0 && noise_free == outputs.len() {
            return Ok(Fidelity {
                sqnr_db: PERFECT_SQNR_DB,
                mae: 0.0,
            });
        }
        Err("no output vector could be scored".to_string())
    }

    /// Score a flat sample stream, split into reference-sized vectors
    pub fn score_flat(reference: &GoldenReference, samples: &[Complex]) -> Result<Fidelity, String> {
        let size = reference.size();
        if size == 0 || samples.len() != size * reference.len() {
            return Err(format!(
                "expected {} samples, got {}",
                size * reference.len(),
                samples.len()
            ));
        }
        let outputs: Vec<Vec<Complex>> = samples.chunks(size).map(|c| c.to_vec()).collect();
        Self::score(reference, &outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Complex, b: Complex) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_stimulus_layout_and_seed() {
        let a = StimulusSet::generate(8, 5, 42);
        let b = StimulusSet::generate(8, 5, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
        assert!(a.vectors.iter().all(|v| v.len() == 8));
        assert_eq!(a.vectors[5], vec![Complex::ONE; 8]);
        assert_eq!(a.vectors[7][0], Complex::ONE);
        assert!(a.vectors[7][1..].iter().all(|&c| c == Complex::ZERO));
    }

    #[test]
    fn test_dft_of_known_vectors() {
        let n = 8;
        let stimuli = StimulusSet::generate(n, 0, 1);
        let golden = GoldenReference::compute(stimuli);

        // DC concentrates in bin 0
        assert!(close(golden.outputs[0][0], Complex::new(n as f64, 0.0)));
        assert!(golden.outputs[0][1..].iter().all(|&c| c.abs() < 1e-9));
        // exp(2 pi i n / N) lands in bin 1
        assert!(close(golden.outputs[1][1], Complex::new(n as f64, 0.0)));
        assert!(golden.outputs[1][2].abs() < 1e-9);
        // An impulse is flat
        assert!(golden.outputs[2].iter().all(|&c| close(c, Complex::ONE)));
    }

    #[test]
    fn test_sqnr_and_mae() {
        let golden = vec![Complex::new(1.0, 0.0), Complex::new(0.0, 1.0)];
        let approx = vec![Complex::new(0.9, 0.0), Complex::new(0.0, 1.1)];
        // signal power 1, noise power 0.01 -> 20 dB
        assert!((sqnr_db(&golden, &approx) - 20.0).abs() < 1e-9);
        assert!((mean_absolute_error(&golden, &approx) - 0.1).abs() < 1e-12);
        assert_eq!(sqnr_db(&golden, &golden), f64::INFINITY);
    }

    #[test]
    fn test_perfect_outputs_are_capped() {
        let reference = GoldenReference::compute(StimulusSet::generate(4, 3, 7));
        let fidelity = FidelityScorer::score(&reference, &reference.outputs.clone()).unwrap();
        assert_eq!(fidelity.sqnr_db, PERFECT_SQNR_DB);
        assert_eq!(fidelity.mae, 0.0);
    }

    #[test]
    fn test_noise_free_vectors_excluded_from_average() {
        let reference = GoldenReference::compute(StimulusSet::generate(2, 0, 7));
        let mut outputs = reference.outputs.clone();
        // Perturb only the DC vector
        outputs[0][0] = outputs[0][0] + Complex::new(0.2, 0.0);
        let fidelity = FidelityScorer::score(&reference, &outputs).unwrap();
        let expected = sqnr_db(&reference.outputs[0], &outputs[0]);
        assert!((fidelity.sqnr_db - expected).abs() < 1e-9);
        assert!((fidelity.mae - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_shape_mismatch_and_garbage() {
        let reference = GoldenReference::compute(StimulusSet::generate(4, 1, 7));
        assert!(FidelityScorer::score(&reference, &[]).is_err());
        assert!(FidelityScorer::score_flat(&reference, &[Complex::ZERO; 3]).is_err());

        let nan = vec![vec![Complex::new(f64::NAN, 0.0); 4]; reference.len()];
        assert!(FidelityScorer::score(&reference, &nan).is_err());
    }
}
