use crate::config::{ConstraintLimits, ObjectiveWeights};
use crate::types::{ConstraintVector, EvaluationResult, Fidelity, ObjectiveVector, SynthesisMetrics};

pub const SENTINEL_SQNR_DB: f64 = -100.0;
pub const SENTINEL_MAE: f64 = 1e6;

/// Smallest magnitude allowed for `sqnr_db + 1` in the error term
pub const SQNR_GUARD: f64 = 1e-9;

/// Stand-in for a failed synthesis run: twice each limit
pub fn sentinel_synthesis(limits: &ConstraintLimits) -> SynthesisMetrics {
    SynthesisMetrics {
        power: 2.0 * limits.max_power,
        area: limits.max_area.saturating_mul(2),
    }
}

/// Stand-in for a failed simulation run
pub fn sentinel_fidelity() -> Fidelity {
    Fidelity {
        sqnr_db: SENTINEL_SQNR_DB,
        mae: SENTINEL_MAE,
    }
}

pub fn sentinel_result(limits: &ConstraintLimits) -> EvaluationResult {
    combine(sentinel_synthesis(limits), sentinel_fidelity())
}

pub fn combine(synthesis: SynthesisMetrics, fidelity: Fidelity) -> EvaluationResult {
    EvaluationResult {
        power: synthesis.power,
        area: synthesis.area,
        sqnr_db: fidelity.sqnr_db,
        mae: fidelity.mae,
    }
}

// NaN SQNR is scored as a failed simulation
fn effective_sqnr(sqnr_db: f64) -> f64 {
    if sqnr_db.is_nan() {
        SENTINEL_SQNR_DB
    } else {
        sqnr_db
    }
}

/// `1 / (sqnr_db + 1) + mae`, with the denominator kept at least
/// `SQNR_GUARD` away from zero on its own side
pub fn performance_error(sqnr_db: f64, mae: f64) -> f64 {
    let mut denominator = effective_sqnr(sqnr_db) + 1.0;
    if denominator.abs() < SQNR_GUARD {
        denominator = SQNR_GUARD.copysign(denominator);
    }
    1.0 / denominator + mae
}

/// `[power, area, performance_error]`, each scaled by its weight
pub fn objectives(result: &EvaluationResult, weights: &ObjectiveWeights) -> ObjectiveVector {
    [
        result.power * weights.power,
        result.area as f64 * weights.area,
        performance_error(result.sqnr_db, result.mae) * weights.performance,
    ]
}

/// `[power - max, area - max, min_sqnr - sqnr]`; feasible when all <= 0
pub fn constraints(result: &EvaluationResult, limits: &ConstraintLimits) -> ConstraintVector {
    [
        result.power - limits.max_power,
        result.area as f64 - limits.max_area as f64,
        limits.min_sqnr_db - effective_sqnr(result.sqnr_db),
    ]
}

pub fn is_feasible(constraints: &ConstraintVector) -> bool {
    constraints.iter().all(|&c| c <= 0.0)
}
