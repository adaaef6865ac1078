use crate::error::MixfftError;
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<(), MixfftError>;
}

pub(crate) fn check_probability(name: &str, value: f64) -> Result<(), MixfftError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(MixfftError::Configuration(format!(
            "{} must be between 0 and 1, got {}",
            name, value
        )));
    }
    Ok(())
}

pub(crate) fn check_positive(name: &str, value: f64) -> Result<(), MixfftError> {
    if !(value > 0.0) {
        return Err(MixfftError::Configuration(format!(
            "{} must be positive, got {}",
            name, value
        )));
    }
    Ok(())
}
