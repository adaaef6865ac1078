pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod precision;
pub mod toolchain;
pub mod types;

pub use error::{MixfftError, Result};
