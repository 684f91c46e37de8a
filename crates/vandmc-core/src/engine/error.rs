use thiserror::Error;

use super::config::ConfigError;
use super::sampling::SamplingError;
use crate::core::materials::RangeTableError;
use crate::core::physics::TargetError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Failed to tabulate ranges for {particle}: {source}")]
    RangeTable {
        particle: String,
        source: RangeTableError,
    },

    #[error("Target setup failed: {source}")]
    Target {
        #[from]
        source: TargetError,
    },

    #[error("Random sampling failed: {source}")]
    Sampling {
        #[from]
        source: SamplingError,
    },
}
