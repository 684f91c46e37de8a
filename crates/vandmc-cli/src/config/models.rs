use std::path::PathBuf;
use vandmc::engine::config as core_config;

pub struct AppConfig {
    pub core_config: core_config::SimulationConfig,
    /// CSV file for detected hits, if any.
    pub output: Option<PathBuf>,
}
