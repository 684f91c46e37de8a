/// Values used when neither the configuration file nor the command line sets
/// them.
pub struct DefaultsConfig {
    pub events: u64,
    pub seed: u64,
    pub chunk_size: u64,
    pub energy_loss: bool,
    pub straggling: bool,
    pub energy_spread: f64,
    pub divergence_deg: f64,
    pub target_angle_deg: f64,
    pub time_resolution: f64,
    pub qdc_window: (f64, f64),
    pub require_coincidence: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            events: 10_000,
            seed: 0,
            chunk_size: vandmc::engine::config::DEFAULT_CHUNK_SIZE,
            energy_loss: true,
            straggling: true,
            energy_spread: 0.0,
            divergence_deg: 0.0,
            target_angle_deg: 0.0,
            time_resolution: 0.0,
            qdc_window: vandmc::engine::config::DEFAULT_QDC_WINDOW,
            require_coincidence: false,
        }
    }
}
