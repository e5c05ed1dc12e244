use occuprob::engine::config as core_config;
use std::path::PathBuf;

pub struct AppConfig {
    pub input_path: PathBuf,
    pub output_prefix: PathBuf,
    pub symmetry_tolerance: f64,
    pub core_config: core_config::ThermoConfig,
}
