pub struct DefaultsConfig {
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub temperature_step: f64,
    pub symmetry_tolerance: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            min_temperature: 0.0,
            max_temperature: 500.0,
            temperature_step: 1.0,
            symmetry_tolerance: 0.05,
        }
    }
}
