pub struct DefaultsConfig {
    pub scale_liquid: f64,
    pub scale_vapor: f64,
    pub residue_name: String,
    pub overlap: f64,
    pub edge: f64,
    pub seed: u64,
    pub max_attempts: usize,
    pub fix_orientation: bool,
    pub constrain: bool,
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            scale_liquid: 1.0,
            scale_vapor: 1.0,
            residue_name: "WAT".to_string(),
            overlap: 0.2,
            edge: 0.2,
            seed: 12345,
            max_attempts: 10_000,
            fix_orientation: false,
            constrain: false,
            tolerance: 1e-10,
            max_iterations: 1000,
        }
    }
}
