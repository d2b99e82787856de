use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackingConfig {
    /// Minimum distance in nm between atoms of different molecules.
    pub overlap: f64,
    /// Margin in nm kept free along every box face.
    pub edge: f64,
    pub seed: u64,
    /// Overlap-relaxation sweeps before giving up.
    pub max_attempts: usize,
    /// Keep every copy in the template's orientation.
    pub fix_orientation: bool,
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            overlap: 0.2,
            edge: 0.2,
            seed: 12345,
            max_attempts: 10_000,
            fix_orientation: false,
        }
    }
}

impl PackingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.overlap.is_finite() || self.overlap < 0.0 {
            return Err(invalid("overlap", format!("must be non-negative, got {}", self.overlap)));
        }
        if !self.edge.is_finite() || self.edge < 0.0 {
            return Err(invalid("edge", format!("must be non-negative, got {}", self.edge)));
        }
        if self.max_attempts == 0 {
            return Err(invalid("max_attempts", "must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintConfig {
    /// Convergence threshold on the relative squared bond-length error.
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 1000,
        }
    }
}

impl ConstraintConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(invalid("tolerance", format!("must be positive, got {}", self.tolerance)));
        }
        if self.max_iterations == 0 {
            return Err(invalid("max_iterations", "must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    pub scale_liq_box: f64,
    pub scale_vap_box: f64,
    pub constrain: bool,
    /// Applies to the liquid box only.
    pub fix_orientation: bool,
    pub residue_name: String,
    pub packing: PackingConfig,
    pub constraint: ConstraintConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            scale_liq_box: 1.0,
            scale_vap_box: 1.0,
            constrain: false,
            fix_orientation: false,
            residue_name: String::from("WAT"),
            packing: PackingConfig::default(),
            constraint: ConstraintConfig::default(),
        }
    }
}

/// Builder for [`BuildConfig`]; unset parameters take their documented defaults.
#[derive(Default)]
pub struct BuildConfigBuilder {
    scale_liq_box: Option<f64>,
    scale_vap_box: Option<f64>,
    constrain: Option<bool>,
    fix_orientation: Option<bool>,
    residue_name: Option<String>,
    packing: Option<PackingConfig>,
    constraint: Option<ConstraintConfig>,
}

impl BuildConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scale_liq_box(mut self, factor: f64) -> Self {
        self.scale_liq_box = Some(factor);
        self
    }
    pub fn scale_vap_box(mut self, factor: f64) -> Self {
        self.scale_vap_box = Some(factor);
        self
    }
    pub fn constrain(mut self, enabled: bool) -> Self {
        self.constrain = Some(enabled);
        self
    }
    pub fn fix_orientation(mut self, enabled: bool) -> Self {
        self.fix_orientation = Some(enabled);
        self
    }
    pub fn residue_name(mut self, name: impl Into<String>) -> Self {
        self.residue_name = Some(name.into());
        self
    }
    pub fn packing(mut self, packing: PackingConfig) -> Self {
        self.packing = Some(packing);
        self
    }
    pub fn constraint(mut self, constraint: ConstraintConfig) -> Self {
        self.constraint = Some(constraint);
        self
    }

    pub fn build(self) -> Result<BuildConfig, ConfigError> {
        let defaults = BuildConfig::default();
        let config = BuildConfig {
            scale_liq_box: self.scale_liq_box.unwrap_or(defaults.scale_liq_box),
            scale_vap_box: self.scale_vap_box.unwrap_or(defaults.scale_vap_box),
            constrain: self.constrain.unwrap_or(defaults.constrain),
            fix_orientation: self.fix_orientation.unwrap_or(defaults.fix_orientation),
            residue_name: self.residue_name.unwrap_or(defaults.residue_name),
            packing: self.packing.unwrap_or(defaults.packing),
            constraint: self.constraint.unwrap_or(defaults.constraint),
        };
        config.validate()?;
        Ok(config)
    }
}

impl BuildConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, factor) in [
            ("scale_liq_box", self.scale_liq_box),
            ("scale_vap_box", self.scale_vap_box),
        ] {
            if !factor.is_finite() || factor <= 0.0 {
                return Err(invalid(name, format!("must be positive, got {factor}")));
            }
        }
        if self.residue_name.trim().is_empty() {
            return Err(ConfigError::MissingParameter("residue_name"));
        }
        self.packing.validate()?;
        self.constraint.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_defaults() {
        let config = BuildConfigBuilder::new().build().unwrap();
        assert_eq!(config, BuildConfig::default());
        assert_eq!(config.residue_name, "WAT");
        assert_eq!(config.packing.seed, 12345);
        assert_eq!(config.packing.overlap, 0.2);
        assert_eq!(config.constraint.tolerance, 1e-10);
        assert_eq!(config.constraint.max_iterations, 1000);
    }

    #[test]
    fn builder_overrides_values() {
        let config = BuildConfigBuilder::new()
            .scale_liq_box(1.5)
            .scale_vap_box(2.0)
            .constrain(true)
            .fix_orientation(true)
            .residue_name("SOL")
            .packing(PackingConfig {
                seed: 7,
                ..Default::default()
            })
            .build()
            .unwrap();
        assert_eq!(config.scale_liq_box, 1.5);
        assert_eq!(config.scale_vap_box, 2.0);
        assert!(config.constrain);
        assert!(config.fix_orientation);
        assert_eq!(config.residue_name, "SOL");
        assert_eq!(config.packing.seed, 7);
    }

    #[test]
    fn non_positive_scale_is_invalid() {
        let err = BuildConfigBuilder::new().scale_liq_box(0.0).build().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter { name: "scale_liq_box", .. }
        ));
    }

    #[test]
    fn empty_residue_name_is_missing() {
        let err = BuildConfigBuilder::new().residue_name("  ").build().unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("residue_name"));
    }

    #[test]
    fn packing_and_constraint_are_validated() {
        let packing = PackingConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(BuildConfigBuilder::new().packing(packing).build().is_err());

        let constraint = ConstraintConfig {
            tolerance: -1.0,
            ..Default::default()
        };
        assert!(BuildConfigBuilder::new().constraint(constraint).build().is_err());
    }
}
