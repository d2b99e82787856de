use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileBoxesConfig {
    pub scale_liquid: Option<f64>,
    pub scale_vapor: Option<f64>,
    pub residue_name: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FilePackingConfig {
    pub overlap: Option<f64>,
    pub edge: Option<f64>,
    pub seed: Option<u64>,
    pub max_attempts: Option<usize>,
    pub fix_orientation: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConstraintConfig {
    pub enabled: Option<bool>,
    pub tolerance: Option<f64>,
    pub max_iterations: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub boxes: Option<FileBoxesConfig>,
    pub packing: Option<FilePackingConfig>,
    pub constraint: Option<FileConstraintConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parses_all_sections() {
        let config: FileConfig = toml::from_str(
            r#"
            [boxes]
            scale-liquid = 1.1
            residue-name = "SOL"

            [packing]
            overlap = 0.25
            seed = 99
            max-attempts = 500
            fix-orientation = true

            [constraint]
            enabled = true
            tolerance = 1e-8
            "#,
        )
        .unwrap();
        let boxes = config.boxes.unwrap();
        assert_eq!(boxes.scale_liquid, Some(1.1));
        assert_eq!(boxes.scale_vapor, None);
        assert_eq!(boxes.residue_name.as_deref(), Some("SOL"));
        let packing = config.packing.unwrap();
        assert_eq!(packing.seed, Some(99));
        assert_eq!(packing.fix_orientation, Some(true));
        let constraint = config.constraint.unwrap();
        assert_eq!(constraint.enabled, Some(true));
        assert_eq!(constraint.max_iterations, None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[packing]\noverlaps = 0.3\n").unwrap();
        let err = FileConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, CliError::FileParsing { .. }));
    }
}
