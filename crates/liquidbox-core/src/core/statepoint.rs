use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatepointError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("JSON parsing error for '{path}': {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Unsupported statepoint file extension for '{0}' (expected .json or .toml)")]
    UnsupportedExtension(String),
    #[error("Statepoint is missing required key '{0}'")]
    MissingKey(&'static str),
    #[error("Statepoint key '{key}' has an invalid value: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// The parameter set identifying one simulation job.
///
/// Keys follow the names written by the workflow manager. Every key is optional
/// at parse time; the `require_*` accessors report the first missing key a build
/// step needs. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Statepoint {
    pub molecule: Option<String>,
    pub engine: Option<String>,
    pub replica: Option<u32>,
    /// Kelvin.
    pub temperature: Option<f64>,
    /// kPa.
    pub pressure: Option<f64>,
    pub ensemble: Option<String>,
    #[serde(rename = "N_liquid")]
    pub n_liquid: Option<usize>,
    #[serde(rename = "N_vap")]
    pub n_vap: Option<usize>,
    #[serde(rename = "box_L_liq_x")]
    pub box_l_liq_x: Option<f64>,
    #[serde(rename = "box_L_liq_y")]
    pub box_l_liq_y: Option<f64>,
    #[serde(rename = "box_L_liq_z")]
    pub box_l_liq_z: Option<f64>,
    #[serde(rename = "box_L_vap")]
    pub box_l_vap: Option<f64>,
    /// g/cm³.
    pub init_liq_den: Option<f64>,
    /// g/cm³.
    pub init_vap_den: Option<f64>,
    /// g/mol.
    pub mass: Option<f64>,
    pub forcefield_name: Option<String>,
    pub cutoff_style: Option<String>,
    /// nm.
    pub r_cut: Option<f64>,
    pub pdbid: Option<String>,
}

fn require<T: Copy>(value: Option<T>, key: &'static str) -> Result<T, StatepointError> {
    value.ok_or(StatepointError::MissingKey(key))
}

fn require_str<'a>(value: &'a Option<String>, key: &'static str) -> Result<&'a str, StatepointError> {
    value.as_deref().ok_or(StatepointError::MissingKey(key))
}

impl Statepoint {
    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Loads a statepoint, choosing the parser from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, StatepointError> {
        let display = path.to_string_lossy().to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        if !matches!(extension.as_deref(), Some("json" | "toml")) {
            return Err(StatepointError::UnsupportedExtension(display));
        }

        let content = std::fs::read_to_string(path).map_err(|e| StatepointError::Io {
            path: display.clone(),
            source: e,
        })?;
        match extension.as_deref() {
            Some("json") => Self::from_json_str(&content).map_err(|e| StatepointError::Json {
                path: display,
                source: e,
            }),
            _ => Self::from_toml_str(&content).map_err(|e| StatepointError::Toml {
                path: display,
                source: e,
            }),
        }
    }

    pub fn require_molecule(&self) -> Result<&str, StatepointError> {
        require_str(&self.molecule, "molecule")
    }

    pub fn require_forcefield_name(&self) -> Result<&str, StatepointError> {
        require_str(&self.forcefield_name, "forcefield_name")
    }

    pub fn require_n_liquid(&self) -> Result<usize, StatepointError> {
        require(self.n_liquid, "N_liquid")
    }

    pub fn require_init_liq_den(&self) -> Result<f64, StatepointError> {
        let density = require(self.init_liq_den, "init_liq_den")?;
        if !density.is_finite() || density <= 0.0 {
            return Err(StatepointError::InvalidValue {
                key: "init_liq_den",
                reason: format!("density must be positive, got {density}"),
            });
        }
        Ok(density)
    }

    /// Liquid box edge lengths in nm, in x, y, z order.
    pub fn require_liquid_box(&self) -> Result<[f64; 3], StatepointError> {
        Ok([
            require(self.box_l_liq_x, "box_L_liq_x")?,
            require(self.box_l_liq_y, "box_L_liq_y")?,
            require(self.box_l_liq_z, "box_L_liq_z")?,
        ])
    }

    /// The vapor box edge and molecule count, when both are set and non-zero.
    pub fn vapor(&self) -> Option<(f64, usize)> {
        match (self.box_l_vap, self.n_vap) {
            (Some(length), Some(count)) if length != 0.0 && count != 0 => Some((length, count)),
            _ => None,
        }
    }

    /// Whether the liquid box is filled by target density rather than by count.
    pub fn fills_by_density(&self) -> bool {
        self.pdbid.as_deref().is_some_and(|id| !id.trim().is_empty())
    }
}
