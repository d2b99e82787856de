use phf::{Map, phf_map};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

static BUILTIN: Map<&'static str, &'static str> = phf_map! {
    "trappe-ua" => include_str!("../../../data/forcefields/trappe-ua.toml"),
    "oplsaa" => include_str!("../../../data/forcefields/oplsaa.toml"),
    "spce" => include_str!("../../../data/forcefields/spce.toml"),
    "tip3p" => include_str!("../../../data/forcefields/tip3p.toml"),
    "tip3p_ew_b" => include_str!("../../../data/forcefields/tip3p_ew_b.toml"),
    "tip3p_ew_f" => include_str!("../../../data/forcefields/tip3p_ew_f.toml"),
    "tips3p" => include_str!("../../../data/forcefields/tips3p.toml"),
    "opc3" => include_str!("../../../data/forcefields/opc3.toml"),
    "tip4p_ew" => include_str!("../../../data/forcefields/tip4p_ew.toml"),
    "tip4p_2005" => include_str!("../../../data/forcefields/tip4p_2005.toml"),
    "tip4p_d" => include_str!("../../../data/forcefields/tip4p_d.toml"),
    "a99SB_disp" => include_str!("../../../data/forcefields/a99SB_disp.toml"),
    "opc" => include_str!("../../../data/forcefields/opc.toml"),
    "ions" => include_str!("../../../data/forcefields/ions.toml"),
};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ForcefieldMetadata {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AtomType {
    pub name: String,
    #[serde(default)]
    pub element: Option<String>,
    pub mass: f64,
    pub charge: f64,
    pub sigma: f64,
    pub epsilon: f64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BondType {
    pub types: [String; 2],
    /// Equilibrium length in nm.
    pub length: f64,
    /// Harmonic force constant in kJ/mol/nm².
    pub k: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ForcefieldFile {
    metadata: ForcefieldMetadata,
    #[serde(rename = "atom-types", default)]
    atom_types: Vec<AtomType>,
    #[serde(rename = "bond-types", default)]
    bond_types: Vec<BondType>,
}

#[derive(Debug, Clone)]
pub struct Forcefield {
    pub metadata: ForcefieldMetadata,
    atom_types: HashMap<String, AtomType>,
    bond_types: HashMap<(String, String), BondType>,
}

#[derive(Debug, Error)]
pub enum ForcefieldLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Duplicate {kind} '{name}' in '{path}'")]
    Duplicate {
        path: String,
        kind: &'static str,
        name: String,
    },
    #[error("Unknown built-in force field '{0}'")]
    UnknownBuiltin(String),
}

fn bond_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

impl Forcefield {
    /// Parses a force field from TOML text. `origin` names the source in error messages.
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ForcefieldLoadError> {
        let file: ForcefieldFile =
            toml::from_str(content).map_err(|e| ForcefieldLoadError::Toml {
                path: origin.to_string(),
                source: e,
            })?;

        let mut atom_types = HashMap::with_capacity(file.atom_types.len());
        for atom_type in file.atom_types {
            let name = atom_type.name.clone();
            if atom_types.insert(name.clone(), atom_type).is_some() {
                return Err(ForcefieldLoadError::Duplicate {
                    path: origin.to_string(),
                    kind: "atom type",
                    name,
                });
            }
        }

        let mut bond_types = HashMap::with_capacity(file.bond_types.len());
        for bond_type in file.bond_types {
            let key = bond_key(&bond_type.types[0], &bond_type.types[1]);
            if bond_types.contains_key(&key) {
                return Err(ForcefieldLoadError::Duplicate {
                    path: origin.to_string(),
                    kind: "bond type",
                    name: format!("{}-{}", key.0, key.1),
                });
            }
            bond_types.insert(key, bond_type);
        }

        Ok(Self {
            metadata: file.metadata,
            atom_types,
            bond_types,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ForcefieldLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ForcefieldLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content, &path.to_string_lossy())
    }

    pub fn builtin(name: &str) -> Result<Self, ForcefieldLoadError> {
        let content = BUILTIN
            .get(name)
            .ok_or_else(|| ForcefieldLoadError::UnknownBuiltin(name.to_string()))?;
        Self::from_toml_str(content, name)
    }

    pub fn builtin_names() -> impl Iterator<Item = &'static str> {
        BUILTIN.keys().copied()
    }

    /// Resolves a force-field name as found in a statepoint.
    ///
    /// Values that contain a path separator or end in `.toml` are read from disk;
    /// anything else must name a built-in parameter set.
    pub fn resolve(name: &str) -> Result<Self, ForcefieldLoadError> {
        if name.contains(['/', '\\']) || name.ends_with(".toml") {
            Self::load(Path::new(name))
        } else {
            Self::builtin(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn atom_type(&self, name: &str) -> Option<&AtomType> {
        self.atom_types.get(name)
    }

    /// Looks up a bond type irrespective of the order of its two atom types.
    pub fn bond_type(&self, a: &str, b: &str) -> Option<&BondType> {
        self.bond_types.get(&bond_key(a, b))
    }

    pub fn n_atom_types(&self) -> usize {
        self.atom_types.len()
    }

    pub fn n_bond_types(&self) -> usize {
        self.bond_types.len()
    }
}
