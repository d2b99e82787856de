use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Chemical elements that occur in the supported molecule templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    H,
    C,
    N,
    O,
    Na,
    Cl,
}

/// Masses of united-atom beads, keyed by the conventional bead name.
static UNITED_ATOM_MASSES: Map<&'static str, f64> = phf_map! {
    "_CH4" => 16.043,
    "_CH3" => 15.035,
    "_CH2" => 14.027,
    "_CH" => 13.019,
};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown element symbol: '{0}'")]
pub struct ParseElementError(pub String);

impl Element {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::H => "H",
            Self::C => "C",
            Self::N => "N",
            Self::O => "O",
            Self::Na => "Na",
            Self::Cl => "Cl",
        }
    }

    /// Standard atomic weight in g/mol.
    pub fn atomic_mass(&self) -> f64 {
        match self {
            Self::H => 1.008,
            Self::C => 12.011,
            Self::N => 14.007,
            Self::O => 15.9994,
            Self::Na => 22.98977,
            Self::Cl => 35.453,
        }
    }

    /// Infers the element from an atom name such as `"OW"`, `"H1"` or `"NA"`.
    ///
    /// Names that start with an underscore denote united-atom beads and names that
    /// do not begin with an element symbol (e.g. the `"M"` site of four-site water
    /// models) denote virtual sites; both yield `None`.
    pub fn guess_from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.starts_with('_') {
            return None;
        }
        let letters: String = name.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
        if letters.len() == 2 {
            if let Ok(element) = letters.parse() {
                return Some(element);
            }
        }
        letters.get(0..1).and_then(|first| first.parse().ok())
    }
}

/// Mass of a united-atom bead, if `name` is a known bead name.
pub fn united_atom_mass(name: &str) -> Option<f64> {
    UNITED_ATOM_MASSES.get(name.trim()).copied()
}

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "H" => Ok(Self::H),
            "C" => Ok(Self::C),
            "N" => Ok(Self::N),
            "O" => Ok(Self::O),
            "NA" => Ok(Self::Na),
            "CL" => Ok(Self::Cl),
            _ => Err(ParseElementError(s.to_string())),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
