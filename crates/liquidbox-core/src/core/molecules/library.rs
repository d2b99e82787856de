use crate::core::io::mol2::{Mol2Error, Mol2File};
use crate::core::io::traits::MolecularFile;
use crate::core::models::compound::Compound;
use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoleculeKind {
    MethaneUa,
    PentaneUa,
    BenzeneUa,
    EthanolAa,
    Spce,
    Tip3p,
    /// Loads its own template, which has the same geometry, atom types and
    /// charges as [`MoleculeKind::Tip3pEwF`]; only the label differs.
    Tip3pEwB,
    Tip3pEwF,
    Tips3p,
    Opc3,
    Tip4pEw,
    Tip4p2005,
    Tip4pD,
    A99sbDisp,
    Opc,
    Sodium,
    Chloride,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown molecule '{key}'")]
pub struct UnknownMoleculeError {
    pub key: String,
}

static KEYS: Map<&'static str, MoleculeKind> = phf_map! {
    "methaneUA" => MoleculeKind::MethaneUa,
    "pentaneUA" => MoleculeKind::PentaneUa,
    "pentaneUA-flexible_bonds" => MoleculeKind::PentaneUa,
    "pentaneUA-constrain_bonds" => MoleculeKind::PentaneUa,
    "benzeneUA" => MoleculeKind::BenzeneUa,
    "ethanolAA" => MoleculeKind::EthanolAa,
    "waterSPCE" => MoleculeKind::Spce,
    "spce" => MoleculeKind::Spce,
    "tip3p" => MoleculeKind::Tip3p,
    "tip3p_ew_b" => MoleculeKind::Tip3pEwB,
    "tip3p_ew_f" => MoleculeKind::Tip3pEwF,
    "tips3p" => MoleculeKind::Tips3p,
    "opc3" => MoleculeKind::Opc3,
    "tip4p_ew" => MoleculeKind::Tip4pEw,
    "tip4p_2005" => MoleculeKind::Tip4p2005,
    "tip4p_d" => MoleculeKind::Tip4pD,
    "a99SB_disp" => MoleculeKind::A99sbDisp,
    "opc" => MoleculeKind::Opc,
    "sodium" => MoleculeKind::Sodium,
    "chloride" => MoleculeKind::Chloride,
};

impl MoleculeKind {
    const ALL: [MoleculeKind; 17] = [
        Self::MethaneUa,
        Self::PentaneUa,
        Self::BenzeneUa,
        Self::EthanolAa,
        Self::Spce,
        Self::Tip3p,
        Self::Tip3pEwB,
        Self::Tip3pEwF,
        Self::Tips3p,
        Self::Opc3,
        Self::Tip4pEw,
        Self::Tip4p2005,
        Self::Tip4pD,
        Self::A99sbDisp,
        Self::Opc,
        Self::Sodium,
        Self::Chloride,
    ];

    /// Resolves a statepoint molecule key. Keys are case sensitive.
    pub fn from_key(key: &str) -> Result<Self, UnknownMoleculeError> {
        KEYS.get(key).copied().ok_or_else(|| UnknownMoleculeError {
            key: key.to_string(),
        })
    }

    pub fn all() -> &'static [MoleculeKind] {
        &Self::ALL
    }

    /// The canonical statepoint key.
    pub fn key(&self) -> &'static str {
        match self {
            Self::MethaneUa => "methaneUA",
            Self::PentaneUa => "pentaneUA",
            Self::BenzeneUa => "benzeneUA",
            Self::EthanolAa => "ethanolAA",
            Self::Spce => "spce",
            Self::Tip3p => "tip3p",
            Self::Tip3pEwB => "tip3p_ew_b",
            Self::Tip3pEwF => "tip3p_ew_f",
            Self::Tips3p => "tips3p",
            Self::Opc3 => "opc3",
            Self::Tip4pEw => "tip4p_ew",
            Self::Tip4p2005 => "tip4p_2005",
            Self::Tip4pD => "tip4p_d",
            Self::A99sbDisp => "a99SB_disp",
            Self::Opc => "opc",
            Self::Sodium => "sodium",
            Self::Chloride => "chloride",
        }
    }

    /// Every key resolving to this model, canonical key first.
    pub fn aliases(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = KEYS
            .entries()
            .filter(|(_, kind)| *kind == self)
            .map(|(key, _)| *key)
            .filter(|key| *key != self.key())
            .collect();
        keys.sort_unstable();
        keys.insert(0, self.key());
        keys
    }

    /// The model's canonical label, used as the name of a freshly loaded compound.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MethaneUa => "methane-UA",
            Self::PentaneUa => "pentane-UA",
            Self::BenzeneUa => "benzene-UA",
            Self::EthanolAa => "ethanol-AA",
            Self::Spce => "SPC/E",
            Self::Tip3p => "TIP3P",
            Self::Tip3pEwB => "TIP3P-Ew-b",
            Self::Tip3pEwF => "TIP3P-Ew-f",
            Self::Tips3p => "TIPS3P",
            Self::Opc3 => "OPC3",
            Self::Tip4pEw => "TIP4P-Ew",
            Self::Tip4p2005 => "TIP4P/2005",
            Self::Tip4pD => "TIP4P-D",
            Self::A99sbDisp => "a99SB-disp water",
            Self::Opc => "OPC",
            Self::Sodium => "sodium",
            Self::Chloride => "chloride",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::MethaneUa => "Methane, single united-atom bead",
            Self::PentaneUa => "n-Pentane, five united-atom beads",
            Self::BenzeneUa => "Benzene, six united-atom CH beads",
            Self::EthanolAa => "Ethanol, all atom",
            Self::Spce => "SPC/E rigid three-site water",
            Self::Tip3p => "TIP3P three-site water",
            Self::Tip3pEwB => "TIP3P-Ew three-site water, variant b",
            Self::Tip3pEwF => "TIP3P-Ew three-site water, variant f",
            Self::Tips3p => "CHARMM-modified TIP3P water with hydrogen Lennard-Jones sites",
            Self::Opc3 => "OPC3 three-site water",
            Self::Tip4pEw => "TIP4P-Ew four-site water",
            Self::Tip4p2005 => "TIP4P/2005 four-site water",
            Self::Tip4pD => "TIP4P-D four-site water",
            Self::A99sbDisp => "Four-site water of the a99SB-disp force field",
            Self::Opc => "OPC four-site water",
            Self::Sodium => "Sodium cation",
            Self::Chloride => "Chloride anion",
        }
    }

    /// Built-in force field whose atom types match this template.
    pub fn default_forcefield(&self) -> &'static str {
        match self {
            Self::MethaneUa | Self::PentaneUa | Self::BenzeneUa => "trappe-ua",
            Self::EthanolAa => "oplsaa",
            Self::Sodium | Self::Chloride => "ions",
            water => water.key(),
        }
    }

    pub fn is_water(&self) -> bool {
        !matches!(
            self,
            Self::MethaneUa
                | Self::PentaneUa
                | Self::BenzeneUa
                | Self::EthanolAa
                | Self::Sodium
                | Self::Chloride
        )
    }

    fn template(&self) -> &'static str {
        match self {
            Self::MethaneUa => include_str!("../../../data/molecules/methane_ua.mol2"),
            Self::PentaneUa => include_str!("../../../data/molecules/pentane_ua.mol2"),
            Self::BenzeneUa => include_str!("../../../data/molecules/benzene_ua.mol2"),
            Self::EthanolAa => include_str!("../../../data/molecules/ethanol_aa.mol2"),
            Self::Spce => include_str!("../../../data/molecules/spce.mol2"),
            Self::Tip3p => include_str!("../../../data/molecules/tip3p.mol2"),
            Self::Tip3pEwB => include_str!("../../../data/molecules/tip3p_ew_b.mol2"),
            Self::Tip3pEwF => include_str!("../../../data/molecules/tip3p_ew_f.mol2"),
            Self::Tips3p => include_str!("../../../data/molecules/tips3p.mol2"),
            Self::Opc3 => include_str!("../../../data/molecules/opc3.mol2"),
            Self::Tip4pEw => include_str!("../../../data/molecules/tip4p_ew.mol2"),
            Self::Tip4p2005 => include_str!("../../../data/molecules/tip4p_2005.mol2"),
            Self::Tip4pD => include_str!("../../../data/molecules/tip4p_d.mol2"),
            Self::A99sbDisp => include_str!("../../../data/molecules/a99SB_disp.mol2"),
            Self::Opc => include_str!("../../../data/molecules/opc.mol2"),
            Self::Sodium => include_str!("../../../data/molecules/sodium.mol2"),
            Self::Chloride => include_str!("../../../data/molecules/chloride.mol2"),
        }
    }

    /// Parses the embedded template into a new compound named after [`label`](Self::label).
    ///
    /// # Errors
    ///
    /// Returns [`Mol2Error`] if the embedded template is malformed.
    pub fn load(&self) -> Result<Compound, Mol2Error> {
        let (mut compound, _) = Mol2File::read_from(&mut self.template().as_bytes())?;
        compound.set_name(self.label());
        Ok(compound)
    }
}

impl FromStr for MoleculeKind {
    type Err = UnknownMoleculeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s)
    }
}

impl fmt::Display for MoleculeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
