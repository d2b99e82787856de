use super::compound::Compound;
use nalgebra::Vector3;
use thiserror::Error;

/// Avogadro's number in mol⁻¹.
pub const AVOGADRO: f64 = 6.02214076e23;
/// Cubic nanometers per cubic centimeter.
pub const NM3_PER_CM3: f64 = 1e21;

#[derive(Debug, Error, PartialEq)]
#[error("Invalid box lengths {0:?}: every edge must be finite and positive")]
pub struct InvalidBoxError(pub [f64; 3]);

/// An orthorhombic simulation box with edge lengths in nanometers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimBox {
    lengths: Vector3<f64>,
}

impl SimBox {
    pub fn new(x: f64, y: f64, z: f64) -> Result<Self, InvalidBoxError> {
        if [x, y, z].iter().any(|l| !l.is_finite() || *l <= 0.0) {
            return Err(InvalidBoxError([x, y, z]));
        }
        Ok(Self {
            lengths: Vector3::new(x, y, z),
        })
    }

    pub fn cubic(length: f64) -> Result<Self, InvalidBoxError> {
        Self::new(length, length, length)
    }

    pub fn lengths(&self) -> &Vector3<f64> {
        &self.lengths
    }

    /// Volume in nm³.
    pub fn volume(&self) -> f64 {
        self.lengths.x * self.lengths.y * self.lengths.z
    }

    pub fn scaled(&self, factor: f64) -> Result<Self, InvalidBoxError> {
        Self::new(
            self.lengths.x * factor,
            self.lengths.y * factor,
            self.lengths.z * factor,
        )
    }
}

/// A simulation box populated with molecule copies.
#[derive(Debug, Clone)]
pub struct PackedBox {
    pub sim_box: SimBox,
    pub molecules: Vec<Compound>,
}

impl PackedBox {
    pub fn new(sim_box: SimBox) -> Self {
        Self {
            sim_box,
            molecules: Vec::new(),
        }
    }

    pub fn n_molecules(&self) -> usize {
        self.molecules.len()
    }

    pub fn n_atoms(&self) -> usize {
        self.molecules.iter().map(Compound::n_atoms).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.molecules.is_empty()
    }

    /// Total mass in g/mol.
    pub fn total_mass(&self) -> f64 {
        self.molecules.iter().map(Compound::mass).sum()
    }

    /// Mass density in g/cm³.
    pub fn density(&self) -> f64 {
        self.total_mass() / AVOGADRO / (self.sim_box.volume() / NM3_PER_CM3)
    }

    pub fn net_charge(&self) -> f64 {
        self.molecules.iter().map(Compound::charge).sum()
    }

    /// Number of molecules carrying each distinct compound name, in first-seen order.
    pub fn composition(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for molecule in &self.molecules {
            match counts.iter_mut().find(|(name, _)| name == molecule.name()) {
                Some((_, n)) => *n += 1,
                None => counts.push((molecule.name().to_string(), 1)),
            }
        }
        counts
    }
}
