//! Provides input/output functionality for molecular file formats.
//!
//! Molecule templates are read from and written to Tripos MOL2 files through the
//! [`traits::MolecularFile`] interface. Packed boxes are written through
//! [`traits::BoxFile`], implemented by both the PDB and MOL2 writers. Files store
//! coordinates in Å while every in-memory structure uses nanometers; the
//! conversion happens here and nowhere else.

pub mod mol2;
pub mod pdb;
pub mod traits;

/// Ångström per nanometer.
pub const ANGSTROM_PER_NM: f64 = 10.0;
