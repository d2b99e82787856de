//! # Core Module
//!
//! Fundamental building blocks shared by the packing engine and the workflows.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, bonds, compounds, simulation boxes
//! - **File I/O** ([`io`]) - Tripos MOL2 reading and writing, PDB writing
//! - **Molecule Library** ([`molecules`]) - Built-in water and solvent templates
//! - **Force Fields** ([`forcefield`]) - Parameter files and atom typing
//! - **Job Parameters** ([`statepoint`]) - The statepoint consumed by the system builder
//! - **Utilities** ([`utils`]) - Geometric helpers

pub mod forcefield;
pub mod io;
pub mod models;
pub mod molecules;
pub mod statepoint;
pub mod utils;
