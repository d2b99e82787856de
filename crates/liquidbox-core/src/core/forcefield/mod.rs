//! # Force Field Module
//!
//! Force fields are consumed only for atom typing and geometry: each atom type
//! supplies a mass and a partial charge, and each bond type supplies an
//! equilibrium length. Lennard-Jones parameters are carried along for export but
//! no energies are evaluated.
//!
//! ## Key Components
//!
//! - [`params`] - TOML parameter files, built-in parameter sets and lookups
//! - [`typing`] - Application of a force field to a molecule template
//!
//! ```ignore
//! use liquidbox::core::forcefield::{params::Forcefield, typing::Typer};
//!
//! let ff = Forcefield::resolve("tip4p_ew")?;
//! let typed = Typer::new(&ff).apply(&water)?;
//! ```

pub mod params;
pub mod typing;
