//! # Core Models Module
//!
//! Data structures used to represent molecule templates and the boxes packed from them.
//!
//! ## Key Components
//!
//! - [`atom`] - Individual atoms with element, force-field type, charge, mass and position
//! - [`element`] - Chemical elements and united-atom bead masses
//! - [`topology`] - Bonds and bond orders
//! - [`compound`] - A named molecule: atoms plus their bond graph
//! - [`simbox`] - Orthorhombic simulation boxes and packed boxes
//! - [`ids`] - Stable identifiers for atoms
//!
//! All coordinates and box lengths are in nanometers.
//!
//! ```ignore
//! use liquidbox::core::models::{atom::Atom, compound::Compound, topology::BondOrder};
//!
//! let mut water = Compound::new("WAT");
//! let o = water.add_atom(Atom::new("O", Point3::origin()));
//! let h = water.add_atom(Atom::new("H1", Point3::new(0.0957, 0.0, 0.0)));
//! water.add_bond(o, h, BondOrder::Single)?;
//! ```

pub mod atom;
pub mod compound;
pub mod element;
pub mod ids;
pub mod simbox;
pub mod topology;
