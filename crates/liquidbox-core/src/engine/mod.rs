//! # Engine Module
//!
//! The computational core of box construction: lattice seeding and overlap
//! relaxation of molecule copies in a simulation box, and projection of molecular geometries
//! onto exact force-field bond lengths.
//!
//! ## Architecture
//!
//! - **Packing** ([`packing`]) - `fill_box` by molecule count or by target density
//! - **Bond Constraints** ([`constraint`]) - SHAKE-style bond-length solver
//! - **Configuration** ([`config`]) - Packing, constraint and build parameters with builders
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events for front ends
//! - **Error Handling** ([`error`]) - The aggregated [`error::EngineError`]
//!
//! Both algorithms are deterministic: packing draws from a seeded RNG, and the
//! constraint solver treats every molecule independently, so its parallel and
//! sequential paths produce identical coordinates.

pub mod config;
pub mod constraint;
pub mod error;
pub mod packing;
pub mod progress;
