//! # liquidbox Core Library
//!
//! A library for assembling the initial configurations of molecular dynamics and
//! Monte Carlo simulations of small molecules and water models. A job statepoint
//! names the molecule, the box dimensions, the particle counts and the force field;
//! the library turns it into packed liquid and vapor boxes.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Compound`, `PackedBox`),
//!   the molecule template library, force-field parameter files and typing, the
//!   statepoint type, and file I/O (MOL2, PDB).
//!
//! - **[`engine`]: The Logic Core.** Box packing by lattice seeding with overlap relaxation and
//!   the iterative bond-length constraint solver, together with their configuration,
//!   error and progress-reporting types.
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together into
//!   complete procedures, most importantly [`workflows::system::construct_system`],
//!   which maps a statepoint to its liquid and (optional) vapor boxes.

pub mod core;
pub mod engine;
pub mod workflows;
