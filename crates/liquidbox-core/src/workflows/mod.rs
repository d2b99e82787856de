//! # Workflows Module
//!
//! Top-level entry points that turn a job description into populated boxes.
//!
//! - **System Builder** ([`system`]) - Statepoint to liquid box, optional vapor box,
//!   and optional exact bond lengths
//! - **Ion Boxes** ([`ions`]) - Sodium/chloride boxes packed with the multi-species filler
//!
//! Workflows resolve molecules and force fields, sequence the engine phases, report
//! progress, and wrap every failure into [`crate::engine::error::EngineError`].

pub mod ions;
pub mod system;
