use thiserror::Error;

use super::config::ConfigError;
use super::constraint::ConstraintError;
use super::packing::PackingError;
use crate::core::forcefield::params::ForcefieldLoadError;
use crate::core::forcefield::typing::TypingError;
use crate::core::io::mol2::Mol2Error;
use crate::core::models::simbox::InvalidBoxError;
use crate::core::molecules::library::UnknownMoleculeError;
use crate::core::statepoint::StatepointError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Statepoint error: {0}")]
    Statepoint(#[from] StatepointError),

    #[error(transparent)]
    UnknownMolecule(#[from] UnknownMoleculeError),

    #[error("Failed to load molecule template: {0}")]
    Template(#[from] Mol2Error),

    #[error("Failed to load force field: {0}")]
    Forcefield(#[from] ForcefieldLoadError),

    #[error("Force field typing failed: {0}")]
    Typing(#[from] TypingError),

    #[error(transparent)]
    InvalidBox(#[from] InvalidBoxError),

    #[error("Packing the {phase} box failed: {source}")]
    Packing {
        phase: &'static str,
        #[source]
        source: PackingError,
    },

    #[error("Constraining the {phase} box failed: {source}")]
    Constraint {
        phase: &'static str,
        #[source]
        source: ConstraintError,
    },
}
