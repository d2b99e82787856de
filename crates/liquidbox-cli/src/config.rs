//! Command-line configuration: built-in defaults, the optional TOML file,
//! `--set` overrides and CLI flags, merged into a core [`BuildConfig`].
//!
//! [`BuildConfig`]: liquidbox::engine::config::BuildConfig

pub mod builder;
pub mod defaults;
pub mod file;
pub mod models;
