use crate::cli::OutputFormat;
use liquidbox::engine::config::BuildConfig;
use std::path::PathBuf;

#[derive(Debug)]
pub struct AppConfig {
    pub statepoint_path: PathBuf,
    pub output_prefix: PathBuf,
    pub format: OutputFormat,
    pub core_config: BuildConfig,
}
