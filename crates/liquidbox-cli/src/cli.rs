use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu",
    version,
    about = "liquidbox CLI - Assemble initial liquid and vapor boxes of small molecules and water models from job statepoints.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the liquid box (and vapor box, if requested) described by a statepoint.
    Build(BuildArgs),
    /// Inspect the built-in molecule library.
    Molecule(MoleculeArgs),
    /// Pack sodium and chloride ions into a cubic box.
    Ions(IonsArgs),
}

/// Output file format for packed boxes.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Pdb,
    Mol2,
}

/// Arguments for the `build` subcommand.
#[derive(Args, Debug)]
pub struct BuildArgs {
    // --- Core Arguments ---
    /// Path to the statepoint file (.json or .toml).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub statepoint: PathBuf,

    /// Output prefix; boxes are written to <PREFIX>_liq.<ext> and <PREFIX>_vap.<ext>.
    #[arg(short, long, required = true, value_name = "PREFIX")]
    pub output: PathBuf,

    /// Output file format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pdb)]
    pub format: OutputFormat,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Box Overrides ---
    /// Scale factor applied to every liquid box edge.
    #[arg(long, value_name = "FLOAT")]
    pub scale_liquid: Option<f64>,

    /// Scale factor applied to the vapor box edge.
    #[arg(long, value_name = "FLOAT")]
    pub scale_vapor: Option<f64>,

    /// Residue name given to every molecule copy.
    #[arg(long, value_name = "NAME")]
    pub residue_name: Option<String>,

    // --- Packing Overrides ---
    /// Seed for the packing random number generator.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Keep every liquid-box copy in the template orientation.
    #[arg(long)]
    pub fix_orientation: bool,

    // --- Constraint Overrides ---
    /// Project bond lengths onto their force-field values after packing.
    #[arg(long)]
    pub constrain: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S packing.overlap=0.25
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `molecule` subcommand.
#[derive(Args, Debug)]
pub struct MoleculeArgs {
    #[command(subcommand)]
    pub command: MoleculeCommands,
}

/// Available commands for the molecule library.
#[derive(Subcommand, Debug)]
pub enum MoleculeCommands {
    /// List every supported molecule key.
    List,
    /// Print a summary of one molecule template.
    Show {
        /// Molecule key, as used in statepoints (e.g. 'waterSPCE').
        #[arg(required = true)]
        key: String,

        /// Export the template as a MOL2 file.
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

/// Arguments for the `ions` subcommand.
#[derive(Args, Debug)]
pub struct IonsArgs {
    /// Path for the output file; the format follows the extension (.pdb or .mol2).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Number of sodium cations.
    #[arg(long, default_value_t = 2, value_name = "INT")]
    pub cations: usize,

    /// Number of chloride anions.
    #[arg(long, default_value_t = 2, value_name = "INT")]
    pub anions: usize,

    /// Cubic box edge in nm.
    #[arg(long = "box", default_value_t = 1.0, value_name = "FLOAT")]
    pub box_length: f64,

    /// Seed for the packing random number generator.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,
}
