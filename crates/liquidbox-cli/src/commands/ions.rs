use crate::cli::IonsArgs;
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::utils::output::{summarize, write_box};
use crate::utils::progress::CliProgressHandler;
use liquidbox::engine::config::PackingConfig;
use liquidbox::engine::progress::ProgressReporter;
use liquidbox::workflows::ions::{IonBoxConfig, build_ion_box};
use tracing::info;

pub fn run(args: IonsArgs) -> Result<()> {
    let format = OutputFormat::from_path(&args.output)?;
    let defaults = IonBoxConfig::default();
    let config = IonBoxConfig {
        n_cations: args.cations,
        n_anions: args.anions,
        box_length: args.box_length,
        packing: PackingConfig {
            seed: args.seed.unwrap_or(defaults.packing.seed),
            ..defaults.packing.clone()
        },
        ..defaults
    };

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the ion box workflow...");
    let packed = build_ion_box(&config, &reporter)?;

    write_box(&packed, &args.output, format)?;
    println!("{}", summarize("ions", &packed));
    println!("        net charge: {:+.3} e", packed.net_charge());
    println!("        written to: {}", args.output.display());
    Ok(())
}
