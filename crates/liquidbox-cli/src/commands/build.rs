use crate::cli::BuildArgs;
use crate::config::builder::build_config;
use crate::error::{CliError, Result};
use crate::utils::output::{box_path, summarize, write_box};
use crate::utils::progress::CliProgressHandler;
use liquidbox::{
    core::statepoint::Statepoint,
    engine::progress::ProgressReporter,
    workflows,
};
use tracing::info;

pub fn run(args: BuildArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let app_config = build_config(&args)?;

    info!("Loading statepoint from {:?}", &app_config.statepoint_path);
    let statepoint =
        Statepoint::from_path(&app_config.statepoint_path).map_err(|e| CliError::FileParsing {
            path: app_config.statepoint_path.clone(),
            source: e.into(),
        })?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Building system...");
    info!("Invoking the system builder workflow...");
    let system =
        workflows::system::construct_system(&statepoint, &app_config.core_config, &reporter)?;

    println!(
        "Workflow complete for '{}'{}.",
        system.molecule,
        if system.constrained {
            " (bond lengths constrained)"
        } else {
            ""
        }
    );

    let labelled = [("liquid", "liq"), ("vapor", "vap")];
    for ((label, suffix), packed) in labelled.into_iter().zip(system.boxes()) {
        let Some(packed) = packed else {
            continue;
        };
        let path = box_path(&app_config.output_prefix, suffix, app_config.format);
        write_box(packed, &path, app_config.format)?;
        println!("{}", summarize(label, packed));
        println!("        written to: {}", path.display());
    }

    Ok(())
}
