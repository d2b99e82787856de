use crate::cli::{MoleculeArgs, MoleculeCommands};
use crate::error::{CliError, Result};
use liquidbox::core::io::mol2::{Mol2File, Mol2Metadata};
use liquidbox::core::io::traits::MolecularFile;
use liquidbox::core::molecules::library::MoleculeKind;
use std::path::Path;
use tracing::info;

pub fn run(args: MoleculeArgs) -> Result<()> {
    match args.command {
        MoleculeCommands::List => {
            println!("{}", list_molecules());
            Ok(())
        }
        MoleculeCommands::Show { key, output } => {
            let kind = MoleculeKind::from_key(&key).map_err(|e| CliError::Argument(e.to_string()))?;
            println!("{}", describe(kind)?);
            if let Some(path) = output {
                export(kind, &path)?;
                println!("Template written to: {}", path.display());
            }
            Ok(())
        }
    }
}

fn list_molecules() -> String {
    MoleculeKind::all()
        .iter()
        .map(|kind| {
            let aliases = kind
                .aliases()
                .into_iter()
                .filter(|alias| *alias != kind.key())
                .collect::<Vec<_>>();
            let aliases = if aliases.is_empty() {
                String::new()
            } else {
                format!(" (also: {})", aliases.join(", "))
            };
            format!("{:<12} {}{}", kind.key(), kind.description(), aliases)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe(kind: MoleculeKind) -> Result<String> {
    let compound = kind.load().map_err(|e| CliError::Other(e.into()))?;
    Ok(format!(
        "Name:        {}\nKey:         {}\nForce field: {}\nAtoms:       {}\nBonds:       {}\nCharge:      {:+.4} e\nMass:        {:.4} g/mol",
        compound.name(),
        kind.key(),
        kind.default_forcefield(),
        compound.n_atoms(),
        compound.n_bonds(),
        compound.charge(),
        compound.mass()
    ))
}

fn export(kind: MoleculeKind, path: &Path) -> Result<()> {
    let compound = kind.load().map_err(|e| CliError::Other(e.into()))?;
    let metadata = Mol2Metadata {
        title: kind.label().to_string(),
        ..Default::default()
    };
    info!("Exporting template '{}' to {:?}", kind.key(), path);
    Mol2File::write_to_path(&compound, &metadata, path).map_err(|e| CliError::FileWriting {
        path: path.to_path_buf(),
        source: e.into(),
    })
}
