use crate::cli::OutputFormat;
use crate::error::{CliError, Result};
use liquidbox::core::io::mol2::Mol2File;
use liquidbox::core::io::pdb::PdbFile;
use liquidbox::core::io::traits::BoxFile;
use liquidbox::core::models::simbox::PackedBox;
use std::path::{Path, PathBuf};
use tracing::info;

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdb => PdbFile::EXTENSION,
            Self::Mol2 => Mol2File::EXTENSION,
        }
    }

    /// Picks the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("pdb") => Ok(Self::Pdb),
            Some("mol2") => Ok(Self::Mol2),
            _ => Err(CliError::Argument(format!(
                "Cannot infer output format from '{}' (expected .pdb or .mol2)",
                path.display()
            ))),
        }
    }
}

/// `<prefix>_<suffix>.<ext>`, e.g. `out/box_liq.pdb`.
pub fn box_path(prefix: &Path, suffix: &str, format: OutputFormat) -> PathBuf {
    let mut name = prefix.as_os_str().to_owned();
    name.push(format!("_{}.{}", suffix, format.extension()));
    PathBuf::from(name)
}

fn write_with<F>(packed: &PackedBox, path: &Path) -> Result<()>
where
    F: BoxFile,
    F::Error: Send + Sync + 'static,
{
    F::write_box_to_path(packed, path).map_err(|e| CliError::FileWriting {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

pub fn write_box(packed: &PackedBox, path: &Path, format: OutputFormat) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    info!("Writing {} molecules to {:?}", packed.n_molecules(), path);
    match format {
        OutputFormat::Pdb => write_with::<PdbFile>(packed, path),
        OutputFormat::Mol2 => write_with::<Mol2File>(packed, path),
    }
}

/// One-line description of a packed box for the console.
pub fn summarize(label: &str, packed: &PackedBox) -> String {
    let lengths = packed.sim_box.lengths();
    format!(
        "{:<7} {} molecules, {} atoms, box {:.3} x {:.3} x {:.3} nm, density {:.4} g/cm³",
        label,
        packed.n_molecules(),
        packed.n_atoms(),
        lengths.x,
        lengths.y,
        lengths.z,
        packed.density()
    )
}
