use crate::core::models::simbox::{PackedBox, SimBox};
use crate::core::molecules::library::MoleculeKind;
use crate::engine::config::PackingConfig;
use crate::engine::error::EngineError;
use crate::engine::packing::{FillTarget, fill_box_with_progress};
use crate::engine::progress::ProgressReporter;
use tracing::{info, instrument, warn};

/// Parameters for a sodium chloride box.
#[derive(Debug, Clone, PartialEq)]
pub struct IonBoxConfig {
    pub n_cations: usize,
    pub n_anions: usize,
    /// Cubic box edge in nm.
    pub box_length: f64,
    pub cation_name: String,
    pub anion_name: String,
    pub packing: PackingConfig,
}

impl Default for IonBoxConfig {
    fn default() -> Self {
        Self {
            n_cations: 2,
            n_anions: 2,
            box_length: 1.0,
            cation_name: String::from("SOD"),
            anion_name: String::from("CLA"),
            packing: PackingConfig::default(),
        }
    }
}

/// Packs sodium and chloride ions into a cubic box.
///
/// Cations are placed first, then anions. A non-neutral result is allowed
/// but logged as a warning.
#[instrument(skip_all, name = "ion_box")]
pub fn build_ion_box(config: &IonBoxConfig, reporter: &ProgressReporter) -> Result<PackedBox, EngineError> {
    let mut cation = MoleculeKind::Sodium.load()?;
    cation.set_name(&config.cation_name);
    let mut anion = MoleculeKind::Chloride.load()?;
    anion.set_name(&config.anion_name);

    let sim_box = SimBox::cubic(config.box_length)?;
    let target = FillTarget::Counts(vec![config.n_cations, config.n_anions]);

    let packed = reporter
        .phase("Ion box", || {
            fill_box_with_progress(&[cation, anion], &target, &sim_box, &config.packing, reporter)
        })
        .map_err(|source| EngineError::Packing { phase: "ion", source })?;

    let net_charge = packed.net_charge();
    if net_charge.abs() > 1e-6 {
        warn!(net_charge, "Ion box is not neutral.");
    }
    info!(
        cations = config.n_cations,
        anions = config.n_anions,
        net_charge,
        "Workflow complete."
    );
    Ok(packed)
}
