use crate::core::forcefield::params::Forcefield;
use crate::core::forcefield::typing::Typer;
use crate::core::models::compound::Compound;
use crate::core::models::simbox::{PackedBox, SimBox};
use crate::core::molecules::library::MoleculeKind;
use crate::core::statepoint::Statepoint;
use crate::engine::config::{BuildConfig, PackingConfig};
use crate::engine::constraint::constrain_box;
use crate::engine::error::EngineError;
use crate::engine::packing::{FillTarget, fill_box_with_progress};
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument};

/// The boxes produced for one statepoint.
#[derive(Debug, Clone)]
pub struct BuiltSystem {
    pub molecule: MoleculeKind,
    pub liquid: PackedBox,
    pub vapor: Option<PackedBox>,
    /// Whether bond lengths were projected onto the force-field values.
    pub constrained: bool,
}

impl BuiltSystem {
    /// The liquid box followed by the vapor box, if any.
    pub fn boxes(&self) -> [Option<&PackedBox>; 2] {
        [Some(&self.liquid), self.vapor.as_ref()]
    }
}

/// Resolves the statepoint's `molecule` key.
pub fn molecule_kind(sp: &Statepoint) -> Result<MoleculeKind, EngineError> {
    Ok(MoleculeKind::from_key(sp.require_molecule()?)?)
}

/// Loads the molecule named by the statepoint and renames it to `residue_name`.
///
/// # Errors
///
/// Fails when the `molecule` key is missing or unknown, or when the template
/// cannot be parsed.
pub fn get_molecule(sp: &Statepoint, residue_name: &str) -> Result<Compound, EngineError> {
    let mut molecule = molecule_kind(sp)?.load()?;
    molecule.set_name(residue_name);
    Ok(molecule)
}

/// Builds the liquid box, the optional vapor box, and optionally constrains
/// bond lengths for the job described by `sp`.
///
/// The liquid box has edges `box_L_liq_{x,y,z}` scaled by `scale_liq_box` and is
/// filled to `init_liq_den` when the statepoint carries a non-empty `pdbid`, or
/// with `N_liquid` molecules otherwise. A cubic vapor box of edge
/// `box_L_vap * scale_vap_box` holding `N_vap` molecules is built only when both
/// keys are present and non-zero. Constraints are skipped for methane, which has
/// no bonds.
///
/// # Errors
///
/// Returns [`EngineError`] for missing statepoint keys, unknown molecules or
/// force fields, packing failures, and solver non-convergence.
#[instrument(skip_all, name = "construct_system")]
pub fn construct_system(
    sp: &Statepoint,
    config: &BuildConfig,
    reporter: &ProgressReporter,
) -> Result<BuiltSystem, EngineError> {
    config.validate()?;
    let kind = molecule_kind(sp)?;
    let molecule = get_molecule(sp, &config.residue_name)?;
    info!(
        molecule = kind.key(),
        residue = %config.residue_name,
        "Building system."
    );

    let liquid = reporter.phase("Liquid box", || build_liquid(sp, &molecule, config, reporter))?;

    let vapor = match sp.vapor() {
        Some((length, count)) => Some(reporter.phase("Vapor box", || {
            build_vapor(length, count, &molecule, config, reporter)
        })?),
        None => {
            info!("No vapor box requested.");
            None
        }
    };

    let mut system = BuiltSystem {
        molecule: kind,
        liquid,
        vapor,
        constrained: false,
    };

    if !config.constrain || kind == MoleculeKind::MethaneUa {
        return Ok(system);
    }

    reporter.phase("Bond constraints", || constrain_system(sp, &molecule, config, &mut system, reporter))?;
    system.constrained = true;
    Ok(system)
}

fn build_liquid(
    sp: &Statepoint,
    molecule: &Compound,
    config: &BuildConfig,
    reporter: &ProgressReporter,
) -> Result<PackedBox, EngineError> {
    let [x, y, z] = sp.require_liquid_box()?;
    let sim_box = SimBox::new(x, y, z)?.scaled(config.scale_liq_box)?;
    let target = if sp.fills_by_density() {
        FillTarget::density(sp.require_init_liq_den()?)
    } else {
        FillTarget::count(sp.require_n_liquid()?)
    };
    let packing = PackingConfig {
        fix_orientation: config.fix_orientation,
        ..config.packing.clone()
    };

    fill_box_with_progress(std::slice::from_ref(molecule), &target, &sim_box, &packing, reporter)
        .map_err(|source| EngineError::Packing {
            phase: "liquid",
            source,
        })
}

fn build_vapor(
    length: f64,
    count: usize,
    molecule: &Compound,
    config: &BuildConfig,
    reporter: &ProgressReporter,
) -> Result<PackedBox, EngineError> {
    let sim_box = SimBox::cubic(length)?.scaled(config.scale_vap_box)?;
    let packing = PackingConfig {
        fix_orientation: false,
        seed: config.packing.seed.wrapping_add(1),
        ..config.packing.clone()
    };

    fill_box_with_progress(
        std::slice::from_ref(molecule),
        &FillTarget::count(count),
        &sim_box,
        &packing,
        reporter,
    )
    .map_err(|source| EngineError::Packing {
        phase: "vapor",
        source,
    })
}

fn constrain_system(
    sp: &Statepoint,
    molecule: &Compound,
    config: &BuildConfig,
    system: &mut BuiltSystem,
    reporter: &ProgressReporter,
) -> Result<(), EngineError> {
    let forcefield = Forcefield::resolve(sp.require_forcefield_name()?)?;
    let typed = Typer::new(&forcefield).apply(molecule)?;
    info!(
        forcefield = forcefield.name(),
        bonds = typed.bonds.len(),
        "Constraining bond lengths."
    );

    let present = usize::from(system.vapor.is_some()) + 1;
    reporter.report(Progress::TaskStart {
        total: present as u64,
    });
    let phases = [("liquid", Some(&mut system.liquid)), ("vapor", system.vapor.as_mut())];
    for (phase, packed) in phases {
        let Some(packed) = packed else {
            continue;
        };
        constrain_box(packed, &typed, &config.constraint)
            .map_err(|source| EngineError::Constraint { phase, source })?;
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::statepoint::StatepointError;
    use crate::engine::packing::PackingError;

    fn water_statepoint(molecule: &str) -> Statepoint {
        Statepoint {
            molecule: Some(molecule.to_string()),
            n_liquid: Some(30),
            box_l_liq_x: Some(2.0),
            box_l_liq_y: Some(2.0),
            box_l_liq_z: Some(2.0),
            forcefield_name: Some("spce".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn get_molecule_selects_model_and_renames() {
        let sp = water_statepoint("waterSPCE");
        let molecule = get_molecule(&sp, "WAT").unwrap();
        assert_eq!(molecule.name(), "WAT");
        assert_eq!(molecule.n_atoms(), 3);

        let sp = water_statepoint("tip4p_2005");
        let molecule = get_molecule(&sp, "SOL").unwrap();
        assert_eq!(molecule.name(), "SOL");
        assert_eq!(molecule.n_atoms(), 4);
    }

    #[test]
    fn get_molecule_reports_missing_and_unknown_keys() {
        let err = get_molecule(&Statepoint::default(), "WAT").unwrap_err();
        assert!(matches!(
            err,
            EngineError::Statepoint(StatepointError::MissingKey("molecule"))
        ));
        let err = get_molecule(&water_statepoint("argon"), "WAT").unwrap_err();
        assert!(matches!(err, EngineError::UnknownMolecule(_)));
    }

    #[test]
    fn liquid_box_matches_requested_count() {
        let sp = water_statepoint("spce");
        let system = construct_system(&sp, &BuildConfig::default(), &ProgressReporter::new()).unwrap();
        assert_eq!(system.molecule, MoleculeKind::Spce);
        assert_eq!(system.liquid.n_molecules(), 30);
        assert!(system.vapor.is_none());
        assert!(!system.constrained);
        assert_eq!(system.boxes()[1].map(PackedBox::n_molecules), None);
        assert!(system.liquid.molecules.iter().all(|m| m.name() == "WAT"));
    }

    #[test]
    fn scale_factor_grows_liquid_box() {
        let sp = water_statepoint("spce");
        let config = BuildConfig {
            scale_liq_box: 1.5,
            ..Default::default()
        };
        let system = construct_system(&sp, &config, &ProgressReporter::new()).unwrap();
        assert!((system.liquid.sim_box.lengths().x - 3.0).abs() < 1e-12);
    }

    #[test]
    fn missing_count_is_reported() {
        let mut sp = water_statepoint("spce");
        sp.n_liquid = None;
        let err = construct_system(&sp, &BuildConfig::default(), &ProgressReporter::new()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Statepoint(StatepointError::MissingKey("N_liquid"))
        ));
    }

    #[test]
    fn packing_failure_names_the_phase() {
        let mut sp = water_statepoint("spce");
        sp.n_liquid = Some(2000);
        let config = BuildConfig {
            packing: PackingConfig {
                max_attempts: 50,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = construct_system(&sp, &config, &ProgressReporter::new()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Packing {
                phase: "liquid",
                source: PackingError::CannotPlace { .. }
            }
        ));
    }

    #[test]
    fn methane_is_never_constrained() {
        let mut sp = water_statepoint("methaneUA");
        sp.forcefield_name = None;
        let config = BuildConfig {
            constrain: true,
            ..Default::default()
        };
        let system = construct_system(&sp, &config, &ProgressReporter::new()).unwrap();
        assert!(!system.constrained);
    }

    #[test]
    fn constraining_requires_forcefield_name() {
        let mut sp = water_statepoint("spce");
        sp.forcefield_name = None;
        let config = BuildConfig {
            constrain: true,
            ..Default::default()
        };
        let err = construct_system(&sp, &config, &ProgressReporter::new()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Statepoint(StatepointError::MissingKey("forcefield_name"))
        ));
    }
}
