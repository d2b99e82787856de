use super::config::ConstraintConfig;
use crate::core::forcefield::typing::TypedMolecule;
use crate::core::io::ANGSTROM_PER_NM;
use crate::core::models::compound::{Compound, CoordinateCountError};
use crate::core::models::simbox::PackedBox;
use nalgebra::Point3;
use thiserror::Error;
use tracing::{info, instrument, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Squared distances below this (Å²) leave a bond without a usable direction.
const DEGENERATE_LENGTH_SQ: f64 = 1e-12;

#[derive(Debug, Error, PartialEq)]
pub enum ConstraintError {
    #[error("Bond constraints did not converge after {iterations} iterations (max relative error {max_error:e})")]
    NotConverged { iterations: usize, max_error: f64 },
    #[error(transparent)]
    CoordinateCount(#[from] CoordinateCountError),
    #[error("Bond between atoms {i} and {j} is degenerate")]
    DegenerateBond { i: usize, j: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct BondConstraint {
    i: usize,
    j: usize,
    /// Target length squared, Å².
    target_sq: f64,
}

/// Outcome of a successful [`ConstrainedMolecule::solve`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SolveReport {
    pub iterations: usize,
    /// Largest `|r² - r0²| / r0²` over all bonds after the final iteration.
    pub max_relative_error: f64,
}

/// Projects a molecule's geometry onto exact force-field bond lengths.
///
/// Coordinates handed to and returned from the solver are in Å. The solver is
/// SHAKE with equal weights on every atom: each sweep moves both ends of every
/// violated bond symmetrically along the bond, which keeps the correction close
/// to the minimum total displacement.
#[derive(Debug, Clone)]
pub struct ConstrainedMolecule {
    bonds: Vec<BondConstraint>,
    xyz: Vec<Point3<f64>>,
    tolerance: f64,
    max_iterations: usize,
}

impl ConstrainedMolecule {
    /// Captures the bonds of `typed` with their lengths converted to Å, and its
    /// current coordinates as the starting geometry.
    pub fn new(typed: &TypedMolecule) -> Self {
        Self::with_config(typed, &ConstraintConfig::default())
    }

    pub fn with_config(typed: &TypedMolecule, config: &ConstraintConfig) -> Self {
        let bonds = typed
            .bonds
            .iter()
            .map(|b| {
                let length = b.length * ANGSTROM_PER_NM;
                BondConstraint {
                    i: b.i,
                    j: b.j,
                    target_sq: length * length,
                }
            })
            .collect();
        Self {
            bonds,
            xyz: to_angstrom(&typed.compound),
            tolerance: config.tolerance,
            max_iterations: config.max_iterations,
        }
    }

    pub fn n_constraints(&self) -> usize {
        self.bonds.len()
    }

    /// Replaces the working coordinates (Å).
    pub fn update_xyz(&mut self, xyz: &[Point3<f64>]) -> Result<(), ConstraintError> {
        if xyz.len() != self.xyz.len() {
            return Err(CoordinateCountError {
                expected: self.xyz.len(),
                found: xyz.len(),
            }
            .into());
        }
        self.xyz.copy_from_slice(xyz);
        Ok(())
    }

    /// The working coordinates (Å).
    pub fn xyz(&self) -> &[Point3<f64>] {
        &self.xyz
    }

    fn max_relative_error(&self) -> f64 {
        self.bonds
            .iter()
            .map(|b| {
                let r_sq = (self.xyz[b.j] - self.xyz[b.i]).norm_squared();
                (r_sq - b.target_sq).abs() / b.target_sq
            })
            .fold(0.0, f64::max)
    }

    /// Iterates SHAKE sweeps until every bond satisfies the tolerance.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError::DegenerateBond`] when a bond has (near) zero
    /// current or target length, and [`ConstraintError::NotConverged`] when the
    /// tolerance is not reached within `max_iterations` sweeps.
    pub fn solve(&mut self) -> Result<SolveReport, ConstraintError> {
        for b in &self.bonds {
            let r_sq = (self.xyz[b.j] - self.xyz[b.i]).norm_squared();
            if b.target_sq < DEGENERATE_LENGTH_SQ || r_sq < DEGENERATE_LENGTH_SQ {
                return Err(ConstraintError::DegenerateBond { i: b.i, j: b.j });
            }
        }

        let mut max_error = self.max_relative_error();
        let mut iterations = 0;
        while max_error > self.tolerance {
            if iterations == self.max_iterations {
                return Err(ConstraintError::NotConverged {
                    iterations,
                    max_error,
                });
            }
            for b in &self.bonds {
                let diff = self.xyz[b.j] - self.xyz[b.i];
                let r_sq = diff.norm_squared().max(DEGENERATE_LENGTH_SQ);
                // λ = (r² − r0²) / (2 · (1/m_i + 1/m_j) · r²) with unit masses
                let lambda = (r_sq - b.target_sq) / (4.0 * r_sq);
                let correction = diff * lambda;
                self.xyz[b.i] += correction;
                self.xyz[b.j] -= correction;
            }
            iterations += 1;
            max_error = self.max_relative_error();
        }

        trace!(iterations, max_error, "Constraint solve converged.");
        Ok(SolveReport {
            iterations,
            max_relative_error: max_error,
        })
    }
}

fn to_angstrom(compound: &Compound) -> Vec<Point3<f64>> {
    compound
        .xyz()
        .into_iter()
        .map(|p| p * ANGSTROM_PER_NM)
        .collect()
}

fn constrain_molecule(molecule: &mut Compound, solver: &ConstrainedMolecule) -> Result<SolveReport, ConstraintError> {
    let mut solver = solver.clone();
    solver.update_xyz(&to_angstrom(molecule))?;
    let report = solver.solve()?;
    let xyz: Vec<_> = solver.xyz().iter().map(|p| *p / ANGSTROM_PER_NM).collect();
    molecule.set_xyz(&xyz)?;
    Ok(report)
}

/// Summary of constraining every molecule of a box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConstraintSummary {
    pub molecules: usize,
    pub max_iterations: usize,
    pub max_relative_error: f64,
}

/// Applies bond constraints to every molecule of `packed`.
///
/// Every molecule must be a copy of `typed`'s template. Coordinates are converted
/// nm → Å for the solver and back afterwards. With the `parallel` feature the
/// molecules are processed on the rayon pool.
#[instrument(skip_all, name = "constrain_box", fields(molecules = packed.n_molecules()))]
pub fn constrain_box(
    packed: &mut PackedBox,
    typed: &TypedMolecule,
    config: &ConstraintConfig,
) -> Result<ConstraintSummary, ConstraintError> {
    let solver = ConstrainedMolecule::with_config(typed, config);
    if solver.n_constraints() == 0 {
        info!("Template has no bonds; nothing to constrain.");
        return Ok(ConstraintSummary {
            molecules: packed.n_molecules(),
            ..Default::default()
        });
    }

    #[cfg(not(feature = "parallel"))]
    let iterator = packed.molecules.iter_mut();

    #[cfg(feature = "parallel")]
    let iterator = packed.molecules.par_iter_mut();

    let reports: Vec<SolveReport> = iterator
        .map(|molecule| constrain_molecule(molecule, &solver))
        .collect::<Result<_, _>>()?;

    let summary = ConstraintSummary {
        molecules: reports.len(),
        max_iterations: reports.iter().map(|r| r.iterations).max().unwrap_or(0),
        max_relative_error: reports
            .iter()
            .map(|r| r.max_relative_error)
            .fold(0.0, f64::max),
    };
    info!(
        molecules = summary.molecules,
        max_iterations = summary.max_iterations,
        max_relative_error = summary.max_relative_error,
        "Bond constraints applied."
    );
    Ok(summary)
}
