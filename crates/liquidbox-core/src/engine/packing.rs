use super::config::{ConfigError, PackingConfig};
use super::progress::{Progress, ProgressReporter};
use crate::core::models::compound::Compound;
use crate::core::models::simbox::{AVOGADRO, NM3_PER_CM3, PackedBox, SimBox};
use crate::core::utils::geometry::{distance_squared, extent, random_point_in, random_rotation};
use nalgebra::{Point3, UnitQuaternion, Vector3};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Error, PartialEq)]
pub enum PackingError {
    #[error("No compounds to pack")]
    NoCompounds,
    #[error("Compound '{0}' has no atoms")]
    EmptyCompound(String),
    #[error("Got {targets} targets for {compounds} compounds")]
    TargetLengthMismatch { compounds: usize, targets: usize },
    #[error("Invalid target density {0} g/cm^3")]
    InvalidDensity(f64),
    #[error("Invalid composition ratios: {0}")]
    InvalidRatios(String),
    #[error("Invalid box: {0}")]
    InvalidBox(String),
    #[error("Compound '{name}' spans {size:.3} nm which does not fit the usable box width of {available:.3} nm")]
    MoleculeTooLarge {
        name: String,
        size: f64,
        available: f64,
    },
    #[error("Only {placed} of {requested} molecules are free of overlaps after {attempts} relaxation sweeps")]
    CannotPlace {
        placed: usize,
        requested: usize,
        attempts: usize,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// How many copies of each compound to pack.
#[derive(Debug, Clone, PartialEq)]
pub enum FillTarget {
    /// One count per compound.
    Counts(Vec<usize>),
    /// A total mass density, split between compounds by relative number `ratios`.
    Density { grams_per_cm3: f64, ratios: Vec<f64> },
}

impl FillTarget {
    pub fn count(n: usize) -> Self {
        Self::Counts(vec![n])
    }

    pub fn density(grams_per_cm3: f64) -> Self {
        Self::Density {
            grams_per_cm3,
            ratios: vec![1.0],
        }
    }

    /// Resolves the target into one molecule count per compound.
    ///
    /// For a density target the total count is
    /// `floor(rho * V * N_A / mean_molar_mass)`, with the mean molar mass weighted
    /// by the normalized ratios; each compound then receives `round(prop_i * n)`.
    pub fn resolve(&self, compounds: &[Compound], sim_box: &SimBox) -> Result<Vec<usize>, PackingError> {
        match self {
            Self::Counts(counts) => {
                if counts.len() != compounds.len() {
                    return Err(PackingError::TargetLengthMismatch {
                        compounds: compounds.len(),
                        targets: counts.len(),
                    });
                }
                Ok(counts.clone())
            }
            Self::Density {
                grams_per_cm3,
                ratios,
            } => {
                if ratios.len() != compounds.len() {
                    return Err(PackingError::TargetLengthMismatch {
                        compounds: compounds.len(),
                        targets: ratios.len(),
                    });
                }
                if !grams_per_cm3.is_finite() || *grams_per_cm3 <= 0.0 {
                    return Err(PackingError::InvalidDensity(*grams_per_cm3));
                }
                if ratios.iter().any(|r| !r.is_finite() || *r < 0.0) {
                    return Err(PackingError::InvalidRatios(format!(
                        "ratios must be non-negative, got {ratios:?}"
                    )));
                }
                let total: f64 = ratios.iter().sum();
                if total <= 0.0 {
                    return Err(PackingError::InvalidRatios("ratios sum to zero".to_string()));
                }

                let proportions: Vec<f64> = ratios.iter().map(|r| r / total).collect();
                let mean_mass: f64 = proportions
                    .iter()
                    .zip(compounds)
                    .map(|(p, c)| p * c.mass())
                    .sum();
                if mean_mass <= 0.0 {
                    return Err(PackingError::InvalidRatios(
                        "weighted molar mass of the compounds is zero".to_string(),
                    ));
                }

                let grams = grams_per_cm3 * sim_box.volume() / NM3_PER_CM3;
                let n = (grams * AVOGADRO / mean_mass).floor();
                Ok(proportions
                    .iter()
                    .map(|p| (p * n).round() as usize)
                    .collect())
            }
        }
    }
}

/// Pair distance, in units of `overlap`, below which atoms start to repel.
const CONTACT_MARGIN: f64 = 1.05;
/// Repulsion per clashing pair as a fraction of the pair separation.
const STIFFNESS: f64 = 0.2;
/// Largest centroid shift per sweep, in units of `overlap`.
const MAX_SHIFT: f64 = 0.1;
/// Largest rotation per sweep, in radians.
const MAX_TURN: f64 = 0.2;
/// Fraction of a lattice cell a seed may be jittered by along each axis.
const JITTER: f64 = 0.5;
const MAX_CELLS_PER_AXIS: usize = 64;

/// Uniform grid over the box holding atom indices, used to find close pairs.
///
/// Cells are at least `cutoff` wide, so every pair closer than `cutoff` lies in
/// neighbouring cells. The number of cells per axis is capped, which keeps the
/// grid small for tiny cutoffs.
struct CellGrid {
    cell_size: Vector3<f64>,
    dims: [usize; 3],
    cells: Vec<Vec<usize>>,
}

impl CellGrid {
    fn new(lengths: &Vector3<f64>, cutoff: f64) -> Self {
        let cell_size = lengths.map(|l| cutoff.max(l / MAX_CELLS_PER_AXIS as f64));
        let dims = [0usize, 1, 2].map(|axis| {
            ((lengths[axis] / cell_size[axis]).floor() as usize).clamp(1, MAX_CELLS_PER_AXIS)
        });
        Self {
            cell_size,
            dims,
            cells: vec![Vec::new(); dims[0] * dims[1] * dims[2]],
        }
    }

    fn cell_of(&self, p: &Point3<f64>) -> [usize; 3] {
        [0usize, 1, 2].map(|axis| {
            ((p[axis] / self.cell_size[axis]).floor().max(0.0) as usize).min(self.dims[axis] - 1)
        })
    }

    fn flat(&self, c: [usize; 3]) -> usize {
        (c[0] * self.dims[1] + c[1]) * self.dims[2] + c[2]
    }

    fn rebuild(&mut self, positions: &[Point3<f64>]) {
        for cell in &mut self.cells {
            cell.clear();
        }
        for (index, p) in positions.iter().enumerate() {
            let cell = self.flat(self.cell_of(p));
            self.cells[cell].push(index);
        }
    }

    /// Calls `visit` with every stored index in the cells around `p`.
    fn for_each_near(&self, p: &Point3<f64>, mut visit: impl FnMut(usize)) {
        let center = self.cell_of(p);
        let range = |c: usize, n: usize| c.saturating_sub(1)..=(c + 1).min(n - 1);
        for i in range(center[0], self.dims[0]) {
            for j in range(center[1], self.dims[1]) {
                for k in range(center[2], self.dims[2]) {
                    for &index in &self.cells[self.flat([i, j, k])] {
                        visit(index);
                    }
                }
            }
        }
    }
}

/// A compound template in its centroid frame.
struct Template {
    compound: Compound,
    frame: Vec<Vector3<f64>>,
    /// Sum of squared atom distances from the centroid.
    inertia: f64,
    rotatable: bool,
}

impl Template {
    fn new(compound: &Compound, available: &Vector3<f64>, fix_orientation: bool) -> Result<Self, PackingError> {
        let mut compound = compound.clone();
        compound.translate(&-compound.centroid().coords);
        let rotatable = check_fits(&compound, available, fix_orientation)?;
        let frame: Vec<Vector3<f64>> = compound.atoms().map(|a| a.position.coords).collect();
        let inertia: f64 = frame.iter().map(|r| r.norm_squared()).sum();
        Ok(Self {
            compound,
            frame,
            inertia,
            rotatable,
        })
    }
}

/// One packed copy, held as a rigid body until the box is assembled.
struct Body {
    template: usize,
    center: Vector3<f64>,
    orientation: UnitQuaternion<f64>,
}

impl Body {
    fn positions<'a>(&'a self, template: &'a Template) -> impl Iterator<Item = Point3<f64>> + 'a {
        template
            .frame
            .iter()
            .map(move |r| Point3::from(self.center + self.orientation * r))
    }

    /// Shifts the body so that every atom lies within `[wall_lo, wall_hi]`.
    fn fit_within(&mut self, template: &Template, wall_lo: &Point3<f64>, wall_hi: &Point3<f64>) {
        let mut lo = Vector3::repeat(f64::INFINITY);
        let mut hi = Vector3::repeat(f64::NEG_INFINITY);
        for p in self.positions(template) {
            lo = lo.inf(&p.coords);
            hi = hi.sup(&p.coords);
        }
        for axis in 0..3 {
            if lo[axis] < wall_lo[axis] {
                self.center[axis] += wall_lo[axis] - lo[axis];
            } else if hi[axis] > wall_hi[axis] {
                self.center[axis] -= hi[axis] - wall_hi[axis];
            }
        }
    }
}

/// Packs copies of `compounds` into `sim_box`.
///
/// See [`fill_box_with_progress`].
pub fn fill_box(
    compounds: &[Compound],
    target: &FillTarget,
    sim_box: &SimBox,
    config: &PackingConfig,
) -> Result<PackedBox, PackingError> {
    fill_box_with_progress(compounds, target, sim_box, config, &ProgressReporter::new())
}

/// Packs copies of `compounds` into `sim_box`.
///
/// Packing runs in two stages. Copies are first seeded, compound by compound in
/// input order, at jittered sites of a lattice spanning `[edge, L - edge]` on
/// each axis, each with a uniform random orientation unless orientations are
/// fixed. Clashes left by the seeding are then relaxed: every sweep treats the
/// copies as rigid bodies, pushes apart atoms of different molecules that sit
/// closer than the contact distance, and turns each copy by the torque of those
/// pushes. After every move a copy is shifted back inside the walls. Packing
/// ends once no two atoms of different molecules are closer than `overlap`.
///
/// # Arguments
///
/// * `compounds` - Molecule templates; copies keep the template's name.
/// * `target` - Molecule counts or a target density.
/// * `sim_box` - The box to fill.
/// * `config` - Packing parameters, including the RNG seed.
/// * `reporter` - Receives one `TaskIncrement` per seeded molecule.
///
/// # Return
///
/// A [`PackedBox`] holding exactly the requested number of molecules. The result
/// depends only on the inputs and the seed.
///
/// # Errors
///
/// Returns [`PackingError::CannotPlace`] when clashes remain after
/// `max_attempts` relaxation sweeps, and other variants for invalid inputs.
#[instrument(skip_all, name = "fill_box")]
pub fn fill_box_with_progress(
    compounds: &[Compound],
    target: &FillTarget,
    sim_box: &SimBox,
    config: &PackingConfig,
    reporter: &ProgressReporter,
) -> Result<PackedBox, PackingError> {
    config.validate()?;
    if compounds.is_empty() {
        return Err(PackingError::NoCompounds);
    }
    if let Some(empty) = compounds.iter().find(|c| c.is_empty()) {
        return Err(PackingError::EmptyCompound(empty.name().to_string()));
    }

    let counts = target.resolve(compounds, sim_box)?;
    let requested: usize = counts.iter().sum();
    let lengths = *sim_box.lengths();
    let available = lengths.add_scalar(-2.0 * config.edge);
    if available.min() <= 0.0 {
        return Err(PackingError::InvalidBox(format!(
            "edge margin {} nm leaves no usable space in a {:.3} x {:.3} x {:.3} nm box",
            config.edge, lengths.x, lengths.y, lengths.z
        )));
    }

    let templates = compounds
        .iter()
        .map(|c| Template::new(c, &available, config.fix_orientation))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        requested,
        box_x = lengths.x,
        box_y = lengths.y,
        box_z = lengths.z,
        seed = config.seed,
        "Packing box."
    );
    reporter.report(Progress::TaskStart {
        total: requested as u64,
    });

    let wall_lo = Point3::new(config.edge, config.edge, config.edge);
    let wall_hi = Point3::from(lengths.add_scalar(-config.edge));
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut bodies = seed_lattice(&templates, &counts, &wall_lo, &wall_hi, &mut rng, reporter);
    if config.overlap > 0.0 && bodies.len() > 1 {
        relax(&mut bodies, &templates, &lengths, &wall_lo, &wall_hi, config)?;
    }

    let mut packed = PackedBox::new(*sim_box);
    packed.molecules.reserve(requested);
    for body in &bodies {
        let template = &templates[body.template];
        let mut molecule = template.compound.clone();
        for (id, p) in template.compound.atom_ids().iter().zip(body.positions(template)) {
            if let Some(atom) = molecule.atom_mut(*id) {
                atom.position = p;
            }
        }
        packed.molecules.push(molecule);
    }

    reporter.report(Progress::TaskFinish);
    info!(
        molecules = packed.n_molecules(),
        atoms = packed.n_atoms(),
        density = packed.density(),
        "Packing finished."
    );
    Ok(packed)
}

/// Checks that a centered template fits the usable box, returning whether it
/// may be rotated freely.
fn check_fits(template: &Compound, available: &Vector3<f64>, fix_orientation: bool) -> Result<bool, PackingError> {
    let Some((lo, hi)) = template.bounds() else {
        return Ok(!fix_orientation);
    };
    let size = extent(&lo, &hi);
    let fits_as_is = (0..3).all(|axis| size[axis] <= available[axis]);
    let diameter = 2.0
        * template
            .atoms()
            .map(|a| a.position.coords.norm())
            .fold(0.0, f64::max);
    let fits_any_orientation = diameter <= available.min();

    if !fix_orientation && fits_any_orientation {
        Ok(true)
    } else if fits_as_is {
        Ok(false)
    } else {
        Err(PackingError::MoleculeTooLarge {
            name: template.name().to_string(),
            size: if fix_orientation { size.max() } else { diameter },
            available: available.min(),
        })
    }
}

/// Lattice with at least `n` sites whose spacing is as even as the span allows.
fn lattice_dims(n: usize, span: &Vector3<f64>) -> [usize; 3] {
    let spacing = (span.x * span.y * span.z / n.max(1) as f64).cbrt();
    let mut dims = [0usize, 1, 2].map(|axis| ((span[axis] / spacing).floor() as usize).max(1));
    while dims.iter().product::<usize>() < n {
        let widest = (0..3)
            .max_by(|&a, &b| (span[a] / dims[a] as f64).total_cmp(&(span[b] / dims[b] as f64)))
            .unwrap_or(0);
        dims[widest] += 1;
    }
    dims
}

fn seed_lattice(
    templates: &[Template],
    counts: &[usize],
    wall_lo: &Point3<f64>,
    wall_hi: &Point3<f64>,
    rng: &mut StdRng,
    reporter: &ProgressReporter,
) -> Vec<Body> {
    let requested: usize = counts.iter().sum();
    let span = wall_hi - wall_lo;
    let dims = lattice_dims(requested, &span);
    let cell = Vector3::new(
        span.x / dims[0] as f64,
        span.y / dims[1] as f64,
        span.z / dims[2] as f64,
    );
    debug!(nx = dims[0], ny = dims[1], nz = dims[2], "Seeding lattice.");

    let mut sites = Vec::with_capacity(dims[0] * dims[1] * dims[2]);
    for i in 0..dims[0] {
        for j in 0..dims[1] {
            for k in 0..dims[2] {
                let offset = Vector3::new(i as f64 + 0.5, j as f64 + 0.5, k as f64 + 0.5);
                sites.push(wall_lo + offset.component_mul(&cell));
            }
        }
    }
    sites.shuffle(rng);

    let half_jitter = cell * (0.5 * JITTER);
    let mut bodies = Vec::with_capacity(requested);
    for ((index, template), &count) in templates.iter().enumerate().zip(counts) {
        debug!(compound = template.compound.name(), count, "Seeding compound copies.");
        for site in sites.drain(..count) {
            let center = random_point_in(&(site - half_jitter), &(site + half_jitter), rng);
            let orientation = if template.rotatable {
                random_rotation(rng)
            } else {
                UnitQuaternion::identity()
            };
            let mut body = Body {
                template: index,
                center: center.coords,
                orientation,
            };
            body.fit_within(template, wall_lo, wall_hi);
            bodies.push(body);
            reporter.report(Progress::TaskIncrement);
        }
    }
    bodies
}

/// Moves the bodies until no two atoms of different molecules are closer than
/// `config.overlap`.
fn relax(
    bodies: &mut [Body],
    templates: &[Template],
    lengths: &Vector3<f64>,
    wall_lo: &Point3<f64>,
    wall_hi: &Point3<f64>,
    config: &PackingConfig,
) -> Result<(), PackingError> {
    let contact = config.overlap * CONTACT_MARGIN;
    let contact_sq = contact * contact;
    let overlap_sq = config.overlap * config.overlap;
    let max_shift = MAX_SHIFT * config.overlap;

    let mut grid = CellGrid::new(lengths, contact);
    let mut positions = Vec::new();
    let mut owner = Vec::new();
    let mut forces: Vec<Vector3<f64>> = Vec::new();

    for sweep in 0..=config.max_attempts {
        positions.clear();
        owner.clear();
        for (index, body) in bodies.iter().enumerate() {
            for p in body.positions(&templates[body.template]) {
                positions.push(p);
                owner.push(index);
            }
        }
        grid.rebuild(&positions);
        forces.clear();
        forces.resize(positions.len(), Vector3::zeros());

        let mut clashes = 0usize;
        let mut clashing = vec![false; bodies.len()];
        for (i, p) in positions.iter().enumerate() {
            grid.for_each_near(p, |j| {
                if owner[j] <= owner[i] {
                    return;
                }
                let dd = distance_squared(p, &positions[j]);
                if dd >= contact_sq {
                    return;
                }
                let push = (p - positions[j]) * (STIFFNESS * (contact_sq - dd) / contact_sq);
                forces[i] += push;
                forces[j] -= push;
                if dd < overlap_sq {
                    clashes += 1;
                    clashing[owner[i]] = true;
                    clashing[owner[j]] = true;
                }
            });
        }

        if clashes == 0 {
            debug!(sweeps = sweep, "Overlaps resolved.");
            return Ok(());
        }
        if sweep == config.max_attempts {
            let placed = clashing.iter().filter(|c| !**c).count();
            warn!(clashes, placed, "Overlaps remain after relaxation.");
            return Err(PackingError::CannotPlace {
                placed,
                requested: bodies.len(),
                attempts: config.max_attempts,
            });
        }
        if sweep % 100 == 0 {
            debug!(sweep, clashes, "Relaxing overlaps.");
        }

        let mut start = 0;
        for body in bodies.iter_mut() {
            let template = &templates[body.template];
            let body_forces = &forces[start..start + template.frame.len()];
            start += template.frame.len();

            let mut force = Vector3::zeros();
            let mut torque = Vector3::zeros();
            for (r, f) in template.frame.iter().zip(body_forces) {
                force += f;
                torque += (body.orientation * r).cross(f);
            }
            if force == Vector3::zeros() && torque == Vector3::zeros() {
                continue;
            }

            body.center += cap_norm(force, max_shift);
            if template.rotatable && template.inertia > 0.0 {
                let turn = cap_norm(torque / template.inertia, MAX_TURN);
                body.orientation = UnitQuaternion::from_scaled_axis(turn) * body.orientation;
            }
            body.fit_within(template, wall_lo, wall_hi);
        }
    }
    Ok(())
}

fn cap_norm(v: Vector3<f64>, max: f64) -> Vector3<f64> {
    let norm = v.norm();
    if norm > max { v * (max / norm) } else { v }
}
