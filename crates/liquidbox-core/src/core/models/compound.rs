use super::atom::Atom;
use super::ids::AtomId;
use super::topology::{Bond, BondOrder};
use nalgebra::{Point3, UnitQuaternion, Vector3};
use slotmap::{SecondaryMap, SlotMap};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Coordinate count mismatch: compound has {expected} atoms but {found} positions were given")]
pub struct CoordinateCountError {
    pub expected: usize,
    pub found: usize,
}

/// A named molecule: an ordered set of atoms and the bond graph between them.
///
/// Atoms keep their insertion order, which is the order used by file writers and
/// by [`xyz`](Self::xyz)/[`set_xyz`](Self::set_xyz). Cloning a compound keeps its
/// atom IDs, so every copy of a template placed in a box shares the template's
/// IDs and bond list.
#[derive(Debug, Clone, Default)]
pub struct Compound {
    name: String,
    atoms: SlotMap<AtomId, Atom>,
    order: Vec<AtomId>,
    bonds: Vec<Bond>,
    bond_adjacency: SecondaryMap<AtomId, Vec<AtomId>>,
}

impl Compound {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn add_atom(&mut self, atom: Atom) -> AtomId {
        let atom_id = self.atoms.insert(atom);
        self.order.push(atom_id);
        self.bond_adjacency.insert(atom_id, Vec::new());
        atom_id
    }

    /// Adds a bond between two atoms.
    ///
    /// The operation is idempotent; adding an existing bond succeeds without
    /// creating a duplicate.
    ///
    /// # Arguments
    ///
    /// * `atom1_id` - ID of the first atom.
    /// * `atom2_id` - ID of the second atom.
    /// * `order` - The order of the bond.
    ///
    /// # Return
    ///
    /// Returns `Some(())` on success, or `None` if either atom is not part of this compound.
    pub fn add_bond(&mut self, atom1_id: AtomId, atom2_id: AtomId, order: BondOrder) -> Option<()> {
        if !self.atoms.contains_key(atom1_id) || !self.atoms.contains_key(atom2_id) {
            return None;
        }
        if self
            .bond_adjacency
            .get(atom1_id)
            .is_some_and(|n| n.contains(&atom2_id))
        {
            return Some(());
        }

        self.bonds.push(Bond::new(atom1_id, atom2_id, order));
        self.bond_adjacency[atom1_id].push(atom2_id);
        self.bond_adjacency[atom2_id].push(atom1_id);
        Some(())
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    pub fn atom_ids(&self) -> &[AtomId] {
        &self.order
    }

    /// Iterates over atoms in insertion order.
    pub fn atoms(&self) -> impl Iterator<Item = &Atom> {
        self.order.iter().filter_map(|&id| self.atoms.get(id))
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn neighbors(&self, id: AtomId) -> &[AtomId] {
        self.bond_adjacency
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Position of `id` in insertion order.
    pub fn index_of(&self, id: AtomId) -> Option<usize> {
        self.order.iter().position(|&a| a == id)
    }

    /// Bonds expressed as pairs of insertion-order indices.
    pub fn bond_indices(&self) -> Vec<(usize, usize)> {
        self.bonds
            .iter()
            .filter_map(|b| Some((self.index_of(b.atom1_id)?, self.index_of(b.atom2_id)?)))
            .collect()
    }

    pub fn n_atoms(&self) -> usize {
        self.order.len()
    }

    pub fn n_bonds(&self) -> usize {
        self.bonds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn xyz(&self) -> Vec<Point3<f64>> {
        self.atoms().map(|a| a.position).collect()
    }

    pub fn set_xyz(&mut self, xyz: &[Point3<f64>]) -> Result<(), CoordinateCountError> {
        if xyz.len() != self.order.len() {
            return Err(CoordinateCountError {
                expected: self.order.len(),
                found: xyz.len(),
            });
        }
        for (&id, &pos) in self.order.iter().zip(xyz) {
            if let Some(atom) = self.atoms.get_mut(id) {
                atom.position = pos;
            }
        }
        Ok(())
    }

    /// Unweighted geometric center of all atoms, including virtual sites.
    pub fn centroid(&self) -> Point3<f64> {
        if self.is_empty() {
            return Point3::origin();
        }
        let sum = self
            .atoms()
            .fold(Vector3::zeros(), |acc, a| acc + a.position.coords);
        Point3::from(sum / self.n_atoms() as f64)
    }

    pub fn translate(&mut self, shift: &Vector3<f64>) {
        for atom in self.atoms.values_mut() {
            atom.position += shift;
        }
    }

    pub fn rotate_about_centroid(&mut self, rotation: &UnitQuaternion<f64>) {
        let center = self.centroid();
        for atom in self.atoms.values_mut() {
            atom.position = center + rotation * (atom.position - center);
        }
    }

    /// Axis-aligned bounding box as `(min, max)` corners.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut atoms = self.atoms();
        let first = atoms.next()?.position;
        Some(atoms.fold((first, first), |(lo, hi), a| {
            (lo.inf(&a.position), hi.sup(&a.position))
        }))
    }

    /// Molar mass in g/mol.
    pub fn mass(&self) -> f64 {
        self.atoms().map(|a| a.mass).sum()
    }

    pub fn charge(&self) -> f64 {
        self.atoms().map(|a| a.partial_charge).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_water() -> (Compound, [AtomId; 3]) {
        let mut water = Compound::new("WAT");
        let o = water.add_atom(Atom::new("O", Point3::new(0.0, 0.0, 0.0)).with_charge(-0.8476));
        let h1 = water.add_atom(Atom::new("H1", Point3::new(0.1, 0.0, 0.0)).with_charge(0.4238));
        let h2 = water.add_atom(Atom::new("H2", Point3::new(0.0, 0.1, 0.0)).with_charge(0.4238));
        water.add_bond(o, h1, BondOrder::Single).unwrap();
        water.add_bond(o, h2, BondOrder::Single).unwrap();
        (water, [o, h1, h2])
    }

    mod topology {
        use super::*;

        #[test]
        fn add_bond_updates_adjacency_in_both_directions() {
            let (water, [o, h1, h2]) = create_water();
            assert_eq!(water.n_bonds(), 2);
            assert_eq!(water.neighbors(o), &[h1, h2]);
            assert_eq!(water.neighbors(h1), &[o]);
            assert_eq!(water.neighbors(h2), &[o]);
        }

        #[test]
        fn add_bond_is_idempotent() {
            let (mut water, [o, h1, _]) = create_water();
            assert_eq!(water.add_bond(h1, o, BondOrder::Single), Some(()));
            assert_eq!(water.n_bonds(), 2);
        }

        #[test]
        fn add_bond_with_unknown_atom_returns_none() {
            let (mut water, [o, _, _]) = create_water();
            let mut other = Compound::new("X");
            let foreign = (0..4)
                .map(|_| other.add_atom(Atom::new("C", Point3::origin())))
                .last()
                .unwrap();
            assert_eq!(water.add_bond(o, foreign, BondOrder::Single), None);
        }

        #[test]
        fn bond_indices_follow_insertion_order() {
            let (water, _) = create_water();
            assert_eq!(water.bond_indices(), vec![(0, 1), (0, 2)]);
        }
    }

    mod geometry {
        use super::*;

        #[test]
        fn centroid_is_mean_position() {
            let (water, _) = create_water();
            let c = water.centroid();
            assert!((c.x - 0.1 / 3.0).abs() < 1e-12);
            assert!((c.y - 0.1 / 3.0).abs() < 1e-12);
            assert_eq!(c.z, 0.0);
        }

        #[test]
        fn translate_moves_every_atom() {
            let (mut water, [o, ..]) = create_water();
            water.translate(&Vector3::new(1.0, 2.0, 3.0));
            assert_eq!(water.atom(o).unwrap().position, Point3::new(1.0, 2.0, 3.0));
        }

        #[test]
        fn rotation_preserves_centroid_and_bond_lengths() {
            let (mut water, [o, h1, _]) = create_water();
            let before = water.centroid();
            let rotation = UnitQuaternion::from_euler_angles(0.3, -1.2, 2.0);
            water.rotate_about_centroid(&rotation);
            let after = water.centroid();
            assert!((before - after).norm() < 1e-12);
            let d = (water.atom(o).unwrap().position - water.atom(h1).unwrap().position).norm();
            assert!((d - 0.1).abs() < 1e-12);
        }

        #[test]
        fn bounds_cover_all_atoms() {
            let (water, _) = create_water();
            let (lo, hi) = water.bounds().unwrap();
            assert_eq!(lo, Point3::new(0.0, 0.0, 0.0));
            assert_eq!(hi, Point3::new(0.1, 0.1, 0.0));
            assert!(Compound::new("empty").bounds().is_none());
        }

        #[test]
        fn set_xyz_rejects_wrong_length() {
            let (mut water, _) = create_water();
            let err = water.set_xyz(&[Point3::origin()]).unwrap_err();
            assert_eq!(err, CoordinateCountError { expected: 3, found: 1 });
        }

        #[test]
        fn set_xyz_then_xyz_returns_same_positions() {
            let (mut water, _) = create_water();
            let xyz = vec![
                Point3::new(1.0, 1.0, 1.0),
                Point3::new(1.1, 1.0, 1.0),
                Point3::new(1.0, 1.1, 1.0),
            ];
            water.set_xyz(&xyz).unwrap();
            assert_eq!(water.xyz(), xyz);
        }
    }

    #[test]
    fn mass_and_charge_are_sums_over_atoms() {
        let (water, _) = create_water();
        assert!((water.mass() - (15.9994 + 2.0 * 1.008)).abs() < 1e-9);
        assert!(water.charge().abs() < 1e-12);
    }

    #[test]
    fn clones_share_atom_ids() {
        let (water, [o, ..]) = create_water();
        let copy = water.clone();
        assert!(copy.atom(o).is_some());
        assert_eq!(copy.atom_ids(), water.atom_ids());
    }
}
