use super::element::{Element, united_atom_mass};
use nalgebra::Point3;

/// An atom (or united-atom bead, or massless virtual site) of a compound.
///
/// Positions are stored in nanometers. The `atom_type` holds the force-field atom
/// type name as read from the template file; typing against a force field copies
/// charge and mass from the matching parameter entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The name of the atom (e.g. "O", "H1", "_CH3").
    pub name: String,
    /// The chemical element, `None` for united-atom beads and virtual sites.
    pub element: Option<Element>,
    /// The force-field atom type (e.g. "OW", "opls_135").
    pub atom_type: String,
    /// The partial charge in elementary charge units.
    pub partial_charge: f64,
    /// The mass in g/mol.
    pub mass: f64,
    /// The 3D coordinates in nanometers.
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates a new `Atom`, inferring element and mass from its name.
    ///
    /// Names that are neither an element nor a known united-atom bead get a mass
    /// of zero, which marks them as virtual sites.
    pub fn new(name: &str, position: Point3<f64>) -> Self {
        let element = Element::guess_from_name(name);
        let mass = element
            .map(|e| e.atomic_mass())
            .or_else(|| united_atom_mass(name))
            .unwrap_or(0.0);
        Self {
            name: name.to_string(),
            element,
            atom_type: String::new(),
            partial_charge: 0.0,
            mass,
            position,
        }
    }

    pub fn with_type(mut self, atom_type: &str) -> Self {
        self.atom_type = atom_type.to_string();
        self
    }

    pub fn with_charge(mut self, charge: f64) -> Self {
        self.partial_charge = charge;
        self
    }

    pub fn is_virtual_site(&self) -> bool {
        self.element.is_none() && self.mass == 0.0
    }
}
