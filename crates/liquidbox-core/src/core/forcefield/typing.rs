use super::params::Forcefield;
use crate::core::models::compound::Compound;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypingError {
    #[error("Atom '{atom_name}' has type '{atom_type}' which is not defined in force field '{forcefield}'")]
    MissingAtomType {
        atom_name: String,
        atom_type: String,
        forcefield: String,
    },
    #[error("No bond type for '{type1}'-'{type2}' in force field '{forcefield}'")]
    MissingBondType {
        type1: String,
        type2: String,
        forcefield: String,
    },
}

/// A bond with its force-field equilibrium length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypedBond {
    /// Insertion-order index of the first atom.
    pub i: usize,
    /// Insertion-order index of the second atom.
    pub j: usize,
    /// Equilibrium length in nm.
    pub length: f64,
}

/// A molecule template with force-field charges, masses and bond lengths applied.
#[derive(Debug, Clone)]
pub struct TypedMolecule {
    pub compound: Compound,
    pub bonds: Vec<TypedBond>,
    pub forcefield: String,
}

pub struct Typer<'a> {
    forcefield: &'a Forcefield,
}

impl<'a> Typer<'a> {
    pub fn new(forcefield: &'a Forcefield) -> Self {
        Self { forcefield }
    }

    /// Types every atom and bond of `compound`.
    ///
    /// Each atom's `atom_type` must name a force-field atom type; its charge and
    /// mass are replaced by the force-field values. Each bond must match a bond
    /// type, matched without regard to the order of its two atoms.
    ///
    /// # Errors
    ///
    /// Returns [`TypingError`] for the first atom or bond that has no parameters.
    pub fn apply(&self, compound: &Compound) -> Result<TypedMolecule, TypingError> {
        let ff_name = self.forcefield.name().to_string();
        let mut typed = compound.clone();

        for &atom_id in compound.atom_ids() {
            let Some(atom) = typed.atom_mut(atom_id) else {
                continue;
            };
            let params = self.forcefield.atom_type(&atom.atom_type).ok_or_else(|| {
                TypingError::MissingAtomType {
                    atom_name: atom.name.clone(),
                    atom_type: atom.atom_type.clone(),
                    forcefield: ff_name.clone(),
                }
            })?;
            atom.partial_charge = params.charge;
            atom.mass = params.mass;
        }

        let atom_types: Vec<&str> = compound.atoms().map(|a| a.atom_type.as_str()).collect();
        let bonds = compound
            .bond_indices()
            .into_iter()
            .map(|(i, j)| {
                let (t1, t2) = (atom_types[i], atom_types[j]);
                self.forcefield
                    .bond_type(t1, t2)
                    .map(|bt| TypedBond {
                        i,
                        j,
                        length: bt.length,
                    })
                    .ok_or_else(|| TypingError::MissingBondType {
                        type1: t1.to_string(),
                        type2: t2.to_string(),
                        forcefield: ff_name.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            molecule = compound.name(),
            forcefield = %ff_name,
            atoms = compound.n_atoms(),
            bonds = bonds.len(),
            "Applied force field"
        );

        Ok(TypedMolecule {
            compound: typed,
            bonds,
            forcefield: ff_name,
        })
    }
}
