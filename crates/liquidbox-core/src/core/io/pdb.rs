use super::ANGSTROM_PER_NM;
use crate::core::io::traits::BoxFile;
use crate::core::models::atom::Atom;
use crate::core::models::simbox::PackedBox;
use std::io::{self, Write};
use thiserror::Error;
use tracing::warn;

const MAX_SERIAL: usize = 99_999;
const MAX_RESIDUE_SEQ: usize = 9_999;
const MAX_RESIDUE_NAME: usize = 4;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
}

/// PDB writer for packed boxes.
///
/// Each molecule becomes one residue named after its compound. Residue names
/// occupy columns 18-21, so names of up to four characters are kept intact.
/// Atom serials wrap after 99999 and residue numbers after 9999; `CONECT`
/// records are emitted only while serials are still unique.
pub struct PdbFile;

fn format_atom_name(name: &str) -> String {
    if name.len() >= 4 {
        name[..4].to_string()
    } else {
        format!(" {name:<3}")
    }
}

fn element_column(atom: &Atom) -> String {
    atom.element
        .map(|e| e.symbol().to_ascii_uppercase())
        .unwrap_or_default()
}

fn wrap(value: usize, max: usize) -> usize {
    (value - 1) % max + 1
}

impl BoxFile for PdbFile {
    type Error = PdbError;
    const EXTENSION: &'static str = "pdb";

    fn write_box_to(packed: &PackedBox, writer: &mut impl Write) -> Result<(), Self::Error> {
        if let Some(molecule) = packed
            .molecules
            .iter()
            .find(|m| m.name().chars().count() > MAX_RESIDUE_NAME)
        {
            return Err(PdbError::Inconsistency(format!(
                "residue name '{}' is longer than {} characters",
                molecule.name(),
                MAX_RESIDUE_NAME
            )));
        }

        let lengths = packed.sim_box.lengths() * ANGSTROM_PER_NM;
        writeln!(
            writer,
            "CRYST1{:>9.3}{:>9.3}{:>9.3}{:>7.2}{:>7.2}{:>7.2} P 1           1",
            lengths.x, lengths.y, lengths.z, 90.0, 90.0, 90.0
        )?;

        let mut serial = 1;
        for (res_idx, molecule) in packed.molecules.iter().enumerate() {
            for atom in molecule.atoms() {
                let p = atom.position * ANGSTROM_PER_NM;
                writeln!(
                    writer,
                    "{:<6}{:>5} {:<4} {:<4}{}{:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}",
                    "HETATM",
                    wrap(serial, MAX_SERIAL),
                    format_atom_name(&atom.name),
                    molecule.name(),
                    'A',
                    wrap(res_idx + 1, MAX_RESIDUE_SEQ),
                    p.x,
                    p.y,
                    p.z,
                    1.0,
                    0.0,
                    element_column(atom)
                )?;
                serial += 1;
            }
        }

        let n_atoms = serial - 1;
        if n_atoms <= MAX_SERIAL {
            let mut offset = 0;
            for molecule in &packed.molecules {
                for (i, j) in molecule.bond_indices() {
                    writeln!(writer, "CONECT{:>5}{:>5}", offset + i + 1, offset + j + 1)?;
                }
                offset += molecule.n_atoms();
            }
        } else {
            warn!(
                atoms = n_atoms,
                "Skipping CONECT records: atom serials are not unique past {}", MAX_SERIAL
            );
        }

        writeln!(writer, "END")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::compound::Compound;
    use crate::core::models::simbox::SimBox;
    use crate::core::models::topology::BondOrder;
    use nalgebra::Point3;

    fn water(name: &str) -> Compound {
        let mut w = Compound::new(name);
        let o = w.add_atom(Atom::new("O", Point3::new(0.1, 0.2, 0.3)));
        let h1 = w.add_atom(Atom::new("H1", Point3::new(0.2, 0.2, 0.3)));
        let h2 = w.add_atom(Atom::new("H2", Point3::new(0.1, 0.3, 0.3)));
        w.add_bond(o, h1, BondOrder::Single).unwrap();
        w.add_bond(o, h2, BondOrder::Single).unwrap();
        w
    }

    fn write(packed: &PackedBox) -> String {
        let mut buffer = Vec::new();
        PdbFile::write_box_to(packed, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn writes_cryst1_in_angstrom() {
        let packed = PackedBox::new(SimBox::new(3.0, 3.0, 4.5).unwrap());
        let text = write(&packed);
        let first = text.lines().next().unwrap();
        assert_eq!(&first[0..6], "CRYST1");
        assert_eq!(first[6..15].trim(), "30.000");
        assert_eq!(first[24..33].trim(), "45.000");
        assert!(text.trim_end().ends_with("END"));
    }

    #[test]
    fn atom_records_use_fixed_columns() {
        let mut packed = PackedBox::new(SimBox::cubic(2.0).unwrap());
        packed.molecules = vec![water("WAT"), water("WAT")];
        let text = write(&packed);
        let atoms: Vec<_> = text.lines().filter(|l| l.starts_with("HETATM")).collect();
        assert_eq!(atoms.len(), 6);

        let line = atoms[4];
        assert_eq!(line[6..11].trim(), "5");
        assert_eq!(line[12..16].trim(), "H1");
        assert_eq!(line[17..21].trim(), "WAT");
        assert_eq!(&line[21..22], "A");
        assert_eq!(line[22..26].trim(), "2");
        assert_eq!(line[30..38].trim(), "2.000");
        assert_eq!(line[38..46].trim(), "2.000");
        assert_eq!(line[46..54].trim(), "3.000");
        assert_eq!(line[76..78].trim(), "H");
    }

    #[test]
    fn four_character_residue_names_fit() {
        let mut packed = PackedBox::new(SimBox::cubic(2.0).unwrap());
        packed.molecules = vec![water("SPCE")];
        let text = write(&packed);
        let line = text.lines().find(|l| l.starts_with("HETATM")).unwrap();
        assert_eq!(&line[17..21], "SPCE");
    }

    #[test]
    fn overlong_residue_name_is_rejected() {
        let mut packed = PackedBox::new(SimBox::cubic(2.0).unwrap());
        packed.molecules = vec![water("WATER")];
        let mut buffer = Vec::new();
        let err = PdbFile::write_box_to(&packed, &mut buffer).unwrap_err();
        assert!(matches!(err, PdbError::Inconsistency(_)));
    }

    #[test]
    fn conect_records_are_offset_per_molecule() {
        let mut packed = PackedBox::new(SimBox::cubic(2.0).unwrap());
        packed.molecules = vec![water("WAT"), water("WAT")];
        let text = write(&packed);
        let conect: Vec<_> = text.lines().filter(|l| l.starts_with("CONECT")).collect();
        assert_eq!(
            conect,
            vec![
                "CONECT    1    2",
                "CONECT    1    3",
                "CONECT    4    5",
                "CONECT    4    6"
            ]
        );
    }

    #[test]
    fn serial_wraps_after_five_digits() {
        assert_eq!(wrap(99_999, MAX_SERIAL), 99_999);
        assert_eq!(wrap(100_000, MAX_SERIAL), 1);
        assert_eq!(wrap(10_000, MAX_RESIDUE_SEQ), 1);
    }
}
