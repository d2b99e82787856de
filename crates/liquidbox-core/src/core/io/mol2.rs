use super::ANGSTROM_PER_NM;
use crate::core::io::traits::{BoxFile, MolecularFile};
use crate::core::models::atom::Atom;
use crate::core::models::compound::Compound;
use crate::core::models::ids::AtomId;
use crate::core::models::simbox::PackedBox;
use crate::core::models::topology::BondOrder;
use nalgebra::Point3;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use thiserror::Error;

const MOLECULE_SECTION: &str = "@<TRIPOS>MOLECULE";
const ATOM_SECTION: &str = "@<TRIPOS>ATOM";
const BOND_SECTION: &str = "@<TRIPOS>BOND";

#[derive(Debug, Clone, PartialEq)]
pub struct Mol2Metadata {
    pub title: String,
    pub molecule_type: String,
    pub charge_type: String,
}

impl Default for Mol2Metadata {
    fn default() -> Self {
        Self {
            title: String::from("liquidbox"),
            molecule_type: String::from("SMALL"),
            charge_type: String::from("USER_CHARGES"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Mol2Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: Mol2ParseErrorKind },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("Missing required section: {0}")]
    MissingSection(&'static str),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Mol2ParseErrorKind {
    #[error("counts line must hold at least the atom and bond counts")]
    InvalidCounts,
    #[error("{record} record has {found} fields, expected at least {expected}")]
    TooFewFields {
        record: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("invalid integer for {field} (value: '{value}')")]
    InvalidInt { field: &'static str, value: String },
    #[error("invalid float for {field} (value: '{value}')")]
    InvalidFloat { field: &'static str, value: String },
    #[error("unsupported bond type '{0}'")]
    UnsupportedBondType(String),
    #[error("bond references unknown atom id {0}")]
    UnknownAtomId(usize),
}

fn parse_err(line: usize, kind: Mol2ParseErrorKind) -> Mol2Error {
    Mol2Error::Parse { line, kind }
}

fn parse_int(value: &str, field: &'static str, line: usize) -> Result<usize, Mol2Error> {
    value.parse().map_err(|_| {
        parse_err(
            line,
            Mol2ParseErrorKind::InvalidInt {
                field,
                value: value.to_string(),
            },
        )
    })
}

fn parse_float(value: &str, field: &'static str, line: usize) -> Result<f64, Mol2Error> {
    value.parse().map_err(|_| {
        parse_err(
            line,
            Mol2ParseErrorKind::InvalidFloat {
                field,
                value: value.to_string(),
            },
        )
    })
}

fn collect_lines(reader: &mut impl BufRead) -> Result<Vec<(usize, String)>, Mol2Error> {
    reader
        .lines()
        .enumerate()
        .map(|(i, line)| line.map(|v| (i + 1, v)).map_err(Mol2Error::from))
        .collect()
}

fn find_section(lines: &[(usize, String)], name: &str) -> Option<usize> {
    lines
        .iter()
        .position(|(_, line)| line.trim().eq_ignore_ascii_case(name))
}

fn is_section_header(line: &str) -> bool {
    line.trim_start().starts_with("@<TRIPOS>")
}

/// Yields the data lines of the section starting after `start`, skipping blanks and comments.
fn section_lines(lines: &[(usize, String)], start: usize) -> impl Iterator<Item = &(usize, String)> {
    lines[start..]
        .iter()
        .take_while(|(_, l)| !is_section_header(l))
        .filter(|(_, l)| {
            let t = l.trim();
            !t.is_empty() && !t.starts_with('#')
        })
}

fn parse_counts(line: &str, line_no: usize) -> Result<(usize, usize), Mol2Error> {
    let parts: Vec<_> = line.split_whitespace().collect();
    if parts.len() < 2 {
        return Err(parse_err(line_no, Mol2ParseErrorKind::InvalidCounts));
    }
    Ok((
        parse_int(parts[0], "atom count", line_no)?,
        parse_int(parts[1], "bond count", line_no)?,
    ))
}

/// Tripos MOL2 reader and writer.
///
/// Reading expects a single `@<TRIPOS>MOLECULE` block. The compound takes the
/// molecule title as its name; atoms take their force-field type from the
/// `atom_type` column and their partial charge from the optional charge column.
pub struct Mol2File;

impl MolecularFile for Mol2File {
    type Metadata = Mol2Metadata;
    type Error = Mol2Error;

    fn read_from(reader: &mut impl BufRead) -> Result<(Compound, Self::Metadata), Self::Error> {
        let lines = collect_lines(reader)?;

        let mol_idx =
            find_section(&lines, MOLECULE_SECTION).ok_or(Mol2Error::MissingSection(MOLECULE_SECTION))?;
        let mut header = lines[mol_idx + 1..]
            .iter()
            .take_while(|(_, l)| !is_section_header(l));
        let (_, title) = header
            .next()
            .ok_or_else(|| Mol2Error::Inconsistency("molecule record has no title".to_string()))?;
        let (counts_no, counts) = header
            .find(|(_, l)| !l.trim().is_empty())
            .ok_or_else(|| Mol2Error::Inconsistency("molecule record has no counts line".to_string()))?;
        let (atom_count, bond_count) = parse_counts(counts, *counts_no)?;
        let mut rest = header.map(|(_, l)| l.trim().to_string());
        let defaults = Mol2Metadata::default();
        let metadata = Mol2Metadata {
            title: title.trim().to_string(),
            molecule_type: rest.next().filter(|s| !s.is_empty()).unwrap_or(defaults.molecule_type),
            charge_type: rest.next().filter(|s| !s.is_empty()).unwrap_or(defaults.charge_type),
        };

        let mut compound = Compound::new(&metadata.title);
        let mut id_map: HashMap<usize, AtomId> = HashMap::with_capacity(atom_count);

        let atom_idx = find_section(&lines, ATOM_SECTION).ok_or(Mol2Error::MissingSection(ATOM_SECTION))?;
        for (ln, raw) in section_lines(&lines, atom_idx + 1) {
            let parts: Vec<_> = raw.split_whitespace().collect();
            if parts.len() < 6 {
                return Err(parse_err(
                    *ln,
                    Mol2ParseErrorKind::TooFewFields {
                        record: "ATOM",
                        expected: 6,
                        found: parts.len(),
                    },
                ));
            }
            let serial = parse_int(parts[0], "atom id", *ln)?;
            let position = Point3::new(
                parse_float(parts[2], "x coordinate", *ln)?,
                parse_float(parts[3], "y coordinate", *ln)?,
                parse_float(parts[4], "z coordinate", *ln)?,
            ) / ANGSTROM_PER_NM;
            let charge = match parts.get(8) {
                Some(value) => parse_float(value, "charge", *ln)?,
                None => 0.0,
            };
            let atom = Atom::new(parts[1], position)
                .with_type(parts[5])
                .with_charge(charge);
            if id_map.insert(serial, compound.add_atom(atom)).is_some() {
                return Err(Mol2Error::Inconsistency(format!(
                    "duplicate atom id {serial}"
                )));
            }
        }

        if compound.n_atoms() != atom_count {
            return Err(Mol2Error::Inconsistency(format!(
                "counts line declares {} atoms but ATOM section holds {}",
                atom_count,
                compound.n_atoms()
            )));
        }

        if let Some(bond_idx) = find_section(&lines, BOND_SECTION) {
            for (ln, raw) in section_lines(&lines, bond_idx + 1) {
                let parts: Vec<_> = raw.split_whitespace().collect();
                if parts.len() < 4 {
                    return Err(parse_err(
                        *ln,
                        Mol2ParseErrorKind::TooFewFields {
                            record: "BOND",
                            expected: 4,
                            found: parts.len(),
                        },
                    ));
                }
                let a1 = parse_int(parts[1], "origin atom id", *ln)?;
                let a2 = parse_int(parts[2], "target atom id", *ln)?;
                let order: BondOrder = parts[3].parse().map_err(|_| {
                    parse_err(*ln, Mol2ParseErrorKind::UnsupportedBondType(parts[3].to_string()))
                })?;
                let id1 = *id_map
                    .get(&a1)
                    .ok_or_else(|| parse_err(*ln, Mol2ParseErrorKind::UnknownAtomId(a1)))?;
                let id2 = *id_map
                    .get(&a2)
                    .ok_or_else(|| parse_err(*ln, Mol2ParseErrorKind::UnknownAtomId(a2)))?;
                compound.add_bond(id1, id2, order).ok_or_else(|| {
                    Mol2Error::Inconsistency(format!("failed to add bond {a1}-{a2}"))
                })?;
            }
        } else if bond_count > 0 {
            return Err(Mol2Error::MissingSection(BOND_SECTION));
        }

        if compound.n_bonds() != bond_count {
            return Err(Mol2Error::Inconsistency(format!(
                "counts line declares {} bonds but BOND section holds {}",
                bond_count,
                compound.n_bonds()
            )));
        }

        Ok((compound, metadata))
    }

    fn write_to(
        compound: &Compound,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        writeln!(writer, "{MOLECULE_SECTION}")?;
        writeln!(writer, "{}", metadata.title)?;
        writeln!(writer, "{} {} 1 0 0", compound.n_atoms(), compound.n_bonds())?;
        writeln!(writer, "{}", metadata.molecule_type)?;
        writeln!(writer, "{}", metadata.charge_type)?;
        writeln!(writer)?;
        write_atoms(writer, std::iter::once(compound))?;
        write_bonds(writer, std::iter::once(compound))?;
        write_substructures(writer, std::iter::once(compound))?;
        Ok(())
    }

    fn write_compound_to(compound: &Compound, writer: &mut impl Write) -> Result<(), Self::Error> {
        let metadata = Mol2Metadata {
            title: compound.name().to_string(),
            ..Default::default()
        };
        Self::write_to(compound, &metadata, writer)
    }
}

impl BoxFile for Mol2File {
    type Error = Mol2Error;
    const EXTENSION: &'static str = "mol2";

    fn write_box_to(packed: &PackedBox, writer: &mut impl Write) -> Result<(), Self::Error> {
        let n_bonds: usize = packed.molecules.iter().map(Compound::n_bonds).sum();
        let title = packed
            .composition()
            .iter()
            .map(|(name, n)| format!("{name}x{n}"))
            .collect::<Vec<_>>()
            .join(" ");

        writeln!(writer, "{MOLECULE_SECTION}")?;
        writeln!(writer, "{}", if title.is_empty() { "EMPTY" } else { &title })?;
        writeln!(
            writer,
            "{} {} {} 0 0",
            packed.n_atoms(),
            n_bonds,
            packed.n_molecules()
        )?;
        writeln!(writer, "SMALL")?;
        writeln!(writer, "USER_CHARGES")?;
        writeln!(writer)?;
        write_atoms(writer, packed.molecules.iter())?;
        write_bonds(writer, packed.molecules.iter())?;
        write_substructures(writer, packed.molecules.iter())?;

        let lengths = packed.sim_box.lengths() * ANGSTROM_PER_NM;
        writeln!(writer, "@<TRIPOS>CRYSIN")?;
        writeln!(
            writer,
            "{:>10.4} {:>10.4} {:>10.4} {:>8.4} {:>8.4} {:>8.4} 1 1",
            lengths.x, lengths.y, lengths.z, 90.0, 90.0, 90.0
        )?;
        Ok(())
    }
}

fn write_atoms<'a>(
    writer: &mut impl Write,
    molecules: impl Iterator<Item = &'a Compound>,
) -> Result<(), Mol2Error> {
    writeln!(writer, "{ATOM_SECTION}")?;
    let mut serial = 1;
    for (res_idx, molecule) in molecules.enumerate() {
        for atom in molecule.atoms() {
            let p = atom.position * ANGSTROM_PER_NM;
            let atom_type = if atom.atom_type.is_empty() {
                atom.element.map(|e| e.symbol()).unwrap_or("Du")
            } else {
                atom.atom_type.as_str()
            };
            writeln!(
                writer,
                "{:>7} {:<8} {:>10.4} {:>10.4} {:>10.4} {:<10} {:>3} {:<8} {:>9.6}",
                serial,
                atom.name,
                p.x,
                p.y,
                p.z,
                atom_type,
                res_idx + 1,
                molecule.name(),
                atom.partial_charge
            )?;
            serial += 1;
        }
    }
    Ok(())
}

fn write_bonds<'a>(
    writer: &mut impl Write,
    molecules: impl Iterator<Item = &'a Compound>,
) -> Result<(), Mol2Error> {
    writeln!(writer, "{BOND_SECTION}")?;
    let mut bond_serial = 1;
    let mut offset = 0;
    for molecule in molecules {
        let orders = molecule.bonds().iter().map(|b| b.order);
        for ((i, j), order) in molecule.bond_indices().into_iter().zip(orders) {
            writeln!(
                writer,
                "{:>6} {:>5} {:>5} {}",
                bond_serial,
                offset + i + 1,
                offset + j + 1,
                order.mol2_code()
            )?;
            bond_serial += 1;
        }
        offset += molecule.n_atoms();
    }
    Ok(())
}

fn write_substructures<'a>(
    writer: &mut impl Write,
    molecules: impl Iterator<Item = &'a Compound>,
) -> Result<(), Mol2Error> {
    writeln!(writer, "@<TRIPOS>SUBSTRUCTURE")?;
    let mut root_atom = 1;
    for (res_idx, molecule) in molecules.enumerate() {
        writeln!(
            writer,
            "{:>6} {:<8} {:>5} RESIDUE    0 ****  ****    0 ROOT",
            res_idx + 1,
            molecule.name(),
            root_atom
        )?;
        root_atom += molecule.n_atoms();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::element::Element;
    use crate::core::models::simbox::SimBox;
    use std::io::Cursor;

    const WATER_MOL2: &str = "\
@<TRIPOS>MOLECULE
SPC/E
3 2 1 0 0
SMALL
USER_CHARGES

@<TRIPOS>ATOM
      1 O           0.0000    0.0000    0.0000 OW         1 WAT     -0.847600
      2 H1          0.8165    0.5774    0.0000 HW         1 WAT      0.423800
      3 H2         -0.8165    0.5774    0.0000 HW         1 WAT      0.423800
@<TRIPOS>BOND
     1     1     2 1
     2     1     3 1
@<TRIPOS>SUBSTRUCTURE
     1 WAT        1 RESIDUE    0 ****  ****    0 ROOT
";

    fn read(content: &str) -> Result<(Compound, Mol2Metadata), Mol2Error> {
        Mol2File::read_from(&mut Cursor::new(content))
    }

    mod reading {
        use super::*;

        #[test]
        fn reads_atoms_bonds_and_metadata() {
            let (water, metadata) = read(WATER_MOL2).unwrap();
            assert_eq!(metadata.title, "SPC/E");
            assert_eq!(metadata.molecule_type, "SMALL");
            assert_eq!(metadata.charge_type, "USER_CHARGES");
            assert_eq!(water.name(), "SPC/E");
            assert_eq!(water.n_atoms(), 3);
            assert_eq!(water.n_bonds(), 2);
            assert_eq!(water.bond_indices(), vec![(0, 1), (0, 2)]);

            let atoms: Vec<_> = water.atoms().collect();
            assert_eq!(atoms[0].name, "O");
            assert_eq!(atoms[0].element, Some(Element::O));
            assert_eq!(atoms[0].atom_type, "OW");
            assert_eq!(atoms[0].partial_charge, -0.8476);
            assert_eq!(atoms[1].atom_type, "HW");
        }

        #[test]
        fn converts_angstrom_to_nanometers() {
            let (water, _) = read(WATER_MOL2).unwrap();
            let h1 = water.atoms().nth(1).unwrap();
            assert!((h1.position.x - 0.08165).abs() < 1e-12);
            assert!((h1.position.y - 0.05774).abs() < 1e-12);
        }

        #[test]
        fn missing_molecule_section_is_reported() {
            let err = read("@<TRIPOS>ATOM\n").unwrap_err();
            assert!(matches!(err, Mol2Error::MissingSection(MOLECULE_SECTION)));
        }

        #[test]
        fn invalid_coordinate_reports_line_number() {
            let content = WATER_MOL2.replace("0.8165    0.5774", "abc    0.5774");
            match read(&content).unwrap_err() {
                Mol2Error::Parse { line, kind } => {
                    assert_eq!(line, 9);
                    assert!(matches!(kind, Mol2ParseErrorKind::InvalidFloat { .. }));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn atom_count_mismatch_is_inconsistency() {
            let content = WATER_MOL2.replace("3 2 1 0 0", "4 2 1 0 0");
            assert!(matches!(
                read(&content).unwrap_err(),
                Mol2Error::Inconsistency(_)
            ));
        }

        #[test]
        fn bond_to_unknown_atom_is_rejected() {
            let content = WATER_MOL2.replace("     2     1     3 1", "     2     1     7 1");
            match read(&content).unwrap_err() {
                Mol2Error::Parse { kind, .. } => {
                    assert_eq!(kind, Mol2ParseErrorKind::UnknownAtomId(7))
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn missing_charge_column_defaults_to_zero() {
            let content = "\
@<TRIPOS>MOLECULE
methane
1 0 1 0 0
SMALL
NO_CHARGES

@<TRIPOS>ATOM
      1 _CH4        0.0000    0.0000    0.0000 CH4
";
            let (methane, _) = read(content).unwrap();
            let bead = methane.atoms().next().unwrap();
            assert_eq!(bead.partial_charge, 0.0);
            assert_eq!(bead.mass, 16.043);
            assert_eq!(methane.n_bonds(), 0);
        }
    }

    mod writing {
        use super::*;

        #[test]
        fn written_compound_reads_back_identically() {
            let (water, _) = read(WATER_MOL2).unwrap();
            let mut buffer = Vec::new();
            Mol2File::write_compound_to(&water, &mut buffer).unwrap();
            let (back, metadata) = read(&String::from_utf8(buffer).unwrap()).unwrap();

            assert_eq!(metadata.title, "SPC/E");
            assert_eq!(back.n_bonds(), 2);
            for (a, b) in water.atoms().zip(back.atoms()) {
                assert_eq!(a.name, b.name);
                assert_eq!(a.atom_type, b.atom_type);
                assert!((a.partial_charge - b.partial_charge).abs() < 1e-9);
                assert!((a.position - b.position).norm() < 1e-5);
            }
        }

        #[test]
        fn box_writer_offsets_bonds_and_emits_crysin() {
            let (mut water, _) = read(WATER_MOL2).unwrap();
            water.set_name("WAT");
            let mut packed = PackedBox::new(SimBox::cubic(2.0).unwrap());
            packed.molecules = vec![water.clone(), water];

            let mut buffer = Vec::new();
            Mol2File::write_box_to(&packed, &mut buffer).unwrap();
            let text = String::from_utf8(buffer).unwrap();

            assert!(text.contains("WATx2"));
            assert!(text.contains("6 4 2 0 0"));
            assert!(text.contains("     4     4     6 1"));
            assert!(text.contains("     2 WAT          4 RESIDUE"));
            let crysin = text.lines().skip_while(|l| *l != "@<TRIPOS>CRYSIN").nth(1).unwrap();
            assert!(crysin.trim_start().starts_with("20.0000"));
        }
    }
}
