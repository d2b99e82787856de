use crate::core::models::compound::Compound;
use crate::core::models::simbox::PackedBox;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing single-compound file formats.
///
/// Implementors handle format-specific parsing and serialization; the path-based
/// helpers wrap files in buffered readers and writers.
pub trait MolecularFile {
    /// The type of metadata associated with the file format.
    type Metadata;

    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a compound from a buffered reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - The buffered reader to read from.
    ///
    /// # Return
    ///
    /// Returns the parsed compound and associated metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(reader: &mut impl BufRead) -> Result<(Compound, Self::Metadata), Self::Error>;

    /// Writes a compound and metadata to a writer.
    fn write_to(
        compound: &Compound,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Writes a compound to a writer with default metadata.
    fn write_compound_to(compound: &Compound, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads a compound from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<(Compound, Self::Metadata), Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    fn write_to_path<P: AsRef<Path>>(
        compound: &Compound,
        metadata: &Self::Metadata,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(compound, metadata, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    fn write_compound_to_path<P: AsRef<Path>>(
        compound: &Compound,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_compound_to(compound, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Defines the interface for writers of packed simulation boxes.
pub trait BoxFile {
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Conventional file extension, without the leading dot.
    const EXTENSION: &'static str;

    /// Writes every molecule of a packed box, one residue per molecule.
    fn write_box_to(packed: &PackedBox, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Writes a packed box to a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_box_to_path<P: AsRef<Path>>(packed: &PackedBox, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_box_to(packed, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
