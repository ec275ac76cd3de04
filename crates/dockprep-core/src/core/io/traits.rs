use crate::core::models::structure::Structure;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing structural file formats.
///
/// Implementors handle format-specific parsing and serialization; reading
/// produces an immutable [`Structure`], writing serializes one. Path-based
/// convenience methods are provided with default implementations.
pub trait StructureFile {
    /// The error type for parse failures.
    type ReadError: Error + From<io::Error>;

    /// Reads a structure from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid instance of the format
    /// or an underlying I/O operation fails.
    fn read_from(reader: &mut impl BufRead) -> Result<Structure, Self::ReadError>;

    /// Writes a structure to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if an underlying I/O operation fails.
    fn write_to(structure: &Structure, writer: &mut impl Write) -> io::Result<()>;

    /// Reads a structure from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Structure, Self::ReadError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes a structure to a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(structure: &Structure, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(structure, &mut writer)
    }
}
