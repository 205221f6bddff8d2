use crate::core::models::system::MolecularSystem;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Common interface of the structure file formats a session can load.
///
/// Implementors parse a whole file into a [`MolecularSystem`] plus whatever
/// format-specific records have no place in the model (`Metadata`), and write
/// both back out.
pub trait MolecularFile {
    /// Records carried through a read/write cycle untouched.
    type Metadata;

    type Error: Error + From<io::Error>;

    /// Reads a complete structure from `reader`.
    ///
    /// # Arguments
    ///
    /// * `reader` - The buffered source holding the whole file.
    ///
    /// # Return
    ///
    /// Returns the atoms and bonds in file order, with the records the model
    /// does not keep collected as metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if a record is malformed or the reader fails.
    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error>;

    /// Writes `system` preceded by the records kept in `metadata`.
    ///
    /// # Arguments
    ///
    /// * `system` - The structure to write.
    /// * `metadata` - Header records to emit ahead of the atoms.
    /// * `writer` - The destination.
    ///
    /// # Return
    ///
    /// Returns `Ok(())` once every record has been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails or the system is inconsistent.
    fn write_to(
        system: &MolecularSystem,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Writes `system` with a default header.
    ///
    /// # Arguments
    ///
    /// * `system` - The structure to write.
    /// * `writer` - The destination.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails or the system is inconsistent.
    fn write_system_to(
        system: &MolecularSystem,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Opens `path` and reads a complete structure from it.
    ///
    /// # Arguments
    ///
    /// * `path` - The file to read.
    ///
    /// # Return
    ///
    /// Returns the same system and metadata as [`MolecularFile::read_from`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, or any error
    /// [`MolecularFile::read_from`] reports.
    fn read_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes `system` to `path`, creating or truncating the file.
    ///
    /// The buffered writer is flushed before returning, so a successful return
    /// means the whole file reached the operating system.
    ///
    /// # Arguments
    ///
    /// * `system` - The structure to write.
    /// * `path` - The file to create.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created, written or flushed.
    fn write_system_to_path<P: AsRef<Path>>(
        system: &MolecularSystem,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_system_to(system, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
