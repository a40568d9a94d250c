use super::error::InputError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Common interface of the tabular input formats.
///
/// Implementors parse from any buffered reader; reading from a path is provided.
pub trait DataFile {
    /// The parsed content of the file.
    type Output;

    /// Parses the format from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or a record cannot be parsed.
    fn read_from(reader: &mut impl BufRead) -> Result<Self::Output, InputError>;

    /// Opens `path` and parses it with [`DataFile::read_from`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self::Output, InputError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}
