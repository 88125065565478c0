use super::cursor::ByteCursor;
use super::errors::HeaderError;
use super::header::{ParseOptions, ParsedHeader};
use crate::errors::Error;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

/// Decode the header of a database from a seekable input stream
///
/// The stream is read from its first byte, whatever its current position.
pub fn from_reader<R: Read + Seek>(
    input: R,
    options: ParseOptions,
) -> Result<ParsedHeader, HeaderError> {
    let mut cursor = ByteCursor::new(input)?;
    ParsedHeader::read(&mut cursor, options)
}

/// Decode the header of a database held in memory
pub fn from_bytes(data: &[u8], options: ParseOptions) -> Result<ParsedHeader, HeaderError> {
    let mut cursor = ByteCursor::from_slice(data);
    ParsedHeader::read(&mut cursor, options)
}

/// Decode the header of the database at a given path
pub fn open<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<ParsedHeader, Error> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "Opened database");
    Ok(from_reader(file, options)?)
}
