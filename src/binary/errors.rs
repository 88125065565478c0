use super::header::OuterHeaderId;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors encountered decoding the unencrypted database header
pub enum HeaderError {
    /// The underlying reader failed for a reason other than running out of data
    #[error("Error reading database header - {0}")]
    Io(#[from] std::io::Error),
    /// The input ended before a field was complete
    #[error("Truncated input - needed {needed} bytes at offset {offset} but only {remaining} remain")]
    TruncatedInput {
        /// Offset of the field that could not be read
        offset: u64,
        /// Bytes the field required
        needed: u64,
        /// Bytes left in the input
        remaining: u64,
    },
    /// A text field contained invalid UTF-8
    #[error("Invalid UTF-8 in field at offset {offset}")]
    InvalidEncoding {
        /// Offset of the start of the text field
        offset: u64,
    },
    /// The KDBX version is not v3 or v4
    #[error("Unsupported kdbx version {0}")]
    UnsupportedVersion(u16),
    /// The KDF UUID is neither Argon2d nor Argon2id
    #[error("Unsupported KDF {0} - only Argon2d and Argon2id are supported")]
    UnsupportedKdf(String),
    /// A required KDF parameter was not present in the variant map
    #[error("Incompatible database - Missing KDF parameter {0:?}")]
    MissingField(String),
    /// A KDF parameter was present but had the wrong type
    #[error("Incompatible database - KDF parameter {name:?} should be {expected}")]
    InvalidKdfParam {
        /// Variant map key of the parameter
        name: String,
        /// Type the parameter must have
        expected: &'static str,
    },
    /// A required field is missing in the unencrypted header
    #[error("Incompatible database - Missing required field of type {0:?}")]
    MissingRequiredField(OuterHeaderId),
    /// A supported field had an unexpected format
    #[error("Incompatible database - Malformed field of type {0:?} - {1}")]
    MalformedField(OuterHeaderId, String),
    /// Some variant map value was not the expected size for its type
    #[error("Invalid size for type {ty:#04x}. Expected {expected} bytes but was {actual} bytes")]
    InvalidSize {
        /// Type tag of the entry
        ty: u8,
        /// Expected size for this type
        expected: usize,
        /// Actual size of the value
        actual: usize,
    },
    /// Variant map version unsupported by this library, version too high?
    #[error("Variant map version {0} too high")]
    UnsupportedVariantDictVersion(u8),
    /// Validating the header against the unencrypted sha256 hash failed
    #[error("Corrupt database - Header Checksum failed")]
    ChecksumFailed,
}
