//! The outer binary format of .kdbx files

mod cursor;
pub(crate) mod errors;
mod header;
mod header_fields;
mod read;
mod variant_dict;

pub use cursor::ByteCursor;
pub use errors::HeaderError;
pub use header::{
    FieldLayout, HeaderField, OuterHeaderId, ParseOptions, ParsedHeader, HEADER_CHECKSUM_LEN,
};
pub use header_fields::{
    Argon2Parameters, Cipher, CompressionType, KdfAlgorithm, KDBX_MAGIC_NUMBER,
    KEEPASS_MAGIC_NUMBER,
};
pub use read::{from_bytes, from_reader, open};
pub use variant_dict::{parse_variant_dict, Value as VariantDictValue, VariantDict};
