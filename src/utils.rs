//! Utilities to help working with kdbx-hashline

use std::path::Path;
use uuid::Uuid;

pub(crate) fn value_from_uuid_table<T: Clone>(table: &[(Uuid, T)], lookup: Uuid) -> Option<T> {
    table
        .iter()
        .find(|(item_uuid, _)| *item_uuid == lookup)
        .map(|(_, value)| value.clone())
}

pub(crate) fn buffer(len: usize) -> Vec<u8> {
    let mut v = Vec::with_capacity(len);
    v.resize_with(len, Default::default);
    v
}

/// Little endian bytes to an integer, e.g. [0x13, 0x00] => 0x13
pub(crate) fn le_to_u64(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .take(8)
        .rev()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte))
}

/// Label used as the "username" part of a hash line
///
/// This is the file name without its extension, so `/tmp/Passwords.kdbx`
/// becomes `Passwords`. Falls back to the full path if there is no file name.
pub fn label_from_path<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
