use super::cursor::ByteCursor;
use super::errors::HeaderError;
use derive_more::TryInto;
use std::collections::HashMap;
use std::io;

const TAG_END: u8 = 0x00;
const TAG_UINT32: u8 = 0x04;
const TAG_UINT64: u8 = 0x05;
const TAG_BOOLEAN: u8 = 0x08;
const TAG_INT32: u8 = 0x0C;
const TAG_INT64: u8 = 0x0D;
const TAG_STRING: u8 = 0x18;
const TAG_ARRAY: u8 = 0x42;

const MAX_SUPPORTED_VERSION: u8 = 1;

#[derive(PartialEq, Eq, Debug, Clone, TryInto)]
/// A value from a kdbx header map with a type known at runtime
pub enum Value {
    /// 32 bit unsigned int
    Uint32(u32),
    /// 64 bit unsigned int
    Uint64(u64),
    /// True/False option
    Boolean(bool),
    /// 32 bit signed int
    Int32(i32),
    /// 64 bit signed int
    Int64(i64),
    /// String data
    String(String),
    /// Binary data
    Array(Vec<u8>),
    /// Unknown field type
    Unknown(u8, Vec<u8>),
}

impl Value {
    fn from_bytes(ty: u8, buffer: Vec<u8>, offset: u64) -> Result<Value> {
        let actual = buffer.len();
        let invalid_size = |expected: usize| HeaderError::InvalidSize {
            ty,
            expected,
            actual,
        };
        match ty {
            TAG_UINT32 => Ok(Value::Uint32(u32::from_le_bytes(
                (&*buffer).try_into().map_err(|_| invalid_size(4))?,
            ))),
            TAG_UINT64 => Ok(Value::Uint64(u64::from_le_bytes(
                (&*buffer).try_into().map_err(|_| invalid_size(8))?,
            ))),
            TAG_BOOLEAN => match *buffer {
                [flag] => Ok(Value::Boolean(flag != 0)),
                _ => Err(invalid_size(1)),
            },
            TAG_INT32 => Ok(Value::Int32(i32::from_le_bytes(
                (&*buffer).try_into().map_err(|_| invalid_size(4))?,
            ))),
            TAG_INT64 => Ok(Value::Int64(i64::from_le_bytes(
                (&*buffer).try_into().map_err(|_| invalid_size(8))?,
            ))),
            TAG_STRING => String::from_utf8(buffer)
                .map(Value::String)
                .map_err(|_| HeaderError::InvalidEncoding { offset }),
            TAG_ARRAY => Ok(Value::Array(buffer)),
            _ => Ok(Value::Unknown(ty, buffer)),
        }
    }
}

type Result<T> = std::result::Result<T, HeaderError>;

/// Map of values from KDBX header with differing types
pub type VariantDict = HashMap<String, Value>;

fn parse_variant_dict_entry(
    ty: u8,
    input: &mut ByteCursor<io::Cursor<&[u8]>>,
) -> Result<(String, Value)> {
    let key_length = input.read_u32_le()?;
    let key = input.read_string(key_length as usize)?;

    let value_length = input.read_u32_le()?;
    let value_offset = input.position();
    let value_buffer = input.read_exact(value_length as usize)?;

    let value = Value::from_bytes(ty, value_buffer, value_offset)?;

    Ok((key, value))
}

/// Decode a variant map, such as the payload of the KDF parameters header field
///
/// Entries are collected by name until the zero type tag; a key that appears
/// twice keeps its last value.
pub fn parse_variant_dict(data: &[u8]) -> Result<VariantDict> {
    let mut input = ByteCursor::from_slice(data);
    let mut map = HashMap::new();

    let version = input.read_u16_le()?;
    let major_version = (version >> 8) as u8;
    if major_version > MAX_SUPPORTED_VERSION {
        return Err(HeaderError::UnsupportedVariantDictVersion(major_version));
    }

    let mut ty = input.read_u8()?;
    while ty != TAG_END {
        let (key, value) = parse_variant_dict_entry(ty, &mut input)?;
        if let Value::Unknown(ty, _) = value {
            tracing::warn!(key = %key, "Unknown variant map field type {:#04x}", ty);
        }
        if map.insert(key.clone(), value).is_some() {
            tracing::debug!(key = %key, "Duplicate variant map key, keeping last value");
        }
        ty = input.read_u8()?;
    }

    if input.remaining() > 0 {
        tracing::debug!(
            trailing = input.remaining(),
            "Ignoring bytes after variant map terminator"
        );
    }

    Ok(map)
}
