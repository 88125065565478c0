//! Hash lines for offline password recovery tools
//!
//! Both grammars share the shape
//! `label:$keepass$*<major version>*<iterations>*<kdf uuid>*<memory>*<argon2 version>*<parallelism>*<master seed>*<transform seed>*<header data>*<header hmac>`
//! and differ in how the KDF UUID is abbreviated and in the header data
//! field: the legacy grammar carries the stored SHA-256 header hash, the
//! module grammar carries the full raw header.

use crate::binary::{Argon2Parameters, ParsedHeader};
use std::fmt;

const SIGNATURE: &str = "$keepass$";
const SEPARATOR: char = '*';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Target hash line grammar
pub enum Grammar {
    /// Generic cracking tool format, ending in the header hash and HMAC
    Legacy,
    /// Cracking tool module format, ending in the raw header and HMAC
    Module,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How the KDF UUID is written
pub enum UuidEncoding {
    /// All 16 bytes as 32 lowercase hex characters
    FullHex,
    /// The first 4 bytes as 8 lowercase hex characters
    Prefix8Hex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How the Argon2 version number is written
pub enum VersionEncoding {
    /// `19` for version 0x13
    Decimal,
    /// `13` for version 0x13
    Hex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Output configuration for [`format_hash_line`]
pub struct FormatOptions {
    /// Which header data field to emit
    pub grammar: Grammar,
    /// KDF UUID rendering
    pub uuid_encoding: UuidEncoding,
    /// Argon2 version rendering
    pub version_encoding: VersionEncoding,
}

impl FormatOptions {
    /// The encodings each grammar's consumer expects
    pub fn for_grammar(grammar: Grammar) -> FormatOptions {
        let uuid_encoding = match grammar {
            Grammar::Legacy => UuidEncoding::FullHex,
            Grammar::Module => UuidEncoding::Prefix8Hex,
        };
        FormatOptions {
            grammar,
            uuid_encoding,
            version_encoding: VersionEncoding::Decimal,
        }
    }
}

impl Default for FormatOptions {
    fn default() -> FormatOptions {
        FormatOptions::for_grammar(Grammar::Module)
    }
}

/// A single hash line, rendered through [`Display`](fmt::Display)
#[derive(Debug, Clone, Copy)]
pub struct HashLine<'a> {
    header: &'a ParsedHeader,
    kdf: &'a Argon2Parameters,
    label: &'a str,
    options: FormatOptions,
}

impl<'a> HashLine<'a> {
    /// Describe a decoded header under the given label
    pub fn new(
        header: &'a ParsedHeader,
        kdf: &'a Argon2Parameters,
        label: &'a str,
        options: FormatOptions,
    ) -> HashLine<'a> {
        HashLine {
            header,
            kdf,
            label,
            options,
        }
    }

    fn kdf_uuid(&self) -> String {
        let mut uuid = hex::encode(self.kdf.kdf_uuid().as_bytes());
        if self.options.uuid_encoding == UuidEncoding::Prefix8Hex {
            uuid.truncate(8);
        }
        uuid
    }

    fn argon2_version(&self) -> String {
        match self.options.version_encoding {
            VersionEncoding::Decimal => self.kdf.version.to_string(),
            VersionEncoding::Hex => format!("{:x}", self.kdf.version),
        }
    }

    fn header_data(&self) -> String {
        match self.options.grammar {
            Grammar::Legacy => hex::encode(self.header.header_hash_sha256),
            Grammar::Module => hex::encode(&self.header.raw_header_bytes),
        }
    }
}

impl fmt::Display for HashLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            self.header.major_version.to_string(),
            self.kdf.iterations.to_string(),
            self.kdf_uuid(),
            self.kdf.memory_bytes.to_string(),
            self.argon2_version(),
            self.kdf.parallelism.to_string(),
            hex::encode(&self.header.master_seed),
            hex::encode(&self.kdf.salt),
            self.header_data(),
            hex::encode(self.header.header_hmac_sha256),
        ];

        write!(f, "{}:{}", self.label, SIGNATURE)?;
        for field in fields.iter() {
            write!(f, "{}{}", SEPARATOR, field)?;
        }
        Ok(())
    }
}

/// Render a decoded header as a single hash line
pub fn format_hash_line(
    header: &ParsedHeader,
    kdf: &Argon2Parameters,
    label: &str,
    options: &FormatOptions,
) -> String {
    HashLine::new(header, kdf, label, *options).to_string()
}
