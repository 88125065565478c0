#![deny(missing_docs)]

//! Extract Argon2 key derivation settings from KeePass 2 (KDBX 3 and 4)
//! database headers and describe them as hash lines for offline password
//! recovery tools.
//!
//! The main types in this crate are:
//!
//! * [`ParsedHeader`] which is the decoded unencrypted header of a database
//! * [`Argon2Parameters`] which are the key derivation settings from that header
//! * [`HashLine`] which renders both as a single line
//!
//! # Reading a header
//!
//! Headers can be read with the [`kdbx_hashline::open`] function, or from any
//! seekable stream with [`kdbx_hashline::from_reader`]. Nothing is decrypted,
//! only the unencrypted header and the checksums following it are read.
//!
//! ```no_run
//! # fn main() -> Result<(), kdbx_hashline::Error> {
//! use kdbx_hashline::format::{format_hash_line, FormatOptions, Grammar};
//! use kdbx_hashline::ParseOptions;
//!
//! let header = kdbx_hashline::open("Passwords.kdbx", ParseOptions::default())?;
//! let options = FormatOptions::for_grammar(Grammar::Module);
//! let line = format_hash_line(&header, &header.kdf_params, "Passwords", &options);
//! println!("{}", line);
//! # Ok(())
//! # }
//! ```
//!
//! Only Argon2d and Argon2id databases can be described. Any other KDF is
//! rejected with [`HeaderError::UnsupportedKdf`].
//!
//! [`kdbx_hashline::from_reader`]: crate::from_reader
//! [`kdbx_hashline::open`]: crate::open
//! [`HeaderError::UnsupportedKdf`]: crate::errors::HeaderError::UnsupportedKdf

pub mod binary;
pub mod errors;
pub mod format;
pub mod utils;

pub use binary::{from_bytes, from_reader, open, Argon2Parameters, ParseOptions, ParsedHeader};
pub use errors::Error;
pub use format::{format_hash_line, HashLine};
