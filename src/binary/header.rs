use super::cursor::ByteCursor;
use super::errors::HeaderError as Error;
use super::header_fields::{
    self, Argon2Parameters, Cipher, CompressionType, KDBX_MAGIC_NUMBER, KEEPASS_MAGIC_NUMBER,
};
use super::variant_dict;
use sha2::{Digest, Sha256};
use std::convert::TryFrom;
use std::io::{Read, Seek};
use uuid::Uuid;

type Result<T> = std::result::Result<T, Error>;

/// Length of the SHA-256 header hash and the HMAC-SHA-256 that follow the header
pub const HEADER_CHECKSUM_LEN: usize = 32;

const HEADER_START: u64 = 0;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
/// Field types for unencrypted header
pub enum OuterHeaderId {
    /// Last header field
    EndOfHeader,
    /// Custom comment to describe the database
    Comment,
    /// UUID indicating the cipher for the database
    CipherId,
    /// Compression algorithm in use
    CompressionFlags,
    /// Seed to make database keys unique
    MasterSeed,
    /// KDBX3 only - Seed used for converting passwords to keys
    LegacyTransformSeed,
    /// KDBX3 only - Number of rounds of aes256 to use to generate keys
    LegacyTransformRounds,
    /// Initial value for encrypting/decrypting the stream
    EncryptionIv,
    /// KDBX3 only - Key used for decrypting inner streams
    ProtectedStreamKey,
    /// KDBX3 only - First 32 bytes of decrypted data, newer databases have a HMAC
    StreamStartBytes,
    /// KDBX3 only - Cipher identifer for data encrypted in memory
    InnerRandomStreamId,
    /// Parameters used to convert credentials to keys
    KdfParameters,
    /// KDBX4 only - Unencrypted custom data for plugins
    PublicCustomData,
    /// Some header field not supported by this library
    Unknown(u8),
}

impl From<u8> for OuterHeaderId {
    fn from(id: u8) -> OuterHeaderId {
        match id {
            0 => OuterHeaderId::EndOfHeader,
            0x1 => OuterHeaderId::Comment,
            0x2 => OuterHeaderId::CipherId,
            0x3 => OuterHeaderId::CompressionFlags,
            0x4 => OuterHeaderId::MasterSeed,
            0x5 => OuterHeaderId::LegacyTransformSeed,
            0x6 => OuterHeaderId::LegacyTransformRounds,
            0x7 => OuterHeaderId::EncryptionIv,
            0x8 => OuterHeaderId::ProtectedStreamKey,
            0x9 => OuterHeaderId::StreamStartBytes,
            0xA => OuterHeaderId::InnerRandomStreamId,
            0xB => OuterHeaderId::KdfParameters,
            0xC => OuterHeaderId::PublicCustomData,
            x => OuterHeaderId::Unknown(x),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// Envelope layout of the header fields, which depends on the major version
pub enum FieldLayout {
    /// KDBX 3.x - `(id: u8, length: u16, payload)`
    Kdbx3,
    /// KDBX 4.x - `(id: u8, length: u32, payload)`
    Kdbx4,
}

impl FieldLayout {
    /// Layout for a major version, or [`HeaderError::UnsupportedVersion`](Error::UnsupportedVersion)
    pub fn for_major_version(major_version: u16) -> Result<FieldLayout> {
        match major_version {
            3 => Ok(FieldLayout::Kdbx3),
            4 => Ok(FieldLayout::Kdbx4),
            v => Err(Error::UnsupportedVersion(v)),
        }
    }

    fn length_width(self) -> usize {
        match self {
            FieldLayout::Kdbx3 => 2,
            FieldLayout::Kdbx4 => 4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A single `(id, length, payload)` header field
pub struct HeaderField {
    /// Field type
    pub ty: OuterHeaderId,
    /// Raw payload
    pub data: Vec<u8>,
}

struct HeaderParser<'a, R> {
    cursor: &'a mut ByteCursor<R>,
    layout: FieldLayout,
}

impl<'a, R: Read + Seek> HeaderParser<'a, R> {
    fn new(cursor: &'a mut ByteCursor<R>, layout: FieldLayout) -> HeaderParser<'a, R> {
        HeaderParser { cursor, layout }
    }

    fn read_one_header(&mut self) -> Result<HeaderField> {
        let offset = self.cursor.position();
        let ty = OuterHeaderId::from(self.cursor.read_u8()?);
        let len = self.cursor.read_le(self.layout.length_width())?;
        let data = self.cursor.read_exact(len as usize)?;
        tracing::debug!(?ty, offset, len, "Read header field");

        Ok(HeaderField { ty, data })
    }

    /// Read fields up to and including the end of header marker, which is not returned
    fn read_all_headers(&mut self) -> Result<Vec<HeaderField>> {
        let mut headers = Vec::new();
        let mut header = self.read_one_header()?;
        while header.ty != OuterHeaderId::EndOfHeader {
            headers.push(header);
            header = self.read_one_header()?;
        }

        Ok(headers)
    }
}

#[derive(Default)]
struct ParsedHeaderBuilder {
    cipher_id: Option<Vec<u8>>,
    compression_flag: Option<u32>,
    master_seed: Option<Vec<u8>>,
    encryption_iv: Option<Vec<u8>>,
    kdf_params: Option<Argon2Parameters>,
    legacy_transform_seed: bool,
    other_headers: Vec<HeaderField>,
}

impl ParsedHeaderBuilder {
    fn add_header(&mut self, header: HeaderField) -> Result<()> {
        match header.ty {
            OuterHeaderId::CipherId => self.cipher_id = Some(header.data),
            OuterHeaderId::CompressionFlags => {
                let flag: [u8; 4] = header.data.as_slice().try_into().map_err(|_| {
                    Error::MalformedField(header.ty, "Wrong size for compression ID".into())
                })?;
                self.compression_flag = Some(u32::from_le_bytes(flag));
            }
            OuterHeaderId::MasterSeed => self.master_seed = Some(header.data),
            OuterHeaderId::EncryptionIv => self.encryption_iv = Some(header.data),
            OuterHeaderId::KdfParameters => {
                let vdict = variant_dict::parse_variant_dict(&header.data)?;
                self.kdf_params = Some(Argon2Parameters::try_from(vdict)?);
            }
            OuterHeaderId::LegacyTransformSeed => {
                self.legacy_transform_seed = true;
                self.other_headers.push(header);
            }
            OuterHeaderId::Unknown(id) => {
                tracing::warn!("Unknown header field {:#04x}", id);
                self.other_headers.push(header);
            }
            _ => self.other_headers.push(header),
        }

        Ok(())
    }

    fn kdf_params(&mut self) -> Result<Argon2Parameters> {
        match self.kdf_params.take() {
            Some(params) => Ok(params),
            // KDBX 3.1 databases without a KDF block derive keys with AES
            None if self.legacy_transform_seed => Err(Error::UnsupportedKdf(hex::encode(
                header_fields::AES_3_1_UUID.as_bytes(),
            ))),
            None => Err(Error::MissingRequiredField(OuterHeaderId::KdfParameters)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Options for decoding a header
pub struct ParseOptions {
    /// Require the stored SHA-256 header hash to match the header bytes
    pub verify_header_hash: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The decoded unencrypted header of a KDBX 3 or 4 database
pub struct ParsedHeader {
    /// First signature word, normally [`KEEPASS_MAGIC_NUMBER`]
    pub signature1: u32,
    /// Second signature word, normally [`KDBX_MAGIC_NUMBER`]
    pub signature2: u32,
    /// Major format version, 3 or 4
    pub major_version: u16,
    /// Minor format version
    pub minor_version: u16,
    /// Raw cipher id, normally a UUID
    pub cipher_id: Vec<u8>,
    /// Raw compression flag
    pub compression_flag: u32,
    /// Seed to make database keys unique
    pub master_seed: Vec<u8>,
    /// IV used for initializing the database cipher
    pub encryption_iv: Vec<u8>,
    /// Argon2 key derivation settings
    pub kdf_params: Argon2Parameters,
    /// Header fields not needed for the hash line
    pub other_headers: Vec<HeaderField>,
    /// Every header byte from the start of the file to the end of header marker
    pub raw_header_bytes: Vec<u8>,
    /// SHA-256 of `raw_header_bytes` as stored in the file
    pub header_hash_sha256: [u8; HEADER_CHECKSUM_LEN],
    /// HMAC-SHA-256 of the header as stored in the file
    pub header_hmac_sha256: [u8; HEADER_CHECKSUM_LEN],
}

impl ParsedHeader {
    /// Whether both signature words are those of a KeePass 2 database
    pub fn has_keepass_signature(&self) -> bool {
        self.signature1 == KEEPASS_MAGIC_NUMBER && self.signature2 == KDBX_MAGIC_NUMBER
    }

    /// Cipher named by `cipher_id`, or `None` if the id is not a 16 byte UUID
    pub fn cipher(&self) -> Option<Cipher> {
        Uuid::from_slice(&self.cipher_id).ok().map(Cipher::from)
    }

    /// Compression applied prior to encryption
    pub fn compression(&self) -> CompressionType {
        CompressionType::from(self.compression_flag)
    }

    /// Offset of the first byte after the end of header marker
    pub fn header_end_offset(&self) -> u64 {
        HEADER_START + self.raw_header_bytes.len() as u64
    }

    /// Decode a header from the start of the cursor's source
    ///
    /// After the end of header marker the cursor is rewound and the whole
    /// header re-read verbatim, then the SHA-256 hash and the HMAC are read.
    pub fn read<R: Read + Seek>(
        cursor: &mut ByteCursor<R>,
        options: ParseOptions,
    ) -> Result<ParsedHeader> {
        cursor.seek(HEADER_START)?;

        let signature1 = cursor.read_u32_le()?;
        let signature2 = cursor.read_u32_le()?;
        if signature1 != KEEPASS_MAGIC_NUMBER || signature2 != KDBX_MAGIC_NUMBER {
            tracing::warn!(
                "Unexpected signature {:#010x} {:#010x}, not a kdbx database?",
                signature1,
                signature2
            );
        }

        let minor_version = cursor.read_u16_le()?;
        let major_version = cursor.read_u16_le()?;
        let layout = FieldLayout::for_major_version(major_version)?;
        tracing::debug!(major_version, minor_version, ?layout, "Read header version");

        let mut builder = ParsedHeaderBuilder::default();
        let headers = HeaderParser::new(cursor, layout).read_all_headers()?;
        for header in headers {
            builder.add_header(header)?;
        }

        let header_end = cursor.position();
        cursor.seek(HEADER_START)?;
        let raw_header_bytes = cursor.read_exact((header_end - HEADER_START) as usize)?;
        tracing::debug!(header_end, "Captured raw header span");

        let header_hash_sha256 = cursor.read_array::<HEADER_CHECKSUM_LEN>()?;
        let header_hmac_sha256 = cursor.read_array::<HEADER_CHECKSUM_LEN>()?;

        if options.verify_header_hash
            && Sha256::digest(&raw_header_bytes).as_slice() != &header_hash_sha256[..]
        {
            return Err(Error::ChecksumFailed);
        }

        let kdf_params = builder.kdf_params()?;
        let cipher_id = builder
            .cipher_id
            .ok_or(Error::MissingRequiredField(OuterHeaderId::CipherId))?;

        Ok(ParsedHeader {
            signature1,
            signature2,
            major_version,
            minor_version,
            cipher_id,
            compression_flag: builder
                .compression_flag
                .ok_or(Error::MissingRequiredField(OuterHeaderId::CompressionFlags))?,
            master_seed: builder
                .master_seed
                .ok_or(Error::MissingRequiredField(OuterHeaderId::MasterSeed))?,
            encryption_iv: builder
                .encryption_iv
                .ok_or(Error::MissingRequiredField(OuterHeaderId::EncryptionIv))?,
            kdf_params,
            other_headers: builder.other_headers,
            raw_header_bytes,
            header_hash_sha256,
            header_hmac_sha256,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(layout: FieldLayout, id: u8, data: &[u8]) -> Vec<u8> {
        let mut out = vec![id];
        match layout {
            FieldLayout::Kdbx3 => out.extend_from_slice(&(data.len() as u16).to_le_bytes()),
            FieldLayout::Kdbx4 => out.extend_from_slice(&(data.len() as u32).to_le_bytes()),
        }
        out.extend_from_slice(data);
        out
    }

    fn preamble(major: u16) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&KEEPASS_MAGIC_NUMBER.to_le_bytes());
        out.extend_from_slice(&KDBX_MAGIC_NUMBER.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&major.to_le_bytes());
        out
    }

    #[test]
    fn version_selects_layout() {
        assert_eq!(FieldLayout::for_major_version(3).unwrap(), FieldLayout::Kdbx3);
        assert_eq!(FieldLayout::for_major_version(4).unwrap(), FieldLayout::Kdbx4);
        assert!(matches!(
            FieldLayout::for_major_version(2),
            Err(Error::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn parser_stops_at_end_marker() -> Result<()> {
        let mut data = Vec::new();
        data.extend(field(FieldLayout::Kdbx4, 0x4, &[0xAA; 4]));
        data.extend(field(FieldLayout::Kdbx4, 0x1, b"hi"));
        data.extend(field(FieldLayout::Kdbx4, 0x0, b"\r\n\r\n"));
        data.extend_from_slice(&[0xFF; 3]);

        let mut cursor = ByteCursor::from_slice(&data);
        let headers = HeaderParser::new(&mut cursor, FieldLayout::Kdbx4).read_all_headers()?;
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].ty, OuterHeaderId::MasterSeed);
        assert_eq!(headers[1].ty, OuterHeaderId::Comment);
        assert_eq!(cursor.position(), (data.len() - 3) as u64);
        Ok(())
    }

    #[test]
    fn kdbx3_uses_short_lengths() -> Result<()> {
        let data = field(FieldLayout::Kdbx3, 0x7, &[1, 2, 3]);
        let mut cursor = ByteCursor::from_slice(&data);
        let header = HeaderParser::new(&mut cursor, FieldLayout::Kdbx3).read_one_header()?;
        assert_eq!(header.ty, OuterHeaderId::EncryptionIv);
        assert_eq!(header.data, vec![1, 2, 3]);
        Ok(())
    }

    #[test]
    fn legacy_aes_kdf_is_unsupported() {
        let mut data = preamble(3);
        data.extend(field(FieldLayout::Kdbx3, 0x2, &[0x31; 16]));
        data.extend(field(FieldLayout::Kdbx3, 0x3, &0u32.to_le_bytes()));
        data.extend(field(FieldLayout::Kdbx3, 0x4, &[0xAA; 32]));
        data.extend(field(FieldLayout::Kdbx3, 0x5, &[0xCC; 32]));
        data.extend(field(FieldLayout::Kdbx3, 0x6, &6000u64.to_le_bytes()));
        data.extend(field(FieldLayout::Kdbx3, 0x7, &[0x11; 16]));
        data.extend(field(FieldLayout::Kdbx3, 0x0, b"\r\n\r\n"));
        data.extend_from_slice(&[0u8; 64]);

        let mut cursor = ByteCursor::from_slice(&data);
        match ParsedHeader::read(&mut cursor, ParseOptions::default()) {
            Err(Error::UnsupportedKdf(uuid)) => {
                assert_eq!(uuid, "c9d9f39a628a4460bf740d08c18a4fea")
            }
            other => panic!("expected unsupported kdf, got {:?}", other),
        }
    }

    #[test]
    fn missing_kdf_parameters() {
        let mut data = preamble(4);
        data.extend(field(FieldLayout::Kdbx4, 0x2, &[0x31; 16]));
        data.extend(field(FieldLayout::Kdbx4, 0x0, b""));
        data.extend_from_slice(&[0u8; 64]);

        let mut cursor = ByteCursor::from_slice(&data);
        assert!(matches!(
            ParsedHeader::read(&mut cursor, ParseOptions::default()),
            Err(Error::MissingRequiredField(OuterHeaderId::KdfParameters))
        ));
    }

    #[test]
    fn malformed_compression_flag() {
        let mut data = preamble(4);
        data.extend(field(FieldLayout::Kdbx4, 0x3, &[0u8; 2]));
        data.extend(field(FieldLayout::Kdbx4, 0x0, b""));
        data.extend_from_slice(&[0u8; 64]);

        let mut cursor = ByteCursor::from_slice(&data);
        assert!(matches!(
            ParsedHeader::read(&mut cursor, ParseOptions::default()),
            Err(Error::MalformedField(OuterHeaderId::CompressionFlags, _))
        ));
    }
}
