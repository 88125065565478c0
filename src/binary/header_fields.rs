use super::errors::HeaderError;
use super::variant_dict::{Value, VariantDict};
use crate::utils;
use std::convert::TryFrom;
use uuid::{uuid, Uuid};

/// First signature word of every KeePass database
pub const KEEPASS_MAGIC_NUMBER: u32 = 0x9AA2_D903;
/// Second signature word of KeePass 2 (kdbx) databases
pub const KDBX_MAGIC_NUMBER: u32 = 0xB54B_FB67;

const AES128_UUID: Uuid = uuid!("61ab05a1-9464-41c3-8d74-3a563df8dd35");
const AES256_UUID: Uuid = uuid!("31c1f2e6-bf71-4350-be58-05216afc5aff");
const TWOFISH_UUID: Uuid = uuid!("ad68f29f-576f-4bb9-a36a-d47af965346c");
const CHACHA20_UUID: Uuid = uuid!("d6038a2b-8b6f-4cb5-a524-339a31dbb59a");
/// KDF UUID of the AES transform used by KDBX 3.1 databases
pub(crate) const AES_3_1_UUID: Uuid = uuid!("c9d9f39a-628a-4460-bf74-0d08c18a4fea");
const ARGON2D_UUID: Uuid = uuid!("ef636ddf-8c29-444b-91f7-a9a403e30a0c");
const ARGON2ID_UUID: Uuid = uuid!("9e298b19-56db-4773-b23d-fc3ec6f0a1e6");
const COMPRESSION_TYPE_NONE: u32 = 0;
const COMPRESSION_TYPE_GZIP: u32 = 1;

const KDF_UUID_KEY: &str = "$UUID";
const ITERATIONS_KEY: &str = "I";
const MEMORY_KEY: &str = "M";
const PARALLELISM_KEY: &str = "P";
const SALT_KEY: &str = "S";
const VERSION_KEY: &str = "V";

#[derive(PartialEq, Eq, Debug, Copy, Clone)]
/// Encryption cipher used for the database payload
pub enum Cipher {
    /// AES 128 in CBC mode
    Aes128,
    /// AES 256 in CBC mode
    Aes256,
    /// TwoFish in CBC mode
    TwoFish,
    /// ChaCha20 in streaming mode
    ChaCha20,
    /// Cipher unknown to this library
    Unknown(Uuid),
}

const CIPHER_TABLE: [(Uuid, Cipher); 4] = [
    (AES128_UUID, Cipher::Aes128),
    (AES256_UUID, Cipher::Aes256),
    (TWOFISH_UUID, Cipher::TwoFish),
    (CHACHA20_UUID, Cipher::ChaCha20),
];

impl From<Uuid> for Cipher {
    fn from(uuid: Uuid) -> Cipher {
        utils::value_from_uuid_table(&CIPHER_TABLE, uuid).unwrap_or(Cipher::Unknown(uuid))
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// Compression method used prior to encryption
pub enum CompressionType {
    /// The encrypted data is uncompressed
    None,
    /// The encrypted data uses gzip compression
    Gzip,
    /// The encrypted data uses a compression method unknown to this library
    Unknown(u32),
}

impl From<u32> for CompressionType {
    fn from(id: u32) -> CompressionType {
        match id {
            COMPRESSION_TYPE_NONE => CompressionType::None,
            COMPRESSION_TYPE_GZIP => CompressionType::Gzip,
            _ => CompressionType::Unknown(id),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// Key derivation functions this library can describe
pub enum KdfAlgorithm {
    /// Argon2d KDF
    Argon2d,
    /// Argon2id KDF
    Argon2id,
}

const KDF_TABLE: [(Uuid, KdfAlgorithm); 2] = [
    (ARGON2D_UUID, KdfAlgorithm::Argon2d),
    (ARGON2ID_UUID, KdfAlgorithm::Argon2id),
];

impl KdfAlgorithm {
    /// Identify the KDF from the raw bytes of its UUID
    ///
    /// Anything other than the Argon2d or Argon2id UUID is rejected with
    /// [`HeaderError::UnsupportedKdf`].
    pub fn from_uuid_bytes(bytes: &[u8]) -> Result<KdfAlgorithm, HeaderError> {
        Uuid::from_slice(bytes)
            .ok()
            .and_then(|uuid| utils::value_from_uuid_table(&KDF_TABLE, uuid))
            .ok_or_else(|| HeaderError::UnsupportedKdf(hex::encode(bytes)))
    }

    /// UUID identifying this KDF in the header
    pub fn uuid(self) -> Uuid {
        match self {
            KdfAlgorithm::Argon2d => ARGON2D_UUID,
            KdfAlgorithm::Argon2id => ARGON2ID_UUID,
        }
    }

    /// Matching variant for the `argon2` crate
    pub fn variant(self) -> argon2::Variant {
        match self {
            KdfAlgorithm::Argon2d => argon2::Variant::Argon2d,
            KdfAlgorithm::Argon2id => argon2::Variant::Argon2id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Argon2 settings decoded from the KDF parameters header field
pub struct Argon2Parameters {
    /// Argon2 variant, taken from the KDF UUID
    pub algorithm: KdfAlgorithm,
    /// Passes of the KDF to use for key gen
    pub iterations: u64,
    /// Amount of memory to use for key gen
    pub memory_bytes: u64,
    /// Number of parallel lanes
    pub parallelism: u32,
    /// Random seed data for the KDF, a.k.a. the transform seed
    pub salt: Vec<u8>,
    /// Argon2 version used, usually 0x13
    pub version: u32,
}

impl Argon2Parameters {
    /// UUID of the KDF as stored in the header
    pub fn kdf_uuid(&self) -> Uuid {
        self.algorithm.uuid()
    }

    fn take<T>(
        key: &str,
        expected: &'static str,
        vdict: &mut VariantDict,
    ) -> Result<T, HeaderError>
    where
        T: TryFrom<Value>,
    {
        let value = vdict
            .remove(key)
            .ok_or_else(|| HeaderError::MissingField(key.to_string()))?;
        T::try_from(value).map_err(|_| HeaderError::InvalidKdfParam {
            name: key.to_string(),
            expected,
        })
    }
}

impl TryFrom<VariantDict> for Argon2Parameters {
    type Error = HeaderError;

    fn try_from(mut vdict: VariantDict) -> Result<Self, HeaderError> {
        let uuid: Vec<u8> = Self::take(KDF_UUID_KEY, "a byte array", &mut vdict)?;
        let algorithm = KdfAlgorithm::from_uuid_bytes(&uuid)?;

        let iterations = Self::take(ITERATIONS_KEY, "a u64", &mut vdict)?;
        let memory_bytes = Self::take(MEMORY_KEY, "a u64", &mut vdict)?;
        let parallelism = Self::take(PARALLELISM_KEY, "a u32", &mut vdict)?;
        let salt = Self::take(SALT_KEY, "a byte array", &mut vdict)?;
        let version = Self::take(VERSION_KEY, "a u32", &mut vdict)?;

        if !vdict.is_empty() {
            tracing::debug!(
                keys = ?vdict.keys().collect::<Vec<_>>(),
                "Ignoring extra KDF parameters"
            );
        }

        Ok(Argon2Parameters {
            algorithm,
            iterations,
            memory_bytes,
            parallelism,
            salt,
            version,
        })
    }
}
