//! Synthetic kdbx headers, built byte by byte
#![allow(dead_code)]

pub const ARGON2D_UUID: &str = "ef636ddf8c29444b91f7a9a403e30a0c";
pub const ARGON2ID_UUID: &str = "9e298b1956db4773b23dfc3ec6f0a1e6";
pub const AES256_CIPHER_UUID: &str = "31c1f2e6bf714350be5805216afc5aff";

const TAG_UINT32: u8 = 0x04;
const TAG_UINT64: u8 = 0x05;
const TAG_ARRAY: u8 = 0x42;

pub struct HeaderFixture {
    pub signature1: u32,
    pub signature2: u32,
    pub major_version: u16,
    pub minor_version: u16,
    pub cipher_id: Vec<u8>,
    pub kdf_uuid: Vec<u8>,
    pub iterations: u64,
    pub memory_bytes: u64,
    pub parallelism: u32,
    pub salt: Vec<u8>,
    pub argon2_version: u32,
    pub master_seed: Vec<u8>,
    pub encryption_iv: Vec<u8>,
    pub header_hash: [u8; 32],
    pub header_hmac: [u8; 32],
    /// Variant map keys to leave out
    pub omit: Vec<&'static str>,
    /// Write the variant map entries in reverse order
    pub reverse_entries: bool,
}

impl Default for HeaderFixture {
    fn default() -> HeaderFixture {
        HeaderFixture {
            signature1: 0x9AA2_D903,
            signature2: 0xB54B_FB67,
            major_version: 4,
            minor_version: 1,
            cipher_id: hex::decode(AES256_CIPHER_UUID).unwrap(),
            kdf_uuid: hex::decode(ARGON2ID_UUID).unwrap(),
            iterations: 2,
            memory_bytes: 65536,
            parallelism: 4,
            salt: vec![0u8; 32],
            argon2_version: 0x13,
            master_seed: vec![0xAA; 32],
            encryption_iv: vec![0x11; 16],
            header_hash: [0xCC; 32],
            header_hmac: [0xBB; 32],
            omit: Vec::new(),
            reverse_entries: false,
        }
    }
}

fn entry(ty: u8, key: &str, value: &[u8]) -> Vec<u8> {
    let mut data = vec![ty];
    data.extend_from_slice(&(key.len() as u32).to_le_bytes());
    data.extend_from_slice(key.as_bytes());
    data.extend_from_slice(&(value.len() as u32).to_le_bytes());
    data.extend_from_slice(value);
    data
}

impl HeaderFixture {
    pub fn variant_map(&self) -> Vec<u8> {
        let mut entries = vec![
            ("$UUID", entry(TAG_ARRAY, "$UUID", &self.kdf_uuid)),
            ("I", entry(TAG_UINT64, "I", &self.iterations.to_le_bytes())),
            ("M", entry(TAG_UINT64, "M", &self.memory_bytes.to_le_bytes())),
            ("P", entry(TAG_UINT32, "P", &self.parallelism.to_le_bytes())),
            ("S", entry(TAG_ARRAY, "S", &self.salt)),
            ("V", entry(TAG_UINT32, "V", &self.argon2_version.to_le_bytes())),
        ];
        entries.retain(|(key, _)| !self.omit.contains(key));
        if self.reverse_entries {
            entries.reverse();
        }

        let mut data = vec![0x00, 0x01];
        for (_, bytes) in entries {
            data.extend(bytes);
        }
        data.push(0x00);
        data
    }

    fn field(&self, id: u8, payload: &[u8]) -> Vec<u8> {
        let mut data = vec![id];
        if self.major_version == 3 {
            data.extend_from_slice(&(payload.len() as u16).to_le_bytes());
        } else {
            data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        }
        data.extend_from_slice(payload);
        data
    }

    /// Everything from the signature up to and including the end of header marker
    pub fn header_bytes(&self) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&self.signature1.to_le_bytes());
        data.extend_from_slice(&self.signature2.to_le_bytes());
        data.extend_from_slice(&self.minor_version.to_le_bytes());
        data.extend_from_slice(&self.major_version.to_le_bytes());
        data.extend(self.field(0x02, &self.cipher_id));
        data.extend(self.field(0x03, &1u32.to_le_bytes()));
        data.extend(self.field(0x04, &self.master_seed));
        data.extend(self.field(0x07, &self.encryption_iv));
        data.extend(self.field(0x0B, &self.variant_map()));
        data.extend(self.field(0x00, b"\r\n\r\n"));
        data
    }

    /// The header followed by the header hash and HMAC
    pub fn build(&self) -> Vec<u8> {
        let mut data = self.header_bytes();
        data.extend_from_slice(&self.header_hash);
        data.extend_from_slice(&self.header_hmac);
        data
    }
}
