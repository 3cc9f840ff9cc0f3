use ::hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::Error;

type HmacSha256 = Hmac<Sha256>;

pub const HMAC_KEY_MAX_SIZE: usize = 32;
pub const HMAC_TAG_SIZE: usize = 32;

/// An HMAC-SHA256 signing key with an embedded, bounded key value.
#[derive(Copy, Clone)]
pub struct HmacKey {
    value: [u8; HMAC_KEY_MAX_SIZE],
    size: usize,
    key_id: u32,
}

impl HmacKey {
    pub fn new(key_value: &[u8], key_id: u32) -> Result<Self, Error> {
        if key_value.len() > HMAC_KEY_MAX_SIZE {
            return Err(Error::Oversize);
        }
        let mut value = [0; HMAC_KEY_MAX_SIZE];
        value[..key_value.len()].copy_from_slice(key_value);
        Ok(Self {
            value,
            size: key_value.len(),
            key_id,
        })
    }

    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length.
        HmacSha256::new_from_slice(&self.value[..self.size]).unwrap()
    }

    pub fn sign(&self, input: &[u8]) -> [u8; HMAC_TAG_SIZE] {
        let mut mac = self.mac();
        mac.update(input);
        mac.finalize().into_bytes().into()
    }

    /// Constant-time tag comparison.
    pub fn verify(&self, input: &[u8], tag: &[u8]) -> Result<(), Error> {
        if tag.len() != HMAC_TAG_SIZE {
            return Err(Error::WrongSignatureSize);
        }
        let mut mac = self.mac();
        mac.update(input);
        mac.verify_slice(tag).map_err(|_| Error::VerificationFailed)
    }
}
