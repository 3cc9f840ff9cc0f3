use ::aes::Aes128;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::error::Error;
use crate::limits::AES_BLOCK_SIZE;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

pub const AES_KEY_SIZE: usize = 16;

/// The ciphertext size for a plaintext of `plaintext_len` bytes under
/// CBC with PKCS#7 padding: the length rounded up one whole block.
pub fn padded_length(plaintext_len: usize) -> usize {
    (plaintext_len / AES_BLOCK_SIZE + 1) * AES_BLOCK_SIZE
}

/// An AES-128 content-encryption key.
#[derive(Copy, Clone)]
pub struct AesKey {
    value: [u8; AES_KEY_SIZE],
    key_id: u32,
}

impl AesKey {
    pub fn new(key_value: &[u8; AES_KEY_SIZE], key_id: u32) -> Self {
        Self {
            value: *key_value,
            key_id,
        }
    }

    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    /// Encrypts `plaintext` into `output` with a caller-supplied IV and
    /// returns the ciphertext length, always `padded_length(plaintext)`.
    pub fn cbc_encrypt(
        &self,
        plaintext: &[u8],
        iv: &[u8; AES_BLOCK_SIZE],
        output: &mut [u8],
    ) -> Result<usize, Error> {
        let ciphertext = Aes128CbcEnc::new(&self.value.into(), iv.into())
            .encrypt_padded_b2b_mut::<Pkcs7>(plaintext, output)
            .map_err(|_| Error::Oversize)?;
        Ok(ciphertext.len())
    }

    /// Decrypts and unpads `buffer` in place, returning the plaintext
    /// slice at its front.
    pub fn cbc_decrypt_in_place<'a>(
        &self,
        buffer: &'a mut [u8],
        iv: &[u8; AES_BLOCK_SIZE],
    ) -> Result<&'a [u8], Error> {
        Aes128CbcDec::new(&self.value.into(), iv.into())
            .decrypt_padded_mut::<Pkcs7>(buffer)
            .map_err(|_| Error::InvalidFormat)
    }
}
