use sha2::{Digest, Sha256};

use crate::error::Error;

pub const SHA256_HASH_SIZE: usize = 32;

pub fn sha256(input: &[u8]) -> [u8; SHA256_HASH_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hasher.finalize().into()
}

/// Writes the digest of `input` into `output` and returns the number of
/// bytes used.
pub fn sha256_sign(input: &[u8], output: &mut [u8]) -> Result<usize, Error> {
    if output.len() < SHA256_HASH_SIZE {
        return Err(Error::Oversize);
    }
    output[..SHA256_HASH_SIZE].copy_from_slice(&sha256(input));
    Ok(SHA256_HASH_SIZE)
}

pub fn sha256_verify(input: &[u8], signature: &[u8]) -> Result<(), Error> {
    if signature.len() != SHA256_HASH_SIZE {
        return Err(Error::WrongSignatureSize);
    }
    if sha256(input).as_slice() != signature {
        return Err(Error::VerificationFailed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_vector() {
        assert_eq!(
            sha256(b"abc").to_vec(),
            hex::decode("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
                .unwrap()
        );
    }

    #[test]
    fn test_sign_verify() {
        let mut signature = [0u8; 64];
        let used = sha256_sign(b"payload", &mut signature).unwrap();
        assert_eq!(used, SHA256_HASH_SIZE);
        assert!(sha256_verify(b"payload", &signature[..used]).is_ok());
        assert_eq!(
            sha256_verify(b"tampered", &signature[..used]),
            Err(Error::VerificationFailed)
        );
        assert_eq!(
            sha256_verify(b"payload", &signature[..16]),
            Err(Error::WrongSignatureSize)
        );
    }
}
