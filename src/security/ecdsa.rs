use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};

use crate::error::Error;

/// Largest ASN.1 DER encoding of an ECDSA P-256 signature.
pub const ECDSA_DER_MAX_SIZE: usize = 72;
/// Smallest well-formed ASN.1 DER ECDSA signature.
pub const ECDSA_DER_MIN_SIZE: usize = 8;

/// An ECDSA P-256 signing key. Signatures are deterministic (RFC 6979),
/// so no entropy source is needed.
#[derive(Clone)]
pub struct EcdsaPrivateKey {
    key: SigningKey,
    key_id: u32,
}

/// An ECDSA P-256 verifying key.
#[derive(Clone)]
pub struct EcdsaPublicKey {
    key: VerifyingKey,
    key_id: u32,
}

impl EcdsaPrivateKey {
    /// Loads a key from a raw 32-byte big-endian scalar.
    pub fn from_bytes(scalar: &[u8], key_id: u32) -> Result<Self, Error> {
        let key = SigningKey::from_slice(scalar).map_err(|_| Error::InvalidFormat)?;
        Ok(Self { key, key_id })
    }

    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    pub fn public_key(&self) -> EcdsaPublicKey {
        EcdsaPublicKey {
            key: *self.key.verifying_key(),
            key_id: self.key_id,
        }
    }

    /// Signs `input` (hashed with SHA-256), writes the ASN.1 DER encoding
    /// into `output` and returns its length.
    pub fn sign(&self, input: &[u8], output: &mut [u8]) -> Result<usize, Error> {
        let signature: Signature = self.key.sign(input);
        let der = signature.to_der();
        let bytes = der.as_bytes();
        if output.len() < bytes.len() {
            return Err(Error::Oversize);
        }
        output[..bytes.len()].copy_from_slice(bytes);
        Ok(bytes.len())
    }
}

impl EcdsaPublicKey {
    /// Loads a key from a SEC1-encoded point (compressed or uncompressed).
    pub fn from_bytes(point: &[u8], key_id: u32) -> Result<Self, Error> {
        let key = VerifyingKey::from_sec1_bytes(point).map_err(|_| Error::InvalidFormat)?;
        Ok(Self { key, key_id })
    }

    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    pub fn verify(&self, input: &[u8], signature: &[u8]) -> Result<(), Error> {
        let signature =
            Signature::from_der(signature).map_err(|_| Error::WrongSignatureSize)?;
        self.key
            .verify(input, &signature)
            .map_err(|_| Error::VerificationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> EcdsaPrivateKey {
        let scalar =
            hex::decode("c9afa9d845ba75166b5c215767b1d6934e50c3db36e89b127b8a622b120f6721")
                .unwrap();
        EcdsaPrivateKey::from_bytes(&scalar, 42).unwrap()
    }

    #[test]
    fn test_sign_verify() {
        let key = test_key();
        let mut signature = [0u8; ECDSA_DER_MAX_SIZE];
        let used = key.sign(b"payload", &mut signature).unwrap();
        assert!(used >= ECDSA_DER_MIN_SIZE && used <= ECDSA_DER_MAX_SIZE);

        let public = key.public_key();
        assert_eq!(public.key_id(), 42);
        assert!(public.verify(b"payload", &signature[..used]).is_ok());
        assert_eq!(
            public.verify(b"tampered", &signature[..used]),
            Err(Error::VerificationFailed)
        );
        assert_eq!(
            public.verify(b"payload", &signature[..used - 1]),
            Err(Error::WrongSignatureSize)
        );
    }

    #[test]
    fn test_sign_output_too_small() {
        let key = test_key();
        let mut signature = [0u8; 16];
        assert_eq!(
            key.sign(b"payload", &mut signature),
            Err(Error::Oversize)
        );
    }

    #[test]
    fn test_bad_key_material() {
        assert!(matches!(
            EcdsaPrivateKey::from_bytes(&[0u8; 32], 1),
            Err(Error::InvalidFormat)
        ));
        assert!(matches!(
            EcdsaPublicKey::from_bytes(&[4u8; 12], 1),
            Err(Error::InvalidFormat)
        ));
    }
}
