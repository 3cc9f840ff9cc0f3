use crate::error::Error;
use crate::limits::SIGNATURE_BUFFER_SIZE;
use crate::name::Name;
use crate::security::{ECDSA_DER_MAX_SIZE, ECDSA_DER_MIN_SIZE, SHA256_HASH_SIZE};
use crate::tlv::{probe_block_size, uint_size, Decoder, Encode, Encoder};

pub const TLV_SIGNATURE_INFO: u32 = 22;
pub const TLV_SIGNATURE_VALUE: u32 = 23;

const TLV_SIGNATURE_TYPE: u32 = 27;
const TLV_KEY_LOCATOR: u32 = 28;
const TLV_VALIDITY_PERIOD: u32 = 253;
const TLV_NOT_BEFORE: u32 = 254;
const TLV_NOT_AFTER: u32 = 255;
const TLV_SIGNATURE_NONCE: u32 = 38;
const TLV_SIGNATURE_TIME: u32 = 40;

/// ISO 8601 compact timestamp length used by validity periods.
pub const VALIDITY_TIMESTAMP_SIZE: usize = 15;

const SIGNATURE_NONCE_SIZE: usize = 4;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SignatureType {
    DigestSha256,
    EcdsaSha256,
    HmacSha256,
}

impl TryFrom<u64> for SignatureType {
    type Error = Error;

    fn try_from(value: u64) -> Result<Self, Error> {
        match value {
            0 => Ok(Self::DigestSha256),
            3 => Ok(Self::EcdsaSha256),
            4 => Ok(Self::HmacSha256),
            _ => Err(Error::UnsupportedSignatureType),
        }
    }
}

impl From<SignatureType> for u64 {
    fn from(value: SignatureType) -> Self {
        match value {
            SignatureType::DigestSha256 => 0,
            SignatureType::EcdsaSha256 => 3,
            SignatureType::HmacSha256 => 4,
        }
    }
}

/// A signature validity period: two compact ISO 8601 timestamps.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ValidityPeriod {
    pub not_before: [u8; VALIDITY_TIMESTAMP_SIZE],
    pub not_after: [u8; VALIDITY_TIMESTAMP_SIZE],
}

/// The signature of a packet: the suite, the value bytes and the optional
/// signature-info fields.
///
/// A Data packet may be mutated only until its signature is finalised by
/// one of the signing encoders.
#[derive(Copy, Clone, Debug)]
pub struct Signature {
    sig_type: SignatureType,
    sig_value: [u8; SIGNATURE_BUFFER_SIZE],
    sig_size: usize,
    pub key_locator: Option<Name>,
    pub validity_period: Option<ValidityPeriod>,
    pub nonce: Option<u32>,
    pub timestamp: Option<u64>,
}

impl Signature {
    /// A fresh signature record with the expected value size preset for
    /// the suite and every optional field disabled.
    pub fn new(sig_type: SignatureType) -> Self {
        let sig_size = match sig_type {
            SignatureType::DigestSha256 | SignatureType::HmacSha256 => SHA256_HASH_SIZE,
            SignatureType::EcdsaSha256 => ECDSA_DER_MAX_SIZE,
        };
        Self {
            sig_type,
            sig_value: [0; SIGNATURE_BUFFER_SIZE],
            sig_size,
            key_locator: None,
            validity_period: None,
            nonce: None,
            timestamp: None,
        }
    }

    pub fn signature_type(&self) -> SignatureType {
        self.sig_type
    }

    pub fn value(&self) -> &[u8] {
        &self.sig_value[..self.sig_size]
    }

    /// Stores the signature bytes, enforcing the per-suite size
    /// invariants: exactly 32 for digest and HMAC, a well-formed DER
    /// length range for ECDSA.
    pub fn set_value(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if bytes.len() > SIGNATURE_BUFFER_SIZE {
            return Err(Error::Oversize);
        }
        let valid = match self.sig_type {
            SignatureType::DigestSha256 | SignatureType::HmacSha256 => {
                bytes.len() == SHA256_HASH_SIZE
            }
            SignatureType::EcdsaSha256 => {
                bytes.len() >= ECDSA_DER_MIN_SIZE && bytes.len() <= ECDSA_DER_MAX_SIZE
            }
        };
        if !valid {
            return Err(Error::WrongSignatureSize);
        }
        self.sig_value[..bytes.len()].copy_from_slice(bytes);
        self.sig_size = bytes.len();
        Ok(())
    }

    fn info_inner_length(&self) -> usize {
        let mut length = probe_block_size(TLV_SIGNATURE_TYPE, 1);
        if let Some(key_locator) = &self.key_locator {
            length += probe_block_size(TLV_KEY_LOCATOR, key_locator.encoded_length());
        }
        if self.validity_period.is_some() {
            let period_length = probe_block_size(TLV_NOT_BEFORE, VALIDITY_TIMESTAMP_SIZE)
                + probe_block_size(TLV_NOT_AFTER, VALIDITY_TIMESTAMP_SIZE);
            length += probe_block_size(TLV_VALIDITY_PERIOD, period_length);
        }
        if self.nonce.is_some() {
            length += probe_block_size(TLV_SIGNATURE_NONCE, SIGNATURE_NONCE_SIZE);
        }
        if let Some(timestamp) = self.timestamp {
            length += probe_block_size(TLV_SIGNATURE_TIME, uint_size(timestamp));
        }
        length
    }

    /// Wire size of the whole signature-info block. Independent of the
    /// signature value, so it can be probed before signing.
    pub fn info_encoded_length(&self) -> usize {
        probe_block_size(TLV_SIGNATURE_INFO, self.info_inner_length())
    }

    pub fn encode_info(&self, encoder: &mut Encoder<'_>) -> Result<(), Error> {
        encoder.append_type(TLV_SIGNATURE_INFO)?;
        encoder.append_length(self.info_inner_length())?;

        encoder.append_type(TLV_SIGNATURE_TYPE)?;
        encoder.append_length(1)?;
        encoder.append_raw(&[u64::from(self.sig_type) as u8])?;

        if let Some(key_locator) = &self.key_locator {
            encoder.append_type(TLV_KEY_LOCATOR)?;
            encoder.append_length(key_locator.encoded_length())?;
            key_locator.encode(encoder)?;
        }
        if let Some(period) = &self.validity_period {
            let period_length = probe_block_size(TLV_NOT_BEFORE, VALIDITY_TIMESTAMP_SIZE)
                + probe_block_size(TLV_NOT_AFTER, VALIDITY_TIMESTAMP_SIZE);
            encoder.append_type(TLV_VALIDITY_PERIOD)?;
            encoder.append_length(period_length)?;
            encoder.append_type(TLV_NOT_BEFORE)?;
            encoder.append_length(VALIDITY_TIMESTAMP_SIZE)?;
            encoder.append_raw(&period.not_before)?;
            encoder.append_type(TLV_NOT_AFTER)?;
            encoder.append_length(VALIDITY_TIMESTAMP_SIZE)?;
            encoder.append_raw(&period.not_after)?;
        }
        if let Some(nonce) = self.nonce {
            encoder.append_type(TLV_SIGNATURE_NONCE)?;
            encoder.append_length(SIGNATURE_NONCE_SIZE)?;
            encoder.append_raw(&nonce.to_be_bytes())?;
        }
        if let Some(timestamp) = self.timestamp {
            encoder.append_uint_tlv(TLV_SIGNATURE_TIME, timestamp)?;
        }
        Ok(())
    }

    /// Decodes a signature-info block, skipping unknown sub-TLVs within
    /// the declared length.
    pub fn decode_info(decoder: &mut Decoder<'_>) -> Result<Self, Error> {
        decoder.expect_type(TLV_SIGNATURE_INFO)?;
        let length = decoder.read_length()?;
        let end = decoder
            .offset()
            .checked_add(length)
            .ok_or(Error::BufferUnderflow)?;

        let raw_type = decoder.read_uint_tlv(TLV_SIGNATURE_TYPE)?;
        let mut signature = Self::new(raw_type.try_into()?);

        while decoder.offset() < end {
            let typ = decoder.read_type()?;
            let sub_length = decoder.read_length()?;
            match typ {
                TLV_KEY_LOCATOR => {
                    signature.key_locator = Some(Name::decode(decoder)?);
                }
                TLV_VALIDITY_PERIOD => {
                    let mut period = ValidityPeriod {
                        not_before: [0; VALIDITY_TIMESTAMP_SIZE],
                        not_after: [0; VALIDITY_TIMESTAMP_SIZE],
                    };
                    decoder.expect_type(TLV_NOT_BEFORE)?;
                    if decoder.read_length()? != VALIDITY_TIMESTAMP_SIZE {
                        return Err(Error::InvalidFormat);
                    }
                    decoder.read_raw(&mut period.not_before)?;
                    decoder.expect_type(TLV_NOT_AFTER)?;
                    if decoder.read_length()? != VALIDITY_TIMESTAMP_SIZE {
                        return Err(Error::InvalidFormat);
                    }
                    decoder.read_raw(&mut period.not_after)?;
                    signature.validity_period = Some(period);
                }
                TLV_SIGNATURE_NONCE => {
                    if sub_length != SIGNATURE_NONCE_SIZE {
                        return Err(Error::InvalidFormat);
                    }
                    let mut nonce = [0u8; SIGNATURE_NONCE_SIZE];
                    decoder.read_raw(&mut nonce)?;
                    signature.nonce = Some(u32::from_be_bytes(nonce));
                }
                TLV_SIGNATURE_TIME => {
                    signature.timestamp = Some(decoder.read_uint(sub_length)?);
                }
                _ => {
                    decoder.value_slice(sub_length)?;
                }
            }
        }
        if decoder.offset() != end {
            return Err(Error::InvalidFormat);
        }
        Ok(signature)
    }

    /// Wire size of the signature-value block at the current value size.
    pub fn value_encoded_length(&self) -> usize {
        probe_block_size(TLV_SIGNATURE_VALUE, self.sig_size)
    }

    pub fn encode_value(&self, encoder: &mut Encoder<'_>) -> Result<(), Error> {
        encoder.append_type(TLV_SIGNATURE_VALUE)?;
        encoder.append_length(self.sig_size)?;
        encoder.append_raw(self.value())
    }

    pub fn decode_value(&mut self, decoder: &mut Decoder<'_>) -> Result<(), Error> {
        decoder.expect_type(TLV_SIGNATURE_VALUE)?;
        let length = decoder.read_length()?;
        if length > SIGNATURE_BUFFER_SIZE {
            return Err(Error::Oversize);
        }
        decoder.read_raw(&mut self.sig_value[..length])?;
        self.sig_size = length;
        Ok(())
    }
}
