use crate::error::Error;
use crate::limits::{AES_BLOCK_SIZE, CONTENT_BUFFER_SIZE};
use crate::name::{Name, NameComponent};
use crate::security::{padded_length, sha256, sha256_verify, AesKey, EcdsaPrivateKey, EcdsaPublicKey, HmacKey};
use crate::signature::{Signature, SignatureType, TLV_SIGNATURE_INFO};
use crate::tlv::{
    probe_block_size, uint_size, Decoder, Encode, Encoder, TLV_LENGTH_FIELD_MAX_SIZE,
    TLV_TYPE_FIELD_MAX_SIZE,
};

pub const TLV_INTEREST: u32 = 5;
pub const TLV_DATA: u32 = 6;
pub const TLV_META_INFO: u32 = 20;
pub const TLV_CONTENT: u32 = 21;

const TLV_META_INFO_CONTENT_TYPE: u32 = 24;
const TLV_META_INFO_FRESHNESS_PERIOD: u32 = 25;
const TLV_META_INFO_FINAL_BLOCK_ID: u32 = 26;

// Name-based access control envelope, carried inside TLV_Content.
const TLV_AC_ENCRYPTED_CONTENT: u32 = 130;
const TLV_AC_ENCRYPTED_PAYLOAD: u32 = 132;
const TLV_AC_AES_IV: u32 = 133;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ContentType {
    Blob,
    Key,
    Link,
    Nack,
    Other(u64),
}

impl From<u64> for ContentType {
    fn from(value: u64) -> Self {
        match value {
            0 => Self::Blob,
            1 => Self::Key,
            2 => Self::Link,
            3 => Self::Nack,
            u => Self::Other(u),
        }
    }
}

impl From<ContentType> for u64 {
    fn from(value: ContentType) -> Self {
        match value {
            ContentType::Blob => 0,
            ContentType::Key => 1,
            ContentType::Link => 2,
            ContentType::Nack => 3,
            ContentType::Other(u) => u,
        }
    }
}

/// The optional metadata of a Data packet. Sub-TLV order on the wire is
/// fixed: content type, freshness period, final block id.
#[derive(Copy, Clone, Default, Debug)]
pub struct MetaInfo {
    pub content_type: Option<ContentType>,
    pub freshness_period: Option<u64>,
    pub final_block_id: Option<NameComponent>,
}

impl MetaInfo {
    fn inner_length(&self) -> usize {
        let mut length = 0;
        if let Some(content_type) = self.content_type {
            length += probe_block_size(
                TLV_META_INFO_CONTENT_TYPE,
                uint_size(content_type.into()),
            );
        }
        if let Some(freshness_period) = self.freshness_period {
            length += probe_block_size(
                TLV_META_INFO_FRESHNESS_PERIOD,
                uint_size(freshness_period),
            );
        }
        if let Some(final_block_id) = &self.final_block_id {
            length += probe_block_size(
                TLV_META_INFO_FINAL_BLOCK_ID,
                final_block_id.encoded_length(),
            );
        }
        length
    }

    /// MetaInfo is optional on the wire; a missing block decodes as the
    /// all-absent default.
    pub fn decode(decoder: &mut Decoder<'_>) -> Result<Self, Error> {
        let typ = decoder.read_type()?;
        if typ != TLV_META_INFO {
            decoder.move_backward((typ as u64).encoded_length())?;
            return Ok(Self::default());
        }
        let length = decoder.read_length()?;
        let end = decoder
            .offset()
            .checked_add(length)
            .ok_or(Error::BufferUnderflow)?;

        let mut metainfo = Self::default();
        while decoder.offset() < end {
            let typ = decoder.read_type()?;
            let sub_length = decoder.read_length()?;
            match typ {
                TLV_META_INFO_CONTENT_TYPE => {
                    metainfo.content_type = Some(decoder.read_uint(sub_length)?.into());
                }
                TLV_META_INFO_FRESHNESS_PERIOD => {
                    metainfo.freshness_period = Some(decoder.read_uint(sub_length)?);
                }
                TLV_META_INFO_FINAL_BLOCK_ID => {
                    metainfo.final_block_id = Some(NameComponent::decode(decoder)?);
                }
                _ => {
                    decoder.value_slice(sub_length)?;
                }
            }
        }
        if decoder.offset() != end {
            return Err(Error::InvalidFormat);
        }
        Ok(metainfo)
    }
}

impl Encode for MetaInfo {
    fn encoded_length(&self) -> usize {
        probe_block_size(TLV_META_INFO, self.inner_length())
    }

    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<(), Error> {
        encoder.append_type(TLV_META_INFO)?;
        encoder.append_length(self.inner_length())?;
        if let Some(content_type) = self.content_type {
            encoder.append_uint_tlv(TLV_META_INFO_CONTENT_TYPE, content_type.into())?;
        }
        if let Some(freshness_period) = self.freshness_period {
            encoder.append_uint_tlv(TLV_META_INFO_FRESHNESS_PERIOD, freshness_period)?;
        }
        if let Some(final_block_id) = &self.final_block_id {
            encoder.append_type(TLV_META_INFO_FINAL_BLOCK_ID)?;
            encoder.append_length(final_block_id.encoded_length())?;
            final_block_id.encode(encoder)?;
        }
        Ok(())
    }
}

/// A Data packet: name, metadata, bounded content and signature.
///
/// Produced either by filling in the fields and calling one of the
/// signing encoders, or by decoding received bytes.
#[derive(Copy, Clone, Debug)]
pub struct Data {
    pub name: Name,
    pub metainfo: MetaInfo,
    content: [u8; CONTENT_BUFFER_SIZE],
    content_size: usize,
    pub signature: Signature,
}

impl Data {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            metainfo: MetaInfo::default(),
            content: [0; CONTENT_BUFFER_SIZE],
            content_size: 0,
            signature: Signature::new(SignatureType::DigestSha256),
        }
    }

    pub fn content(&self) -> &[u8] {
        &self.content[..self.content_size]
    }

    /// Copies `bytes` into the content buffer. Nothing is written when
    /// the content does not fit.
    pub fn set_content(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if bytes.len() > CONTENT_BUFFER_SIZE {
            return Err(Error::Oversize);
        }
        self.content[..bytes.len()].copy_from_slice(bytes);
        self.content_size = bytes.len();
        Ok(())
    }

    /// Sets the signature info for a keyed suite: the key locator is the
    /// producer identity extended with `/KEY/<key-id>`.
    fn prepare_signature_info(
        &mut self,
        sig_type: SignatureType,
        identity: &Name,
        key_id: u32,
    ) -> Result<(), Error> {
        let mut key_locator = *identity;
        key_locator.append_component(NameComponent::generic(b"KEY")?)?;
        key_locator.append_component(NameComponent::generic(&key_id.to_be_bytes())?)?;
        self.signature = Signature::new(sig_type);
        self.signature.key_locator = Some(key_locator);
        Ok(())
    }

    /// The signed portion of the packet: name, metainfo, content and
    /// signature info. The signature covers exactly the bytes this emits.
    fn encode_unsigned_block(&self, encoder: &mut Encoder<'_>) -> Result<(), Error> {
        self.name.encode(encoder)?;
        self.metainfo.encode(encoder)?;
        if self.content_size > 0 {
            encoder.append_type(TLV_CONTENT)?;
            encoder.append_length(self.content_size)?;
            encoder.append_raw(self.content())?;
        }
        self.signature.encode_info(encoder)
    }

    fn unsigned_block_length(&self) -> usize {
        let content_length = if self.content_size > 0 {
            probe_block_size(TLV_CONTENT, self.content_size)
        } else {
            0
        };
        self.name.encoded_length()
            + self.metainfo.encoded_length()
            + content_length
            + self.signature.info_encoded_length()
    }

    /// Emits the packet with a known signature size: outer header first,
    /// then the unsigned block, then the signature computed by `sign`.
    fn encode_presized(
        &mut self,
        encoder: &mut Encoder<'_>,
        sign: impl FnOnce(&[u8], &mut Signature) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let inner_length = self.unsigned_block_length() + self.signature.value_encoded_length();
        encoder.append_type(TLV_DATA)?;
        encoder.append_length(inner_length)?;

        let start = encoder.offset();
        self.encode_unsigned_block(encoder)?;
        let end = encoder.offset();

        sign(encoder.window(start, end), &mut self.signature)?;
        self.signature.encode_value(encoder)
    }

    /// Encodes and signs with the SHA-256 digest suite.
    pub fn encode_digest_sign(&mut self, encoder: &mut Encoder<'_>) -> Result<(), Error> {
        self.signature = Signature::new(SignatureType::DigestSha256);
        self.encode_presized(encoder, |signed, signature| {
            signature.set_value(&sha256(signed))
        })
    }

    /// Encodes and signs with HMAC-SHA256.
    pub fn encode_hmac_sign(
        &mut self,
        encoder: &mut Encoder<'_>,
        identity: &Name,
        key: &HmacKey,
    ) -> Result<(), Error> {
        self.prepare_signature_info(SignatureType::HmacSha256, identity, key.key_id())?;
        self.encode_presized(encoder, |signed, signature| {
            signature.set_value(&key.sign(signed))
        })
    }

    /// Encodes and signs with ECDSA P-256.
    ///
    /// The packet length is only known once the signer returns the DER
    /// signature length, so the unsigned block is built behind a reserved
    /// prefix gap, the outer header is then written flush against it, and
    /// the whole region is shifted to the start of the buffer.
    pub fn encode_ecdsa_sign(
        &mut self,
        encoder: &mut Encoder<'_>,
        identity: &Name,
        key: &EcdsaPrivateKey,
    ) -> Result<(), Error> {
        self.prepare_signature_info(SignatureType::EcdsaSha256, identity, key.key_id())?;

        let gap = TLV_TYPE_FIELD_MAX_SIZE + TLV_LENGTH_FIELD_MAX_SIZE;
        encoder.move_forward(gap)?;

        let start = encoder.offset();
        self.encode_unsigned_block(encoder)?;
        let end = encoder.offset();

        let mut der = [0u8; crate::security::ECDSA_DER_MAX_SIZE];
        let sig_length = key.sign(encoder.window(start, end), &mut der)?;
        self.signature.set_value(&der[..sig_length])?;

        let inner_length = (end - start) + self.signature.value_encoded_length();
        let header_length =
            (TLV_DATA as u64).encoded_length() + (inner_length as u64).encoded_length();

        // Write the outer header so that it abuts the unsigned block,
        // then close the remaining gap with one left shift.
        encoder.set_offset(start - header_length);
        encoder.append_type(TLV_DATA)?;
        encoder.append_length(inner_length)?;
        debug_assert_eq!(encoder.offset(), start);
        encoder.close_gap(start - header_length, end);

        self.signature.encode_value(encoder)
    }

    /// Walks the outer block and returns the packet plus the byte range
    /// the signature covers.
    fn decode_inner(decoder: &mut Decoder<'_>) -> Result<(Self, (usize, usize)), Error> {
        decoder.expect_type(TLV_DATA)?;
        decoder.read_length()?;
        let start = decoder.offset();

        let name = Name::decode(decoder)?;
        let metainfo = MetaInfo::decode(decoder)?;

        let mut content = [0; CONTENT_BUFFER_SIZE];
        let content_size;
        let typ = decoder.read_type()?;
        match typ {
            TLV_CONTENT => {
                let length = decoder.read_length()?;
                if length > CONTENT_BUFFER_SIZE {
                    return Err(Error::Oversize);
                }
                decoder.read_raw(&mut content[..length])?;
                content_size = length;
            }
            TLV_SIGNATURE_INFO => {
                // No content section; unread the type byte.
                decoder.move_backward(1)?;
                content_size = 0;
            }
            _ => return Err(Error::WrongTlvType { found: typ }),
        }

        let mut signature = Signature::decode_info(decoder)?;
        let end = decoder.offset();
        signature.decode_value(decoder)?;

        Ok((
            Self {
                name,
                metainfo,
                content,
                content_size,
                signature,
            },
            (start, end),
        ))
    }

    /// Decodes without verifying the signature.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        Self::decode_inner(&mut Decoder::new(bytes)).map(|(data, _)| data)
    }

    /// Decodes and verifies a digest-signed packet.
    pub fn decode_verify_digest(bytes: &[u8]) -> Result<Self, Error> {
        let (data, (start, end)) = Self::decode_inner(&mut Decoder::new(bytes))?;
        sha256_verify(&bytes[start..end], data.signature.value())?;
        Ok(data)
    }

    /// Decodes and verifies an ECDSA-signed packet against `key`.
    pub fn decode_verify_ecdsa(bytes: &[u8], key: &EcdsaPublicKey) -> Result<Self, Error> {
        let (data, (start, end)) = Self::decode_inner(&mut Decoder::new(bytes))?;
        key.verify(&bytes[start..end], data.signature.value())?;
        Ok(data)
    }

    /// Decodes and verifies an HMAC-signed packet against `key`.
    pub fn decode_verify_hmac(bytes: &[u8], key: &HmacKey) -> Result<Self, Error> {
        let (data, (start, end)) = Self::decode_inner(&mut Decoder::new(bytes))?;
        key.verify(&bytes[start..end], data.signature.value())?;
        Ok(data)
    }

    /// Encrypts `plaintext` and stores the access-control envelope
    /// (key-id name, IV, ciphertext) as the packet content.
    pub fn set_encrypted_content(
        &mut self,
        plaintext: &[u8],
        key_id: &Name,
        iv: &[u8; AES_BLOCK_SIZE],
        key: &AesKey,
    ) -> Result<(), Error> {
        let payload_length = padded_length(plaintext.len());
        let envelope_length = key_id.encoded_length()
            + probe_block_size(TLV_AC_AES_IV, AES_BLOCK_SIZE)
            + probe_block_size(TLV_AC_ENCRYPTED_PAYLOAD, payload_length);
        if probe_block_size(TLV_AC_ENCRYPTED_CONTENT, envelope_length) > CONTENT_BUFFER_SIZE {
            return Err(Error::Oversize);
        }

        let mut encoder = Encoder::new(&mut self.content);
        encoder.append_type(TLV_AC_ENCRYPTED_CONTENT)?;
        encoder.append_length(envelope_length)?;

        key_id.encode(&mut encoder)?;

        encoder.append_type(TLV_AC_AES_IV)?;
        encoder.append_length(AES_BLOCK_SIZE)?;
        encoder.append_raw(iv)?;

        encoder.append_type(TLV_AC_ENCRYPTED_PAYLOAD)?;
        encoder.append_length(payload_length)?;
        let ciphertext_length = key.cbc_encrypt(plaintext, iv, encoder.tail_mut())?;
        debug_assert_eq!(ciphertext_length, payload_length);
        encoder.move_forward(ciphertext_length)?;

        let content_size = encoder.offset();
        self.content_size = content_size;
        Ok(())
    }

    /// Reverses the access-control envelope: decrypts the payload into
    /// `plaintext` and returns the key-id name and the plaintext length.
    pub fn parse_encrypted_content(
        &self,
        plaintext: &mut [u8],
        iv: &mut [u8; AES_BLOCK_SIZE],
        key: &AesKey,
    ) -> Result<(Name, usize), Error> {
        let mut decoder = Decoder::new(self.content());
        decoder.expect_type(TLV_AC_ENCRYPTED_CONTENT)?;
        decoder.read_length()?;

        let key_id = Name::decode(&mut decoder)?;

        decoder.expect_type(TLV_AC_AES_IV)?;
        if decoder.read_length()? != AES_BLOCK_SIZE {
            return Err(Error::InvalidFormat);
        }
        decoder.read_raw(iv)?;

        decoder.expect_type(TLV_AC_ENCRYPTED_PAYLOAD)?;
        let ciphertext_length = decoder.read_length()?;
        let ciphertext = decoder.value_slice(ciphertext_length)?;

        let mut scratch = [0u8; CONTENT_BUFFER_SIZE];
        let scratch = &mut scratch[..ciphertext.len()];
        scratch.copy_from_slice(ciphertext);
        let recovered = key.cbc_decrypt_in_place(scratch, iv)?;

        if plaintext.len() < recovered.len() {
            return Err(Error::Oversize);
        }
        plaintext[..recovered.len()].copy_from_slice(recovered);
        Ok((key_id, recovered.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::SIGNATURE_BUFFER_SIZE;
    use crate::name::NameComponentType;
    use proptest::prelude::*;

    fn encode_digest(data: &mut Data) -> Vec<u8> {
        let mut buffer = [0u8; 1024];
        let mut encoder = Encoder::new(&mut buffer);
        data.encode_digest_sign(&mut encoder).unwrap();
        encoder.encoded().to_vec()
    }

    fn ecdsa_key(fill: u8) -> EcdsaPrivateKey {
        let mut scalar = [0u8; 32];
        scalar[0] = 0x0c;
        scalar[31] = fill;
        EcdsaPrivateKey::from_bytes(&scalar, 42).unwrap()
    }

    /// The range the signature covers: from the end of the outer header
    /// to the start of the signature-value block.
    fn signed_range(packet: &[u8]) -> (usize, usize) {
        let mut decoder = Decoder::new(packet);
        decoder.expect_type(TLV_DATA).unwrap();
        decoder.read_length().unwrap();
        let start = decoder.offset();
        (start, packet.len() - probe_block_size(23, 32))
    }

    #[test]
    fn test_digest_roundtrip() {
        let mut data = Data::new(Name::from_uri("/a").unwrap());
        data.set_content(&[0x01, 0x02, 0x03]).unwrap();
        let packet = encode_digest(&mut data);

        let decoded = Data::decode_verify_digest(&packet).unwrap();
        assert_eq!(decoded.name, data.name);
        assert_eq!(decoded.content(), &[0x01, 0x02, 0x03]);
        assert_eq!(decoded.signature.signature_type(), SignatureType::DigestSha256);
        assert!(decoded.signature.key_locator.is_none());

        // Flip the middle content byte and re-verify the same signature.
        let mut tampered = packet.clone();
        let pos = tampered
            .windows(5)
            .position(|w| w == &[0x15, 0x03, 0x01, 0x02, 0x03])
            .unwrap();
        tampered[pos + 3] = 0x04;
        assert_eq!(
            Data::decode_verify_digest(&tampered).unwrap_err(),
            Error::VerificationFailed
        );
    }

    #[test]
    fn test_absent_content() {
        let mut data = Data::new(Name::from_uri("/nothing/here").unwrap());
        let packet = encode_digest(&mut data);

        let decoded = Data::decode_verify_digest(&packet).unwrap();
        assert_eq!(decoded.content(), &[] as &[u8]);
        assert_eq!(decoded.name, data.name);
    }

    #[test]
    fn test_decode_unexpected_section() {
        let mut data = Data::new(Name::from_uri("/a").unwrap());
        data.set_content(&[0x01, 0x02, 0x03]).unwrap();
        let mut packet = encode_digest(&mut data);

        let pos = packet
            .windows(2)
            .position(|w| w == &[0x15, 0x03])
            .unwrap();
        packet[pos] = 99;
        assert_eq!(
            Data::decode(&packet).unwrap_err(),
            Error::WrongTlvType { found: 99 }
        );
    }

    #[test]
    fn test_decode_content_oversize() {
        let mut buffer = [0u8; 600];
        let mut encoder = Encoder::new(&mut buffer);
        encoder.append_type(TLV_DATA).unwrap();
        encoder.append_length(400).unwrap();
        Name::from_uri("/big").unwrap().encode(&mut encoder).unwrap();
        MetaInfo::default().encode(&mut encoder).unwrap();
        encoder.append_type(TLV_CONTENT).unwrap();
        encoder.append_length(CONTENT_BUFFER_SIZE + 1).unwrap();
        encoder.append_raw(&[0u8; CONTENT_BUFFER_SIZE + 1]).unwrap();
        let packet = encoder.encoded().to_vec();

        assert_eq!(Data::decode(&packet).unwrap_err(), Error::Oversize);
    }

    #[test]
    fn test_oversize_content() {
        let mut data = Data::new(Name::from_uri("/a").unwrap());
        let too_big = [0u8; CONTENT_BUFFER_SIZE + 1];
        assert_eq!(data.set_content(&too_big), Err(Error::Oversize));
        assert_eq!(data.content(), &[] as &[u8]);
    }

    #[test]
    fn test_metainfo_roundtrip() {
        let mut data = Data::new(Name::from_uri("/meta").unwrap());
        data.metainfo.content_type = Some(ContentType::Key);
        data.metainfo.freshness_period = Some(4000);
        data.metainfo.final_block_id =
            Some(NameComponent::new(NameComponentType::SequenceNum, &[9]).unwrap());
        data.set_content(b"x").unwrap();
        let packet = encode_digest(&mut data);

        let decoded = Data::decode_verify_digest(&packet).unwrap();
        assert_eq!(decoded.metainfo.content_type, Some(ContentType::Key));
        assert_eq!(decoded.metainfo.freshness_period, Some(4000));
        let final_block_id = decoded.metainfo.final_block_id.unwrap();
        assert_eq!(final_block_id.component_type(), NameComponentType::SequenceNum);
        assert_eq!(final_block_id.value(), &[9]);
    }

    #[test]
    fn test_hmac_roundtrip() {
        let key = HmacKey::new(b"super-secret-key", 7).unwrap();
        let identity = Name::from_uri("/producer").unwrap();

        let mut data = Data::new(Name::from_uri("/sensor/temp").unwrap());
        data.set_content(b"21.5C").unwrap();
        let mut buffer = [0u8; 1024];
        let packet = {
            let mut encoder = Encoder::new(&mut buffer);
            data.encode_hmac_sign(&mut encoder, &identity, &key).unwrap();
            encoder.encoded().to_vec()
        };

        let decoded = Data::decode_verify_hmac(&packet, &key).unwrap();
        assert_eq!(decoded.content(), b"21.5C");
        assert_eq!(decoded.signature.signature_type(), SignatureType::HmacSha256);

        let mut expected_locator = identity;
        expected_locator
            .append_component(NameComponent::generic(b"KEY").unwrap())
            .unwrap();
        expected_locator
            .append_component(NameComponent::generic(&7u32.to_be_bytes()).unwrap())
            .unwrap();
        assert_eq!(decoded.signature.key_locator, Some(expected_locator));

        let wrong_key = HmacKey::new(b"other-secret-key", 8).unwrap();
        assert_eq!(
            Data::decode_verify_hmac(&packet, &wrong_key).unwrap_err(),
            Error::VerificationFailed
        );
    }

    #[test]
    fn test_ecdsa_roundtrip() {
        let key = ecdsa_key(1);
        let identity = Name::from_uri("/producer").unwrap();

        let mut data = Data::new(Name::from_uri("/x/y").unwrap());
        data.set_content(&[0xde, 0xad, 0xbe, 0xef]).unwrap();
        let mut buffer = [0u8; 1024];
        let packet = {
            let mut encoder = Encoder::new(&mut buffer);
            data.encode_ecdsa_sign(&mut encoder, &identity, &key).unwrap();
            encoder.encoded().to_vec()
        };

        // The outer length must cover exactly the bytes between its end
        // and the packet tail.
        let mut decoder = Decoder::new(&packet);
        decoder.expect_type(TLV_DATA).unwrap();
        let inner_length = decoder.read_length().unwrap();
        assert_eq!(inner_length, packet.len() - decoder.offset());

        let decoded = Data::decode_verify_ecdsa(&packet, &key.public_key()).unwrap();
        assert_eq!(decoded.content(), &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(decoded.signature.signature_type(), SignatureType::EcdsaSha256);

        let wrong_key = ecdsa_key(2).public_key();
        assert_eq!(
            Data::decode_verify_ecdsa(&packet, &wrong_key).unwrap_err(),
            Error::VerificationFailed
        );
    }

    #[test]
    fn test_encrypted_content_roundtrip() {
        let key = AesKey::new(&[0x42; 16], 5);
        let key_id = Name::from_uri("/keys/shared/5").unwrap();
        let iv = [0x7e; AES_BLOCK_SIZE];

        let mut data = Data::new(Name::from_uri("/private").unwrap());
        data.set_encrypted_content(b"confidential reading", &key_id, &iv, &key)
            .unwrap();

        let mut plaintext = [0u8; CONTENT_BUFFER_SIZE];
        let mut recovered_iv = [0u8; AES_BLOCK_SIZE];
        let (recovered_key_id, length) = data
            .parse_encrypted_content(&mut plaintext, &mut recovered_iv, &key)
            .unwrap();
        assert_eq!(&plaintext[..length], b"confidential reading");
        assert_eq!(recovered_key_id, key_id);
        assert_eq!(recovered_iv, iv);
    }

    #[test]
    fn test_set_encrypted_content_ignores_stale_size() {
        let key = AesKey::new(&[0x42; 16], 5);
        let key_id = Name::from_uri("/k").unwrap();
        let iv = [0u8; AES_BLOCK_SIZE];

        let mut data = Data::new(Name::from_uri("/private").unwrap());
        // Leave an unrelated content size behind before encrypting.
        data.set_content(&[0xaa; 37]).unwrap();

        let plaintext = [0x55u8; 20];
        data.set_encrypted_content(&plaintext, &key_id, &iv, &key).unwrap();

        let payload_length = padded_length(plaintext.len());
        let envelope_length = key_id.encoded_length()
            + probe_block_size(TLV_AC_AES_IV, AES_BLOCK_SIZE)
            + probe_block_size(TLV_AC_ENCRYPTED_PAYLOAD, payload_length);
        assert_eq!(
            data.content().len(),
            probe_block_size(TLV_AC_ENCRYPTED_CONTENT, envelope_length)
        );
    }

    #[test]
    fn test_encrypted_content_oversize() {
        let key = AesKey::new(&[0x42; 16], 5);
        let key_id = Name::from_uri("/k").unwrap();
        let iv = [0u8; AES_BLOCK_SIZE];

        let mut data = Data::new(Name::from_uri("/private").unwrap());
        let plaintext = [0u8; CONTENT_BUFFER_SIZE];
        assert_eq!(
            data.set_encrypted_content(&plaintext, &key_id, &iv, &key),
            Err(Error::Oversize)
        );
    }

    #[test]
    fn test_signature_value_oversize() {
        let mut data = Data::new(Name::from_uri("/a").unwrap());
        let mut packet = encode_digest(&mut data);

        // Claim an absurd signature-value length.
        let value_offset = packet.len() - probe_block_size(23, 32) + 1;
        packet[value_offset] = (SIGNATURE_BUFFER_SIZE + 1) as u8;
        assert_eq!(Data::decode(&packet).unwrap_err(), Error::Oversize);
    }

    proptest! {
        #[test]
        fn prop_digest_bit_flip_detected(byte_offset_seed in any::<usize>(), bit in 0usize..8) {
            let mut data = Data::new(Name::from_uri("/flip/me").unwrap());
            data.set_content(b"some bytes to protect").unwrap();
            let packet = encode_digest(&mut data);

            let (start, _) = signed_range(&packet);
            // Any flipped bit from the signed region through the
            // signature value must make verification fail.
            let byte_offset = start + byte_offset_seed % (packet.len() - start);
            let mut tampered = packet.clone();
            tampered[byte_offset] ^= 1 << bit;
            prop_assert!(Data::decode_verify_digest(&tampered).is_err());
        }

        #[test]
        fn prop_data_roundtrip(
            content in prop::collection::vec(any::<u8>(), 0..CONTENT_BUFFER_SIZE),
            freshness in prop::option::of(any::<u64>()),
        ) {
            let mut data = Data::new(Name::from_uri("/prop/data").unwrap());
            data.metainfo.freshness_period = freshness;
            data.set_content(&content).unwrap();
            let packet = encode_digest(&mut data);

            let decoded = Data::decode_verify_digest(&packet).unwrap();
            prop_assert_eq!(decoded.name, data.name);
            prop_assert_eq!(decoded.content(), content.as_slice());
            prop_assert_eq!(decoded.metainfo.freshness_period, freshness);
        }
    }
}
