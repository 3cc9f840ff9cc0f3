use core::cmp::Ordering;
use core::fmt;
use core::num::NonZeroU16;

use crate::error::Error;
use crate::limits::{NAME_COMPONENTS_MAX, NAME_COMPONENT_BUFFER_SIZE};
use crate::tlv::{probe_block_size, uint_size, Decoder, Encode, Encoder};

pub const TLV_NAME: u32 = 7;

const NAME_COMPONENT_TYPE_GENERIC: u16 = 8;
const NAME_COMPONENT_TYPE_IMPLICIT_SHA256: u16 = 1;
const NAME_COMPONENT_TYPE_PARAMETER_SHA256: u16 = 2;
const NAME_COMPONENT_TYPE_TIMESTAMP: u16 = 56;
const NAME_COMPONENT_TYPE_SEQUENCE_NUM: u16 = 58;

const GENERIC: NonZeroU16 = match NonZeroU16::new(NAME_COMPONENT_TYPE_GENERIC) {
    Some(typ) => typ,
    None => unreachable!(),
};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum NameComponentType {
    Generic,
    ImplicitSha256Digest,
    ParameterSha256Digest,
    Timestamp,
    SequenceNum,
    Other(NonZeroU16),
}

impl From<NonZeroU16> for NameComponentType {
    fn from(value: NonZeroU16) -> Self {
        match value.get() {
            NAME_COMPONENT_TYPE_GENERIC => NameComponentType::Generic,
            NAME_COMPONENT_TYPE_IMPLICIT_SHA256 => NameComponentType::ImplicitSha256Digest,
            NAME_COMPONENT_TYPE_PARAMETER_SHA256 => NameComponentType::ParameterSha256Digest,
            NAME_COMPONENT_TYPE_TIMESTAMP => NameComponentType::Timestamp,
            NAME_COMPONENT_TYPE_SEQUENCE_NUM => NameComponentType::SequenceNum,
            _ => NameComponentType::Other(value),
        }
    }
}

impl From<NameComponentType> for NonZeroU16 {
    fn from(value: NameComponentType) -> Self {
        let raw = match value {
            NameComponentType::Generic => NAME_COMPONENT_TYPE_GENERIC,
            NameComponentType::ImplicitSha256Digest => NAME_COMPONENT_TYPE_IMPLICIT_SHA256,
            NameComponentType::ParameterSha256Digest => NAME_COMPONENT_TYPE_PARAMETER_SHA256,
            NameComponentType::Timestamp => NAME_COMPONENT_TYPE_TIMESTAMP,
            NameComponentType::SequenceNum => NAME_COMPONENT_TYPE_SEQUENCE_NUM,
            NameComponentType::Other(typ) => return typ,
        };
        match NonZeroU16::new(raw) {
            Some(typ) => typ,
            None => unreachable!(),
        }
    }
}

/// A single typed name component with an embedded, bounded payload.
#[derive(Copy, Clone)]
pub struct NameComponent {
    typ: NonZeroU16,
    size: usize,
    value: [u8; NAME_COMPONENT_BUFFER_SIZE],
}

impl NameComponent {
    const EMPTY: NameComponent = NameComponent {
        typ: GENERIC,
        size: 0,
        value: [0; NAME_COMPONENT_BUFFER_SIZE],
    };

    pub fn new(typ: NameComponentType, bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() > NAME_COMPONENT_BUFFER_SIZE {
            return Err(Error::Oversize);
        }
        let mut value = [0; NAME_COMPONENT_BUFFER_SIZE];
        value[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            typ: typ.into(),
            size: bytes.len(),
            value,
        })
    }

    pub fn generic(bytes: &[u8]) -> Result<Self, Error> {
        Self::new(NameComponentType::Generic, bytes)
    }

    pub fn timestamp(value: u64) -> Self {
        Self::uint_component(NameComponentType::Timestamp, value)
    }

    pub fn sequence_num(value: u64) -> Self {
        Self::uint_component(NameComponentType::SequenceNum, value)
    }

    fn uint_component(typ: NameComponentType, value: u64) -> Self {
        let size = uint_size(value);
        match Self::new(typ, &value.to_be_bytes()[8 - size..]) {
            Ok(component) => component,
            Err(_) => unreachable!(),
        }
    }

    pub fn component_type(&self) -> NameComponentType {
        self.typ.into()
    }

    pub fn value(&self) -> &[u8] {
        &self.value[..self.size]
    }

    pub(crate) fn decode(decoder: &mut Decoder<'_>) -> Result<Self, Error> {
        let raw: u16 = decoder
            .read_type()?
            .try_into()
            .map_err(|_| Error::InvalidFormat)?;
        let typ = NonZeroU16::new(raw).ok_or(Error::InvalidFormat)?;
        let length = decoder.read_length()?;
        if length > NAME_COMPONENT_BUFFER_SIZE {
            return Err(Error::Oversize);
        }
        let mut value = [0; NAME_COMPONENT_BUFFER_SIZE];
        decoder.read_raw(&mut value[..length])?;
        Ok(Self {
            typ,
            size: length,
            value,
        })
    }
}

impl Encode for NameComponent {
    fn encoded_length(&self) -> usize {
        probe_block_size(self.typ.get() as u32, self.size)
    }

    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<(), Error> {
        encoder.append_type(self.typ.get() as u32)?;
        encoder.append_length(self.size)?;
        encoder.append_raw(self.value())
    }
}

impl PartialEq for NameComponent {
    fn eq(&self, other: &Self) -> bool {
        self.typ == other.typ && self.value() == other.value()
    }
}

impl Eq for NameComponent {}

/// Type tag first, then the payload bytes lexicographically.
impl Ord for NameComponent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.typ
            .cmp(&other.typ)
            .then_with(|| self.value().cmp(other.value()))
    }
}

impl PartialOrd for NameComponent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for NameComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.typ.get() != NAME_COMPONENT_TYPE_GENERIC {
            write!(f, "{}=", self.typ.get())?;
        }
        for &byte in self.value() {
            if byte.is_ascii_graphic() {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "%{:02x}", byte)?;
            }
        }
        Ok(())
    }
}

/// An ordered, bounded sequence of name components.
#[derive(Copy, Clone)]
pub struct Name {
    components: [NameComponent; NAME_COMPONENTS_MAX],
    size: usize,
}

impl Name {
    pub fn new() -> Self {
        Self {
            components: [NameComponent::EMPTY; NAME_COMPONENTS_MAX],
            size: 0,
        }
    }

    /// Parses a URI-style name. The string must begin with `/`; every
    /// `/`-delimited segment becomes a generic component. Empty segments
    /// (e.g. a trailing slash) are skipped.
    pub fn from_uri(uri: &str) -> Result<Self, Error> {
        let rest = uri.strip_prefix('/').ok_or(Error::InvalidFormat)?;
        let mut name = Self::new();
        for segment in rest.split('/') {
            if segment.is_empty() {
                continue;
            }
            name.append_component(NameComponent::generic(segment.as_bytes())?)?;
        }
        Ok(name)
    }

    /// Decodes a name from a standalone block.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Self::decode(&mut Decoder::new(bytes))
    }

    pub fn append_component(&mut self, component: NameComponent) -> Result<(), Error> {
        if self.size >= NAME_COMPONENTS_MAX {
            return Err(Error::Oversize);
        }
        self.components[self.size] = component;
        self.size += 1;
        Ok(())
    }

    pub fn components(&self) -> &[NameComponent] {
        &self.components[..self.size]
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// True iff every component of `self` matches the corresponding
    /// component of `other`. Every name is a prefix of itself.
    pub fn is_prefix_of(&self, other: &Name) -> bool {
        if self.size > other.size {
            return false;
        }
        self.components() == &other.components()[..self.size]
    }

    pub fn decode(decoder: &mut Decoder<'_>) -> Result<Self, Error> {
        decoder.expect_type(TLV_NAME)?;
        let length = decoder.read_length()?;
        let end = decoder.offset().checked_add(length).ok_or(Error::BufferUnderflow)?;
        let mut name = Self::new();
        while decoder.offset() < end {
            name.append_component(NameComponent::decode(decoder)?)?;
        }
        if decoder.offset() != end {
            // A nested component ran past the declared name length.
            return Err(Error::InvalidFormat);
        }
        Ok(name)
    }

    fn component_length(&self) -> usize {
        self.components().iter().map(|c| c.encoded_length()).sum()
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::new()
    }
}

impl Encode for Name {
    fn encoded_length(&self) -> usize {
        probe_block_size(TLV_NAME, self.component_length())
    }

    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<(), Error> {
        encoder.append_type(TLV_NAME)?;
        encoder.append_length(self.component_length())?;
        for component in self.components() {
            component.encode(encoder)?;
        }
        Ok(())
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.components() == other.components()
    }
}

impl Eq for Name {}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "/");
        }
        for component in self.components() {
            write!(f, "/{:?}", component)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tlv::Encoder;
    use proptest::prelude::*;

    fn encode_to_vec(name: &Name) -> Vec<u8> {
        let mut buffer = [0u8; 512];
        let mut encoder = Encoder::new(&mut buffer);
        name.encode(&mut encoder).unwrap();
        assert_eq!(encoder.offset(), name.encoded_length());
        encoder.encoded().to_vec()
    }

    #[test]
    fn test_from_uri() {
        let name = Name::from_uri("/hello/world").unwrap();
        assert_eq!(name.len(), 2);
        assert_eq!(name.components()[0].value(), b"hello");
        assert_eq!(name.components()[1].value(), b"world");
        assert_eq!(
            encode_to_vec(&name),
            hex::decode("070e080568656c6c6f0805776f726c64").unwrap()
        );
    }

    #[test]
    fn test_from_uri_no_leading_slash() {
        assert_eq!(Name::from_uri("hello/world"), Err(Error::InvalidFormat));
    }

    #[test]
    fn test_from_uri_root() {
        let name = Name::from_uri("/").unwrap();
        assert!(name.is_empty());
        let name = Name::from_uri("/a/").unwrap();
        assert_eq!(name.len(), 1);
    }

    #[test]
    fn test_from_uri_too_many_components() {
        assert_eq!(
            Name::from_uri("/a/b/c/d/e/f/g/h/i/j/k"),
            Err(Error::Oversize)
        );
    }

    #[test]
    fn test_component_oversize() {
        let long = [b'x'; NAME_COMPONENT_BUFFER_SIZE + 1];
        assert_eq!(NameComponent::generic(&long), Err(Error::Oversize));
    }

    #[test]
    fn test_decode_too_many_components() {
        let mut name = Name::new();
        for _ in 0..NAME_COMPONENTS_MAX {
            name.append_component(NameComponent::generic(b"c").unwrap()).unwrap();
        }
        let mut encoded = encode_to_vec(&name);
        // Splice in an eleventh component and fix up the outer length.
        encoded.extend_from_slice(&[8, 1, b'c']);
        encoded[1] += 3;
        assert_eq!(Name::from_bytes(&encoded), Err(Error::Oversize));
    }

    #[test]
    fn test_compare() {
        let a = Name::from_uri("/a/b").unwrap();
        let b = Name::from_uri("/a/b").unwrap();
        let c = Name::from_uri("/a/c").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.components()[1] < c.components()[1]);

        // The type tag is the primary comparison key.
        let generic = NameComponent::generic(&[1]).unwrap();
        let digest = NameComponent::new(NameComponentType::ImplicitSha256Digest, &[255]).unwrap();
        assert!(digest < generic);
    }

    #[test]
    fn test_prefix() {
        let root = Name::from_uri("/").unwrap();
        let a = Name::from_uri("/a").unwrap();
        let ab = Name::from_uri("/a/b").unwrap();
        let abc = Name::from_uri("/a/b/c").unwrap();
        let xb = Name::from_uri("/x/b").unwrap();

        assert!(a.is_prefix_of(&a));
        assert!(root.is_prefix_of(&a));
        assert!(a.is_prefix_of(&ab));
        assert!(ab.is_prefix_of(&abc));
        assert!(a.is_prefix_of(&abc));
        assert!(!ab.is_prefix_of(&a));
        assert!(!xb.is_prefix_of(&ab));
    }

    #[test]
    fn test_uint_components() {
        let ts = NameComponent::timestamp(1_000_000);
        assert_eq!(ts.component_type(), NameComponentType::Timestamp);
        assert_eq!(ts.value(), &[0x00, 0x0f, 0x42, 0x40]);
        let seq = NameComponent::sequence_num(7);
        assert_eq!(seq.value(), &[7]);
    }

    proptest! {
        #[test]
        fn prop_name_roundtrip(
            components in prop::collection::vec(
                prop::collection::vec(any::<u8>(), 0..NAME_COMPONENT_BUFFER_SIZE),
                0..=NAME_COMPONENTS_MAX,
            )
        ) {
            let mut name = Name::new();
            for bytes in &components {
                name.append_component(NameComponent::generic(bytes).unwrap()).unwrap();
            }
            let encoded = encode_to_vec(&name);
            let decoded = Name::from_bytes(&encoded).unwrap();
            prop_assert_eq!(decoded, name);
        }

        #[test]
        fn prop_prefix_transitive(
            a in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..4), 0..4),
            suffix in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..4), 0..3),
            suffix2 in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..4), 0..3),
        ) {
            let mut name_a = Name::new();
            for bytes in &a {
                name_a.append_component(NameComponent::generic(bytes).unwrap()).unwrap();
            }
            let mut name_b = name_a;
            for bytes in &suffix {
                name_b.append_component(NameComponent::generic(bytes).unwrap()).unwrap();
            }
            let mut name_c = name_b;
            for bytes in &suffix2 {
                name_c.append_component(NameComponent::generic(bytes).unwrap()).unwrap();
            }
            prop_assert!(name_a.is_prefix_of(&name_a));
            prop_assert!(name_a.is_prefix_of(&name_b));
            prop_assert!(name_b.is_prefix_of(&name_c));
            prop_assert!(name_a.is_prefix_of(&name_c));
        }
    }
}
