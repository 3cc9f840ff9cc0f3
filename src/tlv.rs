use crate::error::Error;

/// Widest possible TLV type field (varint).
pub const TLV_TYPE_FIELD_MAX_SIZE: usize = 9;
/// Widest possible TLV length field (varint).
pub const TLV_LENGTH_FIELD_MAX_SIZE: usize = 9;

/// Something that can be written as TLV wire bytes.
///
/// `encoded_length` must be pure and match `encode` byte-for-byte: it is
/// called once to size an outer TLV length field and again when the bytes
/// are actually emitted.
pub trait Encode {
    fn encoded_length(&self) -> usize;
    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<(), Error>;
}

/// NDN TLV-VAR: 1 byte below 253, otherwise a lead byte selecting a
/// 2-, 4- or 8-byte big-endian tail.
impl Encode for u64 {
    fn encoded_length(&self) -> usize {
        if *self <= 252 {
            1
        } else if *self <= 65535 {
            3
        } else if *self <= 4294967295 {
            5
        } else {
            9
        }
    }

    fn encode(&self, encoder: &mut Encoder<'_>) -> Result<(), Error> {
        if *self <= 252 {
            encoder.append_raw(&[*self as u8])
        } else if *self <= 65535 {
            encoder.append_raw(&[253])?;
            encoder.append_raw(&(*self as u16).to_be_bytes())
        } else if *self <= 4294967295 {
            encoder.append_raw(&[254])?;
            encoder.append_raw(&(*self as u32).to_be_bytes())
        } else {
            encoder.append_raw(&[255])?;
            encoder.append_raw(&self.to_be_bytes())
        }
    }
}

/// The shortest big-endian NonNegativeInteger representation: 1, 2, 4 or
/// 8 bytes depending on magnitude.
pub fn uint_size(v: u64) -> usize {
    if v <= 0xFF {
        1
    } else if v <= 0xFFFF {
        2
    } else if v <= 0xFFFF_FFFF {
        4
    } else {
        8
    }
}

/// Full wire size of a TLV block: type + length fields plus `inner_len`
/// value bytes.
pub fn probe_block_size(typ: u32, inner_len: usize) -> usize {
    (typ as u64).encoded_length() + (inner_len as u64).encoded_length() + inner_len
}

/// An appending cursor over a caller-provided output buffer.
///
/// The offset never exceeds the buffer capacity; on error it is left at
/// the failure boundary and the partial packet must be discarded.
pub struct Encoder<'a> {
    output: &'a mut [u8],
    offset: usize,
}

impl<'a> Encoder<'a> {
    pub fn new(output: &'a mut [u8]) -> Self {
        Self { output, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn capacity(&self) -> usize {
        self.output.len()
    }

    /// The bytes emitted so far.
    pub fn encoded(&self) -> &[u8] {
        &self.output[..self.offset]
    }

    pub fn append_raw(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let end = self.offset.checked_add(bytes.len()).ok_or(Error::Oversize)?;
        if end > self.output.len() {
            return Err(Error::Oversize);
        }
        self.output[self.offset..end].copy_from_slice(bytes);
        self.offset = end;
        Ok(())
    }

    pub fn append_var(&mut self, v: u64) -> Result<(), Error> {
        v.encode(self)
    }

    pub fn append_type(&mut self, typ: u32) -> Result<(), Error> {
        self.append_var(typ as u64)
    }

    pub fn append_length(&mut self, length: usize) -> Result<(), Error> {
        self.append_var(length as u64)
    }

    /// Appends a whole NonNegativeInteger TLV in its shortest form.
    pub fn append_uint_tlv(&mut self, typ: u32, v: u64) -> Result<(), Error> {
        self.append_type(typ)?;
        let size = uint_size(v);
        self.append_length(size)?;
        self.append_raw(&v.to_be_bytes()[8 - size..])
    }

    /// Skips `n` bytes without writing them.
    pub fn move_forward(&mut self, n: usize) -> Result<(), Error> {
        let end = self.offset.checked_add(n).ok_or(Error::Oversize)?;
        if end > self.output.len() {
            return Err(Error::Oversize);
        }
        self.offset = end;
        Ok(())
    }

    /// Already-written bytes, used as signing input.
    pub(crate) fn window(&self, start: usize, end: usize) -> &[u8] {
        &self.output[start..end]
    }

    /// The unwritten remainder of the buffer, for primitives that produce
    /// their output in place.
    pub(crate) fn tail_mut(&mut self) -> &mut [u8] {
        &mut self.output[self.offset..]
    }

    /// Rewinds into a previously reserved region.
    pub(crate) fn set_offset(&mut self, offset: usize) {
        debug_assert!(offset <= self.output.len());
        self.offset = offset;
    }

    /// Shifts `[start, end)` to the beginning of the buffer, closing the
    /// reserved prefix gap, and leaves the cursor at the shifted end.
    pub(crate) fn close_gap(&mut self, start: usize, end: usize) {
        self.output.copy_within(start..end, 0);
        self.offset = end - start;
    }
}

/// A reading cursor over a borrowed input buffer.
pub struct Decoder<'a> {
    input: &'a [u8],
    offset: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.input.len() - self.offset
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], Error> {
        let end = self.offset.checked_add(n).ok_or(Error::BufferUnderflow)?;
        if end > self.input.len() {
            return Err(Error::BufferUnderflow);
        }
        let bytes = &self.input[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    pub fn read_var(&mut self) -> Result<u64, Error> {
        let first = self.take(1)?[0];
        match first {
            0..=252 => Ok(first as u64),
            253 => {
                let next: [u8; 2] = self.take(2)?.try_into().map_err(|_| Error::BufferUnderflow)?;
                let val = u16::from_be_bytes(next);
                if val > 252 {
                    Ok(val as u64)
                } else {
                    Err(Error::InvalidFormat)
                }
            }
            254 => {
                let next: [u8; 4] = self.take(4)?.try_into().map_err(|_| Error::BufferUnderflow)?;
                let val = u32::from_be_bytes(next);
                if val > 65535 {
                    Ok(val as u64)
                } else {
                    Err(Error::InvalidFormat)
                }
            }
            255 => {
                let next: [u8; 8] = self.take(8)?.try_into().map_err(|_| Error::BufferUnderflow)?;
                let val = u64::from_be_bytes(next);
                if val > 4294967295 {
                    Ok(val)
                } else {
                    Err(Error::InvalidFormat)
                }
            }
        }
    }

    pub fn read_type(&mut self) -> Result<u32, Error> {
        self.read_var()?.try_into().map_err(|_| Error::InvalidFormat)
    }

    /// Reads a type field and requires it to be `typ`.
    pub fn expect_type(&mut self, typ: u32) -> Result<(), Error> {
        let found = self.read_type()?;
        if found != typ {
            return Err(Error::WrongTlvType { found });
        }
        Ok(())
    }

    pub fn read_length(&mut self) -> Result<usize, Error> {
        self.read_var()?.try_into().map_err(|_| Error::InvalidFormat)
    }

    pub fn read_raw(&mut self, dst: &mut [u8]) -> Result<(), Error> {
        let bytes = self.take(dst.len())?;
        dst.copy_from_slice(bytes);
        Ok(())
    }

    /// Borrows the next `n` value bytes without copying.
    pub fn value_slice(&mut self, n: usize) -> Result<&'a [u8], Error> {
        self.take(n)
    }

    /// Unreads `n` bytes. Used to back out of a type probe when an
    /// optional section turns out to be absent.
    pub fn move_backward(&mut self, n: usize) -> Result<(), Error> {
        self.offset = self.offset.checked_sub(n).ok_or(Error::BufferUnderflow)?;
        Ok(())
    }

    /// Reads a NonNegativeInteger value of `size` bytes.
    pub fn read_uint(&mut self, size: usize) -> Result<u64, Error> {
        let bytes = self.take(size)?;
        match size {
            1 => Ok(bytes[0] as u64),
            2 => Ok(u16::from_be_bytes(bytes.try_into().map_err(|_| Error::InvalidFormat)?) as u64),
            4 => Ok(u32::from_be_bytes(bytes.try_into().map_err(|_| Error::InvalidFormat)?) as u64),
            8 => Ok(u64::from_be_bytes(bytes.try_into().map_err(|_| Error::InvalidFormat)?)),
            _ => Err(Error::InvalidFormat),
        }
    }

    /// Reads a whole NonNegativeInteger TLV of the required type.
    pub fn read_uint_tlv(&mut self, typ: u32) -> Result<u64, Error> {
        self.expect_type(typ)?;
        let length = self.read_length()?;
        self.read_uint(length)
    }
}
