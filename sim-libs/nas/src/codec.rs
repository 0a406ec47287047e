//! codec - bounds-checked cursor types shared by the NAS and NGAP layers

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("buffer too short: needed {needed} more bytes, {remaining} left")]
    BufferTooShort { needed: usize, remaining: usize },
    #[error("unexpected {0} trailing bytes after message")]
    TrailingBytes(usize),
    #[error("unknown message type {0}")]
    UnknownMessageType(u8),
    #[error("unknown envelope type {0}")]
    UnknownEnvelopeType(u8),
    #[error("invalid boolean byte {0}")]
    InvalidBool(u8),
    #[error("zero length frame")]
    ZeroLengthFrame,
    #[error("value of {0} bytes does not fit a u16 length prefix")]
    ValueTooLong(usize),
    #[error("string field is not valid UTF-8")]
    BadUtf8,
}

pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8], CodecError> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(CodecError::BufferTooShort { needed, remaining });
        }
        let slice = &self.buf[self.pos..self.pos + needed];
        self.pos += needed;
        Ok(slice)
    }

    pub fn u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_be_bytes(self.take(2)?.try_into().expect("Can't fail")))
    }

    pub fn u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_be_bytes(self.take(4)?.try_into().expect("Can't fail")))
    }

    pub fn u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_be_bytes(self.take(8)?.try_into().expect("Can't fail")))
    }

    pub fn bool(&mut self) -> Result<bool, CodecError> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(CodecError::InvalidBool(b)),
        }
    }

    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        Ok(self.take(N)?.try_into().expect("Can't fail"))
    }

    /// u16-length-prefixed byte string.
    pub fn bytes(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.u16()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    /// u16-length-prefixed UTF-8 string.
    pub fn string(&mut self) -> Result<String, CodecError> {
        String::from_utf8(self.bytes()?).map_err(|_| CodecError::BadUtf8)
    }

    /// Everything left in the buffer, unprefixed.
    pub fn rest(&mut self) -> Vec<u8> {
        let slice = &self.buf[self.pos..];
        self.pos = self.buf.len();
        slice.to_vec()
    }

    /// Decoding must consume the buffer exactly.
    pub fn finish(self) -> Result<(), CodecError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }
}

#[derive(Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Writer::default()
    }

    pub fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn bool(&mut self, v: bool) {
        self.buf.push(v as u8);
    }

    pub fn raw(&mut self, v: &[u8]) {
        self.buf.extend_from_slice(v);
    }

    /// u16-length-prefixed byte string.
    pub fn bytes(&mut self, v: &[u8]) -> Result<(), CodecError> {
        let len = u16::try_from(v.len()).map_err(|_| CodecError::ValueTooLong(v.len()))?;
        self.u16(len);
        self.raw(v);
        Ok(())
    }

    /// u16-length-prefixed UTF-8 string.
    pub fn string(&mut self, v: &str) -> Result<(), CodecError> {
        self.bytes(v.as_bytes())
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}
