//! Byte streams the serializer writes to and the deserializer reads from.
//!
//! Two encodings share the [`Writer`]/[`Reader`] pair:
//!
//! - **Binary**: integers fixed-width big-endian, `u8` as one byte, strings
//!   as a `u64` length followed by the raw bytes.
//! - **Text**: every number in decimal followed by one space, strings as
//!   the decimal length, a space, the raw bytes and a space. Meant for
//!   diffing module files by eye.
//!
//! Floats travel as the `u64` of their IEEE-754 bits in both encodings.

use crate::error::DecodeError;

pub trait Writer {
    fn write_u8(&mut self, v: u8);

    fn write_u32(&mut self, v: u32);

    fn write_u64(&mut self, v: u64);

    fn write_i64(&mut self, v: i64);

    fn write_bytes(&mut self, bytes: &[u8]);

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_str(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    /// Length prefix of a list.
    fn write_len(&mut self, n: usize) {
        self.write_u64(n as u64);
    }

    fn into_bytes(self) -> Vec<u8>;
}

pub trait Reader<'a> {
    fn read_u8(&mut self, what: &'static str) -> Result<u8, DecodeError>;

    fn read_u32(&mut self, what: &'static str) -> Result<u32, DecodeError>;

    fn read_u64(&mut self, what: &'static str) -> Result<u64, DecodeError>;

    fn read_i64(&mut self, what: &'static str) -> Result<i64, DecodeError>;

    fn read_bytes(&mut self, what: &'static str) -> Result<&'a [u8], DecodeError>;

    /// Bytes consumed so far.
    fn position(&self) -> usize;

    /// Bytes not yet consumed.
    fn remaining(&self) -> usize;

    fn read_bool(&mut self, what: &'static str) -> Result<bool, DecodeError> {
        Ok(self.read_u8(what)? != 0)
    }

    fn read_f64(&mut self, what: &'static str) -> Result<f64, DecodeError> {
        self.read_u64(what).map(f64::from_bits)
    }

    fn read_str(&mut self, what: &'static str) -> Result<&'a str, DecodeError> {
        let pos = self.position();
        let bytes = self.read_bytes(what)?;
        std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { pos })
    }

    /// Length prefix of a list, checked against the bytes left so a corrupt
    /// count cannot trigger a huge allocation.
    fn read_len(&mut self, what: &'static str) -> Result<usize, DecodeError> {
        let count = self.read_u64(what)?;
        match usize::try_from(count) {
            Ok(n) if n <= self.remaining() => Ok(n),
            _ => Err(DecodeError::LengthOverflow { what, count }),
        }
    }
}

// Binary

#[derive(Debug, Default)]
pub struct BinaryWriter {
    out: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Writer for BinaryWriter {
    fn write_u8(&mut self, v: u8) {
        self.out.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.out.extend_from_slice(&v.to_be_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.out.extend_from_slice(&v.to_be_bytes());
    }

    fn write_i64(&mut self, v: i64) {
        self.out.extend_from_slice(&v.to_be_bytes());
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.write_len(bytes.len());
        self.out.extend_from_slice(bytes);
    }

    fn into_bytes(self) -> Vec<u8> {
        self.out
    }
}

#[derive(Debug)]
pub struct BinaryReader<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        BinaryReader { input, pos: 0 }
    }

    fn take<const N: usize>(&mut self, what: &'static str) -> Result<[u8; N], DecodeError> {
        let end = self.pos + N;
        let bytes = self
            .input
            .get(self.pos..end)
            .ok_or(DecodeError::Truncated { what, pos: self.pos })?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        self.pos = end;
        Ok(out)
    }
}

impl<'a> Reader<'a> for BinaryReader<'a> {
    fn read_u8(&mut self, what: &'static str) -> Result<u8, DecodeError> {
        self.take::<1>(what).map(|[b]| b)
    }

    fn read_u32(&mut self, what: &'static str) -> Result<u32, DecodeError> {
        self.take(what).map(u32::from_be_bytes)
    }

    fn read_u64(&mut self, what: &'static str) -> Result<u64, DecodeError> {
        self.take(what).map(u64::from_be_bytes)
    }

    fn read_i64(&mut self, what: &'static str) -> Result<i64, DecodeError> {
        self.take(what).map(i64::from_be_bytes)
    }

    fn read_bytes(&mut self, what: &'static str) -> Result<&'a [u8], DecodeError> {
        let start = self.pos;
        let n = self.read_u64(what)?;
        let input = self.input;
        let bytes = usize::try_from(n)
            .ok()
            .and_then(|n| input.get(self.pos..self.pos.checked_add(n)?))
            .ok_or(DecodeError::Truncated { what, pos: start })?;
        self.pos += bytes.len();
        Ok(bytes)
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }
}

// Text

#[derive(Debug, Default)]
pub struct TextWriter {
    out: Vec<u8>,
}

impl TextWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn number(&mut self, n: impl std::fmt::Display) {
        self.out.extend_from_slice(n.to_string().as_bytes());
        self.out.push(b' ');
    }
}

impl Writer for TextWriter {
    fn write_u8(&mut self, v: u8) {
        self.number(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.number(v);
    }

    fn write_u64(&mut self, v: u64) {
        self.number(v);
    }

    fn write_i64(&mut self, v: i64) {
        self.number(v);
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.number(bytes.len());
        self.out.extend_from_slice(bytes);
        self.out.push(b' ');
    }

    fn into_bytes(self) -> Vec<u8> {
        self.out
    }
}

#[derive(Debug)]
pub struct TextReader<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> TextReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        TextReader { input, pos: 0 }
    }

    /// Next space-terminated token.
    fn token(&mut self, what: &'static str) -> Result<&'a str, DecodeError> {
        let start = self.pos;
        let input = self.input;
        let rest = input
            .get(start..)
            .filter(|r| !r.is_empty())
            .ok_or(DecodeError::Truncated { what, pos: start })?;
        let len = rest
            .iter()
            .position(|&b| b == b' ')
            .ok_or(DecodeError::Truncated { what, pos: start })?;
        self.pos = start + len + 1;
        std::str::from_utf8(&rest[..len]).map_err(|_| DecodeError::InvalidNumber { what, pos: start })
    }

    fn number<T: std::str::FromStr>(&mut self, what: &'static str) -> Result<T, DecodeError> {
        let pos = self.pos;
        self.token(what)?
            .parse()
            .map_err(|_| DecodeError::InvalidNumber { what, pos })
    }
}

impl<'a> Reader<'a> for TextReader<'a> {
    fn read_u8(&mut self, what: &'static str) -> Result<u8, DecodeError> {
        self.number(what)
    }

    fn read_u32(&mut self, what: &'static str) -> Result<u32, DecodeError> {
        self.number(what)
    }

    fn read_u64(&mut self, what: &'static str) -> Result<u64, DecodeError> {
        self.number(what)
    }

    fn read_i64(&mut self, what: &'static str) -> Result<i64, DecodeError> {
        self.number(what)
    }

    fn read_bytes(&mut self, what: &'static str) -> Result<&'a [u8], DecodeError> {
        let start = self.pos;
        let n: usize = self.number(what)?;
        let input = self.input;
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end < input.len() && input[end] == b' ')
            .ok_or(DecodeError::Truncated { what, pos: start })?;
        let bytes = &input[self.pos..end];
        self.pos = end + 1;
        Ok(bytes)
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }
}

/// Stream used for module files.
#[cfg(not(feature = "text-modfiles"))]
pub type DefaultWriter = BinaryWriter;
#[cfg(not(feature = "text-modfiles"))]
pub type DefaultReader<'a> = BinaryReader<'a>;

#[cfg(feature = "text-modfiles")]
pub type DefaultWriter = TextWriter;
#[cfg(feature = "text-modfiles")]
pub type DefaultReader<'a> = TextReader<'a>;

#[cfg(test)]
mod tests;
