//! Bit-addressable buffer
//!
//! A [`BitBuffer`] is a window `[start, stop)` over a byte vector. Bits are
//! numbered conventionally: logical bit 0 is the least significant bit of the
//! first byte in the window. The textual form prints the most significant bit
//! on the left, so it reads like an ordinary binary number.
//!
//! Derived buffers (slices, chunks, concatenations) are always normalized:
//! their window starts at bit 0 and they hold exactly `ceil(size / 8)` bytes
//! with any unused high bits of the last byte cleared.

use std::fmt;

use num_bigint::{BigInt, BigUint};
use num_traits::{ToPrimitive, Zero};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

/// A windowed, bit-addressable view over a byte sequence
///
/// Buffers often hold secret material (mnemonic entropy), so the backing
/// bytes are wiped when the buffer is dropped.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct BitBuffer {
    data: Vec<u8>,
    start: usize,
    stop: usize,
}

impl BitBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Little-endian decomposition of a non-negative integer
    ///
    /// With `min_bits == 0` the window spans every decomposed byte (so zero
    /// yields an empty buffer). Otherwise the bytes are zero-extended to
    /// cover `min_bits` and the window is exactly `[0, min_bits)`.
    pub fn from_int(n: impl Into<BigInt>, min_bits: usize) -> Result<Self> {
        let n = n.into();
        match n.to_biguint() {
            Some(value) => Self::from_biguint(&value, min_bits),
            None => Err(Error::Domain(format!("{} is negative", n))),
        }
    }

    /// [`BitBuffer::from_int`] for an already unsigned value
    pub fn from_biguint(value: &BigUint, min_bits: usize) -> Result<Self> {
        let mut data = if value.is_zero() { Vec::new() } else { value.to_bytes_le() };

        if min_bits == 0 {
            let stop = data.len() * 8;
            return Ok(Self { data, start: 0, stop });
        }

        let significant = value.bits() as usize;
        if significant > min_bits {
            return Err(Error::Range(format!(
                "{} needs {} bits, only {} requested",
                value, significant, min_bits
            )));
        }
        data.resize(min_bits.div_ceil(8), 0);

        Ok(Self { data, start: 0, stop: min_bits })
    }

    /// Buffer over all bits of `bytes`
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let data = bytes.into();
        let stop = data.len() * 8;
        Self { data, start: 0, stop }
    }

    /// Buffer over the bit window `[start, stop)` of `bytes`
    pub fn with_window(bytes: impl Into<Vec<u8>>, start: usize, stop: usize) -> Result<Self> {
        let data = bytes.into();
        let data_len = data.len() * 8;
        if stop > data_len {
            return Err(Error::Range(format!("stop {} exceeds data length {}", stop, data_len)));
        }
        if stop < start {
            return Err(Error::Range(format!("stop {} less than start {}", stop, start)));
        }
        Ok(Self { data, start, stop })
    }

    /// Number of bits in the window
    pub fn size(&self) -> usize {
        self.stop - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.stop
    }

    /// Current window over the backing bytes
    pub fn window(&self) -> (usize, usize) {
        (self.start, self.stop)
    }

    /// Backing bytes, including any bits outside the window
    pub fn raw_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Bytes of the normalized form, least significant byte first
    pub fn to_bytes(&self) -> Vec<u8> {
        self.extract(self.start, self.size()).take_data()
    }

    /// Value (0 or 1) of the bit at logical index `i`
    pub fn bit(&self, i: usize) -> Result<u8> {
        if i >= self.size() {
            return Err(Error::Range(format!("index {} is bad for {} bits", i, self.size())));
        }
        Ok(self.bit_at(i))
    }

    fn bit_at(&self, i: usize) -> u8 {
        let (byte_index, offset) = ((self.start + i) / 8, (self.start + i) % 8);
        (self.data[byte_index] >> offset) & 1
    }

    /// Integer value of the buffer, bit 0 being least significant
    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_le(&self.to_bytes())
    }

    /// [`BitBuffer::to_biguint`] narrowed to 128 bits, as used for chunks
    pub fn to_int(&self) -> Result<u128> {
        let value = self.to_biguint();
        value.to_u128().ok_or_else(|| {
            Error::Range(format!("{} bits do not fit in a 128-bit integer", value.bits()))
        })
    }

    /// Bits `[a, b)` as a new normalized buffer
    pub fn slice(&self, a: usize, b: usize) -> Result<Self> {
        let size = self.size();
        if a >= size {
            return Err(Error::Range(format!("start limit {} is bad", a)));
        }
        if b == 0 || b - 1 >= size {
            return Err(Error::Range(format!("stop limit {} is bad", b)));
        }
        if b < a {
            return Err(Error::Range(format!("stop limit {} less than start {}", b, a)));
        }
        Ok(self.extract(self.start + a, b - a))
    }

    /// Slice measured from the high end: `rslice(a, b) == slice(size - b, size - a)`
    pub fn rslice(&self, a: usize, b: usize) -> Result<Self> {
        let size = self.size();
        if b > size || a > b {
            return Err(Error::Range(format!("reverse limits {}..{} are bad", a, b)));
        }
        self.slice(size - b, size - a)
    }

    pub fn chunk(&self, a: usize, b: usize) -> Result<u128> {
        self.slice(a, b)?.to_int()
    }

    pub fn rchunk(&self, a: usize, b: usize) -> Result<u128> {
        self.rslice(a, b)?.to_int()
    }

    /// Consecutive `n`-bit slices from the low end; the last may be shorter
    pub fn slice_every(&self, n: usize) -> Result<Vec<Self>> {
        let limits = Self::every_limits(self.size(), n)?;
        Ok(limits
            .into_iter()
            .map(|(start, stop)| self.extract(self.start + start, stop - start))
            .collect())
    }

    /// Consecutive `n`-bit slices from the high end; the last may be shorter
    pub fn rslice_every(&self, n: usize) -> Result<Vec<Self>> {
        let size = self.size();
        let limits = Self::every_limits(size, n)?;
        Ok(limits
            .into_iter()
            .map(|(start, stop)| self.extract(self.start + size - stop, stop - start))
            .collect())
    }

    pub fn chunk_every(&self, n: usize) -> Result<Vec<u128>> {
        self.slice_every(n)?.iter().map(Self::to_int).collect()
    }

    pub fn rchunk_every(&self, n: usize) -> Result<Vec<u128>> {
        self.rslice_every(n)?.iter().map(Self::to_int).collect()
    }

    fn every_limits(size: usize, n: usize) -> Result<Vec<(usize, usize)>> {
        if n == 0 {
            return Err(Error::Domain("slice width must be positive".to_string()));
        }
        let mut limits = Vec::with_capacity(size.div_ceil(n));
        let mut start = 0;
        while start < size {
            let stop = (start + n).min(size);
            limits.push((start, stop));
            start = stop;
        }
        Ok(limits)
    }

    /// Exactly `ceil(size / 8)` bytes with window `[0, size)`
    pub fn normalized(&self) -> Self {
        self.extract(self.start, self.size())
    }

    /// Normalized form with its byte order reversed
    pub fn byte_reversed(&self) -> Self {
        let mut new = self.normalized();
        new.data.reverse();
        new
    }

    /// Bit order reversed: bit `i` becomes bit `size - 1 - i`
    pub fn reversed(&self) -> Self {
        let size = self.size();
        let normalized = self.normalized();
        let data: Vec<u8> = normalized.data.iter().rev().map(|b| b.reverse_bits()).collect();
        let width = data.len() * 8;
        let flipped = Self { data, start: width - size, stop: width };
        flipped.normalized()
    }

    /// Complement every bit in place
    pub fn invert(&mut self) {
        for byte in self.data.iter_mut() {
            *byte = !*byte;
        }
    }

    pub fn inverted(&self) -> Self {
        let mut new = self.clone();
        new.invert();
        new
    }

    /// Drop most significant zero bits by shrinking the window
    pub fn strip(&mut self) {
        while self.stop > self.start && self.bit_at(self.size() - 1) == 0 {
            self.stop -= 1;
        }
    }

    pub fn stripped(&self) -> Self {
        let mut new = self.clone();
        new.strip();
        new
    }

    /// New buffer with `self` in the low bits and `other` in the high bits
    pub fn concat(&self, other: &Self) -> Self {
        let n_bits = self.size();
        let total = n_bits + other.size();
        let mut bytes = self.to_bytes();
        let high = other.to_bytes();

        let overhang = n_bits % 8;
        if overhang == 0 {
            bytes.extend_from_slice(&high);
        } else {
            for byte in high.iter() {
                if let Some(last) = bytes.last_mut() {
                    *last |= byte << overhang;
                }
                bytes.push(byte >> (8 - overhang));
            }
        }
        bytes.truncate(total.div_ceil(8));
        mask_tail(&mut bytes, total);

        Self { data: bytes, start: 0, stop: total }
    }

    /// Normalized copy of `n_bits` bits starting at absolute bit `offset`
    fn extract(&self, offset: usize, n_bits: usize) -> Self {
        let n_bytes = n_bits.div_ceil(8);
        let (first, shift) = (offset / 8, offset % 8);

        let mut out = Vec::with_capacity(n_bytes);
        for k in 0..n_bytes {
            let low = self.data.get(first + k).copied().unwrap_or(0);
            let mut byte = low >> shift;
            if shift > 0 {
                let high = self.data.get(first + k + 1).copied().unwrap_or(0);
                byte |= high << (8 - shift);
            }
            out.push(byte);
        }
        mask_tail(&mut out, n_bits);

        Self { data: out, start: 0, stop: n_bits }
    }

    fn take_data(mut self) -> Vec<u8> {
        std::mem::take(&mut self.data)
    }
}

/// Clear the bits of the last byte that lie beyond `n_bits`
fn mask_tail(bytes: &mut [u8], n_bits: usize) {
    let rem = n_bits % 8;
    if rem != 0 {
        if let Some(last) = bytes.last_mut() {
            *last &= (1u8 << rem) - 1;
        }
    }
}

impl PartialEq for BitBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.size() == other.size() && self.to_bytes() == other.to_bytes()
    }
}

impl Eq for BitBuffer {}

impl fmt::Display for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.size()).rev() {
            f.write_str(if self.bit_at(i) == 1 { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitBuffer")
            .field("bits", &self.to_string())
            .field("start", &self.start)
            .field("stop", &self.stop)
            .finish()
    }
}
