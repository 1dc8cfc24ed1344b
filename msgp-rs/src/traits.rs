//! Codec traits implemented by generated code.
//!
//! `msgp-rs-gen` emits one impl of each trait per declared type. Generated
//! bodies call nested values through these traits by their fully qualified
//! paths, which is how a field of another declared type (or of the same type,
//! for recursive declarations) is delegated instead of inlined.

use std::io::{Read, Write};

use crate::error::Result;
use crate::stream::{Reader, Writer};

/// Encode a value by appending to a byte buffer.
pub trait Marshal {
    /// Append the encoding of `self` to `buf`.
    fn marshal_msg(&self, buf: &mut Vec<u8>) -> Result<()>;
}

/// Decode a value in place from a byte slice.
pub trait Unmarshal {
    /// Populate `self` from the front of `bts` and return the remainder.
    ///
    /// Existing allocations in `self` are reused. Fields absent from a
    /// map-encoded input keep their current values. On error `self` may be
    /// partially populated and should be discarded.
    fn unmarshal_msg<'a>(&mut self, bts: &'a [u8]) -> Result<&'a [u8]>;
}

/// Encode a value to a streaming [`Writer`].
pub trait Encodable {
    fn encode_msg<W: Write>(&self, en: &mut Writer<W>) -> Result<()>;
}

/// Decode a value in place from a streaming [`Reader`].
pub trait Decodable {
    fn decode_msg<R: Read>(&mut self, dc: &mut Reader<R>) -> Result<()>;
}

/// Estimate the encoded size of a value.
pub trait Sizer {
    /// An upper bound on the number of bytes [`Marshal::marshal_msg`] appends.
    ///
    /// The estimate may be larger than the real encoding because every
    /// integer and header is counted at its widest form.
    fn msgsize(&self) -> usize;
}

/// Encode `value` into a new buffer.
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: Marshal + ?Sized,
{
    let mut buf = Vec::new();
    value.marshal_msg(&mut buf)?;
    Ok(buf)
}

/// Decode a fresh value from the front of `bts`.
pub fn from_slice<T>(bts: &[u8]) -> Result<(T, &[u8])>
where
    T: Unmarshal + Default,
{
    let mut value = T::default();
    let rest = value.unmarshal_msg(bts)?;
    Ok((value, rest))
}

/// Encode `value` to `w` and flush it.
pub fn encode<W, T>(w: W, value: &T) -> Result<W>
where
    W: Write,
    T: Encodable + ?Sized,
{
    let mut en = Writer::new(w);
    value.encode_msg(&mut en)?;
    en.into_inner()
}

/// Decode a fresh value from `r`.
pub fn decode<R, T>(r: R) -> Result<T>
where
    R: Read,
    T: Decodable + Default,
{
    let mut dc = Reader::new(r);
    let mut value = T::default();
    value.decode_msg(&mut dc)?;
    Ok(value)
}
