//! Byte-slice writers.
//!
//! Writers append one encoded value to a `Vec<u8>`. Integers and headers use
//! the smallest encoding that holds the value. Writers whose input carries a
//! length return a `Result` because lengths above `u32::MAX` cannot be
//! represented on the wire.

use crate::error::{Error, Result};
use crate::marker;
use crate::Extension;

/// Convert a container length to the 32-bit count used in headers.
pub fn len_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::TooLong { len })
}

/// Append a nil marker.
pub fn append_nil(buf: &mut Vec<u8>) {
    buf.push(marker::NIL);
}

/// Append a bool.
pub fn append_bool(buf: &mut Vec<u8>, v: bool) {
    buf.push(if v { marker::TRUE } else { marker::FALSE });
}

/// Append a float32.
pub fn append_f32(buf: &mut Vec<u8>, v: f32) {
    buf.push(marker::FLOAT32);
    buf.extend_from_slice(&v.to_bits().to_be_bytes());
}

/// Append a float64.
pub fn append_f64(buf: &mut Vec<u8>, v: f64) {
    buf.push(marker::FLOAT64);
    buf.extend_from_slice(&v.to_bits().to_be_bytes());
}

/// Append an unsigned integer in its smallest encoding.
pub fn append_u64(buf: &mut Vec<u8>, v: u64) {
    if v <= 0x7f {
        buf.push(v as u8);
    } else if let Ok(v) = u8::try_from(v) {
        buf.extend_from_slice(&[marker::UINT8, v]);
    } else if let Ok(v) = u16::try_from(v) {
        buf.push(marker::UINT16);
        buf.extend_from_slice(&v.to_be_bytes());
    } else if let Ok(v) = u32::try_from(v) {
        buf.push(marker::UINT32);
        buf.extend_from_slice(&v.to_be_bytes());
    } else {
        buf.push(marker::UINT64);
        buf.extend_from_slice(&v.to_be_bytes());
    }
}

/// Append a signed integer in its smallest encoding.
///
/// Non-negative values share the unsigned encodings.
pub fn append_i64(buf: &mut Vec<u8>, v: i64) {
    if v >= 0 {
        append_u64(buf, v as u64);
    } else if v >= -32 {
        buf.push(v as i8 as u8);
    } else if let Ok(v) = i8::try_from(v) {
        buf.extend_from_slice(&[marker::INT8, v as u8]);
    } else if let Ok(v) = i16::try_from(v) {
        buf.push(marker::INT16);
        buf.extend_from_slice(&v.to_be_bytes());
    } else if let Ok(v) = i32::try_from(v) {
        buf.push(marker::INT32);
        buf.extend_from_slice(&v.to_be_bytes());
    } else {
        buf.push(marker::INT64);
        buf.extend_from_slice(&v.to_be_bytes());
    }
}

/// Append an `i8`.
pub fn append_i8(buf: &mut Vec<u8>, v: i8) {
    append_i64(buf, i64::from(v));
}

/// Append an `i16`.
pub fn append_i16(buf: &mut Vec<u8>, v: i16) {
    append_i64(buf, i64::from(v));
}

/// Append an `i32`.
pub fn append_i32(buf: &mut Vec<u8>, v: i32) {
    append_i64(buf, i64::from(v));
}

/// Append a `u8`.
pub fn append_u8(buf: &mut Vec<u8>, v: u8) {
    append_u64(buf, u64::from(v));
}

/// Append a `u16`.
pub fn append_u16(buf: &mut Vec<u8>, v: u16) {
    append_u64(buf, u64::from(v));
}

/// Append a `u32`.
pub fn append_u32(buf: &mut Vec<u8>, v: u32) {
    append_u64(buf, u64::from(v));
}

fn append_header(buf: &mut Vec<u8>, n: u32, fix: u8, m16: u8, m32: u8) {
    if n <= marker::FIX_HEADER_MAX {
        buf.push(fix | n as u8);
    } else if let Ok(n) = u16::try_from(n) {
        buf.push(m16);
        buf.extend_from_slice(&n.to_be_bytes());
    } else {
        buf.push(m32);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Append an array header announcing `n` elements.
pub fn append_array_header(buf: &mut Vec<u8>, n: u32) {
    append_header(buf, n, marker::FIXARRAY, marker::ARRAY16, marker::ARRAY32);
}

/// Append a map header announcing `n` entries.
pub fn append_map_header(buf: &mut Vec<u8>, n: u32) {
    append_header(buf, n, marker::FIXMAP, marker::MAP16, marker::MAP32);
}

/// Append a string.
pub fn append_str(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    let n = len_u32(s.len())?;
    if s.len() <= marker::FIXSTR_MAX {
        buf.push(marker::FIXSTR | n as u8);
    } else if let Ok(n) = u8::try_from(n) {
        buf.extend_from_slice(&[marker::STR8, n]);
    } else if let Ok(n) = u16::try_from(n) {
        buf.push(marker::STR16);
        buf.extend_from_slice(&n.to_be_bytes());
    } else {
        buf.push(marker::STR32);
        buf.extend_from_slice(&n.to_be_bytes());
    }
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

/// Append a binary blob.
pub fn append_bytes(buf: &mut Vec<u8>, b: &[u8]) -> Result<()> {
    let n = len_u32(b.len())?;
    if let Ok(n) = u8::try_from(n) {
        buf.extend_from_slice(&[marker::BIN8, n]);
    } else if let Ok(n) = u16::try_from(n) {
        buf.push(marker::BIN16);
        buf.extend_from_slice(&n.to_be_bytes());
    } else {
        buf.push(marker::BIN32);
        buf.extend_from_slice(&n.to_be_bytes());
    }
    buf.extend_from_slice(b);
    Ok(())
}

/// Append an extension value with its type tag.
pub fn append_extension<E>(buf: &mut Vec<u8>, e: &E) -> Result<()>
where
    E: Extension + ?Sized,
{
    let len = e.data_len();
    let n = len_u32(len)?;
    match len {
        1 => buf.push(marker::FIXEXT1),
        2 => buf.push(marker::FIXEXT2),
        4 => buf.push(marker::FIXEXT4),
        8 => buf.push(marker::FIXEXT8),
        16 => buf.push(marker::FIXEXT16),
        _ => {
            if let Ok(n) = u8::try_from(n) {
                buf.extend_from_slice(&[marker::EXT8, n]);
            } else if let Ok(n) = u16::try_from(n) {
                buf.push(marker::EXT16);
                buf.extend_from_slice(&n.to_be_bytes());
            } else {
                buf.push(marker::EXT32);
                buf.extend_from_slice(&n.to_be_bytes());
            }
        }
    }
    buf.push(e.extension_type() as u8);
    e.marshal_binary_to(buf)
}
