//! Byte-slice readers.
//!
//! Each reader takes the remaining input and returns the decoded value
//! together with the input that follows it. Readers never allocate unless
//! they write into a caller-supplied destination, and string and key readers
//! return views into the input.

use crate::error::{Error, Result, WireType};
use crate::marker::{self, be_u16, be_u32, be_u64};
use crate::Extension;

fn marker(b: &[u8]) -> Result<u8> {
    b.first().copied().ok_or(Error::Truncated)
}

fn split_at(b: &[u8], n: usize) -> Result<(&[u8], &[u8])> {
    if b.len() < n {
        return Err(Error::Truncated);
    }
    Ok(b.split_at(n))
}

fn count_fits(count: u32, min_item_size: usize, rest: &[u8]) -> Result<()> {
    if (count as usize).saturating_mul(min_item_size) > rest.len() {
        return Err(Error::Truncated);
    }
    Ok(())
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

// =============================================================================
// Structural headers
// =============================================================================

pub(crate) fn array_header(b: &[u8]) -> Result<(u32, &[u8])> {
    let m = marker(b)?;
    match m {
        0x90..=0x9f => Ok((u32::from(m & 0x0f), &b[1..])),
        marker::ARRAY16 => {
            let (head, rest) = split_at(b, 3)?;
            Ok((u32::from(be_u16(&head[1..])), rest))
        }
        marker::ARRAY32 => {
            let (head, rest) = split_at(b, 5)?;
            Ok((be_u32(&head[1..]), rest))
        }
        _ => Err(Error::wire(WireType::Array, m)),
    }
}

pub(crate) fn map_header(b: &[u8]) -> Result<(u32, &[u8])> {
    let m = marker(b)?;
    match m {
        0x80..=0x8f => Ok((u32::from(m & 0x0f), &b[1..])),
        marker::MAP16 => {
            let (head, rest) = split_at(b, 3)?;
            Ok((u32::from(be_u16(&head[1..])), rest))
        }
        marker::MAP32 => {
            let (head, rest) = split_at(b, 5)?;
            Ok((be_u32(&head[1..]), rest))
        }
        _ => Err(Error::wire(WireType::Map, m)),
    }
}

/// Read an array header and return the element count.
///
/// Counts that could not possibly fit in the remaining input are reported
/// as [`Error::Truncated`] so callers can size containers from the header.
pub fn read_array_header_bytes(b: &[u8]) -> Result<(u32, &[u8])> {
    let (sz, rest) = array_header(b)?;
    count_fits(sz, 1, rest)?;
    Ok((sz, rest))
}

/// Read a map header and return the entry count.
pub fn read_map_header_bytes(b: &[u8]) -> Result<(u32, &[u8])> {
    let (sz, rest) = map_header(b)?;
    count_fits(sz, 2, rest)?;
    Ok((sz, rest))
}

/// Consume a nil marker.
pub fn read_nil_bytes(b: &[u8]) -> Result<&[u8]> {
    match marker(b)? {
        marker::NIL => Ok(&b[1..]),
        m => Err(Error::wire(WireType::Nil, m)),
    }
}

/// Check whether the next value is nil without consuming it.
pub fn is_nil(b: &[u8]) -> bool {
    b.first() == Some(&marker::NIL)
}

// =============================================================================
// Scalars
// =============================================================================

/// Read a bool.
pub fn read_bool_bytes(b: &[u8]) -> Result<(bool, &[u8])> {
    match marker(b)? {
        marker::TRUE => Ok((true, &b[1..])),
        marker::FALSE => Ok((false, &b[1..])),
        m => Err(Error::wire(WireType::Bool, m)),
    }
}

/// Read a float32.
pub fn read_f32_bytes(b: &[u8]) -> Result<(f32, &[u8])> {
    let m = marker(b)?;
    if m != marker::FLOAT32 {
        return Err(Error::wire(WireType::Float32, m));
    }
    let (head, rest) = split_at(b, 5)?;
    Ok((f32::from_bits(be_u32(&head[1..])), rest))
}

/// Read a float64. A float32 on the wire is widened.
pub fn read_f64_bytes(b: &[u8]) -> Result<(f64, &[u8])> {
    match marker(b)? {
        marker::FLOAT64 => {
            let (head, rest) = split_at(b, 9)?;
            Ok((f64::from_bits(be_u64(&head[1..])), rest))
        }
        marker::FLOAT32 => {
            let (v, rest) = read_f32_bytes(b)?;
            Ok((f64::from(v), rest))
        }
        m => Err(Error::wire(WireType::Float64, m)),
    }
}

/// Read any integer encoding as an `i128`, which holds every wire integer.
fn read_integer(b: &[u8], expected: WireType) -> Result<(i128, &[u8])> {
    let m = marker(b)?;
    let width = match m {
        0x00..=0x7f | 0xe0..=0xff => 1,
        marker::UINT8 | marker::INT8 => 2,
        marker::UINT16 | marker::INT16 => 3,
        marker::UINT32 | marker::INT32 => 5,
        marker::UINT64 | marker::INT64 => 9,
        _ => return Err(Error::wire(expected, m)),
    };
    let (head, rest) = split_at(b, width)?;
    let v = match m {
        marker::UINT8 => i128::from(head[1]),
        marker::UINT16 => i128::from(be_u16(&head[1..])),
        marker::UINT32 => i128::from(be_u32(&head[1..])),
        marker::UINT64 => i128::from(be_u64(&head[1..])),
        marker::INT8 => i128::from(head[1] as i8),
        marker::INT16 => i128::from(be_u16(&head[1..]) as i16),
        marker::INT32 => i128::from(be_u32(&head[1..]) as i32),
        marker::INT64 => i128::from(be_u64(&head[1..]) as i64),
        0x00..=0x7f => i128::from(m),
        _ => i128::from(m as i8),
    };
    Ok((v, rest))
}

macro_rules! int_readers {
    ($($name:ident => $t:ty, $overflow:ident, $wire:expr;)*) => {
        $(
            #[doc = concat!("Read an integer into a `", stringify!($t), "`.")]
            ///
            /// Any integer encoding is accepted as long as the value fits.
            pub fn $name(b: &[u8]) -> Result<($t, &[u8])> {
                let (v, rest) = read_integer(b, $wire)?;
                let out = <$t>::try_from(v).map_err(|_| Error::$overflow {
                    value: v,
                    target: stringify!($t),
                })?;
                Ok((out, rest))
            }
        )*
    };
}

int_readers! {
    read_i8_bytes => i8, IntOverflow, WireType::Int;
    read_i16_bytes => i16, IntOverflow, WireType::Int;
    read_i32_bytes => i32, IntOverflow, WireType::Int;
    read_i64_bytes => i64, IntOverflow, WireType::Int;
    read_u8_bytes => u8, UintOverflow, WireType::Uint;
    read_u16_bytes => u16, UintOverflow, WireType::Uint;
    read_u32_bytes => u32, UintOverflow, WireType::Uint;
    read_u64_bytes => u64, UintOverflow, WireType::Uint;
}

// =============================================================================
// Strings, binary and extensions
// =============================================================================

fn str_raw(b: &[u8]) -> Result<(&[u8], &[u8])> {
    let m = marker(b)?;
    if marker::wire_type(m) != WireType::Str {
        return Err(Error::wire(WireType::Str, m));
    }
    let (head, body) = split_at(b, marker::header_size(m)?)?;
    split_at(body, marker::payload_size(head))
}

/// Read a string as a view into the input.
pub fn read_str_zc(b: &[u8]) -> Result<(&str, &[u8])> {
    let (raw, rest) = str_raw(b)?;
    Ok((std::str::from_utf8(raw)?, rest))
}

/// Read a binary blob as a view into the input.
pub fn read_bytes_zc(b: &[u8]) -> Result<(&[u8], &[u8])> {
    let m = marker(b)?;
    if marker::wire_type(m) != WireType::Bin {
        return Err(Error::wire(WireType::Bin, m));
    }
    let (head, body) = split_at(b, marker::header_size(m)?)?;
    split_at(body, marker::payload_size(head))
}

/// Read a map key as raw bytes borrowed from the input.
///
/// Keys may be encoded as `str` or `bin`. The bytes are not validated as
/// UTF-8, which lets generated code match them against byte literals
/// without a copy.
pub fn read_map_key_zc(b: &[u8]) -> Result<(&[u8], &[u8])> {
    let m = marker(b)?;
    match marker::wire_type(m) {
        WireType::Str => str_raw(b),
        WireType::Bin => read_bytes_zc(b),
        _ => Err(Error::wire(WireType::Str, m)),
    }
}

/// Read a string into `dst`, reusing its allocation.
pub fn read_string_into<'a>(b: &'a [u8], dst: &mut String) -> Result<&'a [u8]> {
    let (s, rest) = read_str_zc(b)?;
    dst.clear();
    dst.push_str(s);
    Ok(rest)
}

/// Read a binary blob into `dst`, reusing its allocation.
pub fn read_bytes_into<'a>(b: &'a [u8], dst: &mut Vec<u8>) -> Result<&'a [u8]> {
    let (raw, rest) = read_bytes_zc(b)?;
    dst.clear();
    dst.extend_from_slice(raw);
    Ok(rest)
}

/// Read a binary blob whose length must equal `dst.len()`.
pub fn read_exact_bytes<'a>(b: &'a [u8], dst: &mut [u8]) -> Result<&'a [u8]> {
    let (raw, rest) = read_bytes_zc(b)?;
    if raw.len() != dst.len() {
        return Err(Error::ArraySize {
            expected: to_u32(dst.len()),
            found: to_u32(raw.len()),
        });
    }
    dst.copy_from_slice(raw);
    Ok(rest)
}

pub(crate) fn extension_raw(b: &[u8]) -> Result<(i8, &[u8], &[u8])> {
    let m = marker(b)?;
    if marker::wire_type(m) != WireType::Extension {
        return Err(Error::wire(WireType::Extension, m));
    }
    let size = marker::header_size(m)?;
    let (head, body) = split_at(b, size)?;
    let ext_type = head[size - 1] as i8;
    let (data, rest) = split_at(body, marker::payload_size(head))?;
    Ok((ext_type, data, rest))
}

/// Read an extension into `e`.
pub fn read_extension_bytes<'a, E>(b: &'a [u8], e: &mut E) -> Result<&'a [u8]>
where
    E: Extension + ?Sized,
{
    let (ext_type, data, rest) = extension_raw(b)?;
    if !e.accepts(ext_type) {
        return Err(Error::ExtensionType {
            expected: e.extension_type(),
            found: ext_type,
        });
    }
    e.unmarshal_binary(ext_type, data)?;
    Ok(rest)
}

// =============================================================================
// Skip
// =============================================================================

/// Bytes occupied by the value at the front of `b` (excluding nested
/// values) and the number of nested values that follow it.
fn value_extent(b: &[u8]) -> Result<(usize, u64)> {
    let m = marker(b)?;
    let size = marker::header_size(m)?;
    let (head, _) = split_at(b, size)?;
    let total = size + marker::payload_size(head);
    if b.len() < total {
        return Err(Error::Truncated);
    }
    Ok((total, marker::child_count(head)))
}

/// Advance past one complete value of any kind.
///
/// Nested arrays and maps are walked iteratively with a pending-value
/// counter, so deeply nested input cannot exhaust the stack.
pub fn skip(b: &[u8]) -> Result<&[u8]> {
    let mut rest = b;
    let mut pending: u64 = 1;
    while pending > 0 {
        let (len, children) = value_extent(rest)?;
        rest = &rest[len..];
        pending = pending - 1 + children;
    }
    Ok(rest)
}
