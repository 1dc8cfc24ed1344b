//! MessagePack marker bytes and value framing.
//!
//! A value's first byte determines its kind and how many bytes follow. The
//! helpers here compute that framing without decoding the value, which is
//! what [`skip`](crate::skip) and the streaming [`Reader`](crate::Reader)
//! build on.

use crate::error::{Error, Result, WireType};

pub const NIL: u8 = 0xc0;
pub const FALSE: u8 = 0xc2;
pub const TRUE: u8 = 0xc3;
pub const BIN8: u8 = 0xc4;
pub const BIN16: u8 = 0xc5;
pub const BIN32: u8 = 0xc6;
pub const EXT8: u8 = 0xc7;
pub const EXT16: u8 = 0xc8;
pub const EXT32: u8 = 0xc9;
pub const FLOAT32: u8 = 0xca;
pub const FLOAT64: u8 = 0xcb;
pub const UINT8: u8 = 0xcc;
pub const UINT16: u8 = 0xcd;
pub const UINT32: u8 = 0xce;
pub const UINT64: u8 = 0xcf;
pub const INT8: u8 = 0xd0;
pub const INT16: u8 = 0xd1;
pub const INT32: u8 = 0xd2;
pub const INT64: u8 = 0xd3;
pub const FIXEXT1: u8 = 0xd4;
pub const FIXEXT2: u8 = 0xd5;
pub const FIXEXT4: u8 = 0xd6;
pub const FIXEXT8: u8 = 0xd7;
pub const FIXEXT16: u8 = 0xd8;
pub const STR8: u8 = 0xd9;
pub const STR16: u8 = 0xda;
pub const STR32: u8 = 0xdb;
pub const ARRAY16: u8 = 0xdc;
pub const ARRAY32: u8 = 0xdd;
pub const MAP16: u8 = 0xde;
pub const MAP32: u8 = 0xdf;

pub const FIXMAP: u8 = 0x80;
pub const FIXARRAY: u8 = 0x90;
pub const FIXSTR: u8 = 0xa0;

/// Largest length encodable in a fixstr marker.
pub const FIXSTR_MAX: usize = 31;
/// Largest count encodable in a fixarray or fixmap marker.
pub const FIX_HEADER_MAX: u32 = 15;

/// Classify a marker byte.
pub fn wire_type(marker: u8) -> WireType {
    match marker {
        0x00..=0x7f | UINT8 | UINT16 | UINT32 | UINT64 => WireType::Uint,
        0xe0..=0xff | INT8 | INT16 | INT32 | INT64 => WireType::Int,
        0x80..=0x8f | MAP16 | MAP32 => WireType::Map,
        0x90..=0x9f | ARRAY16 | ARRAY32 => WireType::Array,
        0xa0..=0xbf | STR8 | STR16 | STR32 => WireType::Str,
        NIL => WireType::Nil,
        FALSE | TRUE => WireType::Bool,
        BIN8 | BIN16 | BIN32 => WireType::Bin,
        EXT8 | EXT16 | EXT32 | FIXEXT1 | FIXEXT2 | FIXEXT4 | FIXEXT8 | FIXEXT16 => {
            WireType::Extension
        }
        FLOAT32 => WireType::Float32,
        FLOAT64 => WireType::Float64,
        _ => WireType::Invalid,
    }
}

/// Number of bytes needed before the payload length of a value is known.
///
/// For scalars this is the whole encoded value. For strings, binary blobs
/// and extensions it covers the marker, the length field and (for
/// extensions) the type tag. For arrays and maps it is the header alone.
pub fn header_size(marker: u8) -> Result<usize> {
    let size = match marker {
        0x00..=0x7f | 0xe0..=0xff | 0x80..=0xbf => 1,
        NIL | FALSE | TRUE => 1,
        BIN8 | STR8 | UINT8 | INT8 => 2,
        BIN16 | STR16 | UINT16 | INT16 | ARRAY16 | MAP16 => 3,
        BIN32 | STR32 | UINT32 | INT32 | FLOAT32 | ARRAY32 | MAP32 => 5,
        UINT64 | INT64 | FLOAT64 => 9,
        FIXEXT1 | FIXEXT2 | FIXEXT4 | FIXEXT8 | FIXEXT16 => 2,
        EXT8 => 3,
        EXT16 => 4,
        EXT32 => 6,
        _ => return Err(Error::InvalidMarker(marker)),
    };
    Ok(size)
}

/// Payload length that follows a complete header.
///
/// `head` must hold at least [`header_size`] bytes.
pub fn payload_size(head: &[u8]) -> usize {
    match head[0] {
        m @ 0xa0..=0xbf => usize::from(m & 0x1f),
        BIN8 | STR8 | EXT8 => usize::from(head[1]),
        BIN16 | STR16 | EXT16 => usize::from(be_u16(&head[1..])),
        BIN32 | STR32 | EXT32 => be_u32(&head[1..]) as usize,
        FIXEXT1 => 1,
        FIXEXT2 => 2,
        FIXEXT4 => 4,
        FIXEXT8 => 8,
        FIXEXT16 => 16,
        _ => 0,
    }
}

/// Number of nested values that follow a complete header.
///
/// Arrays contribute one value per element and maps two per entry.
pub fn child_count(head: &[u8]) -> u64 {
    match head[0] {
        m @ 0x80..=0x8f => 2 * u64::from(m & 0x0f),
        m @ 0x90..=0x9f => u64::from(m & 0x0f),
        ARRAY16 => u64::from(be_u16(&head[1..])),
        ARRAY32 => u64::from(be_u32(&head[1..])),
        MAP16 => 2 * u64::from(be_u16(&head[1..])),
        MAP32 => 2 * u64::from(be_u32(&head[1..])),
        _ => 0,
    }
}

pub(crate) fn be_u16(b: &[u8]) -> u16 {
    u16::from_be_bytes([b[0], b[1]])
}

pub(crate) fn be_u32(b: &[u8]) -> u32 {
    u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

pub(crate) fn be_u64(b: &[u8]) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&b[..8]);
    u64::from_be_bytes(raw)
}
