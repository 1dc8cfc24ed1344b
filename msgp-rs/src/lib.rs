//! # msgp-rs
//!
//! MessagePack wire primitives and the codec traits implemented by code that
//! `msgp-rs-gen` generates.
//!
//! Generated code never hand-encodes bytes. It calls the functions in this
//! crate: byte-slice readers that return the remaining input, writers that
//! append to a `Vec<u8>`, a generic [`skip`], and a streaming
//! [`Reader`]/[`Writer`] pair over `std::io`.
//!
//! ## Quick Start
//!
//! ```rust
//! let mut buf = Vec::new();
//! msgp_rs::append_map_header(&mut buf, 1);
//! msgp_rs::append_str(&mut buf, "lat").unwrap();
//! msgp_rs::append_f64(&mut buf, 51.5);
//!
//! let (entries, rest) = msgp_rs::read_map_header_bytes(&buf).unwrap();
//! let (key, rest) = msgp_rs::read_map_key_zc(rest).unwrap();
//! let (lat, rest) = msgp_rs::read_f64_bytes(rest).unwrap();
//!
//! assert_eq!((entries, key, lat), (1, &b"lat"[..], 51.5));
//! assert!(rest.is_empty());
//! ```
//!
//! ## Generated Traits
//!
//! | Trait | Direction | Signature |
//! |-------|-----------|-----------|
//! | [`Marshal`] | value → bytes | `marshal_msg(&self, &mut Vec<u8>)` |
//! | [`Unmarshal`] | bytes → value | `unmarshal_msg(&mut self, &[u8]) -> &[u8]` |
//! | [`Encodable`] | value → stream | `encode_msg(&self, &mut Writer<W>)` |
//! | [`Decodable`] | stream → value | `decode_msg(&mut self, &mut Reader<R>)` |
//! | [`Sizer`] | size bound | `msgsize(&self) -> usize` |
//!
//! ## Errors
//!
//! All operations return [`Error`]. [`Error::Truncated`] is kept distinct from
//! kind mismatches so streaming callers can wait for more input and retry.

pub mod error;
pub mod extension;
pub mod marker;
pub mod size;
pub mod stream;
pub mod traits;

mod read;
mod write;

pub use error::{Error, Result, WireType};
pub use extension::{Extension, RawExtension};
pub use read::{
    is_nil, read_array_header_bytes, read_bool_bytes, read_bytes_into, read_bytes_zc,
    read_exact_bytes, read_extension_bytes, read_f32_bytes, read_f64_bytes, read_i16_bytes,
    read_i32_bytes, read_i64_bytes, read_i8_bytes, read_map_header_bytes, read_map_key_zc,
    read_nil_bytes, read_str_zc, read_string_into, read_u16_bytes, read_u32_bytes,
    read_u64_bytes, read_u8_bytes, skip,
};
pub use size::*;
pub use stream::{Reader, Writer};
pub use traits::{decode, encode, from_slice, to_vec, Decodable, Encodable, Marshal, Sizer, Unmarshal};
pub use write::{
    append_array_header, append_bool, append_bytes, append_extension, append_f32, append_f64,
    append_i16, append_i32, append_i64, append_i8, append_map_header, append_nil, append_str,
    append_u16, append_u32, append_u64, append_u8, len_u32,
};
