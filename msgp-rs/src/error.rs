//! Error types for wire reads and writes.
//!
//! Every primitive in this crate reports failures through [`Error`]. Generated
//! code propagates it unchanged with `?`, so a caller decoding a nested value
//! sees the first failure exactly as the primitive reported it.

use std::fmt;
use thiserror::Error;

/// Result type alias for wire operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The kind of value a marker byte introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    Nil,
    Bool,
    Int,
    Uint,
    Float32,
    Float64,
    Str,
    Bin,
    Array,
    Map,
    Extension,
    Invalid,
}

impl WireType {
    /// Returns the lowercase name used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            WireType::Nil => "nil",
            WireType::Bool => "bool",
            WireType::Int => "int",
            WireType::Uint => "uint",
            WireType::Float32 => "float32",
            WireType::Float64 => "float64",
            WireType::Str => "str",
            WireType::Bin => "bin",
            WireType::Array => "array",
            WireType::Map => "map",
            WireType::Extension => "ext",
            WireType::Invalid => "invalid",
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by wire primitives and generated codecs.
#[derive(Debug, Error)]
pub enum Error {
    /// The input ended before a complete value could be read.
    #[error("unexpected end of input")]
    Truncated,

    /// A value of one kind was found where another was expected.
    #[error("wire type mismatch: expected {expected}, found {found}")]
    WireType { expected: WireType, found: WireType },

    /// A fixed-size array or tuple was encoded with the wrong element count.
    #[error("array size mismatch: expected {expected} elements, found {found}")]
    ArraySize { expected: u32, found: u32 },

    /// An integer does not fit the signed destination type.
    #[error("integer {value} overflows {target}")]
    IntOverflow { value: i128, target: &'static str },

    /// An integer does not fit the unsigned destination type.
    #[error("integer {value} overflows {target}")]
    UintOverflow { value: i128, target: &'static str },

    /// An extension carried a type tag the destination does not accept.
    #[error("extension type mismatch: expected {expected}, found {found}")]
    ExtensionType { expected: i8, found: i8 },

    /// The reserved marker byte `0xc1` was encountered.
    #[error("invalid marker byte 0x{0:02x}")]
    InvalidMarker(u8),

    /// A string value was not valid UTF-8.
    #[error("invalid UTF-8 in string: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// A length does not fit the 32-bit length field of the format.
    #[error("length {len} exceeds the 32-bit wire limit")]
    TooLong { len: usize },

    /// The underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a wire type mismatch for the given marker byte.
    pub fn wire(expected: WireType, marker: u8) -> Self {
        Self::WireType {
            expected,
            found: crate::marker::wire_type(marker),
        }
    }

    /// Check whether this error means more input is needed.
    ///
    /// Streaming callers can buffer more data and retry when this returns
    /// `true`; every other variant is a permanent failure for the input.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Error::Truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_error_classifies_marker() {
        let err = Error::wire(WireType::Map, 0x93);
        assert!(matches!(
            err,
            Error::WireType {
                expected: WireType::Map,
                found: WireType::Array
            }
        ));
        assert_eq!(
            err.to_string(),
            "wire type mismatch: expected map, found array"
        );
    }

    #[test]
    fn test_is_truncated() {
        assert!(Error::Truncated.is_truncated());
        assert!(!Error::InvalidMarker(0xc1).is_truncated());
        assert!(!Error::ArraySize {
            expected: 3,
            found: 2
        }
        .is_truncated());
    }

    #[test]
    fn test_array_size_message() {
        let err = Error::ArraySize {
            expected: 4,
            found: 5,
        };
        assert_eq!(
            err.to_string(),
            "array size mismatch: expected 4 elements, found 5"
        );
    }
}
