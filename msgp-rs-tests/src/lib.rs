//! # msgp-rs-tests
//!
//! Hand-declared types whose codecs are generated at build time from the
//! documents in `schemas/`. The build script writes three files into
//! `OUT_DIR`:
//!
//! - `codecs.rs`, included below
//! - `codecs_test.rs`, included by the test module at the bottom
//! - `codecs_bench.rs`, included by `benches/codecs.rs`
//!
//! Every type derives `Default`, `PartialEq` and `Debug`, which the
//! generated tests and benchmarks require.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use msgp_rs::{Error, Extension, RawExtension};

/// Fixed-width coordinates plus a payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestFast {
    pub lat: f64,
    pub long: f64,
    pub alt: f64,
    pub data: Vec<u8>,
}

/// Tuple-encoded coordinate pair.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position(pub f64, pub f64);

/// Newtype encoded as a bare float.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Celsius(pub f32);

/// Nested struct encoded inline in [`TestType`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestObj {
    pub value_a: String,
    pub value_b: Vec<u8>,
}

/// Exercises every shape kind, including a recursive optional child.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestType {
    pub name: String,
    pub f: Option<f64>,
    pub els: HashMap<String, String>,
    pub obj: TestObj,
    pub child: Option<Box<TestType>>,
    pub kind: Kind,
    pub owner: UserId,
    pub slice1: Vec<String>,
    pub slice_ptr: Vec<Option<String>>,
    pub counts: BTreeMap<String, Vec<u32>>,
    pub grid: [[i16; 3]; 2],
    pub digest: [u8; 16],
    pub color: Rgb,
    pub raw_ext: RawExtension,
    pub position: Position,
    pub tags: Tags,
}

/// Newtype encoded as an array of strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tags(pub Vec<String>);

/// Newtype encoded as a map of delegated values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry(pub HashMap<String, TestFast>);

/// Newtype encoded as a 32-byte binary blob.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Digest(pub [u8; 32]);

/// Tuple with an optional middle element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample(pub u8, pub Option<f32>, pub String);

/// Struct with no fields, encoded as an empty map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Empty {}

/// Enum carried on the wire as an `i32`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Kind {
    #[default]
    Unknown,
    Leaf,
    Branch,
}

impl Kind {
    pub fn to_wire(&self) -> i32 {
        match self {
            Kind::Unknown => 0,
            Kind::Leaf => 1,
            Kind::Branch => 2,
        }
    }

    /// Unrecognized values decode as [`Kind::Unknown`].
    pub fn from_wire(value: i32) -> Self {
        match value {
            1 => Kind::Leaf,
            2 => Kind::Branch,
            _ => Kind::Unknown,
        }
    }
}

/// Identifier carried on the wire as a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Color stored as extension type 7 with a three-byte payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const EXTENSION_TYPE: i8 = 7;
}

impl Extension for Rgb {
    fn extension_type(&self) -> i8 {
        Self::EXTENSION_TYPE
    }

    fn data_len(&self) -> usize {
        3
    }

    fn marshal_binary_to(&self, buf: &mut Vec<u8>) -> msgp_rs::Result<()> {
        buf.extend_from_slice(&[self.r, self.g, self.b]);
        Ok(())
    }

    fn unmarshal_binary(&mut self, _ext_type: i8, data: &[u8]) -> msgp_rs::Result<()> {
        let [r, g, b] = data else {
            return Err(Error::ArraySize {
                expected: 3,
                found: msgp_rs::len_u32(data.len())?,
            });
        };
        *self = Rgb { r: *r, g: *g, b: *b };
        Ok(())
    }
}

include!(concat!(env!("OUT_DIR"), "/codecs.rs"));

#[cfg(test)]
mod generated_tests {
    use super::*;

    include!(concat!(env!("OUT_DIR"), "/codecs_test.rs"));
}
