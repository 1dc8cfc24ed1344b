//! Intermediate Representation (IR) module.
//!
//! The IR describes the wire layout of Rust types independently of any one
//! generator. Every generator strategy walks the same tree.

pub mod ident;
pub mod schema;
pub mod shape;

pub use schema::{KeyCase, SchemaDocument, TypeDecl};
pub use shape::{
    ArrayShape, BaseElem, BaseKind, Conversion, MapShape, PointerShape, Shape, SliceShape,
    StructField, StructShape,
};
