//! # msgp-rs-gen
//!
//! Generates MessagePack codecs for Rust types.
//!
//! A type's wire layout is described once, as a [`Shape`](ir::Shape) tree.
//! Each generation strategy walks that tree and emits one routine as Rust
//! source that calls into the `msgp-rs` runtime:
//!
//! | Strategy | Emits | Direction |
//! |----------|-------|-----------|
//! | [`UnmarshalGen`](generator::UnmarshalGen) | `impl msgp_rs::Unmarshal` | `&[u8]` to value |
//! | [`MarshalGen`](generator::MarshalGen) | `impl msgp_rs::Marshal` | value to `Vec<u8>` |
//! | [`DecoderGen`](generator::DecoderGen) | `impl msgp_rs::Decodable` | `Read` to value |
//! | [`EncoderGen`](generator::EncoderGen) | `impl msgp_rs::Encodable` | value to `Write` |
//! | [`SizeGen`](generator::SizeGen) | `impl msgp_rs::Sizer` | upper bound of the encoded size |
//! | [`TestGen`](generator::TestGen) | `#[test]` round trips | |
//! | [`BenchGen`](generator::BenchGen) | criterion benchmarks | |
//!
//! ## Quick start
//!
//! ```rust
//! use msgp_rs_gen::generator::{CodecGenerator, GeneratorConfig};
//! use msgp_rs_gen::ir::SchemaDocument;
//!
//! let doc = SchemaDocument::from_json(r#"{
//!     "types": [{
//!         "name": "TestFast",
//!         "shape": {"type": "struct", "fields": [
//!             {"name": "lat", "shape": {"type": "base", "kind": "f64"}},
//!             {"name": "data", "shape": {"type": "base", "kind": "bytes"}}
//!         ]}
//!     }]
//! }"#).unwrap();
//!
//! let file = CodecGenerator::new(GeneratorConfig::default()).generate(&doc);
//! assert!(file.is_complete());
//! assert!(file.content.contains("impl msgp_rs::Marshal for TestFast"));
//! ```
//!
//! The generated file is meant to be `include!`d next to the type
//! definitions, typically from a build script writing into `OUT_DIR`.
//!
//! ## Errors
//!
//! A type that cannot be emitted (a name that is not valid Rust, a
//! zero-length array, two fields sharing a wire key, a conversion on an
//! extension or delegated type) is left out of the generated file and
//! reported in [`GeneratedFile::errors`](generator::GeneratedFile::errors).
//! The other types are still generated.

pub mod error;
pub mod generator;
pub mod ir;
pub mod printer;

pub use error::GeneratorError;
pub use generator::{CodecGenerator, GeneratedFile, GeneratorConfig, Strategy};
pub use ir::{KeyCase, SchemaDocument, Shape, TypeDecl};
