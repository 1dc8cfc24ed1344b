//! # msgp-rs-cli
//!
//! CLI library for generating MessagePack codecs from schema documents.
//!
//! This crate provides the core functionality for the `msgp-rs` CLI tool:
//! schema discovery, loading, codec generation and file output.
//!
//! ## Architecture
//!
//! - [`config`] - Configuration management and TOML parsing
//! - [`scanner`] - Schema file discovery and filtering
//! - [`loader`] - Parsing and merging schema documents
//! - [`generator`] - Codec, test and benchmark generation
//! - [`writer`] - File output, dry-run support and freshness checks
//! - [`error`] - Error types and handling

pub mod config;
pub mod error;
pub mod generator;
pub mod loader;
pub mod scanner;
pub mod writer;

pub use config::{Config, ConfigManager};
pub use error::{CliError, CliResult};
pub use generator::{CodecRunner, GeneratedOutput};
pub use loader::load_documents;
pub use scanner::{SchemaFile, SchemaScanner};
pub use writer::{FileStatus, FileWriter};
