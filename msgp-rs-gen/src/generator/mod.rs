//! Code generation module.
//!
//! Every concern (bytes decode, bytes encode, stream decode, stream encode,
//! size bound, test scaffold, benchmarks) is a [`Strategy`] over the same
//! shape IR. [`CodecGenerator`] runs the enabled strategies for each type in
//! a schema document and assembles one Rust source file.

pub mod decode;
pub mod encode;
pub mod size;
pub mod testgen;
pub mod traits;

pub use decode::{BytesSource, DecodeGen, DecoderGen, ReadSource, StreamSource, UnmarshalGen};
pub use encode::{BufferSink, EncodeGen, EncoderGen, MarshalGen, StreamSink, WriteSink};
pub use size::SizeGen;
pub use testgen::{BenchGen, TestGen};
pub use traits::{GeneratorConfig, IndentStyle, Strategy};

use std::collections::HashSet;

use crate::error::GeneratorError;
use crate::ir::{KeyCase, SchemaDocument, Shape, StructShape, TypeDecl};
use crate::printer::Printer;

/// Header written at the top of every generated file.
pub const FILE_HEADER: &str = "// Code generated by msgp-rs-gen. DO NOT EDIT.";

// =============================================================================
// Shared traversal helpers
// =============================================================================

/// Per-type state shared by a strategy's traversal.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Ctx<'a> {
    pub type_name: &'a str,
    pub case: KeyCase,
}

impl<'a> Ctx<'a> {
    pub fn new(decl: &'a TypeDecl, config: &GeneratorConfig) -> Self {
        Self {
            type_name: &decl.name,
            case: config.rename_all,
        }
    }
}

/// A generated statement, as returned by [`ReadSource`] and [`WriteSink`]
/// implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// Emitted as `expr;`
    Plain(String),
    /// Emitted as `expr?;`
    Try(String),
}

impl Stmt {
    /// Write the statement to `p`.
    pub fn emit(self, p: &mut Printer) {
        match self {
            Stmt::Plain(s) => p.line(format!("{};", s)),
            Stmt::Try(s) => p.read(s),
        }
    }
}

pub(crate) fn emit_all(p: &mut Printer, stmts: Vec<Stmt>) {
    for stmt in stmts {
        stmt.emit(p);
    }
}

/// Record an error for a node no strategy can emit.
///
/// Called by every strategy on entry to each node, so all of them reject
/// the same shapes.
pub(crate) fn check_node(p: &mut Printer, ctx: &Ctx<'_>, shape: &Shape) {
    let reason = match shape {
        Shape::Array(a) if a.size == 0 => Some("arrays must have at least one element".to_string()),
        Shape::Array(a) if u32::try_from(a.size).is_err() => {
            Some(format!("array size {} exceeds the wire limit", a.size))
        }
        Shape::Struct(s) if u32::try_from(s.fields.len()).is_err() => {
            Some("too many struct fields".to_string())
        }
        Shape::Base(b) => match (&b.kind, &b.convert) {
            (crate::ir::BaseKind::Ext, Some(_)) | (crate::ir::BaseKind::Ident(_), Some(_)) => Some(
                format!("field '{}' cannot convert through a {} value", b.varname, b.kind.wire_name()),
            ),
            _ => None,
        },
        _ => None,
    };
    if let Some(reason) = reason {
        p.fail(GeneratorError::unsupported(ctx.type_name, reason));
    }
}

/// Resolve the wire keys of a map-encoded struct, recording collisions.
pub(crate) fn struct_keys(p: &mut Printer, ctx: &Ctx<'_>, s: &StructShape) -> Vec<String> {
    let mut keys: Vec<String> = Vec::with_capacity(s.fields.len());
    for field in &s.fields {
        let key = field.wire_key(ctx.case);
        if let Some(first) = keys.iter().position(|k| *k == key) {
            p.fail(GeneratorError::DuplicateKey {
                type_name: ctx.type_name.to_string(),
                key: key.clone(),
                first: s.fields[first].name.clone(),
                second: field.name.clone(),
            });
        }
        keys.push(key);
    }
    keys
}

/// Pre-encoded bytes written before each field of a map-encoded struct.
///
/// The first entry carries the map header followed by the first key; the
/// others carry one key each. A struct with no fields yields the header
/// alone.
pub(crate) fn map_struct_prefixes(p: &mut Printer, ctx: &Ctx<'_>, keys: &[String]) -> Vec<Vec<u8>> {
    let count = u32::try_from(keys.len()).unwrap_or(u32::MAX);
    let mut header = Vec::new();
    msgp_rs::append_map_header(&mut header, count);
    if keys.is_empty() {
        return vec![header];
    }

    let mut prefixes = Vec::with_capacity(keys.len());
    for (i, key) in keys.iter().enumerate() {
        let mut raw = if i == 0 { header.clone() } else { Vec::new() };
        if let Err(err) = msgp_rs::append_str(&mut raw, key) {
            p.fail(GeneratorError::unsupported(ctx.type_name, err.to_string()));
        }
        prefixes.push(raw);
    }
    prefixes
}

/// Encoded length of a tuple header for `n` fields.
pub(crate) fn array_header_len(n: usize) -> usize {
    let mut raw = Vec::new();
    msgp_rs::append_array_header(&mut raw, u32::try_from(n).unwrap_or(u32::MAX));
    raw.len()
}

// =============================================================================
// Driver
// =============================================================================

/// Summary of one generated type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedType {
    /// Type name
    pub name: String,

    /// Strategies that produced code for it
    pub strategies: Vec<&'static str>,

    /// Types it delegates to
    pub dependencies: Vec<String>,
}

/// Output of one generation run.
#[derive(Debug, Clone, Default)]
pub struct GeneratedFile {
    /// Complete Rust source
    pub content: String,

    /// Types with generated code, in output order
    pub types: Vec<GeneratedType>,

    /// Types skipped because generation failed
    pub errors: Vec<GeneratorError>,
}

impl GeneratedFile {
    /// Whether every declared type was generated.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Names of the generated types.
    pub fn type_names(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.name.as_str()).collect()
    }
}

/// How a run treats types it cannot emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Eligibility {
    /// Report every unsupported type as an error.
    Strict,
    /// Leave out ineligible types without reporting them.
    Scaffold,
}

/// Runs generation strategies over schema documents.
///
/// # Example
///
/// ```rust
/// use msgp_rs_gen::generator::{CodecGenerator, GeneratorConfig};
/// use msgp_rs_gen::ir::{BaseKind, SchemaDocument, Shape, StructField, TypeDecl};
///
/// let doc = SchemaDocument::new(vec![TypeDecl::new(
///     "Point",
///     Shape::structure(vec![
///         StructField::new("x", Shape::base(BaseKind::F64)),
///         StructField::new("y", Shape::base(BaseKind::F64)),
///     ]),
/// )]);
///
/// let file = CodecGenerator::new(GeneratorConfig::default()).generate(&doc);
/// assert!(file.is_complete());
/// assert!(file.content.contains("impl msgp_rs::Unmarshal for Point"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CodecGenerator {
    config: GeneratorConfig,
}

impl CodecGenerator {
    /// Create a generator with the given configuration.
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// The configuration this generator runs with.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Configuration for one document: its key rule overrides the default.
    fn document_config(&self, doc: &SchemaDocument) -> GeneratorConfig {
        let mut config = self.config.clone();
        if let Some(case) = doc.rename_all {
            config.rename_all = case;
        }
        config
    }

    /// The codec strategies enabled by the configuration, in output order.
    pub fn codec_strategies(&self) -> Vec<Box<dyn Strategy>> {
        let mut strategies: Vec<Box<dyn Strategy>> = Vec::new();
        if self.config.unmarshal {
            strategies.push(Box::new(UnmarshalGen::new()));
        }
        if self.config.marshal {
            strategies.push(Box::new(MarshalGen::new()));
        }
        if self.config.decode {
            strategies.push(Box::new(DecoderGen::new()));
        }
        if self.config.encode {
            strategies.push(Box::new(EncoderGen::new()));
        }
        if self.config.size {
            strategies.push(Box::new(SizeGen::new()));
        }
        strategies
    }

    /// Generate codec impls for every type in `doc`.
    ///
    /// A type that cannot be emitted is left out entirely and its error is
    /// reported in [`GeneratedFile::errors`]; the remaining types are still
    /// generated.
    pub fn generate(&self, doc: &SchemaDocument) -> GeneratedFile {
        let strategies = self.codec_strategies();
        self.run(doc, &strategies, Eligibility::Strict)
    }

    /// Generate round-trip tests for every eligible type in `doc`.
    ///
    /// Types that are not printable or not a struct, array, slice or map are
    /// skipped without error.
    pub fn generate_tests(&self, doc: &SchemaDocument) -> GeneratedFile {
        let strategies: Vec<Box<dyn Strategy>> = vec![Box::new(TestGen::new())];
        self.run(doc, &strategies, Eligibility::Scaffold)
    }

    /// Generate criterion benchmarks for every eligible type in `doc`.
    pub fn generate_benches(&self, doc: &SchemaDocument) -> GeneratedFile {
        let strategies: Vec<Box<dyn Strategy>> = vec![Box::new(BenchGen::new())];
        self.run(doc, &strategies, Eligibility::Scaffold)
    }

    fn check_decl(decl: &TypeDecl) -> Result<(), GeneratorError> {
        if !decl.is_printable() {
            return Err(GeneratorError::unsupported(
                &decl.name,
                "type, field or function names are not valid Rust",
            ));
        }
        Ok(())
    }

    fn scaffold_eligible(decl: &TypeDecl) -> bool {
        decl.is_printable()
            && matches!(
                decl.shape,
                Shape::Struct(_) | Shape::Array(_) | Shape::Slice(_) | Shape::Map(_)
            )
    }

    #[tracing::instrument(skip_all, fields(types = doc.types.len(), mode = ?eligibility))]
    fn run(
        &self,
        doc: &SchemaDocument,
        strategies: &[Box<dyn Strategy>],
        eligibility: Eligibility,
    ) -> GeneratedFile {
        let config = self.document_config(doc);
        let mut file = GeneratedFile::default();
        let mut seen = HashSet::new();
        let mut emitted: Vec<&TypeDecl> = Vec::new();
        let mut sections: Vec<String> = Vec::new();

        for decl in &doc.types {
            if !seen.insert(decl.name.as_str()) {
                tracing::warn!(type_name = %decl.name, "duplicate type declaration");
                file.errors.push(GeneratorError::DuplicateType {
                    type_name: decl.name.clone(),
                });
                continue;
            }

            match eligibility {
                Eligibility::Strict => {
                    if let Err(err) = Self::check_decl(decl) {
                        tracing::warn!(type_name = %decl.name, error = %err, "type not generated");
                        file.errors.push(err);
                        continue;
                    }
                }
                Eligibility::Scaffold => {
                    if !Self::scaffold_eligible(decl) {
                        tracing::debug!(type_name = %decl.name, "no scaffold for ineligible type");
                        continue;
                    }
                }
            }

            match Self::generate_type(decl, strategies, &config) {
                Ok(parts) => {
                    tracing::debug!(type_name = %decl.name, parts = parts.len(), "generated type");
                    sections.extend(parts);
                    file.types.push(GeneratedType {
                        name: decl.name.clone(),
                        strategies: strategies.iter().map(|s| s.id()).collect(),
                        dependencies: decl.dependencies(),
                    });
                    emitted.push(decl);
                }
                Err(err) => {
                    tracing::warn!(type_name = %decl.name, error = %err, "type not generated");
                    file.errors.push(err);
                }
            }
        }

        for strategy in strategies {
            match strategy.generate_preamble(&emitted, &config) {
                Ok(code) if !code.is_empty() => sections.insert(0, code),
                Ok(_) => {}
                Err(err) => file.errors.push(err),
            }
            match strategy.generate_postamble(&emitted, &config) {
                Ok(code) if !code.is_empty() => sections.push(code),
                Ok(_) => {}
                Err(err) => file.errors.push(err),
            }
        }

        file.content = Self::assemble(&sections, &config);
        file
    }

    /// Run every strategy for one type; any failure discards the whole type.
    fn generate_type(
        decl: &TypeDecl,
        strategies: &[Box<dyn Strategy>],
        config: &GeneratorConfig,
    ) -> Result<Vec<String>, GeneratorError> {
        strategies
            .iter()
            .map(|strategy| {
                tracing::trace!(type_name = %decl.name, strategy = strategy.id(), "running strategy");
                strategy.generate(decl, config)
            })
            .collect()
    }

    fn assemble(sections: &[String], config: &GeneratorConfig) -> String {
        let mut content = String::from(FILE_HEADER);
        content.push('\n');
        for section in sections {
            content.push('\n');
            content.push_str(section);
        }
        if config.line_ending == traits::LineEnding::CrLf {
            content = content.replace('\n', "\r\n");
        }
        content
    }
}
