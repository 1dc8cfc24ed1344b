//! Generation strategy trait and configuration.
//!
//! This module defines the [`Strategy`] trait every generator implements.
//! A strategy turns one type declaration into one block of Rust source;
//! the driver decides which strategies run and in what order.

use crate::error::GeneratorError;
use crate::ir::{KeyCase, TypeDecl};

/// Trait for code generation strategies.
///
/// Implement this trait to emit another routine over the shape IR.
///
/// # Example
///
/// ```rust
/// use msgp_rs_gen::error::GeneratorError;
/// use msgp_rs_gen::generator::{GeneratorConfig, Strategy};
/// use msgp_rs_gen::ir::TypeDecl;
///
/// struct NameGen;
///
/// impl Strategy for NameGen {
///     fn id(&self) -> &'static str { "name" }
///     fn name(&self) -> &'static str { "Type name constant" }
///
///     fn generate(&self, decl: &TypeDecl, _config: &GeneratorConfig) -> Result<String, GeneratorError> {
///         Ok(format!(
///             "impl {} {{\n    pub const NAME: &'static str = \"{}\";\n}}\n",
///             decl.name, decl.name
///         ))
///     }
/// }
/// ```
pub trait Strategy: Send + Sync {
    /// Short lowercase identifier, e.g. "unmarshal".
    fn id(&self) -> &'static str;

    /// Human-readable name.
    fn name(&self) -> &'static str;

    /// Generate code for one type.
    ///
    /// # Errors
    ///
    /// Returns the first problem found while walking the type's shape. The
    /// caller discards all output for a type whose generation failed.
    fn generate(&self, decl: &TypeDecl, config: &GeneratorConfig) -> Result<String, GeneratorError>;

    /// Code placed once before every generated type.
    fn generate_preamble(
        &self,
        _decls: &[&TypeDecl],
        _config: &GeneratorConfig,
    ) -> Result<String, GeneratorError> {
        Ok(String::new())
    }

    /// Code placed once after every generated type.
    ///
    /// `decls` holds only the types this strategy generated successfully.
    fn generate_postamble(
        &self,
        _decls: &[&TypeDecl],
        _config: &GeneratorConfig,
    ) -> Result<String, GeneratorError> {
        Ok(String::new())
    }
}

/// Generator configuration options.
///
/// Selects which routines are emitted and how the output is formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Emit `Unmarshal` (decode from a byte slice)
    pub unmarshal: bool,

    /// Emit `Marshal` (append to a byte buffer)
    pub marshal: bool,

    /// Emit `Decodable` (decode from a stream)
    pub decode: bool,

    /// Emit `Encodable` (encode to a stream)
    pub encode: bool,

    /// Emit `Sizer` (upper bound of the encoded size)
    pub size: bool,

    /// Emit round-trip tests alongside the codecs
    pub tests: bool,

    /// Key rule for fields without a tag, unless the document sets one
    pub rename_all: KeyCase,

    /// Indentation style
    pub indent: IndentStyle,

    /// Line ending style
    pub line_ending: LineEnding,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            unmarshal: true,
            marshal: true,
            decode: true,
            encode: true,
            size: true,
            tests: true,
            rename_all: KeyCase::default(),
            indent: IndentStyle::default(),
            line_ending: LineEnding::default(),
        }
    }
}

impl GeneratorConfig {
    /// Create a config with every routine enabled.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unmarshal(mut self, enabled: bool) -> Self {
        self.unmarshal = enabled;
        self
    }

    pub fn with_marshal(mut self, enabled: bool) -> Self {
        self.marshal = enabled;
        self
    }

    pub fn with_decode(mut self, enabled: bool) -> Self {
        self.decode = enabled;
        self
    }

    pub fn with_encode(mut self, enabled: bool) -> Self {
        self.encode = enabled;
        self
    }

    pub fn with_size(mut self, enabled: bool) -> Self {
        self.size = enabled;
        self
    }

    pub fn with_tests(mut self, enabled: bool) -> Self {
        self.tests = enabled;
        self
    }

    /// Set the default key rule.
    pub fn with_rename_all(mut self, case: KeyCase) -> Self {
        self.rename_all = case;
        self
    }

    /// Set the indentation style.
    pub fn with_indent(mut self, indent: IndentStyle) -> Self {
        self.indent = indent;
        self
    }

    /// Set the line ending style.
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Whether any codec routine is enabled.
    pub fn any_codec(&self) -> bool {
        self.unmarshal || self.marshal || self.decode || self.encode || self.size
    }
}

/// Indentation style for generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndentStyle {
    /// Use 2 spaces for indentation
    Spaces2,

    /// Use 4 spaces for indentation (rustfmt default)
    #[default]
    Spaces4,

    /// Use tabs for indentation
    Tabs,
}

impl IndentStyle {
    /// Get the indentation string.
    pub fn as_str(&self) -> &str {
        match self {
            IndentStyle::Spaces2 => "  ",
            IndentStyle::Spaces4 => "    ",
            IndentStyle::Tabs => "\t",
        }
    }

    /// Create an indentation string for the given depth.
    pub fn indent(&self, depth: usize) -> String {
        self.as_str().repeat(depth)
    }
}

/// Line ending style for generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// Unix-style line endings (LF)
    #[default]
    Lf,

    /// Windows-style line endings (CRLF)
    CrLf,
}

impl LineEnding {
    /// Get the line ending string.
    pub fn as_str(&self) -> &str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}
