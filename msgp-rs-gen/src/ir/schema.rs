//! Type declarations and schema documents.
//!
//! A schema document is the serialized input to the generator: a list of
//! named types and their shapes, plus the rule that derives wire keys for
//! fields without an explicit tag.

use std::fmt;
use std::str::FromStr;

use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};

use super::ident;
use super::shape::{Shape, StructField};
use crate::error::GeneratorError;

/// A named type and its shape.
///
/// Places and temporaries are bound when the declaration is constructed and
/// stay fixed for every generator that reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TypeDeclRepr")]
pub struct TypeDecl {
    /// Rust type name or path
    pub name: String,

    /// Wire shape of the type
    pub shape: Shape,
}

#[derive(Deserialize)]
struct TypeDeclRepr {
    name: String,
    shape: Shape,
}

impl From<TypeDeclRepr> for TypeDecl {
    fn from(repr: TypeDeclRepr) -> Self {
        TypeDecl::new(repr.name, repr.shape)
    }
}

impl TypeDecl {
    /// Create a declaration and bind its places.
    ///
    /// A struct shape is rooted at `self`. Any other top-level shape
    /// describes a newtype `struct Name(T)` encoded as its inner value, and
    /// is rooted at `self.0`.
    pub fn new(name: impl Into<String>, mut shape: Shape) -> Self {
        let root = match shape {
            Shape::Struct(_) => "self",
            _ => "self.0",
        };
        shape.bind(root.to_string(), &mut 0);
        Self {
            name: name.into(),
            shape,
        }
    }

    /// Whether the type can appear in generated code.
    pub fn is_printable(&self) -> bool {
        ident::is_ident(&self.name) && self.shape.is_printable()
    }

    /// Names of the types this declaration delegates to.
    pub fn dependencies(&self) -> Vec<String> {
        self.shape.dependencies()
    }
}

/// Rule deriving a field's wire key from its name when no tag is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeyCase {
    /// The field name unchanged
    #[default]
    #[serde(rename = "verbatim")]
    Verbatim,

    /// camelCase
    #[serde(rename = "camelCase")]
    CamelCase,

    /// snake_case
    #[serde(rename = "snake_case")]
    SnakeCase,

    /// PascalCase
    #[serde(rename = "PascalCase")]
    PascalCase,

    /// SCREAMING_SNAKE_CASE
    #[serde(rename = "SCREAMING_SNAKE_CASE")]
    ScreamingSnakeCase,

    /// kebab-case
    #[serde(rename = "kebab-case")]
    KebabCase,
}

impl KeyCase {
    /// Apply the rule to a field name.
    pub fn apply(&self, name: &str) -> String {
        match self {
            KeyCase::Verbatim => name.to_string(),
            KeyCase::CamelCase => name.to_case(Case::Camel),
            KeyCase::SnakeCase => name.to_case(Case::Snake),
            KeyCase::PascalCase => name.to_case(Case::Pascal),
            KeyCase::ScreamingSnakeCase => name.to_case(Case::UpperSnake),
            KeyCase::KebabCase => name.to_case(Case::Kebab),
        }
    }

    /// The spelling used in schema documents and configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyCase::Verbatim => "verbatim",
            KeyCase::CamelCase => "camelCase",
            KeyCase::SnakeCase => "snake_case",
            KeyCase::PascalCase => "PascalCase",
            KeyCase::ScreamingSnakeCase => "SCREAMING_SNAKE_CASE",
            KeyCase::KebabCase => "kebab-case",
        }
    }
}

impl fmt::Display for KeyCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyCase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let case = match s {
            "verbatim" => KeyCase::Verbatim,
            "camelCase" => KeyCase::CamelCase,
            "snake_case" => KeyCase::SnakeCase,
            "PascalCase" => KeyCase::PascalCase,
            "SCREAMING_SNAKE_CASE" => KeyCase::ScreamingSnakeCase,
            "kebab-case" => KeyCase::KebabCase,
            other => return Err(format!("unknown key case '{}'", other)),
        };
        Ok(case)
    }
}

impl StructField {
    /// The key this field is written under in map-encoded structs.
    pub fn wire_key(&self, case: KeyCase) -> String {
        match &self.tag {
            Some(tag) => tag.clone(),
            None => case.apply(&self.name),
        }
    }
}

/// A set of type declarations read from one schema file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// Key rule for this document; falls back to the generator's setting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename_all: Option<KeyCase>,

    /// Declared types, in output order
    pub types: Vec<TypeDecl>,
}

impl SchemaDocument {
    /// Create a document from declarations.
    pub fn new(types: Vec<TypeDecl>) -> Self {
        Self {
            rename_all: None,
            types,
        }
    }

    /// Set the key rule.
    pub fn with_rename_all(mut self, case: KeyCase) -> Self {
        self.rename_all = Some(case);
        self
    }

    /// Parse a document from JSON.
    pub fn from_json(json: &str) -> Result<Self, GeneratorError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the document to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, GeneratorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the document's key rule into the tag of every untagged field
    /// of a map-encoded struct, then clear the rule.
    ///
    /// Wire keys are unchanged, but no longer depend on the document.
    pub fn pin_keys(&mut self) {
        if let Some(case) = self.rename_all.take() {
            for decl in &mut self.types {
                pin_shape_keys(&mut decl.shape, case);
            }
        }
    }

    /// Append the declarations of another document.
    ///
    /// When the two documents use different key rules, both are pinned
    /// first so every field keeps the key its own document gave it.
    pub fn merge(&mut self, mut other: SchemaDocument) {
        if self.types.is_empty() && self.rename_all.is_none() {
            self.rename_all = other.rename_all;
        } else if self.rename_all != other.rename_all {
            self.pin_keys();
            other.pin_keys();
        }
        self.types.extend(other.types);
    }
}

fn pin_shape_keys(shape: &mut Shape, case: KeyCase) {
    match shape {
        Shape::Struct(s) => {
            let keyed = !s.as_tuple;
            for field in &mut s.fields {
                if keyed && field.tag.is_none() {
                    field.tag = Some(case.apply(&field.name));
                }
                pin_shape_keys(&mut field.shape, case);
            }
        }
        Shape::Array(a) => pin_shape_keys(&mut a.element, case),
        Shape::Slice(s) => pin_shape_keys(&mut s.element, case),
        Shape::Map(m) => pin_shape_keys(&mut m.value, case),
        Shape::Pointer(p) => pin_shape_keys(&mut p.referent, case),
        Shape::Base(_) => {}
    }
}
