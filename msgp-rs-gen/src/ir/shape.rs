//! Shape IR definitions.
//!
//! A [`Shape`] tree describes how one Rust type is laid out for the wire.
//! Every child is owned by its parent. Recursion and sharing go through
//! [`BaseKind::Ident`], which names another type and is resolved by calling
//! that type's own generated routines.
//!
//! Each node also carries the place expression its value lives at in
//! generated code (`self.lat`, `*el3`, `**p5`) and an id used to name the
//! temporaries it needs. Both are assigned by [`TypeDecl`](super::TypeDecl)
//! construction and never serialized.

use serde::{Deserialize, Serialize};

use super::ident;

/// A node in the type IR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// Struct with ordered fields
    Struct(StructShape),

    /// Fixed-size array `[T; N]`
    Array(ArrayShape),

    /// Growable sequence `Vec<T>`
    Slice(SliceShape),

    /// String-keyed map
    Map(MapShape),

    /// Optional value `Option<T>` or `Option<Box<T>>`
    Pointer(PointerShape),

    /// Primitive or delegated leaf
    Base(BaseElem),
}

/// A struct field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructField {
    /// Rust field name, or the position for tuple structs
    pub name: String,

    /// Explicit wire key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Field shape
    pub shape: Shape,
}

/// Struct shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructShape {
    /// Fields in declaration order
    pub fields: Vec<StructField>,

    /// Encode positionally as an array instead of a keyed map
    #[serde(default)]
    pub as_tuple: bool,

    #[serde(skip)]
    pub varname: String,

    #[serde(skip)]
    pub id: usize,
}

/// Fixed-size array shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayShape {
    /// Declared element count
    pub size: usize,

    /// Element shape
    pub element: Box<Shape>,

    #[serde(skip)]
    pub varname: String,

    #[serde(skip)]
    pub id: usize,
}

/// Growable sequence shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceShape {
    /// Element shape
    pub element: Box<Shape>,

    #[serde(skip)]
    pub varname: String,

    #[serde(skip)]
    pub id: usize,
}

/// String-keyed map shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapShape {
    /// Value shape
    pub value: Box<Shape>,

    /// `BTreeMap` instead of `HashMap`
    #[serde(default)]
    pub ordered: bool,

    #[serde(skip)]
    pub varname: String,

    #[serde(skip)]
    pub id: usize,
}

/// Optional value shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerShape {
    /// Shape of the present value
    pub referent: Box<Shape>,

    /// `Option<Box<T>>` instead of `Option<T>`
    #[serde(default)]
    pub boxed: bool,

    #[serde(skip)]
    pub varname: String,

    #[serde(skip)]
    pub id: usize,
}

/// Leaf shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseElem {
    /// Wire kind
    pub kind: BaseKind,

    /// Conversion between the declared field type and the wire kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convert: Option<Conversion>,

    #[serde(skip)]
    pub varname: String,

    #[serde(skip)]
    pub id: usize,
}

/// Conversion functions for a field whose declared type is not a wire kind.
///
/// `to_base` is called as `to_base(&value) -> Base` and `from_base` as
/// `from_base(base) -> Declared`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    pub to_base: String,
    pub from_base: String,
}

/// Wire kind of a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Bool,
    /// `String`
    Str,
    /// `Vec<u8>`
    Bytes,
    /// A type implementing `msgp_rs::Extension`
    Ext,
    /// Another type with its own generated codec
    Ident(String),
}

impl BaseKind {
    /// Suffix of the runtime functions for this kind (`read_{suffix}_bytes`,
    /// `append_{suffix}`, `write_{suffix}`).
    pub fn wire_name(&self) -> &str {
        match self {
            BaseKind::I8 => "i8",
            BaseKind::I16 => "i16",
            BaseKind::I32 => "i32",
            BaseKind::I64 => "i64",
            BaseKind::U8 => "u8",
            BaseKind::U16 => "u16",
            BaseKind::U32 => "u32",
            BaseKind::U64 => "u64",
            BaseKind::F32 => "f32",
            BaseKind::F64 => "f64",
            BaseKind::Bool => "bool",
            BaseKind::Str => "str",
            BaseKind::Bytes => "bytes",
            BaseKind::Ext => "extension",
            BaseKind::Ident(name) => name,
        }
    }

    /// Rust type holding a value of this kind.
    pub fn rust_type(&self) -> &str {
        match self {
            BaseKind::Str => "String",
            BaseKind::Bytes => "Vec<u8>",
            BaseKind::Ext => "msgp_rs::RawExtension",
            other => other.wire_name(),
        }
    }

    /// Name of the runtime constant bounding this kind's encoded size.
    pub fn size_const(&self) -> Option<&'static str> {
        let name = match self {
            BaseKind::I8 => "I8_SIZE",
            BaseKind::I16 => "I16_SIZE",
            BaseKind::I32 => "I32_SIZE",
            BaseKind::I64 => "I64_SIZE",
            BaseKind::U8 => "U8_SIZE",
            BaseKind::U16 => "U16_SIZE",
            BaseKind::U32 => "U32_SIZE",
            BaseKind::U64 => "U64_SIZE",
            BaseKind::F32 => "F32_SIZE",
            BaseKind::F64 => "F64_SIZE",
            BaseKind::Bool => "BOOL_SIZE",
            BaseKind::Str | BaseKind::Bytes | BaseKind::Ext | BaseKind::Ident(_) => return None,
        };
        Some(name)
    }

    /// Whether values are passed by copy rather than by reference.
    pub fn is_scalar(&self) -> bool {
        self.size_const().is_some()
    }
}

// =============================================================================
// Construction
// =============================================================================

impl Shape {
    /// Create a leaf of the given kind.
    pub fn base(kind: BaseKind) -> Self {
        Shape::Base(BaseElem {
            kind,
            convert: None,
            varname: String::new(),
            id: 0,
        })
    }

    /// Create a leaf stored as another type and converted at the boundary.
    pub fn converted(
        kind: BaseKind,
        to_base: impl Into<String>,
        from_base: impl Into<String>,
    ) -> Self {
        Shape::Base(BaseElem {
            kind,
            convert: Some(Conversion {
                to_base: to_base.into(),
                from_base: from_base.into(),
            }),
            varname: String::new(),
            id: 0,
        })
    }

    /// Create a leaf that delegates to another type's codec.
    pub fn ident(name: impl Into<String>) -> Self {
        Shape::base(BaseKind::Ident(name.into()))
    }

    /// Create a map-encoded struct.
    pub fn structure(fields: Vec<StructField>) -> Self {
        Shape::Struct(StructShape {
            fields,
            ..StructShape::default()
        })
    }

    /// Create a tuple-encoded struct.
    pub fn tuple(fields: Vec<StructField>) -> Self {
        Shape::Struct(StructShape {
            fields,
            as_tuple: true,
            ..StructShape::default()
        })
    }

    /// Create a fixed-size array.
    pub fn array(size: usize, element: Shape) -> Self {
        Shape::Array(ArrayShape {
            size,
            element: Box::new(element),
            varname: String::new(),
            id: 0,
        })
    }

    /// Create a growable sequence.
    pub fn slice(element: Shape) -> Self {
        Shape::Slice(SliceShape {
            element: Box::new(element),
            varname: String::new(),
            id: 0,
        })
    }

    /// Create a `HashMap<String, _>`.
    pub fn map(value: Shape) -> Self {
        Shape::Map(MapShape {
            value: Box::new(value),
            ordered: false,
            varname: String::new(),
            id: 0,
        })
    }

    /// Create a `BTreeMap<String, _>`.
    pub fn ordered_map(value: Shape) -> Self {
        Shape::Map(MapShape {
            value: Box::new(value),
            ordered: true,
            varname: String::new(),
            id: 0,
        })
    }

    /// Create an `Option<T>`.
    pub fn option(referent: Shape) -> Self {
        Shape::Pointer(PointerShape {
            referent: Box::new(referent),
            boxed: false,
            varname: String::new(),
            id: 0,
        })
    }

    /// Create an `Option<Box<T>>`.
    pub fn boxed_option(referent: Shape) -> Self {
        Shape::Pointer(PointerShape {
            referent: Box::new(referent),
            boxed: true,
            varname: String::new(),
            id: 0,
        })
    }
}

impl StructField {
    /// Create a field keyed by the default rule.
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            tag: None,
            shape,
        }
    }

    /// Set an explicit wire key.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

// =============================================================================
// Naming
// =============================================================================

/// Access a field of the value at `place`.
pub fn field_place(place: &str, field: &str) -> String {
    format!("{}.{}", receiver(place), ident::field_ident(field))
}

/// Render `place` so a method call or field access binds to the whole place.
pub fn receiver(place: &str) -> String {
    if place.starts_with('*') {
        format!("({})", place)
    } else {
        place.to_string()
    }
}

impl Shape {
    /// Place expression of this node's value in generated code.
    pub fn varname(&self) -> &str {
        match self {
            Shape::Struct(s) => &s.varname,
            Shape::Array(a) => &a.varname,
            Shape::Slice(s) => &s.varname,
            Shape::Map(m) => &m.varname,
            Shape::Pointer(p) => &p.varname,
            Shape::Base(b) => &b.varname,
        }
    }

    /// Identifier that keeps this node's temporaries distinct from others.
    pub fn id(&self) -> usize {
        match self {
            Shape::Struct(s) => s.id,
            Shape::Array(a) => a.id,
            Shape::Slice(s) => s.id,
            Shape::Map(m) => m.id,
            Shape::Pointer(p) => p.id,
            Shape::Base(b) => b.id,
        }
    }

    /// Assign places and ids to this node and its descendants.
    pub(crate) fn bind(&mut self, place: String, next: &mut usize) {
        let id = *next;
        *next += 1;
        match self {
            Shape::Struct(s) => {
                for field in &mut s.fields {
                    let child = field_place(&place, &field.name);
                    field.shape.bind(child, next);
                }
                s.varname = place;
                s.id = id;
            }
            Shape::Array(a) => {
                a.element.bind(format!("*el{}", id), next);
                a.varname = place;
                a.id = id;
            }
            Shape::Slice(s) => {
                s.element.bind(format!("*el{}", id), next);
                s.varname = place;
                s.id = id;
            }
            Shape::Map(m) => {
                m.value.bind(format!("*v{}", id), next);
                m.varname = place;
                m.id = id;
            }
            Shape::Pointer(p) => {
                let deref = if p.boxed { "**" } else { "*" };
                p.referent.bind(format!("{}p{}", deref, id), next);
                p.varname = place;
                p.id = id;
            }
            Shape::Base(b) => {
                b.varname = place;
                b.id = id;
            }
        }
    }

    /// Whether every name this shape puts into generated code is valid Rust.
    pub fn is_printable(&self) -> bool {
        match self {
            Shape::Struct(s) => s
                .fields
                .iter()
                .all(|f| ident::is_field_name(&f.name) && f.shape.is_printable()),
            Shape::Array(a) => a.element.is_printable(),
            Shape::Slice(s) => s.element.is_printable(),
            Shape::Map(m) => m.value.is_printable(),
            Shape::Pointer(p) => p.referent.is_printable(),
            Shape::Base(b) => b.is_printable(),
        }
    }

    /// Names of the types this shape delegates to.
    pub fn dependencies(&self) -> Vec<String> {
        let mut deps = Vec::new();
        self.collect_dependencies(&mut deps);
        deps
    }

    fn collect_dependencies(&self, deps: &mut Vec<String>) {
        match self {
            Shape::Struct(s) => {
                for field in &s.fields {
                    field.shape.collect_dependencies(deps);
                }
            }
            Shape::Array(a) => a.element.collect_dependencies(deps),
            Shape::Slice(s) => s.element.collect_dependencies(deps),
            Shape::Map(m) => m.value.collect_dependencies(deps),
            Shape::Pointer(p) => p.referent.collect_dependencies(deps),
            Shape::Base(BaseElem {
                kind: BaseKind::Ident(name),
                ..
            }) => {
                if !deps.contains(name) {
                    deps.push(name.clone());
                }
            }
            Shape::Base(_) => {}
        }
    }
}

impl StructShape {
    pub fn size_var(&self) -> String {
        format!("sz{}", self.id)
    }

    pub fn key_var(&self) -> String {
        format!("field{}", self.id)
    }
}

impl ArrayShape {
    pub fn size_var(&self) -> String {
        format!("sz{}", self.id)
    }

    pub fn elem_var(&self) -> String {
        format!("el{}", self.id)
    }

    /// `[u8; N]`, encoded as a single binary blob.
    pub fn is_byte_array(&self) -> bool {
        matches!(
            self.element.as_ref(),
            Shape::Base(BaseElem {
                kind: BaseKind::U8,
                convert: None,
                ..
            })
        )
    }
}

impl SliceShape {
    pub fn size_var(&self) -> String {
        format!("sz{}", self.id)
    }

    pub fn elem_var(&self) -> String {
        format!("el{}", self.id)
    }

    pub fn idx_var(&self) -> String {
        format!("i{}", self.id)
    }
}

impl MapShape {
    pub fn size_var(&self) -> String {
        format!("sz{}", self.id)
    }

    pub fn key_var(&self) -> String {
        format!("k{}", self.id)
    }

    pub fn value_var(&self) -> String {
        format!("v{}", self.id)
    }
}

impl PointerShape {
    pub fn ref_var(&self) -> String {
        format!("p{}", self.id)
    }
}

impl BaseElem {
    pub fn tmp_var(&self) -> String {
        format!("tmp{}", self.id)
    }

    fn is_printable(&self) -> bool {
        let kind_ok = match &self.kind {
            BaseKind::Ident(name) => ident::is_path(name),
            _ => true,
        };
        let convert_ok = self
            .convert
            .as_ref()
            .map_or(true, |c| ident::is_path(&c.to_base) && ident::is_path(&c.from_base));
        kind_ok && convert_ok
    }
}
