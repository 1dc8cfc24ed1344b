//! Decode strategies.
//!
//! One traversal emits both decoders. [`ReadSource`] supplies the
//! statements that differ between reading from a byte slice
//! (`Unmarshal::unmarshal_msg`) and reading from a stream
//! (`Decodable::decode_msg`); everything else is shared.
//!
//! Decoding overwrites the receiver in place:
//!
//! - map-encoded structs accept keys in any order and skip unknown ones
//! - tuple structs and fixed arrays require the exact element count
//! - sequences are resized to the decoded length and maps are cleared
//! - an absent optional (`nil`) sets the field to `None`

use std::marker::PhantomData;

use super::{check_node, emit_all, struct_keys, Ctx, GeneratorConfig, Stmt, Strategy};
use crate::error::GeneratorError;
use crate::ir::ident::type_ident;
use crate::ir::shape::receiver;
use crate::ir::{
    ArrayShape, BaseElem, BaseKind, MapShape, PointerShape, Shape, SliceShape, StructShape,
    TypeDecl,
};
use crate::printer::{byte_str_literal, Printer};

/// Where a decoder reads from.
pub trait ReadSource: Send + Sync {
    /// Strategy id
    const ID: &'static str;
    /// Strategy name
    const NAME: &'static str;
    /// Implemented trait
    const TRAIT: &'static str;
    /// Method signature
    const SIGNATURE: &'static str;
    /// Final expression of the method
    const RETURN: &'static str;
    /// Whether header counts are already checked against the remaining
    /// input, so containers may be sized from them up front.
    const BOUNDED_COUNTS: bool;

    /// Bind the element count of an array to `var`.
    fn array_header(var: &str) -> Vec<Stmt>;

    /// Bind the entry count of a map to `var`.
    fn map_header(var: &str) -> Vec<Stmt>;

    /// Declaration needed before a struct's key loop.
    fn key_buffer(var: &str) -> Option<String>;

    /// Bind the next struct key to `var`.
    fn field_key(var: &str) -> Vec<Stmt>;

    /// Expression matched against byte string key literals.
    fn key_scrutinee(var: &str) -> String;

    /// Bind the next map key to `var`.
    fn map_key(var: &str) -> Vec<Stmt>;

    /// Owned `String` for a key bound by [`ReadSource::map_key`].
    fn owned_key(var: &str) -> String;

    /// Skip one value.
    fn skip() -> Stmt;

    /// Condition that holds when the next value is nil.
    fn is_nil() -> String;

    /// Consume a nil.
    fn read_nil() -> Stmt;

    /// Read a scalar into `place`.
    fn scalar(kind: &BaseKind, place: &str) -> Stmt;

    /// Bind a scalar to a new variable `var`.
    fn scalar_temp(kind: &BaseKind, var: &str) -> Vec<Stmt>;

    /// Read a string, byte string or extension into `place`, reusing its
    /// storage.
    fn into_place(kind: &BaseKind, place: &str) -> Stmt;

    /// Read a binary blob that must fill a byte array at `place`.
    fn exact_bytes(place: &str) -> Stmt;

    /// Decode `place` with its own generated routine.
    fn delegate(place: &str) -> Stmt;
}

/// Reads from a `&[u8]`, advancing `bts`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesSource;

impl ReadSource for BytesSource {
    const ID: &'static str = "unmarshal";
    const NAME: &'static str = "Byte slice decoder";
    const TRAIT: &'static str = "msgp_rs::Unmarshal";
    const SIGNATURE: &'static str =
        "fn unmarshal_msg<'a>(&mut self, mut bts: &'a [u8]) -> Result<&'a [u8], msgp_rs::Error>";
    const RETURN: &'static str = "Ok(bts)";
    const BOUNDED_COUNTS: bool = true;

    fn array_header(var: &str) -> Vec<Stmt> {
        vec![
            Stmt::Try(format!(
                "let ({}, rest) = msgp_rs::read_array_header_bytes(bts)",
                var
            )),
            Stmt::Plain("bts = rest".to_string()),
        ]
    }

    fn map_header(var: &str) -> Vec<Stmt> {
        vec![
            Stmt::Try(format!("let ({}, rest) = msgp_rs::read_map_header_bytes(bts)", var)),
            Stmt::Plain("bts = rest".to_string()),
        ]
    }

    fn key_buffer(_var: &str) -> Option<String> {
        None
    }

    fn field_key(var: &str) -> Vec<Stmt> {
        vec![
            Stmt::Try(format!("let ({}, rest) = msgp_rs::read_map_key_zc(bts)", var)),
            Stmt::Plain("bts = rest".to_string()),
        ]
    }

    fn key_scrutinee(var: &str) -> String {
        var.to_string()
    }

    fn map_key(var: &str) -> Vec<Stmt> {
        vec![
            Stmt::Try(format!("let ({}, rest) = msgp_rs::read_str_zc(bts)", var)),
            Stmt::Plain("bts = rest".to_string()),
        ]
    }

    fn owned_key(var: &str) -> String {
        format!("{}.to_owned()", var)
    }

    fn skip() -> Stmt {
        Stmt::Try("bts = msgp_rs::skip(bts)".to_string())
    }

    fn is_nil() -> String {
        "msgp_rs::is_nil(bts)".to_string()
    }

    fn read_nil() -> Stmt {
        Stmt::Try("bts = msgp_rs::read_nil_bytes(bts)".to_string())
    }

    fn scalar(kind: &BaseKind, place: &str) -> Stmt {
        Stmt::Try(format!(
            "({}, bts) = msgp_rs::read_{}_bytes(bts)",
            place,
            kind.wire_name()
        ))
    }

    fn scalar_temp(kind: &BaseKind, var: &str) -> Vec<Stmt> {
        vec![
            Stmt::Try(format!(
                "let ({}, rest) = msgp_rs::read_{}_bytes(bts)",
                var,
                kind.wire_name()
            )),
            Stmt::Plain("bts = rest".to_string()),
        ]
    }

    fn into_place(kind: &BaseKind, place: &str) -> Stmt {
        let func = match kind {
            BaseKind::Str => "read_string_into",
            BaseKind::Bytes => "read_bytes_into",
            _ => "read_extension_bytes",
        };
        Stmt::Try(format!("bts = msgp_rs::{}(bts, &mut {})", func, place))
    }

    fn exact_bytes(place: &str) -> Stmt {
        Stmt::Try(format!("bts = msgp_rs::read_exact_bytes(bts, &mut {})", place))
    }

    fn delegate(place: &str) -> Stmt {
        Stmt::Try(format!(
            "bts = msgp_rs::Unmarshal::unmarshal_msg(&mut {}, bts)",
            place
        ))
    }
}

/// Reads from a `msgp_rs::Reader` named `dc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamSource;

impl ReadSource for StreamSource {
    const ID: &'static str = "decode";
    const NAME: &'static str = "Stream decoder";
    const TRAIT: &'static str = "msgp_rs::Decodable";
    const SIGNATURE: &'static str = "fn decode_msg<R: std::io::Read>(&mut self, dc: &mut msgp_rs::Reader<R>) -> Result<(), msgp_rs::Error>";
    const RETURN: &'static str = "Ok(())";
    const BOUNDED_COUNTS: bool = false;

    fn array_header(var: &str) -> Vec<Stmt> {
        vec![Stmt::Try(format!("let {} = dc.read_array_header()", var))]
    }

    fn map_header(var: &str) -> Vec<Stmt> {
        vec![Stmt::Try(format!("let {} = dc.read_map_header()", var))]
    }

    fn key_buffer(var: &str) -> Option<String> {
        Some(format!("let mut {} = Vec::new();", var))
    }

    fn field_key(var: &str) -> Vec<Stmt> {
        vec![Stmt::Try(format!("dc.read_map_key(&mut {})", var))]
    }

    fn key_scrutinee(var: &str) -> String {
        format!("{}.as_slice()", var)
    }

    fn map_key(var: &str) -> Vec<Stmt> {
        vec![Stmt::Try(format!("let {} = dc.read_string()", var))]
    }

    fn owned_key(var: &str) -> String {
        var.to_string()
    }

    fn skip() -> Stmt {
        Stmt::Try("dc.skip()".to_string())
    }

    fn is_nil() -> String {
        "dc.is_nil()?".to_string()
    }

    fn read_nil() -> Stmt {
        Stmt::Try("dc.read_nil()".to_string())
    }

    fn scalar(kind: &BaseKind, place: &str) -> Stmt {
        Stmt::Try(format!("{} = dc.read_{}()", place, kind.wire_name()))
    }

    fn scalar_temp(kind: &BaseKind, var: &str) -> Vec<Stmt> {
        vec![Stmt::Try(format!("let {} = dc.read_{}()", var, kind.wire_name()))]
    }

    fn into_place(kind: &BaseKind, place: &str) -> Stmt {
        let method = match kind {
            BaseKind::Str => "read_string_into",
            BaseKind::Bytes => "read_bytes_into",
            _ => "read_extension",
        };
        Stmt::Try(format!("dc.{}(&mut {})", method, place))
    }

    fn exact_bytes(place: &str) -> Stmt {
        Stmt::Try(format!("dc.read_exact_bytes(&mut {})", place))
    }

    fn delegate(place: &str) -> Stmt {
        Stmt::Try(format!("msgp_rs::Decodable::decode_msg(&mut {}, dc)", place))
    }
}

/// Decoder generator over a [`ReadSource`].
#[derive(Debug, Clone, Copy)]
pub struct DecodeGen<S> {
    source: PhantomData<S>,
}

/// Generates `msgp_rs::Unmarshal` impls.
pub type UnmarshalGen = DecodeGen<BytesSource>;

/// Generates `msgp_rs::Decodable` impls.
pub type DecoderGen = DecodeGen<StreamSource>;

impl<S: ReadSource> Default for DecodeGen<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ReadSource> DecodeGen<S> {
    pub fn new() -> Self {
        Self {
            source: PhantomData,
        }
    }

    fn gen_shape(&self, p: &mut Printer, ctx: &Ctx<'_>, shape: &Shape) {
        if !p.ok() {
            return;
        }
        check_node(p, ctx, shape);
        match shape {
            Shape::Struct(s) if s.as_tuple => self.gen_tuple(p, ctx, s),
            Shape::Struct(s) => self.gen_map_struct(p, ctx, s),
            Shape::Array(a) => self.gen_array(p, ctx, a),
            Shape::Slice(s) => self.gen_slice(p, ctx, s),
            Shape::Map(m) => self.gen_map(p, ctx, m),
            Shape::Pointer(ptr) => self.gen_pointer(p, ctx, ptr),
            Shape::Base(b) => self.gen_base(p, b),
        }
    }

    fn gen_tuple(&self, p: &mut Printer, ctx: &Ctx<'_>, s: &StructShape) {
        let sz = s.size_var();
        emit_all(p, S::array_header(&sz));
        p.array_check(&sz, s.fields.len());
        for field in &s.fields {
            self.gen_shape(p, ctx, &field.shape);
        }
    }

    fn gen_map_struct(&self, p: &mut Printer, ctx: &Ctx<'_>, s: &StructShape) {
        let keys = struct_keys(p, ctx, s);
        let sz = s.size_var();
        let key = s.key_var();

        emit_all(p, S::map_header(&sz));
        if let Some(decl) = S::key_buffer(&key) {
            p.line(decl);
        }
        p.open(format!("for _ in 0..{}", sz));
        emit_all(p, S::field_key(&key));
        p.open(format!("match {}", S::key_scrutinee(&key)));
        for (field, wire_key) in s.fields.iter().zip(&keys) {
            p.open(format!("{} =>", byte_str_literal(wire_key.as_bytes())));
            self.gen_shape(p, ctx, &field.shape);
            p.close();
        }
        p.open("_ =>");
        S::skip().emit(p);
        p.close();
        p.close();
        p.close();
    }

    fn gen_array(&self, p: &mut Printer, ctx: &Ctx<'_>, a: &ArrayShape) {
        if a.is_byte_array() {
            S::exact_bytes(&a.varname).emit(p);
            return;
        }
        let sz = a.size_var();
        emit_all(p, S::array_header(&sz));
        p.array_check(&sz, a.size);
        p.open(format!(
            "for {} in {}.iter_mut()",
            a.elem_var(),
            receiver(&a.varname)
        ));
        self.gen_shape(p, ctx, &a.element);
        p.close();
    }

    fn gen_slice(&self, p: &mut Printer, ctx: &Ctx<'_>, s: &SliceShape) {
        let sz = s.size_var();
        let recv = receiver(&s.varname);
        emit_all(p, S::array_header(&sz));
        if S::BOUNDED_COUNTS {
            p.line(format!(
                "{}.resize_with({} as usize, Default::default);",
                recv, sz
            ));
            p.open(format!("for {} in {}.iter_mut()", s.elem_var(), recv));
        } else {
            // Grow one element at a time so a forged count cannot allocate
            // before the elements arrive.
            let idx = s.idx_var();
            p.line(format!("{}.truncate({} as usize);", recv, sz));
            p.open(format!("for {} in 0..{} as usize", idx, sz));
            p.open(format!("if {} == {}.len()", idx, recv));
            p.line(format!("{}.push(Default::default());", recv));
            p.close();
            p.line(format!("let {} = &mut {}[{}];", s.elem_var(), recv, idx));
        }
        self.gen_shape(p, ctx, &s.element);
        p.close();
    }

    fn gen_map(&self, p: &mut Printer, ctx: &Ctx<'_>, m: &MapShape) {
        let sz = m.size_var();
        let key = m.key_var();
        let recv = receiver(&m.varname);

        emit_all(p, S::map_header(&sz));
        p.line(format!("{}.clear();", recv));
        if !m.ordered && S::BOUNDED_COUNTS {
            p.line(format!("{}.reserve({} as usize);", recv, sz));
        }
        p.open(format!("for _ in 0..{}", sz));
        emit_all(p, S::map_key(&key));
        p.line(format!(
            "let {} = {}.entry({}).or_default();",
            m.value_var(),
            recv,
            S::owned_key(&key)
        ));
        self.gen_shape(p, ctx, &m.value);
        p.close();
    }

    fn gen_pointer(&self, p: &mut Printer, ctx: &Ctx<'_>, ptr: &PointerShape) {
        p.open(format!("if {}", S::is_nil()));
        S::read_nil().emit(p);
        p.line(format!("{} = None;", ptr.varname));
        p.reopen("else");
        p.line(format!(
            "let {} = {}.get_or_insert_with(Default::default);",
            ptr.ref_var(),
            receiver(&ptr.varname)
        ));
        self.gen_shape(p, ctx, &ptr.referent);
        p.close();
    }

    fn gen_base(&self, p: &mut Printer, b: &BaseElem) {
        let place = &b.varname;
        match (&b.kind, &b.convert) {
            (kind, Some(conv)) => {
                let tmp = b.tmp_var();
                p.open("");
                if kind.is_scalar() {
                    emit_all(p, S::scalar_temp(kind, &tmp));
                } else {
                    p.declare(&tmp, kind.rust_type());
                    S::into_place(kind, &tmp).emit(p);
                }
                p.line(format!("{} = {}({});", place, conv.from_base, tmp));
                p.close();
            }
            (BaseKind::Ident(_), None) => S::delegate(place).emit(p),
            (BaseKind::Str | BaseKind::Bytes | BaseKind::Ext, None) => {
                S::into_place(&b.kind, place).emit(p)
            }
            (kind, None) => S::scalar(kind, place).emit(p),
        }
    }
}

impl<S: ReadSource> Strategy for DecodeGen<S> {
    fn id(&self) -> &'static str {
        S::ID
    }

    fn name(&self) -> &'static str {
        S::NAME
    }

    fn generate(&self, decl: &TypeDecl, config: &GeneratorConfig) -> Result<String, GeneratorError> {
        let ctx = Ctx::new(decl, config);
        let mut p = Printer::new(config.indent);

        p.open(format!("impl {} for {}", S::TRAIT, type_ident(&decl.name)));
        p.open(S::SIGNATURE);
        self.gen_shape(&mut p, &ctx, &decl.shape);
        p.line(S::RETURN);
        p.close();
        p.close();
        p.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::StructField;

    fn unmarshal(decl: &TypeDecl) -> String {
        UnmarshalGen::new()
            .generate(decl, &GeneratorConfig::default())
            .unwrap()
    }

    fn decode(decl: &TypeDecl) -> String {
        DecoderGen::new()
            .generate(decl, &GeneratorConfig::default())
            .unwrap()
    }

    fn test_fast() -> TypeDecl {
        TypeDecl::new(
            "TestFast",
            Shape::structure(vec![
                StructField::new("lat", Shape::base(BaseKind::F64)),
                StructField::new("data", Shape::base(BaseKind::Bytes)),
            ]),
        )
    }

    // =========================================================================
    // Structs
    // =========================================================================

    #[test]
    fn test_unmarshal_map_struct() {
        let out = unmarshal(&test_fast());

        assert!(out.starts_with("impl msgp_rs::Unmarshal for TestFast {"));
        assert!(out.contains("let (sz0, rest) = msgp_rs::read_map_header_bytes(bts)?;"));
        assert!(out.contains("for _ in 0..sz0 {"));
        assert!(out.contains("let (field0, rest) = msgp_rs::read_map_key_zc(bts)?;"));
        assert!(out.contains("match field0 {"));
        assert!(out.contains("b\"lat\" => {"));
        assert!(out.contains("(self.lat, bts) = msgp_rs::read_f64_bytes(bts)?;"));
        assert!(out.contains("bts = msgp_rs::read_bytes_into(bts, &mut self.data)?;"));
        assert!(out.contains("_ => {"));
        assert!(out.contains("bts = msgp_rs::skip(bts)?;"));
        assert!(out.trim_end().ends_with("Ok(bts)\n    }\n}"));
    }

    #[test]
    fn test_decode_map_struct() {
        let out = decode(&test_fast());

        assert!(out.starts_with("impl msgp_rs::Decodable for TestFast {"));
        assert!(out.contains("let sz0 = dc.read_map_header()?;"));
        assert!(out.contains("let mut field0 = Vec::new();"));
        assert!(out.contains("dc.read_map_key(&mut field0)?;"));
        assert!(out.contains("match field0.as_slice() {"));
        assert!(out.contains("self.lat = dc.read_f64()?;"));
        assert!(out.contains("dc.read_bytes_into(&mut self.data)?;"));
        assert!(out.contains("dc.skip()?;"));
    }

    #[test]
    fn test_tuple_checks_count() {
        let decl = TypeDecl::new(
            "Pair",
            Shape::tuple(vec![
                StructField::new("0", Shape::base(BaseKind::Str)),
                StructField::new("1", Shape::base(BaseKind::I64)),
            ]),
        );
        let out = unmarshal(&decl);

        assert!(out.contains("let (sz0, rest) = msgp_rs::read_array_header_bytes(bts)?;"));
        assert!(out.contains("if sz0 != 2 {"));
        assert!(out.contains("bts = msgp_rs::read_string_into(bts, &mut self.0)?;"));
        assert!(out.contains("(self.1, bts) = msgp_rs::read_i64_bytes(bts)?;"));
        assert!(!out.contains("skip"));
    }

    // =========================================================================
    // Containers
    // =========================================================================

    #[test]
    fn test_slice_of_structs() {
        let decl = TypeDecl::new(
            "List",
            Shape::structure(vec![StructField::new(
                "items",
                Shape::slice(Shape::structure(vec![StructField::new(
                    "name",
                    Shape::base(BaseKind::Str),
                )])),
            )]),
        );
        let out = unmarshal(&decl);

        assert!(out.contains("self.items.resize_with(sz1 as usize, Default::default);"));
        assert!(out.contains("for el1 in self.items.iter_mut() {"));
        assert!(out.contains("bts = msgp_rs::read_string_into(bts, &mut (*el1).name)?;"));
    }

    #[test]
    fn test_fixed_arrays() {
        let decl = TypeDecl::new(
            "Fixed",
            Shape::structure(vec![
                StructField::new("hash", Shape::array(32, Shape::base(BaseKind::U8))),
                StructField::new("pos", Shape::array(3, Shape::base(BaseKind::F32))),
            ]),
        );
        let out = unmarshal(&decl);

        assert!(out.contains("bts = msgp_rs::read_exact_bytes(bts, &mut self.hash)?;"));
        assert!(out.contains("if sz3 != 3 {"));
        assert!(out.contains("for el3 in self.pos.iter_mut() {"));
        assert!(out.contains("(*el3, bts) = msgp_rs::read_f32_bytes(bts)?;"));
    }

    #[test]
    fn test_maps() {
        let decl = TypeDecl::new(
            "Index",
            Shape::structure(vec![
                StructField::new("els", Shape::map(Shape::base(BaseKind::Str))),
                StructField::new("sorted", Shape::ordered_map(Shape::base(BaseKind::U32))),
            ]),
        );
        let out = unmarshal(&decl);

        assert!(out.contains("self.els.clear();"));
        assert!(out.contains("self.els.reserve(sz1 as usize);"));
        assert!(out.contains("let (k1, rest) = msgp_rs::read_str_zc(bts)?;"));
        assert!(out.contains("let v1 = self.els.entry(k1.to_owned()).or_default();"));
        assert!(out.contains("bts = msgp_rs::read_string_into(bts, &mut *v1)?;"));
        assert!(out.contains("self.sorted.clear();"));
        assert!(!out.contains("self.sorted.reserve"));

        let out = decode(&decl);
        assert!(out.contains("let k1 = dc.read_string()?;"));
        assert!(out.contains("let v1 = self.els.entry(k1).or_default();"));
        assert!(!out.contains("reserve"));
    }

    #[test]
    fn test_stream_slice_grows_per_element() {
        let decl = TypeDecl::new(
            "List",
            Shape::structure(vec![StructField::new(
                "items",
                Shape::slice(Shape::base(BaseKind::U32)),
            )]),
        );
        let out = decode(&decl);

        assert!(!out.contains("resize_with"));
        assert!(out.contains("self.items.truncate(sz1 as usize);"));
        assert!(out.contains("for i1 in 0..sz1 as usize {"));
        assert!(out.contains("if i1 == self.items.len() {"));
        assert!(out.contains("self.items.push(Default::default());"));
        assert!(out.contains("let el1 = &mut self.items[i1];"));
        assert!(out.contains("*el1 = dc.read_u32()?;"));
    }

    #[test]
    fn test_pointers() {
        let decl = TypeDecl::new(
            "Node",
            Shape::structure(vec![
                StructField::new("alt", Shape::option(Shape::base(BaseKind::F64))),
                StructField::new("child", Shape::boxed_option(Shape::ident("Node"))),
            ]),
        );
        let out = unmarshal(&decl);

        assert!(out.contains("if msgp_rs::is_nil(bts) {"));
        assert!(out.contains("bts = msgp_rs::read_nil_bytes(bts)?;"));
        assert!(out.contains("self.alt = None;"));
        assert!(out.contains("} else {"));
        assert!(out.contains("let p1 = self.alt.get_or_insert_with(Default::default);"));
        assert!(out.contains("(*p1, bts) = msgp_rs::read_f64_bytes(bts)?;"));
        assert!(out.contains("bts = msgp_rs::Unmarshal::unmarshal_msg(&mut **p3, bts)?;"));

        let out = decode(&decl);
        assert!(out.contains("if dc.is_nil()? {"));
        assert!(out.contains("msgp_rs::Decodable::decode_msg(&mut **p3, dc)?;"));
    }

    #[test]
    fn test_newtype() {
        let decl = TypeDecl::new("Names", Shape::slice(Shape::base(BaseKind::Str)));
        let out = unmarshal(&decl);

        assert!(out.contains("self.0.resize_with(sz0 as usize, Default::default);"));
        assert!(out.contains("for el0 in self.0.iter_mut() {"));
    }

    // =========================================================================
    // Leaves
    // =========================================================================

    #[test]
    fn test_converted_fields() {
        let decl = TypeDecl::new(
            "Tagged",
            Shape::structure(vec![
                StructField::new(
                    "kind",
                    Shape::converted(BaseKind::I32, "kind_to_i32", "kind_from_i32"),
                ),
                StructField::new(
                    "id",
                    Shape::converted(BaseKind::Str, "Id::to_string", "Id::from"),
                ),
            ]),
        );
        let out = unmarshal(&decl);

        assert!(out.contains("let (tmp1, rest) = msgp_rs::read_i32_bytes(bts)?;"));
        assert!(out.contains("self.kind = kind_from_i32(tmp1);"));
        assert!(out.contains("let mut tmp2: String = Default::default();"));
        assert!(out.contains("bts = msgp_rs::read_string_into(bts, &mut tmp2)?;"));
        assert!(out.contains("self.id = Id::from(tmp2);"));

        let out = decode(&decl);
        assert!(out.contains("let tmp1 = dc.read_i32()?;"));
        assert!(out.contains("dc.read_string_into(&mut tmp2)?;"));
    }

    #[test]
    fn test_extension_field() {
        let decl = TypeDecl::new(
            "Stamped",
            Shape::structure(vec![StructField::new("at", Shape::base(BaseKind::Ext))]),
        );
        assert!(unmarshal(&decl).contains("bts = msgp_rs::read_extension_bytes(bts, &mut self.at)?;"));
        assert!(decode(&decl).contains("dc.read_extension(&mut self.at)?;"));
    }

    #[test]
    fn test_keyword_field() {
        let decl = TypeDecl::new(
            "Token",
            Shape::structure(vec![StructField::new("type", Shape::base(BaseKind::U8))]),
        );
        let out = unmarshal(&decl);
        assert!(out.contains("b\"type\" => {"));
        assert!(out.contains("(self.r#type, bts) = msgp_rs::read_u8_bytes(bts)?;"));
    }

    // =========================================================================
    // Errors
    // =========================================================================

    #[test]
    fn test_convert_on_extension_rejected() {
        let decl = TypeDecl::new(
            "Bad",
            Shape::structure(vec![StructField::new(
                "at",
                Shape::converted(BaseKind::Ext, "to", "from"),
            )]),
        );
        let err = UnmarshalGen::new()
            .generate(&decl, &GeneratorConfig::default())
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Unsupported { .. }));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let decl = TypeDecl::new(
            "Clash",
            Shape::structure(vec![
                StructField::new("a", Shape::base(BaseKind::I32)).with_tag("x"),
                StructField::new("x", Shape::base(BaseKind::I32)),
            ]),
        );
        let err = DecoderGen::new()
            .generate(&decl, &GeneratorConfig::default())
            .unwrap_err();
        assert!(matches!(err, GeneratorError::DuplicateKey { key, .. } if key == "x"));
    }
}
