//! Encode strategies.
//!
//! One traversal emits both encoders. [`WriteSink`] supplies the statements
//! that differ between appending to a `Vec<u8>` (`Marshal::marshal_msg`) and
//! writing to a stream (`Encodable::encode_msg`).
//!
//! Map-encoded structs always write every field, in declaration order. The
//! map header and the keys are encoded once at generation time and emitted
//! as raw byte literals.

use std::marker::PhantomData;

use super::{check_node, map_struct_prefixes, struct_keys, Ctx, GeneratorConfig, Stmt, Strategy};
use crate::error::GeneratorError;
use crate::ir::ident::type_ident;
use crate::ir::shape::receiver;
use crate::ir::{
    ArrayShape, BaseElem, BaseKind, MapShape, PointerShape, Shape, SliceShape, StructShape,
    TypeDecl,
};
use crate::printer::{byte_array_literal, Printer};

/// Where an encoder writes to.
pub trait WriteSink: Send + Sync {
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

    /// First statement of the method body, if any.
    fn prologue(config: &GeneratorConfig) -> Option<String>;

    /// Write pre-encoded bytes.
    fn raw(bytes: &[u8]) -> Stmt;

    /// Write an array header for `count` elements.
    fn array_header(count: &str) -> Stmt;

    /// Write a map header for `count` entries.
    fn map_header(count: &str) -> Stmt;

    /// Write a nil.
    fn nil() -> Stmt;

    /// Write a value of `kind`. Scalars are passed by value, everything else
    /// by reference.
    fn value(kind: &BaseKind, arg: &str) -> Stmt;

    /// Encode `place` with its own generated routine.
    fn delegate(place: &str) -> Stmt;
}

/// Appends to a `Vec<u8>` named `buf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferSink;

impl WriteSink for BufferSink {
    const ID: &'static str = "marshal";
    const NAME: &'static str = "Byte buffer encoder";
    const TRAIT: &'static str = "msgp_rs::Marshal";
    const SIGNATURE: &'static str =
        "fn marshal_msg(&self, buf: &mut Vec<u8>) -> Result<(), msgp_rs::Error>";
    const RETURN: &'static str = "Ok(())";

    fn prologue(config: &GeneratorConfig) -> Option<String> {
        config
            .size
            .then(|| "buf.reserve(msgp_rs::Sizer::msgsize(self));".to_string())
    }

    fn raw(bytes: &[u8]) -> Stmt {
        Stmt::Plain(format!("buf.extend_from_slice(&{})", byte_array_literal(bytes)))
    }

    fn array_header(count: &str) -> Stmt {
        Stmt::Plain(format!("msgp_rs::append_array_header(buf, {})", count))
    }

    fn map_header(count: &str) -> Stmt {
        Stmt::Plain(format!("msgp_rs::append_map_header(buf, {})", count))
    }

    fn nil() -> Stmt {
        Stmt::Plain("msgp_rs::append_nil(buf)".to_string())
    }

    fn value(kind: &BaseKind, arg: &str) -> Stmt {
        let call = format!("msgp_rs::append_{}(buf, {})", kind.wire_name(), arg);
        if kind.is_scalar() {
            Stmt::Plain(call)
        } else {
            Stmt::Try(call)
        }
    }

    fn delegate(place: &str) -> Stmt {
        Stmt::Try(format!("msgp_rs::Marshal::marshal_msg(&{}, buf)", place))
    }
}

/// Writes to a `msgp_rs::Writer` named `en`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamSink;

impl WriteSink for StreamSink {
    const ID: &'static str = "encode";
    const NAME: &'static str = "Stream encoder";
    const TRAIT: &'static str = "msgp_rs::Encodable";
    const SIGNATURE: &'static str = "fn encode_msg<W: std::io::Write>(&self, en: &mut msgp_rs::Writer<W>) -> Result<(), msgp_rs::Error>";
    const RETURN: &'static str = "Ok(())";

    fn prologue(_config: &GeneratorConfig) -> Option<String> {
        None
    }

    fn raw(bytes: &[u8]) -> Stmt {
        Stmt::Try(format!("en.write_raw(&{})", byte_array_literal(bytes)))
    }

    fn array_header(count: &str) -> Stmt {
        Stmt::Try(format!("en.write_array_header({})", count))
    }

    fn map_header(count: &str) -> Stmt {
        Stmt::Try(format!("en.write_map_header({})", count))
    }

    fn nil() -> Stmt {
        Stmt::Try("en.write_nil()".to_string())
    }

    fn value(kind: &BaseKind, arg: &str) -> Stmt {
        Stmt::Try(format!("en.write_{}({})", kind.wire_name(), arg))
    }

    fn delegate(place: &str) -> Stmt {
        Stmt::Try(format!("msgp_rs::Encodable::encode_msg(&{}, en)", place))
    }
}

/// Encoder generator over a [`WriteSink`].
#[derive(Debug, Clone, Copy)]
pub struct EncodeGen<S> {
    sink: PhantomData<S>,
}

/// Generates `msgp_rs::Marshal` impls.
pub type MarshalGen = EncodeGen<BufferSink>;

/// Generates `msgp_rs::Encodable` impls.
pub type EncoderGen = EncodeGen<StreamSink>;

impl<S: WriteSink> Default for EncodeGen<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: WriteSink> EncodeGen<S> {
    pub fn new() -> Self {
        Self { sink: PhantomData }
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
        S::array_header(&s.fields.len().to_string()).emit(p);
        for field in &s.fields {
            self.gen_shape(p, ctx, &field.shape);
        }
    }

    fn gen_map_struct(&self, p: &mut Printer, ctx: &Ctx<'_>, s: &StructShape) {
        let keys = struct_keys(p, ctx, s);
        let prefixes = map_struct_prefixes(p, ctx, &keys);

        if s.fields.is_empty() {
            p.comment("map header, size 0");
            for raw in &prefixes {
                S::raw(raw).emit(p);
            }
            return;
        }

        for (i, ((field, key), raw)) in s.fields.iter().zip(&keys).zip(&prefixes).enumerate() {
            if i == 0 {
                p.comment(format!("map header, size {}", keys.len()));
            }
            p.comment(format!("write {:?}", key));
            S::raw(raw).emit(p);
            self.gen_shape(p, ctx, &field.shape);
        }
    }

    fn gen_array(&self, p: &mut Printer, ctx: &Ctx<'_>, a: &ArrayShape) {
        if a.is_byte_array() {
            S::value(&BaseKind::Bytes, &format!("&{}", a.varname)).emit(p);
            return;
        }
        S::array_header(&a.size.to_string()).emit(p);
        p.open(format!(
            "for {} in {}.iter()",
            a.elem_var(),
            receiver(&a.varname)
        ));
        self.gen_shape(p, ctx, &a.element);
        p.close();
    }

    fn gen_slice(&self, p: &mut Printer, ctx: &Ctx<'_>, s: &SliceShape) {
        let recv = receiver(&s.varname);
        S::array_header(&format!("msgp_rs::len_u32({}.len())?", recv)).emit(p);
        p.open(format!("for {} in {}.iter()", s.elem_var(), recv));
        self.gen_shape(p, ctx, &s.element);
        p.close();
    }

    fn gen_map(&self, p: &mut Printer, ctx: &Ctx<'_>, m: &MapShape) {
        let recv = receiver(&m.varname);
        let key = m.key_var();
        S::map_header(&format!("msgp_rs::len_u32({}.len())?", recv)).emit(p);
        p.open(format!("for ({}, {}) in {}.iter()", key, m.value_var(), recv));
        S::value(&BaseKind::Str, &key).emit(p);
        self.gen_shape(p, ctx, &m.value);
        p.close();
    }

    fn gen_pointer(&self, p: &mut Printer, ctx: &Ctx<'_>, ptr: &PointerShape) {
        p.open(format!("if let Some({}) = &{}", ptr.ref_var(), ptr.varname));
        self.gen_shape(p, ctx, &ptr.referent);
        p.reopen("else");
        S::nil().emit(p);
        p.close();
    }

    fn gen_base(&self, p: &mut Printer, b: &BaseElem) {
        let place = &b.varname;
        match (&b.kind, &b.convert) {
            (kind, Some(conv)) => {
                let converted = format!("{}(&{})", conv.to_base, place);
                let arg = if kind.is_scalar() {
                    converted
                } else {
                    format!("&{}", converted)
                };
                S::value(kind, &arg).emit(p);
            }
            (BaseKind::Ident(_), None) => S::delegate(place).emit(p),
            (kind, None) if kind.is_scalar() => S::value(kind, place).emit(p),
            (kind, None) => S::value(kind, &format!("&{}", place)).emit(p),
        }
    }
}

impl<S: WriteSink> Strategy for EncodeGen<S> {
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
        if let Some(line) = S::prologue(config) {
            p.line(line);
        }
        self.gen_shape(&mut p, &ctx, &decl.shape);
        p.line(S::RETURN);
        p.close();
        p.close();
        p.finish()
    }
}
