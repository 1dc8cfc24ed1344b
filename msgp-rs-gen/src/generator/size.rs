//! Size bound strategy.
//!
//! Emits `msgp_rs::Sizer::msgsize`, an upper bound on the number of bytes
//! the encoders write for a value. Shapes whose bound does not depend on the
//! value fold into one constant expression; the rest accumulate into `s`.

use super::{array_header_len, check_node, map_struct_prefixes, struct_keys, Ctx, GeneratorConfig, Strategy};
use crate::error::GeneratorError;
use crate::ir::ident::type_ident;
use crate::ir::shape::receiver;
use crate::ir::{BaseElem, BaseKind, Shape, StructShape, TypeDecl};
use crate::printer::Printer;

/// Generates `msgp_rs::Sizer` impls.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeGen;

impl SizeGen {
    pub fn new() -> Self {
        Self
    }

    /// Bytes taken by a struct's header and keys.
    fn struct_overhead(p: &mut Printer, ctx: &Ctx<'_>, s: &StructShape) -> usize {
        if s.as_tuple {
            return array_header_len(s.fields.len());
        }
        let keys = struct_keys(p, ctx, s);
        map_struct_prefixes(p, ctx, &keys).iter().map(Vec::len).sum()
    }

    /// Constant bound for `shape`, if it does not depend on the value.
    fn fixed_size(p: &mut Printer, ctx: &Ctx<'_>, shape: &Shape) -> Option<String> {
        check_node(p, ctx, shape);
        match shape {
            Shape::Base(b) => b
                .kind
                .size_const()
                .map(|name| format!("msgp_rs::{}", name)),
            Shape::Array(a) if a.is_byte_array() => {
                Some(format!("msgp_rs::BYTES_PREFIX_SIZE + {}", a.size))
            }
            Shape::Array(a) => Self::fixed_size(p, ctx, &a.element).map(|el| {
                format!("msgp_rs::ARRAY_HEADER_SIZE + {} * ({})", a.size, el)
            }),
            Shape::Struct(s) => {
                let mut terms = Vec::with_capacity(s.fields.len());
                for field in &s.fields {
                    terms.push(Self::fixed_size(p, ctx, &field.shape)?);
                }
                let mut expr = Self::struct_overhead(p, ctx, s).to_string();
                for term in terms {
                    expr.push_str(" + ");
                    expr.push_str(&term);
                }
                Some(expr)
            }
            Shape::Slice(_) | Shape::Map(_) | Shape::Pointer(_) => None,
        }
    }

    fn gen_shape(&self, p: &mut Printer, ctx: &Ctx<'_>, shape: &Shape) {
        if !p.ok() {
            return;
        }
        if let Some(expr) = Self::fixed_size(p, ctx, shape) {
            p.line(format!("s += {};", expr));
            return;
        }

        match shape {
            Shape::Struct(st) => {
                let overhead = Self::struct_overhead(p, ctx, st);
                p.line(format!("s += {};", overhead));
                for field in &st.fields {
                    self.gen_shape(p, ctx, &field.shape);
                }
            }
            Shape::Array(a) => {
                p.line("s += msgp_rs::ARRAY_HEADER_SIZE;");
                p.open(format!("for {} in {}.iter()", a.elem_var(), receiver(&a.varname)));
                self.gen_shape(p, ctx, &a.element);
                p.close();
            }
            Shape::Slice(sl) => {
                let recv = receiver(&sl.varname);
                match Self::fixed_size(p, ctx, &sl.element) {
                    Some(el) => p.line(format!(
                        "s += msgp_rs::ARRAY_HEADER_SIZE + {}.len() * ({});",
                        recv, el
                    )),
                    None => {
                        p.line("s += msgp_rs::ARRAY_HEADER_SIZE;");
                        p.open(format!("for {} in {}.iter()", sl.elem_var(), recv));
                        self.gen_shape(p, ctx, &sl.element);
                        p.close();
                    }
                }
            }
            Shape::Map(m) => {
                let recv = receiver(&m.varname);
                let key = m.key_var();
                p.line("s += msgp_rs::MAP_HEADER_SIZE;");
                match Self::fixed_size(p, ctx, &m.value) {
                    Some(value) => {
                        p.open(format!("for {} in {}.keys()", key, recv));
                        p.line(format!("s += msgp_rs::str_size({}) + {};", key, value));
                        p.close();
                    }
                    None => {
                        p.open(format!("for ({}, {}) in {}.iter()", key, m.value_var(), recv));
                        p.line(format!("s += msgp_rs::str_size({});", key));
                        self.gen_shape(p, ctx, &m.value);
                        p.close();
                    }
                }
            }
            Shape::Pointer(ptr) => {
                match Self::fixed_size(p, ctx, &ptr.referent) {
                    Some(referent) => {
                        p.open(format!("if {}.is_some()", receiver(&ptr.varname)));
                        p.line(format!("s += {};", referent));
                    }
                    None => {
                        p.open(format!("if let Some({}) = &{}", ptr.ref_var(), ptr.varname));
                        self.gen_shape(p, ctx, &ptr.referent);
                    }
                }
                p.reopen("else");
                p.line("s += msgp_rs::NIL_SIZE;");
                p.close();
            }
            Shape::Base(b) => p.line(format!("s += {};", Self::leaf_size(b))),
        }
    }

    /// Size expression for a variable-size leaf.
    fn leaf_size(b: &BaseElem) -> String {
        let place = &b.varname;
        let value = match &b.convert {
            Some(conv) => format!("&{}(&{})", conv.to_base, place),
            None => format!("&{}", place),
        };
        match &b.kind {
            BaseKind::Bytes => format!("msgp_rs::bytes_size({})", value),
            BaseKind::Ext => format!("msgp_rs::extension_size({})", value),
            BaseKind::Ident(_) => format!("msgp_rs::Sizer::msgsize({})", value),
            _ => format!("msgp_rs::str_size({})", value),
        }
    }
}

impl Strategy for SizeGen {
    fn id(&self) -> &'static str {
        "size"
    }

    fn name(&self) -> &'static str {
        "Encoded size bound"
    }

    fn generate(&self, decl: &TypeDecl, config: &GeneratorConfig) -> Result<String, GeneratorError> {
        let ctx = Ctx::new(decl, config);
        let mut p = Printer::new(config.indent);

        p.open(format!("impl msgp_rs::Sizer for {}", type_ident(&decl.name)));
        p.open("fn msgsize(&self) -> usize");
        match Self::fixed_size(&mut p, &ctx, &decl.shape) {
            Some(expr) => p.line(expr),
            None => {
                p.line("let mut s = 0;");
                self.gen_shape(&mut p, &ctx, &decl.shape);
                p.line("s");
            }
        }
        p.close();
        p.close();
        p.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::StructField;

    fn size(decl: &TypeDecl) -> String {
        SizeGen::new()
            .generate(decl, &GeneratorConfig::default())
            .unwrap()
    }

    #[test]
    fn test_fixed_struct_folds_to_constant() {
        let decl = TypeDecl::new(
            "Point",
            Shape::structure(vec![
                StructField::new("x", Shape::base(BaseKind::F64)),
                StructField::new("y", Shape::base(BaseKind::F64)),
            ]),
        );
        let out = size(&decl);

        // fixmap header plus two fixstr keys of one byte each
        assert!(out.contains("5 + msgp_rs::F64_SIZE + msgp_rs::F64_SIZE"));
        assert!(!out.contains("let mut s"));
    }

    #[test]
    fn test_tuple_overhead_is_array_header() {
        let decl = TypeDecl::new(
            "Pair",
            Shape::tuple(vec![
                StructField::new("0", Shape::base(BaseKind::I32)),
                StructField::new("1", Shape::array(16, Shape::base(BaseKind::U8))),
            ]),
        );
        let out = size(&decl);
        assert!(out.contains("1 + msgp_rs::I32_SIZE + msgp_rs::BYTES_PREFIX_SIZE + 16"));
    }

    #[test]
    fn test_variable_struct_accumulates() {
        let decl = TypeDecl::new(
            "TestFast",
            Shape::structure(vec![
                StructField::new("lat", Shape::base(BaseKind::F64)),
                StructField::new("data", Shape::base(BaseKind::Bytes)),
            ]),
        );
        let out = size(&decl);

        assert!(out.contains("let mut s = 0;"));
        assert!(out.contains("s += 10;"));
        assert!(out.contains("s += msgp_rs::F64_SIZE;"));
        assert!(out.contains("s += msgp_rs::bytes_size(&self.data);"));
        assert!(out.trim_end().ends_with("s\n    }\n}"));
    }

    #[test]
    fn test_containers() {
        let decl = TypeDecl::new(
            "Bag",
            Shape::structure(vec![
                StructField::new("ints", Shape::slice(Shape::base(BaseKind::I32))),
                StructField::new("names", Shape::slice(Shape::base(BaseKind::Str))),
                StructField::new("counts", Shape::map(Shape::base(BaseKind::U64))),
                StructField::new("tags", Shape::map(Shape::base(BaseKind::Str))),
                StructField::new("next", Shape::boxed_option(Shape::ident("Bag"))),
            ]),
        );
        let out = size(&decl);

        assert!(out.contains("s += msgp_rs::ARRAY_HEADER_SIZE + self.ints.len() * (msgp_rs::I32_SIZE);"));
        assert!(out.contains("for el3 in self.names.iter() {"));
        assert!(out.contains("s += msgp_rs::str_size(&*el3);"));
        assert!(out.contains("for k5 in self.counts.keys() {"));
        assert!(out.contains("s += msgp_rs::str_size(k5) + msgp_rs::U64_SIZE;"));
        assert!(out.contains("for (k7, v7) in self.tags.iter() {"));
        assert!(out.contains("if let Some(p9) = &self.next {"));
        assert!(out.contains("s += msgp_rs::Sizer::msgsize(&**p9);"));
        assert!(out.contains("s += msgp_rs::NIL_SIZE;"));
    }

    #[test]
    fn test_optional_scalar_binds_nothing() {
        let decl = TypeDecl::new(
            "Reading",
            Shape::structure(vec![
                StructField::new("f", Shape::option(Shape::base(BaseKind::F64))),
                StructField::new("label", Shape::option(Shape::base(BaseKind::Str))),
            ]),
        );
        let out = size(&decl);

        assert!(out.contains("if self.f.is_some() {"));
        assert!(out.contains("s += msgp_rs::F64_SIZE;"));
        assert!(!out.contains("if let Some(p1)"));
        assert!(out.contains("if let Some(p3) = &self.label {"));
        assert!(out.contains("s += msgp_rs::str_size(&*p3);"));
    }

    #[test]
    fn test_converted_string() {
        let decl = TypeDecl::new(
            "Named",
            Shape::structure(vec![StructField::new(
                "id",
                Shape::converted(BaseKind::Str, "Id::to_string", "Id::from"),
            )]),
        );
        assert!(size(&decl).contains("s += msgp_rs::str_size(&Id::to_string(&self.id));"));
    }

    #[test]
    fn test_fixed_newtype() {
        let decl = TypeDecl::new("Hash", Shape::array(32, Shape::base(BaseKind::U8)));
        let out = size(&decl);
        assert!(out.contains("        msgp_rs::BYTES_PREFIX_SIZE + 32\n"));
    }

    #[test]
    fn test_zero_array_rejected() {
        let decl = TypeDecl::new("Empty", Shape::array(0, Shape::base(BaseKind::I64)));
        let err = SizeGen::new()
            .generate(&decl, &GeneratorConfig::default())
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Unsupported { .. }));
    }
}
