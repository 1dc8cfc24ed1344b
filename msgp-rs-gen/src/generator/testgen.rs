//! Test and benchmark scaffold strategies.
//!
//! Both work from `Default::default()` values of the generated type, so the
//! type must implement `Default`, `PartialEq` and `Debug`. Which routines
//! are exercised follows the codec toggles of the configuration.

use convert_case::{Case, Casing};

use super::{GeneratorConfig, Strategy};
use crate::error::GeneratorError;
use crate::ir::ident::type_ident;
use crate::ir::TypeDecl;
use crate::printer::Printer;

fn snake_name(decl: &TypeDecl) -> String {
    decl.name.to_case(Case::Snake)
}

/// Generates `#[test]` round-trip checks for each type.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestGen;

impl TestGen {
    pub fn new() -> Self {
        Self
    }

    fn marshal_unmarshal(p: &mut Printer, ty: &str, snake: &str) {
        p.line("#[test]");
        p.open(format!("fn test_marshal_unmarshal_{}()", snake));
        p.line(format!("let v = {}::default();", ty));
        p.line("let mut bts = Vec::new();");
        p.line("msgp_rs::Marshal::marshal_msg(&v, &mut bts).unwrap();");
        p.line(format!("let mut out = {}::default();", ty));
        p.line("let left = msgp_rs::Unmarshal::unmarshal_msg(&mut out, &bts).unwrap();");
        p.line("assert!(left.is_empty(), \"{} bytes left over after unmarshal_msg\", left.len());");
        p.line("assert_eq!(out, v);");
        p.close();
        p.blank();

        p.line("#[test]");
        p.open(format!("fn test_skip_{}()", snake));
        p.line(format!("let v = {}::default();", ty));
        p.line("let mut bts = Vec::new();");
        p.line("msgp_rs::Marshal::marshal_msg(&v, &mut bts).unwrap();");
        p.line("let left = msgp_rs::skip(&bts).unwrap();");
        p.line("assert!(left.is_empty(), \"{} bytes left over after skip\", left.len());");
        p.close();
    }

    fn encode_decode(p: &mut Printer, ty: &str, snake: &str, size: bool) {
        p.line("#[test]");
        p.open(format!("fn test_encode_decode_{}()", snake));
        p.line(format!("let v = {}::default();", ty));
        p.line("let mut en = msgp_rs::Writer::new(Vec::new());");
        p.line("msgp_rs::Encodable::encode_msg(&v, &mut en).unwrap();");
        p.line("let buf = en.into_inner().unwrap();");
        if size {
            p.line("let bound = msgp_rs::Sizer::msgsize(&v);");
            p.line("assert!(bound >= buf.len(), \"msgsize() {} is below the encoded length {}\", bound, buf.len());");
        }
        p.line("let mut dc = msgp_rs::Reader::new(buf.as_slice());");
        p.line(format!("let mut out = {}::default();", ty));
        p.line("msgp_rs::Decodable::decode_msg(&mut out, &mut dc).unwrap();");
        p.line("assert_eq!(out, v);");
        p.line("let mut dc = msgp_rs::Reader::new(buf.as_slice());");
        p.line("dc.skip().unwrap();");
        p.line("assert!(dc.buffered().is_empty());");
        p.close();
    }
}

impl Strategy for TestGen {
    fn id(&self) -> &'static str {
        "tests"
    }

    fn name(&self) -> &'static str {
        "Round-trip tests"
    }

    fn generate(&self, decl: &TypeDecl, config: &GeneratorConfig) -> Result<String, GeneratorError> {
        let ty = type_ident(&decl.name);
        let snake = snake_name(decl);
        let mut p = Printer::new(config.indent);

        if config.marshal && config.unmarshal {
            Self::marshal_unmarshal(&mut p, &ty, &snake);
        }
        if config.encode && config.decode {
            if config.marshal && config.unmarshal {
                p.blank();
            }
            Self::encode_decode(&mut p, &ty, &snake, config.size);
        }
        p.finish()
    }
}

/// Generates criterion benchmark functions for each type, plus a
/// `benches` function registering all of them.
#[derive(Debug, Clone, Copy, Default)]
pub struct BenchGen;

impl BenchGen {
    pub fn new() -> Self {
        Self
    }
}

impl Strategy for BenchGen {
    fn id(&self) -> &'static str {
        "benches"
    }

    fn name(&self) -> &'static str {
        "Criterion benchmarks"
    }

    fn generate(&self, decl: &TypeDecl, config: &GeneratorConfig) -> Result<String, GeneratorError> {
        let ty = type_ident(&decl.name);
        let mut p = Printer::new(config.indent);

        p.open(format!(
            "pub fn bench_{}(c: &mut criterion::Criterion)",
            snake_name(decl)
        ));
        p.line(format!("let v = {}::default();", ty));
        if (config.marshal && config.unmarshal) || (config.encode && config.decode) {
            p.line(format!("let mut out = {}::default();", ty));
        }
        p.line(format!("let mut group = c.benchmark_group({:?});", decl.name));

        if config.marshal {
            p.line("let mut buf = Vec::new();");
            p.line("msgp_rs::Marshal::marshal_msg(&v, &mut buf).unwrap();");
            p.line("group.throughput(criterion::Throughput::Bytes(buf.len() as u64));");
            p.open("group.bench_function(\"marshal_msg\", |b|");
            p.open("b.iter(||");
            p.line("buf.clear();");
            p.line("msgp_rs::Marshal::marshal_msg(std::hint::black_box(&v), &mut buf).unwrap();");
            p.close_with(")");
            p.close_with(");");

            if config.unmarshal {
                p.line("let bts = msgp_rs::to_vec(&v).unwrap();");
                p.open("group.bench_function(\"unmarshal_msg\", |b|");
                p.open("b.iter(||");
                p.line("msgp_rs::Unmarshal::unmarshal_msg(&mut out, std::hint::black_box(&bts)).unwrap();");
                p.close_with(")");
                p.close_with(");");
            }
        }

        if config.size {
            p.open("group.bench_function(\"msgsize\", |b|");
            p.line("b.iter(|| msgp_rs::Sizer::msgsize(std::hint::black_box(&v)))");
            p.close_with(");");
        }

        if config.encode {
            p.open("group.bench_function(\"encode_msg\", |b|");
            p.line("let mut en = msgp_rs::Writer::new(std::io::sink());");
            p.line("b.iter(|| msgp_rs::Encodable::encode_msg(std::hint::black_box(&v), &mut en).unwrap())");
            p.close_with(");");

            if config.decode {
                p.line("let encoded = msgp_rs::encode(Vec::new(), &v).unwrap();");
                p.open("group.bench_function(\"decode_msg\", |b|");
                p.open("b.iter(||");
                p.line("let mut dc = msgp_rs::Reader::new(std::hint::black_box(encoded.as_slice()));");
                p.line("msgp_rs::Decodable::decode_msg(&mut out, &mut dc).unwrap();");
                p.close_with(")");
                p.close_with(");");
            }
        }

        p.line("group.finish();");
        p.close();
        p.finish()
    }

    fn generate_postamble(
        &self,
        decls: &[&TypeDecl],
        config: &GeneratorConfig,
    ) -> Result<String, GeneratorError> {
        let mut p = Printer::new(config.indent);
        p.line("/// Registers every generated benchmark.");
        p.open("pub fn benches(c: &mut criterion::Criterion)");
        for decl in decls {
            p.line(format!("bench_{}(c);", snake_name(decl)));
        }
        p.close();
        p.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BaseKind, Shape, StructField};

    fn decl() -> TypeDecl {
        TypeDecl::new(
            "TestFast",
            Shape::structure(vec![StructField::new("lat", Shape::base(BaseKind::F64))]),
        )
    }

    #[test]
    fn test_tests_cover_enabled_routines() {
        let out = TestGen::new()
            .generate(&decl(), &GeneratorConfig::default())
            .unwrap();

        assert!(out.contains("fn test_marshal_unmarshal_test_fast() {"));
        assert!(out.contains("fn test_skip_test_fast() {"));
        assert!(out.contains("fn test_encode_decode_test_fast() {"));
        assert!(out.contains("msgp_rs::Sizer::msgsize(&v)"));
        assert_eq!(out.matches("#[test]").count(), 3);
    }

    #[test]
    fn test_tests_follow_toggles() {
        let config = GeneratorConfig::new().with_decode(false).with_size(false);
        let out = TestGen::new().generate(&decl(), &config).unwrap();

        assert!(out.contains("fn test_marshal_unmarshal_test_fast() {"));
        assert!(!out.contains("encode_decode"));
        assert!(!out.contains("msgsize"));
    }

    #[test]
    fn test_bench_function() {
        let out = BenchGen::new()
            .generate(&decl(), &GeneratorConfig::default())
            .unwrap();

        assert!(out.starts_with("pub fn bench_test_fast(c: &mut criterion::Criterion) {"));
        assert!(out.contains("c.benchmark_group(\"TestFast\")"));
        for name in ["marshal_msg", "unmarshal_msg", "msgsize", "encode_msg", "decode_msg"] {
            assert!(out.contains(&format!("group.bench_function(\"{}\"", name)), "missing {}", name);
        }
        assert!(out.contains("        })\n    });\n"));
        assert!(out.trim_end().ends_with("group.finish();\n}"));
    }

    #[test]
    fn test_bench_registration() {
        let a = decl();
        let b = TypeDecl::new("Other", Shape::structure(vec![]));
        let out = BenchGen::new()
            .generate_postamble(&[&a, &b], &GeneratorConfig::default())
            .unwrap();

        assert!(out.contains("pub fn benches(c: &mut criterion::Criterion) {"));
        assert!(out.contains("    bench_test_fast(c);\n    bench_other(c);\n"));
    }
}
