//! Generates codecs, tests and benchmarks for the types in `src/lib.rs`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use msgp_rs_gen::{CodecGenerator, GeneratedFile, GeneratorConfig, SchemaDocument};

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR"));
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR"));
    let schema_dir = manifest_dir.join("schemas");
    println!("cargo:rerun-if-changed={}", schema_dir.display());

    let mut paths: Vec<PathBuf> = fs::read_dir(&schema_dir)
        .expect("read schemas directory")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut doc = SchemaDocument::default();
    for path in &paths {
        println!("cargo:rerun-if-changed={}", path.display());
        let json = fs::read_to_string(path).expect("read schema");
        let parsed = SchemaDocument::from_json(&json)
            .unwrap_or_else(|err| panic!("{}: {}", path.display(), err));
        doc.merge(parsed);
    }

    let generator = CodecGenerator::new(GeneratorConfig::default());
    write(&out_dir.join("codecs.rs"), generator.generate(&doc));
    write(&out_dir.join("codecs_test.rs"), generator.generate_tests(&doc));
    write(&out_dir.join("codecs_bench.rs"), generator.generate_benches(&doc));
}

fn write(path: &Path, file: GeneratedFile) {
    if !file.is_complete() {
        let errors: Vec<String> = file.errors.iter().map(ToString::to_string).collect();
        panic!("generation failed:\n{}", errors.join("\n"));
    }
    fs::write(path, file.content).unwrap_or_else(|err| panic!("{}: {}", path.display(), err));
}
