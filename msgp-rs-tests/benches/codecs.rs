//! Criterion benchmarks for the generated codecs.
//!
//! The benchmark functions themselves are generated by the build script;
//! this file only registers them.

use criterion::{criterion_group, criterion_main};
use msgp_rs_tests::*;

include!(concat!(env!("OUT_DIR"), "/codecs_bench.rs"));

criterion_group!(codec_benches, benches);
criterion_main!(codec_benches);
