//! Codec generation for the CLI.
//!
//! Runs [`CodecGenerator`] over the merged schema document and pairs each
//! generated file with the path it belongs at.

use std::path::PathBuf;

use msgp_rs_gen::{CodecGenerator, GeneratedFile, GeneratorError, SchemaDocument};

use crate::config::Config;
use crate::error::CliResult;

/// One file to write.
#[derive(Debug, Clone)]
pub struct OutputFile {
    /// Destination path.
    pub path: PathBuf,

    /// Generated file.
    pub file: GeneratedFile,
}

/// Everything a generation run produces.
#[derive(Debug, Clone)]
pub struct GeneratedOutput {
    /// Codec file, followed by the optional tests and benchmarks files.
    pub files: Vec<OutputFile>,

    /// Types left out of the codec file.
    pub errors: Vec<GeneratorError>,
}

impl GeneratedOutput {
    /// The codec file.
    pub fn codecs(&self) -> Option<&OutputFile> {
        self.files.first()
    }

    /// Whether every declared type was generated.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Codec generator driven by the CLI configuration.
pub struct CodecRunner {
    config: Config,
    generator: CodecGenerator,
}

impl CodecRunner {
    /// Create a runner, validating the configuration.
    pub fn new(config: Config) -> CliResult<Self> {
        let generator = CodecGenerator::new(config.generator_config()?);
        Ok(Self { config, generator })
    }

    /// Generate the codec file and, as configured, tests and benchmarks.
    ///
    /// Types that cannot be generated are returned in
    /// [`GeneratedOutput::errors`]; the remaining types are still emitted.
    pub fn generate(&self, doc: &SchemaDocument) -> GeneratedOutput {
        let codecs = self.generator.generate(doc);
        let errors = codecs.errors.clone();
        tracing::info!(
            types = codecs.types.len(),
            errors = errors.len(),
            "generated codecs"
        );

        let mut files = vec![OutputFile {
            path: self.config.output_path(),
            file: codecs,
        }];

        if let Some(path) = self.config.tests_path() {
            files.push(OutputFile {
                path,
                file: self.generator.generate_tests(doc),
            });
        }

        if let Some(path) = self.config.benches_path() {
            files.push(OutputFile {
                path,
                file: self.generator.generate_benches(doc),
            });
        }

        GeneratedOutput { files, errors }
    }
}
