//! Configuration management for the CLI.
//!
//! This module handles loading configuration from `msgp-rs.toml` files
//! and merging with command-line arguments.

use std::path::{Path, PathBuf};

use msgp_rs_gen::generator::{GeneratorConfig, IndentStyle};
use msgp_rs_gen::KeyCase;
use serde::Deserialize;

use crate::error::{CliResult, ConfigError};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "msgp-rs.toml";

/// Main configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output configuration.
    pub output: OutputConfig,

    /// Routine selection.
    pub generate: GenerateConfig,

    /// Naming and formatting.
    pub naming: NamingConfig,
}

/// Output configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory for generated files.
    pub dir: PathBuf,

    /// Codec filename.
    pub file: String,

    /// Generated tests filename.
    pub tests_file: String,

    /// Generated benchmarks filename, if benchmarks are wanted.
    pub benches_file: Option<String>,
}

/// Which routines to emit.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    pub unmarshal: bool,
    pub marshal: bool,
    pub decode: bool,
    pub encode: bool,
    pub size: bool,
    pub tests: bool,
}

/// Naming convention configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Key rule for untagged fields (verbatim, camelCase, snake_case, ...).
    pub rename_all: Option<String>,

    /// Spaces per indentation level, or 0 for tabs.
    pub indent: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./generated"),
            file: "codecs.rs".to_string(),
            tests_file: "codecs_test.rs".to_string(),
            benches_file: None,
        }
    }
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            unmarshal: true,
            marshal: true,
            decode: true,
            encode: true,
            size: true,
            tests: true,
        }
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            rename_all: None,
            indent: 4,
        }
    }
}

impl Config {
    /// Path of the generated codec file.
    pub fn output_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.file)
    }

    /// Path of the generated tests file, if tests are enabled.
    pub fn tests_path(&self) -> Option<PathBuf> {
        self.generate
            .tests
            .then(|| self.output.dir.join(&self.output.tests_file))
    }

    /// Path of the generated benchmarks file, if configured.
    pub fn benches_path(&self) -> Option<PathBuf> {
        self.output
            .benches_file
            .as_ref()
            .map(|file| self.output.dir.join(file))
    }

    /// Translate into the generator's configuration.
    pub fn generator_config(&self) -> CliResult<GeneratorConfig> {
        let rename_all = match &self.naming.rename_all {
            Some(name) => name
                .parse::<KeyCase>()
                .map_err(|message| ConfigError::invalid_value("naming.rename_all", message))?,
            None => KeyCase::default(),
        };
        let indent = match self.naming.indent {
            0 => IndentStyle::Tabs,
            2 => IndentStyle::Spaces2,
            4 => IndentStyle::Spaces4,
            other => {
                return Err(ConfigError::invalid_value(
                    "naming.indent",
                    format!("expected 0, 2 or 4, got {}", other),
                )
                .into())
            }
        };

        Ok(GeneratorConfig::new()
            .with_unmarshal(self.generate.unmarshal)
            .with_marshal(self.generate.marshal)
            .with_decode(self.generate.decode)
            .with_encode(self.generate.encode)
            .with_size(self.generate.size)
            .with_tests(self.generate.tests)
            .with_rename_all(rename_all)
            .with_indent(indent))
    }
}

/// Configuration manager for loading and merging configs.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file path.
    ///
    /// If the path is None, attempts to load from the default location.
    /// If no config file exists there, returns default configuration. An
    /// explicitly given path must exist.
    pub fn load(path: Option<&Path>) -> CliResult<Config> {
        let config_path = match path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::not_found(path.to_path_buf()).into());
            }
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(CONFIG_FILENAME),
        };

        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no configuration file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::invalid_toml(config_path.clone(), e.to_string()))?;

        tracing::debug!(path = %config_path.display(), "loaded configuration");
        Ok(config)
    }

    /// Merge CLI arguments into configuration.
    ///
    /// CLI arguments take precedence over config file values.
    pub fn merge_cli_args(mut config: Config, args: &CliArgs) -> Config {
        if let Some(ref output) = args.output {
            config.output.dir = output.clone();
        }

        if let Some(ref file) = args.output_file {
            config.output.file = file.clone();
        }

        if let Some(ref rename_all) = args.rename_all {
            config.naming.rename_all = Some(rename_all.clone());
        }

        if let Some(tests) = args.tests {
            config.generate.tests = tests;
        }

        config
    }

    /// Generate default configuration file content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# msgp-rs configuration file

[output]
# Output directory for generated Rust files
dir = "./generated"

# Codec file name; include!() it next to the type definitions
file = "codecs.rs"

# Generated round-trip tests file name
tests_file = "codecs_test.rs"

# Generated criterion benchmarks file name (omit to skip benchmarks)
# benches_file = "codecs_bench.rs"

[generate]
# Decode from a byte slice (msgp_rs::Unmarshal)
unmarshal = true

# Append to a byte buffer (msgp_rs::Marshal)
marshal = true

# Decode from a stream (msgp_rs::Decodable)
decode = true

# Encode to a stream (msgp_rs::Encodable)
encode = true

# Upper bound of the encoded size (msgp_rs::Sizer)
size = true

# Round-trip tests for every generated type
tests = true

[naming]
# Key rule for fields without a tag, unless a schema sets its own
# (verbatim, camelCase, snake_case, PascalCase, SCREAMING_SNAKE_CASE, kebab-case)
rename_all = "verbatim"

# Spaces per indentation level (2 or 4), or 0 for tabs
indent = 4
"#
    }
}

/// CLI arguments that can override configuration.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Output directory override.
    pub output: Option<PathBuf>,

    /// Output filename override.
    pub output_file: Option<String>,

    /// Key rule override.
    pub rename_all: Option<String>,

    /// Test generation override.
    pub tests: Option<bool>,
}
