//! # msgp-rs
//!
//! CLI tool for generating MessagePack codecs from schema documents.
//!
//! ## Usage
//!
//! ```bash
//! # Generate codecs from the schemas in the current directory
//! msgp-rs generate
//!
//! # Generate into a specific output directory
//! msgp-rs generate --input ./schemas --output ./src/generated
//!
//! # Dry run to preview changes
//! msgp-rs generate --dry-run
//!
//! # Initialize configuration
//! msgp-rs init
//!
//! # Check that generated files are up-to-date
//! msgp-rs validate --input ./schemas
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use msgp_rs_cli::{
    config::{CliArgs, Config, ConfigManager, CONFIG_FILENAME},
    error::{CliError, GenerateError},
    generator::CodecRunner,
    loader::load_documents,
    scanner::SchemaScanner,
    writer::{FileStatus, FileWriter, WriteResult},
};

#[derive(Parser)]
#[command(name = "msgp-rs")]
#[command(author, version, about = "Generate MessagePack codecs from schema documents", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate codecs from schema documents
    Generate {
        /// Schema file or directory containing schema documents
        #[arg(short, long, default_value = ".")]
        input: PathBuf,

        /// Output directory for generated Rust files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Preview changes without writing files
        #[arg(long)]
        dry_run: bool,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Filter schema files by path pattern (glob)
        #[arg(long)]
        filter: Option<String>,

        /// Key rule for untagged fields (camelCase, snake_case, ...)
        #[arg(long)]
        rename_all: Option<String>,

        /// Skip generating round-trip tests
        #[arg(long)]
        no_tests: bool,
    },

    /// Initialize a new msgp-rs configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = CONFIG_FILENAME)]
        output: PathBuf,

        /// Overwrite existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Validate that generated files are up-to-date
    Validate {
        /// Schema file or directory containing schema documents
        #[arg(short, long, default_value = ".")]
        input: PathBuf,

        /// Output directory holding the generated files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Filter schema files by path pattern (glob)
        #[arg(long)]
        filter: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            match e {
                CliError::Validation(_) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Generate {
            input,
            output,
            dry_run,
            config,
            filter,
            rename_all,
            no_tests,
        } => {
            let args = CliArgs {
                output,
                rename_all,
                tests: no_tests.then_some(false),
                ..Default::default()
            };
            let config = load_config(config.as_deref(), &args)?;
            run_generate(&input, &config, filter.as_deref(), dry_run)
        }

        Commands::Init { output, force } => cmd_init(output, force),

        Commands::Validate {
            input,
            output,
            config,
            filter,
        } => {
            let args = CliArgs {
                output,
                ..Default::default()
            };
            let config = load_config(config.as_deref(), &args)?;
            cmd_validate(&input, &config, filter.as_deref())
        }
    }
}

fn load_config(path: Option<&Path>, args: &CliArgs) -> Result<Config, CliError> {
    let config = ConfigManager::load(path)?;
    Ok(ConfigManager::merge_cli_args(config, args))
}

fn load_schemas(input: &Path, filter: Option<&str>) -> Result<msgp_rs_gen::SchemaDocument, CliError> {
    let mut scanner = SchemaScanner::new(input);
    if let Some(pattern) = filter {
        scanner = scanner.with_filter(pattern)?;
    }

    let files = scanner.scan()?;
    println!("  Found {} schema file(s)", files.len().to_string().green());

    let doc = load_documents(&files)?;
    println!("  Found {} type(s)", doc.types.len().to_string().green());
    Ok(doc)
}

/// Run codec generation once.
fn run_generate(
    input: &Path,
    config: &Config,
    filter: Option<&str>,
    dry_run: bool,
) -> Result<(), CliError> {
    println!("{}", "Scanning for schema files...".cyan());
    let doc = load_schemas(input, filter)?;

    println!("{}", "Generating codecs...".cyan());
    let runner = CodecRunner::new(config.clone())?;
    let output = runner.generate(&doc);

    if let Some(codecs) = output.codecs() {
        println!(
            "  Generated {} type(s)",
            codecs.file.types.len().to_string().green()
        );
    }

    let writer = FileWriter::new(dry_run);
    for file in &output.files {
        match writer.write(&file.path, &file.file.content)? {
            WriteResult::Written { path, bytes } => {
                println!(
                    "{} Written {} bytes to {}",
                    "✓".green(),
                    bytes,
                    path.display()
                );
            }
            WriteResult::Unchanged { path } => {
                println!("{} Unchanged {}", "✓".green(), path.display());
            }
            WriteResult::DryRun { content, path } => {
                println!(
                    "{} Would write to {}:",
                    "[dry-run]".yellow(),
                    path.display()
                );
                println!("{}", "─".repeat(60).dimmed());
                println!("{}", content);
                println!("{}", "─".repeat(60).dimmed());
            }
        }
    }

    if output.is_complete() {
        Ok(())
    } else {
        for error in &output.errors {
            println!("{} {}", "✗".red(), error);
        }
        Err(GenerateError::Types(output.errors).into())
    }
}

/// Init command implementation.
fn cmd_init(output: PathBuf, force: bool) -> Result<(), CliError> {
    if output.exists() && !force {
        println!(
            "{} Configuration file already exists: {}",
            "Error:".red(),
            output.display()
        );
        println!("  Use --force to overwrite");
        return Err(CliError::Validation(
            "Configuration file already exists".to_string(),
        ));
    }

    std::fs::write(&output, ConfigManager::default_config_content())?;

    println!(
        "{} Created configuration file: {}",
        "✓".green(),
        output.display()
    );

    Ok(())
}

/// Validate command implementation.
fn cmd_validate(input: &Path, config: &Config, filter: Option<&str>) -> Result<(), CliError> {
    println!("{}", "Validating generated files...".cyan());
    let doc = load_schemas(input, filter)?;

    let output = CodecRunner::new(config.clone())?.generate(&doc);

    let mut outdated = 0;
    for file in &output.files {
        match FileWriter::status(&file.path, &file.file.content) {
            FileStatus::UpToDate => println!("{} {}", "✓".green(), file.path.display()),
            FileStatus::Stale => {
                outdated += 1;
                println!("{} {} is out of date", "✗".red(), file.path.display());
            }
            FileStatus::Missing => {
                outdated += 1;
                println!("{} {} is missing", "✗".red(), file.path.display());
            }
        }
    }

    if outdated == 0 {
        println!("{} Generated files are up-to-date", "✓".green());
        Ok(())
    } else {
        println!("  Run 'msgp-rs generate' to update");
        Err(CliError::Validation(format!(
            "{} generated file(s) out of date",
            outdated
        )))
    }
}

/// Print an error with formatting.
fn print_error(error: &CliError) {
    eprintln!("{} {}", "Error:".red().bold(), error);
}
