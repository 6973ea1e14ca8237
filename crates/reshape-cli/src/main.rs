//! # reshape-cli
//!
//! Command-line interface for the reshape record mapping engine.
//!
//! Maps JSON records through schema files and checks schema files for
//! errors.

mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::CliConfig;
use reshape_dsl::{SchemaDsl, TransformRegistry};
use reshape_mapping::ObjectNode;
use serde_json::Value;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit code used when a record does not fit its schema
const EXIT_ISSUES: u8 = 2;

#[derive(Parser)]
#[command(name = "reshape")]
#[command(about = "Declarative record reshaping")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map a JSON record through a schema
    Map {
        /// Schema file path (YAML or JSON)
        #[arg(short, long)]
        schema: PathBuf,

        /// Input record path, stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output path, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the mapped record
        #[arg(long)]
        pretty: bool,
    },

    /// Parse and compile a schema without mapping anything
    Check {
        /// Schema file path (YAML or JSON)
        #[arg(short, long)]
        schema: PathBuf,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => None,
    };
    let config = loaded.clone().unwrap_or_default();
    init_logging(&config);

    if let (Some(path), None) = (&cli.config, &loaded) {
        tracing::warn!("Configuration {} not found, using defaults", path.display());
    }

    match cli.command {
        Commands::Map {
            schema,
            input,
            output,
            pretty,
        } => run_map(
            &schema,
            input.as_deref(),
            output.as_deref(),
            pretty || config.pretty,
        ),
        Commands::Check { schema } => run_check(&schema),
    }
}

fn init_logging(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_schema(path: &Path) -> anyhow::Result<(String, usize, ObjectNode)> {
    let definition = SchemaDsl::parse_file(path)
        .with_context(|| format!("Failed to load schema {}", path.display()))?;
    let schema = definition
        .compile(&TransformRegistry::with_builtins())
        .with_context(|| format!("Failed to compile schema {}", path.display()))?;

    Ok((definition.name.clone(), definition.field_count(), schema))
}

fn run_map(
    schema_path: &Path,
    input: Option<&Path>,
    output: Option<&Path>,
    pretty: bool,
) -> anyhow::Result<ExitCode> {
    let (name, _, schema) = load_schema(schema_path)?;
    tracing::info!("Mapping with schema '{}'", name);

    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read input from stdin")?;
            buffer
        }
    };
    let source: Value = serde_json::from_str(&raw).context("Input is not valid JSON")?;

    let record = match schema.map(&source) {
        Ok(record) => record,
        Err(reshape_mapping::Error::Issues(err)) => {
            eprintln!("{} issue(s) found:", err.issues().len());
            for issue in err.issues() {
                eprintln!("  {issue}");
            }
            return Ok(ExitCode::from(EXIT_ISSUES));
        }
        Err(other) => return Err(other.into()),
    };

    let rendered = if pretty {
        serde_json::to_string_pretty(&record)?
    } else {
        serde_json::to_string(&record)?
    };

    match output {
        Some(path) => {
            std::fs::write(path, format!("{rendered}\n"))
                .with_context(|| format!("Failed to write output {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{rendered}").context("Failed to write output")?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn run_check(schema_path: &Path) -> anyhow::Result<ExitCode> {
    let (name, fields, _) = load_schema(schema_path)?;
    println!("Schema '{name}' is valid ({fields} fields)");
    Ok(ExitCode::SUCCESS)
}
