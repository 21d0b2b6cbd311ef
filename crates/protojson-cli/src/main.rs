//! # protojson CLI entry point
//!
//! Parses command-line arguments, loads the type registry and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use protojson_cli::convert::{run_decode, run_roundtrip, ConvertArgs};
use protojson_cli::load_registry;
use protojson_cli::types::{run_types, TypesArgs};

/// Schema-driven protobuf message ⇄ JSON conversion.
///
/// Loads schemas from descriptor files, binds them through the type
/// registry and decodes JSON documents against them.
#[derive(Parser, Debug)]
#[command(name = "protojson", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory searched for `classpath:` binding tables.
    #[arg(long, global = true, value_name = "DIR")]
    resource_root: Option<PathBuf>,

    /// Descriptor file (.json, .yaml, .yml) to register. Repeatable.
    #[arg(long = "descriptors", global = true, value_name = "FILE")]
    descriptors: Vec<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List message and enum bindings.
    Types(TypesArgs),

    /// Decode JSON and print its canonical re-encoding.
    Decode(ConvertArgs),

    /// Decode, encode and decode again, checking the message is unchanged.
    Roundtrip(ConvertArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let registry = match load_registry(cli.resource_root.as_deref(), &cli.descriptors) {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };

    let result = match cli.command {
        Commands::Types(args) => run_types(&args, &registry),
        Commands::Decode(args) => run_decode(&args, &registry),
        Commands::Roundtrip(args) => run_roundtrip(&args, &registry),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
