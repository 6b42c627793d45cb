//! The remold command-line interface.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use remold::cst::{ParserOptions, SyntaxExtension};
use remold::output;
use remold::runner::{self, RunOptions};
use remold::transforms::builtin_registry;
use remold::{RemoldError, DEFAULT_PATTERN};

#[derive(Parser)]
#[command(name = "remold", version, about = "Batch codemod runner")]
struct Cli {
    /// Directory to run against.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Emit the run report as JSON on stdout.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply a transform to every matching file.
    Run {
        /// Registered transform name.
        transform: String,

        /// Glob pattern, relative to the root.
        #[arg(default_value = DEFAULT_PATTERN)]
        pattern: String,

        /// Report changes without writing any file.
        #[arg(long)]
        dry_run: bool,

        /// Enable a syntax extension (repeatable).
        #[arg(long = "ext", value_name = "EXTENSION")]
        extensions: Vec<SyntaxExtension>,
    },

    /// List the registered transforms.
    List,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env("REMOLD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match execute(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.error_code().code())
        }
    }
}

fn execute(cli: Cli) -> Result<ExitCode, RemoldError> {
    let registry = builtin_registry()?;

    match cli.command {
        Command::List => {
            for name in registry.names() {
                println!("{name}");
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Run {
            transform,
            pattern,
            dry_run,
            extensions,
        } => {
            let mut parser = ParserOptions::new();
            for extension in extensions {
                parser = parser.with(extension);
            }
            let options = RunOptions { dry_run, parser };

            let result = runner::run(&registry, &transform, &cli.root, &pattern, &options)?;

            if cli.json {
                println!("{}", output::to_json(&result)?);
            } else if dry_run {
                print!("{}", output::render_dry_run(&result));
            } else {
                print!("{}", output::render_summary(&result));
            }

            match &result.failure {
                Some(failure) => Ok(ExitCode::from(failure.code)),
                None => Ok(ExitCode::SUCCESS),
            }
        }
    }
}
