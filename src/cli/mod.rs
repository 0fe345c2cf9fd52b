//! CLI module for gendoc

mod args;

pub use args::{Args, Command};

use crate::checker::Program;
use crate::config::Config;
use crate::docs::{generate, GenerateOptions};
use crate::error::{Error, Result};
use crate::output::JsonWriter;
use std::path::Path;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();

    let verbose = matches!(args.command, Command::Generate { verbose: true, .. });
    init_tracing(verbose);

    match execute(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr so JSON on stdout stays clean.
/// `GENDOC_LOG` overrides the level; `-v` raises the default to debug.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("GENDOC_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn execute(args: Args) -> Result<()> {
    match args.command {
        Command::Generate {
            root,
            output,
            config,
            base_url,
            compact,
            source_locators,
            verbose: _,
        } => {
            // An explicit config must load; the default one is optional
            let mut cfg = match &config {
                Some(config_path) => Config::load(config_path)?,
                None => Config::load_or_default(Path::new("gendoc.toml")),
            };

            // Merge CLI arguments (CLI takes precedence)
            cfg.merge_cli(root, output, base_url, compact, source_locators);

            let root = cfg.project.root.clone().ok_or_else(|| {
                Error::config_validation("no root file given; pass ROOT or set project.root")
            })?;

            info!(root = %root.display(), "loading program");
            let program = Program::create(&root, &cfg.compiler)?;

            let options = GenerateOptions {
                source_locators: cfg.output.source_locators,
            };
            let entries = generate(&program, options)?;

            let writer = JsonWriter::new(cfg.output.pretty);
            writer.write(&entries, cfg.output.path.as_deref())?;

            if let Some(path) = &cfg.output.path {
                println!(
                    "Wrote {} entries from {} files to {}",
                    entries.len(),
                    program.source_files().len(),
                    path.display()
                );
            }

            Ok(())
        }

        Command::Version => {
            println!("gendoc {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
