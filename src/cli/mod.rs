//! CLI module for umlizer

mod args;

pub use args::{Args, Command};

use crate::analysis::{CancelFlag, Extractor, LoadFailure};
use crate::config::{Config, OutputFormat, DEFAULT_CONFIG_FILE};
use crate::error::{Error, Result};
use crate::logging::init_logging;
use crate::output::{render, write_json, ClassDiagram, DotWriter};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, warn};

/// Width of the diagnostic block borders
const BORDER_WIDTH: usize = 80;

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();

    match execute(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e.to_string().red().bold());
            ExitCode::FAILURE
        }
    }
}

fn execute(args: Args) -> Result<()> {
    match args.command {
        Command::Class {
            source,
            output,
            format,
            exclude,
            config,
            verbose,
            log_level,
        } => {
            init_logging(log_level.as_deref(), verbose)?;

            let mut cfg = load_config(config.as_deref())?;
            cfg.merge_cli(output, exclude, format);
            cfg.validate()?;
            debug!(?cfg, "configuration");

            let cancel = CancelFlag::new();
            listen_for_interrupt(cancel.clone());

            let extraction = Extractor::new(cfg.clone())
                .with_verbose(verbose)
                .with_cancel_flag(cancel.clone())
                .extract(&source)?;

            for failure in &extraction.failures {
                print_failure(failure);
            }

            let diagram = ClassDiagram::build(&extraction.structures, verbose);
            for path in write_artifacts(&cfg, &diagram, &extraction.structures, &cancel)? {
                println!("Written: {}", path.display());
            }

            Ok(())
        }

        Command::Version => {
            println!("umlizer {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Explicit config files must load; the default one is optional
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                Config::load(default_path)
            } else {
                Ok(Config::default())
            }
        }
    }
}

/// Set `cancel` on Ctrl-C from a background runtime
fn listen_for_interrupt(cancel: CancelFlag) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(error = %e, "interrupt listener unavailable");
                return;
            }
        };

        runtime.block_on(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, stopping before the next file or artifact");
                cancel.cancel();
            }
        });
    });
}

/// Print a bordered block naming the module that failed to load
fn print_failure(failure: &LoadFailure) {
    let header = format!(" Error loading module {} ", failure.module);
    eprintln!("{}", format!("{:=^width$}", header, width = BORDER_WIDTH).yellow());
    eprintln!("{}", failure.message);
    eprintln!("{}", ".".repeat(BORDER_WIDTH));
}

/// Write the DOT source plus the configured artifact; returns written paths.
/// Nothing further is written once `cancel` is set.
fn write_artifacts(
    cfg: &Config,
    diagram: &ClassDiagram,
    structures: &[crate::analysis::EntityStructure],
    cancel: &CancelFlag,
) -> Result<Vec<PathBuf>> {
    check_cancelled(cancel)?;
    if let Some(parent) = cfg.output.target.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let dot_path = cfg.dot_path();
    DotWriter::new(&cfg.diagram).write(diagram, &dot_path)?;
    let mut written = vec![dot_path.clone()];

    check_cancelled(cancel)?;
    match cfg.diagram.format {
        OutputFormat::Dot => {}
        OutputFormat::Json => {
            let json_path = cfg.artifact_path();
            write_json(structures, &json_path)?;
            written.push(json_path);
        }
        format => {
            let image_path = cfg.artifact_path();
            render(&dot_path, format, &image_path)?;
            written.push(image_path);
        }
    }

    Ok(written)
}

fn check_cancelled(cancel: &CancelFlag) -> Result<()> {
    if cancel.is_cancelled() {
        Err(Error::Interrupted)
    } else {
        Ok(())
    }
}
