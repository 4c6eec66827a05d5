//! CLI subcommands — convert, validate.

use crate::core::blacklist::{Blacklist, DEFAULT_FILE};
use crate::core::{call, har, pipeline};
use clap::Subcommand;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert HAR capture(s) into a locustfile
    Convert {
        /// HAR files, merged in the order given
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Blacklist file (one host substring per line)
        #[arg(short, long, default_value = DEFAULT_FILE)]
        blacklist: PathBuf,

        /// Output path (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Parse a HAR capture and check every request builds a call expression
    Validate {
        /// Path to the HAR file
        file: PathBuf,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Convert {
            files,
            blacklist,
            out,
        } => cmd_convert(&files, &blacklist, out.as_deref()),
        Commands::Validate { file } => cmd_validate(&file),
    }
}

fn cmd_convert(files: &[PathBuf], blacklist_path: &Path, out: Option<&Path>) -> Result<(), String> {
    let blacklist = Blacklist::load(blacklist_path)?;

    let mut requests = Vec::new();
    for file in files {
        requests.extend(har::parse_har_file(file)?);
    }

    let script = pipeline::transform_with_blacklist(requests, &blacklist)
        .map_err(|e| describe_chain(&e))?;

    match out {
        Some(path) => {
            std::fs::write(path, &script)
                .map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{}", script),
    }
    Ok(())
}

fn cmd_validate(file: &Path) -> Result<(), String> {
    let requests = har::parse_har_file(file)?;

    let mut errors = Vec::new();
    for request in &requests {
        if let Err(e) = call::request_to_expr(request) {
            errors.push(format!(
                "{} {}: {}",
                request.method,
                request.url,
                describe_chain(&e)
            ));
        }
    }

    if errors.is_empty() {
        println!("OK: {} ({} requests)", file.display(), requests.len());
        Ok(())
    } else {
        for e in &errors {
            eprintln!("  ERROR: {}", e);
        }
        Err(format!("{} request(s) cannot be converted", errors.len()))
    }
}

/// Flatten an error and its source chain into one line.
fn describe_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
