//! Minimal CLI entry point for manual, end-to-end verification of the
//! workspace (`spec.md` §1's Non-goals exclude the CLI surface itself as
//! a core deliverable; this binary exists only to exercise `rde::run`).
//!
//! ```text
//! rde --inputdata <dir> --invoice <dir> --tasksupport <dir> --output <dir>
//!     [--scratch <dir>] [--verbose]
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use rde::{RdeError, RunPaths};

struct Args {
    inputdata: PathBuf,
    invoice: PathBuf,
    tasksupport: PathBuf,
    output: PathBuf,
    scratch: Option<PathBuf>,
    verbose: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut inputdata = None;
    let mut invoice = None;
    let mut tasksupport = None;
    let mut output = None;
    let mut scratch = None;
    let mut verbose = false;

    let mut raw = std::env::args().skip(1);
    while let Some(flag) = raw.next() {
        match flag.as_str() {
            "--inputdata" => inputdata = Some(PathBuf::from(require_value(&flag, raw.next())?)),
            "--invoice" => invoice = Some(PathBuf::from(require_value(&flag, raw.next())?)),
            "--tasksupport" => tasksupport = Some(PathBuf::from(require_value(&flag, raw.next())?)),
            "--output" => output = Some(PathBuf::from(require_value(&flag, raw.next())?)),
            "--scratch" => scratch = Some(PathBuf::from(require_value(&flag, raw.next())?)),
            "--verbose" => verbose = true,
            other => return Err(format!("unrecognized argument '{other}'")),
        }
    }

    Ok(Args {
        inputdata: inputdata.ok_or("missing required --inputdata <dir>")?,
        invoice: invoice.ok_or("missing required --invoice <dir>")?,
        tasksupport: tasksupport.ok_or("missing required --tasksupport <dir>")?,
        output: output.ok_or("missing required --output <dir>")?,
        scratch,
        verbose,
    })
}

fn require_value(flag: &str, value: Option<String>) -> Result<String, String> {
    value.ok_or_else(|| format!("{flag} requires a value"))
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("rde: {message}");
            return ExitCode::from(2);
        }
    };

    let log_dir = args.output.join("logs");
    if let Err(err) = rde_logging::init_logging(
        log_dir,
        rde_logging::LogConfig {
            app_name: "rde",
            verbose: args.verbose,
        },
    ) {
        eprintln!("rde: failed to initialize logging: {err:#}");
        return ExitCode::from(2);
    }

    let paths = RunPaths {
        inputdata: args.inputdata,
        invoice: args.invoice,
        tasksupport: args.tasksupport,
        output_root: args.output.clone(),
        scratch_root: args.scratch.unwrap_or_else(|| args.output.join(".scratch")),
    };

    match rde::run(&paths, None) {
        Ok(summary) => {
            for status in &summary.statuses {
                if let Some(error) = &status.error {
                    eprintln!("rde: tile {} failed: {error}", status.tile_index);
                }
            }
            ExitCode::from(summary.exit_code() as u8)
        }
        Err(RdeError::Fatal(err)) => {
            eprintln!("rde: {err:#}");
            if let Some(docs_url) = err.docs_url() {
                eprintln!("rde: see {docs_url}");
            }
            ExitCode::from(2)
        }
        Err(RdeError::Classify(err)) => {
            eprintln!("rde: {err:#}");
            ExitCode::from(2)
        }
    }
}
