//! CLI for doi-tools - Enrich a BibTeX bibliography with missing DOIs.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use doi_tools::{
    enrich, enriched_path, export_ifmo, ifmo_path, load_bibliography, save_bibliography,
    CrossrefLookup,
};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Enrich a BibTeX bibliography with missing DOIs and export a citation list
#[derive(Parser)]
#[command(name = "doi-tools")]
#[command(version)]
#[command(after_help = "\
Examples:
  doi-tools refs.bib

Outputs, next to the input file:
  <input>_doi.bib    the enriched bibliography
  <input>.ifmo.txt   one formatted citation per line")]
struct Cli {
    /// Input BibTeX bibliography file
    input: PathBuf,
}

// ---------------------------------------------------------------------------
// AppError — semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 10 — input file not found / unreadable
    InputFile(String),
    /// Exit 11 — bibliography file not valid BibTeX
    BibFile(String),
    /// Exit 12 — cannot write an output file
    OutputFile(String),
    /// Exit 13 — citation formatting failed on a malformed entry
    Export(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::InputFile(_) => 10,
            AppError::BibFile(_) => 11,
            AppError::OutputFile(_) => 12,
            AppError::Export(_) => 13,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InputFile(msg) => {
                write!(f, "{}\n  hint: verify the file path is correct", msg)
            }
            AppError::BibFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: the file must be a BibTeX bibliography (@type{{key, field = {{value}}, ...}})",
                    msg
                )
            }
            AppError::OutputFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: check that the output directory exists and is writable",
                    msg
                )
            }
            AppError::Export(msg) => {
                write!(
                    f,
                    "{}\n  hint: article entries need journal/year/volume/number/pages, inproceedings need booktitle/address/year/pages",
                    msg
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    enrich_command(&cli.input)
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Load, enrich, and export one bibliography file.
fn enrich_command(input: &Path) -> Result<(), AppError> {
    // 1. Load the bibliography
    println!("Reading Bibliography...");
    let mut bibliography = load_bibliography(input).map_err(|e| match e {
        doi_tools::bib::BibError::IoError(io) => {
            AppError::InputFile(format!("'{}': {}", input.display(), io))
        }
        other => AppError::BibFile(format!("'{}': {}", input.display(), other)),
    })?;

    // 2. Enrich entries that are missing a DOI
    println!("Looking for DOIs...");
    let lookup = CrossrefLookup;
    let report = enrich(&mut bibliography, &lookup, |done, total| {
        eprint!("\r{}/{} entries processed, please wait...", done, total);
        let _ = io::stderr().flush();
    });
    if report.total > 0 {
        eprintln!();
    }

    println!(
        "We added {new} DOIs !\nBefore: {before}/{total} entries had DOI\nNow: {after}/{total} entries have DOI",
        new = report.new,
        before = report.before,
        after = report.before + report.new,
        total = report.total,
    );
    for (key, reason) in report.skipped() {
        eprintln!("skipped entry '{}': {}", key, reason);
    }

    // 3. Write the enriched bibliography
    let bib_out = enriched_path(input);
    println!("Writing result to {}", bib_out.display());
    save_bibliography(&bibliography, &bib_out)
        .map_err(|e| AppError::OutputFile(format!("'{}': {}", bib_out.display(), e)))?;

    // 4. Write the citation list
    let ifmo_out = ifmo_path(input);
    let export_report = export_ifmo(&bibliography, &ifmo_out).map_err(|e| match e {
        doi_tools::ifmo::ExportError::IoError(io) => {
            AppError::OutputFile(format!("'{}': {}", ifmo_out.display(), io))
        }
        other => AppError::Export(other.to_string()),
    })?;
    for (_, reason) in &export_report.skipped {
        eprintln!("ERROR: {}; entry skipped", reason);
    }
    println!("Output is saved to: {}", ifmo_out.display());

    Ok(())
}
