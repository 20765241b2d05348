//! Citation-list export in the ifmo style.
//!
//! Renders each entry as one human-readable citation line
//! (`<authors> <title> // <venue> doi: <doi>`) and writes the lines to a
//! text file in entry order. Reference style, e.g.:
//!
//! > Donatelli M., Estatico C., Martinelli A., Serra-Capizzano S. Improved
//! > image deblurring with anti-reflective boundary conditions and
//! > re-blurring // Inverse Problems. 2006. V. 22. N 6. P. 2035-2053.
//!
//! Only `article` and `inproceedings` entries have a venue template; other
//! types are skipped with a diagnostic instead of aborting the batch.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::authors::{contributor_field, shortify, split_authors, AuthorError};
use crate::bib::{Bibliography, Entry};

/// Platform line separator used for the output file.
const LINE_SEP: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Errors that abort the export. Unknown entry types are not errors; they
/// become [`RenderOutcome::Skipped`].
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("entry '{key}' is missing the '{field}' field required by its type")]
    MissingField { key: String, field: String },

    #[error(transparent)]
    Contributors(#[from] AuthorError),

    #[error("Failed to write file: {0}")]
    IoError(#[from] std::io::Error),
}

/// The result of rendering one entry.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// A finished citation line, without trailing separator.
    Line(String),
    /// The entry has no template; the reason identifies it for diagnostics.
    Skipped(String),
}

/// Export summary: how many lines were written and which entries were
/// skipped, with reasons.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub written: usize,
    pub skipped: Vec<(String, String)>,
}

/// Renders one entry as a citation line.
///
/// # Errors
///
/// Fails when a field required by the entry's venue template is missing,
/// or when the entry has no author or editor. An unrecognized entry type
/// is not an error; it yields [`RenderOutcome::Skipped`].
pub fn format_entry(entry: &Entry) -> Result<RenderOutcome, ExportError> {
    let venue = match venue_of(entry)? {
        Some(venue) => venue,
        None => {
            return Ok(RenderOutcome::Skipped(format!(
                "unknown entry type '{}' in entry '{}'",
                entry.kind, entry.key
            )))
        }
    };

    let authors = split_authors(contributor_field(entry)?)
        .iter()
        .map(|name| shortify(name))
        .collect::<Vec<String>>()
        .join(", ");

    let title = field(entry, "title")?;

    Ok(RenderOutcome::Line(format!(
        "{} {} // {}{}",
        authors,
        title,
        venue,
        doi_segment(entry)
    )))
}

/// Builds the venue segment for the entry, or `None` for types without a
/// template.
fn venue_of(entry: &Entry) -> Result<Option<String>, ExportError> {
    match entry.kind.as_str() {
        "article" => Ok(Some(format!(
            "{}. {}. V. {}. N {}. P. {}.",
            field(entry, "journal")?,
            field(entry, "year")?,
            field(entry, "volume")?,
            field(entry, "number")?,
            field(entry, "pages")?,
        ))),
        "inproceedings" => Ok(Some(format!(
            "{}. {}, {}. P. {}.",
            field(entry, "booktitle")?,
            field(entry, "address")?,
            field(entry, "year")?,
            field(entry, "pages")?,
        ))),
        _ => Ok(None),
    }
}

/// The DOI segment, or an empty string when the entry has no usable DOI.
///
/// A DOI given as a `doi.org` URL is reduced to the bare identifier path.
fn doi_segment(entry: &Entry) -> String {
    let doi = match entry.get("doi") {
        Some(doi) if !doi.trim().is_empty() => doi.trim(),
        _ => return String::new(),
    };

    let bare = match doi.find("doi.org/") {
        Some(idx) => &doi[idx + "doi.org/".len()..],
        None => doi,
    };

    format!(" doi: {}", bare)
}

/// Renders the whole bibliography and writes one line per renderable entry
/// to `output`, in entry order. Skipped entries produce no line and are
/// listed in the report.
///
/// # Errors
///
/// Fails on the first entry with a missing template field or missing
/// contributors, and on any write failure.
pub fn export_ifmo(bibliography: &Bibliography, output: &Path) -> Result<ExportReport, ExportError> {
    let mut report = ExportReport::default();
    let mut text = String::new();

    for entry in &bibliography.entries {
        match format_entry(entry)? {
            RenderOutcome::Line(line) => {
                text.push_str(&line);
                text.push_str(LINE_SEP);
                report.written += 1;
            }
            RenderOutcome::Skipped(reason) => {
                report.skipped.push((entry.key.clone(), reason));
            }
        }
    }

    fs::write(output, text)?;
    Ok(report)
}

/// Derives the citation-list output path: input filename + ".ifmo.txt".
pub fn ifmo_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(".ifmo.txt");
    PathBuf::from(name)
}

fn field<'a>(entry: &'a Entry, name: &str) -> Result<&'a str, ExportError> {
    entry.get(name).ok_or_else(|| ExportError::MissingField {
        key: entry.key.clone(),
        field: name.to_string(),
    })
}
