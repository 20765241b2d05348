//! Bibliography data model and BibTeX file I/O.
//!
//! Parsing is delegated to the `biblatex` crate; its entries are flattened
//! right after parse into a plain ordered field mapping, which is all the
//! rest of the tool works with. Serialization writes 4-space-indented
//! BibTeX entries directly.

use std::fs;
use std::path::{Path, PathBuf};

use biblatex::Chunk;
use thiserror::Error;

/// Errors that can occur when loading or saving a bibliography.
#[derive(Error, Debug)]
pub enum BibError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid BibTeX: {0}")]
    ParseError(String),
}

/// One bibliographic record: a type tag, a citation key, and an ordered
/// mapping of field name to field value.
///
/// Field names are stored lowercase; lookups are case-insensitive for the
/// caller. Field order from the source file is preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Citation key from the source file
    pub key: String,
    /// Entry type tag, lowercase (e.g. "article", "inproceedings")
    pub kind: String,
    /// Field name/value pairs in source order
    pub fields: Vec<(String, String)>,
}

impl Entry {
    /// Returns the value of the named field, matching case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.fields
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Sets the named field, overwriting an existing value in place or
    /// appending a new field at the end.
    pub fn set(&mut self, name: &str, value: &str) {
        let name = name.to_lowercase();
        if let Some(slot) = self.fields.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value.to_string();
        } else {
            self.fields.push((name, value.to_string()));
        }
    }

    /// True if the entry carries a DOI that is not blank.
    ///
    /// An absent field and a whitespace-only value are both "no DOI": such
    /// entries are eligible for enrichment.
    pub fn has_doi(&self) -> bool {
        self.get("doi").is_some_and(|d| !d.trim().is_empty())
    }
}

/// An ordered sequence of entries, insertion order preserved from the
/// source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bibliography {
    pub entries: Vec<Entry>,
}

impl Bibliography {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses BibTeX source text into a [`Bibliography`].
///
/// # Errors
///
/// Returns [`BibError::ParseError`] if the source is not valid BibTeX.
pub fn parse_bibliography(src: &str) -> Result<Bibliography, BibError> {
    let raw = biblatex::Bibliography::parse(src).map_err(|e| BibError::ParseError(e.to_string()))?;

    let entries = raw
        .into_iter()
        .map(|entry| {
            let kind = entry.entry_type.to_string().to_lowercase();
            let mut fields: Vec<(String, String, usize)> = entry
                .fields
                .iter()
                .map(|(name, chunks)| {
                    (
                        name.to_lowercase(),
                        field_source(chunks, src),
                        field_position(chunks),
                    )
                })
                .collect();
            // the parser hands fields back alphabetized; the chunk spans
            // recover their position in the source file
            fields.sort_by_key(|(_, _, position)| *position);
            Entry {
                key: entry.key.clone(),
                kind,
                fields: fields.into_iter().map(|(name, value, _)| (name, value)).collect(),
            }
        })
        .collect();

    Ok(Bibliography { entries })
}

/// Loads a bibliography from a BibTeX file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_bibliography(path: &Path) -> Result<Bibliography, BibError> {
    let content = fs::read_to_string(path)?;
    parse_bibliography(&content)
}

/// Serializes a bibliography as BibTeX text, entries 4-space-indented with
/// brace-delimited values, one blank line between entries.
pub fn to_bibtex(bibliography: &Bibliography) -> String {
    let mut out = String::new();
    for (i, entry) in bibliography.entries.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push('@');
        out.push_str(&entry.kind);
        out.push('{');
        out.push_str(&entry.key);
        out.push_str(",\n");
        for (name, value) in &entry.fields {
            out.push_str("    ");
            out.push_str(name);
            out.push_str(" = {");
            out.push_str(value);
            out.push_str("},\n");
        }
        out.push_str("}\n");
    }
    out
}

/// Writes the bibliography to `path` as BibTeX.
pub fn save_bibliography(bibliography: &Bibliography, path: &Path) -> Result<(), BibError> {
    fs::write(path, to_bibtex(bibliography))?;
    Ok(())
}

/// Derives the enriched-bibliography output path: input filename + "_doi.bib".
pub fn enriched_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push("_doi.bib");
    PathBuf::from(name)
}

/// Recovers a field value exactly as authored, by slicing the parse source
/// with the chunk spans.
///
/// The parser interprets values (`--` becomes an en-dash, accent commands
/// become their Unicode characters); the spans still point at the original
/// bytes, so slicing from the first chunk to the last keeps LaTeX markup,
/// `$...$` segments, and dash ligatures verbatim through re-serialization.
fn field_source(chunks: &[biblatex::Spanned<Chunk>], src: &str) -> String {
    let (Some(first), Some(last)) = (chunks.first(), chunks.last()) else {
        return String::new();
    };
    match src.get(first.span.start..last.span.end) {
        Some(text) => text.to_string(),
        None => flatten_chunks(chunks),
    }
}

/// Byte offset of the field's value in the source, for restoring source
/// field order. Valueless fields sort last.
fn field_position(chunks: &[biblatex::Spanned<Chunk>]) -> usize {
    chunks.first().map_or(usize::MAX, |chunk| chunk.span.start)
}

/// Flattens interpreted field chunks into one plain string. Only used when
/// a chunk span does not map back into the source.
///
/// Math chunks are re-wrapped in `$...$` so the normalizer's math rule
/// still sees them.
fn flatten_chunks(chunks: &[biblatex::Spanned<Chunk>]) -> String {
    chunks
        .iter()
        .map(|spanned| match &spanned.v {
            Chunk::Normal(s) => s.clone(),
            Chunk::Verbatim(s) => s.clone(),
            Chunk::Math(s) => format!("${}$", s),
        })
        .collect::<Vec<String>>()
        .join("")
}
