//! Author list parsing.
//!
//! Splits raw "and"-joined author/editor fields into individual normalized
//! names, derives surnames with the comma/space heuristic, and abbreviates
//! given names to initials for the citation-list export.

use regex::Regex;
use thiserror::Error;

use crate::bib::Entry;
use crate::normalize::normalize;

/// Errors that can occur when reading contributors from an entry.
#[derive(Error, Debug, PartialEq)]
pub enum AuthorError {
    #[error("entry '{0}' has neither an author nor an editor field")]
    MissingContributors(String),
}

/// Splits a raw author/editor field into individual normalized names.
///
/// The field is normalized first, then split on the standalone word "and"
/// (case-sensitive). Pieces are whitespace-trimmed; empty pieces are kept,
/// so a doubled separator yields an empty name.
///
/// # Examples
///
/// ```
/// use doi_tools::split_authors;
///
/// let names = split_authors("Smith, John and Jones, Jane");
/// assert_eq!(names, ["Smith, John", "Jones, Jane"]);
/// ```
pub fn split_authors(raw: &str) -> Vec<String> {
    let separator = Regex::new(r"\band\b").unwrap();
    separator
        .split(&normalize(raw))
        .map(|piece| piece.trim().to_string())
        .collect()
}

/// Derives a surname from a free-form name string.
///
/// - "Lastname, Firstname" form: everything before the first comma.
/// - "Firstname Lastname" form: everything after the last space.
/// - A single token is its own surname.
pub fn surname_of(name: &str) -> &str {
    if let Some((last, _)) = name.split_once(',') {
        last
    } else if let Some((_, last)) = name.rsplit_once(' ') {
        last
    } else {
        name
    }
}

/// Returns the raw contributor field of an entry: "author", falling back to
/// "editor" when no author is present.
pub fn contributor_field(entry: &Entry) -> Result<&str, AuthorError> {
    entry
        .get("author")
        .or_else(|| entry.get("editor"))
        .ok_or_else(|| AuthorError::MissingContributors(entry.key.clone()))
}

/// Extracts the contributors' surnames from an entry, in field order.
///
/// # Errors
///
/// Returns [`AuthorError::MissingContributors`] if the entry has neither an
/// author nor an editor field.
pub fn extract_authors(entry: &Entry) -> Result<Vec<String>, AuthorError> {
    let raw = contributor_field(entry)?;
    Ok(split_authors(raw)
        .iter()
        .map(|name| surname_of(name).to_string())
        .collect())
}

/// Abbreviates a normalized name to "Surname F.M." form.
///
/// The name is split into surname and given part with the same comma/space
/// rule as [`surname_of`]; every maximal run of lowercase letters in the
/// given part becomes a single ".". A single-token name is treated as a
/// bare surname with no initials.
///
/// # Examples
///
/// ```
/// use doi_tools::shortify;
///
/// assert_eq!(shortify("Smith, John"), "Smith J.");
/// assert_eq!(shortify("Pierre-Olivier Gutman"), "Gutman P.-O.");
/// ```
pub fn shortify(name: &str) -> String {
    let (last, first) = if name.contains(',') {
        match name.split_once(", ") {
            Some((last, first)) => (last, first),
            // comma without a following space: no given part to abbreviate
            None => (name, ""),
        }
    } else if let Some((first, last)) = name.split_once(' ') {
        (last, first)
    } else {
        (name, "")
    };

    if first.is_empty() {
        return last.to_string();
    }

    let lowercase_run = Regex::new(r"[a-z]+").unwrap();
    let initials = lowercase_run.replace_all(first, ".");
    format!("{} {}", last, initials)
}
