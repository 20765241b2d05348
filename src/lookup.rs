//! External DOI lookup.
//!
//! The lookup is a black box to the rest of the tool: title and author in,
//! optional DOI out. The production implementation POSTs to the Crossref
//! guest query form and scrapes the first `doi.org/<id>` reference out of
//! the HTML response.

use regex::Regex;
use thiserror::Error;

/// Errors that can occur during a lookup call.
///
/// The enrichment orchestrator swallows these per entry; they are never
/// fatal to a batch.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("lookup request failed: {0}")]
    Transport(String),
}

/// A title+author DOI search.
///
/// Returns `Ok(None)` when the service has no match. Transport failures
/// surface as [`LookupError`] and are treated as no-result by the caller.
pub trait DoiLookup {
    fn search(&self, title: &str, author: &str) -> Result<Option<String>, LookupError>;
}

const GUEST_QUERY_URL: &str = "https://www.crossref.org/guestquery/";

/// DOI lookup backed by the Crossref guest query form.
///
/// Blocking, one HTTPS round trip per call, transport-default timeouts,
/// no retries.
#[derive(Debug, Default)]
pub struct CrossrefLookup;

impl DoiLookup for CrossrefLookup {
    fn search(&self, title: &str, author: &str) -> Result<Option<String>, LookupError> {
        let response = ureq::post(GUEST_QUERY_URL)
            .set("User-Agent", "Mozilla/5.0")
            .set("Accept", "text/html")
            .send_form(&[
                ("titlesearch", "titlesearch"),
                ("auth2", author),
                ("atitle2", title),
                ("multi_hit", "on"),
                ("article_title_search", "Search"),
                ("queryType", "author-title"),
            ])
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let body = response
            .into_string()
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        Ok(extract_doi(&body))
    }
}

/// Scans a response body for the first embedded `doi.org/<identifier>`
/// reference and returns the bare identifier.
pub fn extract_doi(body: &str) -> Option<String> {
    let doi_re = Regex::new(r#"doi\.org/([^"^<>]+)"#).unwrap();
    doi_re
        .captures(body)
        .map(|cap| cap[1].to_string())
}
