//! Shared fixtures and helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;

use doi_tools::lookup::{DoiLookup, LookupError};

/// A single article entry with no DOI, used by the end-to-end scenarios.
pub const ARTICLE_NO_DOI: &str = r#"@article{net2020,
    author = {Smith, John},
    title = {Noisy Radio Networks},
    journal = {Networks},
    year = {2020},
    volume = {12},
    number = {3},
    pages = {1--10},
}
"#;

/// A bibliography where every entry already carries a DOI. Running the full
/// pipeline on this file performs no lookups at all.
pub const ALL_HAVE_DOI: &str = r#"@article{a2019,
    author = {Adams, Carol},
    title = {First Article},
    journal = {J. One},
    year = {2019},
    volume = {1},
    number = {1},
    pages = {1--2},
    doi = {10.1/a},
}

@inproceedings{b2021,
    author = {Baker, Dan},
    title = {Second Paper},
    booktitle = {Proc. Conf},
    address = {Lisbon, Portugal},
    year = {2021},
    pages = {3--4},
    doi = {10.2/b},
}
"#;

/// Lookup backed by an author-surname → DOI table; no transport involved.
pub struct TableLookup {
    table: HashMap<String, String>,
}

impl TableLookup {
    pub fn new(matches: &[(&str, &str)]) -> Self {
        Self {
            table: matches
                .iter()
                .map(|(a, d)| (a.to_string(), d.to_string()))
                .collect(),
        }
    }

    /// A lookup that never matches anything.
    pub fn empty() -> Self {
        Self::new(&[])
    }
}

impl DoiLookup for TableLookup {
    fn search(&self, _title: &str, author: &str) -> Result<Option<String>, LookupError> {
        Ok(self.table.get(author).cloned())
    }
}

/// Lookup whose transport always fails.
pub struct OfflineLookup;

impl DoiLookup for OfflineLookup {
    fn search(&self, _: &str, _: &str) -> Result<Option<String>, LookupError> {
        Err(LookupError::Transport("network unreachable".to_string()))
    }
}
