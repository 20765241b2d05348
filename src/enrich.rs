//! DOI enrichment orchestration.
//!
//! For each entry missing a DOI, tries the external lookup with successive
//! authors until one yields a match. Best-effort per entry: a failure while
//! processing one entry never aborts the batch, it is recorded in the
//! report and the loop moves on.

use crate::authors::extract_authors;
use crate::bib::{Bibliography, Entry};
use crate::lookup::DoiLookup;

/// What happened to a single entry during enrichment.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryOutcome {
    /// The entry already carried a non-blank DOI and was left untouched.
    AlreadyHadDoi,
    /// A DOI was found and written into the entry.
    Added(String),
    /// Every author was tried; the lookup had no match. Entry unchanged.
    NoMatch,
    /// Processing failed (missing title, missing contributors, transport
    /// failure). Entry unchanged, reason recorded.
    Skipped(String),
}

/// Batch report: one outcome per entry, in entry order, plus the aggregate
/// counts.
#[derive(Debug, Default)]
pub struct EnrichReport {
    /// (citation key, outcome) per entry
    pub outcomes: Vec<(String, EntryOutcome)>,
    /// Entries that already had a DOI
    pub before: usize,
    /// Entries newly given a DOI
    pub new: usize,
    /// Total entries processed
    pub total: usize,
}

impl EnrichReport {
    /// The entries that were skipped, with their reasons.
    pub fn skipped(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|(key, outcome)| match outcome {
            EntryOutcome::Skipped(reason) => Some((key.as_str(), reason.as_str())),
            _ => None,
        })
    }
}

/// Enriches every entry missing a DOI, in place.
///
/// An entry is missing a DOI if the field is absent or whitespace-only.
/// For each such entry the lookup is called with the entry title and each
/// author surname in order; the first match is written to the `doi` field
/// and no further authors are tried. `progress(done, total)` fires after
/// every entry, matched or not.
pub fn enrich(
    bibliography: &mut Bibliography,
    lookup: &dyn DoiLookup,
    mut progress: impl FnMut(usize, usize),
) -> EnrichReport {
    let total = bibliography.len();
    let mut report = EnrichReport {
        total,
        ..EnrichReport::default()
    };

    for (i, entry) in bibliography.entries.iter_mut().enumerate() {
        let outcome = if entry.has_doi() {
            report.before += 1;
            EntryOutcome::AlreadyHadDoi
        } else {
            match try_enrich(entry, lookup) {
                Ok(Some(doi)) => {
                    report.new += 1;
                    EntryOutcome::Added(doi)
                }
                Ok(None) => EntryOutcome::NoMatch,
                Err(reason) => EntryOutcome::Skipped(reason),
            }
        };

        report.outcomes.push((entry.key.clone(), outcome));
        progress(i + 1, total);
    }

    report
}

/// Attempts to find a DOI for one entry. On success the entry is mutated;
/// on any failure it is left exactly as it was.
fn try_enrich(entry: &mut Entry, lookup: &dyn DoiLookup) -> Result<Option<String>, String> {
    let title = entry
        .get("title")
        .ok_or_else(|| format!("entry '{}' has no title field", entry.key))?
        .to_string();

    let authors = extract_authors(entry).map_err(|e| e.to_string())?;

    for author in &authors {
        match lookup.search(&title, author) {
            Ok(Some(doi)) => {
                entry.set("doi", &doi);
                return Ok(Some(doi));
            }
            Ok(None) => continue,
            Err(e) => return Err(e.to_string()),
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bib::parse_bibliography;
    use crate::lookup::LookupError;
    use std::cell::RefCell;

    /// Fake lookup that matches specific authors and records every call.
    struct FakeLookup {
        matches: Vec<(&'static str, &'static str)>,
        calls: RefCell<Vec<(String, String)>>,
    }

    impl FakeLookup {
        fn new(matches: &[(&'static str, &'static str)]) -> Self {
            Self {
                matches: matches.to_vec(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl DoiLookup for FakeLookup {
        fn search(&self, title: &str, author: &str) -> Result<Option<String>, LookupError> {
            self.calls
                .borrow_mut()
                .push((title.to_string(), author.to_string()));
            Ok(self
                .matches
                .iter()
                .find(|(a, _)| *a == author)
                .map(|(_, doi)| doi.to_string()))
        }
    }

    /// Lookup whose transport always fails.
    struct FailingLookup;

    impl DoiLookup for FailingLookup {
        fn search(&self, _: &str, _: &str) -> Result<Option<String>, LookupError> {
            Err(LookupError::Transport("connection refused".to_string()))
        }
    }

    const TWO_AUTHOR_ENTRY: &str = r#"@article{net2020,
    author = {Smith, John and Jones, Jane},
    title = {Noisy Radio Networks},
    journal = {Networks},
    year = {2020},
    volume = {12},
    number = {3},
    pages = {1--10},
}
"#;

    #[test]
    fn test_enrich_adds_doi_on_first_matching_author() {
        // Given: one entry without a DOI, lookup matching the second author
        let mut bib = parse_bibliography(TWO_AUTHOR_ENTRY).unwrap();
        let lookup = FakeLookup::new(&[("Jones", "10.1000/xyz")]);

        // When: we enrich
        let report = enrich(&mut bib, &lookup, |_, _| {});

        // Then: the DOI is set and counted as new
        assert_eq!(bib.entries[0].get("doi"), Some("10.1000/xyz"));
        assert_eq!(report.new, 1);
        assert_eq!(report.before, 0);
        assert_eq!(report.total, 1);
        assert_eq!(
            report.outcomes[0],
            ("net2020".to_string(), EntryOutcome::Added("10.1000/xyz".to_string()))
        );
    }

    #[test]
    fn test_enrich_stops_after_first_match() {
        // Given: a lookup that would match both authors with different DOIs
        let mut bib = parse_bibliography(TWO_AUTHOR_ENTRY).unwrap();
        let lookup = FakeLookup::new(&[("Smith", "10.1/first"), ("Jones", "10.2/second")]);

        // When: we enrich
        enrich(&mut bib, &lookup, |_, _| {});

        // Then: only the first author was queried and its match kept
        assert_eq!(bib.entries[0].get("doi"), Some("10.1/first"));
        assert_eq!(lookup.calls.borrow().len(), 1);
    }

    #[test]
    fn test_enrich_queries_authors_in_order() {
        // Given: a lookup with no matches at all
        let mut bib = parse_bibliography(TWO_AUTHOR_ENTRY).unwrap();
        let lookup = FakeLookup::new(&[]);

        // When: we enrich
        let report = enrich(&mut bib, &lookup, |_, _| {});

        // Then: every author surname was tried, in order, with the title
        let calls = lookup.calls.borrow();
        assert_eq!(
            *calls,
            vec![
                ("Noisy Radio Networks".to_string(), "Smith".to_string()),
                ("Noisy Radio Networks".to_string(), "Jones".to_string()),
            ]
        );
        assert_eq!(report.outcomes[0].1, EntryOutcome::NoMatch);
        assert_eq!(report.new, 0);
    }

    #[test]
    fn test_enrich_skips_entry_with_existing_doi() {
        // Given: an entry that already has a non-blank DOI
        let src = "@article{a, author={A, B.}, title={T}, journal={J}, year={1}, doi={10.5/existing}}";
        let mut bib = parse_bibliography(src).unwrap();
        let lookup = FakeLookup::new(&[("A", "10.9/other")]);

        // When: we enrich
        let report = enrich(&mut bib, &lookup, |_, _| {});

        // Then: the entry is untouched and counted as already-had
        assert_eq!(bib.entries[0].get("doi"), Some("10.5/existing"));
        assert!(lookup.calls.borrow().is_empty());
        assert_eq!(report.before, 1);
        assert_eq!(report.new, 0);
        assert_eq!(report.outcomes[0].1, EntryOutcome::AlreadyHadDoi);
    }

    #[test]
    fn test_enrich_blank_doi_is_eligible() {
        // Given: an entry whose DOI field is whitespace-only
        let src = "@article{a, author={A, B.}, title={T}, journal={J}, year={1}, doi={   }}";
        let mut bib = parse_bibliography(src).unwrap();
        let lookup = FakeLookup::new(&[("A", "10.1000/found")]);

        // When: we enrich
        let report = enrich(&mut bib, &lookup, |_, _| {});

        // Then: the blank DOI is overwritten with the match
        assert_eq!(bib.entries[0].get("doi"), Some("10.1000/found"));
        assert_eq!(report.new, 1);
        assert_eq!(report.before, 0);
    }

    #[test]
    fn test_enrich_transport_failure_leaves_entry_unchanged() {
        // Given: a lookup whose transport always fails
        let mut bib = parse_bibliography(TWO_AUTHOR_ENTRY).unwrap();
        let before = bib.entries[0].clone();

        // When: we enrich
        let report = enrich(&mut bib, &FailingLookup, |_, _| {});

        // Then: the entry is untouched, no counter moved, reason recorded
        assert_eq!(bib.entries[0], before);
        assert_eq!(report.new, 0);
        assert_eq!(report.before, 0);
        assert!(matches!(report.outcomes[0].1, EntryOutcome::Skipped(_)));
        let skipped: Vec<_> = report.skipped().collect();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].0, "net2020");
        assert!(skipped[0].1.contains("connection refused"));
    }

    #[test]
    fn test_enrich_missing_title_is_skipped_not_fatal() {
        // Given: a first entry with no title, a second that can be enriched
        let src = "@article{broken, author={A, B.}, journal={J}, year={1}}\n\
                   @article{good, author={C, D.}, title={T}, journal={J}, year={2}}";
        let mut bib = parse_bibliography(src).unwrap();
        let lookup = FakeLookup::new(&[("C", "10.1000/good")]);

        // When: we enrich
        let report = enrich(&mut bib, &lookup, |_, _| {});

        // Then: the batch continued past the broken entry
        assert!(matches!(report.outcomes[0].1, EntryOutcome::Skipped(_)));
        assert_eq!(bib.entries[1].get("doi"), Some("10.1000/good"));
        assert_eq!(report.new, 1);
    }

    #[test]
    fn test_enrich_missing_contributors_is_skipped() {
        // Given: an entry with neither author nor editor
        let src = "@article{orphan, title={T}, journal={J}, year={1}}";
        let mut bib = parse_bibliography(src).unwrap();
        let lookup = FakeLookup::new(&[]);

        // When: we enrich
        let report = enrich(&mut bib, &lookup, |_, _| {});

        // Then: the entry is skipped with a contributor reason
        match &report.outcomes[0].1 {
            EntryOutcome::Skipped(reason) => {
                assert!(reason.contains("neither an author nor an editor"), "{}", reason)
            }
            other => panic!("expected Skipped, got {:?}", other),
        }
    }

    #[test]
    fn test_enrich_uses_editor_when_author_absent() {
        // Given: an entry with only an editor
        let src = "@inproceedings{ed, editor={Brown, Ann}, title={T}, booktitle={P}, year={1}}";
        let mut bib = parse_bibliography(src).unwrap();
        let lookup = FakeLookup::new(&[("Brown", "10.7/editor")]);

        // When: we enrich
        let report = enrich(&mut bib, &lookup, |_, _| {});

        // Then: the editor surname found the match
        assert_eq!(bib.entries[0].get("doi"), Some("10.7/editor"));
        assert_eq!(report.new, 1);
    }

    #[test]
    fn test_enrich_idempotent_when_all_have_dois() {
        // Given: a bibliography where every entry already has a DOI
        let src = "@article{a, author={A, B.}, title={T}, journal={J}, year={1}, doi={10.1/a}}\n\
                   @article{b, author={C, D.}, title={U}, journal={J}, year={2}, doi={10.2/b}}";
        let mut bib = parse_bibliography(src).unwrap();
        let snapshot = bib.clone();
        let lookup = FakeLookup::new(&[("A", "10.9/x"), ("C", "10.9/y")]);

        // When: we enrich
        let report = enrich(&mut bib, &lookup, |_, _| {});

        // Then: nothing changes and the counts say so
        assert_eq!(bib, snapshot);
        assert_eq!(report.new, 0);
        assert_eq!(report.before, report.total);
        assert!(lookup.calls.borrow().is_empty());
    }

    #[test]
    fn test_enrich_progress_fires_after_each_entry() {
        // Given: a three-entry bibliography
        let src = "@misc{a, title={A}, author={X, Y.}}\n\
                   @misc{b, title={B}, author={X, Y.}}\n\
                   @misc{c, title={C}, author={X, Y.}}";
        let mut bib = parse_bibliography(src).unwrap();
        let lookup = FakeLookup::new(&[]);
        let mut seen = Vec::new();

        // When: we enrich with a progress callback
        enrich(&mut bib, &lookup, |done, total| seen.push((done, total)));

        // Then: progress reported after every entry
        assert_eq!(seen, [(1, 3), (2, 3), (3, 3)]);
    }
}
