//! doi-tools: CLI for enriching BibTeX bibliographies with DOIs.
//!
//! This library provides functionality to:
//! - Load a BibTeX bibliography into an ordered field-mapping model
//! - Look up missing DOIs via the Crossref guest query, per entry/author
//! - Normalize bibliographic strings (markup, math, transliteration)
//! - Export the enriched bibliography as BibTeX and as an ifmo-style
//!   citation list

pub mod authors;
pub mod bib;
pub mod enrich;
pub mod ifmo;
pub mod lookup;
pub mod normalize;

pub use authors::{contributor_field, extract_authors, shortify, split_authors, surname_of};
pub use bib::{
    enriched_path, load_bibliography, parse_bibliography, save_bibliography, Bibliography, Entry,
};
pub use enrich::{enrich, EnrichReport, EntryOutcome};
pub use ifmo::{export_ifmo, format_entry, ifmo_path, ExportReport, RenderOutcome};
pub use lookup::{CrossrefLookup, DoiLookup};
pub use normalize::normalize;
