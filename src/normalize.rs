//! Bibliographic string normalization.
//!
//! Converts raw BibTeX field values (possibly containing LaTeX markup and
//! inline math segments) into clean ASCII text suitable for display or as
//! a search query term.

use deunicode::deunicode;
use regex::Regex;

/// Normalizes a raw bibliographic string to plain ASCII.
///
/// Three transforms, applied in order:
/// 1. Strip the markup characters `{ } \ ' " ^` unconditionally.
/// 2. Remove every inline math segment `$...$` (shortest match per pair).
/// 3. Transliterate the remaining non-ASCII characters to their closest
///    ASCII equivalent.
///
/// Markup stripping runs before math removal, so an escaped `\$` loses its
/// backslash and then delimits a math segment like a bare `$` would.
/// With an odd number of `$` characters the trailing unpaired one survives;
/// that is whatever the non-greedy match leaves behind, not a special case.
///
/// # Examples
///
/// ```
/// use doi_tools::normalize;
///
/// assert_eq!(normalize(r"{Gr\'emillet}"), "Gremillet");
/// assert_eq!(normalize("Bounds for $\\epsilon$-approximations"), "Bounds for -approximations");
/// ```
pub fn normalize(text: &str) -> String {
    let markup = Regex::new(r#"[{}\\'"^]"#).unwrap();
    let math = Regex::new(r"\$.*?\$").unwrap();

    let stripped = markup.replace_all(text, "");
    let no_math = math.replace_all(&stripped, "");
    deunicode(&no_math)
}
