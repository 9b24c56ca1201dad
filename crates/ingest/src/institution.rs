//! Institution detection for free-text statement pages.
//!
//! A small heuristic kept separate from line parsing so each can be tested
//! on its own: scan the first few lines of a document for known bank/brand
//! keywords and take the whole matching line as the institution label. One
//! global guess per document, not per line; no match means the caller falls
//! back to "Unknown".

/// Brand keywords matched case-insensitively against header lines.
pub const HEADER_KEYWORDS: &[&str] = &[
    "bank",
    "credit union",
    "financial",
    "capital",
    "chase",
    "wells fargo",
    "citi",
    "amex",
    "american express",
    "discover",
    "usaa",
    "navy federal",
];

/// Number of leading non-empty lines considered part of the header.
pub const HEADER_SCAN_LINES: usize = 10;

pub fn detect_institution<'a, I>(lines: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    for line in lines
        .into_iter()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(HEADER_SCAN_LINES)
    {
        let lower = line.to_lowercase();
        if HEADER_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            return Some(line.to_string());
        }
    }
    None
}
