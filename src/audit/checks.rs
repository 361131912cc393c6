// src/audit/checks.rs
// =============================================================================
// This module evaluates a fetched page against the DOAJ checklist.
//
// Six independent boolean checks:
// - issn_found: regex match for "ISSN 1234-567X" style identifiers
// - aims_and_scope, editorial_board, peer_review_policy,
//   open_access_statement, author_guidelines: keyword checks
//
// Keyword checks look at anchor labels first (a policy page is usually
// LINKED with a descriptive label) and fall back to the whole page text.
// Every phrase list is bilingual: target sites are in Turkish or English.
//
// No scoring and no partial credit, each check is simply true or false.
// =============================================================================

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::fetch::FetchError;
use super::page::FetchedPage;

/// Message reported when the page could not be loaded ("site content could not be loaded")
pub const UNREACHABLE_MESSAGE: &str = "Web sitesi içeriği yüklenemedi.";

// "issn", optional spaces/colon, 4 digits, hyphen, 3 digits, check digit or X
const ISSN_PATTERN: &str = r"(?i)issn\s*:?\s*\d{4}-\d{3}[\dx]";

pub const AIMS_AND_SCOPE: &[&str] = &["amaç ve kapsam", "aims and scope"];
pub const EDITORIAL_BOARD: &[&str] = &["yayın kurulu", "editorial board", "editörler"];
pub const PEER_REVIEW_POLICY: &[&str] = &[
    "hakemlik süreci",
    "peer review process",
    "değerlendirme süreci",
];
pub const OPEN_ACCESS_STATEMENT: &[&str] =
    &["açık erişim", "open access", "creative commons", "cc by"];
pub const AUTHOR_GUIDELINES: &[&str] = &["yazar rehberi", "author guidelines", "yazarlar için"];

// The six results of a completed audit
//
// Field order is the order of the keys in the JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditChecks {
    pub issn_found: bool,
    pub aims_and_scope: bool,
    pub editorial_board: bool,
    pub peer_review_policy: bool,
    pub open_access_statement: bool,
    pub author_guidelines: bool,
}

impl AuditChecks {
    /// (name, result) pairs in report order
    pub fn as_pairs(&self) -> [(&'static str, bool); 6] {
        [
            ("issn_found", self.issn_found),
            ("aims_and_scope", self.aims_and_scope),
            ("editorial_board", self.editorial_board),
            ("peer_review_policy", self.peer_review_policy),
            ("open_access_statement", self.open_access_statement),
            ("author_guidelines", self.author_guidelines),
        ]
    }
}

// Terminal output of one audit
//
// Serializes to EITHER {"error": "..."} OR the six boolean keys, never a mix.
// #[serde(untagged)] writes the variant's fields without a wrapper object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuditReport {
    /// The page could not be fetched, no checks were run
    Unreachable { error: String },
    /// The page was fetched and every check was evaluated
    Completed(AuditChecks),
}

impl AuditReport {
    pub fn unreachable() -> Self {
        AuditReport::Unreachable {
            error: UNREACHABLE_MESSAGE.to_string(),
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, AuditReport::Unreachable { .. })
    }

    /// Check results, or None when the page was unreachable
    pub fn checks(&self) -> Option<&AuditChecks> {
        match self {
            AuditReport::Completed(checks) => Some(checks),
            AuditReport::Unreachable { .. } => None,
        }
    }

    /// Number of checks that passed (0 for an unreachable page)
    pub fn passed_checks(&self) -> usize {
        self.checks()
            .map(|checks| checks.as_pairs().into_iter().filter(|(_, ok)| *ok).count())
            .unwrap_or(0)
    }
}

// Runs the checklist against fetched pages
//
// Holds only the compiled ISSN regex, so one instance is shared by every audit.
#[derive(Debug, Clone)]
pub struct Analyzer {
    issn_pattern: Regex,
}

impl Analyzer {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Analyzer {
            issn_pattern: Regex::new(ISSN_PATTERN)?,
        })
    }

    // Builds the report for one fetch outcome
    //
    // A failed fetch short-circuits to the error report. Otherwise all six
    // checks run; none of them depends on another.
    pub fn audit(&self, fetched: &Result<FetchedPage, FetchError>) -> AuditReport {
        let page = match fetched {
            Ok(page) => Some(page),
            Err(_) => return AuditReport::unreachable(),
        };

        AuditReport::Completed(AuditChecks {
            issn_found: self.check_issn(page),
            aims_and_scope: check_keywords_in_links_or_text(page, AIMS_AND_SCOPE),
            editorial_board: check_keywords_in_links_or_text(page, EDITORIAL_BOARD),
            peer_review_policy: check_keywords_in_links_or_text(page, PEER_REVIEW_POLICY),
            open_access_statement: check_keywords_in_links_or_text(page, OPEN_ACCESS_STATEMENT),
            author_guidelines: check_keywords_in_links_or_text(page, AUTHOR_GUIDELINES),
        })
    }

    // True if an ISSN-shaped identifier appears anywhere in the page text
    //
    // Returns false when no page was loaded or the page has no text.
    pub fn check_issn(&self, page: Option<&FetchedPage>) -> bool {
        match page {
            Some(page) if !page.text_content.is_empty() => {
                self.issn_pattern.is_match(&page.text_content)
            }
            _ => false,
        }
    }
}

// True if any phrase appears in an anchor label or, failing that, in the page text
//
// Matching is a case-insensitive substring search. An anchor match returns
// immediately; the full-text scan only runs when no anchor matched.
// Returns false when no page was loaded.
pub fn check_keywords_in_links_or_text(page: Option<&FetchedPage>, keywords: &[&str]) -> bool {
    let Some(page) = page else {
        return false;
    };

    let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

    for anchor in &page.anchors {
        let label = anchor.to_lowercase();
        if keywords.iter().any(|k| label.contains(k.as_str())) {
            return true;
        }
    }

    // text_content is already lower-cased
    keywords
        .iter()
        .any(|k| page.text_content.contains(k.as_str()))
}
