// src/audit/mod.rs
// =============================================================================
// This module contains the journal audit itself.
//
// Submodules:
// - fetch: Downloads the journal page (one GET, fixed timeout)
// - page: Parses HTML into lower-cased text and anchor labels
// - checks: The six DOAJ indicator checks and the report type
//
// This file ties them together in the Auditor, the service object that the
// server and the CLI both use. It is built once at start-up and holds no
// mutable state, so concurrent audits never interfere with each other.
// =============================================================================

mod checks;
mod fetch;
mod page;

pub use checks::AuditReport;
#[cfg(test)]
pub use checks::{AuditChecks, UNREACHABLE_MESSAGE};

use checks::Analyzer;
use fetch::Fetcher;

use anyhow::Result;
use tracing::{info, warn};

// Fetch + analyze, one call per journal URL
pub struct Auditor {
    fetcher: Fetcher,
    analyzer: Analyzer,
}

impl Auditor {
    // Builds the fetcher (10 second timeout) and compiles the ISSN pattern
    pub fn new() -> Result<Self> {
        Ok(Auditor {
            fetcher: Fetcher::new()?,
            analyzer: Analyzer::new()?,
        })
    }

    // Audits a single journal page
    //
    // Parameters:
    //   url: the journal URL, used as-is (a bad URL simply fails to fetch)
    //
    // Returns: the report; an unreachable page yields the error-shaped report
    pub async fn run_audit(&self, url: &str) -> AuditReport {
        let fetched = self.fetcher.fetch(url).await;

        if let Err(e) = &fetched {
            warn!(url, error = %e, "journal site could not be loaded");
        }

        let report = self.analyzer.audit(&fetched);

        if !report.is_unreachable() {
            info!(url, passed = report.passed_checks(), "audit finished");
        }

        report
    }
}
