// src/main.rs
// =============================================================================
// This is the entry point of the DOAJ auditor.
//
// What happens here:
// 1. Set up logging (stderr, filtered by RUST_LOG)
// 2. Parse command-line arguments using clap
// 3. Build the Auditor once; it is shared by every request
// 4. Either serve the HTTP endpoint or run a single audit
// 5. Exit with proper code (0 = all checks passed, 1 = some failed, 2 = error)
// =============================================================================

mod audit; // src/audit/ - fetching and checking a journal page
mod cli; // src/cli.rs - command-line parsing
mod server; // src/server.rs - the POST /analyze endpoint

use std::net::SocketAddr;

use anyhow::Result;
use audit::{AuditReport, Auditor};
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "doaj_auditor=info,tower_http=info";

#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so `audit --json` output on stdout stays parseable
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let auditor = Auditor::new()?;

    match cli.command {
        Commands::Serve { host, port } => {
            server::serve(SocketAddr::new(host, port), auditor).await?;
            Ok(0)
        }
        Commands::Audit { journal_url, json } => handle_audit(&auditor, &journal_url, json).await,
    }
}

// Handles the 'audit' subcommand
//
// Returns the process exit code:
//   0 = every check passed
//   1 = at least one check failed
//   2 = the site could not be loaded
async fn handle_audit(auditor: &Auditor, journal_url: &str, json: bool) -> Result<i32> {
    let report = auditor.run_audit(journal_url).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(journal_url, &report);
    }

    Ok(exit_code(&report))
}

fn exit_code(report: &AuditReport) -> i32 {
    match report.checks() {
        None => 2,
        Some(checks) if checks.as_pairs().iter().all(|(_, ok)| *ok) => 0,
        Some(_) => 1,
    }
}

// Prints the report as a human-readable table
fn print_table(journal_url: &str, report: &AuditReport) {
    println!("🔍 Audited: {}", journal_url);
    println!();

    let Some(checks) = report.checks() else {
        if let AuditReport::Unreachable { error } = report {
            println!("⚠️  {}", error);
        }
        return;
    };

    println!("{:<28} {:<10}", "CHECK", "RESULT");
    println!("{}", "=".repeat(38));

    for (name, ok) in checks.as_pairs() {
        let result = if ok { "✅ PASS" } else { "❌ FAIL" };
        println!("{:<28} {:<10}", name, result);
    }

    println!();
    println!("📊 Passed {} of {} checks", report.passed_checks(), checks.as_pairs().len());
}
