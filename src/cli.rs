// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - serve: run the HTTP endpoint (POST /analyze)
// - audit: audit a single journal URL from the terminal
//
// The serve options can also come from environment variables, which is
// handy when the auditor runs in a container.
// =============================================================================

use std::net::IpAddr;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "doaj-auditor",
    version,
    about = "Audits a journal website against basic DOAJ open-access indicators",
    long_about = "doaj-auditor fetches a journal's home page and checks it for an ISSN, an aims and scope \
                  statement, an editorial board, a peer review policy, an open access statement and \
                  author guidelines. Turkish and English sites are both supported."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server exposing POST /analyze
    ///
    /// Example: doaj-auditor serve --port 8080
    Serve {
        /// Address to bind
        #[arg(long, env = "AUDITOR_HOST", default_value = "127.0.0.1")]
        host: IpAddr,

        /// Port to listen on
        #[arg(long, env = "AUDITOR_PORT", default_value_t = 5000)]
        port: u16,
    },

    /// Audit one journal website and print the report
    ///
    /// Example: doaj-auditor audit https://dergipark.org.tr/en/pub/example
    Audit {
        /// Journal website URL
        journal_url: String,

        /// Output the report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["doaj-auditor", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host.to_string(), "127.0.0.1");
                assert_eq!(port, 5000);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_audit_with_json_flag() {
        let cli =
            Cli::try_parse_from(["doaj-auditor", "audit", "https://example.org", "--json"]).unwrap();
        match cli.command {
            Commands::Audit { journal_url, json } => {
                assert_eq!(journal_url, "https://example.org");
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_audit_requires_url() {
        assert!(Cli::try_parse_from(["doaj-auditor", "audit"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
