// src/audit/fetch.rs
// =============================================================================
// This module downloads the journal page.
//
// Key functionality:
// - Makes exactly one HTTP GET request per audit (no retries)
// - Sends a desktop browser User-Agent, some journal hosts reject anything else
// - Gives up after a fixed 10 second timeout
// - Treats every failure the same way: the page is "unreachable"
//
// The error type still records WHY the fetch failed so it can be logged,
// but nothing downstream branches on the variant.
//
// The body is decoded from raw bytes. Many Turkish journal sites are still
// served as windows-1254 and only say so in a <meta charset> tag, so the
// encoding is picked in this order:
// 1. a byte order mark
// 2. the charset parameter of the Content-Type header
// 3. a <meta charset> / <meta http-equiv> declaration near the top of the page
// 4. UTF-8
// =============================================================================

use std::time::Duration;

use encoding_rs::{Encoding, UTF_8};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use super::page::FetchedPage;

/// Fixed per-request timeout (connect + read)
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

// How far into the body we look for a <meta> charset declaration
const META_PRESCAN_BYTES: usize = 4096;

/// Static desktop-browser identity sent with every request
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

// Why a fetch did not produce a page
//
// Network errors, DNS failures, timeouts and malformed URLs all surface as
// Request; a response with a 4xx/5xx status surfaces as Status.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),
}

// Performs the single GET of an audit
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    // Creates a fetcher with the production timeout
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    // Creates a fetcher with a custom timeout (tests use a short one)
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        // Idle connections are not kept between audits
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Fetcher { client })
    }

    // Fetches `url` and parses the body
    //
    // The URL is not validated up front: a malformed URL fails here, when
    // reqwest tries to build the request.
    //
    // Returns: the parsed page, or the reason it could not be loaded
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await?;
        let html = decode_body(content_type.as_deref(), &body);
        debug!(url, bytes = body.len(), "fetched journal page");

        Ok(FetchedPage::parse(&html))
    }
}

// Decodes an HTML body to a String
//
// Parameters:
//   content_type: the Content-Type header value, if any
//   body: the raw response bytes
//
// A BOM always wins (encoding_rs sniffs it during decode). Malformed byte
// sequences are replaced with U+FFFD rather than failing the fetch.
fn decode_body(content_type: Option<&str>, body: &[u8]) -> String {
    let encoding = content_type
        .and_then(charset_from_content_type)
        .or_else(|| charset_from_meta(body))
        .unwrap_or(UTF_8);

    let (text, _, _) = encoding.decode(body);
    text.into_owned()
}

// Extracts the charset parameter from a Content-Type value
//
// Example: "text/html; charset=ISO-8859-9" -> Some(ISO-8859-9)
fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            Encoding::for_label(value.trim().trim_matches(|c: char| c == '"' || c == '\'').as_bytes())
        } else {
            None
        }
    })
}

// Looks for a charset declared in a <meta> tag at the start of the document
//
// Covers both <meta charset="windows-1254"> and
// <meta http-equiv="Content-Type" content="text/html; charset=windows-1254">.
// A declared UTF-16 is read as UTF-8: the bytes were already scanned as ASCII.
fn charset_from_meta(body: &[u8]) -> Option<&'static Encoding> {
    let head = &body[..body.len().min(META_PRESCAN_BYTES)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    let mut rest = head.as_str();
    while let Some(start) = rest.find("<meta") {
        let tag = &rest[start..];
        let tag = &tag[..tag.find('>').unwrap_or(tag.len())];

        if let Some(pos) = tag.find("charset=") {
            let value = tag[pos + "charset=".len()..]
                .trim_start_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace());
            let end = value
                .find(|c: char| c == '"' || c == '\'' || c == ';' || c == '/' || c.is_whitespace())
                .unwrap_or(value.len());

            if let Some(encoding) = Encoding::for_label(value[..end].as_bytes()) {
                return Some(encoding.output_encoding());
            }
        }

        rest = &rest[start + "<meta".len()..];
    }

    None
}
