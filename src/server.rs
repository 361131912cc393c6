// src/server.rs
// =============================================================================
// This module exposes the auditor over HTTP.
//
// One endpoint:
//   POST /analyze   {"journal_url": "https://..."}
//
// - 400 {"error": "Dergi URL bilgisi eksik."} when the body has no journal_url key
// - 200 with the audit report otherwise (including the unreachable report,
//   a page we could not load is a valid result, not a server error)
//
// Cross-origin requests are allowed from anywhere because the endpoint is
// called from a separately hosted front-end.
// =============================================================================

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};

use crate::audit::Auditor;

/// Returned with HTTP 400 when the request carries no journal URL ("Journal URL information missing.")
pub const MISSING_URL_MESSAGE: &str = "Dergi URL bilgisi eksik.";

// Builds the application router around a shared auditor
pub fn router(auditor: Arc<Auditor>) -> Router {
    Router::new()
        .route("/analyze", post(analyze_journal))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(auditor)
}

// Binds `addr` and serves until the process is stopped
pub async fn serve(addr: SocketAddr, auditor: Auditor) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "DOAJ auditor listening");

    axum::serve(listener, router(Arc::new(auditor))).await?;
    Ok(())
}

// Handler for POST /analyze
//
// The body is read as raw bytes so that an empty body, invalid JSON, a
// non-object body and a missing key all produce the same 400 response
// instead of axum's own rejection messages.
//
// Only the key's presence is validated. A non-string value (null, a number)
// is passed on in its JSON text form and simply fails to fetch, which gives
// the unreachable report.
async fn analyze_journal(State(auditor): State<Arc<Auditor>>, body: Bytes) -> Response {
    let Some(journal_url) = journal_url_from_body(&body) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": MISSING_URL_MESSAGE })),
        )
            .into_response();
    };

    let report = auditor.run_audit(&journal_url).await;
    Json(report).into_response()
}

// Returns the journal_url of a request body, or None when the key is missing
fn journal_url_from_body(body: &[u8]) -> Option<String> {
    let data: Value = match serde_json::from_slice(body) {
        Ok(data) => data,
        Err(e) => {
            debug!(error = %e, "analyze request body is not JSON");
            return None;
        }
    };

    match data.as_object()?.get("journal_url")? {
        Value::String(url) => Some(url.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::UNREACHABLE_MESSAGE;
    use axum::body::Body;
    use axum::http::Request;
    use httpmock::prelude::*;
    use tower::ServiceExt; // for `oneshot`

    fn app() -> Router {
        router(Arc::new(Auditor::new().unwrap()))
    }

    fn analyze_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header("content-type", "application/json")
            .header("origin", "http://frontend.example")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_empty_body_is_rejected() {
        let (status, body) = call(app(), analyze_request("")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": MISSING_URL_MESSAGE }));
    }

    #[tokio::test]
    async fn test_empty_object_is_rejected() {
        let (status, body) = call(app(), analyze_request("{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": MISSING_URL_MESSAGE }));
    }

    #[tokio::test]
    async fn test_non_object_body_is_rejected() {
        let (status, body) = call(app(), analyze_request(r#"["journal_url"]"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": MISSING_URL_MESSAGE }));
    }

    #[tokio::test]
    async fn test_null_url_is_audited_as_unreachable() {
        let (status, report) = call(app(), analyze_request(r#"{"journal_url": null}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report, json!({ "error": UNREACHABLE_MESSAGE }));
    }

    #[tokio::test]
    async fn test_numeric_url_is_audited_as_unreachable() {
        let (status, report) = call(app(), analyze_request(r#"{"journal_url": 42}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report, json!({ "error": UNREACHABLE_MESSAGE }));
    }

    #[test]
    fn test_journal_url_from_body() {
        assert_eq!(
            journal_url_from_body(br#"{"journal_url": "https://dergi.example"}"#),
            Some("https://dergi.example".to_string())
        );
        assert_eq!(journal_url_from_body(br#"{"journal_url": null}"#), Some("null".to_string()));
        assert_eq!(journal_url_from_body(br#"{"url": "https://dergi.example"}"#), None);
        assert_eq!(journal_url_from_body(b"not json"), None);
        assert_eq!(journal_url_from_body(b""), None);
    }

    #[tokio::test]
    async fn test_missing_url_never_fetches() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(200).body("<p>ISSN 2147-1908</p>");
            })
            .await;

        // Wrong field name: the URL is right there but must not be used
        let body = json!({ "url": server.url("/") }).to_string();
        let (status, _) = call(app(), analyze_request(&body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_analyze_returns_report() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/journal");
                then.status(200).header("content-type", "text/html").body(
                    r#"<html><body>
                        <p>ISSN: 2147-1908</p>
                        <a href="/board">Editorial Board</a>
                        <p>open access CC BY</p>
                    </body></html>"#,
                );
            })
            .await;

        let body = json!({ "journal_url": server.url("/journal") }).to_string();
        let (status, report) = call(app(), analyze_request(&body)).await;

        mock.assert_async().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            report,
            json!({
                "issn_found": true,
                "aims_and_scope": false,
                "editorial_board": true,
                "peer_review_policy": false,
                "open_access_statement": true,
                "author_guidelines": false,
            })
        );
    }

    #[tokio::test]
    async fn test_unreachable_site_is_ok_with_error_report() {
        let body = json!({ "journal_url": "http://127.0.0.1:1/" }).to_string();
        let (status, report) = call(app(), analyze_request(&body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(report, json!({ "error": UNREACHABLE_MESSAGE }));
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let response = app().oneshot(analyze_request("{}")).await.unwrap();
        let allow_origin = response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok());
        assert_eq!(allow_origin, Some("*"));
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/analyze")
            .header("origin", "http://frontend.example")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert!(response.status().is_success());
        assert!(response
            .headers()
            .contains_key("access-control-allow-methods"));
    }
}
