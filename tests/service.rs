//! End-to-end tests for the HTTP service.
//!
//! Each test binds an ephemeral port on 127.0.0.1, spawns the real router
//! and talks to it over HTTP with reqwest. Documents are built in memory
//! with docx-rs, so no fixtures or network access are needed.
//!
//! Run with:
//!   cargo test --test service -- --nocapture

use base64::{engine::general_purpose::STANDARD, Engine as _};
use docx_rs::{Docx, Hyperlink, HyperlinkType, Paragraph, Run};
use edgequake_docx2md::error::{NO_DOCX_PROVIDED, STORAGE_NOT_CONFIGURED};
use edgequake_docx2md::{serve, AppState, ConversionConfig, DocxConverter, ServiceConfig};
use serde_json::{json, Value};
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn ready_config() -> ServiceConfig {
    ServiceConfig {
        storage_connection_string: Some("UseDevelopmentStorage=true".into()),
        ..ServiceConfig::default()
    }
}

/// Start the service on an ephemeral port and return its address.
async fn spawn_service(config: ServiceConfig) -> SocketAddr {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("edgequake_docx2md=debug")
        .with_test_writer()
        .try_init();

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let state = AppState::new(&config, Arc::new(DocxConverter::new()));
    tokio::spawn(async move {
        serve(listener, state).await.expect("server");
    });
    addr
}

fn convert_url(addr: SocketAddr) -> String {
    format!("http://{addr}/api/convertDocx")
}

fn pack(docx: Docx) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    docx.build().pack(&mut buf).expect("pack docx");
    buf.into_inner()
}

/// A small report with a heading title, a TOC block, body text and a link.
fn sample_report() -> Vec<u8> {
    pack(
        Docx::new()
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text("Quarterly Report"))
                    .style("Heading1"),
            )
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text("Contents"))
                    .style("Heading2"),
            )
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("5 min read")))
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Revenue grew in every region.")))
            .add_paragraph(
                Paragraph::new().add_hyperlink(
                    Hyperlink::new("https://example.org/docs", HyperlinkType::External)
                        .add_run(Run::new().add_text("docs")),
                ),
            )
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("12"))),
    )
}

async fn post_json(addr: SocketAddr, body: String) -> (reqwest::StatusCode, reqwest::header::HeaderMap, Value) {
    let response = reqwest::Client::new()
        .post(convert_url(addr))
        .header("content-type", "application/json")
        .header("origin", "https://editor.example.com")
        .body(body)
        .send()
        .await
        .expect("request");
    let status = response.status();
    let headers = response.headers().clone();
    let json: Value = response.json().await.expect("JSON body");
    (status, headers, json)
}

// ── Success path ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn converts_docx_and_returns_envelope() {
    let addr = spawn_service(ready_config()).await;
    let payload = json!({ "docx": STANDARD.encode(sample_report()) }).to_string();

    let (status, headers, body) = post_json(addr, payload).await;

    assert_eq!(status, 200);
    assert_eq!(
        headers.get("access-control-allow-origin").map(|v| v.to_str().unwrap()),
        Some("*")
    );
    assert_eq!(body["success"], true);
    assert_eq!(body["title"], "Quarterly Report");
    assert_eq!(body["imageCount"], 0);

    let markdown = body["markdown"].as_str().unwrap();
    assert!(markdown.starts_with("# Quarterly Report"), "got: {markdown}");
    assert!(markdown.contains("Revenue grew in every region."));
    assert!(
        markdown.contains("[docs](https://example.org/docs)"),
        "link target lost: {markdown}"
    );
    assert!(!markdown.contains("Contents"), "TOC heading survived: {markdown}");
    assert!(!markdown.contains("min read"), "read-time survived: {markdown}");
    assert!(!markdown.contains("\n12"), "page number survived: {markdown}");
    assert!(!markdown.contains("\n\n\n"));
    assert_eq!(markdown, markdown.trim());
}

#[tokio::test]
async fn data_uri_payload_is_accepted() {
    let addr = spawn_service(ready_config()).await;
    let payload = json!({
        "docx": format!(
            "data:application/vnd.openxmlformats-officedocument.wordprocessingml.document;base64,{}",
            STANDARD.encode(sample_report())
        )
    })
    .to_string();

    let (status, _, body) = post_json(addr, payload).await;
    assert_eq!(status, 200);
    assert_eq!(body["title"], "Quarterly Report");
}

// ── Failure paths ────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_docx_field_is_bad_request() {
    let addr = spawn_service(ready_config()).await;
    let (status, headers, body) = post_json(addr, r#"{"name": "report.docx"}"#.into()).await;

    assert_eq!(status, 400);
    assert_eq!(body, json!({ "success": false, "error": NO_DOCX_PROVIDED }));
    assert_eq!(
        headers.get("access-control-allow-origin").map(|v| v.to_str().unwrap()),
        Some("*")
    );
}

#[tokio::test]
async fn malformed_base64_is_server_error() {
    let addr = spawn_service(ready_config()).await;
    let (status, _, body) = post_json(addr, r#"{"docx": "!!! definitely not base64 !!!"}"#.into()).await;

    assert_eq!(status, 500);
    assert_eq!(body["success"], false);
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn non_docx_payload_is_server_error() {
    let addr = spawn_service(ready_config()).await;
    let payload = json!({ "docx": STANDARD.encode("plain text, not a Word file") }).to_string();

    let (status, _, body) = post_json(addr, payload).await;
    assert_eq!(status, 500);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn missing_storage_configuration_is_server_error() {
    let addr = spawn_service(ServiceConfig::default()).await;
    let payload = json!({ "docx": STANDARD.encode(sample_report()) }).to_string();

    let (status, _, body) = post_json(addr, payload).await;
    assert_eq!(status, 500);
    assert_eq!(body, json!({ "success": false, "error": STORAGE_NOT_CONFIGURED }));

    let health = reqwest::get(format!("http://{addr}/health")).await.expect("health");
    assert_eq!(health.status(), 503);
}

#[tokio::test]
async fn oversized_body_is_rejected_with_envelope() {
    let addr = spawn_service(ServiceConfig {
        max_body_bytes: 1024,
        ..ready_config()
    })
    .await;
    let payload = json!({ "docx": "A".repeat(4096) }).to_string();

    let (status, _, body) = post_json(addr, payload).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
}

// ── Options & health ─────────────────────────────────────────────────────────

#[tokio::test]
async fn strip_title_line_removes_heading_from_markdown() {
    let addr = spawn_service(ServiceConfig {
        conversion: ConversionConfig::builder()
            .strip_title_line(true)
            .build()
            .unwrap(),
        ..ready_config()
    })
    .await;
    let payload = json!({ "docx": STANDARD.encode(sample_report()) }).to_string();

    let (status, _, body) = post_json(addr, payload).await;
    assert_eq!(status, 200);
    assert_eq!(body["title"], "Quarterly Report");
    assert_eq!(
        body["markdown"],
        "Revenue grew in every region.\n\n[docs](https://example.org/docs)"
    );
}

#[tokio::test]
async fn health_reports_ok_and_version() {
    let addr = spawn_service(ready_config()).await;
    let health: Value = reqwest::get(format!("http://{addr}/health"))
        .await
        .expect("health")
        .json()
        .await
        .expect("JSON");
    assert_eq!(health["status"], "ok");
    assert_eq!(health["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn cors_preflight_is_allowed() {
    let addr = spawn_service(ready_config()).await;
    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, convert_url(addr))
        .header("origin", "https://editor.example.com")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .send()
        .await
        .expect("preflight");

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .map(|v| v.to_str().unwrap()),
        Some("*")
    );
}
