//! # Invoice Flow Tests
//!
//! End-to-end coverage of the REST surface. The router is driven
//! directly through tower with an in-memory store and a mock mailer, so
//! the full create / render / email / delete lifecycle runs without a
//! socket or an SMTP relay.
//!
//! ## Test Coverage
//!
//! - Company CRUD, cascade delete, and the grouped dashboard
//! - Invoice creation from company defaults and from editor snapshots,
//!   including company auto-creation and GST aggregation
//! - Multipart upload with a pre-rendered PDF attachment
//! - Document downloads (PDF, PNG preview, standalone HTML)
//! - Email dispatch and the DRAFT to SENT transition

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use serde_json::{json, Value};
use tower::ServiceExt;

use lekha::catalog;
use lekha::config::Config;
use lekha::invoice::{DocumentDraft, InvoiceDocument};
use lekha::mailer::MockMailer;
use lekha::server::{self, AppState};
use lekha::storage::{MemoryStore, Store};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Build a router around a fresh store and mock mailer. The signature
/// directory points nowhere so every render uses the vector fallback.
async fn test_app() -> (Router, Arc<MockMailer>) {
    let store = Arc::new(MemoryStore::new());
    store.open().await.unwrap();
    let mailer = Arc::new(MockMailer::new());

    let mut config = Config::default();
    config.signature_dir = PathBuf::from("/nonexistent");

    let state = Arc::new(AppState::new(config, store, mailer.clone()));
    (server::router(state), mailer)
}

/// Issue a JSON request and decode the JSON response.
async fn request_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Issue a GET and return the raw response for binary downloads.
async fn request_raw(app: &Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, bytes.to_vec())
}

/// POST a JSON body and return the raw response. The render endpoints
/// reply with documents, not JSON.
async fn post_json_raw(
    app: &Router,
    uri: &str,
    body: &Value,
) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, bytes.to_vec())
}

fn july21() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 21).unwrap()
}

/// A fully derived document for the first catalog tenant.
fn sample_document() -> InvoiceDocument {
    let defaults = catalog::template_by_id("sagar-trading").unwrap().defaults();
    DocumentDraft::default().build(&defaults, july21(), 1)
}

/// A derived document for a recipient no company record knows yet.
fn unknown_recipient_document(gst: &str, seq: u64) -> InvoiceDocument {
    let defaults = catalog::template_by_id("sagar-trading").unwrap().defaults();
    let draft = DocumentDraft {
        recipient_name: Some("Meridian Textiles".to_string()),
        gst_number: Some(gst.to_string()),
        ref_number: Some(format!("MERI/25-26/{:03}", seq)),
        ..DocumentDraft::default()
    };
    draft.build(&defaults, july21(), seq)
}

/// Create a company over the API and return its id.
async fn create_company(app: &Router, name: &str, prefix: &str) -> u64 {
    let (status, body) = request_json(
        app,
        "POST",
        "/api/companies",
        Some(json!({
            "name": name,
            "addressLine1": "Gala No. 7, Laxmi Compound",
            "addressLine2": "Vasai East",
            "gstNumbers": ["27AACCS8294K1Z5"],
            "rentedArea": 25000.0,
            "rentRate": 18.0,
            "refNumberPrefix": prefix,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "company create failed: {}", body);
    body["company"]["id"].as_u64().unwrap()
}

/// Create an invoice from company defaults, pinned to a known date.
async fn create_default_invoice(app: &Router, company_id: u64) -> Value {
    let (status, body) = request_json(
        app,
        "POST",
        "/api/invoices",
        Some(json!({ "companyId": company_id, "invoiceDate": "2025-07-21" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "invoice create failed: {}", body);
    body["invoice"].clone()
}

// ============================================================================
// STATUS AND AUTH
// ============================================================================

#[tokio::test]
async fn test_status_endpoint() {
    let (app, _) = test_app().await;
    let (status, body) = request_json(&app, "GET", "/api/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"]["service"], "lekha");
    assert!(body["status"]["version"].as_str().unwrap().contains('.'));
    assert!(body["status"]["uptimeSecs"].is_u64());
}

#[tokio::test]
async fn test_login_accepts_and_rejects() {
    let (app, _) = test_app().await;

    let (status, body) = request_json(
        &app,
        "POST",
        "/api/login",
        Some(json!({ "username": "admin", "password": "rentbook" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "admin");

    let (status, body) = request_json(
        &app,
        "POST",
        "/api/login",
        Some(json!({ "username": "admin", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"]["message"].is_string());
}

// ============================================================================
// TEMPLATES
// ============================================================================

#[tokio::test]
async fn test_template_listing_and_lookup() {
    let (app, _) = test_app().await;

    let (status, body) = request_json(&app, "GET", "/api/templates", None).await;
    assert_eq!(status, StatusCode::OK);
    let templates = body["templates"].as_array().unwrap();
    assert_eq!(templates.len(), 3);
    assert_eq!(templates[0]["value"], "sagar-trading");

    let (status, body) = request_json(&app, "GET", "/api/templates/sagar-trading", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["template"]["recipientName"], "Sagar Trading Co.");
    assert_eq!(body["template"]["refNumberPrefix"], "SAGT");

    let (status, _) = request_json(&app, "GET", "/api/templates/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// COMPANIES
// ============================================================================

#[tokio::test]
async fn test_company_crud_lifecycle() {
    let (app, _) = test_app().await;
    let id = create_company(&app, "Sagar Trading Co.", "SAGT").await;

    let (status, body) = request_json(&app, "GET", &format!("/api/companies/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["company"]["name"], "Sagar Trading Co.");
    assert_eq!(body["company"]["rentRate"], 18.0);

    let (status, body) = request_json(
        &app,
        "PUT",
        &format!("/api/companies/{}", id),
        Some(json!({ "rentRate": 21.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["company"]["rentRate"], 21.5);
    assert_eq!(body["company"]["name"], "Sagar Trading Co.");

    let (status, body) = request_json(&app, "GET", "/api/companies", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["companies"].as_array().unwrap().len(), 1);

    let (status, body) =
        request_json(&app, "DELETE", &format!("/api/companies/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"]["companyId"], id);

    let (status, _) = request_json(&app, "GET", &format!("/api/companies/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_company_create_requires_name() {
    let (app, _) = test_app().await;
    let (status, body) = request_json(
        &app,
        "POST",
        "/api/companies",
        Some(json!({ "name": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("name"));
}

#[tokio::test]
async fn test_company_delete_cascades_invoices() {
    let (app, _) = test_app().await;
    let id = create_company(&app, "Sagar Trading Co.", "SAGT").await;
    create_default_invoice(&app, id).await;
    create_default_invoice(&app, id).await;

    let (status, body) =
        request_json(&app, "DELETE", &format!("/api/companies/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"]["invoices"], 2);

    let (status, body) = request_json(&app, "GET", "/api/invoices", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["invoices"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_dashboard_groups_name_variants() {
    let (app, _) = test_app().await;
    let a = create_company(&app, "Company 2 - Acme Traders", "ACME").await;
    let b = create_company(&app, "Acme Traders 3", "ACME").await;
    let c = create_company(&app, "Acme Traders", "ACME").await;
    create_default_invoice(&app, a).await;
    create_default_invoice(&app, b).await;
    create_default_invoice(&app, c).await;

    let (status, body) = request_json(&app, "GET", "/api/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["dashboard"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Acme Traders");
    assert_eq!(rows[0]["companyIds"].as_array().unwrap().len(), 3);
    assert_eq!(rows[0]["invoiceCount"], 3);
    // Three invoices at 25000 sq. ft. x Rs. 18 plus 9% + 9% GST.
    assert_eq!(rows[0]["totalAmount"], 3 * 531000);
}

// ============================================================================
// INVOICE CREATION
// ============================================================================

#[tokio::test]
async fn test_invoice_from_company_defaults() {
    let (app, _) = test_app().await;
    let id = create_company(&app, "Sagar Trading Co.", "SAGT").await;

    let invoice = create_default_invoice(&app, id).await;
    assert_eq!(invoice["refNumber"], "SAGT/25-26/001");
    assert_eq!(invoice["amount"], 531000);
    assert_eq!(invoice["status"], "DRAFT");
    assert_eq!(invoice["companyId"], id);
    assert_eq!(invoice["invoiceData"]["rentAmount"], 450000);
    assert_eq!(invoice["invoiceData"]["sgstAmount"], 40500);
    assert_eq!(
        invoice["invoiceData"]["grandTotalWords"],
        "Five Lakh Thirty One Thousand Only"
    );
    assert_eq!(
        invoice["invoiceData"]["rentDescription"],
        "Rent for the month of July '25"
    );

    // The reference sequence advances per prefix.
    let second = create_default_invoice(&app, id).await;
    assert_eq!(second["refNumber"], "SAGT/25-26/002");
}

#[tokio::test]
async fn test_invoice_snapshot_creates_company() {
    let (app, _) = test_app().await;
    let doc = unknown_recipient_document("27AAACM9201F1ZK", 1);

    let (status, body) = request_json(
        &app,
        "POST",
        "/api/invoices",
        Some(json!({ "invoiceData": serde_json::to_value(&doc).unwrap() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", body);
    let company_id = body["invoice"]["companyId"].as_u64().unwrap();

    let (status, body) =
        request_json(&app, "GET", &format!("/api/companies/{}", company_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["company"]["name"], "Meridian Textiles");
    assert_eq!(body["company"]["refNumberPrefix"], "MERI");
    assert_eq!(body["company"]["gstNumbers"], json!(["27AAACM9201F1ZK"]));
}

#[tokio::test]
async fn test_known_recipient_collects_new_gst_number() {
    let (app, _) = test_app().await;

    let first = unknown_recipient_document("27AAACM9201F1ZK", 1);
    let (status, body) = request_json(
        &app,
        "POST",
        "/api/invoices",
        Some(json!({ "invoiceData": serde_json::to_value(&first).unwrap() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", body);
    let company_id = body["invoice"]["companyId"].as_u64().unwrap();

    let second = unknown_recipient_document("27AAACM9201F2ZJ", 2);
    let (status, body) = request_json(
        &app,
        "POST",
        "/api/invoices",
        Some(json!({ "invoiceData": serde_json::to_value(&second).unwrap() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["invoice"]["companyId"], company_id);

    let (_, body) =
        request_json(&app, "GET", &format!("/api/companies/{}", company_id), None).await;
    assert_eq!(
        body["company"]["gstNumbers"],
        json!(["27AAACM9201F1ZK", "27AAACM9201F2ZJ"])
    );
}

#[tokio::test]
async fn test_invoice_requires_document_or_company() {
    let (app, _) = test_app().await;
    let (status, body) = request_json(&app, "POST", "/api/invoices", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("companyId"));
}

#[tokio::test]
async fn test_invoice_rejects_blank_recipient() {
    let (app, _) = test_app().await;
    let mut doc = sample_document();
    doc.recipient_name = "  ".to_string();

    let (status, body) = request_json(
        &app,
        "POST",
        "/api/invoices",
        Some(json!({ "invoiceData": serde_json::to_value(&doc).unwrap() })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("recipient"));
}

#[tokio::test]
async fn test_invoice_list_filters_by_company() {
    let (app, _) = test_app().await;
    let a = create_company(&app, "Sagar Trading Co.", "SAGT").await;
    let b = create_company(&app, "Nexval Logistics", "NEXV").await;
    create_default_invoice(&app, a).await;
    let only_b = create_default_invoice(&app, b).await;

    let (status, body) =
        request_json(&app, "GET", &format!("/api/invoices?companyId={}", b), None).await;
    assert_eq!(status, StatusCode::OK);
    let invoices = body["invoices"].as_array().unwrap();
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0]["id"], only_b["id"]);
}

#[tokio::test]
async fn test_invoice_update_snapshot_recomputes_amount() {
    let (app, _) = test_app().await;
    let id = create_company(&app, "Sagar Trading Co.", "SAGT").await;
    let invoice = create_default_invoice(&app, id).await;

    let defaults = catalog::template_by_id("sagar-trading").unwrap().defaults();
    let revised = DocumentDraft {
        rent_rate: Some(20.0),
        ..DocumentDraft::default()
    }
    .build(&defaults, july21(), 1);
    assert_eq!(revised.grand_total, 590000);

    let (status, body) = request_json(
        &app,
        "PUT",
        &format!("/api/invoices/{}", invoice["id"]),
        Some(json!({ "invoiceData": serde_json::to_value(&revised).unwrap() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["invoice"]["amount"], 590000);
    assert_eq!(body["invoice"]["invoiceData"]["rentRate"], 20.0);
}

#[tokio::test]
async fn test_invoice_status_patch() {
    let (app, _) = test_app().await;
    let id = create_company(&app, "Sagar Trading Co.", "SAGT").await;
    let invoice = create_default_invoice(&app, id).await;

    let (status, body) = request_json(
        &app,
        "PUT",
        &format!("/api/invoices/{}", invoice["id"]),
        Some(json!({ "status": "PAID" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["invoice"]["status"], "PAID");
}

// ============================================================================
// MULTIPART UPLOAD
// ============================================================================

const BOUNDARY: &str = "f2a1c8d943b7e05a";

/// Hand-rolled multipart body: an `invoice` JSON part plus a `pdf` part.
fn multipart_body(invoice: &Value, pdf: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"invoice\"\r\n\r\n{}\r\n",
            BOUNDARY, invoice
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"pdf\"; \
             filename=\"invoice.pdf\"\r\nContent-Type: application/pdf\r\n\r\n",
            BOUNDARY
        )
        .as_bytes(),
    );
    body.extend_from_slice(pdf);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

async fn post_multipart(app: &Router, invoice: &Value, pdf: &[u8]) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/invoices")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(invoice, pdf)))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_multipart_upload_keeps_attachment() {
    let (app, _) = test_app().await;
    let doc = sample_document();
    let payload = json!({ "invoiceData": serde_json::to_value(&doc).unwrap() });
    let uploaded = b"%PDF-1.4 pre-rendered by the editor";

    let (status, body) = post_multipart(&app, &payload, uploaded).await;
    assert_eq!(status, StatusCode::OK, "upload failed: {}", body);
    let id = body["invoice"]["id"].as_u64().unwrap();
    // The attachment is held server-side, never in the JSON record.
    assert!(body["invoice"].get("pdfAttachment").is_none());

    let (status, headers, bytes) =
        request_raw(&app, &format!("/api/invoices/{}/pdf", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, uploaded);
    assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"invoice-SAGT-25-26-001.pdf\""
    );
}

#[tokio::test]
async fn test_multipart_rejects_non_pdf_upload() {
    let (app, _) = test_app().await;
    let doc = sample_document();
    let payload = json!({ "invoiceData": serde_json::to_value(&doc).unwrap() });

    let (status, body) = post_multipart(&app, &payload, b"<html>not a pdf</html>").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("PDF"));
}

// ============================================================================
// DOCUMENT DOWNLOADS
// ============================================================================

#[tokio::test]
async fn test_pdf_download_renders_snapshot() {
    let (app, _) = test_app().await;
    let id = create_company(&app, "Sagar Trading Co.", "SAGT").await;
    let invoice = create_default_invoice(&app, id).await;

    let (status, headers, bytes) =
        request_raw(&app, &format!("/api/invoices/{}/pdf", invoice["id"])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
    assert!(bytes.starts_with(b"%PDF"));
    assert!(bytes.len() > 1000);
}

#[tokio::test]
async fn test_preview_and_html_downloads() {
    let (app, _) = test_app().await;
    let id = create_company(&app, "Sagar Trading Co.", "SAGT").await;
    let invoice = create_default_invoice(&app, id).await;

    let (status, headers, bytes) =
        request_raw(&app, &format!("/api/invoices/{}/preview.png", invoice["id"])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "image/png");
    assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));

    let (status, headers, bytes) = request_raw(
        &app,
        &format!("/api/invoices/{}/document.html", invoice["id"]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    let page = String::from_utf8(bytes).unwrap();
    assert!(page.contains("TAX INVOICE"));
    assert!(page.contains("SAGT/25-26/001"));
    assert!(page.contains("5,31,000"));
}

#[tokio::test]
async fn test_render_endpoints_accept_unsaved_document() {
    let (app, _) = test_app().await;
    let doc = serde_json::to_value(sample_document()).unwrap();

    let (status, headers, bytes) = post_json_raw(&app, "/api/render/html", &doc).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    let page = String::from_utf8(bytes).unwrap();
    assert!(page.contains("TAX INVOICE"));
    assert!(page.contains("SAGT/25-26/001"));

    let (status, headers, bytes) = post_json_raw(&app, "/api/render/pdf", &doc).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
    assert!(bytes.starts_with(b"%PDF"));

    let (status, headers, bytes) = post_json_raw(&app, "/api/render/preview.png", &doc).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "image/png");
    assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
}

// ============================================================================
// EMAIL DISPATCH
// ============================================================================

#[tokio::test]
async fn test_email_dispatch_marks_sent() {
    let (app, mailer) = test_app().await;
    let id = create_company(&app, "Sagar Trading Co.", "SAGT").await;
    let invoice = create_default_invoice(&app, id).await;

    let (status, body) = request_json(
        &app,
        "POST",
        &format!("/api/invoices/{}/email", invoice["id"]),
        Some(json!({ "recipientEmail": "accounts@sagar.example" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "dispatch failed: {}", body);
    assert_eq!(body["invoice"]["status"], "SENT");
    assert_eq!(body["invoice"]["emailRecipient"], "accounts@sagar.example");
    assert!(body["invoice"]["emailSentAt"].is_string());

    let sent = mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "accounts@sagar.example");
    assert_eq!(sent[0].subject, "Invoice SAGT/25-26/001");
    assert_eq!(sent[0].attachment_name, "invoice-SAGT-25-26-001.pdf");
    assert!(sent[0].pdf.starts_with(b"%PDF"));
    assert!(sent[0].body.contains("Rs. 5,31,000"));
    assert!(sent[0].body.contains("Srinivas Estates"));
}

#[tokio::test]
async fn test_failed_dispatch_leaves_invoice_untouched() {
    let (app, mailer) = test_app().await;
    let id = create_company(&app, "Sagar Trading Co.", "SAGT").await;
    let invoice = create_default_invoice(&app, id).await;

    mailer.set_fail(true);
    let (status, _) = request_json(
        &app,
        "POST",
        &format!("/api/invoices/{}/email", invoice["id"]),
        Some(json!({ "recipientEmail": "accounts@sagar.example" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (_, body) =
        request_json(&app, "GET", &format!("/api/invoices/{}", invoice["id"]), None).await;
    assert_eq!(body["invoice"]["status"], "DRAFT");
    assert!(body["invoice"].get("emailSentAt").is_none());
    assert!(mailer.sent().await.is_empty());
}

#[tokio::test]
async fn test_resend_keeps_sent_status_and_updates_recipient() {
    let (app, mailer) = test_app().await;
    let id = create_company(&app, "Sagar Trading Co.", "SAGT").await;
    let invoice = create_default_invoice(&app, id).await;
    let uri = format!("/api/invoices/{}/email", invoice["id"]);

    let (status, _) = request_json(
        &app,
        "POST",
        &uri,
        Some(json!({ "recipientEmail": "accounts@sagar.example" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request_json(
        &app,
        "POST",
        &uri,
        Some(json!({
            "recipientEmail": "director@sagar.example",
            "emailMessage": "Resending with the corrected reference.",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["invoice"]["status"], "SENT");
    assert_eq!(body["invoice"]["emailRecipient"], "director@sagar.example");

    let sent = mailer.sent().await;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].body, "Resending with the corrected reference.");
}

#[tokio::test]
async fn test_email_requires_recipient() {
    let (app, _) = test_app().await;
    let id = create_company(&app, "Sagar Trading Co.", "SAGT").await;
    let invoice = create_default_invoice(&app, id).await;

    let (status, body) = request_json(
        &app,
        "POST",
        &format!("/api/invoices/{}/email", invoice["id"]),
        Some(json!({ "recipientEmail": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("recipientEmail"));
}
