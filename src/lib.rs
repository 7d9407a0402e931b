//! # Lekha - Rent Invoice Library
//!
//! Lekha generates GST rent invoices: it derives the billed amounts,
//! spells the total in Indian-system words, and renders the same
//! document as HTML, as a PNG preview, and as the PDF that gets mailed
//! to the tenant. It provides:
//!
//! - **Derivation engine**: area x rate with cascading SGST/CGST
//! - **Number-to-words**: crore/lakh/thousand spelled amounts
//! - **Renderers**: HTML, A4 canvas preview, vector PDF
//! - **Record store**: companies and invoices behind an injected trait
//! - **Dispatch**: SMTP email with the PDF attached
//!
//! ## Quick Start
//!
//! ```
//! use chrono::NaiveDate;
//! use lekha::catalog;
//! use lekha::config::IssuerProfile;
//! use lekha::invoice::DocumentDraft;
//! use lekha::render::html;
//! use lekha::signature::ResolvedSignature;
//!
//! // Start from a catalog template and assemble the document.
//! let template = catalog::template_by_id("sagar-trading").unwrap();
//! let doc = DocumentDraft::default().build(
//!     &template.defaults(),
//!     NaiveDate::from_ymd_opt(2025, 7, 21).unwrap(),
//!     1,
//! );
//!
//! assert_eq!(doc.grand_total, 531_000);
//! assert_eq!(doc.grand_total_words, "Five Lakh Thirty One Thousand Only");
//!
//! // Render it.
//! let page = html::render(
//!     &doc,
//!     &IssuerProfile::default(),
//!     &ResolvedSignature::vector_fallback(),
//! );
//! assert!(page.contains("TAX INVOICE"));
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`invoice`] | Document model, derivation, words, dates |
//! | [`catalog`] | Static company templates |
//! | [`sheet`] | A4 page plan shared by canvas and PDF |
//! | [`render`] | HTML, canvas, and PDF backends |
//! | [`signature`] | Signature resolution with vector fallback |
//! | [`storage`] | Persisted companies and invoices |
//! | [`mailer`] | SMTP dispatch with PDF attachment |
//! | [`server`] | REST surface |
//! | [`config`] | Issuer profile and runtime settings |
//! | [`error`] | Error types |

pub mod catalog;
pub mod config;
pub mod error;
pub mod invoice;
pub mod mailer;
pub mod render;
pub mod server;
pub mod sheet;
pub mod signature;
pub mod storage;

// Re-exports for convenience
pub use config::Config;
pub use error::LekhaError;
pub use invoice::InvoiceDocument;
pub use storage::{MemoryStore, Store};
