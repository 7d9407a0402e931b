//! # Record Store
//!
//! Persisted companies and invoices behind an injected [`Store`] trait.
//! The trait carries an explicit open/close lifecycle and allocates ids
//! itself, so a database-backed implementation can replace the default
//! [`MemoryStore`] without touching handlers or the core.

pub mod memory;

pub use memory::MemoryStore;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LekhaError;
use crate::invoice::InvoiceDocument;

/// Lifecycle of a persisted invoice. Serialized uppercase; parsed
/// case-insensitively because older records carried mixed-case values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "DRAFT",
            InvoiceStatus::Sent => "SENT",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Overdue => "OVERDUE",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = LekhaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(InvoiceStatus::Draft),
            "SENT" => Ok(InvoiceStatus::Sent),
            "PAID" => Ok(InvoiceStatus::Paid),
            "OVERDUE" => Ok(InvoiceStatus::Overdue),
            other => Err(LekhaError::Validation(format!(
                "unknown invoice status: {}",
                other
            ))),
        }
    }
}

/// A recipient the operator has billed before. One company may carry
/// several GST numbers when the same name signs multiple rental units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: u64,
    pub name: String,
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line3: Option<String>,
    #[serde(default)]
    pub gst_numbers: Vec<String>,
    pub rented_area: f64,
    pub rent_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sgst_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cgst_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_number_prefix: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of a company record the store fills in itself (id, timestamps)
/// are absent here; handlers resolve everything else before inserting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewCompany {
    pub name: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub address_line3: Option<String>,
    pub gst_numbers: Vec<String>,
    pub rented_area: f64,
    pub rent_rate: f64,
    pub sgst_rate: Option<f64>,
    pub cgst_rate: Option<f64>,
    pub ref_number_prefix: Option<String>,
}

/// Partial company update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyPatch {
    pub name: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub address_line3: Option<String>,
    pub gst_numbers: Option<Vec<String>>,
    pub rented_area: Option<f64>,
    pub rent_rate: Option<f64>,
    pub sgst_rate: Option<f64>,
    pub cgst_rate: Option<f64>,
    pub ref_number_prefix: Option<String>,
}

/// A saved invoice. `invoice_data` is the frozen document snapshot taken
/// at save time; historical invoices re-render from it unchanged even
/// after the catalog or derivation defaults move on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: u64,
    pub company_id: u64,
    pub ref_number: String,
    pub amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent_description: Option<String>,
    pub invoice_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub status: InvoiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_sent_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_recipient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_data: Option<InvoiceDocument>,
    /// Uploaded pre-rendered PDF, kept server-side only.
    #[serde(skip)]
    pub pdf_attachment: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Resolved invoice record ready for insertion.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub company_id: u64,
    pub ref_number: String,
    pub amount: i64,
    pub rent_description: Option<String>,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub status: InvoiceStatus,
    pub invoice_data: Option<InvoiceDocument>,
    pub pdf_attachment: Option<Vec<u8>>,
}

/// Partial invoice update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoicePatch {
    pub ref_number: Option<String>,
    pub amount: Option<i64>,
    pub rent_description: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<InvoiceStatus>,
    pub invoice_data: Option<InvoiceDocument>,
}

/// Persistence seam. Implementations must be safe under concurrent
/// handler access and must hand out strictly increasing ids.
#[async_trait]
pub trait Store: Send + Sync {
    /// Prepare the store for use. Called once before serving.
    async fn open(&self) -> Result<(), LekhaError>;

    /// Flush and refuse further operations.
    async fn close(&self) -> Result<(), LekhaError>;

    async fn create_company(&self, company: NewCompany) -> Result<Company, LekhaError>;
    async fn list_companies(&self) -> Result<Vec<Company>, LekhaError>;
    async fn get_company(&self, id: u64) -> Result<Company, LekhaError>;
    async fn find_company_by_name(&self, name: &str) -> Result<Option<Company>, LekhaError>;
    async fn update_company(&self, id: u64, patch: CompanyPatch) -> Result<Company, LekhaError>;

    /// Delete the company and every invoice it owns. Returns how many
    /// invoices went with it.
    async fn delete_company(&self, id: u64) -> Result<usize, LekhaError>;

    async fn create_invoice(&self, invoice: NewInvoice) -> Result<Invoice, LekhaError>;
    async fn list_invoices(&self, company_id: Option<u64>) -> Result<Vec<Invoice>, LekhaError>;
    async fn get_invoice(&self, id: u64) -> Result<Invoice, LekhaError>;
    async fn update_invoice(&self, id: u64, patch: InvoicePatch) -> Result<Invoice, LekhaError>;
    async fn delete_invoice(&self, id: u64) -> Result<(), LekhaError>;

    /// Record a successful dispatch: DRAFT moves to SENT, the timestamp
    /// and recipient are stored. Re-sending an already-sent invoice
    /// refreshes the dispatch record without touching the status.
    async fn mark_sent(
        &self,
        id: u64,
        recipient: &str,
        at: DateTime<Utc>,
    ) -> Result<Invoice, LekhaError>;

    /// Next reference sequence number for a prefix, starting at 1.
    async fn next_ref_seq(&self, prefix: &str) -> Result<u64, LekhaError>;
}
