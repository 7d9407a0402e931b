//! # Invoice Document Model
//!
//! The canonical record shape threaded through every renderer. An
//! `InvoiceDocument` is assembled from a catalog template or persisted
//! company plus operator overrides (`DocumentDraft`), carries every field
//! as a present value (renderers never see a missing field), and owns the
//! numeric derivation cascade:
//!
//! ```text
//! area x rate -> rent amount -> SGST/CGST amounts -> grand total -> words
//! ```
//!
//! Editing area or rate re-runs the whole cascade; editing a tax rate or
//! the rent amount directly re-runs only the downstream figures. Saved
//! invoices freeze the document as-is so historical records re-render
//! identically even if templates or defaults change later.

pub mod amounts;
pub mod dates;
pub mod words;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::LekhaError;
use amounts::BillFigures;

/// Accept a decimal that may arrive as a JSON number, a form string, or
/// null. Invalid and negative input derives zero, matching the billing
/// form's lenient text parsing.
fn de_decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
        Null,
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Num(v) if v.is_finite() && v >= 0.0 => v,
        Raw::Num(_) => 0.0,
        Raw::Text(s) => amounts::parse_decimal(&s),
        Raw::Null => 0.0,
    })
}

/// Same leniency for whole-rupee amounts.
fn de_money<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
        Null,
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Num(v) if v.is_finite() && v >= 0.0 => amounts::round_currency(v),
        Raw::Num(_) => 0,
        Raw::Text(s) => amounts::round_currency(amounts::parse_decimal(&s)),
        Raw::Null => 0,
    })
}

/// The canonical value passed to every renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceDocument {
    pub ref_number: String,
    /// Calendar date; displayed with ordinal-suffix formatting.
    pub invoice_date: NaiveDate,
    pub recipient_name: String,
    pub address_line1: String,
    pub address_line2: String,
    pub address_line3: String,
    pub gst_number: String,
    /// Rented area in square feet.
    #[serde(deserialize_with = "de_decimal")]
    pub rented_area: f64,
    /// Rent rate in rupees per square foot.
    #[serde(deserialize_with = "de_decimal")]
    pub rent_rate: f64,
    #[serde(deserialize_with = "de_money")]
    pub rent_amount: i64,
    #[serde(deserialize_with = "de_decimal")]
    pub sgst_rate: f64,
    #[serde(deserialize_with = "de_money")]
    pub sgst_amount: i64,
    #[serde(deserialize_with = "de_decimal")]
    pub cgst_rate: f64,
    #[serde(deserialize_with = "de_money")]
    pub cgst_amount: i64,
    #[serde(deserialize_with = "de_money")]
    pub grand_total: i64,
    pub grand_total_words: String,
    /// Billing-period text, e.g. "Rent for the month of July '25".
    pub rent_description: String,
}

impl Default for InvoiceDocument {
    fn default() -> Self {
        Self {
            ref_number: String::new(),
            invoice_date: NaiveDate::default(),
            recipient_name: String::new(),
            address_line1: String::new(),
            address_line2: String::new(),
            address_line3: String::new(),
            gst_number: String::new(),
            rented_area: 0.0,
            rent_rate: 0.0,
            rent_amount: 0,
            sgst_rate: 0.0,
            sgst_amount: 0,
            cgst_rate: 0.0,
            cgst_amount: 0,
            grand_total: 0,
            grand_total_words: String::new(),
            rent_description: String::new(),
        }
    }
}

impl InvoiceDocument {
    /// Re-run the full cascade from area and rate.
    pub fn recompute_rent(&mut self) {
        let figures = BillFigures::derive(
            self.rented_area,
            self.rent_rate,
            self.sgst_rate,
            self.cgst_rate,
        );
        self.apply(figures);
    }

    /// Re-run only the figures downstream of the rent amount. A rent
    /// amount that disagrees with area x rate is kept: the operator
    /// typed it directly.
    pub fn recompute(&mut self) {
        let figures =
            BillFigures::from_rent_amount(self.rent_amount, self.sgst_rate, self.cgst_rate);
        self.apply(figures);
    }

    fn apply(&mut self, figures: BillFigures) {
        self.rent_amount = figures.rent_amount;
        self.sgst_amount = figures.sgst_amount;
        self.cgst_amount = figures.cgst_amount;
        self.grand_total = figures.grand_total;
        self.grand_total_words = words::amount_in_words(self.grand_total);
    }

    /// Display form of the invoice date, e.g. "21st July 2025".
    pub fn date_display(&self) -> String {
        dates::ordinal_date(self.invoice_date)
    }

    /// Checked before any persistence or rendering on the save path.
    pub fn validate(&self) -> Result<(), LekhaError> {
        if self.recipient_name.trim().is_empty() {
            return Err(LekhaError::Validation(
                "recipient name is required".to_string(),
            ));
        }
        if self.ref_number.trim().is_empty() {
            return Err(LekhaError::Validation(
                "reference number is required".to_string(),
            ));
        }
        if self.grand_total <= 0 {
            return Err(LekhaError::Validation(
                "invoice amount must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Recipient and billing defaults a draft falls back to. Produced from a
/// catalog template or a persisted company record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillDefaults {
    pub recipient_name: String,
    pub address_line1: String,
    pub address_line2: String,
    pub address_line3: String,
    pub gst_number: String,
    pub rented_area: f64,
    pub rent_rate: f64,
    pub sgst_rate: f64,
    pub cgst_rate: f64,
    pub ref_number_prefix: String,
}

/// Operator-editable fields. Unset fields fall back to the supplied
/// defaults; set fields always win.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentDraft {
    pub ref_number: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub recipient_name: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub address_line3: Option<String>,
    pub gst_number: Option<String>,
    #[serde(deserialize_with = "de_opt_decimal")]
    pub rented_area: Option<f64>,
    #[serde(deserialize_with = "de_opt_decimal")]
    pub rent_rate: Option<f64>,
    /// A directly edited rent amount; suppresses the area x rate step.
    #[serde(deserialize_with = "de_opt_money")]
    pub rent_amount: Option<i64>,
    #[serde(deserialize_with = "de_opt_decimal")]
    pub sgst_rate: Option<f64>,
    #[serde(deserialize_with = "de_opt_decimal")]
    pub cgst_rate: Option<f64>,
    pub rent_description: Option<String>,
}

fn de_opt_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(de_decimal(deserializer)?))
}

fn de_opt_money<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(de_money(deserializer)?))
}

/// Take an override only when it carries visible text.
fn text_or<'a>(over: &'a Option<String>, fallback: &'a str) -> &'a str {
    match over {
        Some(s) if !s.trim().is_empty() => s,
        _ => fallback,
    }
}

impl DocumentDraft {
    /// Assemble the full document.
    ///
    /// `today` anchors the invoice date when the operator never picked
    /// one; `ref_seq` numbers a generated reference (ignored when the
    /// draft carries an explicit reference number).
    pub fn build(&self, defaults: &BillDefaults, today: NaiveDate, ref_seq: u64) -> InvoiceDocument {
        let invoice_date = self.invoice_date.unwrap_or(today);

        let mut doc = InvoiceDocument {
            ref_number: text_or(&self.ref_number, "").to_string(),
            invoice_date,
            recipient_name: text_or(&self.recipient_name, &defaults.recipient_name).to_string(),
            address_line1: text_or(&self.address_line1, &defaults.address_line1).to_string(),
            address_line2: text_or(&self.address_line2, &defaults.address_line2).to_string(),
            address_line3: text_or(&self.address_line3, &defaults.address_line3).to_string(),
            gst_number: text_or(&self.gst_number, &defaults.gst_number).to_string(),
            rented_area: self.rented_area.unwrap_or(defaults.rented_area),
            rent_rate: self.rent_rate.unwrap_or(defaults.rent_rate),
            sgst_rate: self.sgst_rate.unwrap_or(defaults.sgst_rate),
            cgst_rate: self.cgst_rate.unwrap_or(defaults.cgst_rate),
            rent_description: text_or(&self.rent_description, "").to_string(),
            ..InvoiceDocument::default()
        };

        if doc.ref_number.is_empty() {
            doc.ref_number = dates::ref_number(&defaults.ref_number_prefix, invoice_date, ref_seq);
        }
        if doc.rent_description.is_empty() {
            doc.rent_description = dates::rent_period(invoice_date);
        }

        match self.rent_amount {
            Some(amount) => {
                doc.rent_amount = amount;
                doc.recompute();
            }
            None => doc.recompute_rent(),
        }
        doc
    }
}
