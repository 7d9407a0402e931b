//! Application configuration.
//!
//! Everything the handlers and renderers need to know about the issuing
//! firm, tax defaults, signature location, SMTP relay, and the login
//! gate lives here. Constructed once in `main` and injected through
//! `AppState`; nothing reads ambient globals.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Identity of the firm issuing the invoices. Rendered into the
/// letterhead, bank block, and signature block of every document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuerProfile {
    pub name: String,
    pub address_line1: String,
    pub address_line2: String,
    pub address_line3: String,
    pub gst_number: String,
    pub pan_number: String,
    pub bank_name: String,
    pub bank_account: String,
    pub bank_ifsc: String,
    /// Name printed under the signature line.
    pub signatory: String,
}

impl Default for IssuerProfile {
    fn default() -> Self {
        Self {
            name: "Srinivas Estates".to_string(),
            address_line1: "Plot 14, MIDC Industrial Area".to_string(),
            address_line2: "Andheri East".to_string(),
            address_line3: "Mumbai - 400093".to_string(),
            gst_number: "27AAEFS4821H1Z3".to_string(),
            pan_number: "AAEFS4821H".to_string(),
            bank_name: "HDFC Bank, Andheri East Branch".to_string(),
            bank_account: "50200048217393".to_string(),
            bank_ifsc: "HDFC0000592".to_string(),
            signatory: "Authorised Signatory".to_string(),
        }
    }
}

/// SMTP relay settings for invoice dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub from_name: String,
}

/// Credentials for the single-operator login gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "rentbook".to_string(),
        }
    }
}

/// Rules for collapsing company display names into a shared base name.
///
/// The dashboard groups "Company 2 - Acme Traders" and "Acme Traders 3"
/// under "Acme Traders". Both halves of the heuristic are data, not
/// code, so the grouping can be tuned without touching the handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupingRules {
    /// Labels recognized in a `<Label> <N> - <name>` prefix.
    pub strip_label_prefixes: Vec<String>,
    /// Drop a trailing ` <N>` numeric suffix from the name.
    pub strip_trailing_digits: bool,
}

impl Default for GroupingRules {
    fn default() -> Self {
        Self {
            strip_label_prefixes: vec!["Company".to_string()],
            strip_trailing_digits: true,
        }
    }
}

impl GroupingRules {
    /// Normalize a display name to its grouping key.
    pub fn base_name(&self, name: &str) -> String {
        let mut base = name.trim();

        for label in &self.strip_label_prefixes {
            if let Some(rest) = base.strip_prefix(label.as_str()) {
                // Accept "<Label> 2 - Acme" but not "Companyville - Acme".
                let rest = rest.trim_start();
                let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
                if !digits.is_empty() {
                    let after = rest[digits.len()..].trim_start();
                    if let Some(stripped) = after.strip_prefix('-') {
                        base = stripped.trim_start();
                        break;
                    }
                }
            }
        }

        let mut base = base.trim_end().to_string();
        if self.strip_trailing_digits {
            let trimmed = base
                .trim_end_matches(|c: char| c.is_ascii_digit())
                .trim_end();
            // Only treat it as a suffix when something remains.
            if trimmed.len() < base.len() && !trimmed.is_empty() {
                base = trimmed.to_string();
            }
        }
        base
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    pub issuer: IssuerProfile,
    /// Applied when a company record carries no explicit SGST rate.
    pub default_sgst_rate: f64,
    /// Applied when a company record carries no explicit CGST rate.
    pub default_cgst_rate: f64,
    pub grouping: GroupingRules,
    /// Directory holding `signature.png` / `signature.jpg`.
    pub signature_dir: PathBuf,
    /// Optional HTTP source for the signature, tried before the directory.
    pub signature_url: Option<String>,
    /// SMTP relay; `None` disables dispatch (sends fail with a clear error).
    pub smtp: Option<SmtpConfig>,
    pub credentials: Credentials,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            issuer: IssuerProfile::default(),
            default_sgst_rate: 9.0,
            default_cgst_rate: 9.0,
            grouping: GroupingRules::default(),
            signature_dir: PathBuf::from("assets"),
            signature_url: None,
            smtp: None,
            credentials: Credentials::default(),
        }
    }
}
