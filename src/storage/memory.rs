//! In-memory store. The default backend: a pair of `RwLock` maps with
//! atomic id counters. Good for one operator and for tests; anything
//! needing durability swaps in another [`Store`] implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{
    Company, CompanyPatch, Invoice, InvoicePatch, InvoiceStatus, NewCompany, NewInvoice, Store,
};
use crate::error::LekhaError;

pub struct MemoryStore {
    open: AtomicBool,
    next_company_id: AtomicU64,
    next_invoice_id: AtomicU64,
    companies: RwLock<HashMap<u64, Company>>,
    invoices: RwLock<HashMap<u64, Invoice>>,
    ref_seqs: RwLock<HashMap<String, u64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            open: AtomicBool::new(false),
            next_company_id: AtomicU64::new(1),
            next_invoice_id: AtomicU64::new(1),
            companies: RwLock::new(HashMap::new()),
            invoices: RwLock::new(HashMap::new()),
            ref_seqs: RwLock::new(HashMap::new()),
        }
    }

    fn ensure_open(&self) -> Result<(), LekhaError> {
        if self.open.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(LekhaError::Storage("store is not open".to_string()))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn open(&self) -> Result<(), LekhaError> {
        self.open.store(true, Ordering::Release);
        Ok(())
    }

    async fn close(&self) -> Result<(), LekhaError> {
        self.open.store(false, Ordering::Release);
        Ok(())
    }

    async fn create_company(&self, company: NewCompany) -> Result<Company, LekhaError> {
        self.ensure_open()?;
        let id = self.next_company_id.fetch_add(1, Ordering::Relaxed);
        let now = Utc::now();
        let record = Company {
            id,
            name: company.name,
            address_line1: company.address_line1,
            address_line2: company.address_line2,
            address_line3: company.address_line3,
            gst_numbers: company.gst_numbers,
            rented_area: company.rented_area,
            rent_rate: company.rent_rate,
            sgst_rate: company.sgst_rate,
            cgst_rate: company.cgst_rate,
            ref_number_prefix: company.ref_number_prefix,
            created_at: now,
            updated_at: now,
        };
        self.companies.write().await.insert(id, record.clone());
        Ok(record)
    }

    async fn list_companies(&self) -> Result<Vec<Company>, LekhaError> {
        self.ensure_open()?;
        let companies = self.companies.read().await;
        let mut all: Vec<Company> = companies.values().cloned().collect();
        all.sort_by_key(|c| c.id);
        Ok(all)
    }

    async fn get_company(&self, id: u64) -> Result<Company, LekhaError> {
        self.ensure_open()?;
        self.companies
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| LekhaError::NotFound(format!("company {}", id)))
    }

    async fn find_company_by_name(&self, name: &str) -> Result<Option<Company>, LekhaError> {
        self.ensure_open()?;
        let companies = self.companies.read().await;
        Ok(companies
            .values()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
            .cloned())
    }

    async fn update_company(&self, id: u64, patch: CompanyPatch) -> Result<Company, LekhaError> {
        self.ensure_open()?;
        let mut companies = self.companies.write().await;
        let record = companies
            .get_mut(&id)
            .ok_or_else(|| LekhaError::NotFound(format!("company {}", id)))?;
        if let Some(name) = patch.name {
            record.name = name;
        }
        if let Some(line) = patch.address_line1 {
            record.address_line1 = line;
        }
        if let Some(line) = patch.address_line2 {
            record.address_line2 = Some(line);
        }
        if let Some(line) = patch.address_line3 {
            record.address_line3 = Some(line);
        }
        if let Some(numbers) = patch.gst_numbers {
            record.gst_numbers = numbers;
        }
        if let Some(area) = patch.rented_area {
            record.rented_area = area;
        }
        if let Some(rate) = patch.rent_rate {
            record.rent_rate = rate;
        }
        if let Some(rate) = patch.sgst_rate {
            record.sgst_rate = Some(rate);
        }
        if let Some(rate) = patch.cgst_rate {
            record.cgst_rate = Some(rate);
        }
        if let Some(prefix) = patch.ref_number_prefix {
            record.ref_number_prefix = Some(prefix);
        }
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn delete_company(&self, id: u64) -> Result<usize, LekhaError> {
        self.ensure_open()?;
        let mut companies = self.companies.write().await;
        if companies.remove(&id).is_none() {
            return Err(LekhaError::NotFound(format!("company {}", id)));
        }
        let mut invoices = self.invoices.write().await;
        let before = invoices.len();
        invoices.retain(|_, inv| inv.company_id != id);
        Ok(before - invoices.len())
    }

    async fn create_invoice(&self, invoice: NewInvoice) -> Result<Invoice, LekhaError> {
        self.ensure_open()?;
        if !self.companies.read().await.contains_key(&invoice.company_id) {
            return Err(LekhaError::NotFound(format!(
                "company {}",
                invoice.company_id
            )));
        }
        let id = self.next_invoice_id.fetch_add(1, Ordering::Relaxed);
        let now = Utc::now();
        let record = Invoice {
            id,
            company_id: invoice.company_id,
            ref_number: invoice.ref_number,
            amount: invoice.amount,
            rent_description: invoice.rent_description,
            invoice_date: invoice.invoice_date,
            due_date: invoice.due_date,
            status: invoice.status,
            email_sent_at: None,
            email_recipient: None,
            invoice_data: invoice.invoice_data,
            pdf_attachment: invoice.pdf_attachment,
            created_at: now,
            updated_at: now,
        };
        self.invoices.write().await.insert(id, record.clone());
        Ok(record)
    }

    async fn list_invoices(&self, company_id: Option<u64>) -> Result<Vec<Invoice>, LekhaError> {
        self.ensure_open()?;
        let invoices = self.invoices.read().await;
        let mut all: Vec<Invoice> = invoices
            .values()
            .filter(|inv| company_id.is_none_or(|cid| inv.company_id == cid))
            .cloned()
            .collect();
        all.sort_by_key(|inv| inv.id);
        Ok(all)
    }

    async fn get_invoice(&self, id: u64) -> Result<Invoice, LekhaError> {
        self.ensure_open()?;
        self.invoices
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| LekhaError::NotFound(format!("invoice {}", id)))
    }

    async fn update_invoice(&self, id: u64, patch: InvoicePatch) -> Result<Invoice, LekhaError> {
        self.ensure_open()?;
        let mut invoices = self.invoices.write().await;
        let record = invoices
            .get_mut(&id)
            .ok_or_else(|| LekhaError::NotFound(format!("invoice {}", id)))?;
        if let Some(ref_number) = patch.ref_number {
            record.ref_number = ref_number;
        }
        if let Some(amount) = patch.amount {
            record.amount = amount;
        }
        if let Some(description) = patch.rent_description {
            record.rent_description = Some(description);
        }
        if let Some(date) = patch.invoice_date {
            record.invoice_date = date;
        }
        if let Some(date) = patch.due_date {
            record.due_date = Some(date);
        }
        if let Some(status) = patch.status {
            record.status = status;
        }
        if let Some(data) = patch.invoice_data {
            record.amount = data.grand_total;
            record.invoice_data = Some(data);
        }
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn delete_invoice(&self, id: u64) -> Result<(), LekhaError> {
        self.ensure_open()?;
        self.invoices
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| LekhaError::NotFound(format!("invoice {}", id)))
    }

    async fn mark_sent(
        &self,
        id: u64,
        recipient: &str,
        at: DateTime<Utc>,
    ) -> Result<Invoice, LekhaError> {
        self.ensure_open()?;
        let mut invoices = self.invoices.write().await;
        let record = invoices
            .get_mut(&id)
            .ok_or_else(|| LekhaError::NotFound(format!("invoice {}", id)))?;
        if record.status == InvoiceStatus::Draft {
            record.status = InvoiceStatus::Sent;
        }
        record.email_sent_at = Some(at);
        record.email_recipient = Some(recipient.to_string());
        record.updated_at = at;
        Ok(record.clone())
    }

    async fn next_ref_seq(&self, prefix: &str) -> Result<u64, LekhaError> {
        self.ensure_open()?;
        let mut seqs = self.ref_seqs.write().await;
        let seq = seqs.entry(prefix.to_string()).or_insert(0);
        *seq += 1;
        Ok(*seq)
    }
}
