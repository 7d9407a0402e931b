//! Company CRUD and the grouped dashboard.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use super::super::state::AppState;
use crate::error::LekhaError;
use crate::storage::{CompanyPatch, NewCompany};

/// Handle GET /api/companies.
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Value>, LekhaError> {
    let companies = state.store.list_companies().await?;
    Ok(Json(json!({ "companies": companies })))
}

/// Handle POST /api/companies.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewCompany>,
) -> Result<Json<Value>, LekhaError> {
    if payload.name.trim().is_empty() {
        return Err(LekhaError::Validation("company name is required".to_string()));
    }
    let company = state.store.create_company(payload).await?;
    tracing::info!(id = company.id, name = %company.name, "company created");
    Ok(Json(json!({ "company": company })))
}

/// Handle GET /api/companies/:id.
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, LekhaError> {
    let company = state.store.get_company(id).await?;
    Ok(Json(json!({ "company": company })))
}

/// Handle PUT /api/companies/:id.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(patch): Json<CompanyPatch>,
) -> Result<Json<Value>, LekhaError> {
    let company = state.store.update_company(id, patch).await?;
    Ok(Json(json!({ "company": company })))
}

/// Handle DELETE /api/companies/:id. Cascades to the company's invoices
/// and reports how many were removed with it.
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, LekhaError> {
    let removed_invoices = state.store.delete_company(id).await?;
    tracing::info!(id, removed_invoices, "company deleted");
    Ok(Json(json!({
        "deleted": { "companyId": id, "invoices": removed_invoices }
    })))
}

/// One dashboard row: companies folded under a shared base name.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardGroup {
    name: String,
    company_ids: Vec<u64>,
    invoice_count: usize,
    total_amount: i64,
}

/// Handle GET /api/dashboard. Variants like "Company 2 - Acme" and
/// "Acme 3" fold under "Acme" per the configured grouping rules.
pub async fn dashboard(State(state): State<Arc<AppState>>) -> Result<Json<Value>, LekhaError> {
    let companies = state.store.list_companies().await?;
    let invoices = state.store.list_invoices(None).await?;

    let mut groups: BTreeMap<String, DashboardGroup> = BTreeMap::new();
    for company in &companies {
        let base = state.config.grouping.base_name(&company.name);
        let group = groups.entry(base.clone()).or_insert_with(|| DashboardGroup {
            name: base,
            company_ids: Vec::new(),
            invoice_count: 0,
            total_amount: 0,
        });
        group.company_ids.push(company.id);
        for invoice in invoices.iter().filter(|inv| inv.company_id == company.id) {
            group.invoice_count += 1;
            group.total_amount += invoice.amount;
        }
    }

    let rows: Vec<DashboardGroup> = groups.into_values().collect();
    Ok(Json(json!({ "dashboard": rows })))
}
