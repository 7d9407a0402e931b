//! Invoice CRUD, document downloads, and email dispatch.
//!
//! Creation accepts either a plain JSON body or multipart form data
//! carrying an `invoice` JSON part plus an optional pre-rendered `pdf`
//! part. Saving freezes the InvoiceDocument snapshot; the download and
//! email paths always work from that snapshot so a historical invoice
//! re-renders exactly as it was issued.

use std::sync::Arc;

use axum::{
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use super::super::state::AppState;
use super::render::{pdf_bytes, preview_bytes};
use crate::error::LekhaError;
use crate::invoice::{BillDefaults, DocumentDraft, InvoiceDocument};
use crate::mailer::OutgoingEmail;
use crate::render;
use crate::storage::{Company, CompanyPatch, InvoiceStatus, NewCompany, NewInvoice};

/// Wire shape for invoice creation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoicePayload {
    pub company_id: Option<u64>,
    pub ref_number: Option<String>,
    pub amount: Option<i64>,
    pub rent_description: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<InvoiceStatus>,
    pub invoice_data: Option<InvoiceDocument>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListQuery {
    pub company_id: Option<u64>,
}

/// Handle GET /api/invoices, optionally filtered by `?companyId=`.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, LekhaError> {
    let invoices = state.store.list_invoices(query.company_id).await?;
    Ok(Json(json!({ "invoices": invoices })))
}

/// Handle GET /api/invoices/:id.
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, LekhaError> {
    let invoice = state.store.get_invoice(id).await?;
    Ok(Json(json!({ "invoice": invoice })))
}

/// Handle POST /api/invoices.
pub async fn create(
    State(state): State<Arc<AppState>>,
    req: Request,
) -> Result<Json<Value>, LekhaError> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let (payload, uploaded_pdf) = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| LekhaError::Validation(format!("multipart error: {}", e)))?;
        parse_multipart(multipart).await?
    } else {
        let bytes = axum::body::to_bytes(req.into_body(), super::super::BODY_LIMIT)
            .await
            .map_err(|e| LekhaError::Validation(format!("body read failed: {}", e)))?;
        let payload = serde_json::from_slice(&bytes)
            .map_err(|e| LekhaError::Validation(format!("invalid invoice JSON: {}", e)))?;
        (payload, None)
    };

    if let Some(pdf) = &uploaded_pdf {
        if !pdf.starts_with(b"%PDF") {
            return Err(LekhaError::Validation(
                "uploaded file is not a PDF".to_string(),
            ));
        }
    }

    let record = resolve_new_invoice(&state, payload, uploaded_pdf).await?;
    let invoice = state.store.create_invoice(record).await?;
    tracing::info!(
        id = invoice.id,
        ref_number = %invoice.ref_number,
        amount = invoice.amount,
        "invoice created"
    );
    Ok(Json(json!({ "invoice": invoice })))
}

/// Handle PUT /api/invoices/:id.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(patch): Json<crate::storage::InvoicePatch>,
) -> Result<Json<Value>, LekhaError> {
    if let Some(doc) = &patch.invoice_data {
        doc.validate()?;
    }
    let invoice = state.store.update_invoice(id, patch).await?;
    Ok(Json(json!({ "invoice": invoice })))
}

/// Handle DELETE /api/invoices/:id.
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, LekhaError> {
    state.store.delete_invoice(id).await?;
    tracing::info!(id, "invoice deleted");
    Ok(Json(json!({ "deleted": { "invoiceId": id } })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailForm {
    pub recipient_email: String,
    #[serde(default)]
    pub email_message: Option<String>,
}

/// Handle POST /api/invoices/:id/email. On success the invoice moves
/// DRAFT to SENT with the dispatch recorded; on failure it is untouched.
pub async fn email(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(form): Json<EmailForm>,
) -> Result<Json<Value>, LekhaError> {
    let recipient = form.recipient_email.trim().to_string();
    if recipient.is_empty() {
        return Err(LekhaError::Validation(
            "recipientEmail is required".to_string(),
        ));
    }

    let invoice = state.store.get_invoice(id).await?;
    let pdf = match invoice.pdf_attachment.clone() {
        Some(bytes) => bytes,
        None => {
            let doc = snapshot_of(&invoice)?;
            pdf_bytes(&state, doc).await?
        }
    };

    let body = form
        .email_message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            format!(
                "Dear Sir/Madam,\n\nPlease find attached invoice {} for an amount of \
                 Rs. {}.\n\nRegards,\n{}",
                invoice.ref_number,
                crate::invoice::amounts::format_amount(invoice.amount),
                state.config.issuer.name,
            )
        });

    state
        .mailer
        .send_invoice(OutgoingEmail {
            to: recipient.clone(),
            subject: format!("Invoice {}", invoice.ref_number),
            body,
            attachment_name: attachment_name(&invoice.ref_number),
            pdf,
        })
        .await?;

    let updated = state.store.mark_sent(id, &recipient, Utc::now()).await?;
    tracing::info!(id, recipient = %recipient, "invoice emailed");
    Ok(Json(json!({ "invoice": updated })))
}

/// Handle GET /api/invoices/:id/pdf. Prefers the uploaded attachment;
/// otherwise renders the frozen snapshot.
pub async fn pdf(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Response, LekhaError> {
    let invoice = state.store.get_invoice(id).await?;
    let bytes = match invoice.pdf_attachment.clone() {
        Some(bytes) => bytes,
        None => {
            let doc = snapshot_of(&invoice)?;
            pdf_bytes(&state, doc).await?
        }
    };
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"{}\"",
                    attachment_name(&invoice.ref_number)
                ),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Handle GET /api/invoices/:id/preview.png.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Response, LekhaError> {
    let invoice = state.store.get_invoice(id).await?;
    let doc = snapshot_of(&invoice)?;
    let png = preview_bytes(&state, doc).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

/// Handle GET /api/invoices/:id/document.html.
pub async fn document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Html<String>, LekhaError> {
    let invoice = state.store.get_invoice(id).await?;
    let doc = snapshot_of(&invoice)?;
    let signature = state.signatures.resolve().await;
    Ok(Html(render::html::render(
        &doc,
        &state.config.issuer,
        &signature,
    )))
}

fn snapshot_of(invoice: &crate::storage::Invoice) -> Result<InvoiceDocument, LekhaError> {
    invoice.invoice_data.clone().ok_or_else(|| {
        LekhaError::Validation(format!(
            "invoice {} has no document snapshot",
            invoice.id
        ))
    })
}

fn attachment_name(ref_number: &str) -> String {
    format!("invoice-{}.pdf", ref_number.replace('/', "-"))
}

async fn parse_multipart(
    mut multipart: Multipart,
) -> Result<(InvoicePayload, Option<Vec<u8>>), LekhaError> {
    let mut payload: Option<InvoicePayload> = None;
    let mut pdf: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| LekhaError::Validation(format!("multipart error: {}", e)))?
    {
        match field.name().unwrap_or("") {
            "invoice" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| LekhaError::Validation(format!("invoice part: {}", e)))?;
                payload = Some(
                    serde_json::from_str(&text)
                        .map_err(|e| LekhaError::Validation(format!("invoice JSON: {}", e)))?,
                );
            }
            "pdf" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| LekhaError::Validation(format!("pdf part: {}", e)))?;
                pdf = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let payload =
        payload.ok_or_else(|| LekhaError::Validation("missing invoice part".to_string()))?;
    Ok((payload, pdf))
}

/// Turn a wire payload into a resolved record. The document snapshot
/// either arrives from the editor or is assembled from the company's
/// defaults; a previously-unknown recipient gets a company created for
/// it, and a known one collects any new GST number.
async fn resolve_new_invoice(
    state: &Arc<AppState>,
    payload: InvoicePayload,
    pdf_attachment: Option<Vec<u8>>,
) -> Result<NewInvoice, LekhaError> {
    let doc = match payload.invoice_data {
        Some(doc) => {
            doc.validate()?;
            doc
        }
        None => {
            let company_id = payload.company_id.ok_or_else(|| {
                LekhaError::Validation(
                    "either invoiceData or companyId is required".to_string(),
                )
            })?;
            let company = state.store.get_company(company_id).await?;
            let defaults = company_defaults(&company, state);
            let seq = state
                .store
                .next_ref_seq(&defaults.ref_number_prefix)
                .await?;
            let draft = DocumentDraft {
                ref_number: payload.ref_number.clone(),
                invoice_date: payload.invoice_date,
                rent_description: payload.rent_description.clone(),
                ..DocumentDraft::default()
            };
            let doc = draft.build(&defaults, Utc::now().date_naive(), seq);
            doc.validate()?;
            doc
        }
    };

    let company_id = match payload.company_id {
        Some(id) => {
            // 404 before touching anything else.
            state.store.get_company(id).await?.id
        }
        None => resolve_company_for(state, &doc).await?,
    };

    Ok(NewInvoice {
        company_id,
        ref_number: payload.ref_number.unwrap_or_else(|| doc.ref_number.clone()),
        amount: payload.amount.unwrap_or(doc.grand_total),
        rent_description: payload
            .rent_description
            .or_else(|| Some(doc.rent_description.clone())),
        invoice_date: payload.invoice_date.unwrap_or(doc.invoice_date),
        due_date: payload.due_date,
        status: payload.status.unwrap_or_default(),
        invoice_data: Some(doc),
        pdf_attachment,
    })
}

fn company_defaults(company: &Company, state: &Arc<AppState>) -> BillDefaults {
    BillDefaults {
        recipient_name: company.name.clone(),
        address_line1: company.address_line1.clone(),
        address_line2: company.address_line2.clone().unwrap_or_default(),
        address_line3: company.address_line3.clone().unwrap_or_default(),
        gst_number: company.gst_numbers.first().cloned().unwrap_or_default(),
        rented_area: company.rented_area,
        rent_rate: company.rent_rate,
        sgst_rate: company
            .sgst_rate
            .unwrap_or(state.config.default_sgst_rate),
        cgst_rate: company
            .cgst_rate
            .unwrap_or(state.config.default_cgst_rate),
        ref_number_prefix: company
            .ref_number_prefix
            .clone()
            .unwrap_or_else(|| "INV".to_string()),
    }
}

/// Find or create the company a saved document belongs to.
async fn resolve_company_for(
    state: &Arc<AppState>,
    doc: &InvoiceDocument,
) -> Result<u64, LekhaError> {
    if let Some(company) = state
        .store
        .find_company_by_name(&doc.recipient_name)
        .await?
    {
        if !doc.gst_number.is_empty()
            && !company.gst_numbers.iter().any(|g| g == &doc.gst_number)
        {
            let mut numbers = company.gst_numbers.clone();
            numbers.push(doc.gst_number.clone());
            state
                .store
                .update_company(
                    company.id,
                    CompanyPatch {
                        gst_numbers: Some(numbers),
                        ..CompanyPatch::default()
                    },
                )
                .await?;
        }
        return Ok(company.id);
    }

    let prefix = doc
        .ref_number
        .split('/')
        .next()
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string());
    let company = state
        .store
        .create_company(NewCompany {
            name: doc.recipient_name.clone(),
            address_line1: doc.address_line1.clone(),
            address_line2: non_empty(&doc.address_line2),
            address_line3: non_empty(&doc.address_line3),
            gst_numbers: non_empty(&doc.gst_number).into_iter().collect(),
            rented_area: doc.rented_area,
            rent_rate: doc.rent_rate,
            sgst_rate: Some(doc.sgst_rate),
            cgst_rate: Some(doc.cgst_rate),
            ref_number_prefix: prefix,
        })
        .await?;
    tracing::info!(
        id = company.id,
        name = %company.name,
        "company created from new invoice recipient"
    );
    Ok(company.id)
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
