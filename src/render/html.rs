//! # HTML Renderer
//!
//! Produces a self-contained document: one embedded style block, no
//! external assets, signature carried as a data URI. The wording of
//! every printed field matches the sheet renderers so the three
//! outputs of an invoice never disagree.

use crate::config::IssuerProfile;
use crate::invoice::amounts::format_amount;
use crate::invoice::InvoiceDocument;
use crate::sheet::{self, format_quantity};
use crate::signature::ResolvedSignature;

/// Escape text for element content and attribute values.
fn esc(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render the invoice as a complete HTML page.
pub fn render(
    doc: &InvoiceDocument,
    issuer: &IssuerProfile,
    signature: &ResolvedSignature,
) -> String {
    let rent_detail = format!(
        "{} ({} sq. ft. @ Rs. {} per sq. ft.)",
        doc.rent_description,
        format_quantity(doc.rented_area),
        format_quantity(doc.rent_rate),
    );
    let rows = [
        (1, rent_detail, doc.rent_amount),
        (
            2,
            format!("SGST @ {}%", format_quantity(doc.sgst_rate)),
            doc.sgst_amount,
        ),
        (
            3,
            format!("CGST @ {}%", format_quantity(doc.cgst_rate)),
            doc.cgst_amount,
        ),
    ];

    let mut body_rows = String::new();
    for (serial, particulars, amount) in &rows {
        body_rows.push_str(&format!(
            "            <tr><td class=\"serial\">{}</td><td>{}</td><td class=\"amount\">{}</td></tr>\n",
            serial,
            esc(particulars),
            format_amount(*amount),
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Invoice {ref_number}</title>
<style>
    body {{ font-family: Helvetica, Arial, sans-serif; color: #1a1a1a; margin: 0; background: #e8e8e8; }}
    .page {{ max-width: 800px; margin: 24px auto; padding: 36px 44px; background: #fff; border: 2px solid #1a1a1a; outline: 1px solid #1a1a1a; outline-offset: -8px; }}
    .letterhead {{ text-align: center; border-bottom: 1px solid #1a1a1a; padding-bottom: 10px; }}
    .letterhead h1 {{ font-size: 26px; margin: 0 0 6px; }}
    .letterhead p {{ margin: 2px 0; font-size: 13px; }}
    .letterhead .gstin {{ font-weight: bold; }}
    .doc-title {{ text-align: center; font-size: 17px; font-weight: bold; letter-spacing: 1px; margin: 10px 0; padding-bottom: 8px; border-bottom: 1px solid #1a1a1a; }}
    .ref-row {{ display: flex; justify-content: space-between; font-size: 13px; padding: 8px 0; border-bottom: 1px solid #1a1a1a; }}
    .parties {{ display: flex; border-bottom: 1px solid #1a1a1a; }}
    .parties > div {{ flex: 1; padding: 10px 0; font-size: 13px; }}
    .parties > div + div {{ border-left: 1px solid #1a1a1a; padding-left: 16px; }}
    .parties p {{ margin: 2px 0; }}
    .parties .party-name {{ font-weight: bold; font-size: 14px; }}
    .parties .gstin {{ font-weight: bold; }}
    table {{ width: 100%; border-collapse: collapse; margin: 18px 0 10px; font-size: 13px; }}
    th, td {{ border: 1px solid #1a1a1a; padding: 8px 10px; text-align: left; }}
    th {{ font-weight: bold; }}
    td.serial, th.serial {{ width: 44px; text-align: center; }}
    td.amount, th.amount {{ width: 150px; text-align: right; }}
    tr.total td {{ font-weight: bold; font-size: 14px; }}
    .words {{ font-weight: bold; font-size: 13px; margin: 10px 0 18px; }}
    .bank {{ font-size: 12px; margin-bottom: 14px; }}
    .bank h3 {{ font-size: 13px; margin: 0 0 4px; }}
    .bank p {{ margin: 2px 0; }}
    .closing {{ display: flex; justify-content: space-between; align-items: flex-start; margin-top: 8px; }}
    .declaration {{ width: 58%; font-size: 11px; }}
    .declaration h3 {{ font-size: 12px; margin: 0 0 4px; }}
    .signature {{ width: 220px; text-align: center; font-size: 12px; }}
    .signature .for-line {{ font-weight: bold; font-size: 13px; }}
    .signature img {{ max-width: 180px; max-height: 80px; margin: 6px 0; }}
    .signature .rule {{ border-top: 1px solid #1a1a1a; margin: 2px 12px 4px; }}
    .footer {{ text-align: center; font-style: italic; font-size: 11px; margin-top: 28px; }}
    @media print {{
        body {{ background: #fff; }}
        .page {{ margin: 0; border: 2px solid #000; max-width: none; }}
    }}
</style>
</head>
<body>
<div class="page">
    <div class="letterhead">
        <h1>{issuer_name}</h1>
        <p>{issuer_addr1}</p>
        <p>{issuer_addr2}</p>
        <p>{issuer_addr3}</p>
        <p class="gstin">GSTIN: {issuer_gst}</p>
    </div>

    <div class="doc-title">TAX INVOICE</div>

    <div class="ref-row">
        <span>Ref No: {ref_number}</span>
        <span>Date: {date}</span>
    </div>

    <div class="parties">
        <div>
            <p>To,</p>
            <p class="party-name">{recipient}</p>
            <p>{addr1}</p>
            <p>{addr2}</p>
            <p>{addr3}</p>
            <p class="gstin">GSTIN: {recipient_gst}</p>
        </div>
        <div>
            <p>From,</p>
            <p class="party-name">{issuer_name}</p>
            <p>GSTIN: {issuer_gst}</p>
            <p>PAN: {issuer_pan}</p>
        </div>
    </div>

    <table>
        <thead>
            <tr><th class="serial">Sr.</th><th>Particulars</th><th class="amount">Amount (Rs.)</th></tr>
        </thead>
        <tbody>
{body_rows}            <tr class="total"><td></td><td style="text-align: right;">Grand Total</td><td class="amount">{grand_total}</td></tr>
        </tbody>
    </table>

    <p class="words">Amount in Words: Rupees {words}</p>

    <div class="bank">
        <h3>Payment Details</h3>
        <p>Bank: {bank_name}</p>
        <p>A/c No: {bank_account}</p>
        <p>IFSC: {bank_ifsc}</p>
        <p>PAN: {issuer_pan}</p>
    </div>

    <div class="closing">
        <div class="declaration">
            <h3>Declaration</h3>
            <p>{declaration}</p>
        </div>
        <div class="signature">
            <p class="for-line">For {issuer_name}</p>
            <img src="{signature_uri}" alt="signature">
            <div class="rule"></div>
            <p>{signatory}</p>
        </div>
    </div>

    <p class="footer">This is a computer generated invoice.</p>
</div>
</body>
</html>
"#,
        ref_number = esc(&doc.ref_number),
        date = esc(&doc.date_display()),
        issuer_name = esc(&issuer.name),
        issuer_addr1 = esc(&issuer.address_line1),
        issuer_addr2 = esc(&issuer.address_line2),
        issuer_addr3 = esc(&issuer.address_line3),
        issuer_gst = esc(&issuer.gst_number),
        issuer_pan = esc(&issuer.pan_number),
        recipient = esc(&doc.recipient_name),
        addr1 = esc(&doc.address_line1),
        addr2 = esc(&doc.address_line2),
        addr3 = esc(&doc.address_line3),
        recipient_gst = esc(&doc.gst_number),
        body_rows = body_rows,
        grand_total = format_amount(doc.grand_total),
        words = esc(&doc.grand_total_words),
        bank_name = esc(&issuer.bank_name),
        bank_account = esc(&issuer.bank_account),
        bank_ifsc = esc(&issuer.bank_ifsc),
        declaration = esc(sheet::DECLARATION),
        signature_uri = signature.data_uri,
        signatory = esc(&issuer.signatory),
    )
}
