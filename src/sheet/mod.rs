//! # Sheet Composer
//!
//! Lays out an invoice on an A4 sheet as a flat list of draw operations
//! in millimetre coordinates measured from the top-left corner. The PDF
//! emitter and the canvas preview both execute this one op list, so the
//! two backends place identical strings in identical order; only the
//! HTML renderer lays itself out separately.
//!
//! Column widths and row heights come out of [`Layout`], computed once
//! from the page content width. Text ops carry their anchor alignment;
//! each backend resolves Center/Right against its own glyph metrics.

use crate::config::IssuerProfile;
use crate::invoice::amounts::format_amount;
use crate::invoice::InvoiceDocument;

/// A4 page size.
pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

/// Points to millimetres (1 pt = 1/72 inch).
pub const PT_TO_MM: f32 = 0.352_778;

/// Horizontal anchoring for a text op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Typeface role. Backends map these onto Helvetica variants or bitmap
/// faces as appropriate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Oblique,
}

/// One drawing operation on the sheet. All coordinates are millimetres
/// from the top-left corner; text `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetOp {
    Text {
        x: f32,
        y: f32,
        size: f32,
        style: FontStyle,
        align: Align,
        text: String,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        thickness: f32,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        thickness: f32,
    },
    /// Region the resolved signature composites into after the base
    /// pass. Backends without a raster draw synthesized strokes here.
    Signature {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

/// Approximate advance width of a character in em units, tuned for
/// Helvetica. Used for word wrapping and PDF-side alignment; the canvas
/// measures its own bitmap glyphs instead.
fn char_width_em(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | 'I' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.28,
        'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '-' | '/' => 0.35,
        'm' | 'w' | 'M' | 'W' | '@' => 0.89,
        ' ' => 0.28,
        c if c.is_ascii_uppercase() => 0.69,
        c if c.is_ascii_digit() => 0.56,
        _ => 0.52,
    }
}

/// Approximate rendered width of `text` at `size_pt`.
pub fn text_width_mm(text: &str, size_pt: f32) -> f32 {
    let em: f32 = text.chars().map(char_width_em).sum();
    em * size_pt * PT_TO_MM
}

/// Greedy word wrap against the approximate width metric. A single word
/// wider than the limit gets a line of its own rather than being split.
pub fn wrap_text(text: &str, size_pt: f32, max_width_mm: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if text_width_mm(&candidate, size_pt) <= max_width_mm || current.is_empty() {
            current = candidate;
        } else {
            lines.push(current);
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Page geometry, computed once from the content width so every section
/// aligns to the same columns regardless of content length.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    /// Outer decorative border.
    pub outer_x: f32,
    pub outer_y: f32,
    pub outer_w: f32,
    pub outer_h: f32,
    /// Inner content border.
    pub inner_x: f32,
    pub inner_y: f32,
    pub inner_w: f32,
    pub inner_h: f32,
    /// Text content bounds.
    pub content_x: f32,
    pub content_w: f32,
    /// Line-item table columns: serial, particulars, amount.
    pub table_x: f32,
    pub col_serial_w: f32,
    pub col_particulars_w: f32,
    pub col_amount_w: f32,
    pub table_header_h: f32,
    pub table_row_h: f32,
    pub table_total_h: f32,
}

impl Layout {
    pub fn a4() -> Self {
        let outer_inset = 6.0;
        let inner_inset = 9.0;
        let content_pad = 5.0;

        let inner_x = inner_inset;
        let inner_w = PAGE_WIDTH_MM - 2.0 * inner_inset;
        let content_x = inner_x + content_pad;
        let content_w = inner_w - 2.0 * content_pad;

        let col_serial_w = 14.0;
        let col_amount_w = 48.0;

        Self {
            outer_x: outer_inset,
            outer_y: outer_inset,
            outer_w: PAGE_WIDTH_MM - 2.0 * outer_inset,
            outer_h: PAGE_HEIGHT_MM - 2.0 * outer_inset,
            inner_x,
            inner_y: inner_inset,
            inner_w,
            inner_h: PAGE_HEIGHT_MM - 2.0 * inner_inset,
            content_x,
            content_w,
            table_x: content_x,
            col_serial_w,
            col_particulars_w: content_w - col_serial_w - col_amount_w,
            col_amount_w,
            table_header_h: 8.0,
            table_row_h: 11.0,
            table_total_h: 9.0,
        }
    }

    pub fn content_right(&self) -> f32 {
        self.content_x + self.content_w
    }

    pub fn page_center(&self) -> f32 {
        PAGE_WIDTH_MM / 2.0
    }
}

/// Display form of a rate or area: whole numbers drop the fraction.
pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format_amount(value as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// Fixed statutory declaration printed on every invoice.
pub const DECLARATION: &str = "We declare that this invoice shows the actual price of the \
services described and that all particulars are true and correct. \
Rent received is subject to TDS as applicable.";

/// Waypoints of the synthesized signature scrawl, as fractions of the
/// signature region. Both raster backends draw the same polyline when no
/// signature image is available.
pub const SIGNATURE_STROKES: [(f32, f32); 8] = [
    (0.05, 0.65),
    (0.20, 0.20),
    (0.30, 0.75),
    (0.45, 0.30),
    (0.55, 0.70),
    (0.70, 0.25),
    (0.85, 0.55),
    (0.95, 0.40),
];

struct Composer {
    ops: Vec<SheetOp>,
}

impl Composer {
    fn text(&mut self, x: f32, y: f32, size: f32, style: FontStyle, align: Align, text: &str) {
        self.ops.push(SheetOp::Text {
            x,
            y,
            size,
            style,
            align,
            text: text.to_string(),
        });
    }

    fn hline(&mut self, x1: f32, x2: f32, y: f32, thickness: f32) {
        self.ops.push(SheetOp::Line {
            x1,
            y1: y,
            x2,
            y2: y,
            thickness,
        });
    }

    fn vline(&mut self, x: f32, y1: f32, y2: f32, thickness: f32) {
        self.ops.push(SheetOp::Line {
            x1: x,
            y1,
            x2: x,
            y2,
            thickness,
        });
    }

    /// Wrap and emit a paragraph; returns the baseline below the last line.
    fn paragraph(
        &mut self,
        text: &str,
        x: f32,
        mut y: f32,
        size: f32,
        style: FontStyle,
        max_width: f32,
        line_h: f32,
    ) -> f32 {
        for line in wrap_text(text, size, max_width) {
            self.text(x, y, size, style, Align::Left, &line);
            y += line_h;
        }
        y
    }
}

/// Compose the complete invoice sheet.
pub fn compose(doc: &InvoiceDocument, issuer: &IssuerProfile) -> Vec<SheetOp> {
    let layout = Layout::a4();
    let mut c = Composer { ops: Vec::new() };
    let center = layout.page_center();
    let left = layout.content_x;
    let right = layout.content_right();

    // Page borders
    c.ops.push(SheetOp::Rect {
        x: layout.outer_x,
        y: layout.outer_y,
        width: layout.outer_w,
        height: layout.outer_h,
        thickness: 0.8,
    });
    c.ops.push(SheetOp::Rect {
        x: layout.inner_x,
        y: layout.inner_y,
        width: layout.inner_w,
        height: layout.inner_h,
        thickness: 0.3,
    });

    // Letterhead
    c.text(center, 22.0, 16.0, FontStyle::Bold, Align::Center, &issuer.name);
    c.text(center, 29.0, 9.0, FontStyle::Regular, Align::Center, &issuer.address_line1);
    c.text(center, 33.5, 9.0, FontStyle::Regular, Align::Center, &issuer.address_line2);
    c.text(center, 38.0, 9.0, FontStyle::Regular, Align::Center, &issuer.address_line3);
    c.text(
        center,
        43.5,
        9.0,
        FontStyle::Bold,
        Align::Center,
        &format!("GSTIN: {}", issuer.gst_number),
    );
    c.hline(layout.inner_x, layout.inner_x + layout.inner_w, 47.0, 0.3);

    c.text(center, 54.0, 12.0, FontStyle::Bold, Align::Center, "TAX INVOICE");
    c.hline(layout.inner_x, layout.inner_x + layout.inner_w, 57.5, 0.3);

    // Reference and date row
    c.text(
        left,
        63.5,
        9.5,
        FontStyle::Regular,
        Align::Left,
        &format!("Ref No: {}", doc.ref_number),
    );
    c.text(
        right,
        63.5,
        9.5,
        FontStyle::Regular,
        Align::Right,
        &format!("Date: {}", doc.date_display()),
    );
    c.hline(layout.inner_x, layout.inner_x + layout.inner_w, 67.0, 0.3);

    // Two-column party block: recipient left, issuer right
    let col_split = 110.0;
    c.text(left, 74.0, 9.5, FontStyle::Regular, Align::Left, "To,");
    c.text(left, 80.0, 10.5, FontStyle::Bold, Align::Left, &doc.recipient_name);
    c.text(left, 85.5, 9.5, FontStyle::Regular, Align::Left, &doc.address_line1);
    c.text(left, 90.5, 9.5, FontStyle::Regular, Align::Left, &doc.address_line2);
    c.text(left, 95.5, 9.5, FontStyle::Regular, Align::Left, &doc.address_line3);
    c.text(
        left,
        101.5,
        9.5,
        FontStyle::Bold,
        Align::Left,
        &format!("GSTIN: {}", doc.gst_number),
    );

    c.text(col_split + 5.0, 74.0, 9.5, FontStyle::Regular, Align::Left, "From,");
    c.text(col_split + 5.0, 80.0, 10.5, FontStyle::Bold, Align::Left, &issuer.name);
    c.text(
        col_split + 5.0,
        85.5,
        9.5,
        FontStyle::Regular,
        Align::Left,
        &format!("GSTIN: {}", issuer.gst_number),
    );
    c.text(
        col_split + 5.0,
        90.5,
        9.5,
        FontStyle::Regular,
        Align::Left,
        &format!("PAN: {}", issuer.pan_number),
    );
    c.vline(col_split, 70.0, 105.0, 0.3);
    c.hline(layout.inner_x, layout.inner_x + layout.inner_w, 105.0, 0.3);

    // Line-item table
    let table_top = 110.0;
    let x_serial = layout.table_x;
    let x_particulars = x_serial + layout.col_serial_w;
    let x_amount_col = x_particulars + layout.col_particulars_w;
    let x_table_right = x_amount_col + layout.col_amount_w;
    let x_amount_text = x_table_right - 3.0;
    let serial_center = x_serial + layout.col_serial_w / 2.0;

    let header_bottom = table_top + layout.table_header_h;
    let rows_bottom = header_bottom + 3.0 * layout.table_row_h;
    let table_bottom = rows_bottom + layout.table_total_h;

    c.hline(x_serial, x_table_right, table_top, 0.4);
    c.text(serial_center, table_top + 5.5, 9.5, FontStyle::Bold, Align::Center, "Sr.");
    c.text(
        x_particulars + 3.0,
        table_top + 5.5,
        9.5,
        FontStyle::Bold,
        Align::Left,
        "Particulars",
    );
    c.text(
        x_amount_text,
        table_top + 5.5,
        9.5,
        FontStyle::Bold,
        Align::Right,
        "Amount (Rs.)",
    );
    c.hline(x_serial, x_table_right, header_bottom, 0.4);

    let rent_detail = format!(
        "{} ({} sq. ft. @ Rs. {} per sq. ft.)",
        doc.rent_description,
        format_quantity(doc.rented_area),
        format_quantity(doc.rent_rate),
    );
    let rows: [(String, i64); 3] = [
        (rent_detail, doc.rent_amount),
        (
            format!("SGST @ {}%", format_quantity(doc.sgst_rate)),
            doc.sgst_amount,
        ),
        (
            format!("CGST @ {}%", format_quantity(doc.cgst_rate)),
            doc.cgst_amount,
        ),
    ];

    for (i, (particulars, amount)) in rows.iter().enumerate() {
        let row_top = header_bottom + i as f32 * layout.table_row_h;
        let first_baseline = row_top + 5.0;
        c.text(
            serial_center,
            first_baseline,
            9.5,
            FontStyle::Regular,
            Align::Center,
            &format!("{}", i + 1),
        );
        let wrapped = wrap_text(particulars, 9.5, layout.col_particulars_w - 6.0);
        for (j, line) in wrapped.iter().take(2).enumerate() {
            c.text(
                x_particulars + 3.0,
                first_baseline + j as f32 * 4.6,
                9.5,
                FontStyle::Regular,
                Align::Left,
                line,
            );
        }
        c.text(
            x_amount_text,
            first_baseline,
            9.5,
            FontStyle::Regular,
            Align::Right,
            &format_amount(*amount),
        );
        if i > 0 {
            c.hline(x_serial, x_table_right, row_top, 0.2);
        }
    }

    c.hline(x_serial, x_table_right, rows_bottom, 0.4);
    c.text(
        x_amount_col - 3.0,
        rows_bottom + 6.0,
        10.5,
        FontStyle::Bold,
        Align::Right,
        "Grand Total",
    );
    c.text(
        x_amount_text,
        rows_bottom + 6.0,
        10.5,
        FontStyle::Bold,
        Align::Right,
        &format_amount(doc.grand_total),
    );
    c.hline(x_serial, x_table_right, table_bottom, 0.4);

    for x in [x_serial, x_particulars, x_amount_col, x_table_right] {
        c.vline(x, table_top, table_bottom, 0.4);
    }

    // Amount in words
    let words_y = table_bottom + 7.5;
    let after_words = c.paragraph(
        &format!("Amount in Words: Rupees {}", doc.grand_total_words),
        left,
        words_y,
        9.5,
        FontStyle::Bold,
        layout.content_w,
        4.8,
    );

    // Bank block
    let bank_y = after_words.max(table_bottom + 17.0) + 6.0;
    c.text(left, bank_y, 10.0, FontStyle::Bold, Align::Left, "Payment Details");
    c.text(
        left,
        bank_y + 5.5,
        9.0,
        FontStyle::Regular,
        Align::Left,
        &format!("Bank: {}", issuer.bank_name),
    );
    c.text(
        left,
        bank_y + 10.5,
        9.0,
        FontStyle::Regular,
        Align::Left,
        &format!("A/c No: {}", issuer.bank_account),
    );
    c.text(
        left,
        bank_y + 15.5,
        9.0,
        FontStyle::Regular,
        Align::Left,
        &format!("IFSC: {}", issuer.bank_ifsc),
    );
    c.text(
        left,
        bank_y + 20.5,
        9.0,
        FontStyle::Regular,
        Align::Left,
        &format!("PAN: {}", issuer.pan_number),
    );

    // Declaration
    let decl_y = bank_y + 29.0;
    c.text(left, decl_y, 9.5, FontStyle::Bold, Align::Left, "Declaration");
    c.paragraph(
        DECLARATION,
        left,
        decl_y + 5.0,
        8.5,
        FontStyle::Regular,
        layout.content_w * 0.62,
        4.2,
    );

    // Signature block, lower right. The signing line lands before the
    // image region so a late-loading raster overlays cleanly.
    let sig_right = right - 4.0;
    let sig_left = sig_right - 54.0;
    let sig_center = (sig_left + sig_right) / 2.0;
    c.text(
        sig_center,
        decl_y,
        10.0,
        FontStyle::Bold,
        Align::Center,
        &format!("For {}", issuer.name),
    );
    c.hline(sig_left, sig_right, decl_y + 27.0, 0.3);
    c.ops.push(SheetOp::Signature {
        x: sig_left + 2.0,
        y: decl_y + 4.0,
        width: 50.0,
        height: 21.0,
    });
    c.text(
        sig_center,
        decl_y + 32.0,
        9.0,
        FontStyle::Regular,
        Align::Center,
        &issuer.signatory,
    );

    // Footer
    c.text(
        center,
        layout.inner_y + layout.inner_h - 4.0,
        7.5,
        FontStyle::Oblique,
        Align::Center,
        "This is a computer generated invoice.",
    );

    c.ops
}

/// Every string the sheet will draw, in draw order. Used by the
/// consistency tests and by the canvas renderer's alt text.
pub fn text_content(ops: &[SheetOp]) -> Vec<&str> {
    ops.iter()
        .filter_map(|op| match op {
            SheetOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::{BillDefaults, DocumentDraft};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn sample_doc() -> InvoiceDocument {
        let defaults = BillDefaults {
            recipient_name: "Sagar Trading Co.".to_string(),
            address_line1: "Gala No. 7, Laxmi Compound".to_string(),
            address_line2: "Vasai East".to_string(),
            address_line3: "Palghar - 401208".to_string(),
            gst_number: "27AACCS8294K1Z5".to_string(),
            rented_area: 25000.0,
            rent_rate: 18.0,
            sgst_rate: 9.0,
            cgst_rate: 9.0,
            ref_number_prefix: "SAGT".to_string(),
        };
        DocumentDraft::default().build(
            &defaults,
            NaiveDate::from_ymd_opt(2025, 7, 21).unwrap(),
            1,
        )
    }

    fn sample_ops() -> Vec<SheetOp> {
        compose(&sample_doc(), &IssuerProfile::default())
    }

    #[test]
    fn test_core_fields_present_in_text() {
        let ops = sample_ops();
        let texts = text_content(&ops);
        assert!(texts.contains(&"Sagar Trading Co."));
        assert!(texts.contains(&"GSTIN: 27AACCS8294K1Z5"));
        assert!(texts.contains(&"Ref No: SAGT/25-26/001"));
        assert!(texts.contains(&"Date: 21st July 2025"));
        assert!(texts.contains(&"5,31,000"));
        assert!(texts.contains(&"TAX INVOICE"));
    }

    #[test]
    fn test_line_item_order() {
        let ops = sample_ops();
        let texts = text_content(&ops);
        let pos = |needle: &str| {
            texts
                .iter()
                .position(|t| t.contains(needle))
                .unwrap_or_else(|| panic!("missing {:?}", needle))
        };
        let rent = pos("Rent for the month of July '25");
        let sgst = pos("SGST @ 9%");
        let cgst = pos("CGST @ 9%");
        let total = pos("Grand Total");
        assert!(rent < sgst && sgst < cgst && cgst < total);
    }

    #[test]
    fn test_amounts_rendered_with_grouping() {
        let ops = sample_ops();
        let texts = text_content(&ops);
        assert!(texts.contains(&"4,50,000"));
        assert!(texts.contains(&"40,500"));
        assert!(
            texts
                .iter()
                .any(|t| t.contains("Rupees Five Lakh Thirty One Thousand Only"))
        );
    }

    #[test]
    fn test_signature_line_precedes_image_region() {
        let ops = sample_ops();
        let sig_index = ops
            .iter()
            .position(|op| matches!(op, SheetOp::Signature { .. }))
            .expect("signature region emitted");
        let line_before = ops[..sig_index].iter().rev().any(|op| {
            matches!(op, SheetOp::Line { y1, y2, .. } if y1 == y2 && *y1 > 230.0)
        });
        assert!(line_before, "signing line must be drawn before the image region");
    }

    #[test]
    fn test_two_border_rects() {
        let ops = sample_ops();
        let rects: Vec<_> = ops
            .iter()
            .filter(|op| matches!(op, SheetOp::Rect { .. }))
            .collect();
        assert_eq!(rects.len(), 2);
    }

    #[test]
    fn test_all_ops_within_page() {
        for op in sample_ops() {
            match op {
                SheetOp::Text { x, y, .. } => {
                    assert!((0.0..=PAGE_WIDTH_MM).contains(&x), "text x {}", x);
                    assert!((0.0..=PAGE_HEIGHT_MM).contains(&y), "text y {}", y);
                }
                SheetOp::Line { x1, y1, x2, y2, .. } => {
                    for v in [x1, x2] {
                        assert!((0.0..=PAGE_WIDTH_MM).contains(&v));
                    }
                    for v in [y1, y2] {
                        assert!((0.0..=PAGE_HEIGHT_MM).contains(&v));
                    }
                }
                SheetOp::Rect { x, y, width, height, .. } => {
                    assert!(x + width <= PAGE_WIDTH_MM);
                    assert!(y + height <= PAGE_HEIGHT_MM);
                }
                SheetOp::Signature { x, y, width, height } => {
                    assert!(x + width <= PAGE_WIDTH_MM);
                    assert!(y + height <= PAGE_HEIGHT_MM);
                }
            }
        }
    }

    #[test]
    fn test_wrap_text_respects_width() {
        let lines = wrap_text(DECLARATION, 8.5, 60.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width_mm(line, 8.5) <= 60.0, "line too wide: {}", line);
        }
        // Round-trip: no words lost or reordered.
        let rejoined = lines.join(" ");
        assert_eq!(rejoined, DECLARATION);
    }

    #[test]
    fn test_wrap_text_single_long_word() {
        let lines = wrap_text("Antidisestablishmentarianism", 12.0, 10.0);
        assert_eq!(lines, vec!["Antidisestablishmentarianism".to_string()]);
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(25000.0), "25,000");
        assert_eq!(format_quantity(18.0), "18");
        assert_eq!(format_quantity(18.5), "18.50");
    }

    #[test]
    fn test_layout_columns_fill_content_width() {
        let layout = Layout::a4();
        let total = layout.col_serial_w + layout.col_particulars_w + layout.col_amount_w;
        assert!((total - layout.content_w).abs() < 0.001);
    }
}
