//! # Canvas Preview Renderer
//!
//! Rasterizes the composed sheet onto a fixed A4-proportioned grayscale
//! surface (794x1123 px, roughly 96 dpi) and encodes it as PNG. The base
//! document draws in one synchronous pass; the signature raster
//! composites into its reserved region afterwards, so a slow or missing
//! image never corrupts the rest of the page.

use image::codecs::png::PngEncoder;
use image::{DynamicImage, GrayImage, ImageEncoder};

use crate::config::IssuerProfile;
use crate::error::LekhaError;
use crate::invoice::InvoiceDocument;
use crate::render::font::{self, Face};
use crate::sheet::{self, Align, FontStyle, SheetOp, PAGE_WIDTH_MM, PT_TO_MM};
use crate::signature::ResolvedSignature;

pub const CANVAS_WIDTH: usize = 794;
pub const CANVAS_HEIGHT: usize = 1123;

const PX_PER_MM: f32 = CANVAS_WIDTH as f32 / PAGE_WIDTH_MM;

/// White-initialized luminance buffer with draw primitives.
pub struct Canvas {
    buffer: Vec<u8>,
}

impl Canvas {
    pub fn new() -> Self {
        Self {
            buffer: vec![255u8; CANVAS_WIDTH * CANVAS_HEIGHT],
        }
    }

    fn set_pixel(&mut self, x: i64, y: i64, luma: u8) {
        if x < 0 || y < 0 || x >= CANVAS_WIDTH as i64 || y >= CANVAS_HEIGHT as i64 {
            return;
        }
        let idx = y as usize * CANVAS_WIDTH + x as usize;
        // Ink only darkens; overlapping strokes stay crisp.
        if luma < self.buffer[idx] {
            self.buffer[idx] = luma;
        }
    }

    fn fill_rect(&mut self, x: i64, y: i64, w: i64, h: i64, luma: u8) {
        for yy in y..y + h {
            for xx in x..x + w {
                self.set_pixel(xx, yy, luma);
            }
        }
    }

    /// Bresenham line with square pen.
    fn draw_line(&mut self, x1: i64, y1: i64, x2: i64, y2: i64, pen: i64) {
        let dx = (x2 - x1).abs();
        let dy = -(y2 - y1).abs();
        let sx = if x1 < x2 { 1 } else { -1 };
        let sy = if y1 < y2 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x1, y1);
        loop {
            self.fill_rect(x, y, pen.max(1), pen.max(1), 0);
            if x == x2 && y == y2 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn draw_glyph(&mut self, bitmap: &[u8], width: usize, height: usize, x: i64, y: i64) {
        for gy in 0..height {
            for gx in 0..width {
                if bitmap[gy * width + gx] != 0 {
                    self.set_pixel(x + gx as i64, y + gy as i64, 0);
                }
            }
        }
    }

    /// Monospace advance for a string at the face/scale a text op maps to.
    fn measure_text(face: Face, scale: usize, text: &str) -> i64 {
        (text.chars().count() * face.cell_width() * scale) as i64
    }

    fn draw_text(&mut self, op_x: f32, baseline: f32, size_pt: f32, style: FontStyle, align: Align, text: &str) {
        let target_px = (size_pt * PT_TO_MM * PX_PER_MM * 1.35).round() as usize;
        let (face, scale) = font::face_for_height(target_px.max(8));
        let cell_w = (face.cell_width() * scale) as i64;
        let cell_h = (face.cell_height() * scale) as i64;

        let width = Self::measure_text(face, scale, text);
        let anchor = (op_x * PX_PER_MM).round() as i64;
        let mut x = match align {
            Align::Left => anchor,
            Align::Center => anchor - width / 2,
            Align::Right => anchor - width,
        };
        let top = (baseline * PX_PER_MM).round() as i64 - cell_h * 5 / 6;

        for ch in text.chars() {
            let base = font::glyph(face, ch);
            let bitmap = font::scale_glyph(&base, face.cell_width(), face.cell_height(), scale);
            let (w, h) = (face.cell_width() * scale, face.cell_height() * scale);
            match style {
                FontStyle::Regular => self.draw_glyph(&bitmap, w, h, x, top),
                FontStyle::Bold => {
                    // Double strike one pixel apart.
                    self.draw_glyph(&bitmap, w, h, x, top);
                    self.draw_glyph(&bitmap, w, h, x + 1, top);
                }
                FontStyle::Oblique => {
                    // Shear rows rightward toward the top.
                    for row in 0..h {
                        let shift = ((h - 1 - row) / (h / 3).max(1)) as i64;
                        let slice = &bitmap[row * w..(row + 1) * w];
                        self.draw_glyph(slice, w, 1, x + shift, top + row as i64);
                    }
                }
            }
            x += cell_w;
        }
    }

    /// Alpha-composite a raster into a pixel region, aspect-fit, white
    /// background showing through transparency.
    fn composite_raster(&mut self, raster: &DynamicImage, x: i64, y: i64, w: i64, h: i64) {
        if w <= 0 || h <= 0 || raster.width() == 0 || raster.height() == 0 {
            return;
        }
        let aspect = raster.width() as f32 / raster.height() as f32;
        let box_aspect = w as f32 / h as f32;
        let (fit_w, fit_h) = if box_aspect > aspect {
            (((h as f32) * aspect) as u32, h as u32)
        } else {
            (w as u32, ((w as f32) / aspect) as u32)
        };
        if fit_w == 0 || fit_h == 0 {
            return;
        }
        let resized = raster.resize_exact(fit_w, fit_h, image::imageops::FilterType::Lanczos3);
        let rgba = resized.to_rgba8();
        let off_x = x + (w - fit_w as i64) / 2;
        let off_y = y + (h - fit_h as i64) / 2;
        for (px, py, pixel) in rgba.enumerate_pixels() {
            let image::Rgba([r, g, b, a]) = *pixel;
            let alpha = a as f32 / 255.0;
            let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
            let blended = (luma * alpha + 255.0 * (1.0 - alpha)) as u8;
            if blended < 250 {
                self.set_pixel(off_x + px as i64, off_y + py as i64, blended);
            }
        }
    }

    /// Deterministic scrawl for the no-raster case, spanning the region.
    fn draw_signature_strokes(&mut self, x: i64, y: i64, w: i64, h: i64) {
        for pair in sheet::SIGNATURE_STROKES.windows(2) {
            let (fx1, fy1) = pair[0];
            let (fx2, fy2) = pair[1];
            self.draw_line(
                x + (fx1 * w as f32) as i64,
                y + (fy1 * h as f32) as i64,
                x + (fx2 * w as f32) as i64,
                y + (fy2 * h as f32) as i64,
                2,
            );
        }
    }

    fn apply(&mut self, op: &SheetOp) {
        match op {
            SheetOp::Text { x, y, size, style, align, text } => {
                self.draw_text(*x, *y, *size, *style, *align, text);
            }
            SheetOp::Line { x1, y1, x2, y2, thickness } => {
                let pen = (thickness * PX_PER_MM).round().max(1.0) as i64;
                self.draw_line(
                    (x1 * PX_PER_MM).round() as i64,
                    (y1 * PX_PER_MM).round() as i64,
                    (x2 * PX_PER_MM).round() as i64,
                    (y2 * PX_PER_MM).round() as i64,
                    pen,
                );
            }
            SheetOp::Rect { x, y, width, height, thickness } => {
                let pen = (thickness * PX_PER_MM).round().max(1.0) as i64;
                let (px, py) = ((x * PX_PER_MM) as i64, (y * PX_PER_MM) as i64);
                let (pw, ph) = ((width * PX_PER_MM) as i64, (height * PX_PER_MM) as i64);
                self.fill_rect(px, py, pw, pen, 0);
                self.fill_rect(px, py + ph - pen, pw, pen, 0);
                self.fill_rect(px, py, pen, ph, 0);
                self.fill_rect(px + pw - pen, py, pen, ph, 0);
            }
            // Deferred to the composite pass.
            SheetOp::Signature { .. } => {}
        }
    }

    /// Encode the surface as an 8-bit grayscale PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, LekhaError> {
        let img = GrayImage::from_raw(CANVAS_WIDTH as u32, CANVAS_HEIGHT as u32, self.buffer.clone())
            .ok_or_else(|| LekhaError::Render("canvas buffer size mismatch".to_string()))?;
        let mut png = Vec::new();
        let encoder = PngEncoder::new(&mut png);
        encoder
            .write_image(
                img.as_raw(),
                CANVAS_WIDTH as u32,
                CANVAS_HEIGHT as u32,
                image::ExtendedColorType::L8,
            )
            .map_err(|e| LekhaError::Render(format!("PNG encode failed: {}", e)))?;
        Ok(png)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

/// Rasterize pre-composed ops. Base ops first, signature composite last.
pub fn rasterize(ops: &[SheetOp], signature: &ResolvedSignature) -> Result<Vec<u8>, LekhaError> {
    let mut canvas = Canvas::new();
    for op in ops {
        canvas.apply(op);
    }

    for op in ops {
        if let SheetOp::Signature { x, y, width, height } = op {
            let px = (x * PX_PER_MM).round() as i64;
            let py = (y * PX_PER_MM).round() as i64;
            let pw = (width * PX_PER_MM).round() as i64;
            let ph = (height * PX_PER_MM).round() as i64;
            match &signature.raster {
                Some(raster) => canvas.composite_raster(raster, px, py, pw, ph),
                None => canvas.draw_signature_strokes(px, py, pw, ph),
            }
        }
    }

    canvas.to_png()
}

/// Render a document to a PNG preview.
pub fn render(
    doc: &InvoiceDocument,
    issuer: &IssuerProfile,
    signature: &ResolvedSignature,
) -> Result<Vec<u8>, LekhaError> {
    let ops = sheet::compose(doc, issuer);
    rasterize(&ops, signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::{BillDefaults, DocumentDraft};
    use chrono::NaiveDate;

    fn sample_doc() -> InvoiceDocument {
        let defaults = BillDefaults {
            recipient_name: "Sagar Trading Co.".to_string(),
            gst_number: "27AACCS8294K1Z5".to_string(),
            rented_area: 25000.0,
            rent_rate: 18.0,
            sgst_rate: 9.0,
            cgst_rate: 9.0,
            ref_number_prefix: "SAGT".to_string(),
            ..BillDefaults::default()
        };
        DocumentDraft::default().build(
            &defaults,
            NaiveDate::from_ymd_opt(2025, 7, 21).unwrap(),
            1,
        )
    }

    fn ink_count(canvas: &Canvas) -> usize {
        canvas.buffer.iter().filter(|&&p| p < 128).count()
    }

    #[test]
    fn test_render_produces_png() {
        let png = render(
            &sample_doc(),
            &IssuerProfile::default(),
            &ResolvedSignature::vector_fallback(),
        )
        .unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
        assert!(png.len() > 1000);
    }

    #[test]
    fn test_base_pass_draws_ink() {
        let ops = sheet::compose(&sample_doc(), &IssuerProfile::default());
        let mut canvas = Canvas::new();
        for op in &ops {
            canvas.apply(op);
        }
        assert!(ink_count(&canvas) > 5_000);
    }

    #[test]
    fn test_signature_strokes_add_ink_in_region_only() {
        let mut canvas = Canvas::new();
        canvas.draw_signature_strokes(500, 800, 180, 80);
        let before = ink_count(&canvas);
        assert!(before > 50);
        // Nothing above the region.
        for y in 0..700 {
            for x in 0..CANVAS_WIDTH {
                assert_eq!(canvas.buffer[y * CANVAS_WIDTH + x], 255);
            }
        }
    }

    #[test]
    fn test_raster_composites_inside_region() {
        let mut canvas = Canvas::new();
        let raster = DynamicImage::ImageLuma8(GrayImage::from_pixel(60, 30, image::Luma([0u8])));
        canvas.composite_raster(&raster, 100, 100, 120, 60);
        assert!(ink_count(&canvas) > 1000);
        // Region bounds respected.
        for x in 0..CANVAS_WIDTH {
            assert_eq!(canvas.buffer[99 * CANVAS_WIDTH + x], 255);
            assert_eq!(canvas.buffer[161 * CANVAS_WIDTH + x], 255);
        }
    }

    #[test]
    fn test_text_alignment_anchors() {
        let mut left_canvas = Canvas::new();
        left_canvas.draw_text(100.0, 100.0, 9.5, FontStyle::Regular, Align::Left, "HELLO");
        let mut right_canvas = Canvas::new();
        right_canvas.draw_text(100.0, 100.0, 9.5, FontStyle::Regular, Align::Right, "HELLO");

        let first_ink_x = |canvas: &Canvas| {
            (0..CANVAS_WIDTH)
                .find(|&x| (0..CANVAS_HEIGHT).any(|y| canvas.buffer[y * CANVAS_WIDTH + x] < 128))
                .unwrap()
        };
        let anchor_px = (100.0 * PX_PER_MM) as usize;
        assert!(first_ink_x(&left_canvas) >= anchor_px);
        assert!(first_ink_x(&right_canvas) < anchor_px);
    }

    #[test]
    fn test_out_of_bounds_drawing_is_clipped() {
        let mut canvas = Canvas::new();
        canvas.draw_line(-50, -50, 2000, 2000, 2);
        canvas.fill_rect(-10, -10, 5000, 5, 0);
        // No panic, and the buffer still encodes.
        assert!(canvas.to_png().is_ok());
    }
}
