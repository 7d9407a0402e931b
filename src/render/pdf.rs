//! # PDF Emitter
//!
//! Executes the composed sheet against an A4 printpdf page: vector text
//! in the builtin Helvetica faces, stroked lines and rectangles, and the
//! signature either embedded as a raster image or drawn as synthesized
//! strokes. The one awkward spot is the axis flip: sheet coordinates run
//! top-down, PDF coordinates bottom-up.

use std::io::BufWriter;

use image::DynamicImage;
use printpdf::{
    BuiltinFont, Color, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject,
    IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Px, Rgb,
};

use crate::config::IssuerProfile;
use crate::error::LekhaError;
use crate::invoice::InvoiceDocument;
use crate::sheet::{self, Align, FontStyle, SheetOp, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use crate::signature::ResolvedSignature;

/// Sheet y (top-down) to PDF y (bottom-up).
fn flip(y: f32) -> f32 {
    PAGE_HEIGHT_MM - y
}

struct PdfBackend {
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
}

impl PdfBackend {
    fn font(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Oblique => &self.oblique,
        }
    }

    fn draw_text(&self, x: f32, y: f32, size: f32, style: FontStyle, align: Align, text: &str) {
        let width = sheet::text_width_mm(text, size);
        let anchor = match align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };
        self.layer
            .use_text(text, size, Mm(anchor), Mm(flip(y)), self.font(style));
    }

    fn draw_line(&self, x1: f32, y1: f32, x2: f32, y2: f32, thickness: f32) {
        self.layer.set_outline_thickness(thickness);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x1), Mm(flip(y1))), false),
                (Point::new(Mm(x2), Mm(flip(y2))), false),
            ],
            is_closed: false,
        });
    }

    fn draw_rect(&self, x: f32, y: f32, width: f32, height: f32, thickness: f32) {
        self.layer.set_outline_thickness(thickness);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x), Mm(flip(y))), false),
                (Point::new(Mm(x + width), Mm(flip(y))), false),
                (Point::new(Mm(x + width), Mm(flip(y + height))), false),
                (Point::new(Mm(x), Mm(flip(y + height))), false),
            ],
            is_closed: true,
        });
    }

    fn apply(&self, op: &SheetOp) {
        match op {
            SheetOp::Text { x, y, size, style, align, text } => {
                self.draw_text(*x, *y, *size, *style, *align, text);
            }
            SheetOp::Line { x1, y1, x2, y2, thickness } => {
                self.draw_line(*x1, *y1, *x2, *y2, *thickness);
            }
            SheetOp::Rect { x, y, width, height, thickness } => {
                self.draw_rect(*x, *y, *width, *height, *thickness);
            }
            // Handled after the base pass.
            SheetOp::Signature { .. } => {}
        }
    }

    /// Embed the signature raster aspect-fit inside its region. Errors
    /// here degrade to the stroke fallback; they never fail the document.
    fn embed_signature(&self, raster: &DynamicImage, x: f32, y: f32, w: f32, h: f32) -> Result<(), LekhaError> {
        let (width_px, height_px) = (raster.width(), raster.height());
        if width_px == 0 || height_px == 0 {
            return Err(LekhaError::Signature("empty signature raster".to_string()));
        }

        // Composite transparency against white before stripping alpha.
        let rgba = raster.to_rgba8();
        let mut rgb = image::RgbImage::new(width_px, height_px);
        for (px, py, pixel) in rgba.enumerate_pixels() {
            let image::Rgba([r, g, b, a]) = *pixel;
            let alpha = a as f32 / 255.0;
            let blend = |c: u8| (c as f32 * alpha + 255.0 * (1.0 - alpha)) as u8;
            rgb.put_pixel(px, py, image::Rgb([blend(r), blend(g), blend(b)]));
        }

        let aspect = width_px as f32 / height_px as f32;
        let (fit_w, fit_h) = if w / h > aspect {
            (h * aspect, h)
        } else {
            (w, w / aspect)
        };
        let translate_x = x + (w - fit_w) / 2.0;
        let translate_y = flip(y + h) + (h - fit_h) / 2.0;
        let dpi = width_px as f32 / (fit_w / 25.4);

        let image = Image::from(ImageXObject {
            width: Px(width_px as usize),
            height: Px(height_px as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: rgb.into_raw(),
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        });
        image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(translate_x)),
                translate_y: Some(Mm(translate_y)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        Ok(())
    }

    fn draw_signature_strokes(&self, x: f32, y: f32, w: f32, h: f32) {
        self.layer.set_outline_thickness(0.6);
        let points: Vec<(Point, bool)> = sheet::SIGNATURE_STROKES
            .iter()
            .map(|(fx, fy)| (Point::new(Mm(x + fx * w), Mm(flip(y + fy * h))), false))
            .collect();
        self.layer.add_line(Line {
            points,
            is_closed: false,
        });
    }
}

/// Execute pre-composed ops into PDF bytes.
pub fn emit_ops(
    ops: &[SheetOp],
    signature: &ResolvedSignature,
    title: &str,
) -> Result<Vec<u8>, LekhaError> {
    let (doc, page, layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Invoice");
    let layer = doc.get_page(page).get_layer(layer);

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| LekhaError::Render(format!("font load failed: {}", e)))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| LekhaError::Render(format!("font load failed: {}", e)))?;
    let oblique = doc
        .add_builtin_font(BuiltinFont::HelveticaOblique)
        .map_err(|e| LekhaError::Render(format!("font load failed: {}", e)))?;

    layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));

    let backend = PdfBackend {
        layer,
        regular,
        bold,
        oblique,
    };

    for op in ops {
        backend.apply(op);
    }

    for op in ops {
        if let SheetOp::Signature { x, y, width, height } = op {
            let embedded = match &signature.raster {
                Some(raster) => backend.embed_signature(raster, *x, *y, *width, *height),
                None => Err(LekhaError::Signature("no raster available".to_string())),
            };
            if let Err(err) = embedded {
                if signature.raster.is_some() {
                    tracing::warn!(error = %err, "signature embed failed, drawing strokes");
                }
                backend.draw_signature_strokes(*x, *y, *width, *height);
            }
        }
    }

    let mut buffer = BufWriter::new(Vec::new());
    doc.save(&mut buffer)
        .map_err(|e| LekhaError::Render(format!("PDF assembly failed: {}", e)))?;
    buffer
        .into_inner()
        .map_err(|e| LekhaError::Render(format!("PDF buffer flush failed: {}", e)))
}

/// Render a document to PDF bytes.
pub fn emit(
    doc: &InvoiceDocument,
    issuer: &IssuerProfile,
    signature: &ResolvedSignature,
) -> Result<Vec<u8>, LekhaError> {
    let ops = sheet::compose(doc, issuer);
    emit_ops(&ops, signature, &format!("Invoice {}", doc.ref_number))
}
