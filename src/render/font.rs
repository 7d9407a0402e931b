//! Bitmap glyph generation for the canvas preview.
//!
//! Uses the Spleen bitmap font family. The sheet's point sizes map onto
//! the three compiled-in faces, nearest-neighbour scaled when a size
//! falls between them.

use spleen_font::{PSF2Font, FONT_12X24, FONT_6X12, FONT_8X16};

/// Compiled-in Spleen faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Small,
    Body,
    Large,
}

impl Face {
    pub fn cell_width(self) -> usize {
        match self {
            Face::Small => 6,
            Face::Body => 8,
            Face::Large => 12,
        }
    }

    pub fn cell_height(self) -> usize {
        match self {
            Face::Small => 12,
            Face::Body => 16,
            Face::Large => 24,
        }
    }

    fn data(self) -> &'static [u8] {
        match self {
            Face::Small => FONT_6X12,
            Face::Body => FONT_8X16,
            Face::Large => FONT_12X24,
        }
    }
}

/// Pick the face and integer scale whose cell height best fills a
/// target pixel height without overshooting it by more than a pixel.
pub fn face_for_height(target_px: usize) -> (Face, usize) {
    if target_px <= 13 {
        (Face::Small, 1)
    } else if target_px <= 17 {
        (Face::Body, 1)
    } else if target_px <= 25 {
        (Face::Large, 1)
    } else {
        (Face::Large, target_px.div_ceil(24).max(2))
    }
}

/// Rasterize one character. Returns a `cell_width x cell_height` bitmap
/// (before scaling) where each byte is 0 (blank) or 1 (ink).
pub fn glyph(face: Face, ch: char) -> Vec<u8> {
    let width = face.cell_width();
    let height = face.cell_height();
    let mut bitmap = vec![0u8; width * height];

    let mut font = match PSF2Font::new(face.data()) {
        Ok(font) => font,
        Err(_) => {
            draw_box(&mut bitmap, width, height);
            return bitmap;
        }
    };

    let utf8 = ch.to_string();
    if let Some(rows) = font.glyph_for_utf8(utf8.as_bytes()) {
        for (y, row) in rows.enumerate() {
            for (x, on) in row.enumerate() {
                if on && x < width && y < height {
                    bitmap[y * width + x] = 1;
                }
            }
        }
    } else {
        draw_box(&mut bitmap, width, height);
    }
    bitmap
}

/// Scale a glyph bitmap by an integer factor, nearest neighbour.
pub fn scale_glyph(src: &[u8], width: usize, height: usize, scale: usize) -> Vec<u8> {
    if scale <= 1 {
        return src.to_vec();
    }
    let dst_w = width * scale;
    let dst_h = height * scale;
    let mut dst = vec![0u8; dst_w * dst_h];
    for dy in 0..dst_h {
        for dx in 0..dst_w {
            dst[dy * dst_w + dx] = src[(dy / scale) * width + (dx / scale)];
        }
    }
    dst
}

/// Box outline for characters the face cannot draw.
fn draw_box(bitmap: &mut [u8], width: usize, height: usize) {
    for x in 0..width {
        bitmap[x] = 1;
        bitmap[(height - 1) * width + x] = 1;
    }
    for y in 0..height {
        bitmap[y * width] = 1;
        bitmap[y * width + width - 1] = 1;
    }
}
