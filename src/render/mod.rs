//! # Render Backends
//!
//! Three views of one invoice: a self-contained HTML page, a raster
//! preview of the printed sheet, and the PDF that actually gets mailed
//! out. The canvas and PDF backends both execute the op list composed
//! in [`crate::sheet`], which is what keeps them in agreement.

pub mod canvas;
pub mod font;
pub mod html;
pub mod pdf;
