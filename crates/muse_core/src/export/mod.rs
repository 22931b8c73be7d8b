//! Export wrappers.
//!
//! Rendered HTML is rasterized by an external [`Rasterizer`], sliced into
//! pages by [`paginate`] and assembled into a PDF by [`pdf`]. Markdown and
//! HTML output is written to disk by [`download`].

pub mod download;
pub mod html;
pub mod pdf;
pub mod pdf_text;

use serde::{Deserialize, Serialize};

pub use self::download::{save_document, SavedDocument, HTML_MIME, MARKDOWN_MIME, PDF_MIME};
pub use self::html::standalone_html;
pub use self::pdf::{export_pdf, export_pdf_with_callback, export_text_pdf};

/// Points per millimetre.
const PT_PER_MM: f32 = 72.0 / 25.4;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("rasterization failed: {0}")]
    Rasterize(String),
    #[error("rendered content is empty")]
    EmptyRaster,
    #[error("raster of {width}x{height} carries {actual} bytes, expected {expected}")]
    RasterSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("page has no room for content: {0:?}")]
    InvalidGeometry(PageGeometry),
    #[error("invalid file name: {0:?}")]
    InvalidFileName(String),
    #[error(transparent)]
    Pdf(#[from] lopdf::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Page size and margins in millimetres, A4 by default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_mm: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            margin_mm: 10.0,
        }
    }
}

impl PageGeometry {
    pub fn content_width_mm(&self) -> f32 {
        self.width_mm - 2.0 * self.margin_mm
    }

    pub fn content_height_mm(&self) -> f32 {
        self.height_mm - 2.0 * self.margin_mm
    }

    fn validate(&self) -> Result<(), ExportError> {
        if self.content_width_mm() > 0.0 && self.content_height_mm() > 0.0 {
            Ok(())
        } else {
            Err(ExportError::InvalidGeometry(*self))
        }
    }

    fn width_pt(&self) -> f32 {
        self.width_mm * PT_PER_MM
    }

    fn height_pt(&self) -> f32 {
        self.height_mm * PT_PER_MM
    }

    fn margin_pt(&self) -> f32 {
        self.margin_mm * PT_PER_MM
    }
}

/// One page worth of a tall raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlice {
    pub index: usize,
    /// First row of the slice.
    pub offset: u32,
    pub height: u32,
}

/// Splits `total_height` rows into pages of `page_content_height` rows.
///
/// The last page holds the remainder, so the page count is
/// `ceil(total_height / page_content_height)`.
///
/// # Example
///
/// ```
/// use muse_core::export::paginate;
///
/// let pages = paginate(2500, 1000);
/// assert_eq!(pages.len(), 3);
/// assert_eq!(pages[2].offset, 2000);
/// assert_eq!(pages[2].height, 500);
/// ```
pub fn paginate(total_height: u32, page_content_height: u32) -> Vec<PageSlice> {
    if total_height == 0 {
        return Vec::new();
    }

    let per_page = page_content_height.max(1);
    let count = total_height.div_ceil(per_page);

    (0..count)
        .map(|index| {
            let offset = index * per_page;
            PageSlice {
                index: index as usize,
                offset,
                height: per_page.min(total_height - offset),
            }
        })
        .collect()
}

/// An 8-bit RGB image, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RasterImage {
    const CHANNELS: usize = 3;

    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, ExportError> {
        let expected = width as usize * height as usize * Self::CHANNELS;
        if pixels.len() != expected {
            return Err(ExportError::RasterSize {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel rows covered by `slice`.
    pub fn rows(&self, slice: &PageSlice) -> &[u8] {
        let stride = self.width as usize * Self::CHANNELS;
        let start = slice.offset as usize * stride;
        let end = (start + slice.height as usize * stride).min(self.pixels.len());
        &self.pixels[start.min(end)..end]
    }
}

/// Renders HTML into pixels.
///
/// Rasterization is an opaque long-running call; callers await the whole
/// image and never see partial results.
#[async_trait::async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(&self, html: &str) -> Result<RasterImage, ExportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_exact_multiple() {
        let pages = paginate(3000, 1000);
        assert_eq!(pages.len(), 3);
        assert!(pages.iter().all(|page| page.height == 1000));
        assert_eq!(pages[1].offset, 1000);
    }

    #[test]
    fn test_paginate_short_content() {
        assert_eq!(
            paginate(10, 1000),
            vec![PageSlice {
                index: 0,
                offset: 0,
                height: 10
            }]
        );
        assert!(paginate(0, 1000).is_empty());
    }

    #[test]
    fn test_paginate_zero_page_height() {
        assert_eq!(paginate(3, 0).len(), 3);
    }

    #[test]
    fn test_raster_rows() {
        let raster = RasterImage::new(2, 3, (0..18).collect()).unwrap();
        let pages = paginate(raster.height, 2);
        assert_eq!(raster.rows(&pages[0]), &(0..12).collect::<Vec<u8>>()[..]);
        assert_eq!(raster.rows(&pages[1]), &[12, 13, 14, 15, 16, 17]);
    }

    #[test]
    fn test_raster_size_mismatch() {
        assert!(matches!(
            RasterImage::new(2, 2, vec![0; 5]),
            Err(ExportError::RasterSize { expected: 12, .. })
        ));
    }

    #[test]
    fn test_geometry() {
        let geometry = PageGeometry::default();
        assert_eq!(geometry.content_width_mm(), 190.0);
        assert_eq!(geometry.content_height_mm(), 277.0);
        assert!(PageGeometry {
            margin_mm: 200.0,
            ..geometry
        }
        .validate()
        .is_err());
    }
}
