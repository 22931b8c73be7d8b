//! PDF assembly with `lopdf`.
//!
//! Two paths produce a document:
//! - [`export_pdf`] places slices of a rasterized rendering on A4 pages, one
//!   image per page.
//! - [`export_text_pdf`] lays out Markdown as text with the standard
//!   Helvetica and Courier fonts, no rasterizer required.

use super::pdf_text::{markdown_to_pdf_lines, wrap_text, LineStyle};
use super::{paginate, ExportError, PageGeometry, Rasterizer, RasterImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

/// Average glyph width of Helvetica relative to the font size.
const PROPORTIONAL_WIDTH: f32 = 0.5;
/// Glyph width of Courier relative to the font size.
const MONOSPACE_WIDTH: f32 = 0.6;

/// Rasterizes `html` and paginates the image into a PDF.
///
/// The raster is scaled to the content width of the page, so the rows that fit
/// on one page follow from the page's aspect ratio.
pub async fn export_pdf<R>(
    html: &str,
    rasterizer: &R,
    geometry: &PageGeometry,
) -> Result<Vec<u8>, ExportError>
where
    R: Rasterizer + ?Sized,
{
    geometry.validate()?;

    let raster = rasterizer.rasterize(html).await?;
    if raster.is_empty() {
        return Err(ExportError::EmptyRaster);
    }

    let bytes = raster_to_pdf(&raster, geometry)?;

    tracing::debug!(
        width = raster.width,
        height = raster.height,
        bytes = bytes.len(),
        "Exported raster PDF"
    );

    Ok(bytes)
}

/// Like [`export_pdf`], handing any failure to `on_error` instead.
///
/// Failures are not retried.
pub async fn export_pdf_with_callback<R>(
    html: &str,
    rasterizer: &R,
    geometry: &PageGeometry,
    on_error: impl FnOnce(ExportError),
) -> Option<Vec<u8>>
where
    R: Rasterizer + ?Sized,
{
    match export_pdf(html, rasterizer, geometry).await {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            tracing::error!(?err, "PDF export failed");
            on_error(err);
            None
        }
    }
}

/// Lays out Markdown as a text PDF.
pub fn export_text_pdf(markdown: &str, geometry: &PageGeometry) -> Result<Vec<u8>, ExportError> {
    geometry.validate()?;

    let content_width_pt = geometry.width_pt() - 2.0 * geometry.margin_pt();
    let content_height_pt = geometry.height_pt() - 2.0 * geometry.margin_pt();

    let mut placed: Vec<(LineStyle, String)> = Vec::new();
    for line in markdown_to_pdf_lines(markdown) {
        let width_ratio = if line.style.is_monospace() {
            MONOSPACE_WIDTH
        } else {
            PROPORTIONAL_WIDTH
        };
        let glyph_width = width_ratio * line.style.font_size();
        let max_chars = (content_width_pt / glyph_width).floor() as usize;
        for text in wrap_text(&line.text, max_chars) {
            placed.push((line.style, text));
        }
    }

    // Fill pages top to bottom, starting a new one when the next line overflows.
    let mut pages: Vec<Vec<(LineStyle, String)>> = vec![Vec::new()];
    let mut used = 0.0;
    for (style, text) in placed {
        let height = style.line_height();
        if used + height > content_height_pt && pages.last().is_some_and(|page| !page.is_empty()) {
            pages.push(Vec::new());
            used = 0.0;
        }
        if style == LineStyle::Blank && used == 0.0 {
            continue;
        }
        used += height;
        if let Some(page) = pages.last_mut() {
            page.push((style, text));
        }
    }

    let mut builder = PdfBuilder::new(geometry);
    let regular = builder.font("Helvetica");
    let bold = builder.font("Helvetica-Bold");
    let mono = builder.font("Courier");
    let fonts = dictionary! {
        "F1" => regular,
        "F2" => bold,
        "F3" => mono,
    };

    for lines in &pages {
        let mut operations = Vec::new();
        let mut y = geometry.height_pt() - geometry.margin_pt();

        for (style, text) in lines {
            y -= style.line_height();
            if text.is_empty() {
                continue;
            }
            let font = if style.is_monospace() {
                "F3"
            } else if style.is_bold() {
                "F2"
            } else {
                "F1"
            };
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![font.into(), style.font_size().into()]),
                Operation::new("Td", vec![geometry.margin_pt().into(), y.into()]),
                Operation::new("Tj", vec![Object::string_literal(to_win_ansi(text))]),
                Operation::new("ET", vec![]),
            ]);
        }

        builder.add_page(Content { operations }, dictionary! { "Font" => fonts.clone() })?;
    }

    let bytes = builder.finish()?;

    tracing::debug!(pages = pages.len(), bytes = bytes.len(), "Exported text PDF");

    Ok(bytes)
}

fn raster_to_pdf(raster: &RasterImage, geometry: &PageGeometry) -> Result<Vec<u8>, ExportError> {
    let content_width_pt = geometry.width_pt() - 2.0 * geometry.margin_pt();
    let content_height_pt = geometry.height_pt() - 2.0 * geometry.margin_pt();

    let pt_per_px = content_width_pt / raster.width as f32;
    let rows_per_page = (content_height_pt / pt_per_px).floor() as u32;

    let mut builder = PdfBuilder::new(geometry);

    for slice in paginate(raster.height, rows_per_page) {
        let image_id = builder.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => raster.width,
                "Height" => slice.height,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            raster.rows(&slice).to_vec(),
        ));

        let height_pt = slice.height as f32 * pt_per_px;
        let top = geometry.height_pt() - geometry.margin_pt();
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        content_width_pt.into(),
                        0.into(),
                        0.into(),
                        height_pt.into(),
                        geometry.margin_pt().into(),
                        (top - height_pt).into(),
                    ],
                ),
                Operation::new("Do", vec!["Im0".into()]),
                Operation::new("Q", vec![]),
            ],
        };

        builder.add_page(content, dictionary! { "XObject" => dictionary! { "Im0" => image_id } })?;
    }

    builder.finish()
}

/// Text as single-byte WinAnsi, characters outside Latin-1 become `?`.
fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    media_box: Vec<Object>,
}

impl PdfBuilder {
    fn new(geometry: &PageGeometry) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
            media_box: vec![
                0.into(),
                0.into(),
                geometry.width_pt().into(),
                geometry.height_pt().into(),
            ],
        }
    }

    fn font(&mut self, base_font: &str) -> ObjectId {
        self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => base_font,
            "Encoding" => "WinAnsiEncoding",
        })
    }

    fn add_page(&mut self, content: Content, resources: lopdf::Dictionary) -> Result<(), ExportError> {
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "Resources" => resources,
        });
        self.kids.push(page_id.into());
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>, ExportError> {
        let count = self.kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => self.kids,
            "Count" => count,
            "MediaBox" => self.media_box,
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct SolidRasterizer {
        width: u32,
        height: u32,
    }

    #[async_trait::async_trait]
    impl Rasterizer for SolidRasterizer {
        async fn rasterize(&self, _html: &str) -> Result<RasterImage, ExportError> {
            RasterImage::new(
                self.width,
                self.height,
                vec![200; (self.width * self.height * 3) as usize],
            )
        }
    }

    struct FailingRasterizer;

    #[async_trait::async_trait]
    impl Rasterizer for FailingRasterizer {
        async fn rasterize(&self, _html: &str) -> Result<RasterImage, ExportError> {
            Err(ExportError::Rasterize("canvas unavailable".into()))
        }
    }

    fn page_count(bytes: &[u8]) -> usize {
        Document::load_mem(bytes).unwrap().get_pages().len()
    }

    #[tokio::test]
    async fn test_raster_export_paginates() {
        // 190mm wide content maps 190px to 190mm, so a 277mm page holds 277 rows.
        let rasterizer = SolidRasterizer {
            width: 190,
            height: 600,
        };
        let bytes = export_pdf("<p>x</p>", &rasterizer, &PageGeometry::default())
            .await
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        assert_eq!(page_count(&bytes), 3);
    }

    #[tokio::test]
    async fn test_empty_raster_is_an_error() {
        let rasterizer = SolidRasterizer {
            width: 100,
            height: 0,
        };
        let result = export_pdf("", &rasterizer, &PageGeometry::default()).await;
        assert!(matches!(result, Err(ExportError::EmptyRaster)));
    }

    #[tokio::test]
    async fn test_errors_reach_the_callback() {
        let calls = AtomicUsize::new(0);
        let result = export_pdf_with_callback(
            "<p>x</p>",
            &FailingRasterizer,
            &PageGeometry::default(),
            |err| {
                assert!(matches!(err, ExportError::Rasterize(_)));
                calls.fetch_add(1, Ordering::SeqCst);
            },
        )
        .await;
        assert!(result.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_text_pdf() {
        let bytes = export_text_pdf("# Report\n\nHello **world**", &PageGeometry::default()).unwrap();
        assert_eq!(page_count(&bytes), 1);

        let long = vec!["A line of body text."; 200].join("\n\n");
        let bytes = export_text_pdf(&long, &PageGeometry::default()).unwrap();
        assert!(page_count(&bytes) > 1);
    }

    #[test]
    fn test_invalid_geometry() {
        let geometry = PageGeometry {
            width_mm: 10.0,
            height_mm: 10.0,
            margin_mm: 5.0,
        };
        assert!(matches!(
            export_text_pdf("x", &geometry),
            Err(ExportError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_win_ansi() {
        assert_eq!(to_win_ansi("café ✓"), b"caf\xe9 ?".to_vec());
    }
}
