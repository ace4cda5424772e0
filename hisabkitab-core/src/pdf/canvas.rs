use std::io::BufWriter;
use std::path::Path;

use printpdf::image_crate::{self, GenericImageView};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};

use crate::pdf::PdfError;

/// A4 width in millimetres.
pub const PAGE_WIDTH_MM: f32 = 210.0;
/// A4 height in millimetres.
pub const PAGE_HEIGHT_MM: f32 = 297.0;

/// Drawing surface the layout engine writes to.
///
/// Coordinates are millimetres from the bottom-left corner of the current
/// page. The first page exists as soon as the canvas is created.
pub trait Canvas {
    /// Closes the current page and starts a new, empty one.
    fn begin_page(&mut self);

    fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, bold: bool);

    /// Places an image with its bottom-left corner at `(x, y)`, scaled to
    /// `width` millimetres.
    fn draw_image(&mut self, path: &Path, x: f32, y: f32, width: f32) -> Result<(), PdfError>;

    /// Serializes the whole document.
    fn finish(self) -> Result<Vec<u8>, PdfError>;
}

/// [`Canvas`] backed by `printpdf`, using the built-in Courier faces so
/// that padded columns line up.
pub struct PdfCanvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    pages: usize,
}

impl PdfCanvas {
    pub fn new(title: &str) -> Result<Self, PdfError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Page 1");
        let layer = doc.get_page(page).get_layer(layer);
        let regular = doc
            .add_builtin_font(BuiltinFont::Courier)
            .map_err(|e| PdfError::Render(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::CourierBold)
            .map_err(|e| PdfError::Render(e.to_string()))?;

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            pages: 1,
        })
    }
}

impl Canvas for PdfCanvas {
    fn begin_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            format!("Page {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, font_size, Mm(x), Mm(y), font);
    }

    fn draw_image(&mut self, path: &Path, x: f32, y: f32, width: f32) -> Result<(), PdfError> {
        let decoded = image_crate::open(path).map_err(|e| PdfError::Image(e.to_string()))?;
        let pixels_wide = decoded.width();
        if pixels_wide == 0 || width <= 0.0 {
            return Err(PdfError::Image("empty image".to_string()));
        }

        // Choose the dpi that makes the image exactly `width` mm wide.
        let dpi = pixels_wide as f32 * 25.4 / width;
        Image::from_dynamic_image(&decoded).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(Mm(y)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, PdfError> {
        let mut writer = BufWriter::new(Vec::<u8>::new());
        self.doc
            .save(&mut writer)
            .map_err(|e| PdfError::Render(e.to_string()))?;
        writer.into_inner().map_err(|e| PdfError::Render(e.to_string()))
    }
}
