//! Lookbook PDF export: one A4 page per photo, with the lookbook name,
//! person and palette swatches on every page. Returns raw bytes for the
//! browser download.

use anyhow::Context as _;
use printpdf::path::PaintMode;
use printpdf::{
    image_crate, BuiltinFont, Color, Image, ImageTransform, Mm, PdfDocument, PdfLayerReference,
    Rect, Rgb,
};

use crate::models::Lookbook;

const PAGE_W_MM: f32 = 210.0;
const PAGE_H_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const PHOTO_MAX_W_MM: f32 = PAGE_W_MM - 2.0 * MARGIN_MM;
const PHOTO_MAX_H_MM: f32 = 230.0;
const SWATCH_MM: f32 = 8.0;

/// Render `book` with its photos (already fetched, in page order) to PDF.
pub fn lookbook_pdf(book: &Lookbook, photos: &[Vec<u8>]) -> anyhow::Result<Vec<u8>> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(&book.name, Mm(PAGE_W_MM), Mm(PAGE_H_MM), "photo");
    let font = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .context("builtin font")?;

    // An empty book still exports a title page.
    let pages: Vec<Option<&Vec<u8>>> = if photos.is_empty() {
        vec![None]
    } else {
        photos.iter().map(Some).collect()
    };
    for (index, photo) in pages.into_iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_W_MM), Mm(PAGE_H_MM), "photo");
            doc.get_page(page).get_layer(layer)
        };

        layer.use_text(
            &book.name,
            18.0,
            Mm(MARGIN_MM),
            Mm(PAGE_H_MM - 15.0),
            &font,
        );
        if !book.person_name.is_empty() {
            layer.use_text(
                &book.person_name,
                11.0,
                Mm(MARGIN_MM),
                Mm(PAGE_H_MM - 22.0),
                &font,
            );
        }
        draw_palette(&layer, &book.palette);

        if let Some(bytes) = photo {
            if let Err(e) = draw_photo(&layer, bytes) {
                log::error!("skipping photo {index} in PDF export: {e}");
            }
        }
    }

    doc.save_to_bytes().context("serialize PDF")
}

fn draw_palette(layer: &PdfLayerReference, palette: &[String]) {
    for (i, hex) in palette.iter().enumerate() {
        let Some((r, g, b)) = parse_hex_color(hex) else {
            log::warn!("skipping unparseable palette entry {hex:?}");
            continue;
        };
        layer.set_fill_color(Color::Rgb(Rgb::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            None,
        )));
        let x = MARGIN_MM + i as f32 * (SWATCH_MM + 2.0);
        let y = PAGE_H_MM - 32.0;
        layer.add_rect(
            Rect::new(Mm(x), Mm(y), Mm(x + SWATCH_MM), Mm(y + SWATCH_MM))
                .with_mode(PaintMode::Fill),
        );
    }
}

fn draw_photo(layer: &PdfLayerReference, bytes: &[u8]) -> anyhow::Result<()> {
    let decoded = image_crate::load_from_memory(bytes).context("decode photo")?;
    let (px_w, px_h) = (decoded.width() as f32, decoded.height() as f32);

    // Pick a dpi so the photo fills the content box without overflowing it.
    let dpi_for_width = px_w * 25.4 / PHOTO_MAX_W_MM;
    let dpi_for_height = px_h * 25.4 / PHOTO_MAX_H_MM;
    let dpi = dpi_for_width.max(dpi_for_height);
    let w_mm = px_w * 25.4 / dpi;

    let image = Image::from_dynamic_image(&decoded);
    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(MARGIN_MM + (PHOTO_MAX_W_MM - w_mm) / 2.0)),
            translate_y: Some(Mm(MARGIN_MM)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
    Ok(())
}

/// Parse `#RRGGBB` / `RRGGBB` / `#RGB` palette entries.
pub fn parse_hex_color(s: &str) -> Option<(u8, u8, u8)> {
    let hex = s.trim().trim_start_matches('#');
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        3 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
            Some((digit(0)?, digit(1)?, digit(2)?))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_parse_in_all_accepted_forms() {
        assert_eq!(parse_hex_color("#ff8000"), Some((255, 128, 0)));
        assert_eq!(parse_hex_color("FF8000"), Some((255, 128, 0)));
        assert_eq!(parse_hex_color("#fff"), Some((255, 255, 255)));
        assert_eq!(parse_hex_color("bogus"), None);
        assert_eq!(parse_hex_color("#ff80"), None);
    }

    #[test]
    fn export_produces_a_pdf_even_for_an_empty_book() {
        let book = Lookbook {
            name: "Autumn".into(),
            person_name: "A. Client".into(),
            palette: vec!["#aa3344".into(), "not-a-color".into()],
            ..Default::default()
        };
        let bytes = lookbook_pdf(&book, &[]).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn export_embeds_photos() {
        let mut img = image::RgbImage::new(4, 4);
        img.fill(200);
        let mut png = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_with_encoder(image::codecs::png::PngEncoder::new(&mut png))
            .unwrap();

        let book = Lookbook {
            name: "Looks".into(),
            ..Default::default()
        };
        let bytes = lookbook_pdf(&book, &[png.clone(), png]).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }
}
