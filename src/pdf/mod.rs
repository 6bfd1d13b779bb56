//! # Document Encoder
//!
//! Wraps a composed page raster in a single-page PDF. The page's MediaBox is
//! the page geometry in points and the raster is drawn as one full-page
//! image XObject, so the PDF carries no text or vector content.
//!
//! Output is deterministic: objects are written in id order, no timestamps
//! or document ids are embedded, and the image stream is deflated at a fixed
//! level.

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::RgbImage;
use lopdf::{Document, Object, Stream, dictionary};
use std::io::Write;

use crate::error::{FolioError, Result};
use crate::template::PageGeometry;

const PDF_VERSION: &str = "1.4";
const IMAGE_NAME: &str = "Im0";

fn encode_error(what: &str, err: impl std::fmt::Display) -> FolioError {
    FolioError::Encode(format!("{}: {}", what, err))
}

fn deflate(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(6));
    encoder
        .write_all(bytes)
        .map_err(|e| encode_error("Failed to compress page image", e))?;
    encoder
        .finish()
        .map_err(|e| encode_error("Failed to compress page image", e))
}

/// Encode `page` as a one-page PDF sized to `geometry`.
///
/// The raster is stretched to fill the MediaBox, so a raster whose size is
/// the geometry rounded up to whole pixels maps one pixel to one point.
pub fn encode(page: &RgbImage, geometry: &PageGeometry) -> Result<Vec<u8>> {
    let (width, height) = page.dimensions();
    if width == 0 || height == 0 {
        return Err(FolioError::Encode("page raster is empty".into()));
    }

    let mut doc = Document::with_version(PDF_VERSION);
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        deflate(page.as_raw())?,
    ));

    let content = format!(
        "q {} 0 0 {} 0 0 cm /{} Do Q",
        geometry.width, geometry.height, IMAGE_NAME
    );
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { IMAGE_NAME => image_id },
        },
        "MediaBox" => vec![
            0.into(),
            0.into(),
            Object::Real(geometry.width),
            Object::Real(geometry.height),
        ],
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| encode_error("Failed to write PDF", e))?;
    log::debug!("encoded {}x{} page into {} PDF bytes", width, height, bytes.len());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn page(geometry: &PageGeometry) -> RgbImage {
        let (w, h) = geometry.pixel_size();
        RgbImage::from_pixel(w, h, Rgb([255, 255, 255]))
    }

    #[test]
    fn test_encode_is_pdf() {
        let geometry = PageGeometry::A4_PORTRAIT;
        let bytes = encode(&page(&geometry), &geometry).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.windows(5).any(|w| w == b"%%EOF"));
    }

    #[test]
    fn test_single_page_with_media_box() {
        let geometry = PageGeometry { width: 612.0, height: 792.0 };
        let bytes = encode(&page(&geometry), &geometry).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);

        let page_id = *pages.values().next().unwrap();
        let page = doc.get_dictionary(page_id).unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        let dims: Vec<f32> = media_box.iter().map(|o| o.as_float().unwrap()).collect();
        assert_eq!(dims, vec![0.0, 0.0, 612.0, 792.0]);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let geometry = PageGeometry { width: 100.0, height: 50.0 };
        let mut raster = page(&geometry);
        raster.put_pixel(10, 10, Rgb([1, 2, 3]));
        let a = encode(&raster, &geometry).unwrap();
        let b = encode(&raster, &geometry).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_image_stream_round_trips_pixels() {
        let geometry = PageGeometry { width: 4.0, height: 2.0 };
        let mut raster = page(&geometry);
        raster.put_pixel(3, 1, Rgb([9, 8, 7]));
        let bytes = encode(&raster, &geometry).unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        let stream = doc
            .objects
            .values()
            .filter_map(|o| o.as_stream().ok())
            .find(|s| s.dict.get(b"Subtype").and_then(|t| t.as_name()).ok() == Some(b"Image".as_slice()))
            .unwrap();
        assert_eq!(stream.decompressed_content().unwrap(), raster.into_raw());
    }

    #[test]
    fn test_empty_raster_is_rejected() {
        let geometry = PageGeometry { width: 1.0, height: 1.0 };
        assert!(matches!(
            encode(&RgbImage::new(0, 0), &geometry),
            Err(FolioError::Encode(_))
        ));
    }
}
