//! Image and EXIF forgery helpers shared by the module tests.
//!
//! Metadata is written with `little_exif` and spliced into JPEGs with
//! `img-parts`, so the reader and sanitizer are exercised against real APP1
//! payloads rather than hand-waved byte strings.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use img_parts::jpeg::Jpeg;
use img_parts::{Bytes, ImageEXIF};
use little_exif::endian::Endian;
use little_exif::exif_tag::ExifTag;
use little_exif::exif_tag_format::ExifTagFormat;
use little_exif::filetype::FileExtension;
use little_exif::ifd::ExifTagGroup;
use little_exif::metadata::Metadata;

/// ImageDescription written into forged fixtures.
pub const DESCRIPTION: &str = "A test scene";
/// UserComment body written into forged fixtures (after the ASCII prefix).
pub const COMMENT: &[u8] = b"forged for tests";

// little_exif as_u8_vec(JPEG) returns: [APP1 marker 2B][length 2B][Exif\0\0 6B][TIFF data]
// img-parts set_exif() expects just the TIFF data (after Exif\0\0)
const JPEG_EXIF_OVERHEAD: usize = 10; // 2 + 2 + 6

const TAG_GPS_LATITUDE_REF: u16 = 0x0001;
const TAG_GPS_LATITUDE: u16 = 0x0002;

/// Deterministic RGB gradient.
pub fn rgb_pattern(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

pub fn encode_image(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).expect("encode fixture");
    out.into_inner()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_image(&DynamicImage::ImageRgb8(rgb_pattern(width, height)), ImageFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_image(&DynamicImage::ImageRgb8(rgb_pattern(width, height)), ImageFormat::Jpeg)
}

pub fn webp_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_image(&DynamicImage::ImageRgb8(rgb_pattern(width, height)), ImageFormat::WebP)
}

/// A PNG with a varying alpha channel.
pub fn rgba_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, ((x * y) % 256) as u8])
    });
    encode_image(&DynamicImage::ImageRgba8(img), ImageFormat::Png)
}

/// A JPEG carrying IFD0 and Exif sub-IFD tags.
pub fn jpeg_with_exif(width: u32, height: u32) -> Vec<u8> {
    let mut metadata = Metadata::new();
    metadata.set_tag(ExifTag::ImageDescription(DESCRIPTION.to_string()));

    let mut comment = b"ASCII\0\0\0".to_vec();
    comment.extend_from_slice(COMMENT);
    metadata.set_tag(ExifTag::UserComment(comment));

    with_exif_payload(jpeg_bytes(width, height), &metadata)
}

/// A JPEG whose GPS sub-IFD holds a latitude (51°30'0" N).
pub fn jpeg_with_gps(width: u32, height: u32) -> Vec<u8> {
    let mut metadata = Metadata::new();
    metadata.set_tag(ExifTag::ImageDescription("Somewhere north".to_string()));

    if let Ok(tag) = ExifTag::from_u16_with_data(
        TAG_GPS_LATITUDE_REF,
        &ExifTagFormat::STRING,
        &b"N\0".to_vec(),
        &Endian::Little,
        &ExifTagGroup::GPS,
    ) {
        metadata.set_tag(tag);
    }

    let mut rational = Vec::with_capacity(24);
    for (num, den) in [(51u32, 1u32), (30, 1), (0, 1)] {
        rational.extend_from_slice(&num.to_le_bytes());
        rational.extend_from_slice(&den.to_le_bytes());
    }
    if let Ok(tag) = ExifTag::from_u16_with_data(
        TAG_GPS_LATITUDE,
        &ExifTagFormat::RATIONAL64U,
        &rational,
        &Endian::Little,
        &ExifTagGroup::GPS,
    ) {
        metadata.set_tag(tag);
    }

    with_exif_payload(jpeg_bytes(width, height), &metadata)
}

/// A JPEG whose APP1 Exif payload is a truncated TIFF directory.
pub fn jpeg_with_corrupt_exif(width: u32, height: u32) -> Vec<u8> {
    let mut jpeg = Jpeg::from_bytes(Bytes::from(jpeg_bytes(width, height)))
        .expect("parse fixture jpeg");
    jpeg.set_exif(Some(Bytes::from_static(b"II*\0broken")));
    jpeg.encoder().bytes().to_vec()
}

fn with_exif_payload(plain: Vec<u8>, metadata: &Metadata) -> Vec<u8> {
    let exif_bytes = metadata.as_u8_vec(FileExtension::JPEG).expect("encode EXIF payload");
    assert!(exif_bytes.len() > JPEG_EXIF_OVERHEAD, "empty EXIF payload");
    let tiff = exif_bytes[JPEG_EXIF_OVERHEAD..].to_vec();

    let mut jpeg = Jpeg::from_bytes(Bytes::from(plain)).expect("parse fixture jpeg");
    jpeg.set_exif(Some(Bytes::from(tiff)));
    jpeg.encoder().bytes().to_vec()
}
