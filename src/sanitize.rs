//! Pixel-level image scrubbing.
//!
//! [`sanitize_image`] decodes an image, copies its samples into a brand-new
//! pixel buffer, and re-encodes that buffer alone. The decoded value — and
//! whatever the container parser learned alongside it — is dropped, so no
//! tag directory, color profile, thumbnail, or comment block can reach the
//! output stream. There is no mutation-based strip path: some metadata
//! travels with the container encoder rather than the in-memory image, so
//! only a rebuild guarantees removal.

use std::io::Cursor;

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::{DynamicImage, ImageBuffer, Pixel};

use crate::policy::{OutputFormat, OutputPolicy};

/// A scrubbed image rebuilt from decoded pixels only.
#[derive(Debug, Clone)]
pub struct SanitizedImage {
    /// Encoded bytes of the cleaned container.
    pub bytes: Vec<u8>,
    /// The container format the pixels were encoded into.
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

/// Decode `bytes`, rebuild the pixels into a fresh buffer, downscale past
/// the policy's width cap, and re-encode with no metadata of any kind.
///
/// Fails only when the bytes cannot be decoded as a supported container.
/// There is no fallback that hands the original bytes back — that could
/// silently keep the metadata the caller asked to remove.
pub fn sanitize_image(bytes: &[u8], policy: &OutputPolicy) -> Result<SanitizedImage> {
    let source_format = image::guess_format(bytes).ok();
    let decoded = image::load_from_memory(bytes).context("Failed to decode image")?;

    let mut clean = rebuild_pixels(&decoded)?;
    drop(decoded);

    let (width, height) = policy.target_dimensions(clean.width(), clean.height());
    if (width, height) != (clean.width(), clean.height()) {
        log::debug!(
            "downscaling {}x{} -> {width}x{height}",
            clean.width(),
            clean.height()
        );
        clean = clean.resize_exact(width, height, FilterType::Lanczos3);
    }

    let format = policy.resolve_format(source_format);
    let encoded = encode(clean, format)?;

    Ok(SanitizedImage {
        bytes: encoded,
        format,
        width,
        height,
    })
}

/// Copy the image's samples into a brand-new buffer of the same pixel mode.
fn rebuild_pixels(image: &DynamicImage) -> Result<DynamicImage> {
    let rebuilt = match image {
        DynamicImage::ImageLuma8(buf) => DynamicImage::ImageLuma8(fresh_buffer(buf)?),
        DynamicImage::ImageLumaA8(buf) => DynamicImage::ImageLumaA8(fresh_buffer(buf)?),
        DynamicImage::ImageRgb8(buf) => DynamicImage::ImageRgb8(fresh_buffer(buf)?),
        DynamicImage::ImageRgba8(buf) => DynamicImage::ImageRgba8(fresh_buffer(buf)?),
        DynamicImage::ImageLuma16(buf) => DynamicImage::ImageLuma16(fresh_buffer(buf)?),
        DynamicImage::ImageLumaA16(buf) => DynamicImage::ImageLumaA16(fresh_buffer(buf)?),
        DynamicImage::ImageRgb16(buf) => DynamicImage::ImageRgb16(fresh_buffer(buf)?),
        DynamicImage::ImageRgba16(buf) => DynamicImage::ImageRgba16(fresh_buffer(buf)?),
        DynamicImage::ImageRgb32F(buf) => DynamicImage::ImageRgb32F(fresh_buffer(buf)?),
        DynamicImage::ImageRgba32F(buf) => DynamicImage::ImageRgba32F(fresh_buffer(buf)?),
        // DynamicImage is non-exhaustive; any future pixel mode degrades to
        // a fresh RGBA8 copy.
        other => DynamicImage::ImageRgba8(other.to_rgba8()),
    };
    Ok(rebuilt)
}

fn fresh_buffer<P>(buf: &ImageBuffer<P, Vec<P::Subpixel>>) -> Result<ImageBuffer<P, Vec<P::Subpixel>>>
where
    P: Pixel,
{
    ImageBuffer::from_raw(buf.width(), buf.height(), buf.as_raw().clone())
        .context("Pixel buffer did not match its dimensions")
}

/// Encode a pixel grid into the target container with default settings.
///
/// Goes through the plain pixel encoder, which emits samples only. Pixel
/// modes the target codec cannot carry are converted first: JPEG has no
/// alpha channel and no 16-bit samples, PNG has no float samples.
fn encode(image: DynamicImage, format: OutputFormat) -> Result<Vec<u8>> {
    let image = match format {
        OutputFormat::Jpeg => match image {
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image,
            DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA16(_) => DynamicImage::ImageLuma8(image.to_luma8()),
            _ => DynamicImage::ImageRgb8(image.to_rgb8()),
        },
        OutputFormat::Png => match image {
            DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
                DynamicImage::ImageRgba16(image.to_rgba16())
            }
            _ => image,
        },
    };

    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, format.image_format())
        .context("Failed to encode cleaned image")?;
    Ok(out.into_inner())
}
