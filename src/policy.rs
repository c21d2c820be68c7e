use image::ImageFormat;
use serde::{Deserialize, Serialize};

/// Default cap on output width, in pixels.
pub const DEFAULT_MAX_WIDTH: u32 = 1920;

/// The container format of a scrubbed image.
///
/// Only JPEG and PNG are ever produced. Sources in any other decodable
/// format (WebP, TIFF, BMP, GIF) are normalized to JPEG on re-encode.
///
/// # Example
///
/// ```rust
/// use exif_scrub::policy::OutputFormat;
/// use image::ImageFormat;
///
/// assert_eq!(OutputFormat::for_source(Some(ImageFormat::Png)), OutputFormat::Png);
/// assert_eq!(OutputFormat::for_source(Some(ImageFormat::WebP)), OutputFormat::Jpeg);
/// assert_eq!(OutputFormat::for_source(None), OutputFormat::Jpeg);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    /// Decide the output format for a source container: JPEG and PNG keep
    /// their format, everything else becomes JPEG.
    pub fn for_source(source: Option<ImageFormat>) -> Self {
        match source {
            Some(ImageFormat::Jpeg) => Self::Jpeg,
            Some(ImageFormat::Png) => Self::Png,
            _ => Self::Jpeg,
        }
    }

    /// The `image` crate format used when encoding.
    pub fn image_format(&self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }

    /// File extension for output naming.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    /// MIME type for HTTP responses.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// Controls how the sanitizer re-encodes an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputPolicy {
    /// Force an output container format. `None` keeps JPEG/PNG sources
    /// as-is and normalizes everything else to JPEG.
    pub container_format: Option<OutputFormat>,
    /// Images wider than this are downscaled, preserving aspect ratio.
    /// `0` disables the cap.
    pub max_width: u32,
}

impl Default for OutputPolicy {
    fn default() -> Self {
        Self {
            container_format: None,
            max_width: DEFAULT_MAX_WIDTH,
        }
    }
}

impl OutputPolicy {
    /// Resolve the output format for the given source container.
    pub fn resolve_format(&self, source: Option<ImageFormat>) -> OutputFormat {
        self.container_format
            .unwrap_or_else(|| OutputFormat::for_source(source))
    }

    /// Output dimensions for a source image: unchanged when the width fits
    /// under the cap, otherwise scaled down with the height rounded to
    /// preserve aspect ratio (floor 1).
    pub fn target_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if self.max_width == 0 || width <= self.max_width {
            return (width, height);
        }
        let scaled = (height as f64 * self.max_width as f64 / width as f64).round() as u32;
        (self.max_width, scaled.max(1))
    }
}
