use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::metadata::{self, MetadataSnapshot};
use crate::policy::{OutputFormat, OutputPolicy};
use crate::sanitize::{self, SanitizedImage};

/// Supported image extensions (everything the decoder can open).
const IMAGE_EXTENSIONS: &[&str] = &[
    // Kept as-is on output
    "jpg", "jpeg", "png",
    // Normalized to JPEG on output
    "webp", "tif", "tiff", "bmp", "gif",
];

/// The outcome of cleaning a single in-memory image.
#[derive(Debug, Clone)]
pub struct CleanResult {
    /// Metadata found in the input, before scrubbing.
    pub metadata_before: MetadataSnapshot,
    /// The rebuilt, metadata-free image.
    pub image: SanitizedImage,
}

/// Run the full read → scrub flow over an in-memory image.
///
/// The two halves are independent: a reader sentinel (no directory,
/// unparseable directory) never blocks scrubbing, while a decode failure is
/// fatal — the caller must never report a cleaned image that was not
/// actually produced.
///
/// # Example
///
/// ```rust,no_run
/// use exif_scrub::pipeline::clean_bytes;
/// use exif_scrub::policy::OutputPolicy;
///
/// # fn main() -> anyhow::Result<()> {
/// let bytes = std::fs::read("photo.jpg")?;
/// let result = clean_bytes(&bytes, &OutputPolicy::default())?;
/// println!("Removed {} tag(s)", result.metadata_before.tags().len());
/// std::fs::write("cleaned_photo.jpg", &result.image.bytes)?;
/// # Ok(())
/// # }
/// ```
pub fn clean_bytes(bytes: &[u8], policy: &OutputPolicy) -> Result<CleanResult> {
    let metadata_before = metadata::read_metadata(bytes);
    let image = sanitize::sanitize_image(bytes, policy)?;
    Ok(CleanResult {
        metadata_before,
        image,
    })
}

/// Summarize what was removed: every tag name mapped to a `0` marker, or
/// the sentinel object when the reader had nothing to report.
///
/// This is presentation for API consumers; the guarantee that matters is
/// that the cleaned image itself carries nothing.
pub fn redacted_summary(snapshot: &MetadataSnapshot) -> serde_json::Value {
    match snapshot {
        MetadataSnapshot::Tags(tags) => {
            let mut map = serde_json::Map::new();
            for tag in tags {
                map.insert(tag.name.clone(), serde_json::Value::from(0));
            }
            serde_json::Value::Object(map)
        }
        other => other.to_json(),
    }
}

/// The result of cleaning one file on disk.
///
/// Errors are reported here rather than thrown, so a batch keeps going when
/// one file is unreadable.
#[derive(Debug)]
pub struct ProcessResult {
    pub path: PathBuf,
    /// Where the cleaned image was written, once it was.
    pub output_path: Option<PathBuf>,
    /// Snapshot of the input's metadata (sentinels included).
    pub metadata_before: Option<MetadataSnapshot>,
    /// Number of tags the input carried.
    pub tags_removed: usize,
    pub output_format: Option<OutputFormat>,
    pub dimensions: Option<(u32, u32)>,
    pub error: Option<String>,
}

/// Clean a single file and write the result into `output_dir` as
/// `cleaned_<stem>.<ext>`, the extension following the output format.
pub fn process_file(path: &Path, output_dir: &Path, policy: &OutputPolicy) -> ProcessResult {
    let mut result = ProcessResult {
        path: path.to_path_buf(),
        output_path: None,
        metadata_before: None,
        tags_removed: 0,
        output_format: None,
        dimensions: None,
        error: None,
    };

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            result.error = Some(format!("Failed to read file: {e}"));
            return result;
        }
    };

    let cleaned = match clean_bytes(&bytes, policy) {
        Ok(cleaned) => cleaned,
        Err(e) => {
            result.error = Some(format!("{e:#}"));
            return result;
        }
    };

    result.tags_removed = cleaned.metadata_before.tags().len();
    result.metadata_before = Some(cleaned.metadata_before);
    result.output_format = Some(cleaned.image.format);
    result.dimensions = Some((cleaned.image.width, cleaned.image.height));

    let output_path = output_dir.join(cleaned_name(path, cleaned.image.format));
    if let Err(e) = std::fs::write(&output_path, &cleaned.image.bytes) {
        result.error = Some(format!("Failed to write {}: {e}", output_path.display()));
        return result;
    }
    result.output_path = Some(output_path);

    result
}

/// Output filename for a cleaned image.
fn cleaned_name(path: &Path, format: OutputFormat) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    format!("cleaned_{stem}.{}", format.extension())
}

/// Collect supported image files from the given paths.
///
/// Accepts a mix of file paths and directory paths. Directories are walked
/// recursively (following symlinks). Only files with supported image
/// extensions are included.
pub fn collect_images(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_supported_image(path) {
                images.push(path.clone());
            } else {
                log::warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if p.is_file() && is_supported_image(p) {
                    images.push(p.to_path_buf());
                }
            }
        } else {
            log::warn!("Path does not exist: {}", path.display());
        }
    }

    images
}

/// Check if a file has a supported image extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
