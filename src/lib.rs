//! # exif-scrub
//!
//! EXIF metadata inspector and scrubber — report every tag embedded in an
//! image, then rebuild a pixel-identical copy that carries none of it.
//!
//! Two core operations, both pure functions over in-memory bytes:
//!
//! - **Tag Reader** ([`metadata::read_metadata`]) — walks the image's
//!   embedded tag directories (IFD0, Exif, GPS, interop, thumbnail) and
//!   returns every resolved tag as a flat name → value mapping, with binary
//!   payloads base64-encoded. Parse problems degrade to sentinels; the
//!   reader never fails.
//! - **Pixel Sanitizer** ([`sanitize::sanitize_image`]) — decodes the
//!   image, copies its samples into a brand-new pixel buffer, optionally
//!   downscales, and re-encodes that buffer alone. Nothing from the
//!   original container survives except pixels.
//!
//! ## Quick Start
//!
//! The simplest way to use the library is through the pipeline module,
//! which runs the read → scrub flow and reports both halves:
//!
//! ```rust,no_run
//! use exif_scrub::pipeline::clean_bytes;
//! use exif_scrub::policy::OutputPolicy;
//!
//! fn main() -> anyhow::Result<()> {
//!     let bytes = std::fs::read("photo.jpg")?;
//!
//!     let result = clean_bytes(&bytes, &OutputPolicy::default())?;
//!
//!     println!("Removed {} tag(s)", result.metadata_before.tags().len());
//!     println!(
//!         "Output: {}x{} {:?}",
//!         result.image.width, result.image.height, result.image.format
//!     );
//!     std::fs::write("cleaned_photo.jpg", &result.image.bytes)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! The reader and the sanitizer can also be called individually:
//!
//! ```rust,no_run
//! use exif_scrub::metadata::read_metadata;
//! use exif_scrub::sanitize::sanitize_image;
//! use exif_scrub::policy::OutputPolicy;
//!
//! fn main() -> anyhow::Result<()> {
//!     let bytes = std::fs::read("photo.jpg")?;
//!
//!     // 1. Inspect — never fails, degrades to sentinels
//!     let snapshot = read_metadata(&bytes);
//!     for tag in snapshot.tags() {
//!         println!("{:?} {} = {}", tag.directory, tag.name, tag.value);
//!     }
//!
//!     // 2. Scrub — fails only when the bytes cannot be decoded
//!     let cleaned = sanitize_image(&bytes, &OutputPolicy::default())?;
//!     std::fs::write("cleaned.jpg", &cleaned.bytes)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Output Formats
//!
//! | Source format | Output |
//! |---------------|--------|
//! | JPEG | JPEG |
//! | PNG | PNG |
//! | WebP, TIFF, BMP, GIF | JPEG |
//!
//! Images wider than the policy's `max_width` (default 1920 px) are
//! downscaled with a Lanczos filter, preserving aspect ratio.
//!
//! ## Concurrency
//!
//! Both operations are synchronous, hold no shared state, and only touch
//! the byte buffer they are given, so independent requests can run them
//! concurrently without any locking. Bounding parallelism and timing out
//! pathological inputs is the caller's job — decoded pixel buffers dominate
//! memory use.
//!
//! ## Modules
//!
//! - [`metadata`] — tag directory reading and the snapshot model
//! - [`sanitize`] — pixel rebuild and re-encode
//! - [`policy`] — output format and downscale decisions
//! - [`pipeline`] — read → scrub orchestration, file collection, summaries
//! - [`config`] — configuration types and loading/saving

pub mod config;
pub mod metadata;
pub mod pipeline;
pub mod policy;
pub mod sanitize;

#[cfg(test)]
mod fixtures;
