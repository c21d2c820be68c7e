//! Metadata directory reading.
//!
//! [`read_metadata`] walks every IFD embedded in an image (IFD0, the
//! Exif/GPS/interop sub-IFDs, and the thumbnail IFD) and returns a
//! [`MetadataSnapshot`]: a flat, JSON-safe view of all resolved tags, or an
//! error sentinel when there is nothing readable. It never fails — parse
//! problems degrade to sentinels so the caller's request can proceed.

mod reader;

pub use reader::{
    IfdDirectory, MetadataSnapshot, MetadataTag, TagValue, read_metadata, NO_EXIF_FOUND,
    NO_METADATA_FOUND,
};
