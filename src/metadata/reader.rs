use std::fmt;
use std::io::Cursor;

use exif::{Context, In, Reader, Value};
use serde::Serialize;
use serde_json::json;

/// Sentinel reason when an image decodes fine but carries no tag directory.
pub const NO_EXIF_FOUND: &str = "No EXIF metadata found";
/// Sentinel reason when the directory is corrupt or the bytes are not a
/// container the parser recognizes.
pub const NO_METADATA_FOUND: &str = "No metadata found";

/// The IFD a tag was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IfdDirectory {
    /// IFD0 — the main image directory.
    Image,
    /// The Exif sub-IFD.
    Exif,
    /// The GPS sub-IFD.
    Gps,
    /// The interoperability sub-IFD.
    Interop,
    /// IFD1 — the embedded thumbnail directory.
    Thumbnail,
}

/// A tag value coerced to a transport-safe shape.
///
/// Text and numbers pass through; rationals keep their `(num, den)` pairs;
/// byte and undefined payloads are base64-encoded so the whole snapshot can
/// travel as JSON. Raw binary never crosses the reader's output boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TagValue {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    UnsignedList(Vec<u64>),
    SignedList(Vec<i64>),
    FloatList(Vec<f64>),
    Rational(u32, u32),
    RationalList(Vec<(u32, u32)>),
    SignedRational(i32, i32),
    SignedRationalList(Vec<(i32, i32)>),
    /// Base64-encoded binary payload.
    Binary(String),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }

        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Unsigned(n) => write!(f, "{n}"),
            Self::Signed(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::UnsignedList(v) => list(f, v),
            Self::SignedList(v) => list(f, v),
            Self::FloatList(v) => list(f, v),
            Self::Rational(num, den) => write!(f, "{num}/{den}"),
            Self::RationalList(v) => {
                for (i, (num, den)) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{num}/{den}")?;
                }
                Ok(())
            }
            Self::SignedRational(num, den) => write!(f, "{num}/{den}"),
            Self::SignedRationalList(v) => {
                for (i, (num, den)) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{num}/{den}")?;
                }
                Ok(())
            }
            Self::Binary(b64) => write!(f, "{b64}"),
        }
    }
}

/// One resolved tag from an image's metadata directories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataTag {
    pub name: String,
    pub value: TagValue,
    pub directory: IfdDirectory,
}

/// Everything read from one image, in directory traversal order — or a
/// sentinel explaining why there is nothing.
///
/// Reader outcomes are never errors to the caller: an image with no
/// directory and an image with an unparseable directory both degrade to a
/// sentinel, and the surrounding request still succeeds.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataSnapshot {
    /// Resolved tags in the order they were encountered.
    Tags(Vec<MetadataTag>),
    /// The image decoded, but no tag directory exists.
    NoMetadata,
    /// A directory exists but could not be parsed, or the bytes are not a
    /// recognizable container.
    Unreadable,
}

impl MetadataSnapshot {
    /// The resolved tags, empty for both sentinels.
    pub fn tags(&self) -> &[MetadataTag] {
        match self {
            Self::Tags(tags) => tags,
            _ => &[],
        }
    }

    /// The sentinel reason, if this snapshot is one.
    pub fn error_reason(&self) -> Option<&'static str> {
        match self {
            Self::Tags(_) => None,
            Self::NoMetadata => Some(NO_EXIF_FOUND),
            Self::Unreadable => Some(NO_METADATA_FOUND),
        }
    }

    /// The flat JSON object consumers receive: tag name → value, or
    /// `{"Error": reason}` for the sentinels. When the same name appears in
    /// more than one directory the later value wins, keeping the first
    /// position.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Tags(tags) => {
                let mut map = serde_json::Map::new();
                for tag in tags {
                    let value =
                        serde_json::to_value(&tag.value).unwrap_or(serde_json::Value::Null);
                    map.insert(tag.name.clone(), value);
                }
                serde_json::Value::Object(map)
            }
            other => json!({ "Error": other.error_reason() }),
        }
    }
}

/// Read every resolved metadata tag from raw image bytes.
///
/// Walks the full IFD chain of JPEG, TIFF, PNG, WebP, and HEIF containers.
/// Tag ids missing from the tag table are dropped rather than surfaced as
/// bare numbers. Pure function of the input bytes; never fails.
pub fn read_metadata(bytes: &[u8]) -> MetadataSnapshot {
    let mut cursor = Cursor::new(bytes);
    let parsed = match Reader::new().read_from_container(&mut cursor) {
        Ok(parsed) => parsed,
        Err(exif::Error::NotFound(_)) => {
            log::debug!("no tag directory present");
            return MetadataSnapshot::NoMetadata;
        }
        Err(e) => {
            log::debug!("metadata parse failed: {e}");
            return MetadataSnapshot::Unreadable;
        }
    };

    let mut tags = Vec::new();
    for field in parsed.fields() {
        if field.tag.description().is_none() {
            continue;
        }
        let Some(value) = coerce_value(&field.value) else {
            continue;
        };
        tags.push(MetadataTag {
            name: field.tag.to_string(),
            value,
            directory: directory_of(field),
        });
    }

    MetadataSnapshot::Tags(tags)
}

fn directory_of(field: &exif::Field) -> IfdDirectory {
    match field.tag.context() {
        Context::Exif => IfdDirectory::Exif,
        Context::Gps => IfdDirectory::Gps,
        Context::Interop => IfdDirectory::Interop,
        _ if field.ifd_num == In::THUMBNAIL => IfdDirectory::Thumbnail,
        _ => IfdDirectory::Image,
    }
}

/// Coerce a raw TIFF value into its transport-safe form. Returns `None` for
/// values that could not be decoded at all.
fn coerce_value(value: &Value) -> Option<TagValue> {
    use base64::Engine;
    let b64 = |bytes: &[u8]| base64::engine::general_purpose::STANDARD.encode(bytes);

    Some(match value {
        Value::Ascii(lines) => {
            let text = lines
                .iter()
                .map(|line| String::from_utf8_lossy(line))
                .collect::<Vec<_>>()
                .join("\n");
            TagValue::Text(text.trim_matches(['\0', ' ']).to_string())
        }
        Value::Byte(bytes) => TagValue::Binary(b64(bytes)),
        Value::Undefined(bytes, _) => TagValue::Binary(b64(bytes)),
        Value::Short(v) => unsigned(v.iter().map(|&n| u64::from(n)).collect()),
        Value::Long(v) => unsigned(v.iter().map(|&n| u64::from(n)).collect()),
        Value::SByte(v) => signed(v.iter().map(|&n| i64::from(n)).collect()),
        Value::SShort(v) => signed(v.iter().map(|&n| i64::from(n)).collect()),
        Value::SLong(v) => signed(v.iter().map(|&n| i64::from(n)).collect()),
        Value::Float(v) => float(v.iter().map(|&n| f64::from(n)).collect()),
        Value::Double(v) => float(v.clone()),
        Value::Rational(v) => match v.as_slice() {
            [r] => TagValue::Rational(r.num, r.denom),
            _ => TagValue::RationalList(v.iter().map(|r| (r.num, r.denom)).collect()),
        },
        Value::SRational(v) => match v.as_slice() {
            [r] => TagValue::SignedRational(r.num, r.denom),
            _ => TagValue::SignedRationalList(v.iter().map(|r| (r.num, r.denom)).collect()),
        },
        _ => return None,
    })
}

fn unsigned(mut v: Vec<u64>) -> TagValue {
    if v.len() == 1 {
        TagValue::Unsigned(v.remove(0))
    } else {
        TagValue::UnsignedList(v)
    }
}

fn signed(mut v: Vec<i64>) -> TagValue {
    if v.len() == 1 {
        TagValue::Signed(v.remove(0))
    } else {
        TagValue::SignedList(v)
    }
}

fn float(mut v: Vec<f64>) -> TagValue {
    if v.len() == 1 {
        TagValue::Float(v.remove(0))
    } else {
        TagValue::FloatList(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn plain_png_reports_no_exif() {
        let snapshot = read_metadata(&fixtures::png_bytes(16, 16));
        assert_eq!(snapshot, MetadataSnapshot::NoMetadata);
        assert_eq!(snapshot.error_reason(), Some(NO_EXIF_FOUND));
        assert!(snapshot.tags().is_empty());
    }

    #[test]
    fn plain_jpeg_reports_no_exif() {
        let snapshot = read_metadata(&fixtures::jpeg_bytes(16, 16));
        assert_eq!(snapshot, MetadataSnapshot::NoMetadata);
    }

    #[test]
    fn garbage_bytes_report_unreadable() {
        let snapshot = read_metadata(b"definitely not an image");
        assert_eq!(snapshot, MetadataSnapshot::Unreadable);
        assert_eq!(snapshot.error_reason(), Some(NO_METADATA_FOUND));
    }

    #[test]
    fn corrupt_directory_reports_unreadable() {
        let snapshot = read_metadata(&fixtures::jpeg_with_corrupt_exif(16, 16));
        assert_eq!(snapshot, MetadataSnapshot::Unreadable);
    }

    #[test]
    fn resolved_tags_surface_with_directories() {
        let snapshot = read_metadata(&fixtures::jpeg_with_exif(16, 16));
        let tags = snapshot.tags();
        assert!(!tags.is_empty());

        let desc = tags
            .iter()
            .find(|t| t.name == "ImageDescription")
            .expect("ImageDescription resolved");
        assert_eq!(desc.directory, IfdDirectory::Image);
        assert_eq!(desc.value, TagValue::Text(fixtures::DESCRIPTION.to_string()));

        let comment = tags
            .iter()
            .find(|t| t.name == "UserComment")
            .expect("UserComment resolved");
        assert_eq!(comment.directory, IfdDirectory::Exif);
    }

    #[test]
    fn binary_values_are_valid_base64() {
        use base64::Engine;

        let snapshot = read_metadata(&fixtures::jpeg_with_exif(16, 16));
        let comment = snapshot
            .tags()
            .iter()
            .find(|t| t.name == "UserComment")
            .expect("UserComment resolved");

        match &comment.value {
            TagValue::Binary(b64) => {
                let decoded = base64::engine::general_purpose::STANDARD
                    .decode(b64)
                    .expect("valid base64");
                assert!(decoded.ends_with(fixtures::COMMENT));
            }
            other => panic!("expected binary value, got {other:?}"),
        }
    }

    #[test]
    fn gps_latitude_resolves_in_gps_directory() {
        let snapshot = read_metadata(&fixtures::jpeg_with_gps(16, 16));
        let tags = snapshot.tags();

        let lat = tags
            .iter()
            .find(|t| t.name == "GPSLatitude")
            .expect("GPSLatitude resolved");
        assert_eq!(lat.directory, IfdDirectory::Gps);
        assert_eq!(
            lat.value,
            TagValue::RationalList(vec![(51, 1), (30, 1), (0, 1)])
        );

        let lat_ref = tags
            .iter()
            .find(|t| t.name == "GPSLatitudeRef")
            .expect("GPSLatitudeRef resolved");
        assert_eq!(lat_ref.value, TagValue::Text("N".to_string()));
    }

    #[test]
    fn snapshot_json_shapes() {
        let snapshot = read_metadata(&fixtures::jpeg_with_exif(16, 16));
        let json = snapshot.to_json();
        let obj = json.as_object().expect("tag object");
        assert_eq!(
            obj.get("ImageDescription").and_then(|v| v.as_str()),
            Some(fixtures::DESCRIPTION)
        );

        let sentinel = MetadataSnapshot::NoMetadata.to_json();
        assert_eq!(sentinel, json!({ "Error": NO_EXIF_FOUND }));

        let unreadable = MetadataSnapshot::Unreadable.to_json();
        assert_eq!(unreadable, json!({ "Error": NO_METADATA_FOUND }));
    }

    #[test]
    fn value_display_rendering() {
        assert_eq!(TagValue::Text("abc".into()).to_string(), "abc");
        assert_eq!(TagValue::Unsigned(7).to_string(), "7");
        assert_eq!(TagValue::UnsignedList(vec![1, 2, 3]).to_string(), "1, 2, 3");
        assert_eq!(TagValue::Rational(175, 100).to_string(), "175/100");
        assert_eq!(
            TagValue::RationalList(vec![(51, 1), (30, 1)]).to_string(),
            "51/1, 30/1"
        );
    }
}
