//! Scene description data structures for glTF containers
//!
//! Only the parts of the glTF JSON schema needed to locate image payloads
//! are modelled. Unknown properties are ignored when deserializing.

use serde::{Deserialize, Serialize};

/// The `asset` block of a glTF document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetInfo {
    /// glTF specification version the document targets
    #[serde(default)]
    pub version: String,
    /// Tool that produced the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
}

/// Parsed glTF scene description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub asset: AssetInfo,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffers: Vec<Buffer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffer_views: Vec<BufferView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<Image>,
}

/// A raw byte blob, either external, inline as a data URI, or the
/// container's embedded binary section when `uri` is absent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buffer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default)]
    pub byte_length: usize,
}

/// A contiguous byte range of a buffer
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    /// Index of the referenced buffer
    pub buffer: usize,
    #[serde(default)]
    pub byte_offset: usize,
    pub byte_length: usize,
}

impl BufferView {
    /// Creates a new buffer view
    pub fn new(buffer: usize, byte_offset: usize, byte_length: usize) -> Self {
        Self {
            buffer,
            byte_offset,
            byte_length,
        }
    }

    /// Exclusive end offset of the view, `None` on overflow
    pub fn end(&self) -> Option<usize> {
        self.byte_offset.checked_add(self.byte_length)
    }
}

/// An image descriptor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_view: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Where an image descriptor gets its bytes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource<'a> {
    /// Inline `data:` URI
    DataUri(&'a str),
    /// Reference to a file outside the container
    External(&'a str),
    /// Byte range of a buffer
    BufferView(usize),
    /// Neither a URI nor a buffer view
    Unresolved,
}

impl Image {
    /// Creates an image backed by an inline or external URI
    pub fn with_uri(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            ..Self::default()
        }
    }

    /// Creates an image backed by a buffer view
    pub fn with_buffer_view(buffer_view: usize, mime_type: Option<&str>) -> Self {
        Self {
            buffer_view: Some(buffer_view),
            mime_type: mime_type.map(str::to_string),
            ..Self::default()
        }
    }

    /// Determines the effective source of the image bytes.
    ///
    /// An empty URI counts as absent, and a URI takes precedence over a
    /// buffer view.
    pub fn source(&self) -> ImageSource<'_> {
        match self.uri.as_deref() {
            Some(uri) if !uri.is_empty() => {
                if uri.starts_with("data:") {
                    ImageSource::DataUri(uri)
                } else {
                    ImageSource::External(uri)
                }
            }
            _ => match self.buffer_view {
                Some(view) => ImageSource::BufferView(view),
                None => ImageSource::Unresolved,
            },
        }
    }
}

impl Document {
    /// Parses a document from JSON bytes
    pub fn from_slice(json: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(json)?)
    }

    /// Serializes the document to compact JSON
    pub fn to_vec(&self) -> crate::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Gets a buffer view by index
    pub fn buffer_view(&self, index: usize) -> crate::Result<&BufferView> {
        self.buffer_views
            .get(index)
            .ok_or(crate::Error::BufferViewNotFound(index))
    }

    /// Gets a buffer by index
    pub fn buffer(&self, index: usize) -> crate::Result<&Buffer> {
        self.buffers
            .get(index)
            .ok_or(crate::Error::BufferNotFound(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_camel_case_fields() {
        let json = br#"{
            "asset": {"version": "2.0", "generator": "test"},
            "buffers": [{"byteLength": 200}],
            "bufferViews": [{"buffer": 0, "byteOffset": 100, "byteLength": 50}],
            "images": [{"bufferView": 0, "mimeType": "image/jpeg", "name": "albedo"}],
            "meshes": []
        }"#;

        let doc = Document::from_slice(json).unwrap();

        assert_eq!(doc.asset.version, "2.0");
        assert_eq!(doc.buffers[0].byte_length, 200);
        assert_eq!(doc.buffer_views[0].byte_offset, 100);
        assert_eq!(doc.images[0].mime_type.as_deref(), Some("image/jpeg"));
        assert_eq!(doc.images[0].source(), ImageSource::BufferView(0));
    }

    #[test]
    fn test_byte_offset_defaults_to_zero() {
        let doc = Document::from_slice(br#"{"bufferViews": [{"buffer": 0, "byteLength": 8}]}"#)
            .unwrap();
        assert_eq!(doc.buffer_views[0].byte_offset, 0);
        assert_eq!(doc.buffer_views[0].end(), Some(8));
    }

    #[test]
    fn test_image_source_classification() {
        assert_eq!(
            Image::with_uri("data:image/png;base64,AAAA").source(),
            ImageSource::DataUri("data:image/png;base64,AAAA")
        );
        assert_eq!(
            Image::with_uri("textures/wall.png").source(),
            ImageSource::External("textures/wall.png")
        );
        assert_eq!(Image::default().source(), ImageSource::Unresolved);

        let mut empty_uri = Image::with_buffer_view(3, None);
        empty_uri.uri = Some(String::new());
        assert_eq!(empty_uri.source(), ImageSource::BufferView(3));
    }

    #[test]
    fn test_missing_indices_are_errors() {
        let doc = Document::default();
        assert!(matches!(
            doc.buffer_view(0),
            Err(crate::Error::BufferViewNotFound(0))
        ));
        assert!(matches!(doc.buffer(2), Err(crate::Error::BufferNotFound(2))));
    }
}
