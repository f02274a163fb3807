//! Read-only summaries of a container's images

use crate::extract::payload;
use crate::{GltfContainer, ImageSource};
use std::io::Cursor;

/// How an image stores its bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    DataUri,
    External(String),
    BufferView(usize),
    Unresolved,
}

/// Summary of one image descriptor
#[derive(Debug, Clone)]
pub struct ImageSummary {
    pub index: usize,
    pub name: Option<String>,
    pub mime_type: Option<String>,
    pub kind: SourceKind,
    /// Payload size, when the bytes could be resolved
    pub size: Option<usize>,
    /// Pixel dimensions, when the payload header is a known image format
    pub dimensions: Option<(u32, u32)>,
    /// Why the payload could not be resolved
    pub error: Option<String>,
}

/// Summarizes every image of a container without writing anything
pub fn summarize_images(container: &GltfContainer) -> Vec<ImageSummary> {
    container
        .document
        .images
        .iter()
        .enumerate()
        .map(|(index, image)| {
            let kind = match image.source() {
                ImageSource::DataUri(_) => SourceKind::DataUri,
                ImageSource::External(uri) => SourceKind::External(uri.to_string()),
                ImageSource::BufferView(view) => SourceKind::BufferView(view),
                ImageSource::Unresolved => SourceKind::Unresolved,
            };

            let mut summary = ImageSummary {
                index,
                name: image.name.clone(),
                mime_type: image.mime_type.clone(),
                kind,
                size: None,
                dimensions: None,
                error: None,
            };

            match payload(container, image) {
                Ok(Some((data, _))) => {
                    summary.size = Some(data.len());
                    summary.dimensions = probe_dimensions(&data);
                }
                Ok(None) => {}
                Err(e) => summary.error = Some(e.to_string()),
            }

            summary
        })
        .collect()
}

/// Reads the pixel dimensions from an encoded image header
pub fn probe_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}
