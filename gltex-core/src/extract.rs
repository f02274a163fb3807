//! Texture extraction from glTF containers
//!
//! Every image descriptor is resolved on its own: a failure is recorded as
//! an [`ImageOutcome::Failed`] entry and the pass moves on to the next
//! descriptor. Only problems with the container itself or the output
//! directory abort the run.

use crate::data_uri::{extension_for_mime, DataUri};
use crate::{BufferView, GltfContainer, Image, ImageSource, Result};
use log::{info, warn};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

/// Extraction configuration
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Container file to read
    pub container: PathBuf,
    /// Directory the textures are written to, created when missing
    pub output_dir: PathBuf,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            container: PathBuf::from("scene.glb"),
            output_dir: PathBuf::from("extracted_textures"),
        }
    }
}

/// Where an extracted payload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSource {
    /// Decoded from an inline `data:` URI
    DataUri,
    /// Sliced out of the buffer view with this index
    BufferView(usize),
}

/// Result of processing a single image descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    /// Payload written to `path`
    Extracted {
        index: usize,
        path: PathBuf,
        bytes: usize,
        source: PayloadSource,
    },
    /// Image lives in an external file; nothing was written
    External { index: usize, uri: String },
    /// Descriptor has neither a URI nor a buffer view
    Unresolved { index: usize },
    /// Resolving or writing the payload failed
    Failed { index: usize, error: String },
}

impl ImageOutcome {
    /// Zero-based position of the descriptor in the container
    pub fn index(&self) -> usize {
        match self {
            Self::Extracted { index, .. }
            | Self::External { index, .. }
            | Self::Unresolved { index }
            | Self::Failed { index, .. } => *index,
        }
    }

    /// Whether a file was written
    pub fn is_extracted(&self) -> bool {
        matches!(self, Self::Extracted { .. })
    }

    /// Whether resolving or writing the payload failed
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Why an extraction pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractStatus {
    /// Every image descriptor was processed
    Completed,
    /// The container declares no buffers
    NoBuffers,
    /// The container declares no images
    NoImages,
}

/// Summary of an extraction pass
#[derive(Debug, Clone)]
pub struct ExtractReport {
    pub status: ExtractStatus,
    /// One entry per image descriptor, in container order
    pub outcomes: Vec<ImageOutcome>,
}

impl ExtractReport {
    fn empty(status: ExtractStatus) -> Self {
        Self {
            status,
            outcomes: Vec::new(),
        }
    }

    /// Number of descriptors processed
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of files written
    pub fn extracted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_extracted()).count()
    }

    /// Number of descriptors that failed
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    /// Descriptor indices that failed, in container order
    pub fn failed_indices(&self) -> Vec<usize> {
        self.outcomes
            .iter()
            .filter(|o| o.is_failed())
            .map(ImageOutcome::index)
            .collect()
    }

    /// Paths of the files written
    pub fn written_paths(&self) -> impl Iterator<Item = &Path> {
        self.outcomes.iter().filter_map(|o| match o {
            ImageOutcome::Extracted { path, .. } => Some(path.as_path()),
            _ => None,
        })
    }
}

/// Name of the file written for descriptor `index`
pub fn texture_file_name(index: usize, extension: &str) -> String {
    format!("texture_{}.{}", index, extension)
}

/// Opens the configured container and extracts its textures
pub fn extract_textures(config: &ExtractConfig) -> Result<ExtractReport> {
    info!("Loading container: {}", config.container.display());
    let container = GltfContainer::open(&config.container)?;
    extract_from_container(&container, &config.output_dir)
}

/// Extracts the textures of an already parsed container
pub fn extract_from_container(
    container: &GltfContainer,
    output_dir: &Path,
) -> Result<ExtractReport> {
    fs::create_dir_all(output_dir)?;

    let document = &container.document;
    if document.buffers.is_empty() {
        info!("No buffers found in the container");
        return Ok(ExtractReport::empty(ExtractStatus::NoBuffers));
    }
    if document.images.is_empty() {
        info!("No images found in the container");
        return Ok(ExtractReport::empty(ExtractStatus::NoImages));
    }

    info!("Found {} images in the container", document.images.len());

    let outcomes: Vec<ImageOutcome> = document
        .images
        .iter()
        .enumerate()
        .map(|(index, image)| {
            let outcome = extract_image(container, index, image, output_dir);
            log_outcome(&outcome);
            outcome
        })
        .collect();

    let report = ExtractReport {
        status: ExtractStatus::Completed,
        outcomes,
    };
    info!(
        "Texture extraction complete: {} of {} images written to {}",
        report.extracted(),
        report.attempted(),
        output_dir.display()
    );

    Ok(report)
}

/// Bytes and naming information for one image
enum Resolution<'a> {
    Payload {
        data: Cow<'a, [u8]>,
        extension: &'a str,
        source: PayloadSource,
    },
    External(&'a str),
    Unresolved,
}

fn resolve<'a>(container: &'a GltfContainer, image: &'a Image) -> Result<Resolution<'a>> {
    match image.source() {
        ImageSource::DataUri(uri) => {
            let data_uri = DataUri::parse(uri)?;
            Ok(Resolution::Payload {
                data: Cow::Owned(data_uri.decode()?),
                extension: data_uri.extension(),
                source: PayloadSource::DataUri,
            })
        }
        ImageSource::External(uri) => Ok(Resolution::External(uri)),
        ImageSource::BufferView(view_index) => {
            let view = container.document.buffer_view(view_index)?;
            let buffer = container.buffer_data(view.buffer)?;
            let data = slice_view(buffer, view)?;
            Ok(Resolution::Payload {
                data,
                extension: extension_for_mime(image.mime_type.as_deref()),
                source: PayloadSource::BufferView(view_index),
            })
        }
        ImageSource::Unresolved => Ok(Resolution::Unresolved),
    }
}

/// Payload bytes and output extension of an image, `None` when the image
/// carries no embedded bytes
pub(crate) fn payload<'a>(
    container: &'a GltfContainer,
    image: &'a Image,
) -> Result<Option<(Cow<'a, [u8]>, &'a str)>> {
    Ok(match resolve(container, image)? {
        Resolution::Payload {
            data, extension, ..
        } => Some((data, extension)),
        Resolution::External(_) | Resolution::Unresolved => None,
    })
}

fn slice_view<'a>(buffer: Cow<'a, [u8]>, view: &BufferView) -> Result<Cow<'a, [u8]>> {
    let size = buffer.len();
    let offset = view.byte_offset;
    let end = view
        .end()
        .filter(|end| *end <= size)
        .ok_or(crate::Error::BufferViewOutOfBounds {
            offset,
            end: offset.saturating_add(view.byte_length),
            size,
        })?;

    Ok(match buffer {
        Cow::Borrowed(bytes) => Cow::Borrowed(&bytes[offset..end]),
        Cow::Owned(bytes) => Cow::Owned(bytes[offset..end].to_vec()),
    })
}

fn extract_image(
    container: &GltfContainer,
    index: usize,
    image: &Image,
    output_dir: &Path,
) -> ImageOutcome {
    match resolve(container, image) {
        Ok(Resolution::Payload {
            data,
            extension,
            source,
        }) => {
            let path = output_dir.join(texture_file_name(index, extension));
            match fs::write(&path, &data) {
                Ok(()) => ImageOutcome::Extracted {
                    index,
                    path,
                    bytes: data.len(),
                    source,
                },
                Err(e) => failure(index, e),
            }
        }
        Ok(Resolution::External(uri)) => ImageOutcome::External {
            index,
            uri: uri.to_string(),
        },
        Ok(Resolution::Unresolved) => ImageOutcome::Unresolved { index },
        Err(e) => failure(index, e),
    }
}

fn failure(index: usize, error: impl std::fmt::Display) -> ImageOutcome {
    ImageOutcome::Failed {
        index,
        error: error.to_string(),
    }
}

fn log_outcome(outcome: &ImageOutcome) {
    match outcome {
        ImageOutcome::Extracted {
            path,
            bytes,
            source: PayloadSource::DataUri,
            ..
        } => info!("Extracted {} ({} bytes) from data URI", path.display(), bytes),
        ImageOutcome::Extracted {
            path,
            bytes,
            source: PayloadSource::BufferView(view),
            ..
        } => info!(
            "Extracted {} ({} bytes) from buffer view {}",
            path.display(),
            bytes,
            view
        ),
        ImageOutcome::External { index, uri } => {
            info!("Image {} references external file: {}", index, uri)
        }
        ImageOutcome::Unresolved { index } => {
            warn!("Image {} has neither a URI nor a buffer view, skipping", index)
        }
        ImageOutcome::Failed { index, error } => {
            warn!("Error extracting image {}: {}", index, error)
        }
    }
}
