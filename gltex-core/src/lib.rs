//! gltex Core Library
//!
//! This library provides the glTF container reader and the texture tooling
//! built on top of it: extracting embedded images, renaming extracted
//! textures after the materials of a Wavefront material file, and copying
//! them into place.

pub mod container;
pub mod copy;
pub mod data_uri;
pub mod document;
pub mod extract;
pub mod inspect;
pub mod mtl;
pub mod rename;

pub use container::{ContainerForm, GltfContainer};
pub use copy::{copy_textures, CopyConfig};
pub use document::{Buffer, BufferView, Document, Image, ImageSource};
pub use extract::{
    extract_textures, ExtractConfig, ExtractReport, ExtractStatus, ImageOutcome, PayloadSource,
};
pub use inspect::{summarize_images, ImageSummary, SourceKind};
pub use rename::{rename_textures, RenameConfig, RenameReport};

/// Result type for gltex-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for gltex-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Binary glTF error: {0}")]
    Glb(#[from] gltf::Error),

    #[error("Not a glTF container: expected 'glTF' magic or a JSON document")]
    InvalidMagic,

    #[error("Buffer view {0} does not exist")]
    BufferViewNotFound(usize),

    #[error("Buffer {0} does not exist")]
    BufferNotFound(usize),

    #[error("No binary data available for buffer {0}")]
    MissingBufferData(usize),

    #[error("Buffer view range {offset}..{end} exceeds buffer size {size}")]
    BufferViewOutOfBounds { offset: usize, end: usize, size: usize },

    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    #[error("Source directory does not exist: {0}")]
    SourceDirMissing(std::path::PathBuf),
}
