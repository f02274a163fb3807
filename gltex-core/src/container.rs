//! glTF container parsing and serialization
//!
//! Handles both the binary container (`.glb`: header, JSON chunk, optional
//! BIN chunk) and the plain JSON form (`.gltf`). Binary framing is done by
//! [`gltf::Glb`]; the JSON chunk is read into the lenient [`Document`] so a
//! bad index stays a per-image problem instead of failing the whole parse.

use crate::{Document, Error, Result};
use gltf::binary::Header;
use gltf::Glb;
use std::borrow::Cow;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Magic bytes for binary glTF: "glTF"
const MAGIC: [u8; 4] = *b"glTF";

/// Binary container version written by [`GltfContainer::to_vec`]
const VERSION: u32 = 2;

/// Which on-disk form a container was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerForm {
    /// `.glb` with a binary header and chunks
    Binary,
    /// `.gltf` plain JSON
    Text,
}

/// A parsed glTF container
#[derive(Debug, Clone)]
pub struct GltfContainer {
    /// Form the container was read from
    pub form: ContainerForm,
    /// Scene description
    pub document: Document,
    /// Embedded binary section, at most one per container
    pub bin: Option<Vec<u8>>,
    /// Directory relative buffer URIs are resolved against
    pub base_dir: Option<PathBuf>,
}

impl GltfContainer {
    /// Creates a new binary container
    pub fn new(document: Document, bin: Option<Vec<u8>>) -> Self {
        Self {
            form: ContainerForm::Binary,
            document,
            bin,
            base_dir: None,
        }
    }

    /// Opens and parses a container file.
    ///
    /// Relative buffer URIs will be resolved against the file's directory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let mut container = Self::from_bytes(&bytes)?;
        container.base_dir = path.parent().map(Path::to_path_buf);
        Ok(container)
    }

    /// Reads a container from a reader
    pub fn read<R: Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    /// Parses a container from memory, detecting its form
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.starts_with(&MAGIC) {
            let glb = Glb::from_slice(bytes)?;
            return Ok(Self {
                form: ContainerForm::Binary,
                document: Document::from_slice(&glb.json)?,
                bin: glb.bin.map(Cow::into_owned),
                base_dir: None,
            });
        }

        let looks_like_json = bytes
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|b| *b == b'{');
        if !looks_like_json {
            return Err(Error::InvalidMagic);
        }

        Ok(Self {
            form: ContainerForm::Text,
            document: Document::from_slice(bytes)?,
            bin: None,
            base_dir: None,
        })
    }

    /// Serializes the container in binary form
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let glb = Glb {
            header: Header {
                magic: MAGIC,
                version: VERSION,
                // recomputed by the writer
                length: 0,
            },
            json: Cow::Owned(self.document.to_vec()?),
            bin: self.bin.as_deref().map(Cow::Borrowed),
        };
        Ok(glb.to_vec()?)
    }

    /// Writes the container in binary form
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.to_vec()?)?;
        Ok(())
    }

    /// Returns the raw bytes of a buffer.
    ///
    /// A buffer without a URI is backed by the embedded binary section. A
    /// `data:` URI is decoded in place, any other URI is read relative to
    /// the container's directory.
    pub fn buffer_data(&self, index: usize) -> Result<Cow<'_, [u8]>> {
        let buffer = self.document.buffer(index)?;

        match buffer.uri.as_deref() {
            Some(uri) if !uri.is_empty() => {
                if uri.starts_with("data:") {
                    Ok(Cow::Owned(crate::data_uri::DataUri::parse(uri)?.decode()?))
                } else {
                    let path = match &self.base_dir {
                        Some(dir) => dir.join(uri),
                        None => PathBuf::from(uri),
                    };
                    Ok(Cow::Owned(fs::read(path)?))
                }
            }
            _ => self
                .bin
                .as_deref()
                .map(Cow::Borrowed)
                .ok_or(Error::MissingBufferData(index)),
        }
    }

    /// Size of the embedded binary section in bytes
    pub fn bin_len(&self) -> usize {
        self.bin.as_ref().map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Buffer, BufferView, Image};

    fn sample_container() -> GltfContainer {
        let document = Document {
            buffers: vec![Buffer {
                uri: None,
                byte_length: 6,
            }],
            buffer_views: vec![BufferView::new(0, 2, 3)],
            images: vec![Image::with_buffer_view(0, Some("image/png"))],
            ..Document::default()
        };
        GltfContainer::new(document, Some(vec![1, 2, 3, 4, 5, 6]))
    }

    /// Hand-assembles a binary container from raw chunks
    fn raw_glb(version: u32, chunks: &[(&[u8; 4], &[u8])]) -> Vec<u8> {
        let body_len: usize = chunks.iter().map(|(_, data)| 8 + data.len()).sum();
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&MAGIC);
        buffer.extend_from_slice(&version.to_le_bytes());
        buffer.extend_from_slice(&((12 + body_len) as u32).to_le_bytes());
        for (kind, data) in chunks {
            buffer.extend_from_slice(&(data.len() as u32).to_le_bytes());
            buffer.extend_from_slice(*kind);
            buffer.extend_from_slice(data);
        }
        buffer
    }

    #[test]
    fn test_rejects_version_one() {
        let buffer = raw_glb(1, &[(b"JSON", b"{}  " as &[u8])]);
        assert!(matches!(
            GltfContainer::from_bytes(&buffer),
            Err(Error::Glb(_))
        ));
    }

    #[test]
    fn test_hand_assembled_container_is_readable() {
        let buffer = raw_glb(
            2,
            &[
                (b"JSON", br#"{"images":[{}]} "# as &[u8]),
                (b"BIN\0", &[7u8, 7, 7, 7][..]),
            ],
        );
        let container = GltfContainer::from_bytes(&buffer).unwrap();

        assert_eq!(container.document.images.len(), 1);
        assert_eq!(container.bin.as_deref(), Some(&[7, 7, 7, 7][..]));
    }

    #[test]
    fn test_written_container_is_aligned_and_readable() {
        let container = sample_container();

        let mut buffer = Vec::new();
        container.write(&mut buffer).unwrap();

        assert_eq!(buffer.len() % 4, 0);
        assert_eq!(&buffer[0..4], b"glTF");
        assert_eq!(
            u32::from_le_bytes(buffer[8..12].try_into().unwrap()) as usize,
            buffer.len()
        );

        let read = GltfContainer::read(std::io::Cursor::new(buffer)).unwrap();
        assert_eq!(read.form, ContainerForm::Binary);
        assert_eq!(read.document.images.len(), 1);
        assert_eq!(read.document.buffer_views[0].byte_offset, 2);
        assert_eq!(
            read.bin.as_deref().map(|b| &b[..6]),
            Some(&[1, 2, 3, 4, 5, 6][..])
        );
    }

    #[test]
    fn test_container_without_bin_chunk() {
        let container = GltfContainer::new(Document::default(), None);
        let buffer = container.to_vec().unwrap();

        let read = GltfContainer::from_bytes(&buffer).unwrap();
        assert!(read.bin.is_none());
        assert_eq!(read.bin_len(), 0);
    }

    #[test]
    fn test_truncated_file_is_fatal() {
        let mut buffer = sample_container().to_vec().unwrap();
        buffer.truncate(buffer.len() - 4);

        assert!(matches!(
            GltfContainer::from_bytes(&buffer),
            Err(Error::Glb(_))
        ));
    }

    #[test]
    fn test_bin_before_json_is_rejected() {
        let buffer = raw_glb(2, &[(b"BIN\0", &[0u8, 0, 0, 0][..])]);
        assert!(matches!(
            GltfContainer::from_bytes(&buffer),
            Err(Error::Glb(_))
        ));
    }

    #[test]
    fn test_bad_index_does_not_fail_parse() {
        let json = br#"{"images":[{"bufferView":9}]}   "#;
        let buffer = raw_glb(2, &[(b"JSON", json as &[u8])]);
        let container = GltfContainer::from_bytes(&buffer).unwrap();
        assert_eq!(container.document.images[0].buffer_view, Some(9));
    }

    #[test]
    fn test_text_form_is_parsed_as_json() {
        let json = br#"  {"asset":{"version":"2.0"},"images":[{"uri":"wall.png"}]}"#;
        let container = GltfContainer::from_bytes(json).unwrap();

        assert_eq!(container.form, ContainerForm::Text);
        assert!(container.bin.is_none());
        assert_eq!(container.document.images[0].uri.as_deref(), Some("wall.png"));
    }

    #[test]
    fn test_garbage_is_invalid_magic() {
        assert!(matches!(
            GltfContainer::from_bytes(b"not a model"),
            Err(Error::InvalidMagic)
        ));
    }

    #[test]
    fn test_buffer_data_sources() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("external.bin"), [9u8, 8, 7]).unwrap();

        let document = Document {
            buffers: vec![
                Buffer::default(),
                Buffer {
                    uri: Some("data:application/octet-stream;base64,AQID".to_string()),
                    byte_length: 3,
                },
                Buffer {
                    uri: Some("external.bin".to_string()),
                    byte_length: 3,
                },
            ],
            ..Document::default()
        };
        let mut container = GltfContainer::new(document, Some(vec![4, 5]));
        container.base_dir = Some(dir.path().to_path_buf());

        assert_eq!(container.buffer_data(0).unwrap(), vec![4, 5]);
        assert_eq!(container.buffer_data(1).unwrap(), vec![1, 2, 3]);
        assert_eq!(container.buffer_data(2).unwrap(), vec![9, 8, 7]);
        assert!(matches!(
            container.buffer_data(3),
            Err(Error::BufferNotFound(3))
        ));

        container.bin = None;
        assert!(matches!(
            container.buffer_data(0),
            Err(Error::MissingBufferData(0))
        ));
    }
}
