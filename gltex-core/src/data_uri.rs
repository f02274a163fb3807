//! `data:` URI decoding and file extension selection

use crate::{Error, Result};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;

/// Extension used when nothing better is known
pub const FALLBACK_EXTENSION: &str = "bin";

/// Standard alphabet, tolerating non-zero trailing bits in the last symbol
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// A `data:` URI split into its header and payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUri<'a> {
    /// Everything before the first comma, e.g. `data:image/png;base64`
    pub header: &'a str,
    /// Everything after the first comma
    pub payload: &'a str,
}

impl<'a> DataUri<'a> {
    /// Splits a `data:` URI on its first comma
    pub fn parse(uri: &'a str) -> Result<Self> {
        if !uri.starts_with("data:") {
            return Err(Error::InvalidDataUri("missing 'data:' prefix".to_string()));
        }
        let (header, payload) = uri
            .split_once(',')
            .ok_or_else(|| Error::InvalidDataUri("missing ',' separator".to_string()))?;
        Ok(Self { header, payload })
    }

    /// MIME subtype named by the header: the text after the last `/` and
    /// before any `;`
    pub fn subtype(&self) -> &'a str {
        let after_slash = self.header.rsplit('/').next().unwrap_or(self.header);
        after_slash.split(';').next().unwrap_or(after_slash)
    }

    /// File extension for the payload, falling back to `bin` when the
    /// subtype is empty or not usable as a file name component
    pub fn extension(&self) -> &'a str {
        let subtype = self.subtype();
        if is_safe_extension(subtype) && self.header.contains('/') {
            subtype
        } else {
            FALLBACK_EXTENSION
        }
    }

    /// Decodes the base64 payload.
    ///
    /// Characters outside the base64 alphabet, such as the line breaks of a
    /// wrapped payload, are discarded before decoding.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let symbols: Vec<u8> = self
            .payload
            .bytes()
            .filter(|b| b.is_ascii_alphanumeric() || matches!(*b, b'+' | b'/' | b'='))
            .collect();
        Ok(LENIENT.decode(symbols)?)
    }
}

/// Maps an image MIME type to the extension used for buffer view payloads
pub fn extension_for_mime(mime_type: Option<&str>) -> &'static str {
    match mime_type {
        Some("image/jpeg") => "jpg",
        Some("image/png") => "png",
        Some("image/webp") => "webp",
        _ => FALLBACK_EXTENSION,
    }
}

fn is_safe_extension(ext: &str) -> bool {
    !ext.is_empty()
        && ext
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && !ext.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::prelude::*;

    #[test]
    fn test_png_data_uri() {
        let payload = BASE64_STANDARD.encode([0x89, b'P', b'N', b'G', 1, 2, 3]);
        let uri = format!("data:image/png;base64,{}", payload);

        let data = DataUri::parse(&uri).unwrap();

        assert_eq!(data.header, "data:image/png;base64");
        assert_eq!(data.extension(), "png");
        assert_eq!(data.decode().unwrap(), BASE64_STANDARD.decode(&payload).unwrap());
    }

    #[test]
    fn test_jpeg_subtype_is_kept_verbatim() {
        let data = DataUri::parse("data:image/jpeg;base64,AAAA").unwrap();
        assert_eq!(data.extension(), "jpeg");
    }

    #[test]
    fn test_payload_split_on_first_comma_only() {
        let data = DataUri::parse("data:text/plain,a,b").unwrap();
        assert_eq!(data.payload, "a,b");
        assert_eq!(data.subtype(), "plain");
    }

    #[test]
    fn test_header_without_mime_falls_back() {
        let data = DataUri::parse("data:;base64,AAAA").unwrap();
        assert_eq!(data.extension(), FALLBACK_EXTENSION);
    }

    #[test]
    fn test_missing_comma_is_invalid() {
        assert!(matches!(
            DataUri::parse("data:image/png;base64"),
            Err(Error::InvalidDataUri(_))
        ));
    }

    #[test]
    fn test_wrapped_payload_is_decoded() {
        let data = DataUri::parse("data:image/png;base64,YWJj\nZA==").unwrap();
        assert_eq!(data.decode().unwrap(), b"abcd");

        let data = DataUri::parse("data:image/png;base64,YW\r\nJj ZA==\n").unwrap();
        assert_eq!(data.decode().unwrap(), b"abcd");
    }

    #[test]
    fn test_trailing_bits_are_tolerated() {
        let data = DataUri::parse("data:image/png;base64,YR==").unwrap();
        assert_eq!(data.decode().unwrap(), b"a");
    }

    #[test]
    fn test_missing_padding_is_error() {
        let data = DataUri::parse("data:image/png;base64,YWJ").unwrap();
        assert!(matches!(data.decode(), Err(Error::Base64(_))));
    }

    #[test]
    fn test_extension_for_mime() {
        assert_eq!(extension_for_mime(Some("image/jpeg")), "jpg");
        assert_eq!(extension_for_mime(Some("image/png")), "png");
        assert_eq!(extension_for_mime(Some("image/webp")), "webp");
        assert_eq!(extension_for_mime(Some("image/ktx2")), "bin");
        assert_eq!(extension_for_mime(None), "bin");
    }
}
