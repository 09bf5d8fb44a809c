//! Inline image data (`data:<mime>;base64,<payload>`) and image sources

use crate::core::error::{Result, VisionError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;
use std::path::Path;

/// A base64 data URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: String,
    /// Base64 payload, not decoded
    pub data: String,
}

impl DataUri {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Parse `data:<mime>;base64,<payload>`
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| VisionError::InvalidDataUri("missing 'data:' prefix".into()))?;
        let (mime_type, data) = rest
            .split_once(";base64,")
            .ok_or_else(|| VisionError::InvalidDataUri("expected ';base64,' encoding".into()))?;
        if mime_type.is_empty() {
            return Err(VisionError::InvalidDataUri("missing MIME type".into()));
        }
        if data.is_empty() {
            return Err(VisionError::InvalidDataUri("empty payload".into()));
        }
        Ok(Self::new(mime_type, data))
    }

    /// Encode raw bytes
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self::new(mime_type, STANDARD.encode(bytes))
    }

    /// Encode image bytes, sniffing the MIME type from their content
    pub fn from_image_bytes(bytes: &[u8]) -> Result<Self> {
        let format = image::guess_format(bytes)
            .map_err(|e| VisionError::InvalidDataUri(format!("unrecognized image: {}", e)))?;
        let mime_type = image_mime_type(format)
            .ok_or_else(|| VisionError::InvalidDataUri(format!("unsupported image format {:?}", format)))?;
        Ok(Self::from_bytes(mime_type, bytes))
    }

    /// Read an image file into a data URI
    pub fn from_image_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_image_bytes(&bytes)
    }

    /// Decode the payload
    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| VisionError::InvalidDataUri(e.to_string()))
    }

    /// File extension for the MIME type (`image/png` -> `png`)
    pub fn extension(&self) -> &str {
        match self.mime_type.as_str() {
            "image/jpeg" => "jpg",
            other => other.rsplit('/').next().unwrap_or("bin"),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.data)
    }
}

fn image_mime_type(format: image::ImageFormat) -> Option<&'static str> {
    use image::ImageFormat;
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::Bmp => Some("image/bmp"),
        ImageFormat::Tiff => Some("image/tiff"),
        _ => None,
    }
}

/// Where an input image comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Inline(DataUri),
    /// http(s) URL, fetched before it is sent to the model
    Remote(String),
}

impl ImageSource {
    /// Accept a data URI or an http(s) URL
    pub fn parse(source: &str) -> Result<Self> {
        if source.starts_with("data:") {
            Ok(Self::Inline(DataUri::parse(source)?))
        } else if source.starts_with("https://") || source.starts_with("http://") {
            Ok(Self::Remote(source.to_string()))
        } else {
            Err(VisionError::InvalidDataUri(format!(
                "expected a data URI or http(s) URL, got '{}'",
                source
            )))
        }
    }
}

impl From<DataUri> for ImageSource {
    fn from(uri: DataUri) -> Self {
        Self::Inline(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const PNG_1X1: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89,
    ];

    #[test]
    fn test_parse_and_display() {
        let uri = DataUri::parse("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(uri.mime_type, "image/png");
        assert_eq!(uri.data, "iVBORw0KGgo=");
        assert!(uri.is_image());
        assert_eq!(uri.to_string(), "data:image/png;base64,iVBORw0KGgo=");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(DataUri::parse("image/png;base64,AAAA").is_err());
        assert!(DataUri::parse("data:image/png,AAAA").is_err());
        assert!(DataUri::parse("data:;base64,AAAA").is_err());
        assert!(DataUri::parse("data:image/png;base64,").is_err());
    }

    #[test]
    fn test_from_bytes() {
        let uri = DataUri::from_bytes("text/plain", b"hi");
        assert_eq!(uri.data, "aGk=");
        assert!(!uri.is_image());
    }

    #[test]
    fn test_decode_and_extension() {
        let uri = DataUri::parse("data:image/jpeg;base64,aGk=").unwrap();
        assert_eq!(uri.decode().unwrap(), b"hi");
        assert_eq!(uri.extension(), "jpg");
        assert_eq!(DataUri::new("image/png", "AA==").extension(), "png");
        assert!(DataUri::new("image/png", "not base64!").decode().is_err());
    }

    #[test]
    fn test_from_image_bytes_sniffs_png() {
        let uri = DataUri::from_image_bytes(PNG_1X1).unwrap();
        assert_eq!(uri.mime_type, "image/png");
    }

    #[test]
    fn test_from_image_bytes_rejects_text() {
        assert!(DataUri::from_image_bytes(b"definitely not an image").is_err());
    }

    #[test]
    fn test_image_source_parse() {
        assert!(matches!(
            ImageSource::parse("https://example.com/tile.jpg").unwrap(),
            ImageSource::Remote(_)
        ));
        assert!(matches!(
            ImageSource::parse("data:image/jpeg;base64,/9j/").unwrap(),
            ImageSource::Inline(_)
        ));
        assert!(ImageSource::parse("/tmp/room.jpg").is_err());
    }
}
