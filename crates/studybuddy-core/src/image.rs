//! Image references for vision requests.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine;

/// An image to send to a vision provider.
#[derive(Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// An `http://` or `https://` URL the provider fetches itself.
    Remote(String),
    /// Image bytes sent inline.
    Inline { bytes: Vec<u8>, media_type: String },
}

impl ImageRef {
    /// Build a reference from user input: URLs stay remote, anything else is
    /// read from disk.
    pub fn from_input(input: &str) -> Result<Self> {
        if is_remote(input) {
            Ok(ImageRef::Remote(input.to_string()))
        } else {
            Self::from_path(Path::new(input))
        }
    }

    /// Read a local image file. The media type is taken from the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read image: {}", path.display()))?;
        Ok(ImageRef::Inline {
            bytes,
            media_type: media_type_for(path).to_string(),
        })
    }

    pub fn inline(bytes: Vec<u8>, media_type: &str) -> Self {
        ImageRef::Inline {
            bytes,
            media_type: media_type.to_string(),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, ImageRef::Remote(_))
    }

    /// The URL to put in an `image_url` content part: the remote URL as-is,
    /// or a base64 `data:` URL for inline bytes.
    pub fn to_url(&self) -> String {
        match self {
            ImageRef::Remote(url) => url.clone(),
            ImageRef::Inline { bytes, media_type } => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
                format!("data:{media_type};base64,{encoded}")
            }
        }
    }
}

impl fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRef::Remote(url) => f.debug_tuple("Remote").field(url).finish(),
            ImageRef::Inline { bytes, media_type } => f
                .debug_struct("Inline")
                .field("bytes", &format_args!("{} bytes", bytes.len()))
                .field("media_type", media_type)
                .finish(),
        }
    }
}

/// Returns true for `http://` and `https://` locations.
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}
