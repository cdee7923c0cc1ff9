use std::fmt;
use std::io;

/// Errors from the host side of the application: config files, presets, exports.
///
/// The simulation itself never fails; everything here is file or encoder I/O.
#[derive(Debug)]
pub enum FieldError {
    /// Reading or writing a file failed
    Io(io::Error),
    /// A config or preset file is not valid JSON for the expected type
    Json(serde_json::Error),
    /// PNG encoding failed
    Image(image::ImageError),
    /// GIF encoding failed
    Gif(gif::EncodingError),
    /// The platform has no config directory for user presets
    NoConfigDir,
    /// A requested output size cannot be encoded
    InvalidSize(String),
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Io(e) => write!(f, "File error: {}", e),
            FieldError::Json(e) => write!(f, "Invalid JSON: {}", e),
            FieldError::Image(e) => write!(f, "Failed to encode image: {}", e),
            FieldError::Gif(e) => write!(f, "Failed to encode GIF: {}", e),
            FieldError::NoConfigDir => write!(f, "Could not determine config directory"),
            FieldError::InvalidSize(msg) => write!(f, "Invalid size: {}", msg),
        }
    }
}

impl std::error::Error for FieldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FieldError::Io(e) => Some(e),
            FieldError::Json(e) => Some(e),
            FieldError::Image(e) => Some(e),
            FieldError::Gif(e) => Some(e),
            FieldError::NoConfigDir | FieldError::InvalidSize(_) => None,
        }
    }
}

impl From<io::Error> for FieldError {
    fn from(e: io::Error) -> Self {
        FieldError::Io(e)
    }
}

impl From<serde_json::Error> for FieldError {
    fn from(e: serde_json::Error) -> Self {
        FieldError::Json(e)
    }
}

impl From<image::ImageError> for FieldError {
    fn from(e: image::ImageError) -> Self {
        FieldError::Image(e)
    }
}

impl From<gif::EncodingError> for FieldError {
    fn from(e: gif::EncodingError) -> Self {
        FieldError::Gif(e)
    }
}
