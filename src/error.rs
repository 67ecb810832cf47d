use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning file bytes into a canvas
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported or corrupt image {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("No HEIF decoder is installed, cannot open {0}")]
    HeifUnavailable(PathBuf),

    #[error("HEIF decoding failed for {path}: {source}")]
    Heif {
        path: PathBuf,
        #[source]
        source: BoxedError,
    },
}

/// Error type plugged-in decoders report through
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while loading an extra font family
#[derive(Debug, Error)]
pub enum FontError {
    #[error("Failed to read font {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a usable font file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ab_glyph::InvalidFont,
    },
}

/// Errors raised while writing a canvas out
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Unsupported output extension: .{0}")]
    UnsupportedExtension(String),

    #[error("Output path has no extension: {0}")]
    MissingExtension(PathBuf),

    #[error("Encoder rejected the image: {0}")]
    Codec(#[from] image::ImageError),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the image store bookkeeping
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No image loaded under {0}")]
    UnknownImage(PathBuf),

    #[error("An image is already loaded under {0}")]
    AlreadyExists(PathBuf),

    #[error("Invalid image name: {0:?}")]
    InvalidName(String),
}

/// Errors raised while reading the editor configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Aggregate error returned by the editor operations
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// An operation that needs a selected image (or tool) was invoked without one
    #[error("No image is selected")]
    MissingSelection,

    /// The source file of an image is gone; only the new size can be reported
    #[error("Source file no longer exists: {0}")]
    SourceFileMissing(PathBuf),
}

pub type EditorResult<T> = Result<T, EditorError>;
