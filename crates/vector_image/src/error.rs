use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The reasons an SVG document can fail to load.
///
/// Loading either produces a complete image or one of these.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to open {path:?}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("The SVG file is empty")]
    EmptyFile,
    #[error("Failed to read {path:?}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse the SVG document: {0}")]
    Parse(#[from] ParseError),
    #[error("The id of shape #{shape} is not NUL-terminated")]
    CorruptShapeId { shape: usize },
    #[error("Invalid resolution: {dpi} dpi")]
    InvalidResolution { dpi: f32 },
}

/// The SVG parser did not produce a document.
#[derive(Error, Clone, Debug, PartialEq)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
        }
    }
}

#[test]
fn messages() {
    let err = LoadError::CorruptShapeId { shape: 3 };
    assert_eq!(err.to_string(), "The id of shape #3 is not NUL-terminated");

    let err: LoadError = ParseError::new("unexpected end of stream").into();
    assert_eq!(
        err.to_string(),
        "Failed to parse the SVG document: unexpected end of stream"
    );
    assert!(matches!(err, LoadError::Parse(_)));

    let err = LoadError::InvalidResolution { dpi: 0.0 };
    assert_eq!(err.to_string(), "Invalid resolution: 0 dpi");
}
