//! Error types for shiori operations.

use thiserror::Error;

/// Errors that can occur while opening a package or assembling its chapters.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid EPUB: {0}")]
    InvalidEpub(String),

    #[error("Missing required element: {0}")]
    MissingElement(String),

    #[error("No readable chapters found in EPUB")]
    NoReadableContent,

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid heading pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl Error {
    /// True when the package itself could not be opened (container, OPF or archive problems).
    pub fn is_package_error(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::Zip(_)
                | Error::Xml(_)
                | Error::InvalidEpub(_)
                | Error::MissingElement(_)
                | Error::Utf8(_)
        )
    }

    /// True when the package opened fine but produced zero chapters.
    pub fn is_empty_book(&self) -> bool {
        matches!(self, Error::NoReadableContent)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
