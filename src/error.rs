//! All error types for the xliff2json crate.
//!
//! These are returned from all fallible operations (parsing, flattening, rendering, etc.).
//! Translation units that do not match the destination bundle are not errors; they are
//! skipped and reported through `tracing` instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("malformed xliff: {0}")]
    MalformedXliff(String),

    #[error("max depth exceeded: nesting deeper than {0} levels")]
    MaxDepthExceeded(usize),

    #[error("template error: {0}")]
    Template(String),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a new invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput(message.into())
    }

    /// Creates a new malformed document error
    pub fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedXliff(message.into())
    }
}
