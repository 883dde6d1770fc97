//! Error types for structure model and layout operations.

use thiserror::Error;

/// Errors that abort building a structure model or parsing a layout.
///
/// Referential gaps (a structure link to an unknown page, a range endpoint
/// missing from a page layout) are not errors; they are logged and skipped.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("XML escape error: {0}")]
    XmlEscape(#[from] quick_xml::escape::EscapeError),

    #[error("Missing required element: {0}")]
    MissingElement(String),

    #[error("Missing file group: {0}")]
    MissingFileGroup(String),

    #[error("Unsupported reference type `{kind}` in chapter `{chapter}` (only IDREF is supported)")]
    UnsupportedReference { chapter: String, kind: String },

    #[error("Duplicate chapter id: {0}")]
    DuplicateChapter(String),

    #[error("Invalid value `{value}` for attribute {name} on <{element}>")]
    InvalidAttribute {
        element: String,
        name: String,
        value: String,
    },

    #[error("Invalid page range: {0}")]
    InvalidRange(String),
}

pub type Result<T> = std::result::Result<T, Error>;
