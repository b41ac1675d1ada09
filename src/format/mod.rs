//! Source formats: turning configuration text into a [`Document`] and back.
//!
//! The registry never looks at file syntax itself. It hands text to a
//! [`SourceFormat`] and receives raw strings keyed by section and key.

mod ini;
mod toml_format;

pub use ini::{IniFormat, IniOptions};
pub use toml_format::TomlFormat;

use crate::document::Document;
use thiserror::Error;

/// Errors raised by a source format while parsing or serializing.
#[derive(Debug, Error)]
pub enum FormatError {
    /// A line could not be understood.
    #[error("line {line}: {message}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// An entry appeared before any section header.
    #[error("line {line}: entry appears before any section header")]
    MissingSectionHeader {
        /// 1-based line number.
        line: usize,
    },

    /// A section header was repeated.
    #[error("line {line}: section [{section}] already defined")]
    DuplicateSection {
        /// 1-based line number.
        line: usize,
        /// Repeated section.
        section: String,
    },

    /// A key was repeated inside one section.
    #[error("line {line}: key {key:?} already defined in section [{section}]")]
    DuplicateKey {
        /// 1-based line number.
        line: usize,
        /// Enclosing section.
        section: String,
        /// Repeated key.
        key: String,
    },

    /// Structurally valid input that a flat section/key layout cannot hold.
    #[error("{location}: {reason}")]
    Unsupported {
        /// Dotted path of the offending item.
        location: String,
        /// Why it is rejected.
        reason: &'static str,
    },

    /// TOML syntax error.
    #[error(transparent)]
    TomlSyntax(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error(transparent)]
    TomlWrite(#[from] toml::ser::Error),
}

/// A textual configuration format.
///
/// Implementations must be pure: no I/O, no global state. Reading and
/// writing files is the registry's job.
pub trait SourceFormat {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Reject a section or key name that could not be written and read back
    /// unchanged. Accepts everything by default.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Unsupported`] describing the problem.
    fn check_name(&self, _section: &str, _key: &str) -> Result<(), FormatError> {
        Ok(())
    }

    /// Reject a value whose text could not be written and read back
    /// unchanged. Accepts everything by default.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Unsupported`] describing the problem.
    fn check_value(&self, _section: &str, _key: &str, _value: &str) -> Result<(), FormatError> {
        Ok(())
    }

    /// Parse text into sections of raw string values.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] when the text is not valid for this format.
    fn parse(&self, text: &str) -> Result<Document, FormatError>;

    /// Render a document as text that [`SourceFormat::parse`] reads back
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] when the document cannot be represented.
    fn serialize(&self, document: &Document) -> Result<String, FormatError>;
}
