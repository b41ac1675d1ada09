//! Centralized error definitions for config-expect.
//!
//! Every registry operation reports failure through [`ExpectationError`].
//! None of these errors leaves the registry in an unusable state: a rejected
//! registration or update changes nothing, and a failed load has already
//! applied defaults by the time the error is returned. Per-field coercion
//! failures are not errors at all; they surface in
//! [`LoadReport`](crate::LoadReport).

use crate::format::FormatError;
use crate::value::DataType;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ExpectationError>;

/// Semantic grouping of errors, mirroring the operation that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Declaring an expectation was refused.
    Registration,
    /// The configuration source could not be opened or parsed.
    Load,
    /// Updating a value was refused.
    Mutation,
    /// Writing the effective configuration failed.
    Write,
}

/// Errors produced by the expectation registry and its collaborators.
#[derive(Debug, Error)]
pub enum ExpectationError {
    // ========================================================================
    // REGISTRATION
    // ========================================================================
    /// Section name was empty.
    #[error("section name cannot be empty")]
    EmptySection,

    /// Key name was empty.
    #[error("key in section [{section}] cannot be empty")]
    EmptyKey {
        /// Section the key was declared in.
        section: String,
    },

    /// The active format cannot write this section or key and read it back.
    #[error("[{section}] {key} cannot be stored: {reason}")]
    InvalidName {
        /// Section of the rejected expectation.
        section: String,
        /// Key of the rejected expectation.
        key: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Declared default does not convert to the declared data type.
    #[error("default {default} for [{section}] {key} is not a valid {expected}")]
    DefaultTypeMismatch {
        /// Section of the rejected expectation.
        section: String,
        /// Key of the rejected expectation.
        key: String,
        /// Declared data type.
        expected: DataType,
        /// Rendered default that was offered.
        default: String,
    },

    /// The active format cannot write the default and read it back unchanged.
    #[error("default for [{section}] {key} cannot be stored: {reason}")]
    DefaultNotStorable {
        /// Section of the rejected expectation.
        section: String,
        /// Key of the rejected expectation.
        key: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The (section, key) pair is already registered.
    #[error("expectation [{section}] {key} is already registered")]
    DuplicateExpectation {
        /// Section of the duplicate pair.
        section: String,
        /// Key of the duplicate pair.
        key: String,
    },

    /// A data type name outside the supported set.
    #[error("unknown data type {0:?} (expected integer, float, boolean or string)")]
    UnknownDataType(String),

    // ========================================================================
    // LOAD
    // ========================================================================
    /// Load was requested before anything was registered.
    #[error("no expectations registered")]
    NoExpectations,

    /// The source path does not exist.
    #[error("configuration source {} does not exist", path.display())]
    SourceMissing {
        /// Requested source.
        path: PathBuf,
    },

    /// The source exists but could not be read.
    #[error("configuration source {} could not be read: {source}", path.display())]
    SourceUnreadable {
        /// Requested source.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The source parsed but contains no sections.
    #[error("configuration source {origin} contains no sections")]
    SourceEmpty {
        /// Path or in-memory label of the source.
        origin: String,
    },

    /// The source is not valid for the configured format.
    #[error("configuration source {origin} is malformed: {source}")]
    SourceMalformed {
        /// Path or in-memory label of the source.
        origin: String,
        /// Parser diagnostic.
        source: FormatError,
    },

    // ========================================================================
    // MUTATION
    // ========================================================================
    /// `set_value` was called before any load attempt.
    #[error("registry is not ready: no load has been attempted")]
    NotReady,

    /// No expectation matches the (section, key) pair.
    #[error("no expectation registered for [{section}] {key}")]
    UnknownExpectation {
        /// Requested section.
        section: String,
        /// Requested key.
        key: String,
    },

    /// New value does not convert to the expectation's data type.
    #[error("value {value} for [{section}] {key} is not a valid {expected}")]
    ValueTypeMismatch {
        /// Section of the target expectation.
        section: String,
        /// Key of the target expectation.
        key: String,
        /// Declared data type.
        expected: DataType,
        /// Rendered value that was offered.
        value: String,
    },

    /// The active format cannot write the new value and read it back
    /// unchanged.
    #[error("value for [{section}] {key} cannot be stored: {reason}")]
    ValueNotStorable {
        /// Section of the target expectation.
        section: String,
        /// Key of the target expectation.
        key: String,
        /// What is wrong with it.
        reason: String,
    },

    // ========================================================================
    // WRITE
    // ========================================================================
    /// Write-back was requested before anything was registered.
    #[error("no expectations registered; nothing to write")]
    NothingToWrite,

    /// No destination given and no file was successfully loaded before.
    #[error("no destination given and no configuration file has been loaded")]
    NoDestination,

    /// Destination (or its directory) is not writable.
    #[error("permission denied writing {}", path.display())]
    WritePermissionDenied {
        /// Requested destination.
        path: PathBuf,
    },

    /// Any other I/O failure while writing.
    #[error("failed to write {}: {source}", path.display())]
    WriteFailed {
        /// Requested destination.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The format could not represent the current values.
    #[error("failed to serialize configuration: {0}")]
    SerializeFailed(#[source] FormatError),
}

impl ExpectationError {
    /// Semantic category of this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptySection
            | Self::EmptyKey { .. }
            | Self::InvalidName { .. }
            | Self::DefaultTypeMismatch { .. }
            | Self::DefaultNotStorable { .. }
            | Self::DuplicateExpectation { .. }
            | Self::UnknownDataType(_) => ErrorCategory::Registration,
            Self::NoExpectations
            | Self::SourceMissing { .. }
            | Self::SourceUnreadable { .. }
            | Self::SourceEmpty { .. }
            | Self::SourceMalformed { .. } => ErrorCategory::Load,
            Self::NotReady
            | Self::UnknownExpectation { .. }
            | Self::ValueTypeMismatch { .. }
            | Self::ValueNotStorable { .. } => ErrorCategory::Mutation,
            Self::NothingToWrite
            | Self::NoDestination
            | Self::WritePermissionDenied { .. }
            | Self::WriteFailed { .. }
            | Self::SerializeFailed(_) => ErrorCategory::Write,
        }
    }
}

// ============================================================================
// ERROR CONSTRUCTION HELPERS
// ============================================================================

/// Map an I/O error from reading a source.
#[inline]
pub(crate) fn read_error(path: &Path, error: std::io::Error) -> ExpectationError {
    if error.kind() == std::io::ErrorKind::NotFound {
        ExpectationError::SourceMissing {
            path: path.to_path_buf(),
        }
    } else {
        ExpectationError::SourceUnreadable {
            path: path.to_path_buf(),
            source: error,
        }
    }
}

/// Map an I/O error from writing a destination.
#[inline]
pub(crate) fn write_error(path: &Path, error: std::io::Error) -> ExpectationError {
    if error.kind() == std::io::ErrorKind::PermissionDenied {
        ExpectationError::WritePermissionDenied {
            path: path.to_path_buf(),
        }
    } else {
        ExpectationError::WriteFailed {
            path: path.to_path_buf(),
            source: error,
        }
    }
}

/// Reject a section or key name.
#[inline]
pub(crate) fn invalid_name(section: &str, key: &str, reason: impl Into<String>) -> ExpectationError {
    ExpectationError::InvalidName {
        section: section.to_owned(),
        key: key.to_owned(),
        reason: reason.into(),
    }
}
