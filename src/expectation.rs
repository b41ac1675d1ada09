//! A single declared configuration slot.

use crate::value::{DataType, Value};
use std::fmt;

/// One declared (section, key) slot with its type, default and current value.
///
/// Expectations are owned by the registry. Callers only ever see shared
/// references, so the stored value can change only through the registry's
/// type-checked operations.
#[derive(Debug, Clone, PartialEq)]
pub struct Expectation {
    section: String,
    key: String,
    data_type: DataType,
    default: Value,
    value: Option<Value>,
    description: Option<String>,
}

impl Expectation {
    /// Build an expectation whose default has already been converted to
    /// `data_type`.
    pub(crate) fn new(
        section: String,
        key: String,
        data_type: DataType,
        default: Value,
        description: Option<String>,
    ) -> Self {
        debug_assert_eq!(default.data_type(), data_type);
        Self {
            section,
            key,
            data_type,
            default,
            value: None,
            description,
        }
    }

    /// Section name, as registered.
    #[inline]
    #[must_use]
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Key name, lower-case.
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Declared data type.
    #[inline]
    #[must_use]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Declared default, already of the declared type.
    #[inline]
    #[must_use]
    pub fn default(&self) -> &Value {
        &self.default
    }

    /// Current value; `None` until the first load attempt.
    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Current value, or the default while still unset.
    #[inline]
    #[must_use]
    pub fn effective_value(&self) -> &Value {
        self.value.as_ref().unwrap_or(&self.default)
    }

    /// Free-text annotation.
    #[inline]
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[inline]
    pub(crate) fn matches(&self, section: &str, key: &str) -> bool {
        self.section == section && self.key == key
    }

    #[inline]
    pub(crate) fn is_unset(&self) -> bool {
        self.value.is_none()
    }

    pub(crate) fn clear(&mut self) {
        self.value = None;
    }

    pub(crate) fn apply_default(&mut self) {
        self.value = Some(self.default.clone());
    }

    /// Store `value`, returning the previous one.
    pub(crate) fn replace(&mut self, value: Value) -> Option<Value> {
        debug_assert_eq!(value.data_type(), self.data_type);
        self.value.replace(value)
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Section:\t{}", self.section)?;
        writeln!(f, "Key:\t\t{}", self.key)?;
        writeln!(f, "Data Type:\t{}", self.data_type)?;
        match &self.value {
            Some(value) => writeln!(f, "Value:\t\t{value}")?,
            None => writeln!(f, "Value:\t\t(unset)")?,
        }
        write!(f, "Default Value:\t{}", self.default)?;
        if let Some(description) = &self.description {
            write!(f, "\nDescription:\t{description}")?;
        }
        Ok(())
    }
}
