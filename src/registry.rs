//! The expectation registry: declare slots, load a source, read and update
//! typed values, write the effective configuration back.
//!
//! # Lifecycle
//!
//! 1. [`register`](ExpectationRegistry::register) every slot the program
//!    needs. Nothing is read yet.
//! 2. [`load_from`](ExpectationRegistry::load_from) a file. Matching entries
//!    are coerced to their declared type; anything absent or unconvertible
//!    takes its default. Defaults are applied even when the file is missing
//!    or malformed, in which case the call still returns `Err` so the caller
//!    can tell "ran with a file" from "ran on defaults".
//! 3. Read with [`get_value`](ExpectationRegistry::get_value) and friends,
//!    update with [`set_value`](ExpectationRegistry::set_value) (only after a
//!    load attempt).
//! 4. Optionally [`write_to`](ExpectationRegistry::write_to) a file.
//!
//! The registry has a single owner. Mutation goes through `&mut self`; it
//! holds no locks and is not meant to be shared across threads.

use crate::document::Document;
use crate::errors::{self, ExpectationError, Result};
use crate::expectation::Expectation;
use crate::format::{IniFormat, SourceFormat};
use crate::value::{DataType, Value};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Diagnostic label for sources passed as text.
const IN_MEMORY_ORIGIN: &str = "<memory>";

/// Identifies one expectation in a [`LoadReport`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldId {
    /// Section name.
    pub section: String,
    /// Key name.
    pub key: String,
}

impl FieldId {
    fn of(expectation: &Expectation) -> Self {
        Self {
            section: expectation.section().to_owned(),
            key: expectation.key().to_owned(),
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.section, self.key)
    }
}

/// What a successful load did to each expectation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Fields whose value came from the source.
    pub from_source: Vec<FieldId>,
    /// Fields present in the source whose text did not convert; they hold
    /// their default.
    pub fallbacks: Vec<FieldId>,
    /// Fields absent from the source; they hold their default.
    pub defaulted: Vec<FieldId>,
    /// Source entries that matched no expectation.
    pub ignored: usize,
}

/// Declared configuration slots plus load and readiness state.
pub struct ExpectationRegistry<F = IniFormat> {
    format: F,
    expectations: Vec<Expectation>,
    ready: bool,
    source: Option<PathBuf>,
}

impl ExpectationRegistry<IniFormat> {
    /// Empty registry reading and writing INI text.
    #[must_use]
    pub fn new() -> Self {
        Self::with_format(IniFormat::default())
    }
}

impl Default for ExpectationRegistry<IniFormat> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: SourceFormat> ExpectationRegistry<F> {
    /// Empty registry using `format` to parse and serialize.
    #[must_use]
    pub fn with_format(format: F) -> Self {
        Self {
            format,
            expectations: Vec::new(),
            ready: false,
            source: None,
        }
    }

    /// Active source format.
    #[must_use]
    pub fn format(&self) -> &F {
        &self.format
    }

    // ========================================================================
    // REGISTRATION
    // ========================================================================

    /// Declare a slot.
    ///
    /// The key is stored lower-case. `default` must convert to `data_type`
    /// (see [`DataType::convert`]); the converted value is what gets stored.
    ///
    /// # Errors
    ///
    /// Registration errors: empty or unwritable names, a default of the
    /// wrong kind, or a (section, key) pair that is already registered. The
    /// registry is unchanged on error.
    pub fn register(
        &mut self,
        section: &str,
        key: &str,
        data_type: DataType,
        default: impl Into<Value>,
        description: Option<&str>,
    ) -> Result<()> {
        let default = default.into();

        if section.is_empty() {
            warn!(key, "expectation rejected: empty section name");
            return Err(ExpectationError::EmptySection);
        }
        if key.is_empty() {
            warn!(section, "expectation rejected: empty key");
            return Err(ExpectationError::EmptyKey {
                section: section.to_owned(),
            });
        }

        let key_lower = key.to_lowercase();
        if key_lower != key {
            warn!(section, key, normalized = %key_lower, "key normalized to lower-case");
        }
        let key = key_lower.as_str();

        if let Err(e) = self.format.check_name(section, key) {
            warn!(section, key, format = self.format.name(), reason = %e, "expectation rejected: name cannot be stored");
            return Err(errors::invalid_name(section, key, e.to_string()));
        }

        let Some(default) = data_type.convert(&default) else {
            warn!(section, key, data_type = %data_type, default = %describe(&default), "expectation rejected: default has the wrong type");
            return Err(ExpectationError::DefaultTypeMismatch {
                section: section.to_owned(),
                key: key.to_owned(),
                expected: data_type,
                default: describe(&default),
            });
        };

        if let Err(e) = self.format.check_value(section, key, &default.to_string()) {
            warn!(section, key, format = self.format.name(), reason = %e, "expectation rejected: default cannot be stored");
            return Err(ExpectationError::DefaultNotStorable {
                section: section.to_owned(),
                key: key.to_owned(),
                reason: e.to_string(),
            });
        }

        if self.find_index(section, key).is_some() {
            warn!(section, key, "expectation rejected: already registered");
            return Err(ExpectationError::DuplicateExpectation {
                section: section.to_owned(),
                key: key.to_owned(),
            });
        }

        info!(section, key, data_type = %data_type, default = %default, "expectation registered");
        self.expectations.push(Expectation::new(
            section.to_owned(),
            key.to_owned(),
            data_type,
            default,
            description.map(str::to_owned),
        ));
        Ok(())
    }

    /// Remove the slot matching (section, key) exactly. Returns `false` if
    /// there was none.
    pub fn remove(&mut self, section: &str, key: &str) -> bool {
        match self.find_index(section, key) {
            Some(index) => {
                self.expectations.remove(index);
                info!(section, key, "expectation removed");
                true
            }
            None => {
                debug!(section, key, "nothing to remove");
                false
            }
        }
    }

    /// Position of the slot matching (section, key) exactly, in
    /// registration order.
    #[must_use]
    pub fn find_index(&self, section: &str, key: &str) -> Option<usize> {
        self.expectations
            .iter()
            .position(|e| e.matches(section, key))
    }

    // ========================================================================
    // LOAD
    // ========================================================================

    /// Load values from the file at `path`.
    ///
    /// Every current value is cleared first. On return, successful or not,
    /// every expectation holds either a value from the file or its default
    /// and the registry is ready for [`set_value`](Self::set_value). A
    /// successful load remembers `path` as the default write-back target.
    ///
    /// # Errors
    ///
    /// [`ExpectationError::NoExpectations`] if nothing is registered (no I/O
    /// happens and readiness is unchanged). Otherwise a load error when the
    /// file is missing, unreadable, malformed or has no sections; defaults
    /// have been applied in that case.
    pub fn load_from(&mut self, path: impl AsRef<Path>) -> Result<LoadReport> {
        let path = path.as_ref();
        if self.expectations.is_empty() {
            warn!(path = %path.display(), "load skipped: no expectations registered");
            return Err(ExpectationError::NoExpectations);
        }

        let parsed = match std::fs::read_to_string(path) {
            Ok(text) => self.parse_source(&text, &path.display().to_string()),
            Err(e) => Err(errors::read_error(path, e)),
        };
        let report = self.apply(parsed)?;

        self.source = Some(path.to_path_buf());
        info!(
            path = %path.display(),
            from_source = report.from_source.len(),
            fallbacks = report.fallbacks.len(),
            defaulted = report.defaulted.len(),
            ignored = report.ignored,
            "configuration loaded"
        );
        Ok(report)
    }

    /// Load values from configuration text. Same procedure as
    /// [`load_from`](Self::load_from), except no write-back path is recorded.
    ///
    /// # Errors
    ///
    /// As for [`load_from`](Self::load_from), minus the I/O cases.
    pub fn load_from_str(&mut self, text: &str) -> Result<LoadReport> {
        if self.expectations.is_empty() {
            warn!("load skipped: no expectations registered");
            return Err(ExpectationError::NoExpectations);
        }

        let parsed = self.parse_source(text, IN_MEMORY_ORIGIN);
        let report = self.apply(parsed)?;
        info!(
            from_source = report.from_source.len(),
            fallbacks = report.fallbacks.len(),
            defaulted = report.defaulted.len(),
            ignored = report.ignored,
            "configuration loaded from text"
        );
        Ok(report)
    }

    fn parse_source(&self, text: &str, origin: &str) -> Result<Document> {
        let doc = self
            .format
            .parse(text)
            .map_err(|source| ExpectationError::SourceMalformed {
                origin: origin.to_owned(),
                source,
            })?;
        if doc.is_empty() {
            return Err(ExpectationError::SourceEmpty {
                origin: origin.to_owned(),
            });
        }
        Ok(doc)
    }

    /// Reset values, apply the parsed source if there is one, fill defaults
    /// and mark the registry ready.
    fn apply(&mut self, parsed: Result<Document>) -> Result<LoadReport> {
        for expectation in &mut self.expectations {
            expectation.clear();
        }

        let outcome = parsed.map(|doc| self.apply_document(&doc));
        let defaulted = self.fill_defaults();
        self.ready = true;

        match outcome {
            Ok(mut report) => {
                report.defaulted = defaulted;
                Ok(report)
            }
            Err(err) => {
                warn!(error = %err, defaulted = defaulted.len(), "load failed, using defaults");
                Err(err)
            }
        }
    }

    fn apply_document(&mut self, doc: &Document) -> LoadReport {
        let mut report = LoadReport::default();

        for section in doc.sections() {
            for (key, raw) in doc.effective_entries(section) {
                let Some(expectation) = self
                    .expectations
                    .iter_mut()
                    .find(|e| e.matches(section.name(), key))
                else {
                    debug!(section = section.name(), key, "ignoring unexpected entry");
                    report.ignored += 1;
                    continue;
                };

                match expectation.data_type().coerce(raw) {
                    Some(value) => {
                        debug!(section = section.name(), key, value = %value, "value read");
                        expectation.replace(value);
                        report.from_source.push(FieldId::of(expectation));
                    }
                    None => {
                        warn!(
                            section = section.name(),
                            key,
                            raw,
                            data_type = %expectation.data_type(),
                            default = %expectation.default(),
                            "value does not convert, using default"
                        );
                        expectation.apply_default();
                        report.fallbacks.push(FieldId::of(expectation));
                    }
                }
            }
        }

        report
    }

    fn fill_defaults(&mut self) -> Vec<FieldId> {
        let mut defaulted = Vec::new();
        for expectation in self.expectations.iter_mut().filter(|e| e.is_unset()) {
            debug!(
                section = expectation.section(),
                key = expectation.key(),
                default = %expectation.default(),
                "using default"
            );
            expectation.apply_default();
            defaulted.push(FieldId::of(expectation));
        }
        defaulted
    }

    // ========================================================================
    // VALUE ACCESS
    // ========================================================================

    /// Current value of (section, key); `None` if no such slot exists or no
    /// load has happened yet. Keys match exactly, so pass them lower-case.
    #[must_use]
    pub fn get_value(&self, section: &str, key: &str) -> Option<&Value> {
        match self.find_index(section, key) {
            Some(index) => self.expectations.get(index).and_then(Expectation::value),
            None => {
                debug!(section, key, "no expectation registered");
                None
            }
        }
    }

    /// Current value as an integer.
    #[must_use]
    pub fn get_integer(&self, section: &str, key: &str) -> Option<i64> {
        self.get_value(section, key).and_then(Value::as_integer)
    }

    /// Current value as a float.
    #[must_use]
    pub fn get_float(&self, section: &str, key: &str) -> Option<f64> {
        self.get_value(section, key).and_then(Value::as_float)
    }

    /// Current value as a boolean.
    #[must_use]
    pub fn get_bool(&self, section: &str, key: &str) -> Option<bool> {
        self.get_value(section, key).and_then(Value::as_bool)
    }

    /// Current value as text.
    #[must_use]
    pub fn get_str(&self, section: &str, key: &str) -> Option<&str> {
        self.get_value(section, key).and_then(Value::as_str)
    }

    /// Replace the value of (section, key).
    ///
    /// The new value must pass the same conversion as defaults do at
    /// registration; a boolean slot takes only a real boolean.
    ///
    /// # Errors
    ///
    /// [`ExpectationError::NotReady`] before the first load attempt,
    /// [`ExpectationError::UnknownExpectation`] for an unregistered pair, and
    /// [`ExpectationError::ValueTypeMismatch`] when the value does not
    /// convert. The stored value is unchanged on error.
    pub fn set_value(&mut self, section: &str, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();

        if !self.ready {
            warn!(section, key, "update rejected: no load attempted yet");
            return Err(ExpectationError::NotReady);
        }

        let Some(expectation) = self
            .expectations
            .iter_mut()
            .find(|e| e.matches(section, key))
        else {
            warn!(section, key, "update rejected: no such expectation");
            return Err(ExpectationError::UnknownExpectation {
                section: section.to_owned(),
                key: key.to_owned(),
            });
        };

        let data_type = expectation.data_type();
        let Some(converted) = data_type.convert(&value) else {
            warn!(section, key, data_type = %data_type, value = %describe(&value), "update rejected: wrong type");
            return Err(ExpectationError::ValueTypeMismatch {
                section: section.to_owned(),
                key: key.to_owned(),
                expected: data_type,
                value: describe(&value),
            });
        };

        let new = converted.to_string();
        if let Err(e) = self.format.check_value(section, key, &new) {
            warn!(section, key, format = self.format.name(), reason = %e, "update rejected: value cannot be stored");
            return Err(ExpectationError::ValueNotStorable {
                section: section.to_owned(),
                key: key.to_owned(),
                reason: e.to_string(),
            });
        }
        let old = expectation.replace(converted);
        info!(
            section,
            key,
            old = %old.as_ref().map_or_else(|| "(unset)".to_owned(), ToString::to_string),
            new = %new,
            "value updated"
        );
        Ok(())
    }

    // ========================================================================
    // WRITE-BACK
    // ========================================================================

    /// Effective configuration as a document, in registration order. Unset
    /// values are rendered as their defaults.
    #[must_use]
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        for expectation in &self.expectations {
            doc.set(
                expectation.section(),
                expectation.key(),
                expectation.effective_value().to_string(),
            );
        }
        doc
    }

    /// Write the effective configuration to `destination`, or to the file
    /// of the last successful [`load_from`](Self::load_from) when `None`.
    ///
    /// The text goes to a temporary file beside the destination which then
    /// replaces it, so a failed write never leaves a partial file behind.
    ///
    /// # Errors
    ///
    /// Write errors: nothing registered, no destination known, the format
    /// cannot represent the values, or the file system refuses the write. An
    /// existing destination must itself be writable; it is not replaced
    /// through its directory's permissions alone. A symlinked destination is
    /// written through to the file it points at.
    pub fn write_to(&self, destination: Option<&Path>) -> Result<()> {
        if self.expectations.is_empty() {
            warn!("write skipped: no expectations registered");
            return Err(ExpectationError::NothingToWrite);
        }

        let Some(path) = destination.or(self.source.as_deref()) else {
            warn!("write rejected: no destination and no loaded file");
            return Err(ExpectationError::NoDestination);
        };

        let text = self
            .format
            .serialize(&self.to_document())
            .map_err(ExpectationError::SerializeFailed)?;

        if let Err(err) = write_atomically(path, &text) {
            warn!(path = %path.display(), error = %err, "write failed");
            return Err(err);
        }

        info!(path = %path.display(), entries = self.expectations.len(), "configuration written");
        Ok(())
    }

    // ========================================================================
    // INTROSPECTION
    // ========================================================================

    /// All expectations in registration order.
    #[must_use]
    pub fn expectations(&self) -> &[Expectation] {
        &self.expectations
    }

    /// Iterate expectations in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Expectation> {
        self.expectations.iter()
    }

    /// Number of expectations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.expectations.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expectations.is_empty()
    }

    /// True once a load has been attempted.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// File of the last successful load.
    #[must_use]
    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

impl<'a, F: SourceFormat> IntoIterator for &'a ExpectationRegistry<F> {
    type Item = &'a Expectation;
    type IntoIter = std::slice::Iter<'a, Expectation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<F> fmt::Debug for ExpectationRegistry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpectationRegistry")
            .field("expectations", &self.expectations)
            .field("ready", &self.ready)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Human-readable listing of every expectation.
impl<F> fmt::Display for ExpectationRegistry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration Values")?;
        for expectation in &self.expectations {
            write!(f, "\n\n{expectation}")?;
        }
        Ok(())
    }
}

/// Render a caller-supplied value for diagnostics; strings are quoted.
fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{s:?}"),
        other => other.to_string(),
    }
}

fn write_atomically(path: &Path, text: &str) -> Result<()> {
    // Replace the link target, not the link.
    let resolved = std::fs::canonicalize(path).ok();
    let target = resolved.as_deref().unwrap_or(path);

    // An existing destination must be writable itself, not just its directory.
    match std::fs::OpenOptions::new().write(true).open(target) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(errors::write_error(path, e)),
    }

    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file =
        tempfile::NamedTempFile::new_in(dir).map_err(|e| errors::write_error(path, e))?;
    file.write_all(text.as_bytes())
        .map_err(|e| errors::write_error(path, e))?;
    file.as_file()
        .sync_all()
        .map_err(|e| errors::write_error(path, e))?;

    // Keep the permissions of a file being replaced.
    if let Ok(existing) = std::fs::metadata(target) {
        file.as_file()
            .set_permissions(existing.permissions())
            .map_err(|e| errors::write_error(path, e))?;
    }

    file.persist(target)
        .map_err(|e| errors::write_error(path, e.into()))?;
    Ok(())
}
