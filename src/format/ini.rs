//! Sectioned `key = value` text.
//!
//! ```text
//! [DEFAULT]
//! timeout = 30
//!
//! [Net]
//! port = 9090
//! motd = first line
//!     second line
//! ```
//!
//! Keys are lower-cased; keys and values are trimmed. Lines whose first
//! non-blank character is a comment prefix are ignored; there are no inline
//! comments. A line indented deeper than its entry continues that entry's
//! value. Text after the closing `]` of a section header is ignored.
//!
//! Values are written verbatim, so a value survives a write and re-read only
//! if no line of it has surrounding whitespace, it does not end with a line
//! break, and no continuation line starts with a comment prefix.
//! [`SourceFormat::check_value`] rejects the rest.

use super::{FormatError, SourceFormat};
use crate::defaults::{
    default_comment_prefixes, default_delimiters, default_section_name,
};
use crate::document::Document;
use serde::{Deserialize, Serialize};

/// Parser and writer options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IniOptions {
    /// Characters separating a key from its value; the first one found wins.
    #[serde(default = "default_delimiters")]
    pub delimiters: Vec<char>,

    /// Characters that start a full-line comment.
    #[serde(default = "default_comment_prefixes")]
    pub comment_prefixes: Vec<char>,

    /// Section whose entries are inherited by all others.
    #[serde(default = "default_section_name")]
    pub default_section: String,
}

impl Default for IniOptions {
    fn default() -> Self {
        Self {
            delimiters: default_delimiters(),
            comment_prefixes: default_comment_prefixes(),
            default_section: default_section_name(),
        }
    }
}

/// The default source format.
#[derive(Debug, Clone, Default)]
pub struct IniFormat {
    options: IniOptions,
}

impl IniFormat {
    /// Format with custom options.
    #[must_use]
    pub fn with_options(options: IniOptions) -> Self {
        Self { options }
    }

    /// Active options.
    #[must_use]
    pub fn options(&self) -> &IniOptions {
        &self.options
    }

    fn is_comment(&self, trimmed: &str) -> bool {
        trimmed
            .chars()
            .next()
            .is_some_and(|c| self.options.comment_prefixes.contains(&c))
    }

    fn check_key(&self, section: &str, key: &str) -> Result<(), FormatError> {
        let reason = if key.is_empty() {
            Some("empty key")
        } else if key.trim() != key {
            Some("key has surrounding whitespace")
        } else if key.contains(|c| self.options.delimiters.contains(&c)) {
            Some("key contains a delimiter")
        } else if key.contains(['\n', '\r']) {
            Some("key contains a line break")
        } else if key.starts_with('[') || self.is_comment(key) {
            Some("key would be read as a header or comment")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(FormatError::Unsupported {
                location: format!("{section}.{key}"),
                reason,
            }),
            None => Ok(()),
        }
    }

    fn check_section(&self, name: &str) -> Result<(), FormatError> {
        let reason = if name.is_empty() {
            Some("empty section name")
        } else if name.trim() != name {
            Some("section name has surrounding whitespace")
        } else if name.contains([']', '\n', '\r']) {
            Some("section name contains ']' or a line break")
        } else if name == self.options.default_section {
            Some("section name is reserved for inherited defaults")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(FormatError::Unsupported {
                location: name.to_owned(),
                reason,
            }),
            None => Ok(()),
        }
    }

    fn check_text(&self, value: &str) -> Option<&'static str> {
        if value.ends_with('\n') {
            return Some("value ends with a line break");
        }
        value.split('\n').enumerate().find_map(|(idx, line)| {
            if line.trim_start() != line {
                Some("a line of the value starts with whitespace")
            } else if line.trim_end() != line {
                Some("a line of the value ends with whitespace")
            } else if idx > 0 && self.is_comment(line) {
                Some("a continuation line would be read as a comment")
            } else {
                None
            }
        })
    }

    fn write_section<'a>(
        &self,
        out: &mut String,
        name: &str,
        entries: impl Iterator<Item = (&'a str, &'a str)>,
    ) -> Result<(), FormatError> {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push('[');
        out.push_str(name);
        out.push_str("]\n");
        for (key, value) in entries {
            self.check_key(name, key)?;
            self.check_value(name, key, value)?;
            out.push_str(key);
            out.push_str(" = ");
            out.push_str(&value.replace('\n', "\n\t"));
            out.push('\n');
        }
        Ok(())
    }
}

/// Where parsed entries currently go.
enum Target {
    None,
    Defaults,
    Section(String),
}

/// An entry whose value may still grow through continuation lines.
struct Pending {
    key: String,
    lines: Vec<String>,
    indent: usize,
}

impl Pending {
    fn flush(self, target: &Target, doc: &mut Document) {
        let value = self.lines.join("\n").trim_end().to_owned();
        match target {
            Target::Defaults => doc.set_default(&self.key, value),
            Target::Section(name) => doc.set(name, &self.key, value),
            Target::None => {}
        }
    }
}

impl SourceFormat for IniFormat {
    fn name(&self) -> &'static str {
        "ini"
    }

    fn check_name(&self, section: &str, key: &str) -> Result<(), FormatError> {
        self.check_section(section)?;
        self.check_key(section, key)
    }

    fn check_value(&self, section: &str, key: &str, value: &str) -> Result<(), FormatError> {
        match self.check_text(value) {
            Some(reason) => Err(FormatError::Unsupported {
                location: format!("{section}.{key}"),
                reason,
            }),
            None => Ok(()),
        }
    }

    fn parse(&self, text: &str) -> Result<Document, FormatError> {
        let mut doc = Document::new();
        let mut target = Target::None;
        let mut pending: Option<Pending> = None;

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim();

            if trimmed.is_empty() {
                if let Some(entry) = pending.as_mut() {
                    entry.lines.push(String::new());
                }
                continue;
            }
            if self.is_comment(trimmed) {
                continue;
            }

            let indent = line.len() - line.trim_start().len();
            if let Some(entry) = pending.as_mut() {
                if indent > entry.indent {
                    entry.lines.push(trimmed.to_owned());
                    continue;
                }
            }
            if let Some(entry) = pending.take() {
                entry.flush(&target, &mut doc);
            }

            if let Some(header) = trimmed.strip_prefix('[') {
                let name = header
                    .rfind(']')
                    .map(|end| header[..end].trim())
                    .ok_or_else(|| FormatError::Syntax {
                        line: line_no,
                        message: "unterminated section header".to_owned(),
                    })?;
                if name.is_empty() {
                    return Err(FormatError::Syntax {
                        line: line_no,
                        message: "empty section header".to_owned(),
                    });
                }
                if name == self.options.default_section {
                    target = Target::Defaults;
                } else if doc.add_section(name) {
                    target = Target::Section(name.to_owned());
                } else {
                    return Err(FormatError::DuplicateSection {
                        line: line_no,
                        section: name.to_owned(),
                    });
                }
                continue;
            }

            let Some((split, delimiter)) = trimmed
                .char_indices()
                .find(|(_, c)| self.options.delimiters.contains(c))
            else {
                return Err(FormatError::Syntax {
                    line: line_no,
                    message: format!("expected a delimiter in {trimmed:?}"),
                });
            };
            let raw_key = trimmed[..split].trim();
            if raw_key.is_empty() {
                return Err(FormatError::Syntax {
                    line: line_no,
                    message: "entry has an empty key".to_owned(),
                });
            }
            let key = raw_key.to_lowercase();
            let value = trimmed[split + delimiter.len_utf8()..].trim();

            let duplicate = match &target {
                Target::None => return Err(FormatError::MissingSectionHeader { line: line_no }),
                Target::Defaults => doc.defaults().any(|(k, _)| k == key),
                Target::Section(name) => doc.section(name).and_then(|s| s.get(&key)).is_some(),
            };
            if duplicate {
                let section = match &target {
                    Target::Section(name) => name.clone(),
                    _ => self.options.default_section.clone(),
                };
                return Err(FormatError::DuplicateKey {
                    line: line_no,
                    section,
                    key,
                });
            }

            pending = Some(Pending {
                key,
                lines: vec![value.to_owned()],
                indent,
            });
        }

        if let Some(entry) = pending.take() {
            entry.flush(&target, &mut doc);
        }
        Ok(doc)
    }

    fn serialize(&self, document: &Document) -> Result<String, FormatError> {
        let mut out = String::new();
        let mut defaults = document.defaults().peekable();
        if defaults.peek().is_some() {
            self.write_section(&mut out, &self.options.default_section, defaults)?;
        }
        for section in document.sections() {
            self.check_section(section.name())?;
            self.write_section(&mut out, section.name(), section.entries())?;
        }
        Ok(out)
    }
}
