//! Flat TOML: one table per section, scalar values only.
//!
//! Scalars of any TOML type are read as their text so they pass through the
//! same coercion as INI values. Everything is written back as a TOML string,
//! which keeps string slots like `"007"` from turning into numbers.

use super::{FormatError, SourceFormat};
use crate::document::Document;
use crate::value::Value;
use toml::{Table, Value as TomlValue};

/// TOML source format.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlFormat;

fn scalar_text(location: &str, value: TomlValue) -> Result<String, FormatError> {
    match value {
        TomlValue::String(s) => Ok(s),
        TomlValue::Integer(i) => Ok(i.to_string()),
        TomlValue::Float(f) => Ok(Value::Float(f).to_string()),
        TomlValue::Boolean(b) => Ok(b.to_string()),
        TomlValue::Datetime(d) => Ok(d.to_string()),
        TomlValue::Array(_) | TomlValue::Table(_) => Err(FormatError::Unsupported {
            location: location.to_owned(),
            reason: "nested values are not supported",
        }),
    }
}

impl SourceFormat for TomlFormat {
    fn name(&self) -> &'static str {
        "toml"
    }

    fn parse(&self, text: &str) -> Result<Document, FormatError> {
        let table: Table = toml::from_str(text)?;
        let mut doc = Document::new();

        for (name, item) in table {
            let TomlValue::Table(entries) = item else {
                return Err(FormatError::Unsupported {
                    location: name,
                    reason: "top-level values must be tables",
                });
            };
            doc.add_section(&name);
            for (raw_key, value) in entries {
                let location = format!("{name}.{raw_key}");
                let key = raw_key.to_lowercase();
                if doc.get(&name, &key).is_some() {
                    return Err(FormatError::Unsupported {
                        location,
                        reason: "key collides with another after lower-casing",
                    });
                }
                let text = scalar_text(&location, value)?;
                doc.set(&name, &key, text);
            }
        }

        Ok(doc)
    }

    fn serialize(&self, document: &Document) -> Result<String, FormatError> {
        if document.defaults().next().is_some() {
            return Err(FormatError::Unsupported {
                location: "defaults".to_owned(),
                reason: "TOML has no inherited defaults section",
            });
        }

        let mut root = Table::new();
        for section in document.sections() {
            let entries: Table = section
                .entries()
                .map(|(k, v)| (k.to_owned(), TomlValue::String(v.to_owned())))
                .collect();
            root.insert(section.name().to_owned(), TomlValue::Table(entries));
        }
        Ok(toml::to_string(&root)?)
    }
}
