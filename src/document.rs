//! Ordered section → key → raw text mapping exchanged with source formats.

/// One named section with its entries in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    /// Section name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw value of `key` defined directly in this section.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Entries defined directly in this section, in order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries defined directly in this section.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the section defines no entries of its own.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn set(&mut self, key: &str, value: String) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key.to_owned(), value)),
        }
    }
}

/// Parsed or to-be-written configuration content.
///
/// Sections keep insertion order. Entries of the default section are held
/// apart and inherited by every named section that does not override them;
/// the default section itself is not counted as a section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    defaults: Vec<(String, String)>,
    sections: Vec<Section>,
}

impl Document {
    /// Empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty section. Returns `false` if it already exists.
    pub fn add_section(&mut self, name: &str) -> bool {
        if self.has_section(name) {
            return false;
        }
        self.sections.push(Section {
            name: name.to_owned(),
            entries: Vec::new(),
        });
        true
    }

    /// True if a named section exists.
    #[must_use]
    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Look up a named section.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Set `key` in `section`, creating the section at the end if needed.
    /// An existing key keeps its position and takes the new value.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(existing) = self.sections.iter_mut().find(|s| s.name == section) {
            existing.set(key, value);
            return;
        }
        let mut created = Section {
            name: section.to_owned(),
            entries: Vec::new(),
        };
        created.set(key, value);
        self.sections.push(created);
    }

    /// Set an entry of the default section.
    pub fn set_default(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.defaults.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None => self.defaults.push((key.to_owned(), value)),
        }
    }

    /// Entries of the default section, in order.
    pub fn defaults(&self) -> impl Iterator<Item = (&str, &str)> {
        self.defaults.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Named sections, in order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Number of named sections.
    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// True when there are no named sections (defaults alone do not count).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Raw value of `key` in `section`, falling back to the default section.
    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        let own = self.section(section)?;
        own.get(key).or_else(|| {
            self.defaults
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        })
    }

    /// Effective entries of a named section: its own entries followed by
    /// inherited defaults it does not override.
    #[must_use]
    pub fn effective_entries<'a>(&'a self, section: &'a Section) -> Vec<(&'a str, &'a str)> {
        let mut entries: Vec<(&str, &str)> = section.entries().collect();
        entries.extend(
            self.defaults()
                .filter(|(key, _)| section.get(key).is_none()),
        );
        entries
    }
}
