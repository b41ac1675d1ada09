//! Default values for format options.

/// Name of the section whose entries every other section inherits.
pub const DEFAULT_SECTION: &str = "DEFAULT";

#[inline]
#[must_use]
pub(crate) fn default_delimiters() -> Vec<char> {
    vec!['=', ':']
}

#[inline]
#[must_use]
pub(crate) fn default_comment_prefixes() -> Vec<char> {
    vec!['#', ';']
}

#[inline]
#[must_use]
pub(crate) fn default_section_name() -> String {
    DEFAULT_SECTION.to_owned()
}
