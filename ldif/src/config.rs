//! Parser and writer settings.

use std::collections::HashSet;

use crate::error::{LdifError, Result};

/// Default fold width of the writer.
pub const DEFAULT_COLS: usize = 76;

/// A set of names compared case-insensitively (attribute types, URL schemes).
///
/// Names are lower-cased once on insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseInsensitiveSet {
    names: HashSet<String>,
}

impl CaseInsensitiveSet {
    pub fn new() -> Self {
        CaseInsensitiveSet::default()
    }

    pub fn insert(&mut self, name: &str) -> bool {
        self.names.insert(name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        !self.names.is_empty() && self.names.contains(&name.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

impl<S: AsRef<str>> FromIterator<S> for CaseInsensitiveSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = CaseInsensitiveSet::new();
        for name in iter {
            set.insert(name.as_ref());
        }
        set
    }
}

/// Settings for [`LdifParser`](crate::parser::LdifParser).
#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    /// Stop after this many records; 0 reads everything.
    pub max_entries: usize,
    /// Attribute types dropped from parsed records.
    pub ignored_attr_types: CaseInsensitiveSet,
    /// URL schemes that `attr:< url` lines may be dereferenced with.
    /// Empty turns URL processing off.
    pub process_url_schemes: CaseInsensitiveSet,
}

impl ParserConfig {
    pub fn new() -> Self {
        ParserConfig::default()
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_ignored_attr_types<I, S>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignored_attr_types = attrs.into_iter().collect();
        self
    }

    pub fn with_url_schemes<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.process_url_schemes = schemes.into_iter().collect();
        self
    }
}

/// Settings for [`LdifWriter`](crate::writer::LdifWriter).
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Attribute types always written base64-encoded.
    pub base64_attrs: CaseInsensitiveSet,
    /// Maximum physical line width before folding.
    pub cols: usize,
    /// Terminator written after every physical line.
    pub line_sep: String,
}

impl Default for WriterConfig {
    fn default() -> Self {
        WriterConfig {
            base64_attrs: CaseInsensitiveSet::new(),
            cols: DEFAULT_COLS,
            line_sep: "\n".to_string(),
        }
    }
}

impl WriterConfig {
    pub fn new() -> Self {
        WriterConfig::default()
    }

    pub fn with_base64_attrs<I, S>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.base64_attrs = attrs.into_iter().collect();
        self
    }

    pub fn with_cols(mut self, cols: usize) -> Self {
        self.cols = cols;
        self
    }

    pub fn with_line_sep(mut self, line_sep: &str) -> Self {
        self.line_sep = line_sep.to_string();
        self
    }

    /// Continuation lines need room for the leading space plus one character.
    pub fn validate(&self) -> Result<()> {
        if self.cols < 2 {
            return Err(LdifError::InvalidColumns(self.cols));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_is_case_insensitive() {
        let set: CaseInsensitiveSet = ["userPassword", "jpegPhoto"].into_iter().collect();
        assert!(set.contains("userpassword"));
        assert!(set.contains("USERPASSWORD"));
        assert!(set.contains("JpegPhoto"));
        assert!(!set.contains("cn"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn set_deduplicates_spellings() {
        let set: CaseInsensitiveSet = ["cn", "CN", "Cn"].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn empty_set_contains_nothing() {
        let set = CaseInsensitiveSet::new();
        assert!(set.is_empty());
        assert!(!set.contains(""));
    }

    #[test]
    fn parser_defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.max_entries, 0);
        assert!(config.ignored_attr_types.is_empty());
        assert!(config.process_url_schemes.is_empty());
    }

    #[test]
    fn parser_builder() {
        let config = ParserConfig::new()
            .with_max_entries(3)
            .with_ignored_attr_types(["userPassword"])
            .with_url_schemes(["FILE"]);
        assert_eq!(config.max_entries, 3);
        assert!(config.ignored_attr_types.contains("userpassword"));
        assert!(config.process_url_schemes.contains("file"));
    }

    #[test]
    fn writer_defaults() {
        let config = WriterConfig::default();
        assert_eq!(config.cols, 76);
        assert_eq!(config.line_sep, "\n");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn writer_rejects_narrow_columns() {
        assert!(matches!(
            WriterConfig::new().with_cols(1).validate(),
            Err(LdifError::InvalidColumns(1))
        ));
        assert!(WriterConfig::new().with_cols(2).validate().is_ok());
    }
}
