//! File and URL selection ahead of ingestion.

use std::path::{Path, PathBuf};

/// File extensions the ingestion backend can load.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "csv", "docx", "txt"];

/// Whether `path` has an allowed extension, ignoring case.
pub fn is_allowed(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

/// Files picked for upload. Selections accumulate until reset.
#[derive(Debug, Clone, Default)]
pub struct FileSelection {
    pending: Vec<PathBuf>,
}

impl FileSelection {
    /// Add the allowed files among `paths`; others are dropped silently.
    /// Returns how many were added.
    pub fn select<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let before = self.pending.len();
        self.pending.extend(
            paths
                .into_iter()
                .map(Into::into)
                .filter(|path| is_allowed(path)),
        );
        self.pending.len() - before
    }

    /// Files waiting for upload.
    pub fn pending(&self) -> &[PathBuf] {
        &self.pending
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop the selection.
    pub fn reset(&mut self) {
        self.pending.clear();
    }
}

/// Editable list of URL fields. Always has at least one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEntries {
    fields: Vec<String>,
}

impl Default for UrlEntries {
    fn default() -> Self {
        Self {
            fields: vec![String::new()],
        }
    }
}

impl UrlEntries {
    /// Append an empty field.
    pub fn add_field(&mut self) {
        self.fields.push(String::new());
    }

    /// Set field `index`. Returns false when there is no such field.
    pub fn set(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.fields.get_mut(index) {
            Some(field) => {
                *field = value.into();
                true
            }
            None => false,
        }
    }

    /// All fields, blank ones included.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Back to a single empty field.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The non-blank values, trimmed.
    pub fn urls(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|field| field.trim())
            .filter(|field| !field.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for UrlEntries {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let fields: Vec<String> = iter.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Self::default();
        }
        Self { fields }
    }
}
