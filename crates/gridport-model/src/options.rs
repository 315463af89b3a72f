//! Options controlling one import call.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportOptions {
    /// When true, any Required + Error-severity header never observed in any
    /// header row across the whole call fails the call with a structural
    /// error listing every such header. When false (the default), missing
    /// required headers are logged per occurrence and the import completes.
    pub strict_missing_required_headers: bool,

    /// Restrict workbook imports to these worksheet names
    /// (case-insensitive). Empty means all worksheets.
    pub worksheets: Vec<String>,
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self {
            strict_missing_required_headers: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_worksheets(mut self, worksheets: Vec<String>) -> Self {
        self.worksheets = worksheets;
        self
    }

    /// True when a worksheet of this name should be imported.
    pub fn sheet_allowed(&self, name: &str) -> bool {
        self.worksheets.is_empty()
            || self
                .worksheets
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_allow_list_admits_all_sheets() {
        let options = ImportOptions::new();
        assert!(options.sheet_allowed("Breakers"));
    }

    #[test]
    fn allow_list_is_case_insensitive() {
        let options = ImportOptions::new().with_worksheets(vec!["Breakers".to_string()]);
        assert!(options.sheet_allowed("BREAKERS"));
        assert!(!options.sheet_allowed("Fuses"));
    }
}
