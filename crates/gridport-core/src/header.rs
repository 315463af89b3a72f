//! Header-to-column index for one section.

use std::collections::BTreeMap;

/// Maps declared header text to its column position in a header row.
///
/// Keys are trimmed and lowercased; the first occurrence of a repeated
/// header wins, matching how vendor tools resolve duplicate columns.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    columns: BTreeMap<String, usize>,
}

impl HeaderIndex {
    pub fn from_row(row: &[String]) -> Self {
        let mut columns = BTreeMap::new();
        for (position, cell) in row.iter().enumerate() {
            let normalized = cell.trim().to_lowercase();
            if normalized.is_empty() {
                continue;
            }
            columns.entry(normalized).or_insert(position);
        }
        Self { columns }
    }

    /// Column position of a declared header, compared case-insensitively.
    pub fn column(&self, header: &str) -> Option<usize> {
        self.columns.get(&header.trim().to_lowercase()).copied()
    }

    pub fn contains(&self, header: &str) -> bool {
        self.column(header).is_some()
    }

    /// Normalized header texts present in this row.
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| (*cell).to_string()).collect()
    }

    #[test]
    fn lookup_is_trimmed_and_case_insensitive() {
        let index = HeaderIndex::from_row(&row(&[" Bus ID ", "Base kV"]));
        assert_eq!(index.column("bus id"), Some(0));
        assert_eq!(index.column("BASE KV"), Some(1));
        assert_eq!(index.column("Zone"), None);
    }

    #[test]
    fn first_occurrence_wins_for_repeated_headers() {
        let index = HeaderIndex::from_row(&row(&["Status", "Base kV", "Status"]));
        assert_eq!(index.column("Status"), Some(0));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn blank_cells_are_not_headers() {
        let index = HeaderIndex::from_row(&row(&["", "  ", "Bus ID"]));
        assert_eq!(index.len(), 1);
        assert_eq!(index.column("Bus ID"), Some(2));
    }
}
