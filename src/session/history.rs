//! Bounded recent-search list

use serde::Serialize;

/// Most-recent-first list of normalized search terms
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHistory {
    entries: Vec<String>,
    cap: usize,
}

impl SearchHistory {
    pub fn new(cap: usize) -> Self {
        Self {
            entries: Vec::with_capacity(cap),
            cap,
        }
    }

    /// Lowercased and trimmed form used for storage and comparison
    pub fn normalize(term: &str) -> String {
        term.trim().to_lowercase()
    }

    /// Record a term at the front.
    ///
    /// A term already present (ignoring case) is left where it is. Returns
    /// true if the list changed.
    pub fn record(&mut self, term: &str) -> bool {
        let term = Self::normalize(term);
        if term.is_empty() || self.entries.contains(&term) {
            return false;
        }
        self.entries.insert(0, term);
        self.entries.truncate(self.cap);
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_dedup() {
        let mut history = SearchHistory::new(10);
        assert!(history.record("Milk"));
        assert!(!history.record("milk"));
        assert!(!history.record("  MILK "));
        assert_eq!(history.entries(), &["milk".to_string()]);
    }

    #[test]
    fn test_newest_first_and_existing_not_moved() {
        let mut history = SearchHistory::new(10);
        history.record("milk");
        history.record("butter");
        history.record("eggs");
        history.record("milk");
        assert_eq!(history.entries(), &["eggs", "butter", "milk"]);
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut history = SearchHistory::new(5);
        for i in 0..25 {
            history.record(&format!("item {}", i));
            assert!(history.len() <= 5);
        }
        assert_eq!(history.entries()[0], "item 24");
        assert_eq!(history.entries()[4], "item 20");
    }

    #[test]
    fn test_blank_terms_ignored() {
        let mut history = SearchHistory::new(3);
        assert!(!history.record("   "));
        assert!(history.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut history = SearchHistory::new(3);
        history.record("flour");
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.cap(), 3);
    }
}
