//! Input suggestions from a tool's list of popular ingredients

/// Most suggestions returned for one input
pub const MAX_SUGGESTIONS: usize = 5;

/// Entries of `list` containing `input`, case-insensitively, capped at `limit`
///
/// An empty input matches everything.
pub fn suggest<'a>(list: &[&'a str], input: &str, limit: usize) -> Vec<&'a str> {
    let needle = input.trim().to_lowercase();
    list.iter()
        .copied()
        .filter(|item| item.to_lowercase().contains(&needle))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST: &[&str] = &["milk", "butter", "buttermilk", "cheese", "eggs", "flour", "sugar"];

    #[test]
    fn test_contains_match() {
        assert_eq!(suggest(LIST, "MILK", MAX_SUGGESTIONS), vec!["milk", "buttermilk"]);
    }

    #[test]
    fn test_empty_input_returns_capped_list() {
        assert_eq!(suggest(LIST, "  ", MAX_SUGGESTIONS).len(), 5);
        assert_eq!(suggest(LIST, "", 2), vec!["milk", "butter"]);
    }

    #[test]
    fn test_no_match() {
        assert!(suggest(LIST, "saffron", MAX_SUGGESTIONS).is_empty());
    }
}
