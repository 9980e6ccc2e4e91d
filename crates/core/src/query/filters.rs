//! Filter normalization into the record source's positional wire shape.

use serde::{Deserialize, Serialize};

use super::Filter;

/// Separator between clauses inside one filter string.
const CLAUSE_SEPARATOR: &str = ", ";

/// One slot of the normalized filter sequence.
///
/// Serializes untagged so the sequence reads `[["a","b"], "AND", ["c"], ""]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterSlot {
    Clauses(Vec<String>),
    Follow(String),
}

/// Interleaved `[clauses, follow, clauses, follow, ...]` sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedFilters(pub Vec<FilterSlot>);

impl NormalizedFilters {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Split each filter on `", "` and pair it with its follow token.
///
/// A missing or empty follow token still occupies its slot as `""`, keeping
/// positions aligned with what the source expects.
pub fn normalize_filters(filters: &[Filter]) -> NormalizedFilters {
    let mut slots = Vec::with_capacity(filters.len() * 2);
    for filter in filters {
        let clauses = filter.filter.split(CLAUSE_SEPARATOR).map(str::to_string).collect();
        slots.push(FilterSlot::Clauses(clauses));
        slots.push(FilterSlot::Follow(filter.follow.clone().unwrap_or_default()));
    }
    NormalizedFilters(slots)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(text: &str, follow: Option<&str>) -> Filter {
        Filter { filter: text.to_string(), follow: follow.map(str::to_string) }
    }

    #[test]
    fn test_no_follow_yields_empty_slot() {
        let normalized = normalize_filters(&[filter("a, b", None)]);
        assert_eq!(
            normalized.0,
            vec![FilterSlot::Clauses(vec!["a".into(), "b".into()]), FilterSlot::Follow(String::new())]
        );
        assert_eq!(serde_json::to_string(&normalized).unwrap(), r#"[["a","b"],""]"#);
    }

    #[test]
    fn test_follow_token_kept() {
        let normalized = normalize_filters(&[filter("a, b", Some("AND"))]);
        assert_eq!(serde_json::to_string(&normalized).unwrap(), r#"[["a","b"],"AND"]"#);
    }

    #[test]
    fn test_explicit_empty_follow_occupies_slot() {
        let normalized = normalize_filters(&[filter("x", Some("")), filter("y, anyof, 1", Some("OR"))]);
        assert_eq!(normalized.len(), 4);
        assert_eq!(serde_json::to_string(&normalized).unwrap(), r#"[["x"],"",["y","anyof","1"],"OR"]"#);
    }

    #[test]
    fn test_separator_requires_space() {
        let normalized = normalize_filters(&[filter("a,b", None)]);
        assert_eq!(normalized.0[0], FilterSlot::Clauses(vec!["a,b".into()]));
    }

    #[test]
    fn test_empty_filters() {
        let normalized = normalize_filters(&[]);
        assert!(normalized.is_empty());
        assert_eq!(serde_json::to_string(&normalized).unwrap(), "[]");
    }
}
