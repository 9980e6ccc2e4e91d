//! Content-addressed cache key generation.

use sha2::{Digest, Sha256};

use crate::query::{Column, Filter};

/// Length in hex characters of a query hash.
pub const QUERY_HASH_LEN: usize = 32;

/// Compute the cache key for a query.
///
/// Column names are concatenated in order, followed by the raw filter strings
/// in order. Identically ordered inputs share a key; reordering changes it.
/// The key is the first 16 bytes of the SHA-256 digest, hex-encoded.
pub fn compute_query_hash(columns: &[Column], filters: &[Filter]) -> String {
    let mut hasher = Sha256::new();
    for column in columns {
        hasher.update(column.name.as_bytes());
    }
    for filter in filters {
        hasher.update(filter.filter.as_bytes());
    }
    hex::encode(&hasher.finalize()[..QUERY_HASH_LEN / 2])
}

/// Whether `hash` has the shape produced by [`compute_query_hash`].
pub fn is_query_hash(hash: &str) -> bool {
    hash.len() == QUERY_HASH_LEN && hash.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<Column> {
        names.iter().map(|n| Column { name: n.to_string() }).collect()
    }

    fn filters(texts: &[&str]) -> Vec<Filter> {
        texts
            .iter()
            .map(|t| Filter { filter: t.to_string(), follow: None })
            .collect()
    }

    #[test]
    fn test_hash_stability() {
        let hash1 = compute_query_hash(&columns(&["id", "name"]), &filters(&["isinactive, is, F"]));
        let hash2 = compute_query_hash(&columns(&["id", "name"]), &filters(&["isinactive, is, F"]));
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_column_order_matters() {
        let hash1 = compute_query_hash(&columns(&["id", "name"]), &[]);
        let hash2 = compute_query_hash(&columns(&["name", "id"]), &[]);
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_hash_filter_order_matters() {
        let cols = columns(&["id"]);
        let hash1 = compute_query_hash(&cols, &filters(&["a, is, 1", "b, is, 2"]));
        let hash2 = compute_query_hash(&cols, &filters(&["b, is, 2", "a, is, 1"]));
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_follow_token_not_part_of_key() {
        let cols = columns(&["id"]);
        let plain = compute_query_hash(&cols, &filters(&["a, is, 1"]));
        let with_follow =
            compute_query_hash(&cols, &[Filter { filter: "a, is, 1".into(), follow: Some("AND".into()) }]);
        assert_eq!(plain, with_follow);
    }

    #[test]
    fn test_hash_format() {
        let hash = compute_query_hash(&columns(&["id"]), &[]);
        assert_eq!(hash.len(), QUERY_HASH_LEN);
        assert!(is_query_hash(&hash));
    }

    #[test]
    fn test_is_query_hash_rejects_malformed() {
        assert!(!is_query_hash("abc"));
        assert!(!is_query_hash(&"G".repeat(QUERY_HASH_LEN)));
        assert!(!is_query_hash(&"A".repeat(QUERY_HASH_LEN)));
        assert!(!is_query_hash(&"0".repeat(QUERY_HASH_LEN + 1)));
    }
}
