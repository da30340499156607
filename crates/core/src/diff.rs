//! Incremental diff: which candidate records are not yet present downstream.

use std::collections::HashSet;

/// Drops records whose key was already seen, keeping the first occurrence.
/// Records without a key form a single group of their own.
pub fn dedup_by_key<T, F>(records: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> Option<&str>,
{
    let mut seen: HashSet<Option<String>> = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(key(record).map(str::to_string)))
        .collect()
}

/// Returns the candidates whose key is absent from `reference`, in candidate order.
///
/// Candidates are deduplicated on the key first. Matching is exact: no
/// case folding or trimming happens here. A missing key is never present
/// in the reference.
pub fn incremental_diff<T, F>(candidates: Vec<T>, reference: &HashSet<String>, key: F) -> Vec<T>
where
    F: Fn(&T) -> Option<&str>,
{
    dedup_by_key(candidates, &key)
        .into_iter()
        .filter(|record| !key(record).is_some_and(|k| reference.contains(k)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        key: Option<&'static str>,
        tag: u32,
    }

    fn row(key: &'static str, tag: u32) -> Row {
        Row {
            key: Some(key),
            tag,
        }
    }

    fn key(r: &Row) -> Option<&str> {
        r.key
    }

    fn reference(keys: &[&str]) -> HashSet<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    fn candidate_sets() -> Vec<Vec<Row>> {
        vec![
            vec![],
            vec![row("a", 1)],
            vec![row("a", 1), row("b", 2), row("a", 3), row("c", 4)],
            vec![row("c", 1), row("b", 2), row("b", 3), row("a", 4), row("d", 5)],
            vec![
                row("a", 1),
                Row { key: None, tag: 2 },
                Row { key: None, tag: 3 },
                row("b", 4),
            ],
        ]
    }

    fn reference_sets() -> Vec<HashSet<String>> {
        vec![
            reference(&[]),
            reference(&["a"]),
            reference(&["b", "c"]),
            reference(&["a", "b", "c", "d"]),
            reference(&["z"]),
        ]
    }

    #[test]
    fn test_result_excludes_reference_keys() {
        for candidates in candidate_sets() {
            for refs in reference_sets() {
                let result = incremental_diff(candidates.clone(), &refs, key);
                assert!(result
                    .iter()
                    .all(|r| r.key.map_or(true, |k| !refs.contains(k))));
            }
        }
    }

    #[test]
    fn test_result_and_covered_recover_dedup_candidates() {
        for candidates in candidate_sets() {
            for refs in reference_sets() {
                let deduped = dedup_by_key(candidates.clone(), key);
                let result = incremental_diff(candidates.clone(), &refs, key);
                let covered: Vec<Row> = deduped
                    .iter()
                    .filter(|r| r.key.is_some_and(|k| refs.contains(k)))
                    .cloned()
                    .collect();

                assert_eq!(result.len() + covered.len(), deduped.len());
                let mut union: Vec<Row> = result.iter().chain(covered.iter()).cloned().collect();
                union.sort_by_key(|r| r.tag);
                let mut expected = deduped.clone();
                expected.sort_by_key(|r| r.tag);
                assert_eq!(union, expected);
            }
        }
    }

    #[test]
    fn test_empty_reference_returns_dedup_in_order() {
        let candidates = vec![row("b", 1), row("a", 2), row("b", 3), row("c", 4)];
        let result = incremental_diff(candidates, &HashSet::new(), key);
        assert_eq!(result, vec![row("b", 1), row("a", 2), row("c", 4)]);
    }

    #[test]
    fn test_empty_candidates_yield_empty() {
        for refs in reference_sets() {
            assert!(incremental_diff(Vec::<Row>::new(), &refs, key).is_empty());
        }
    }

    #[test]
    fn test_fully_covered_candidates_yield_empty() {
        let candidates = vec![row("a", 1), row("b", 2), row("a", 3)];
        let result = incremental_diff(candidates, &reference(&["a", "b"]), key);
        assert!(result.is_empty());
    }

    #[test]
    fn test_dedup_happens_before_membership_filter() {
        // The first "a" is covered; the later duplicate must not slip through.
        let candidates = vec![row("a", 1), row("b", 2), row("a", 3)];
        let result = incremental_diff(candidates, &reference(&["a"]), key);
        assert_eq!(result, vec![row("b", 2)]);
    }

    #[test]
    fn test_matching_is_exact() {
        let candidates = vec![row("https://x/A", 1), row("https://x/a ", 2)];
        let result = incremental_diff(candidates, &reference(&["https://x/a"]), key);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_missing_keys_collapse_to_first() {
        let candidates = vec![
            Row { key: None, tag: 1 },
            row("a", 2),
            Row { key: None, tag: 3 },
        ];
        let result = incremental_diff(candidates, &reference(&["a"]), key);
        assert_eq!(result, vec![Row { key: None, tag: 1 }]);
    }
}
