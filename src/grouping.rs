//! Stable per-account grouping of one chunk.

use crate::record::FeedRecord;
use std::collections::HashMap;

/// Records of one chunk grouped by account.
///
/// # Ordering
///
/// Groups are kept in order of each account's first appearance in the chunk,
/// and each group lists its records in chunk order. Iterating
/// [`AccountGroups::records`] therefore yields the deterministic application
/// order for the chunk.
#[derive(Debug, Default)]
pub struct AccountGroups<'a> {
    groups: Vec<(&'a str, Vec<&'a FeedRecord>)>,
}

impl<'a> AccountGroups<'a> {
    /// Number of distinct accounts in the chunk.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Account ids in first-appearance order.
    pub fn keys(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.groups.iter().map(|(key, _)| *key)
    }

    /// Groups in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &[&'a FeedRecord])> + '_ {
        self.groups
            .iter()
            .map(|(key, records)| (*key, records.as_slice()))
    }

    /// All records, group by group, in application order.
    pub fn records(&self) -> impl Iterator<Item = &'a FeedRecord> + '_ {
        self.groups
            .iter()
            .flat_map(|(_, records)| records.iter().copied())
    }
}

/// Groups a chunk by account id.
pub fn group_by_account(chunk: &[FeedRecord]) -> AccountGroups<'_> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&FeedRecord>)> = Vec::new();

    for record in chunk {
        let slot = *index.entry(record.account_id()).or_insert_with(|| {
            groups.push((record.account_id(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(record);
    }

    AccountGroups { groups }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_chunk() -> Vec<FeedRecord> {
        vec![
            FeedRecord::insert("B", "Bob", "100"),
            FeedRecord::insert("A", "Alice", "111"),
            FeedRecord::update_phone("B", "200"),
            FeedRecord::delete("C"),
            FeedRecord::update_name("A", "Alicia"),
            FeedRecord::update_phone("B", "300"),
        ]
    }

    #[test]
    fn test_keys_follow_first_appearance() {
        let chunk = sample_chunk();
        let groups = group_by_account(&chunk);

        let keys: Vec<&str> = groups.keys().collect();
        assert_eq!(keys, vec!["B", "A", "C"]);
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn test_group_preserves_record_order() {
        let chunk = sample_chunk();
        let groups = group_by_account(&chunk);

        let (key, records) = groups.iter().next().unwrap();
        assert_eq!(key, "B");
        let phones: Vec<Option<&str>> = records.iter().map(|r| r.phone()).collect();
        assert_eq!(phones, vec![Some("100"), Some("200"), Some("300")]);
    }

    #[test]
    fn test_records_flatten_in_application_order() {
        let chunk = sample_chunk();
        let groups = group_by_account(&chunk);

        let order: Vec<&FeedRecord> = groups.records().collect();
        let expected = vec![
            &chunk[0], &chunk[2], &chunk[5], &chunk[1], &chunk[4], &chunk[3],
        ];
        assert_eq!(order, expected);
    }

    #[test]
    fn test_grouping_is_deterministic() {
        let chunk = sample_chunk();
        let first: Vec<&FeedRecord> = group_by_account(&chunk).records().collect();
        let second: Vec<&FeedRecord> = group_by_account(&chunk).records().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_chunk() {
        let groups = group_by_account(&[]);
        assert!(groups.is_empty());
        assert_eq!(groups.records().count(), 0);
    }
}
