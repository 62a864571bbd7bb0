// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;

use crate::{ContactId, ContactRecord, SortDirection, SortKey, SortOrder};

/// Working set for a session. A non-empty import replaces the fetched rows
/// outright; the next reload brings the fetched rows back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSource {
    Fetched(Vec<ContactRecord>),
    Imported(Vec<ContactRecord>),
}

impl Default for RecordSource {
    fn default() -> Self {
        Self::Fetched(Vec::new())
    }
}

impl RecordSource {
    pub fn records(&self) -> &[ContactRecord] {
        match self {
            Self::Fetched(records) | Self::Imported(records) => records,
        }
    }

    pub const fn is_imported(&self) -> bool {
        matches!(self, Self::Imported(_))
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Fetched(_) => "fetched",
            Self::Imported(_) => "imported",
        }
    }

    pub fn find(&self, id: &ContactId) -> Option<&ContactRecord> {
        self.records().iter().find(|record| &record.id == id)
    }

    /// Installs `records` as the imported working set. Returns false and
    /// leaves the source alone when there is nothing to import.
    pub fn import(&mut self, records: Vec<ContactRecord>) -> bool {
        if records.is_empty() {
            return false;
        }
        *self = Self::Imported(records);
        true
    }
}

/// Filter then sort. Never mutates the input.
pub fn visible_records<'a>(
    records: &'a [ContactRecord],
    search_term: &str,
    order: SortOrder,
) -> Vec<&'a ContactRecord> {
    let mut rows = filter_records(records, search_term);
    sort_records(&mut rows, order);
    rows
}

pub fn filter_records<'a>(records: &'a [ContactRecord], search_term: &str) -> Vec<&'a ContactRecord> {
    let needle = search_term.to_lowercase();
    records
        .iter()
        .filter(|record| record.name.to_lowercase().contains(&needle))
        .collect()
}

/// Stable sort, so equal keys keep filter order in both directions.
pub fn sort_records(rows: &mut [&ContactRecord], order: SortOrder) {
    let Some(key) = order.key else {
        return;
    };
    rows.sort_by(|left, right| {
        let ordering = compare_by_key(left, right, key);
        match order.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

pub fn compare_by_key(left: &ContactRecord, right: &ContactRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => locale_compare(&left.name, &right.name),
        SortKey::PhoneNumber => locale_compare(&left.phone_number, &right.phone_number),
        SortKey::Email => locale_compare(&left.email, &right.email),
        SortKey::Address => locale_compare(&left.address, &right.address),
        SortKey::CreatedDate => left.created_date.cmp(&right.created_date),
    }
}

/// Case-insensitive primary order; on a tie, lowercase sorts before
/// uppercase at the first differing character.
pub fn locale_compare(left: &str, right: &str) -> Ordering {
    let primary = left
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(right.chars().flat_map(char::to_lowercase));
    if primary != Ordering::Equal {
        return primary;
    }
    left.chars()
        .map(|ch| (ch.is_uppercase(), ch))
        .cmp(right.chars().map(|ch| (ch.is_uppercase(), ch)))
}

#[cfg(test)]
mod tests {
    use super::{RecordSource, filter_records, locale_compare, visible_records};
    use crate::{ContactId, ContactRecord, SortDirection, SortKey, SortOrder};
    use std::cmp::Ordering;
    use time::{Duration, OffsetDateTime};

    fn record(id: &str, name: &str, address: &str, days: i64) -> ContactRecord {
        ContactRecord {
            id: ContactId::new(id),
            name: name.to_owned(),
            phone_number: format!("555000{id:0>4}"),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            address: address.to_owned(),
            created_date: OffsetDateTime::UNIX_EPOCH + Duration::days(days),
        }
    }

    fn sample() -> Vec<ContactRecord> {
        vec![
            record("1", "charlie", "Elm", 30),
            record("2", "Alice", "", 10),
            record("3", "bob", "Birch", 20),
            record("4", "alice", "Aspen", 10),
            record("5", "Dora", "", 5),
        ]
    }

    fn ids(rows: &[&ContactRecord]) -> Vec<String> {
        rows.iter().map(|row| row.id.to_string()).collect()
    }

    #[test]
    fn empty_search_is_identity() {
        let records = sample();
        let rows = filter_records(&records, "");
        assert_eq!(ids(&rows), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn search_matches_name_substring_case_insensitively() {
        let records = sample();
        let rows = filter_records(&records, "LIC");
        assert_eq!(ids(&rows), vec!["2", "4"]);
    }

    #[test]
    fn no_sort_key_preserves_filter_order() {
        let records = sample();
        let rows = visible_records(&records, "", SortOrder::default());
        assert_eq!(ids(&rows), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn name_sort_is_case_insensitive_with_lowercase_first() {
        let records = sample();
        let rows = visible_records(&records, "", SortOrder::by(SortKey::Name, SortDirection::Asc));
        assert_eq!(ids(&rows), vec!["4", "2", "3", "1", "5"]);
    }

    #[test]
    fn empty_address_sorts_first_ascending() {
        let records = sample();
        let rows = visible_records(
            &records,
            "",
            SortOrder::by(SortKey::Address, SortDirection::Asc),
        );
        assert_eq!(ids(&rows), vec!["2", "5", "4", "3", "1"]);
    }

    #[test]
    fn created_date_sort_is_chronological_and_stable() {
        let records = sample();
        let asc = visible_records(
            &records,
            "",
            SortOrder::by(SortKey::CreatedDate, SortDirection::Asc),
        );
        assert_eq!(ids(&asc), vec!["5", "2", "4", "3", "1"]);

        let desc = visible_records(
            &records,
            "",
            SortOrder::by(SortKey::CreatedDate, SortDirection::Desc),
        );
        assert_eq!(ids(&desc), vec!["1", "3", "2", "4", "5"]);
    }

    #[test]
    fn sorting_is_idempotent() {
        let records = sample();
        for key in SortKey::ALL {
            for direction in [SortDirection::Asc, SortDirection::Desc] {
                let order = SortOrder::by(key, direction);
                let once = visible_records(&records, "", order);
                let owned = once.iter().map(|row| (*row).clone()).collect::<Vec<_>>();
                let twice = visible_records(&owned, "", order);
                assert_eq!(ids(&once), ids(&twice), "key {key:?} {direction:?}");
            }
        }
    }

    #[test]
    fn toggling_direction_twice_restores_order() {
        let records = sample();
        let mut order = SortOrder::by(SortKey::Email, SortDirection::Asc);
        let original = ids(&visible_records(&records, "", order));
        order.cycle(SortKey::Email);
        order.cycle(SortKey::Email);
        assert_eq!(ids(&visible_records(&records, "", order)), original);
    }

    #[test]
    fn pipeline_does_not_mutate_source() {
        let records = sample();
        let before = records.clone();
        let _ = visible_records(&records, "a", SortOrder::by(SortKey::Name, SortDirection::Desc));
        assert_eq!(records, before);
    }

    #[test]
    fn import_replaces_working_set_only_when_non_empty() {
        let mut source = RecordSource::Fetched(sample());
        assert!(!source.import(Vec::new()));
        assert!(!source.is_imported());

        assert!(source.import(vec![record("imported_0", "Zed", "", 1)]));
        assert!(source.is_imported());
        assert_eq!(source.records().len(), 1);
        assert!(source.find(&ContactId::new("1")).is_none());
    }

    #[test]
    fn locale_compare_orders_case_variants() {
        assert_eq!(locale_compare("a", "B"), Ordering::Less);
        assert_eq!(locale_compare("a", "A"), Ordering::Less);
        assert_eq!(locale_compare("", "a"), Ordering::Less);
        assert_eq!(locale_compare("same", "same"), Ordering::Equal);
    }
}
