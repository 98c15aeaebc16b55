use std::collections::HashMap;

use lubelogger::GasRecord;

use crate::comparator::{ComparatorKey, MatchStrategy};
use crate::error::Result;

/// Result of looking a key up in a [`GasRecordIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Found(&'a GasRecord),
    NotFound,
}

impl<'a> Lookup<'a> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn record(&self) -> Option<&'a GasRecord> {
        match self {
            Lookup::Found(record) => Some(*record),
            Lookup::NotFound => None,
        }
    }
}

/// Key lookup over one vehicle's destination gas records.
///
/// Records are indexed in the order the server returned them; when several share a key
/// the first one wins.
#[derive(Debug)]
pub struct GasRecordIndex<'a> {
    by_key: HashMap<ComparatorKey, &'a GasRecord>,
}

impl<'a> GasRecordIndex<'a> {
    /// Fails if any record's key cannot be derived.
    pub fn build(records: &'a [GasRecord], strategy: MatchStrategy) -> Result<Self> {
        let mut by_key = HashMap::with_capacity(records.len());
        for record in records {
            let key = strategy.key(record)?;
            by_key.entry(key).or_insert(record);
        }
        Ok(Self { by_key })
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn find(&self, key: &ComparatorKey) -> Lookup<'a> {
        match self.by_key.get(key) {
            Some(record) => Lookup::Found(*record),
            None => Lookup::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::odometer_key;
    use crate::error::SyncError;

    fn gas(id: &str, odometer: &str) -> GasRecord {
        GasRecord {
            id: id.into(),
            odometer: odometer.into(),
            date: "1/1/2024".into(),
            ..GasRecord::default()
        }
    }

    #[test]
    fn finds_records_in_unsorted_sets() {
        let records = vec![gas("a", "300"), gas("b", "100"), gas("c", "200")];
        let index = GasRecordIndex::build(&records, MatchStrategy::Odometer).unwrap();

        let key = odometer_key(&gas("", "100.6")).unwrap();
        assert_eq!(index.find(&key).record().map(|r| r.id.as_str()), Some("b"));
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn first_duplicate_wins() {
        let records = vec![gas("first", "500"), gas("second", "500.9")];
        let index = GasRecordIndex::build(&records, MatchStrategy::Odometer).unwrap();

        let key = odometer_key(&gas("", "500")).unwrap();
        assert_eq!(index.find(&key), Lookup::Found(&records[0]));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn miss_is_not_an_error() {
        let records = vec![gas("a", "300")];
        let index = GasRecordIndex::build(&records, MatchStrategy::Odometer).unwrap();
        let lookup = index.find(&odometer_key(&gas("", "301")).unwrap());
        assert_eq!(lookup, Lookup::NotFound);
        assert!(!lookup.is_found());

        let empty = GasRecordIndex::build(&[], MatchStrategy::Odometer).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn malformed_record_fails_the_build() {
        let records = vec![gas("a", "300"), gas("b", "")];
        assert!(matches!(
            GasRecordIndex::build(&records, MatchStrategy::Odometer),
            Err(SyncError::Destination(_))
        ));
    }
}
