//! Bounded record of recent activations.

use std::collections::VecDeque;

use serde::Serialize;

use crate::clock::Millis;
use crate::technique::{ActivationSource, TechniqueId};

/// Default number of records kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// One accepted activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ActivationRecord {
    pub technique: TechniqueId,
    pub at:        Millis,
    pub source:    ActivationSource,
}

/// Ring buffer of the most recent activations, oldest first.
#[derive(Debug, Clone)]
pub struct ActivationHistory {
    records:  VecDeque<ActivationRecord>,
    capacity: usize,
}

impl Default for ActivationHistory {
    fn default() -> Self { Self::with_capacity(DEFAULT_HISTORY_CAPACITY) }
}

impl ActivationHistory {
    /// A zero capacity is bumped to one so the latest record is always kept.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        ActivationHistory { records: VecDeque::with_capacity(capacity), capacity }
    }

    /// Append a record, evicting the oldest on overflow.
    pub fn push(&mut self, record: ActivationRecord) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn capacity(&self) -> usize { self.capacity }

    pub fn latest(&self) -> Option<&ActivationRecord> { self.records.back() }

    /// Records in chronological order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ActivationRecord> + '_ {
        self.records.iter()
    }

    /// How many of the stored records came from `source`.
    pub fn count_from(&self, source: ActivationSource) -> usize {
        self.records.iter().filter(|r| r.source == source).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(at: Millis) -> ActivationRecord {
        ActivationRecord { technique: TechniqueId::Blue, at, source: ActivationSource::Manual }
    }

    #[test]
    fn keeps_last_records_in_order() {
        let mut h = ActivationHistory::default();
        for i in 0..15 { h.push(rec(i)); }
        assert_eq!(h.len(), 10);
        let times: Vec<_> = h.iter().map(|r| r.at).collect();
        assert_eq!(times, (5..15).collect::<Vec<_>>());
        assert_eq!(h.latest().map(|r| r.at), Some(14));
    }

    #[test]
    fn zero_capacity_keeps_one() {
        let mut h = ActivationHistory::with_capacity(0);
        h.push(rec(1));
        h.push(rec(2));
        assert_eq!(h.len(), 1);
        assert_eq!(h.latest().map(|r| r.at), Some(2));
    }

    #[test]
    fn counts_by_source() {
        let mut h = ActivationHistory::default();
        h.push(rec(1));
        h.push(ActivationRecord { technique: TechniqueId::Red, at: 2, source: ActivationSource::Auto });
        assert_eq!(h.count_from(ActivationSource::Manual), 1);
        assert_eq!(h.count_from(ActivationSource::Auto), 1);
        assert_eq!(h.count_from(ActivationSource::Gesture), 0);
    }

    #[test]
    fn record_serializes_for_logs() {
        let json = serde_json::to_string(&rec(5)).unwrap();
        assert_eq!(json, r#"{"technique":"blue","at":5,"source":"manual"}"#);
    }
}
