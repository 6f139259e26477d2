use crate::record::{Record, RecordKind};
use serde::Serialize;
use std::collections::BTreeMap;

/// Completed records grouped by kind. Within a kind, records keep the order in
/// which they were sealed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordStore {
    records: BTreeMap<RecordKind, Vec<Record>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Record) {
        self.records.entry(record.kind()).or_default().push(record);
    }

    /// Records of one kind, in close order.
    pub fn get(&self, kind: RecordKind) -> &[Record] {
        self.records.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The record of `kind` pushed last, for hooks that extend it.
    pub fn last_mut(&mut self, kind: RecordKind) -> Option<&mut Record> {
        self.records.get_mut(&kind).and_then(|records| records.last_mut())
    }

    /// Non-empty kinds in dump order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordKind, &[Record])> {
        self.records
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(kind, records)| (*kind, records.as_slice()))
    }

    /// Moves every record of `other` behind the records already held here.
    pub fn append(&mut self, other: RecordStore) {
        for (kind, mut records) in other.records {
            self.records.entry(kind).or_default().append(&mut records);
        }
    }

    pub fn count(&self, kind: RecordKind) -> usize {
        self.get(kind).len()
    }

    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
