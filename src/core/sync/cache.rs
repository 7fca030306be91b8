//! Per-run lookup cache for get-or-create calls

use crate::adapters::crm::NamedEntity;
use crate::domain::RecordId;
use std::collections::HashMap;

/// Ids of records already resolved during this run
///
/// Keys are the entity kind plus its lookup values joined with `|`.
#[derive(Debug, Default)]
pub struct LookupCache {
    entries: HashMap<(NamedEntity, String), RecordId>,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key for a set of lookup values
    pub fn key(values: &[&str]) -> String {
        values.join("|")
    }

    pub fn get(&self, entity: NamedEntity, values: &[&str]) -> Option<&RecordId> {
        self.entries.get(&(entity, Self::key(values)))
    }

    pub fn insert(&mut self, entity: NamedEntity, values: &[&str], id: RecordId) {
        self.entries.insert((entity, Self::key(values)), id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
