// src/host/state.rs - Per-surface, per-tool-type annotation storage

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::host::viewport::SurfaceId;

/// Store-assigned identifier of an annotation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeasurementId(pub u64);

impl fmt::Display for MeasurementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Records kept in the store carry the id the store hands out
pub trait Identified {
    fn id(&self) -> MeasurementId;
    fn set_id(&mut self, id: MeasurementId);
}

/// Store shared by every input adapter of a surface
pub type SharedToolState<T> = Arc<RwLock<ToolStateStore<T>>>;

/// Ordered collections of records keyed by (surface, tool type)
#[derive(Debug)]
pub struct ToolStateStore<T> {
    next_id: u64,
    entries: HashMap<SurfaceId, HashMap<String, Vec<T>>>,
}

impl<T: Identified> ToolStateStore<T> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            entries: HashMap::new(),
        }
    }

    /// Wrap a fresh store for sharing
    pub fn shared() -> SharedToolState<T> {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Append a record, returning the id it was given
    pub fn add(&mut self, surface: &SurfaceId, tool_type: &str, mut record: T) -> MeasurementId {
        let id = MeasurementId(self.next_id);
        self.next_id += 1;
        record.set_id(id);

        self.entries
            .entry(surface.clone())
            .or_default()
            .entry(tool_type.to_string())
            .or_default()
            .push(record);

        debug!("Added {} record {} on surface {}", tool_type, id, surface);
        id
    }

    /// Records for the pair in insertion order, `None` when there are none
    pub fn get(&self, surface: &SurfaceId, tool_type: &str) -> Option<&[T]> {
        self.entries
            .get(surface)
            .and_then(|by_type| by_type.get(tool_type))
            .filter(|records| !records.is_empty())
            .map(Vec::as_slice)
    }

    pub fn get_mut(&mut self, surface: &SurfaceId, tool_type: &str) -> Option<&mut Vec<T>> {
        self.entries
            .get_mut(surface)
            .and_then(|by_type| by_type.get_mut(tool_type))
            .filter(|records| !records.is_empty())
    }

    pub fn find(&self, surface: &SurfaceId, tool_type: &str, id: MeasurementId) -> Option<&T> {
        self.get(surface, tool_type)?
            .iter()
            .find(|record| record.id() == id)
    }

    pub fn find_mut(
        &mut self,
        surface: &SurfaceId,
        tool_type: &str,
        id: MeasurementId,
    ) -> Option<&mut T> {
        self.get_mut(surface, tool_type)?
            .iter_mut()
            .find(|record| record.id() == id)
    }

    /// Remove a record; removing an unknown id is a no-op
    pub fn remove(&mut self, surface: &SurfaceId, tool_type: &str, id: MeasurementId) -> Option<T> {
        let records = self.get_mut(surface, tool_type)?;
        let index = records.iter().position(|record| record.id() == id)?;
        let removed = records.remove(index);

        debug!("Removed {} record {} from surface {}", tool_type, id, surface);
        Some(removed)
    }

    /// Drop every record of the pair
    pub fn clear(&mut self, surface: &SurfaceId, tool_type: &str) {
        if let Some(by_type) = self.entries.get_mut(surface) {
            by_type.remove(tool_type);
        }
    }

    pub fn len(&self, surface: &SurfaceId, tool_type: &str) -> usize {
        self.get(surface, tool_type).map_or(0, <[T]>::len)
    }
}

impl<T: Identified> Default for ToolStateStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Record {
        id: MeasurementId,
        label: &'static str,
    }

    impl Record {
        fn new(label: &'static str) -> Self {
            Self {
                id: MeasurementId(0),
                label,
            }
        }
    }

    impl Identified for Record {
        fn id(&self) -> MeasurementId {
            self.id
        }

        fn set_id(&mut self, id: MeasurementId) {
            self.id = id;
        }
    }

    #[test]
    fn test_add_get_remove_keeps_order() {
        let surface = SurfaceId::from("axial");
        let mut store = ToolStateStore::new();

        assert!(store.get(&surface, "length").is_none());

        let a = store.add(&surface, "length", Record::new("a"));
        let b = store.add(&surface, "length", Record::new("b"));
        let c = store.add(&surface, "length", Record::new("c"));
        assert_ne!(a, b);

        let labels: Vec<_> = store.get(&surface, "length").unwrap().iter().map(|r| r.label).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);

        assert_eq!(store.remove(&surface, "length", b).map(|r| r.label), Some("b"));
        assert!(store.remove(&surface, "length", b).is_none());
        assert_eq!(store.len(&surface, "length"), 2);
        assert_eq!(store.find(&surface, "length", c).map(|r| r.label), Some("c"));
    }

    #[test]
    fn test_keys_are_isolated() {
        let axial = SurfaceId::from("axial");
        let sagittal = SurfaceId::from("sagittal");
        let mut store = ToolStateStore::new();

        store.add(&axial, "length", Record::new("a"));
        store.add(&axial, "angle", Record::new("b"));

        assert_eq!(store.len(&axial, "length"), 1);
        assert_eq!(store.len(&axial, "angle"), 1);
        assert!(store.get(&sagittal, "length").is_none());

        store.clear(&axial, "length");
        assert!(store.get(&axial, "length").is_none());
        assert_eq!(store.len(&axial, "angle"), 1);
    }

    #[test]
    fn test_emptied_collection_reads_as_none() {
        let surface = SurfaceId::from("axial");
        let mut store = ToolStateStore::new();
        let id = store.add(&surface, "length", Record::new("a"));
        store.remove(&surface, "length", id);

        assert!(store.get(&surface, "length").is_none());
        assert!(store.get_mut(&surface, "length").is_none());
    }
}
