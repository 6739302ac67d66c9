use std::collections::HashMap;

use crate::ObjectId;

/// Render durations reported by the host's instrumentation, keyed by id.
///
/// Entries are only overwritten, never pruned. An entry stops matching once
/// its view is released, since the view gets a fresh id when shown again.
#[derive(Debug, Clone, Default)]
pub struct Durations(HashMap<ObjectId, f64>);

impl Durations {
    pub fn merge<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (ObjectId, f64)>,
    {
        self.0.extend(entries);
    }

    pub fn get(&self, id: &ObjectId) -> Option<f64> {
        self.0.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
