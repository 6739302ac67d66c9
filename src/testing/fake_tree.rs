use std::sync::{Arc, Mutex};

use crate::host::{ListenerId, LiveTree, MutationHub, MutationListener, ObjectRef};

use super::FakeView;

/// In-memory live tree with a settable root and manual mutation signals.
#[derive(Default)]
pub struct FakeTree {
    root: Mutex<Option<ObjectRef>>,
    hub: MutationHub,
}

impl FakeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: &Arc<FakeView>) -> Self {
        let tree = Self::new();
        let root: ObjectRef = root.clone();
        tree.set_root(Some(root));
        tree
    }

    pub fn set_root(&self, root: Option<ObjectRef>) {
        *self.root.lock().expect("FakeTree lock poisoned") = root;
    }

    /// Notifies mutation listeners, as the host does after re-rendering.
    pub fn mutate(&self) {
        self.hub.notify();
    }

    pub fn listeners(&self) -> usize {
        self.hub.len()
    }
}

impl LiveTree for FakeTree {
    fn root(&self) -> Option<ObjectRef> {
        self.root.lock().expect("FakeTree lock poisoned").clone()
    }

    fn subscribe(&self, listener: MutationListener) -> ListenerId {
        self.hub.subscribe(listener)
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.hub.unsubscribe(id)
    }
}
