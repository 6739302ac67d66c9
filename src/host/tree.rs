use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};

use super::ObjectRef;

/// Callback invoked by the host after its view tree changed.
pub type MutationListener = Arc<dyn Fn() + Send + Sync>;

/// Token returned by [`LiveTree::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Read-only access to the host's live view tree.
pub trait LiveTree: Send + Sync + 'static {
    /// The root view, or `None` while the application has no rendered root
    /// (e.g. between a reset and the next render).
    fn root(&self) -> Option<ObjectRef>;

    fn subscribe(&self, listener: MutationListener) -> ListenerId;

    fn unsubscribe(&self, id: ListenerId);
}

/// Publish/subscribe list of mutation listeners.
///
/// Hosts embed one of these to implement the subscription half of
/// [`LiveTree`] and call [`notify`](MutationHub::notify) after each change.
#[derive(Default)]
pub struct MutationHub {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(ListenerId, MutationListener)>>,
}

impl MutationHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: MutationListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .expect("MutationHub lock poisoned")
            .push((id, listener));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        self.listeners
            .lock()
            .expect("MutationHub lock poisoned")
            .retain(|(listener_id, _)| *listener_id != id);
    }

    /// Invoke every listener in subscription order.
    pub fn notify(&self) {
        // Snapshot so listeners may (un)subscribe while being notified.
        let listeners: Vec<MutationListener> = self
            .listeners
            .lock()
            .expect("MutationHub lock poisoned")
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener();
        }
    }

    pub fn len(&self) -> usize {
        self.listeners
            .lock()
            .expect("MutationHub lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
