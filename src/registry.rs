use std::{collections::HashMap, sync::Mutex};

use crate::{
    ObjectId,
    host::{Identity, ObjectRef},
};

struct Inner {
    next_seq: u64,
    objects: HashMap<ObjectId, ObjectRef>,
    ids: HashMap<Identity, ObjectId>,
}

/// Identity table that lets the panel refer to live host objects by id.
///
/// Retaining an object stores a strong handle to it, so the id keeps
/// resolving until [`release`](ObjectRegistry::release) drops that handle.
/// The host keeps its own handles and may consider the object stale long
/// before; the registry never assumes it is the only holder.
///
/// The same object (by identity, not value) always maps to the same id while
/// retained. Ids are minted from a monotonic counter and never reused.
///
/// Shared between the snapshot builder and the interaction controller, which
/// both run on the debugger's task, so the lock is never contended across an
/// await point.
pub struct ObjectRegistry {
    prefix: Box<str>,
    inner: Mutex<Inner>,
}

impl ObjectRegistry {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.into(),
            inner: Mutex::new(Inner {
                next_seq: 0,
                objects: HashMap::new(),
                ids: HashMap::new(),
            }),
        }
    }

    /// Returns the id of `object`, minting one if it is not retained yet.
    pub fn retain(&self, object: &ObjectRef) -> ObjectId {
        let identity = Identity::of(object);
        let mut inner = self.inner.lock().expect("ObjectRegistry lock poisoned");
        if let Some(id) = inner.ids.get(&identity) {
            return id.clone();
        }
        inner.next_seq += 1;
        let id = ObjectId::mint(&self.prefix, inner.next_seq);
        inner.ids.insert(identity, id.clone());
        inner.objects.insert(id.clone(), object.clone());
        tracing::trace!(object_id = %id, class = %object.class_name(), "retained");
        id
    }

    /// Drops the mapping for `id`. Unknown ids are ignored.
    pub fn release(&self, id: &ObjectId) {
        let mut inner = self.inner.lock().expect("ObjectRegistry lock poisoned");
        Self::release_locked(&mut inner, id);
    }

    pub fn release_all<'a, I>(&self, ids: I)
    where
        I: IntoIterator<Item = &'a ObjectId>,
    {
        let mut inner = self.inner.lock().expect("ObjectRegistry lock poisoned");
        for id in ids {
            Self::release_locked(&mut inner, id);
        }
    }

    fn release_locked(inner: &mut Inner, id: &ObjectId) {
        if let Some(object) = inner.objects.remove(id) {
            inner.ids.remove(&Identity::of(&object));
            tracing::trace!(object_id = %id, "released");
        }
    }

    /// Looks up a retained object. Stale ids yield `None`.
    pub fn resolve(&self, id: &ObjectId) -> Option<ObjectRef> {
        let inner = self.inner.lock().expect("ObjectRegistry lock poisoned");
        inner.objects.get(id).cloned()
    }

    /// Id of `object` if it is currently retained.
    pub fn id_of(&self, object: &ObjectRef) -> Option<ObjectId> {
        let inner = self.inner.lock().expect("ObjectRegistry lock poisoned");
        inner.ids.get(&Identity::of(object)).cloned()
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        let inner = self.inner.lock().expect("ObjectRegistry lock poisoned");
        inner.objects.contains_key(id)
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.lock().expect("ObjectRegistry lock poisoned");
        inner.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
