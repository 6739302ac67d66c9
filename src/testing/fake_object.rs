use std::{
    borrow::Cow,
    sync::{Arc, Mutex},
};

use crate::host::{HostObject, HostValue};

/// In-memory host object: a controller, a model, or any plain object.
#[derive(Debug)]
pub struct FakeObject {
    class_name: String,
    key: Option<String>,
    description: Option<String>,
    model: Mutex<Option<HostValue>>,
}

impl FakeObject {
    pub fn new(class_name: &str) -> Self {
        Self {
            class_name: class_name.to_string(),
            key: None,
            description: None,
            model: Mutex::new(None),
        }
    }

    /// Same as [`FakeObject::new`]; reads better where a controller is meant.
    pub fn controller(class_name: &str) -> Self {
        Self::new(class_name)
    }

    /// Registered container key, e.g. `controller:posts/index`.
    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_model(self, model: HostValue) -> Self {
        *self.model.lock().expect("FakeObject lock poisoned") = Some(model);
        self
    }

    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn set_model(&self, model: Option<HostValue>) {
        *self.model.lock().expect("FakeObject lock poisoned") = model;
    }
}

impl HostObject for FakeObject {
    fn class_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.class_name)
    }

    fn container_key(&self) -> Option<Cow<'_, str>> {
        self.key.as_deref().map(Cow::Borrowed)
    }

    fn describe(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| self.class_name.clone())
    }

    fn model(&self) -> Option<HostValue> {
        self.model.lock().expect("FakeObject lock poisoned").clone()
    }
}
