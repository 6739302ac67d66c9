use std::{borrow::Cow, sync::Arc};

use super::{HostValue, SurfaceHandle};

/// Shared handle to a live object owned by the host application.
///
/// The registry keeps one of these while an id is retained; the host keeps
/// its own handles and may drop them at any time.
pub type ObjectRef = Arc<dyn HostObject>;

/// A live object in the host's object graph.
///
/// Only the metadata needed to label and describe the object is required.
/// Views additionally expose [`ViewNode`] through [`as_view`](HostObject::as_view),
/// and controllers expose their model through [`model`](HostObject::model).
pub trait HostObject: Send + Sync + 'static {
    /// Fully-qualified class name, e.g. `App.PostsController`.
    fn class_name(&self) -> Cow<'_, str>;

    /// Key the object was registered under in the host container,
    /// e.g. `controller:posts` or `component:x-avatar`.
    fn container_key(&self) -> Option<Cow<'_, str>> {
        None
    }

    /// Human-readable representation of the object.
    fn describe(&self) -> String {
        self.class_name().into_owned()
    }

    fn as_view(&self) -> Option<&dyn ViewNode> {
        None
    }

    /// The model this object presents, for controller-like objects.
    fn model(&self) -> Option<HostValue> {
        None
    }
}

/// Classification of a view affecting labeling and metadata attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewKind {
    #[default]
    Plain,
    Component,
    Link,
}

/// Read-only accessors of one node in the live view tree.
pub trait ViewNode {
    fn kind(&self) -> ViewKind;

    /// Explicit template or debug template name.
    fn template_name(&self) -> Option<Cow<'_, str>>;

    /// Rendered tag. `Some("")` marks a tagless view, `None` the default tag.
    fn tag_name(&self) -> Option<Cow<'_, str>>;

    /// Non-rendering view (no element of its own).
    fn is_virtual(&self) -> bool;

    fn controller(&self) -> Option<ObjectRef>;

    /// Rendering context, usually the controller.
    fn context(&self) -> Option<HostValue>;

    fn parent(&self) -> Option<ObjectRef>;

    /// Child views in render order.
    fn children(&self) -> Vec<ObjectRef>;

    /// Handle of the rendered element, if the view currently has one.
    fn surface(&self) -> Option<SurfaceHandle>;

    fn is_component(&self) -> bool {
        self.kind() == ViewKind::Component
    }
}

/// Identity of a host object, derived from its data pointer.
///
/// Only meaningful while a strong reference keeps the allocation alive,
/// which is what the registry guarantees for retained objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Identity(usize);

impl Identity {
    pub(crate) fn of(object: &ObjectRef) -> Self {
        Identity(Arc::as_ptr(object) as *const () as usize)
    }
}

/// Identity comparison of two host objects.
///
/// Compares data pointers only, so two handles of the same allocation are
/// equal regardless of the vtable they were created with.
pub fn same_object(a: &ObjectRef, b: &ObjectRef) -> bool {
    Identity::of(a) == Identity::of(b)
}

pub(crate) fn same_optional(a: Option<&ObjectRef>, b: Option<&ObjectRef>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => same_object(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Whether the object is a component-kind view.
pub fn is_component(object: &ObjectRef) -> bool {
    object.as_view().is_some_and(|view| view.is_component())
}
