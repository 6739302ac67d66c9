use std::{
    borrow::Cow,
    sync::{
        Arc, Mutex, Weak,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::host::{HostObject, HostValue, ObjectRef, SurfaceHandle, ViewKind, ViewNode};

static NEXT_SURFACE: AtomicU64 = AtomicU64::new(1);

/// In-memory view node.
///
/// Views are linked with [`FakeView::append`]; the parent link is weak so
/// trees drop like the host's would.
pub struct FakeView {
    class_name: String,
    kind: ViewKind,
    key: Option<String>,
    template: Option<String>,
    tag: Option<String>,
    is_virtual: bool,
    controller: Option<ObjectRef>,
    context: Mutex<Option<HostValue>>,
    surface: Option<SurfaceHandle>,
    parent: Mutex<Weak<FakeView>>,
    children: Mutex<Vec<Arc<FakeView>>>,
}

pub struct FakeViewBuilder {
    class_name: String,
    kind: ViewKind,
    key: Option<String>,
    template: Option<String>,
    tag: Option<String>,
    is_virtual: bool,
    controller: Option<ObjectRef>,
    context: Option<HostValue>,
    surface: Option<SurfaceHandle>,
}

impl FakeView {
    pub fn plain(class_name: &str) -> FakeViewBuilder {
        FakeViewBuilder::new(class_name, ViewKind::Plain)
    }

    pub fn component(class_name: &str) -> FakeViewBuilder {
        FakeViewBuilder::new(class_name, ViewKind::Component)
    }

    pub fn link(class_name: &str) -> FakeViewBuilder {
        FakeViewBuilder::new(class_name, ViewKind::Link)
    }

    /// Appends `child` as the last child of `parent`.
    pub fn append(parent: &Arc<FakeView>, child: &Arc<FakeView>) {
        *child.parent.lock().expect("FakeView lock poisoned") = Arc::downgrade(parent);
        parent
            .children
            .lock()
            .expect("FakeView lock poisoned")
            .push(child.clone());
    }

    pub fn remove(parent: &Arc<FakeView>, child: &Arc<FakeView>) {
        parent
            .children
            .lock()
            .expect("FakeView lock poisoned")
            .retain(|c| !Arc::ptr_eq(c, child));
        *child.parent.lock().expect("FakeView lock poisoned") = Weak::new();
    }

    /// Switches the view's context away from its controller.
    pub fn set_context(&self, context: HostValue) {
        *self.context.lock().expect("FakeView lock poisoned") = Some(context);
    }
}

impl FakeViewBuilder {
    fn new(class_name: &str, kind: ViewKind) -> Self {
        let surface = SurfaceHandle(format!(
            "ember{}",
            NEXT_SURFACE.fetch_add(1, Ordering::Relaxed)
        ));
        Self {
            class_name: class_name.to_string(),
            kind,
            key: None,
            template: None,
            tag: None,
            is_virtual: false,
            controller: None,
            context: None,
            surface: Some(surface),
        }
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    pub fn with_template(mut self, template: &str) -> Self {
        self.template = Some(template.to_string());
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }

    pub fn virtual_view(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    pub fn with_controller<C: HostObject>(mut self, controller: &Arc<C>) -> Self {
        let controller: ObjectRef = controller.clone();
        self.controller = Some(controller);
        self
    }

    pub fn with_context(mut self, context: HostValue) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_surface(mut self, surface: &str) -> Self {
        self.surface = Some(SurfaceHandle(surface.to_string()));
        self
    }

    /// The view is not rendered, e.g. torn down mid-transition.
    pub fn without_surface(mut self) -> Self {
        self.surface = None;
        self
    }

    pub fn build(self) -> Arc<FakeView> {
        Arc::new(FakeView {
            class_name: self.class_name,
            kind: self.kind,
            key: self.key,
            template: self.template,
            tag: self.tag,
            is_virtual: self.is_virtual,
            controller: self.controller,
            context: Mutex::new(self.context),
            surface: self.surface,
            parent: Mutex::new(Weak::new()),
            children: Mutex::new(Vec::new()),
        })
    }
}

impl HostObject for FakeView {
    fn class_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.class_name)
    }

    fn container_key(&self) -> Option<Cow<'_, str>> {
        self.key.as_deref().map(Cow::Borrowed)
    }

    fn describe(&self) -> String {
        format!("<{}>", self.class_name)
    }

    fn as_view(&self) -> Option<&dyn ViewNode> {
        Some(self)
    }
}

impl ViewNode for FakeView {
    fn kind(&self) -> ViewKind {
        self.kind
    }

    fn template_name(&self) -> Option<Cow<'_, str>> {
        self.template.as_deref().map(Cow::Borrowed)
    }

    fn tag_name(&self) -> Option<Cow<'_, str>> {
        self.tag.as_deref().map(Cow::Borrowed)
    }

    fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    fn controller(&self) -> Option<ObjectRef> {
        self.controller.clone()
    }

    /// The explicit context, else the controller.
    fn context(&self) -> Option<HostValue> {
        let context = self.context.lock().expect("FakeView lock poisoned").clone();
        context.or_else(|| self.controller.clone().map(HostValue::Object))
    }

    fn parent(&self) -> Option<ObjectRef> {
        let parent = self.parent.lock().expect("FakeView lock poisoned").upgrade();
        parent.map(|p| p as ObjectRef)
    }

    fn children(&self) -> Vec<ObjectRef> {
        self.children
            .lock()
            .expect("FakeView lock poisoned")
            .iter()
            .map(|c| c.clone() as ObjectRef)
            .collect()
    }

    fn surface(&self) -> Option<SurfaceHandle> {
        self.surface.clone()
    }
}
