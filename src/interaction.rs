//! Highlighting, pointer inspection and console forwarding.
//!
//! Every command addressing an object by id tolerates stale ids: the panel
//! may reference objects released by a rebuild it has not seen yet. Calls
//! into host collaborators are guarded so a failing or panicking host never
//! takes the debugger down with it.

use std::{
    borrow::Cow,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

use serde::Serialize;

use crate::{
    ObjectId, ObjectRegistry, Result,
    channel::Outbox,
    host::{
        ConsoleBridge, HostAdapter, HostValue, Layer, ObjectRef, Overlay, OverlaySurface, Rect,
        ViewNode, is_component,
    },
    inspect::inspect,
    protocol::{PinViewPayload, event},
    tree::{Options, model_for_view, should_show},
};

/// Pointer input over the host's rendered surface while inspecting.
#[derive(Clone)]
pub enum PointerEvent {
    /// The pointer moved over `target`, the innermost host object under it.
    Move { target: Option<ObjectRef> },
    Down,
    Up,
}

/// Clickable labels of the pinned overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayAction {
    Close,
    View,
    Component,
    Controller,
    Template,
    Model,
}

#[derive(Default)]
struct Pointer {
    candidate: Option<ObjectRef>,
    pressed: bool,
    dragged: bool,
}

pub struct InteractionController {
    registry: Arc<ObjectRegistry>,
    adapter: Arc<dyn HostAdapter>,
    overlay: Arc<dyn OverlaySurface>,
    console: Arc<dyn ConsoleBridge>,
    outbox: Outbox,
    pinned: Option<ObjectRef>,
    previewed: Option<ObjectRef>,
    inspecting: bool,
    pointer: Pointer,
}

impl InteractionController {
    pub fn new(
        registry: Arc<ObjectRegistry>,
        adapter: Arc<dyn HostAdapter>,
        overlay: Arc<dyn OverlaySurface>,
        console: Arc<dyn ConsoleBridge>,
        outbox: Outbox,
    ) -> Self {
        Self {
            registry,
            adapter,
            overlay,
            console,
            outbox,
            pinned: None,
            previewed: None,
            inspecting: false,
            pointer: Pointer::default(),
        }
    }

    #[inline]
    pub fn is_inspecting(&self) -> bool {
        self.inspecting
    }

    pub fn pinned(&self) -> Option<&ObjectRef> {
        self.pinned.as_ref()
    }

    pub fn previewed(&self) -> Option<&ObjectRef> {
        self.previewed.as_ref()
    }

    /// Pins the highlight on the view behind `id`.
    pub fn show_layer(&mut self, id: &ObjectId) {
        if let Some(view) = self.resolve(id) {
            self.highlight(view, Layer::Pinned);
        }
    }

    pub fn preview_layer(&mut self, id: &ObjectId) {
        if let Some(view) = self.resolve(id) {
            self.highlight(view, Layer::Preview);
        }
    }

    pub fn hide_layer(&mut self) {
        self.emit(event::UNPIN_VIEW, ());
        guarded("hide", || self.overlay.hide(Layer::Pinned));
        self.pinned = None;
    }

    pub fn hide_preview(&mut self) {
        guarded("hide", || self.overlay.hide(Layer::Preview));
        self.previewed = None;
    }

    pub fn start_inspecting(&mut self) {
        self.emit(event::START_INSPECTING, ());
        guarded("set_inspecting", || self.overlay.set_inspecting(true));
        self.inspecting = true;
        self.pointer = Pointer::default();
    }

    pub fn stop_inspecting(&mut self) {
        guarded("set_inspecting", || self.overlay.set_inspecting(false));
        self.inspecting = false;
        self.pointer = Pointer::default();
        self.hide_preview();
        self.emit(event::STOP_INSPECTING, ());
    }

    /// Tracks the pointer while inspecting. Moving previews the nearest
    /// shown view; a press and release without movement in between pins it
    /// and ends inspection.
    pub fn pointer(&mut self, event: PointerEvent, options: &Options) {
        if !self.inspecting {
            tracing::trace!("pointer event outside inspection, ignoring");
            return;
        }
        match event {
            PointerEvent::Move { target } => {
                if self.pointer.pressed {
                    self.pointer.dragged = true;
                }
                let nearest = target.and_then(|t| self.nearest_view(t, options));
                self.pointer.candidate = nearest.clone();
                if let Some(view) = nearest {
                    self.highlight(view, Layer::Preview);
                }
            }
            PointerEvent::Down => {
                self.pointer.pressed = true;
                self.pointer.dragged = false;
            }
            PointerEvent::Up => {
                if self.pointer.dragged {
                    self.pointer.pressed = false;
                    self.pointer.dragged = false;
                    return;
                }
                self.commit();
            }
        }
    }

    fn commit(&mut self) {
        if let Some(view) = self.pointer.candidate.take() {
            let component = is_component(&view);
            self.highlight(view.clone(), Layer::Pinned);
            if component {
                self.send_object(&view);
            }
        }
        self.stop_inspecting();
    }

    /// Walks up from `target` to the first view that is in the current
    /// snapshot and passes the visibility predicate.
    fn nearest_view(&self, target: ObjectRef, options: &Options) -> Option<ObjectRef> {
        let mut current = Some(target);
        while let Some(object) = current.take() {
            let view = object.as_view()?;
            if should_show(view, options) && self.registry.id_of(&object).is_some() {
                return Some(object.clone());
            }
            current = view.parent();
        }
        None
    }

    pub fn inspect_element(&mut self, id: &ObjectId) {
        if let Some(view) = self.resolve(id) {
            self.inspect_view(&view);
        }
    }

    fn inspect_view(&self, view: &ObjectRef) {
        let Some(surface) = view.as_view().and_then(|node| node.surface()) else {
            tracing::debug!(class = %view.class_name(), "view has no rendered surface");
            return;
        };
        guarded("inspect_element", || self.adapter.inspect_element(&surface));
    }

    /// Forwards the model of the view behind `id` to the console.
    pub fn send_model_to_console(&mut self, id: &ObjectId) {
        let Some(view) = self.resolve(id) else {
            return;
        };
        let model = view
            .as_view()
            .and_then(model_for_view)
            .filter(HostValue::is_truthy);
        match model {
            Some(model) => {
                guarded("send_value_to_console", || {
                    self.console.send_value_to_console(&model)
                });
            }
            None => tracing::debug!(object_id = %id, "view has no model"),
        }
    }

    pub fn open_resource(&mut self, location: &str) {
        if !self.adapter.can_open_resource() {
            tracing::debug!(location, "host cannot open resources");
            return;
        }
        guarded("open_resource", || self.adapter.open_resource(location));
    }

    /// Handles a click on a label of the pinned overlay.
    pub fn overlay_action(&mut self, action: OverlayAction) {
        let Some(view) = self.pinned.clone() else {
            tracing::trace!(?action, "no pinned view");
            return;
        };
        let controller = view.as_view().and_then(|node| node.controller());
        match action {
            OverlayAction::Close => self.hide_layer(),
            OverlayAction::View | OverlayAction::Component => self.send_object(&view),
            OverlayAction::Controller => {
                if let Some(controller) = controller {
                    self.send_object(&controller);
                }
            }
            OverlayAction::Template => self.inspect_view(&view),
            OverlayAction::Model => {
                let model = controller.and_then(|c| c.model());
                if let Some(HostValue::Object(model)) = model {
                    self.send_object(&model);
                }
            }
        }
    }

    /// Redraws the pinned highlight, e.g. after the viewport changed.
    pub fn rehighlight(&mut self) {
        if let Some(view) = self.pinned.clone() {
            self.highlight(view, Layer::Pinned);
        }
    }

    /// Leaves no overlay or inspection mode behind.
    pub fn teardown(&mut self) {
        if self.inspecting {
            self.stop_inspecting();
        }
        if self.pinned.is_some() {
            self.hide_layer();
        }
        self.hide_preview();
    }

    fn resolve(&self, id: &ObjectId) -> Option<ObjectRef> {
        let object = self.registry.resolve(id);
        if object.is_none() {
            tracing::debug!(object_id = %id, "stale object id, ignoring");
        }
        object
    }

    fn highlight(&mut self, view: ObjectRef, layer: Layer) {
        let Some(node) = view.as_view() else {
            tracing::debug!(class = %view.class_name(), "not a view, nothing to highlight");
            return;
        };
        let rect = guarded("bounding_rect", || Ok(self.overlay.bounding_rect(&view))).flatten();
        let Some(rect) = rect else {
            tracing::debug!(class = %view.class_name(), "view is not laid out");
            return;
        };
        let overlay = describe_overlay(&view, node, rect, layer == Layer::Pinned);

        match layer {
            Layer::Pinned => {
                self.hide_layer();
                self.hide_preview();
                if guarded("show", || self.overlay.show(layer, &overlay)).is_none() {
                    return;
                }
                if let Some(object_id) = self.registry.id_of(&view) {
                    self.emit(event::PIN_VIEW, PinViewPayload { object_id });
                }
                self.pinned = Some(view);
            }
            Layer::Preview => {
                if guarded("show", || self.overlay.show(layer, &overlay)).is_some() {
                    self.previewed = Some(view);
                }
            }
        }
    }

    fn send_object(&self, object: &ObjectRef) {
        guarded("send_object", || self.console.send_object(object));
    }

    fn emit<P: Serialize>(&self, action: &str, payload: P) {
        if let Err(e) = self.outbox.send(action, payload) {
            tracing::warn!(action, error = %e, "failed to notify panel");
        }
    }
}

fn describe_overlay(view: &ObjectRef, node: &dyn ViewNode, rect: Rect, closable: bool) -> Overlay {
    let controller = node.controller();
    let model = controller
        .as_ref()
        .and_then(|c| c.model())
        .filter(HostValue::is_truthy);
    let class = view.class_name().into_owned();
    let component = node.is_component();

    Overlay {
        rect,
        closable,
        template: node
            .template_name()
            .filter(|t| !t.is_empty())
            .map(Cow::into_owned),
        controller: controller
            .filter(|_| !component)
            .map(|c| c.class_name().into_owned()),
        view: (!component).then(|| class.clone()),
        component: component.then_some(class),
        model_is_object: model.as_ref().is_some_and(|m| m.as_object().is_some()),
        model: model.as_ref().map(inspect),
    }
}

/// Runs a collaborator call, logging failures and swallowing panics.
fn guarded<T>(operation: &'static str, f: impl FnOnce() -> Result<T>) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            tracing::warn!(operation, error = %e, "host collaborator failed");
            None
        }
        Err(_) => {
            tracing::error!(operation, "host collaborator panicked");
            None
        }
    }
}
