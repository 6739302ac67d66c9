use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    Error, Result,
    host::{
        ConsoleBridge, HostAdapter, HostValue, Layer, ObjectRef, Overlay, OverlaySurface, Rect,
        SurfaceHandle,
    },
    inspect::inspect,
};

/// One call made by the debugger into the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    InspectElement(SurfaceHandle),
    OpenResource(String),
    Show(Layer, Overlay),
    Hide(Layer),
    Inspecting(bool),
    /// Inspected value sent to the console.
    ConsoleValue(String),
    /// Class name of the object sent to the console.
    SendObject(String),
}

/// Host adapter, overlay surface and console bridge in one, recording every
/// call. Can be switched to fail or panic on every call.
pub struct RecordingHost {
    calls: Mutex<Vec<HostCall>>,
    rect: Mutex<Option<Rect>>,
    can_open: bool,
    failing: AtomicBool,
    panicking: AtomicBool,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            rect: Mutex::new(Some(Rect {
                top: 10.0,
                left: 20.0,
                width: 300.0,
                height: 120.0,
            })),
            can_open: false,
            failing: AtomicBool::new(false),
            panicking: AtomicBool::new(false),
        }
    }
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resources(mut self) -> Self {
        self.can_open = true;
        self
    }

    /// Bounding rect reported for every view; `None` means not laid out.
    pub fn set_rect(&self, rect: Option<Rect>) {
        *self.rect.lock().expect("RecordingHost lock poisoned") = rect;
    }

    pub fn fail_calls(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn panic_on_calls(&self, panicking: bool) {
        self.panicking.store(panicking, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().expect("RecordingHost lock poisoned").clone()
    }

    pub fn clear(&self) {
        self.calls.lock().expect("RecordingHost lock poisoned").clear();
    }

    /// Overlays shown on `layer`, oldest first.
    pub fn shown(&self, layer: Layer) -> Vec<Overlay> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Show(l, overlay) if l == layer => Some(overlay),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: HostCall) -> Result<()> {
        self.calls
            .lock()
            .expect("RecordingHost lock poisoned")
            .push(call);
        if self.panicking.load(Ordering::SeqCst) {
            panic!("host collaborator panicked");
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::host("host collaborator unavailable"));
        }
        Ok(())
    }
}

impl HostAdapter for RecordingHost {
    fn inspect_element(&self, surface: &SurfaceHandle) -> Result<()> {
        self.record(HostCall::InspectElement(surface.clone()))
    }

    fn can_open_resource(&self) -> bool {
        self.can_open
    }

    fn open_resource(&self, location: &str) -> Result<()> {
        self.record(HostCall::OpenResource(location.to_string()))
    }
}

impl OverlaySurface for RecordingHost {
    fn bounding_rect(&self, _view: &ObjectRef) -> Option<Rect> {
        *self.rect.lock().expect("RecordingHost lock poisoned")
    }

    fn show(&self, layer: Layer, overlay: &Overlay) -> Result<()> {
        self.record(HostCall::Show(layer, overlay.clone()))
    }

    fn hide(&self, layer: Layer) -> Result<()> {
        self.record(HostCall::Hide(layer))
    }

    fn set_inspecting(&self, inspecting: bool) -> Result<()> {
        self.record(HostCall::Inspecting(inspecting))
    }
}

impl ConsoleBridge for RecordingHost {
    fn send_value_to_console(&self, value: &HostValue) -> Result<()> {
        self.record(HostCall::ConsoleValue(inspect(value)))
    }

    fn send_object(&self, object: &ObjectRef) -> Result<()> {
        self.record(HostCall::SendObject(object.class_name().into_owned()))
    }
}
