use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

use super::{HostValue, ObjectRef};

/// Opaque handle of a rendered element, supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub String);

impl fmt::Display for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bounding box in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Environment-specific actions (devtools integration, editor links).
pub trait HostAdapter: Send + Sync + 'static {
    /// Focus the host's element inspector on the rendered element.
    fn inspect_element(&self, surface: &SurfaceHandle) -> Result<()>;

    fn can_open_resource(&self) -> bool {
        false
    }

    fn open_resource(&self, location: &str) -> Result<()> {
        let _location = location;
        Err(Error::Unsupported)
    }
}

/// The two overlay layers drawn over the host's rendered surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// User-committed highlight, stays until hidden.
    Pinned,
    /// Transient highlight following the pointer.
    Preview,
}

/// Content of one highlight overlay.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Overlay {
    pub rect: Rect,
    /// Pinned overlays carry a close button.
    pub closable: bool,
    pub template: Option<String>,
    pub controller: Option<String>,
    pub view: Option<String>,
    pub component: Option<String>,
    pub model: Option<String>,
    /// Whether the model label can be sent to the console.
    pub model_is_object: bool,
}

/// Drawing surface for highlight overlays.
pub trait OverlaySurface: Send + Sync + 'static {
    /// Bounding box of the view's rendered output, `None` when not rendered.
    fn bounding_rect(&self, view: &ObjectRef) -> Option<Rect>;

    fn show(&self, layer: Layer, overlay: &Overlay) -> Result<()>;

    fn hide(&self, layer: Layer) -> Result<()>;

    /// Toggle the pointer-inspection affordances (cursor, click suppression).
    fn set_inspecting(&self, inspecting: bool) -> Result<()>;
}

/// Bridge to the panel's console and object inspector.
pub trait ConsoleBridge: Send + Sync + 'static {
    fn send_value_to_console(&self, value: &HostValue) -> Result<()>;

    /// Open the object in the panel's object inspector.
    fn send_object(&self, object: &ObjectRef) -> Result<()>;
}
