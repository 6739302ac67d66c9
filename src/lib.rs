//! View debug - live view-tree introspection for an inspection panel
//!
//! Walks a host's view hierarchy, hands out stable ids for the objects it
//! describes, and streams display trees to a panel over a namespaced
//! message port. The panel answers with commands to highlight views,
//! inspect their elements and forward their models to a console.
//!
//! The host plugs in through the traits in [`host`]; [`ViewDebug`] drives
//! everything from a single task.

mod config;
mod debounce;
mod error;
mod interaction;
mod object_id;
mod registry;
mod view_debug;

pub mod channel;
pub mod host;
pub mod inspect;
pub mod protocol;
pub mod tree;

#[cfg(any(test, feature = "test-harness"))]
pub mod testing;

pub use config::Config;
pub use error::Error;
pub use interaction::{InteractionController, OverlayAction, PointerEvent};
pub use object_id::ObjectId;
pub use registry::ObjectRegistry;
pub use view_debug::{HostSignal, ViewDebug, ViewDebugBuilder, ViewDebugHandle};

pub type Result<T = ()> = std::result::Result<T, Error>;
