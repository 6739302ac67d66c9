//! Interfaces of the host application the debugger observes.
//!
//! The host owns the live view tree and the rendered surface. The debugger
//! only reads the tree through [`LiveTree`] and [`ViewNode`], and delegates
//! anything environment-specific to [`HostAdapter`], [`OverlaySurface`] and
//! [`ConsoleBridge`].

mod collaborators;
mod object;
mod tree;
mod value;

pub use collaborators::{
    ConsoleBridge, HostAdapter, Layer, Overlay, OverlaySurface, Rect, SurfaceHandle,
};
pub(crate) use object::{Identity, same_optional};
pub use object::{HostObject, ObjectRef, ViewKind, ViewNode, is_component, same_object};
pub use tree::{ListenerId, LiveTree, MutationHub, MutationListener};
pub use value::{HostValue, Scalar};
