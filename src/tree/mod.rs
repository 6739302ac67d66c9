//! Display trees built from the live view tree.
//!
//! [`SnapshotBuilder`] walks the host's views, keeps the ones matching the
//! [visibility predicate](should_show) and describes each with a
//! [`NodeDescriptor`] whose ids stay resolvable until the next generation.

mod builder;
mod descriptor;
mod durations;
pub(crate) mod naming;
mod visibility;

pub use builder::SnapshotBuilder;
pub(crate) use builder::model_for_view;
pub use descriptor::{ControllerDescriptor, ModelDescriptor, NodeDescriptor, TreeNode, Walk};
pub use durations::Durations;
pub use visibility::{Options, should_show};
