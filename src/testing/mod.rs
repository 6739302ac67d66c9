//! Fakes and a harness for driving the debugger without a real host.
//!
//! Enable with the `test-harness` feature:
//!
//! ```toml
//! [dev-dependencies]
//! view-debug = { version = "0.1", features = ["test-harness"] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! let root = FakeView::plain("App.ApplicationView")
//!     .with_template("application")
//!     .build();
//! let mut harness = Harness::start(
//!     FakeTree::with_root(&root),
//!     RecordingHost::new(),
//!     Config::default(),
//! )?;
//!
//! harness.command("getTree", json!({}))?;
//! harness.settle().await;
//! assert_eq!(harness.trees()[0].value.name, "application");
//! ```

mod fake_object;
mod fake_tree;
mod fake_view;
mod harness;
mod recording_host;

pub use fake_object::FakeObject;
pub use fake_tree::FakeTree;
pub use fake_view::{FakeView, FakeViewBuilder};
pub use harness::Harness;
pub use recording_host::{HostCall, RecordingHost};
