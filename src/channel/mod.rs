//! Namespaced message channel between the host and the inspection panel.

mod handlers;
mod message;
mod port;
mod router;

pub use handlers::{Handler, HandlerTable};
pub use message::{EventName, Message};
pub use port::{ChannelPort, Port};
pub use router::{Inbox, MessageChannel, Outbox, Registration};
