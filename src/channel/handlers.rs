use std::sync::Arc;

use crate::Result;

use super::Message;

/// Handler of one inbound action. Errors are logged by the table.
pub type Handler<S> = fn(&mut S, &Message) -> Result<()>;

/// Action-to-handler table of one component.
///
/// Components build their table once and dispatch every message of their
/// namespace through it. Handlers run in registration order; actions without
/// a handler are ignored.
pub struct HandlerTable<S> {
    handlers: Vec<(Arc<str>, Handler<S>)>,
}

impl<S> Default for HandlerTable<S> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<S> HandlerTable<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, action: &str, handler: Handler<S>) -> Self {
        self.handlers.push((Arc::from(action), handler));
        self
    }

    /// Runs every handler registered for the message's action.
    /// Returns how many handlers ran.
    pub fn dispatch(&self, state: &mut S, message: &Message) -> usize {
        let mut handled = 0;
        for (_, handler) in self
            .handlers
            .iter()
            .filter(|(action, _)| **action == *message.name.action())
        {
            if let Err(e) = handler(state, message) {
                tracing::warn!(event = %message.name, error = %e, "command ignored");
            }
            handled += 1;
        }
        if handled == 0 {
            tracing::trace!(event = %message.name, "no handler for action, ignoring");
        }
        handled
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.handlers.iter().map(|(action, _)| action.as_ref())
    }
}
