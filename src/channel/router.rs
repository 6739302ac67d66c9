use std::sync::{
    Arc, Mutex, Weak,
    atomic::{AtomicU64, Ordering},
};

use serde::Serialize;
use tokio::{
    select,
    sync::mpsc::{Receiver, Sender, channel, error::TrySendError},
};
use tokio_util::sync::CancellationToken;

use crate::Result;

use super::{EventName, Message, Port};

/// Receiving end of a namespace registration.
pub type Inbox = Receiver<Arc<Message>>;

#[derive(Debug)]
struct Subscriber {
    id: u64,
    namespace: Arc<str>,
    sender: Sender<Arc<Message>>,
}

type Subscribers = Mutex<Vec<Subscriber>>;

/// Bidirectional, namespaced message channel between host and panel.
///
/// Inbound messages are routed to every registration of their namespace, in
/// registration order. Messages for namespaces nobody registered are dropped,
/// so a newer panel can talk to an older host. Outbound messages go through
/// an [`Outbox`] straight to the [`Port`].
///
/// Cheap to clone; clones share registrations.
#[derive(Clone)]
pub struct MessageChannel {
    port: Arc<dyn Port>,
    subscribers: Arc<Subscribers>,
    next_id: Arc<AtomicU64>,
}

impl MessageChannel {
    pub fn new<P: Port>(port: P) -> Self {
        Self::from_port(Arc::new(port))
    }

    pub fn from_port(port: Arc<dyn Port>) -> Self {
        Self {
            port,
            subscribers: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Registers a receiver for `namespace`.
    ///
    /// The registration stays active until the returned [`Registration`] is
    /// dropped or cancelled.
    pub fn register(
        &self,
        namespace: impl Into<Arc<str>>,
        capacity: usize,
    ) -> (Registration, Inbox) {
        let namespace = namespace.into();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = channel(capacity);
        tracing::debug!(%namespace, registration = id, "namespace registered");
        self.subscribers
            .lock()
            .expect("MessageChannel lock poisoned")
            .push(Subscriber {
                id,
                namespace,
                sender,
            });
        let registration = Registration {
            id,
            subscribers: Arc::downgrade(&self.subscribers),
        };
        (registration, receiver)
    }

    pub fn outbox(&self, namespace: impl Into<Arc<str>>) -> Outbox {
        Outbox {
            namespace: namespace.into(),
            port: self.port.clone(),
        }
    }

    /// Delivers an inbound message. Returns the number of registrations that
    /// received it.
    pub fn route(&self, message: Message) -> usize {
        let message = Arc::new(message);
        let subscribers = self.subscribers.lock().expect("MessageChannel lock poisoned");
        let mut delivered = 0;
        for subscriber in subscribers
            .iter()
            .filter(|s| *s.namespace == *message.name.namespace())
        {
            match subscriber.sender.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(
                        event = %message.name,
                        registration = subscriber.id,
                        "inbox full, dropping message"
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::trace!(
                        event = %message.name,
                        registration = subscriber.id,
                        "inbox closed"
                    );
                }
            }
        }
        if delivered == 0 {
            tracing::trace!(event = %message.name, "no registration for namespace, ignoring");
        }
        delivered
    }

    /// Parses and routes a raw JSON message. Malformed input is ignored.
    pub fn route_json(&self, raw: &str) -> usize {
        match Message::from_json(raw) {
            Ok(message) => self.route(message),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring malformed inbound message");
                0
            }
        }
    }

    /// Routes messages from `receiver` until it closes or `cancel` fires.
    pub async fn run(
        &self,
        mut receiver: Receiver<Message>,
        cancel: CancellationToken,
    ) -> Result<()> {
        loop {
            select! {
                _ = cancel.cancelled() => break,
                Some(message) = receiver.recv() => {
                    self.route(message);
                },
                else => break
            }
        }
        Ok(())
    }

    pub fn registrations(&self) -> usize {
        self.subscribers
            .lock()
            .expect("MessageChannel lock poisoned")
            .len()
    }
}

/// Active namespace registration. Dropping it deregisters the inbox.
#[derive(Debug)]
pub struct Registration {
    id: u64,
    subscribers: Weak<Subscribers>,
}

impl Registration {
    pub fn cancel(self) {
        drop(self)
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            if let Ok(mut subscribers) = subscribers.lock() {
                subscribers.retain(|s| s.id != self.id);
                tracing::debug!(registration = self.id, "namespace deregistered");
            }
        }
    }
}

/// Namespaced sender of outbound messages.
#[derive(Clone)]
pub struct Outbox {
    namespace: Arc<str>,
    port: Arc<dyn Port>,
}

impl Outbox {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Sends `namespace:action` with the given payload.
    pub fn send<P: Serialize>(&self, action: &str, payload: P) -> Result<()> {
        let message = Message::new(EventName::new(self.namespace.clone(), action), payload)?;
        tracing::trace!(event = %message.name, "sending");
        self.port.send(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelPort;
    use serde_json::json;

    fn channel_pair() -> (MessageChannel, Receiver<Message>) {
        let (port, rx) = ChannelPort::new(16);
        (MessageChannel::new(port), rx)
    }

    fn message(raw: &str) -> Message {
        Message::from_json(raw).unwrap()
    }

    #[test]
    fn test_routes_by_namespace_in_registration_order() {
        let (channel, _rx) = channel_pair();
        let (_a, mut inbox_a) = channel.register("view", 4);
        let (_b, mut inbox_b) = channel.register("view", 4);
        let (_c, mut inbox_c) = channel.register("route", 4);

        assert_eq!(channel.route(message(r#"{"type":"view:getTree"}"#)), 2);
        assert_eq!(inbox_a.try_recv().unwrap().name.action(), "getTree");
        assert_eq!(inbox_b.try_recv().unwrap().name.action(), "getTree");
        assert!(inbox_c.try_recv().is_err());
    }

    #[test]
    fn test_unknown_namespace_is_ignored() {
        let (channel, _rx) = channel_pair();
        let (_reg, mut inbox) = channel.register("view", 4);
        assert_eq!(channel.route(message(r#"{"type":"promise:getAll"}"#)), 0);
        assert!(inbox.try_recv().is_err());
    }

    #[test]
    fn test_malformed_json_is_ignored() {
        let (channel, _rx) = channel_pair();
        let (_reg, _inbox) = channel.register("view", 4);
        assert_eq!(channel.route_json("not json"), 0);
        assert_eq!(channel.route_json(r#"{"objectId":"obj1"}"#), 0);
    }

    #[test]
    fn test_dropping_registration_deregisters() {
        let (channel, _rx) = channel_pair();
        let (registration, _inbox) = channel.register("view", 4);
        assert_eq!(channel.registrations(), 1);
        registration.cancel();
        assert_eq!(channel.registrations(), 0);
        assert_eq!(channel.route(message(r#"{"type":"view:getTree"}"#)), 0);
    }

    #[test]
    fn test_outbox_prefixes_namespace() {
        let (channel, mut rx) = channel_pair();
        channel
            .outbox("view")
            .send("pinView", json!({"objectId": "obj1"}))
            .unwrap();
        let sent = rx.try_recv().unwrap();
        assert_eq!(sent.name.to_string(), "view:pinView");
        assert_eq!(sent.payload["objectId"], "obj1");
    }

    #[tokio::test]
    async fn test_run_pumps_until_cancelled() {
        let (channel, _rx) = channel_pair();
        let (_reg, mut inbox) = channel.register("view", 4);
        let (tx, rx) = tokio::sync::mpsc::channel(4);
        let cancel = CancellationToken::new();
        let pump = {
            let channel = channel.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { channel.run(rx, cancel).await })
        };

        tx.send(message(r#"{"type":"view:getTree"}"#)).await.unwrap();
        let routed = inbox.recv().await.unwrap();
        assert_eq!(routed.name.action(), "getTree");

        cancel.cancel();
        pump.await.unwrap().unwrap();
    }
}
