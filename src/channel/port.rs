use tokio::sync::mpsc::{Receiver, Sender, channel};

use crate::Result;

use super::Message;

/// Raw outbound transport towards the inspection panel.
///
/// Sending is fire-and-forget: implementations must not block the caller.
pub trait Port: Send + Sync + 'static {
    fn send(&self, message: Message) -> Result<()>;
}

/// [`Port`] backed by a bounded tokio channel.
///
/// The receiving half is handed to whatever forwards messages across the
/// process boundary (a websocket, a browser extension port, a test).
#[derive(Debug, Clone)]
pub struct ChannelPort {
    sender: Sender<Message>,
}

impl ChannelPort {
    pub fn new(capacity: usize) -> (Self, Receiver<Message>) {
        let (sender, receiver) = channel(capacity);
        (Self { sender }, receiver)
    }
}

impl Port for ChannelPort {
    fn send(&self, message: Message) -> Result<()> {
        self.sender.try_send(message)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, channel::EventName};

    #[test]
    fn test_full_port_reports_capacity() {
        let (port, _rx) = ChannelPort::new(1);
        let msg = || Message::new(EventName::new("view", "viewTree"), ()).unwrap();
        assert!(port.send(msg()).is_ok());
        assert!(matches!(port.send(msg()), Err(Error::ChannelIsFull)));
    }

    #[test]
    fn test_closed_port_reports_closed() {
        let (port, rx) = ChannelPort::new(1);
        drop(rx);
        let msg = Message::new(EventName::new("view", "viewTree"), ()).unwrap();
        assert!(matches!(port.send(msg), Err(Error::ChannelClosed)));
    }
}
