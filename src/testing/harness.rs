use std::{sync::Arc, time::Duration};

use serde_json::Value;
use tokio::{sync::mpsc::Receiver, task::JoinHandle};

use crate::{
    Config, Result, ViewDebug, ViewDebugHandle,
    channel::{ChannelPort, EventName, Message, MessageChannel},
    protocol::{ViewTreePayload, event},
    tree::TreeNode,
};

use super::{FakeTree, RecordingHost};

/// A running [`ViewDebug`] wired to a fake tree, a recording host and an
/// in-memory panel.
///
/// Meant for tests on a paused clock (`#[tokio::test(start_paused = true)]`),
/// where [`settle`](Harness::settle) lets every pending timer fire instantly.
pub struct Harness {
    tree: Arc<FakeTree>,
    host: Arc<RecordingHost>,
    channel: MessageChannel,
    outbound: Receiver<Message>,
    handle: ViewDebugHandle,
    namespace: Arc<str>,
    settle_time: Duration,
    task: Option<JoinHandle<Result<()>>>,
}

impl Harness {
    /// Builds and spawns the service. Must be called inside a tokio runtime.
    pub fn start(tree: FakeTree, host: RecordingHost, config: Config) -> Result<Self> {
        let tree = Arc::new(tree);
        let host = Arc::new(host);
        let (port, outbound) = ChannelPort::new(config.channel_size.max(64));
        let channel = MessageChannel::new(port);
        let namespace = config.namespace.clone();
        let settle_time =
            (config.rebuild_delay + config.resize_delay) * 4 + Duration::from_millis(100);
        let (debug, handle) = ViewDebug::builder(config)
            .tree(tree.clone())
            .adapter(host.clone())
            .overlay(host.clone())
            .console(host.clone())
            .channel(channel.clone())
            .build()?;
        Ok(Self {
            tree,
            host,
            channel,
            outbound,
            handle,
            namespace,
            settle_time,
            task: Some(debug.spawn()),
        })
    }

    pub fn tree(&self) -> &FakeTree {
        &self.tree
    }

    pub fn host(&self) -> &RecordingHost {
        &self.host
    }

    pub fn handle(&self) -> &ViewDebugHandle {
        &self.handle
    }

    pub fn channel(&self) -> &MessageChannel {
        &self.channel
    }

    /// Sends a panel command in the service's namespace.
    pub fn command(&self, action: &str, payload: Value) -> Result<usize> {
        let name = EventName::new(self.namespace.clone(), action);
        Ok(self.channel.route(Message::new(name, payload)?))
    }

    /// Sends raw JSON as the panel would put it on the wire.
    pub fn send_raw(&self, raw: &str) -> usize {
        self.channel.route_json(raw)
    }

    /// Lets the service drain its queues and fire pending timers.
    pub async fn settle(&self) {
        tokio::time::sleep(self.settle_time).await;
    }

    /// Messages sent to the panel since the last drain.
    pub fn drain(&mut self) -> Vec<Message> {
        let mut messages = Vec::new();
        while let Ok(message) = self.outbound.try_recv() {
            messages.push(message);
        }
        messages
    }

    pub fn actions(&mut self) -> Vec<String> {
        self.drain()
            .into_iter()
            .map(|m| m.name.action().to_string())
            .collect()
    }

    /// Snapshots sent since the last drain; other messages are dropped.
    pub fn trees(&mut self) -> Vec<TreeNode> {
        self.drain()
            .into_iter()
            .filter(|m| m.name.action() == event::VIEW_TREE)
            .filter_map(|m| m.payload_as::<ViewTreePayload>().ok())
            .map(|payload| payload.tree)
            .collect()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stops the service and waits for its teardown.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.handle.shutdown();
        match self.task.take() {
            Some(task) => task.await?,
            None => Ok(()),
        }
    }
}
