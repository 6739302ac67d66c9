use std::sync::Arc;

use tokio::{
    select,
    sync::{
        Notify,
        mpsc::{self, Receiver, Sender},
    },
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    Config, Error, ObjectId, ObjectRegistry, Result,
    channel::{HandlerTable, Inbox, Message, MessageChannel, Outbox, Registration},
    debounce::Debounce,
    host::{ConsoleBridge, HostAdapter, ListenerId, LiveTree, ObjectRef, OverlaySurface},
    interaction::{InteractionController, OverlayAction, PointerEvent},
    protocol::{
        InspectViewsPayload, ObjectIdPayload, OpenResourcePayload, SetOptionsPayload,
        ViewTreePayload, command, event,
    },
    tree::{Options, SnapshotBuilder},
};

/// Host-side input that does not come from the panel.
pub enum HostSignal {
    Pointer(PointerEvent),
    Resize,
    Overlay(OverlayAction),
    Durations(Vec<(ObjectId, f64)>),
}

/// The view debugger service.
///
/// Owns the registry, the snapshot builder and the interaction controller,
/// and drives them from a single task: panel commands, host signals, tree
/// mutations and timers are all handled by [`ViewDebug::run`], one at a
/// time, so a rebuild never interleaves with a command.
///
/// # Examples
///
/// ```rust,ignore
/// let (port, outbound) = ChannelPort::new(128);
/// let channel = MessageChannel::new(port);
/// let (debug, handle) = ViewDebug::builder(Config::default())
///     .tree(live_tree)
///     .adapter(adapter)
///     .overlay(overlay)
///     .console(console)
///     .channel(channel.clone())
///     .build()?;
/// let task = debug.spawn();
/// // ... forward `outbound` to the panel, feed panel messages to `channel`
/// handle.shutdown();
/// task.await??;
/// ```
pub struct ViewDebug {
    id: Uuid,
    config: Config,
    tree: Arc<dyn LiveTree>,
    registry: Arc<ObjectRegistry>,
    builder: SnapshotBuilder,
    interaction: InteractionController,
    options: Options,
    outbox: Outbox,
    handlers: Arc<HandlerTable<ViewDebug>>,
    inbox: Inbox,
    registration: Option<Registration>,
    signals: Receiver<HostSignal>,
    mutations: Arc<Notify>,
    listener: Option<ListenerId>,
    rebuild: Debounce,
    resize: Debounce,
    cancel: CancellationToken,
}

impl ViewDebug {
    pub fn builder(config: Config) -> ViewDebugBuilder {
        ViewDebugBuilder {
            config,
            tree: None,
            adapter: None,
            overlay: None,
            console: None,
            channel: None,
        }
    }

    /// Instance id, also recorded on the service's tracing span.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn registry(&self) -> &Arc<ObjectRegistry> {
        &self.registry
    }

    pub fn options(&self) -> Options {
        self.options
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    /// Runs until the handle shuts the service down, then tears down.
    pub async fn run(&mut self) -> Result<()> {
        let span = tracing::debug_span!("view_debug", instance = %self.id);
        self.event_loop().instrument(span).await
    }

    pub fn spawn(mut self) -> JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }

    async fn event_loop(&mut self) -> Result<()> {
        tracing::debug!(namespace = %self.config.namespace, "view debugger started");
        loop {
            select! {
                _ = self.cancel.cancelled() => break,
                Some(message) = self.inbox.recv() => {
                    self.dispatch(&message);
                },
                Some(signal) = self.signals.recv() => {
                    self.on_signal(signal);
                },
                _ = self.mutations.notified() => {
                    self.on_mutation();
                },
                _ = self.rebuild.fired() => {
                    self.send_tree();
                },
                _ = self.resize.fired() => {
                    self.interaction.rehighlight();
                },
            }
        }
        self.teardown();
        Ok(())
    }

    fn dispatch(&mut self, message: &Message) {
        tracing::debug!(event = %message.name, "command received");
        let handlers = self.handlers.clone();
        handlers.dispatch(self, message);
    }

    fn on_signal(&mut self, signal: HostSignal) {
        match signal {
            HostSignal::Pointer(pointer) => self.interaction.pointer(pointer, &self.options),
            HostSignal::Resize => self.resize.schedule(self.config.resize_delay),
            HostSignal::Overlay(action) => self.interaction.overlay_action(action),
            HostSignal::Durations(entries) => {
                self.builder.update_durations(entries);
                self.schedule_rebuild();
            }
        }
    }

    fn on_mutation(&mut self) {
        tracing::trace!("view tree mutated");
        self.schedule_rebuild();
        self.interaction.hide_layer();
    }

    fn schedule_rebuild(&mut self) {
        self.rebuild.schedule(self.config.rebuild_delay);
    }

    /// Builds a new generation and sends it. A pending debounced rebuild is
    /// superseded.
    fn send_tree(&mut self) {
        if self.rebuild.is_pending() {
            tracing::trace!("superseding pending rebuild");
        }
        self.rebuild.cancel();
        match self.builder.build(self.tree.as_ref(), &self.options) {
            Some(tree) => {
                if let Err(e) = self.outbox.send(event::VIEW_TREE, ViewTreePayload { tree }) {
                    tracing::warn!(error = %e, "failed to send view tree");
                }
            }
            None => tracing::debug!("no view tree to send"),
        }
    }

    /// Releases every retained object and detaches from the host and the
    /// channel. Safe to call more than once.
    pub fn teardown(&mut self) {
        let Some(registration) = self.registration.take() else {
            return;
        };
        self.rebuild.cancel();
        self.resize.cancel();
        if let Some(listener) = self.listener.take() {
            self.tree.unsubscribe(listener);
        }
        self.interaction.teardown();
        self.builder.release_generation();
        registration.cancel();
        tracing::debug!(retained = self.registry.len(), "view debugger torn down");
    }
}

impl Drop for ViewDebug {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn get_tree(this: &mut ViewDebug, _: &Message) -> Result<()> {
    this.send_tree();
    Ok(())
}

fn set_options(this: &mut ViewDebug, message: &Message) -> Result<()> {
    let payload: SetOptionsPayload = message.payload_as()?;
    this.options = payload.options;
    this.schedule_rebuild();
    Ok(())
}

fn inspect_views(this: &mut ViewDebug, message: &Message) -> Result<()> {
    let payload: InspectViewsPayload = message.payload_as()?;
    if payload.inspect {
        this.interaction.start_inspecting();
    } else {
        this.interaction.stop_inspecting();
    }
    Ok(())
}

fn show_layer(this: &mut ViewDebug, message: &Message) -> Result<()> {
    let payload: ObjectIdPayload = message.payload_as()?;
    this.interaction.show_layer(&payload.object_id);
    Ok(())
}

fn preview_layer(this: &mut ViewDebug, message: &Message) -> Result<()> {
    let payload: ObjectIdPayload = message.payload_as()?;
    this.interaction.preview_layer(&payload.object_id);
    Ok(())
}

fn hide_layer(this: &mut ViewDebug, _: &Message) -> Result<()> {
    this.interaction.hide_layer();
    Ok(())
}

fn hide_preview(this: &mut ViewDebug, _: &Message) -> Result<()> {
    this.interaction.hide_preview();
    Ok(())
}

fn inspect_element(this: &mut ViewDebug, message: &Message) -> Result<()> {
    let payload: ObjectIdPayload = message.payload_as()?;
    this.interaction.inspect_element(&payload.object_id);
    Ok(())
}

fn send_model_to_console(this: &mut ViewDebug, message: &Message) -> Result<()> {
    let payload: ObjectIdPayload = message.payload_as()?;
    this.interaction.send_model_to_console(&payload.object_id);
    Ok(())
}

fn open_resource(this: &mut ViewDebug, message: &Message) -> Result<()> {
    let payload: OpenResourcePayload = message.payload_as()?;
    this.interaction.open_resource(&payload.location);
    Ok(())
}

fn handler_table() -> HandlerTable<ViewDebug> {
    HandlerTable::new()
        .on(command::GET_TREE, get_tree)
        .on(command::SET_OPTIONS, set_options)
        .on(command::INSPECT_VIEWS, inspect_views)
        .on(command::SHOW_LAYER, show_layer)
        .on(command::PREVIEW_LAYER, preview_layer)
        .on(command::HIDE_LAYER, hide_layer)
        .on(command::HIDE_PREVIEW, hide_preview)
        .on(command::INSPECT_ELEMENT, inspect_element)
        .on(command::SEND_MODEL_TO_CONSOLE, send_model_to_console)
        .on(command::OPEN_RESOURCE, open_resource)
}

pub struct ViewDebugBuilder {
    config: Config,
    tree: Option<Arc<dyn LiveTree>>,
    adapter: Option<Arc<dyn HostAdapter>>,
    overlay: Option<Arc<dyn OverlaySurface>>,
    console: Option<Arc<dyn ConsoleBridge>>,
    channel: Option<MessageChannel>,
}

impl ViewDebugBuilder {
    pub fn tree(mut self, tree: Arc<dyn LiveTree>) -> Self {
        self.tree = Some(tree);
        self
    }

    pub fn adapter(mut self, adapter: Arc<dyn HostAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    pub fn overlay(mut self, overlay: Arc<dyn OverlaySurface>) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn console(mut self, console: Arc<dyn ConsoleBridge>) -> Self {
        self.console = Some(console);
        self
    }

    pub fn channel(mut self, channel: MessageChannel) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Registers the namespace on the channel and subscribes to tree
    /// mutations. Nothing is sent until the panel asks for a tree.
    pub fn build(self) -> Result<(ViewDebug, ViewDebugHandle)> {
        let missing = |what: &str| Error::BuilderError(format!("{what} not provided.").into());
        let tree = self.tree.ok_or_else(|| missing("Live tree"))?;
        let adapter = self.adapter.ok_or_else(|| missing("Host adapter"))?;
        let overlay = self.overlay.ok_or_else(|| missing("Overlay surface"))?;
        let console = self.console.ok_or_else(|| missing("Console bridge"))?;
        let channel = self.channel.ok_or_else(|| missing("Message channel"))?;
        let config = self.config;

        let registry = Arc::new(ObjectRegistry::new(&config.id_prefix));
        let (registration, inbox) = channel.register(config.namespace.clone(), config.channel_size);
        let outbox = channel.outbox(config.namespace.clone());

        let mutations = Arc::new(Notify::new());
        let listener = {
            let mutations = mutations.clone();
            tree.subscribe(Arc::new(move || mutations.notify_one()))
        };

        let (signal_tx, signals) = mpsc::channel(config.channel_size);
        let cancel = CancellationToken::new();

        let service = ViewDebug {
            id: Uuid::new_v4(),
            tree,
            builder: SnapshotBuilder::new(registry.clone()),
            interaction: InteractionController::new(
                registry.clone(),
                adapter,
                overlay,
                console,
                outbox.clone(),
            ),
            registry,
            options: Options::default(),
            outbox,
            handlers: Arc::new(handler_table()),
            inbox,
            registration: Some(registration),
            signals,
            mutations,
            listener: Some(listener),
            rebuild: Debounce::default(),
            resize: Debounce::default(),
            cancel: cancel.clone(),
            config,
        };
        tracing::debug!(instance = %service.id, "view debugger built");

        let handle = ViewDebugHandle {
            signals: signal_tx,
            cancel,
        };
        Ok((service, handle))
    }
}

/// Feeds host-side signals into a running [`ViewDebug`] and stops it.
///
/// Cheap to clone.
#[derive(Clone)]
pub struct ViewDebugHandle {
    signals: Sender<HostSignal>,
    cancel: CancellationToken,
}

impl ViewDebugHandle {
    pub async fn send(&self, signal: HostSignal) -> Result<()> {
        self.signals.send(signal).await?;
        Ok(())
    }

    /// The pointer moved over `target` (`None` outside any host object).
    pub async fn pointer_move(&self, target: Option<ObjectRef>) -> Result<()> {
        self.send(HostSignal::Pointer(PointerEvent::Move { target }))
            .await
    }

    pub async fn pointer_down(&self) -> Result<()> {
        self.send(HostSignal::Pointer(PointerEvent::Down)).await
    }

    pub async fn pointer_up(&self) -> Result<()> {
        self.send(HostSignal::Pointer(PointerEvent::Up)).await
    }

    pub async fn resize(&self) -> Result<()> {
        self.send(HostSignal::Resize).await
    }

    pub async fn overlay_action(&self, action: OverlayAction) -> Result<()> {
        self.send(HostSignal::Overlay(action)).await
    }

    /// Merges render durations, keyed by object id, into later snapshots.
    pub async fn update_durations<I>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (ObjectId, f64)>,
    {
        self.send(HostSignal::Durations(entries.into_iter().collect()))
            .await
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
