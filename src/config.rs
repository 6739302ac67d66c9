use std::{sync::Arc, time::Duration};

/// Runtime configuration for the view debugger.
///
/// Controls timer delays, channel sizes and naming of the protocol
/// namespace and minted ids. Use the builder methods to customize, or use
/// [`Default`] for sensible defaults.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use view_debug::Config;
///
/// let config = Config::default()
///     .with_rebuild_delay(Duration::from_millis(20))
///     .with_channel_size(256);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Delay between a rebuild request and the rebuild itself.
    /// A new request during the delay restarts it (latest wins), so bursts of
    /// tree mutations produce a single snapshot.
    /// Default: 50 ms
    pub rebuild_delay: Duration,

    /// Delay before the pinned overlay is recomputed after a viewport resize.
    /// Default: 50 ms
    pub resize_delay: Duration,

    /// Size of the inbound command and host signal buffers.
    /// Default: 128
    pub channel_size: usize,

    /// Protocol namespace prefixed to every message (`view:getTree`).
    /// Default: `"view"`
    pub namespace: Arc<str>,

    /// Prefix of the ids minted by the object registry.
    /// Default: `"obj"`
    pub id_prefix: Arc<str>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rebuild_delay: Duration::from_millis(50),
            resize_delay: Duration::from_millis(50),
            channel_size: 128,
            namespace: Arc::from("view"),
            id_prefix: Arc::from("obj"),
        }
    }
}

impl Config {
    /// Set the debounce delay applied to snapshot rebuilds.
    ///
    /// `Duration::ZERO` still defers the rebuild to the next loop turn, so
    /// notifications already queued are coalesced.
    pub fn with_rebuild_delay(mut self, delay: Duration) -> Self {
        self.rebuild_delay = delay;
        self
    }

    /// Set the delay before the pinned overlay follows a viewport resize.
    pub fn with_resize_delay(mut self, delay: Duration) -> Self {
        self.resize_delay = delay;
        self
    }

    /// Set the buffer size for inbound commands and host signals.
    ///
    /// When the command inbox is full, further panel commands are dropped
    /// with a warning; [`ViewDebugHandle`](crate::ViewDebugHandle) sends wait
    /// for room.
    pub fn with_channel_size(mut self, size: usize) -> Self {
        self.channel_size = size;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<Arc<str>>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_id_prefix(mut self, prefix: impl Into<Arc<str>>) -> Self {
        self.id_prefix = prefix.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.rebuild_delay, Duration::from_millis(50));
        assert_eq!(config.resize_delay, Duration::from_millis(50));
        assert_eq!(&*config.namespace, "view");
        assert_eq!(&*config.id_prefix, "obj");
    }

    #[test]
    fn test_builder_overrides() {
        let config = Config::default()
            .with_rebuild_delay(Duration::ZERO)
            .with_channel_size(4)
            .with_namespace("views")
            .with_id_prefix("ember");
        assert_eq!(config.rebuild_delay, Duration::ZERO);
        assert_eq!(config.channel_size, 4);
        assert_eq!(&*config.namespace, "views");
        assert_eq!(&*config.id_prefix, "ember");
    }
}
