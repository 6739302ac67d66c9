use std::sync::Arc;

use tokio::sync::mpsc::error::{SendError, TrySendError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Couldn't send the message: {0}")]
    SendError(String),

    #[error("The message channel has reached its capacity.")]
    ChannelIsFull,

    #[error("The message channel is closed.")]
    ChannelClosed,

    #[error("Malformed message: {0}")]
    MalformedMessage(#[from] serde_json::Error),

    #[error("Invalid event name '{0}', expected 'namespace:action'")]
    InvalidEventName(Arc<str>),

    #[error("Host collaborator failed: {0}")]
    Host(Arc<str>),

    #[error("Operation is not supported by the host adapter")]
    Unsupported,

    #[error("Couldn't build the view debugger: {0}")]
    BuilderError(Arc<str>),

    #[error("View debugger task join error: {0}")]
    TaskJoinError(#[from] tokio::task::JoinError),
}

impl Error {
    /// Wraps a failure reported by a host-provided collaborator.
    pub fn host(msg: impl Into<Arc<str>>) -> Self {
        Error::Host(msg.into())
    }
}

impl<T> From<SendError<T>> for Error {
    fn from(e: SendError<T>) -> Self {
        Error::SendError(e.to_string())
    }
}

impl<T> From<TrySendError<T>> for Error {
    fn from(e: TrySendError<T>) -> Self {
        match e {
            TrySendError::Full(_) => Error::ChannelIsFull,
            TrySendError::Closed(_) => Error::ChannelClosed,
        }
    }
}
