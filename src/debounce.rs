use std::{future::pending, pin::Pin, time::Duration};

use tokio::time::{Sleep, sleep};

/// Timer slot polled from a `select!` loop.
///
/// Scheduling while a deadline is pending keeps that deadline, so a burst of
/// requests fires once and a steady stream still fires every `delay`.
#[derive(Default)]
pub(crate) struct Debounce {
    timer: Option<Pin<Box<Sleep>>>,
}

impl Debounce {
    pub fn schedule(&mut self, delay: Duration) {
        if self.timer.is_none() {
            self.timer = Some(Box::pin(sleep(delay)));
        }
    }

    pub fn cancel(&mut self) {
        self.timer = None;
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.timer.is_some()
    }

    /// Completes when the pending deadline passes; never completes while
    /// nothing is scheduled. Cancel safe.
    pub async fn fired(&mut self) {
        match self.timer.as_mut() {
            Some(timer) => {
                timer.as_mut().await;
                self.timer = None;
            }
            None => pending().await,
        }
    }
}
