//! OS-level appearance signals.
//!
//! Each signal is push-based: the host publishes a new value when the OS
//! notifies it, and every live [`Subscription`] receives the change. Dropping
//! or unsubscribing a subscription stops delivery to it.

use std::cell::{Cell, RefCell};
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug)]
pub struct PreferenceSignal {
    name: &'static str,
    current: Cell<bool>,
    subscribers: RefCell<Vec<UnboundedSender<bool>>>,
}

impl PreferenceSignal {
    pub fn new(name: &'static str, initial: bool) -> Self {
        Self {
            name,
            current: Cell::new(initial),
            subscribers: RefCell::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn current(&self) -> bool {
        self.current.get()
    }

    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers.borrow_mut().push(sender);
        Subscription { receiver }
    }

    /// Records a new OS value and notifies subscribers when it changed.
    ///
    /// Returns whether a change was delivered.
    pub fn publish(&self, value: bool) -> bool {
        if self.current.replace(value) == value {
            return false;
        }
        tracing::debug!(signal = self.name, value, "system preference changed");
        self.subscribers
            .borrow_mut()
            .retain(|subscriber| subscriber.send(value).is_ok());
        true
    }

    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|subscriber| !subscriber.is_closed());
        subscribers.len()
    }
}

/// Unbounded sequence of change events for one signal.
#[derive(Debug)]
pub struct Subscription {
    receiver: UnboundedReceiver<bool>,
}

impl Subscription {
    pub async fn next_change(&mut self) -> Option<bool> {
        self.receiver.recv().await
    }

    pub fn try_next_change(&mut self) -> Option<bool> {
        self.receiver.try_recv().ok()
    }

    pub fn unsubscribe(mut self) {
        self.receiver.close();
    }
}

impl Stream for Subscription {
    type Item = bool;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<bool>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}

/// The two appearance signals the engine follows.
#[derive(Debug)]
pub struct SystemPreferences {
    pub prefers_dark: PreferenceSignal,
    pub prefers_reduced_motion: PreferenceSignal,
}

impl SystemPreferences {
    pub fn new(prefers_dark: bool, prefers_reduced_motion: bool) -> Self {
        Self {
            prefers_dark: PreferenceSignal::new("prefers-color-scheme: dark", prefers_dark),
            prefers_reduced_motion: PreferenceSignal::new(
                "prefers-reduced-motion: reduce",
                prefers_reduced_motion,
            ),
        }
    }

    /// Seeds the color-scheme signal from the OS appearance setting.
    pub fn detect() -> Self {
        Self::new(detect_prefers_dark(), false)
    }
}

fn detect_prefers_dark() -> bool {
    match dark_light::detect() {
        Ok(dark_light::Mode::Dark) => true,
        Ok(dark_light::Mode::Light) | Ok(dark_light::Mode::Unspecified) => false,
        Err(err) => {
            tracing::warn!(?err, "failed to detect OS color scheme; assuming light");
            false
        }
    }
}
