//! Hand-off from worker threads to the UI thread.
//!
//! Only the UI thread owns a [`UiQueue`] and applies its messages. Every other
//! thread holds a [`Dispatcher`] and can do nothing but enqueue.

use crossbeam_channel::{unbounded, Receiver, Sender};
use once_cell::sync::OnceCell;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
pub enum UiMessage {
    Start,
    Stop,
    Toggle,
    /// A click loop ended on its own or after being stopped.
    ClickLoopFinished { job_id: u64 },
    LocationPicked { x: i32, y: i32 },
    Warning { title: String, body: String },
}

#[derive(Clone)]
pub struct Dispatcher {
    tx: Sender<UiMessage>,
    waker: Arc<OnceCell<egui::Context>>,
}

pub struct UiQueue {
    rx: Receiver<UiMessage>,
}

pub fn channel() -> (Dispatcher, UiQueue) {
    let (tx, rx) = unbounded();
    (Dispatcher { tx, waker: Arc::new(OnceCell::new()) }, UiQueue { rx })
}

impl Dispatcher {
    pub fn send(&self, msg: UiMessage) {
        tracing::trace!(?msg, "queued for ui thread");
        if self.tx.send(msg).is_err() {
            tracing::debug!("ui queue closed, message dropped");
            return;
        }
        if let Some(ctx) = self.waker.get() {
            ctx.request_repaint();
        }
    }

    /// Lets queued messages wake the event loop instead of waiting for input.
    pub fn attach(&self, ctx: &egui::Context) {
        let _ = self.waker.set(ctx.clone());
    }
}

impl UiQueue {
    pub fn drain(&self) -> impl Iterator<Item = UiMessage> + '_ {
        self.rx.try_iter()
    }

    #[cfg(test)]
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<UiMessage> {
        self.rx.recv_timeout(timeout).ok()
    }
}
