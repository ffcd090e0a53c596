//! Process-wide input observation: the F6/F7/F8 hotkeys and the one-shot
//! location picker share a single global listener.

use crate::dispatch::{Dispatcher, UiMessage};
use crate::error::HookError;
use std::sync::{atomic::{AtomicBool, Ordering}, Arc};

pub const HOTKEY_HELP: &str = "The global hotkeys are:\n\nF6: Start\nF7: Stop\nF8: Toggle (Start/Stop)";

pub struct InputHooks {
    enabled: Arc<AtomicBool>,
    picking: Arc<AtomicBool>,
    failed: Arc<AtomicBool>,
}

impl InputHooks {
    /// Installs the global listener. A listener that fails after start-up
    /// reports through `dispatcher` as a warning.
    #[cfg(feature = "hooks")]
    pub fn start(dispatcher: Dispatcher) -> Result<Self, HookError> {
        let enabled = Arc::new(AtomicBool::new(true));
        let picking = Arc::new(AtomicBool::new(false));
        let failed = Arc::new(AtomicBool::new(false));
        let listener_failed = Arc::clone(&failed);
        let picker = Arc::clone(&picking);
        let mut router = EventRouter {
            enabled: Arc::clone(&enabled),
            picking: Arc::clone(&picking),
            last_pos: None,
        };

        std::thread::Builder::new()
            .name("input-hooks".into())
            .spawn(move || {
                let events = dispatcher.clone();
                let result = rdev::listen(move |event| {
                    if let Some(msg) = router.route(&event.event_type) {
                        events.send(msg);
                    }
                });
                if let Err(err) = result {
                    tracing::warn!(?err, "global input listener failed");
                    listener_died(&listener_failed, &picker);
                    dispatcher.send(UiMessage::Warning {
                        title: "Hotkey Error".into(),
                        body: format!(
                            "Could not register hotkeys. Does the app have input permissions?\nError: {err:?}"
                        ),
                    });
                }
            })
            .map_err(|err| HookError::Listen(err.to_string()))?;

        tracing::info!("global hotkeys active (F6 start, F7 stop, F8 toggle)");
        Ok(Self { enabled, picking, failed })
    }

    #[cfg(not(feature = "hooks"))]
    pub fn start(_dispatcher: Dispatcher) -> Result<Self, HookError> {
        Err(HookError::Unsupported)
    }

    /// False once the OS listener has died; hotkeys and picking are gone for good.
    pub fn is_listening(&self) -> bool {
        !self.failed.load(Ordering::SeqCst)
    }

    /// The next mouse press anywhere on screen becomes the fixed click point.
    pub fn arm_picker(&self) {
        self.picking.store(true, Ordering::SeqCst);
    }

    pub fn is_picking(&self) -> bool {
        self.picking.load(Ordering::SeqCst)
    }

    /// Hooks with no OS listener behind them, for driving the UI in tests.
    #[cfg(test)]
    pub(crate) fn detached() -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(true)),
            picking: Arc::new(AtomicBool::new(false)),
            failed: Arc::new(AtomicBool::new(false)),
        }
    }

    #[cfg(test)]
    pub(crate) fn mark_failed(&self) {
        listener_died(&self.failed, &self.picking);
    }

    /// The OS hook cannot be removed, so it is muted for the rest of the process.
    pub fn shutdown(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        self.picking.store(false, Ordering::SeqCst);
    }
}

/// A dead listener can never deliver the picked click, so disarm as well.
#[cfg(any(test, feature = "hooks"))]
fn listener_died(failed: &AtomicBool, picking: &AtomicBool) {
    failed.store(true, Ordering::SeqCst);
    picking.store(false, Ordering::SeqCst);
}

#[cfg(feature = "hooks")]
pub fn hotkey_action(key: rdev::Key) -> Option<UiMessage> {
    match key {
        rdev::Key::F6 => Some(UiMessage::Start),
        rdev::Key::F7 => Some(UiMessage::Stop),
        rdev::Key::F8 => Some(UiMessage::Toggle),
        _ => None,
    }
}

#[cfg(feature = "hooks")]
struct EventRouter {
    enabled: Arc<AtomicBool>,
    picking: Arc<AtomicBool>,
    last_pos: Option<(f64, f64)>,
}

#[cfg(feature = "hooks")]
impl EventRouter {
    fn route(&mut self, event: &rdev::EventType) -> Option<UiMessage> {
        use rdev::EventType;

        if !self.enabled.load(Ordering::SeqCst) { return None; }

        match event {
            EventType::MouseMove { x, y } => {
                self.last_pos = Some((*x, *y));
                None
            }
            EventType::ButtonPress(_) => {
                let (x, y) = self.last_pos?;
                if !self.picking.swap(false, Ordering::SeqCst) { return None; }
                tracing::debug!(x, y, "location picked");
                Some(UiMessage::LocationPicked { x: x.round() as i32, y: y.round() as i32 })
            }
            EventType::KeyPress(key) => hotkey_action(*key),
            _ => None,
        }
    }
}
