use crate::dispatch::{Dispatcher, UiMessage};
use crate::settings::{ClickButton, ClickSnapshot};
use enigo::{MouseButton, MouseControllable};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::{sync::{atomic::{AtomicBool, Ordering}, Arc}, thread};

// -------------- Pointer --------------

/// Something that can move the pointer and press mouse buttons.
pub trait Pointer: Send + Sync {
    fn move_to(&self, x: i32, y: i32);
    fn click(&self, button: ClickButton);
}

static ENIGO: Lazy<Mutex<enigo::Enigo>> = Lazy::new(|| Mutex::new(enigo::Enigo::new()));

/// The real mouse, driven through enigo.
pub struct SystemPointer;

impl Pointer for SystemPointer {
    fn move_to(&self, x: i32, y: i32) {
        ENIGO.lock().mouse_move_to(x, y);
    }

    fn click(&self, button: ClickButton) {
        let button = match button {
            ClickButton::Left => MouseButton::Left,
            ClickButton::Right => MouseButton::Right,
            ClickButton::Middle => MouseButton::Middle,
        };
        ENIGO.lock().mouse_click(button);
    }
}

// -------------- Click Job --------------

pub struct ClickJob {
    id: u64,
    running: Arc<AtomicBool>,
    #[allow(dead_code)] // Only joined from tests; the app lets loops wind down on their own
    handle: Option<thread::JoinHandle<u32>>,
}

impl ClickJob {
    /// Starts a click loop on its own thread. When the loop ends for any
    /// reason it posts [`UiMessage::ClickLoopFinished`] with `id`.
    pub fn spawn(id: u64, snapshot: ClickSnapshot, pointer: Arc<dyn Pointer>, dispatcher: Dispatcher) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = Arc::clone(&running);

        tracing::info!(job = id, ?snapshot, "starting click loop");

        let handle = thread::Builder::new()
            .name(format!("click-loop-{id}"))
            .spawn(move || {
                let clicks = run_loop(&snapshot, pointer.as_ref(), &running_clone);
                running_clone.store(false, Ordering::Relaxed);
                tracing::info!(job = id, clicks, "click loop finished");
                dispatcher.send(UiMessage::ClickLoopFinished { job_id: id });
                clicks
            });

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::error!(job = id, %err, "could not spawn click thread");
                running.store(false, Ordering::Relaxed);
                None
            }
        };

        Self { id, running, handle }
    }

    pub fn id(&self) -> u64 { self.id }

    pub fn is_running(&self) -> bool { self.running.load(Ordering::Relaxed) }

    /// Idempotent; the loop notices before its next click.
    pub fn stop(&self) { self.running.store(false, Ordering::Relaxed); }

    /// Blocks until the loop thread exits and returns how many click rounds it made.
    #[cfg(test)]
    pub fn join(mut self) -> u32 {
        self.handle.take().and_then(|h| h.join().ok()).unwrap_or(0)
    }
}

/// Runs until `running` is cleared or the repeat limit is hit. Returns the
/// number of completed rounds (a double click counts once).
fn run_loop(snapshot: &ClickSnapshot, pointer: &dyn Pointer, running: &AtomicBool) -> u32 {
    let limit = snapshot.click_limit();
    let interval = snapshot.interval();
    let mut rounds: u32 = 0;

    while running.load(Ordering::Relaxed) {
        if limit.is_some_and(|max| rounds >= max) { break; }

        if let Some((x, y)) = snapshot.target() {
            pointer.move_to(x, y);
        }
        for _ in 0..snapshot.click_kind.clicks() {
            pointer.click(snapshot.button);
        }
        rounds += 1;

        if limit.is_some_and(|max| rounds >= max) { break; }

        // A stop request lands after this sleep, not during it.
        thread::sleep(interval);
    }
    rounds
}


#[cfg(test)]
mod tests {
    use super::testing::{PointerOp, RecordingPointer};
    use super::*;
    use crate::dispatch;
    use crate::settings::{ClickInputs, ClickKind, PositionMode, RepeatMode};
    use std::time::{Duration, Instant};

    fn fixed(count: u32, millis: u32) -> ClickSnapshot {
        ClickInputs {
            millis,
            repeat_mode: RepeatMode::FixedCount,
            repeat_times: count,
            ..ClickInputs::default()
        }
        .snapshot()
    }

    #[test]
    fn fixed_count_clicks_exactly_n_times_then_stops() {
        let (dispatcher, queue) = dispatch::channel();
        let pointer = Arc::new(RecordingPointer::default());
        let job = ClickJob::spawn(7, fixed(3, 10), pointer.clone(), dispatcher);

        assert_eq!(
            queue.recv_timeout(Duration::from_secs(5)),
            Some(UiMessage::ClickLoopFinished { job_id: 7 })
        );
        assert!(!job.is_running());
        assert_eq!(job.join(), 3);
        assert_eq!(pointer.clicks(), 3);
    }

    #[test]
    fn zero_count_never_clicks() {
        let (dispatcher, queue) = dispatch::channel();
        let pointer = Arc::new(RecordingPointer::default());
        let job = ClickJob::spawn(1, fixed(0, 10), pointer.clone(), dispatcher);

        assert!(queue.recv_timeout(Duration::from_secs(5)).is_some());
        assert_eq!(job.join(), 0);
        assert!(pointer.ops.lock().is_empty());
    }

    #[test]
    fn fixed_point_double_click_moves_then_clicks_twice() {
        let inputs = ClickInputs {
            repeat_mode: RepeatMode::FixedCount,
            repeat_times: 1,
            position_mode: PositionMode::FixedPoint,
            x: 40,
            y: 50,
            button: ClickButton::Middle,
            click_kind: ClickKind::Double,
            ..ClickInputs::default()
        };
        let pointer = RecordingPointer::default();
        let running = AtomicBool::new(true);

        assert_eq!(run_loop(&inputs.snapshot(), &pointer, &running), 1);
        assert_eq!(
            *pointer.ops.lock(),
            vec![
                PointerOp::Move(40, 50),
                PointerOp::Click(ClickButton::Middle),
                PointerOp::Click(ClickButton::Middle),
            ]
        );
    }

    #[test]
    fn cursor_mode_never_moves() {
        let pointer = RecordingPointer::default();
        let running = AtomicBool::new(true);
        run_loop(&fixed(2, 1), &pointer, &running);
        assert!(pointer.ops.lock().iter().all(|op| matches!(op, PointerOp::Click(ClickButton::Left))));
    }

    #[test]
    fn cleared_flag_means_no_clicks() {
        let pointer = RecordingPointer::default();
        let running = AtomicBool::new(false);
        assert_eq!(run_loop(&fixed(5, 1), &pointer, &running), 0);
    }

    #[test]
    fn infinite_run_stops_within_one_interval() {
        let (dispatcher, queue) = dispatch::channel();
        let pointer = Arc::new(RecordingPointer::default());
        let snapshot = ClickInputs { millis: 20, ..ClickInputs::default() }.snapshot();
        let job = ClickJob::spawn(2, snapshot, pointer.clone(), dispatcher);

        thread::sleep(Duration::from_millis(150));
        assert!(job.is_running());
        let stopped_at = Instant::now();
        job.stop();
        job.stop();

        assert_eq!(
            queue.recv_timeout(Duration::from_secs(5)),
            Some(UiMessage::ClickLoopFinished { job_id: 2 })
        );
        assert!(stopped_at.elapsed() < Duration::from_secs(1));
        let rounds = job.join();
        // 150ms at 20ms per round, plus at most one round while the stop lands.
        assert!((3..=9).contains(&rounds), "{rounds} rounds");
        assert_eq!(pointer.clicks() as u32, rounds);
        for gap in pointer.click_gaps() {
            assert!(gap >= Duration::from_millis(20), "clicks only {gap:?} apart");
        }
    }

    #[test]
    fn fixed_count_spaces_clicks_and_skips_final_sleep() {
        let (dispatcher, queue) = dispatch::channel();
        let pointer = Arc::new(RecordingPointer::default());
        let job = ClickJob::spawn(3, fixed(3, 50), pointer.clone(), dispatcher);

        assert!(queue.recv_timeout(Duration::from_secs(5)).is_some());
        let finished_at = Instant::now();
        assert_eq!(job.join(), 3);

        let gaps = pointer.click_gaps();
        assert_eq!(gaps.len(), 2);
        assert!(gaps.iter().all(|gap| *gap >= Duration::from_millis(50)), "{gaps:?}");

        let last_click = *pointer.click_times().last().unwrap();
        assert!(finished_at - last_click < Duration::from_millis(40), "slept after the last click");
    }
}
