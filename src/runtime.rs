use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// Events the quiz loop reacts to.
#[derive(Clone, Debug)]
pub enum QuizEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of terminal events.
pub trait QuizEventSource: Send + 'static {
    /// Waits up to `timeout`; `Err(Timeout)` when nothing arrived.
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError>;
}

/// Reads crossterm events on a background thread.
pub struct CrosstermEventSource {
    rx: Receiver<QuizEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                // Windows reports releases too; only presses drive the quiz
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    tx.send(QuizEvent::Key(key))
                }
                Ok(CtEvent::Resize(_, _)) => tx.send(QuizEvent::Resize),
                Ok(_) => Ok(()),
                Err(_) => break,
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-fed source for tests.
pub struct TestEventSource {
    rx: Receiver<QuizEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<QuizEvent>) -> Self {
        Self { rx }
    }
}

impl QuizEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Advances the quiz one event or tick at a time.
pub struct Runner<E: QuizEventSource> {
    events: E,
    tick: Duration,
}

impl<E: QuizEventSource> Runner<E> {
    pub fn new(events: E, tick: Duration) -> Self {
        Self { events, tick }
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick
    }

    /// Blocks up to one tick; a timeout or closed source yields `Tick`.
    pub fn step(&self) -> QuizEvent {
        match self.events.recv_timeout(self.tick) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => QuizEvent::Tick,
        }
    }
}

/// Holds "Correct!" on screen for a few ticks before the next word shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedbackDelay {
    ticks_left: u32,
}

impl FeedbackDelay {
    /// Number of ticks covering `delay` at `tick` granularity, at least one.
    pub fn start(delay: Duration, tick: Duration) -> Self {
        let tick_ms = tick.as_millis().max(1);
        let ticks = delay.as_millis().div_ceil(tick_ms).max(1);
        Self {
            ticks_left: u32::try_from(ticks).unwrap_or(u32::MAX),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.ticks_left > 0
    }

    /// Counts one tick down; true on the tick the delay runs out.
    pub fn on_tick(&mut self) -> bool {
        if self.ticks_left == 0 {
            return false;
        }
        self.ticks_left -= 1;
        self.ticks_left == 0
    }

    pub fn clear(&mut self) {
        self.ticks_left = 0;
    }
}
