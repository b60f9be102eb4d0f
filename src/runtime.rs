use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};
use tracing::{debug, trace};

/// Identifies the ticker a tick came from
pub type TickId = u64;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum PomoEvent {
    Key(KeyEvent),
    Resize,
    Tick(TickId),
    /// The terminal input stream ended; nothing more will arrive from it
    Closed,
}

/// Source of terminal and timer events
pub trait PomoEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<PomoEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<PomoEvent>,
    rx: Receiver<PomoEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let key_tx = tx.clone();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if key_tx.send(PomoEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if key_tx.send(PomoEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("terminal input closed: {e}");
                    let _ = key_tx.send(PomoEvent::Closed);
                    break;
                }
            }
        });

        Self { tx, rx }
    }

    /// Sender feeding the same queue, for the tick scheduler
    pub fn sender(&self) -> Sender<PomoEvent> {
        self.tx.clone()
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PomoEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<PomoEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// One tick per wall-clock second
    pub fn seconds() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<PomoEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<PomoEvent>) -> Self {
        Self { rx }
    }
}

impl PomoEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<PomoEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Owned handle to a running ticker. Cancelling is idempotent and dropping
/// the handle cancels it.
#[derive(Debug)]
pub struct TickHandle {
    id: TickId,
    cancelled: Arc<AtomicBool>,
}

impl TickHandle {
    pub fn id(&self) -> TickId {
        self.id
    }

    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            debug!("ticker {} cancelled", self.id);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Spawns tickers that post `PomoEvent::Tick` into the event queue
pub struct TickScheduler<T: Ticker> {
    tx: Sender<PomoEvent>,
    ticker: T,
    next_id: TickId,
}

impl<T: Ticker + Clone> TickScheduler<T> {
    pub fn new(tx: Sender<PomoEvent>, ticker: T) -> Self {
        Self {
            tx,
            ticker,
            next_id: 0,
        }
    }

    /// Start a fresh ticker. Each call yields a distinct id.
    pub fn start(&mut self) -> TickHandle {
        self.next_id += 1;
        let id = self.next_id;
        let cancelled = Arc::new(AtomicBool::new(false));

        let tx = self.tx.clone();
        let flag = Arc::clone(&cancelled);
        let interval = self.ticker.interval();

        std::thread::spawn(move || {
            // deadline based so sleeps don't accumulate drift
            let mut deadline = Instant::now() + interval;
            loop {
                std::thread::sleep(deadline.saturating_duration_since(Instant::now()));
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                if tx.send(PomoEvent::Tick(id)).is_err() {
                    break;
                }
                trace!("tick {id}");
                deadline += interval;
            }
        });

        debug!("ticker {id} started");
        TickHandle { id, cancelled }
    }
}

/// Runner that advances the application one event at a time
pub struct Runner<E: PomoEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: PomoEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to the poll interval and returns the next event, or None on timeout
    pub fn step(&self) -> Option<PomoEvent> {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
