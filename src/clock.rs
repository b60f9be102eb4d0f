//! The clock widget instance: one countdown, its alert, and the ticker whose
//! lifetime follows the run state.

use tracing::debug;

use crate::alert::AlertSound;
use crate::runtime::{TickHandle, TickId, TickScheduler, Ticker};
use crate::timer::{Countdown, LengthField, Phase, RunState, TickOutcome};

pub struct PomodoroClock<A: AlertSound, T: Ticker + Clone> {
    countdown: Countdown,
    alert: A,
    scheduler: TickScheduler<T>,
    ticking: Option<TickHandle>,
}

impl<A: AlertSound, T: Ticker + Clone> PomodoroClock<A, T> {
    pub fn new(countdown: Countdown, alert: A, scheduler: TickScheduler<T>) -> Self {
        let mut clock = Self {
            countdown,
            alert,
            scheduler,
            ticking: None,
        };
        clock.sync_ticker();
        clock
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn alert(&self) -> &A {
        &self.alert
    }

    /// Id of the live ticker, if the clock is running
    pub fn active_tick(&self) -> Option<TickId> {
        self.ticking.as_ref().map(TickHandle::id)
    }

    pub fn is_ticking(&self) -> bool {
        self.ticking.is_some()
    }

    pub fn toggle(&mut self) -> RunState {
        let state = self.countdown.toggle();
        self.sync_ticker();
        state
    }

    /// Apply a tick from ticker `id`. Ticks from any ticker other than the
    /// live one are dropped.
    pub fn on_tick(&mut self, id: TickId) -> TickOutcome {
        if self.active_tick() != Some(id) {
            debug!("dropping stale tick {id}");
            return TickOutcome::Stale;
        }
        self.countdown.tick(&mut self.alert)
    }

    pub fn skip(&mut self) -> Phase {
        self.countdown.skip(&mut self.alert)
    }

    pub fn adjust(&mut self, field: LengthField, delta: i32) -> u32 {
        self.countdown.adjust(field, delta)
    }

    pub fn reset(&mut self) {
        self.countdown.reset(&mut self.alert);
        self.sync_ticker();
    }

    /// Stop ticking for good. Safe to call more than once.
    pub fn teardown(&mut self) {
        if let Some(handle) = self.ticking.take() {
            handle.cancel();
        }
    }

    fn sync_ticker(&mut self) {
        match (self.countdown.run_state(), self.ticking.is_some()) {
            (RunState::Running, false) => self.ticking = Some(self.scheduler.start()),
            (RunState::Stopped, true) => self.teardown(),
            _ => {}
        }
    }
}
