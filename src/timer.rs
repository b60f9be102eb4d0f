use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::alert::AlertSound;
use crate::format::format_time;

pub const DEFAULT_SESSION_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;
pub const DEFAULT_BREAK_MAX_MINUTES: u32 = 60;
pub const MIN_MINUTES: u32 = 1;
/// Largest length whose second count still fits in a u32
const UNCAPPED_MAX_MINUTES: u32 = u32::MAX / 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Session,
    Break,
}

impl Phase {
    pub fn flipped(self) -> Self {
        match self {
            Phase::Session => Phase::Break,
            Phase::Break => Phase::Session,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
}

/// Which length a control adjusts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthField {
    Session,
    Break,
}

/// Whether a length edit made while running resets the live countdown
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ApplyChanges {
    /// Recompute the countdown from the edited lengths right away
    #[default]
    Immediately,
    /// Keep the in-flight countdown; new lengths take effect at the next phase
    NextPhase,
}

/// Session and break lengths in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lengths {
    pub session: u32,
    pub break_time: u32,
}

impl Default for Lengths {
    fn default() -> Self {
        Self {
            session: DEFAULT_SESSION_MINUTES,
            break_time: DEFAULT_BREAK_MINUTES,
        }
    }
}

/// Optional ceilings for each length; `None` means uncapped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub session_max: Option<u32>,
    pub break_max: Option<u32>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            session_max: None,
            break_max: Some(DEFAULT_BREAK_MAX_MINUTES),
        }
    }
}

impl Limits {
    fn ceiling(&self, field: LengthField) -> u32 {
        let max = match field {
            LengthField::Session => self.session_max,
            LengthField::Break => self.break_max,
        };
        max.unwrap_or(UNCAPPED_MAX_MINUTES)
            .clamp(MIN_MINUTES, UNCAPPED_MAX_MINUTES)
    }

    pub fn clamp(&self, field: LengthField, minutes: i64) -> u32 {
        let ceiling = self.ceiling(field) as i64;
        minutes.clamp(MIN_MINUTES as i64, ceiling) as u32
    }

    fn clamp_lengths(&self, lengths: Lengths) -> Lengths {
        Lengths {
            session: self.clamp(LengthField::Session, lengths.session as i64),
            break_time: self.clamp(LengthField::Break, lengths.break_time as i64),
        }
    }
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The countdown is stopped; nothing changed
    Idle,
    /// The tick belonged to a cancelled ticker and was dropped
    Stale,
    Counted { remaining: u32 },
    PhaseEnded { next: Phase },
}

/// The countdown state machine behind the clock
#[derive(Debug, Clone)]
pub struct Countdown {
    lengths: Lengths,
    defaults: Lengths,
    limits: Limits,
    apply: ApplyChanges,
    phase: Phase,
    run_state: RunState,
    remaining: u32,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(Lengths::default(), Limits::default(), ApplyChanges::default())
    }
}

impl Countdown {
    pub fn new(lengths: Lengths, limits: Limits, apply: ApplyChanges) -> Self {
        let lengths = limits.clamp_lengths(lengths);
        Self {
            lengths,
            defaults: lengths,
            limits,
            apply,
            phase: Phase::Session,
            run_state: RunState::Stopped,
            remaining: lengths.session * 60,
        }
    }

    pub fn lengths(&self) -> Lengths {
        self.lengths
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn apply_changes(&self) -> ApplyChanges {
        self.apply
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Remaining time as `M:SS`
    pub fn display(&self) -> String {
        format_time(self.remaining)
    }

    /// Full duration of `phase` in seconds under the current lengths
    pub fn phase_seconds(&self, phase: Phase) -> u32 {
        let minutes = match phase {
            Phase::Session => self.lengths.session,
            Phase::Break => self.lengths.break_time,
        };
        minutes.saturating_mul(60)
    }

    pub fn toggle(&mut self) -> RunState {
        self.run_state = match self.run_state {
            RunState::Stopped => RunState::Running,
            RunState::Running => RunState::Stopped,
        };
        debug!("run state -> {:?}", self.run_state);
        self.run_state
    }

    /// Advance one second. Reaching zero ends the phase within the same tick.
    pub fn tick(&mut self, alert: &mut dyn AlertSound) -> TickOutcome {
        if !self.is_running() {
            return TickOutcome::Idle;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return TickOutcome::Counted {
                remaining: self.remaining,
            };
        }

        let next = self.next_phase(alert);
        debug!("{} finished, starting {}", next.flipped(), next);
        TickOutcome::PhaseEnded { next }
    }

    /// Jump to the other phase immediately, running or not.
    pub fn skip(&mut self, alert: &mut dyn AlertSound) -> Phase {
        let next = self.next_phase(alert);
        debug!("skipped to {next}");
        next
    }

    /// Change one length by `delta` minutes, clamped to its limits.
    /// Returns the new length.
    pub fn adjust(&mut self, field: LengthField, delta: i32) -> u32 {
        let current = match field {
            LengthField::Session => self.lengths.session,
            LengthField::Break => self.lengths.break_time,
        };
        let next = self.limits.clamp(field, current as i64 + delta as i64);

        match field {
            LengthField::Session => self.lengths.session = next,
            LengthField::Break => self.lengths.break_time = next,
        }

        let full = self.phase_seconds(self.phase);
        self.remaining = match (self.run_state, self.apply) {
            (RunState::Running, ApplyChanges::NextPhase) => self.remaining.min(full),
            _ => full,
        };

        debug!("{field:?} length -> {next} min");
        next
    }

    /// Back to the lengths this countdown was created with, stopped in Session.
    /// Those are 25/5 unless the clock was started with other lengths.
    pub fn reset(&mut self, alert: &mut dyn AlertSound) {
        alert.stop();
        self.lengths = self.defaults;
        self.phase = Phase::Session;
        self.run_state = RunState::Stopped;
        self.remaining = self.phase_seconds(Phase::Session);
        debug!("reset");
    }

    fn next_phase(&mut self, alert: &mut dyn AlertSound) -> Phase {
        alert.play();
        self.phase = self.phase.flipped();
        self.remaining = self.phase_seconds(self.phase);
        self.phase
    }
}
