use crate::session::{self, Tick, TestSession};
use core::{num::NonZeroU32, time::Duration};
use model::Answer;
use std::sync::Mutex;
use tokio::time::{self, MissedTickBehavior};

/// Ten minutes.
pub const DEFAULT_DURATION: NonZeroU32 = match NonZeroU32::new(600) {
    Some(duration) => duration,
    None => unreachable!(),
};

/// Marker returned by the one tick that runs the countdown out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Expired;

/// Per-second countdown of a test session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Countdown {
    Running { remaining: NonZeroU32 },
    /// Ran out. Terminal.
    Expired,
    /// Stopped before running out, with the time that was left. Terminal.
    Cancelled { remaining: NonZeroU32 },
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}

impl Countdown {
    pub const fn new(duration: NonZeroU32) -> Self {
        Self::Running { remaining: duration }
    }

    /// Advances by one second. Only the transition to zero yields [`Expired`];
    /// ticks after that, or after [`cancel`](Self::cancel), change nothing.
    pub fn tick(&mut self) -> Option<Expired> {
        let Self::Running { remaining } = self else {
            return None;
        };
        match NonZeroU32::new(remaining.get() - 1) {
            Some(next) => {
                *remaining = next;
                None
            }
            None => {
                *self = Self::Expired;
                Some(Expired)
            }
        }
    }

    pub fn cancel(&mut self) {
        if let Self::Running { remaining } = *self {
            *self = Self::Cancelled { remaining };
        }
    }

    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// Seconds left on the clock.
    pub const fn remaining(&self) -> u32 {
        match self {
            Self::Running { remaining } | Self::Cancelled { remaining } => remaining.get(),
            Self::Expired => 0,
        }
    }

    pub const fn urgency(&self) -> Urgency {
        Urgency::from_remaining(self.remaining())
    }
}

/// How close the countdown is to running out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Urgency {
    Normal,
    /// One minute or less.
    Low,
    /// Thirty seconds or less.
    Critical,
}

impl Urgency {
    pub const fn from_remaining(seconds: u32) -> Self {
        match seconds {
            0..=30 => Self::Critical,
            31..=60 => Self::Low,
            _ => Self::Normal,
        }
    }
}

/// Renders seconds as `MM:SS`.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Ticks `session` once every `period` until its countdown stops.
///
/// Returns the answers to submit if the countdown ran out while the session
/// was still being answered. In that case the session has already moved on
/// to submitting. Returns `None` if the countdown was cancelled or expired
/// with nothing to submit. Dropping the future stops the ticks.
pub async fn drive(session: &Mutex<TestSession>, period: Duration) -> Option<Vec<Answer>> {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // The first tick completes immediately.
    interval.tick().await;
    loop {
        interval.tick().await;
        let tick = session::lock(session).tick();
        match tick {
            Tick::Counting(_) => continue,
            Tick::Stopped => return None,
            Tick::Submit(answers) => return Some(answers),
        }
    }
}
