//! Countdown for timed questions.
//!
//! A countdown is a background task that ticks on a fixed interval and
//! reports through a channel. Every event carries the generation of the
//! question it was started for, so the controller can drop events that
//! arrive after the question was left.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    Tick { generation: u64, remaining: u32 },
    Expired { generation: u64 },
}

impl CountdownEvent {
    pub fn generation(&self) -> u64 {
        match self {
            CountdownEvent::Tick { generation, .. } | CountdownEvent::Expired { generation } => {
                *generation
            }
        }
    }
}

/// Handle to a running countdown. Dropping it cancels the task.
pub struct Countdown {
    generation: u64,
    token: CancellationToken,
}

impl Countdown {
    /// Spawn a countdown of `ticks` ticks. Must be called from within a
    /// tokio runtime.
    pub fn start(
        generation: u64,
        ticks: u32,
        period: Duration,
        events: mpsc::UnboundedSender<CountdownEvent>,
    ) -> Self {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut remaining = ticks;

            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => {
                        debug!(generation, remaining, "countdown cancelled");
                        return;
                    }
                    _ = interval.tick() => {
                        remaining = remaining.saturating_sub(1);
                        let event = if remaining == 0 {
                            CountdownEvent::Expired { generation }
                        } else {
                            CountdownEvent::Tick { generation, remaining }
                        };
                        debug!(generation, remaining, "countdown tick");
                        if events.send(event).is_err() || remaining == 0 {
                            return;
                        }
                    }
                }
            }
        });

        Self { generation, token }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(self) {
        self.token.cancel();
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
