use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::FlowError;

/// Timing knobs for the administration flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Ticks a timed-recall question stays on screen.
    #[serde(default = "default_countdown_ticks")]
    pub countdown_ticks: u32,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_countdown_ticks() -> u32 {
    5
}

fn default_tick_interval_ms() -> u64 {
    1000
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            countdown_ticks: default_countdown_ticks(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl FlowConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> Result<(), FlowError> {
        if self.countdown_ticks == 0 {
            return Err(FlowError::Config("countdown_ticks must be at least 1".into()));
        }
        if self.tick_interval_ms == 0 {
            return Err(FlowError::Config("tick_interval_ms must be positive".into()));
        }
        Ok(())
    }
}
