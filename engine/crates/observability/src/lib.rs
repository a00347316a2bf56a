use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` overrides the default `info` filter.
/// Output goes to stderr so stdout stays reserved for host commands.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Per world-tick counters.
#[derive(Debug, Clone)]
pub struct TickMetrics {
    /// A tick taking longer than this is logged at `warn`.
    pub budget_us: u128,
    pub tick_number: u64,
    pub duration_us: u128,
    /// Host events handled since the previous tick.
    pub event_count: usize,
    /// Sessions currently inside a space.
    pub occupant_count: usize,
    pub rewards_paid: usize,
}

impl Default for TickMetrics {
    fn default() -> Self {
        Self::with_budget(Self::DEFAULT_BUDGET)
    }
}

impl TickMetrics {
    pub const DEFAULT_BUDGET: Duration = Duration::from_millis(16);

    /// Counters for a loop ticking every `interval`; the interval is the budget.
    pub fn with_budget(interval: Duration) -> Self {
        Self {
            budget_us: interval.as_micros(),
            tick_number: 0,
            duration_us: 0,
            event_count: 0,
            occupant_count: 0,
            rewards_paid: 0,
        }
    }

    pub fn over_budget(&self) -> bool {
        self.duration_us > self.budget_us
    }

    pub fn log(&self) {
        if self.over_budget() {
            tracing::warn!(
                tick = self.tick_number,
                duration_us = self.duration_us,
                events = self.event_count,
                occupants = self.occupant_count,
                rewards = self.rewards_paid,
                "tick exceeded budget ({}us > {}us)",
                self.duration_us,
                self.budget_us
            );
        } else {
            tracing::debug!(
                tick = self.tick_number,
                duration_us = self.duration_us,
                events = self.event_count,
                occupants = self.occupant_count,
                rewards = self.rewards_paid,
                "tick completed"
            );
        }
    }
}
