//! Poll timers for the periodic fetches.
//!
//! Driven by the caller's event loop: ask [`Schedule::due`] each tick, run
//! what it returns, then [`Schedule::mark`] each job as started.

use std::time::{Duration, Instant};

use crate::config::PollConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Job {
    /// Market data, key levels, trades and account status.
    Dashboard,
    MarketStatus,
    News,
}

impl Job {
    pub const ALL: [Job; 3] = [Job::Dashboard, Job::MarketStatus, Job::News];

    fn index(self) -> usize {
        match self {
            Job::Dashboard => 0,
            Job::MarketStatus => 1,
            Job::News => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Schedule {
    intervals: [Duration; 3],
    last_run: [Option<Instant>; 3],
}

impl Schedule {
    pub fn new(dashboard: Duration, market_status: Duration, news: Duration) -> Self {
        Self {
            intervals: [dashboard, market_status, news],
            last_run: [None; 3],
        }
    }

    pub fn from_config(poll: &PollConfig) -> Self {
        Self::new(
            Duration::from_secs(poll.dashboard_secs),
            Duration::from_secs(poll.market_status_secs),
            Duration::from_secs(poll.news_secs),
        )
    }

    pub fn interval(&self, job: Job) -> Duration {
        self.intervals[job.index()]
    }

    /// Jobs that never ran or whose interval has elapsed.
    pub fn due(&self, now: Instant) -> Vec<Job> {
        Job::ALL
            .into_iter()
            .filter(|job| match self.last_run[job.index()] {
                None => true,
                Some(at) => now.saturating_duration_since(at) >= self.interval(*job),
            })
            .collect()
    }

    pub fn mark(&mut self, job: Job, now: Instant) {
        self.last_run[job.index()] = Some(now);
    }

    /// Make `job` due on the next tick.
    pub fn expire(&mut self, job: Job) {
        self.last_run[job.index()] = None;
    }

    /// Time left until `job` is due; zero when it already is.
    pub fn remaining(&self, job: Job, now: Instant) -> Duration {
        match self.last_run[job.index()] {
            None => Duration::ZERO,
            Some(at) => self
                .interval(job)
                .saturating_sub(now.saturating_duration_since(at)),
        }
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::from_config(&PollConfig::default())
    }
}
