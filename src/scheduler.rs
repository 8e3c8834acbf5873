//! Fixed-period job scheduling.
//!
//! The job runs once immediately, then again every `period`. Due work is
//! checked every `poll` interval, so a run starts at most one poll interval
//! late. Each job is awaited before the next check: runs never overlap, and a
//! run that overshoots the period pushes the next one back rather than
//! queueing a burst. A stop request ends the loop at once, abandoning any run
//! in progress.

use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::{debug, info};

/// When the next run is due.
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    period: Duration,
    next_due: Instant,
}

impl Schedule {
    /// A schedule whose first run is due at `now`.
    pub fn starting_at(now: Instant, period: Duration) -> Self {
        Self {
            period,
            next_due: now,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_due
    }

    /// Record that a run finished at `now`; the next one is due a full period later.
    pub fn mark_ran(&mut self, now: Instant) {
        self.next_due = now + self.period;
    }

    pub fn next_due(&self) -> Instant {
        self.next_due
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    period: Duration,
    poll: Duration,
}

impl Scheduler {
    pub fn new(period: Duration, poll: Duration) -> Self {
        Self { period, poll }
    }

    /// Run `job` now and on every due poll until `stop` resolves.
    ///
    /// `stop` is raced against the running job as well as the idle wait, so a
    /// stop request never waits for a slow run to finish.
    pub async fn run_until<F, Fut, S>(&self, mut job: F, stop: S)
    where
        F: FnMut() -> Fut,
        Fut: Future,
        S: Future,
    {
        let mut schedule = Schedule::starting_at(Instant::now(), self.period);
        let mut ticker = interval(self.poll);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(stop);

        info!(
            period_secs = self.period.as_secs(),
            poll_secs = self.poll.as_secs(),
            "Scheduler started"
        );

        loop {
            if schedule.is_due(Instant::now()) {
                tokio::select! {
                    _ = &mut stop => {
                        info!("Stop signal received during a run; abandoning it");
                        return;
                    }
                    _ = job() => {}
                }
                schedule.mark_ran(Instant::now());
                debug!(
                    next_in_secs = schedule.next_due().saturating_duration_since(Instant::now()).as_secs(),
                    "Next run scheduled"
                );
            }

            tokio::select! {
                _ = &mut stop => {
                    info!("Stop signal received; scheduler exiting");
                    return;
                }
                _ = ticker.tick() => {}
            }
        }
    }
}
