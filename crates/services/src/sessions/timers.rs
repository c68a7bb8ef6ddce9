//! One-second clocks used by a session: the session countdown and the recording
//! elapsed counter. Both are pure counters advanced by ticks; [`Ticker`] produces
//! the ticks on the async runtime.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

//
// ─── COUNTDOWN ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// Clock is stopped; the tick changed nothing.
    Idle,
    Running { remaining: u32 },
    /// Reached zero on this tick. Reported exactly once per start.
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    budget: u32,
    remaining: u32,
    running: bool,
}

impl Countdown {
    #[must_use]
    pub fn new(budget_secs: u32) -> Self {
        Self {
            budget: budget_secs,
            remaining: budget_secs,
            running: false,
        }
    }

    /// Reset to the full budget and start ticking.
    pub fn start(&mut self) {
        self.remaining = self.budget;
        self.running = true;
    }

    /// Stopping an already-stopped countdown is a no-op.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn tick(&mut self) -> CountdownTick {
        if !self.running {
            return CountdownTick::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            return CountdownTick::Expired;
        }
        CountdownTick::Running {
            remaining: self.remaining,
        }
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn budget(&self) -> u32 {
        self.budget
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }
}

//
// ─── ELAPSED ───────────────────────────────────────────────────────────────────
//

/// Count-up clock for the active recording.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElapsedClock {
    elapsed: u32,
    running: bool,
}

impl ElapsedClock {
    /// Start from zero, discarding any previous count.
    pub fn start(&mut self) {
        self.elapsed = 0;
        self.running = true;
    }

    /// Stop and reset to zero. Returns the seconds counted since `start`.
    pub fn stop(&mut self) -> u32 {
        let elapsed = self.elapsed;
        self.elapsed = 0;
        self.running = false;
        elapsed
    }

    /// Returns the new count, or `None` when stopped.
    pub fn tick(&mut self) -> Option<u32> {
        if !self.running {
            return None;
        }
        self.elapsed = self.elapsed.saturating_add(1);
        Some(self.elapsed)
    }

    #[must_use]
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }
}

//
// ─── TICKER ────────────────────────────────────────────────────────────────────
//

/// Periodic callback on the tokio runtime. Cancelled on `stop` and on drop.
#[derive(Debug, Default)]
pub struct Ticker {
    task: Option<JoinHandle<()>>,
}

impl Ticker {
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    /// Start ticking every `period`, first tick one period from now.
    ///
    /// The callback returns `false` to stop the ticker from inside.
    /// Restarting a running ticker cancels the previous schedule.
    pub fn start<F>(&mut self, period: Duration, mut on_tick: F)
    where
        F: FnMut() -> bool + Send + 'static,
    {
        self.stop();
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !on_tick() {
                    break;
                }
            }
        });
        self.task = Some(task);
    }

    /// Idempotent.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn countdown_expires_exactly_once() {
        let mut countdown = Countdown::new(2);
        assert_eq!(countdown.tick(), CountdownTick::Idle);

        countdown.start();
        assert_eq!(countdown.tick(), CountdownTick::Running { remaining: 1 });
        assert_eq!(countdown.tick(), CountdownTick::Expired);
        assert_eq!(countdown.tick(), CountdownTick::Idle);
        assert_eq!(countdown.remaining(), 0);
    }

    #[test]
    fn countdown_stop_is_idempotent_and_freezes() {
        let mut countdown = Countdown::new(10);
        countdown.start();
        countdown.tick();
        countdown.stop();
        countdown.stop();
        assert_eq!(countdown.tick(), CountdownTick::Idle);
        assert_eq!(countdown.remaining(), 9);

        countdown.start();
        assert_eq!(countdown.remaining(), 10);
    }

    #[test]
    fn elapsed_resets_on_stop_and_restart() {
        let mut clock = ElapsedClock::default();
        assert_eq!(clock.tick(), None);

        clock.start();
        clock.tick();
        clock.tick();
        assert_eq!(clock.elapsed(), 2);
        assert_eq!(clock.stop(), 2);
        assert_eq!(clock.elapsed(), 0);
        assert_eq!(clock.stop(), 0);

        clock.start();
        assert_eq!(clock.tick(), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_fires_each_period_until_stopped() {
        let count = Arc::new(AtomicU32::new(0));
        let mut ticker = Ticker::idle();
        let seen = Arc::clone(&count);
        ticker.start(TICK_PERIOD, move || {
            seen.fetch_add(1, Ordering::SeqCst);
            true
        });

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        ticker.stop();
        ticker.stop();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(!ticker.is_running());
    }
}
