//! Stop conditions for a running search.
//!
//! One `SearchControl` is shared by every thread of a search. The hard
//! limit aborts mid-iteration and is polled on a node-count gate; the
//! soft limit only stops iterative deepening between iterations, scaled
//! by how unstable the best move currently looks.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Search abort and clock state.
///
/// Three modes:
/// - infinite: stops only on the external flag (`go infinite`)
/// - timed: clock runs from construction (`go wtime`/`go movetime`)
/// - ponder: limits armed but clock held until [`activate`](Self::activate)
///   (`go ponder` followed by `ponderhit`)
pub struct SearchControl {
    stopped: Arc<AtomicBool>,
    clock_running: AtomicBool,
    started: Mutex<Option<Instant>>,
    soft_limit: Option<Duration>,
    hard_limit: Option<Duration>,
    /// Per-thread node budget, from `go nodes`.
    node_limit: Option<u64>,
    /// Soft-limit multiplier in hundredths, from the stability tracker.
    soft_scale: AtomicU32,
}

impl SearchControl {
    fn with_limits(
        stopped: Arc<AtomicBool>,
        running: bool,
        soft: Option<Duration>,
        hard: Option<Duration>,
    ) -> Self {
        Self {
            stopped,
            clock_running: AtomicBool::new(running),
            started: Mutex::new(running.then(Instant::now)),
            soft_limit: soft,
            hard_limit: hard,
            node_limit: None,
            soft_scale: AtomicU32::new(100),
        }
    }

    /// Cap the search at `nodes` nodes per thread.
    pub fn with_node_limit(mut self, nodes: Option<u64>) -> Self {
        self.node_limit = nodes;
        self
    }

    /// No time pressure; only the stop flag ends the search.
    pub fn new_infinite(stopped: Arc<AtomicBool>) -> Self {
        Self::with_limits(stopped, false, None, None)
    }

    /// Timed search; the clock starts immediately.
    pub fn new_timed(stopped: Arc<AtomicBool>, soft: Duration, hard: Duration) -> Self {
        Self::with_limits(stopped, true, Some(soft), Some(hard))
    }

    /// Pondering: limits armed, clock idle until `ponderhit`.
    pub fn new_ponder(stopped: Arc<AtomicBool>, soft: Duration, hard: Duration) -> Self {
        Self::with_limits(stopped, false, Some(soft), Some(hard))
    }

    /// Start the clock; called on `ponderhit`.
    pub fn activate(&self) {
        *self.started.lock().expect("clock mutex poisoned") = Some(Instant::now());
        self.clock_running.store(true, Ordering::Release);
    }

    /// Replace the soft-limit scale (hundredths; 100 is neutral).
    pub fn update_soft_scale(&self, scale: i32) {
        self.soft_scale.store(scale.max(1) as u32, Ordering::Relaxed);
    }

    /// Whether the search must abort now.
    ///
    /// The clock is consulted only every 2048 nodes; once the hard
    /// limit fires the stop flag latches so every thread sees it.
    pub fn should_stop(&self, nodes: u64) -> bool {
        if self.stopped.load(Ordering::Relaxed) {
            return true;
        }
        if let Some(limit) = self.node_limit
            && nodes >= limit
        {
            self.stopped.store(true, Ordering::Release);
            return true;
        }
        if nodes & 2047 != 0 {
            return false;
        }
        if !self.clock_running.load(Ordering::Acquire) {
            return false;
        }
        if let Some(hard) = self.hard_limit
            && self.elapsed() >= hard
        {
            self.stopped.store(true, Ordering::Release);
            return true;
        }
        false
    }

    /// Whether iterative deepening should forgo the next iteration.
    ///
    /// Fires when the scaled soft limit is spent; a new iteration
    /// rarely completes in less time than the previous ones combined.
    pub fn should_stop_iterating(&self) -> bool {
        if self.stopped.load(Ordering::Relaxed) {
            return true;
        }
        if !self.clock_running.load(Ordering::Acquire) {
            return false;
        }
        if let Some(soft) = self.soft_limit {
            let scale = self.soft_scale.load(Ordering::Relaxed);
            let budget = soft.mul_f64(scale as f64 / 100.0);
            return self.elapsed() >= budget;
        }
        false
    }

    /// Time since the clock started; zero while pondering.
    pub fn elapsed(&self) -> Duration {
        self.started
            .lock()
            .expect("clock mutex poisoned")
            .map_or(Duration::ZERO, |at| at.elapsed())
    }

    /// The shared stop flag.
    pub fn stop_flag(&self) -> &Arc<AtomicBool> {
        &self.stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag(set: bool) -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(set))
    }

    #[test]
    fn infinite_never_times_out() {
        let control = SearchControl::new_infinite(flag(false));
        assert!(!control.should_stop(2048));
        assert!(!control.should_stop_iterating());
        assert_eq!(control.elapsed(), Duration::ZERO);
    }

    #[test]
    fn external_flag_stops_everything() {
        let stopped = flag(false);
        let control = SearchControl::new_infinite(Arc::clone(&stopped));
        stopped.store(true, Ordering::Release);
        assert!(control.should_stop(1));
        assert!(control.should_stop_iterating());
    }

    #[test]
    fn expired_hard_limit_latches_the_flag() {
        let stopped = flag(false);
        let control =
            SearchControl::new_timed(Arc::clone(&stopped), Duration::ZERO, Duration::ZERO);
        // Off-gate node counts skip the clock entirely.
        assert!(!control.should_stop(1));
        assert!(control.should_stop(2048));
        assert!(stopped.load(Ordering::Relaxed), "hard timeout should latch");
        assert!(control.should_stop(1));
    }

    #[test]
    fn node_limit_latches_like_the_hard_limit() {
        let stopped = flag(false);
        let control =
            SearchControl::new_infinite(Arc::clone(&stopped)).with_node_limit(Some(1_000));
        assert!(!control.should_stop(999));
        assert!(control.should_stop(1_000));
        assert!(stopped.load(Ordering::Relaxed));
    }

    #[test]
    fn ponder_clock_idle_until_activated() {
        let control = SearchControl::new_ponder(flag(false), Duration::ZERO, Duration::ZERO);
        assert!(!control.should_stop(2048));
        assert!(!control.should_stop_iterating());

        control.activate();
        assert!(control.should_stop(2048));
    }

    #[test]
    fn soft_scale_stretches_the_budget() {
        let control = SearchControl::new_timed(
            flag(false),
            Duration::from_millis(1),
            Duration::from_secs(60),
        );
        std::thread::sleep(Duration::from_millis(5));
        assert!(control.should_stop_iterating());

        // A 100x scale turns 1 ms of soft budget into 100 ms.
        control.update_soft_scale(10_000);
        assert!(!control.should_stop_iterating());
    }
}
