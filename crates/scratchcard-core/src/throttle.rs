//! Leading + trailing edge throttle with collapse-to-latest semantics.
//!
//! The throttle holds no timer itself. `call` tells the caller whether to
//! run now or arm a timer; when the timer fires the caller passes the time
//! to `fire` and runs whatever comes back.

/// Outcome of offering a value to the throttle.
#[derive(Debug, Clone, PartialEq)]
pub enum Throttled<T> {
    /// Leading edge: run with this value now.
    Run(T),
    /// Stored as pending; arm a timer for `wait_ms`.
    Schedule { wait_ms: f64 },
    /// Replaced an already pending value; the timer is already armed.
    Coalesced,
}

#[derive(Debug, Clone)]
pub struct Throttle<T> {
    interval_ms: f64,
    last_run: Option<f64>,
    pending: Option<T>,
    armed: bool,
}

impl<T> Throttle<T> {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_run: None,
            pending: None,
            armed: false,
        }
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn call(&mut self, now: f64, value: T) -> Throttled<T> {
        if self.armed {
            self.pending = Some(value);
            return Throttled::Coalesced;
        }
        let elapsed = self.last_run.map_or(f64::INFINITY, |last| now - last);
        if elapsed >= self.interval_ms {
            self.last_run = Some(now);
            return Throttled::Run(value);
        }
        self.pending = Some(value);
        self.armed = true;
        Throttled::Schedule {
            wait_ms: self.interval_ms - elapsed,
        }
    }

    /// Trailing edge: the armed timer fired.
    pub fn fire(&mut self, now: f64) -> Option<T> {
        self.armed = false;
        let value = self.pending.take()?;
        self.last_run = Some(now);
        Some(value)
    }

    /// Run the pending value immediately, if any. The caller should clear
    /// its timer.
    pub fn flush(&mut self, now: f64) -> Option<T> {
        self.armed = false;
        let value = self.pending.take()?;
        self.last_run = Some(now);
        Some(value)
    }

    pub fn cancel(&mut self) {
        self.armed = false;
        self.pending = None;
    }
}
