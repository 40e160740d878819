//! Single-slot timer for unconfirmed local changes.

use embassy_time::{Duration, Instant, Timer};

/// At most one deadline is pending. Arming replaces any previous deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuardTimer {
    deadline: Option<Instant>,
}

impl GuardTimer {
    pub fn new() -> Self {
        Self { deadline: None }
    }

    pub fn arm(&mut self, now: Instant, timeout: Duration) -> Instant {
        self.cancel();
        let deadline = now + timeout;
        self.deadline = Some(deadline);
        deadline
    }

    /// Returns whether a deadline was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn expired(&self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }
}

/// Resolves with the wake-up time once `deadline` passes. Never resolves
/// when no deadline is pending.
pub async fn wait_for_deadline(deadline: Option<Instant>) -> Instant {
    match deadline {
        Some(deadline) => {
            Timer::at(deadline).await;
            Instant::now()
        }
        None => core::future::pending().await,
    }
}
