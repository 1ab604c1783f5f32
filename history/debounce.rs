/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Cancellable fire-once timer used to coalesce bursts of continuous
//! mutations (drags, typing) into a single history commit.
//!
//! At most one deadline is pending at a time: arming always replaces any
//! prior deadline (last-write-wins). The owner polls with `fire` from its
//! frame tick; the timer never spawns threads or callbacks.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct DebounceTimer {
    interval: Duration,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    /// Quiet interval between the last qualifying mutation and the commit.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Schedule (or reschedule) the deadline at `now + interval`.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    /// Drop any pending deadline.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once per arming, the first time `now` reaches the
    /// deadline; the deadline is consumed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            },
            _ => false,
        }
    }
}
