//! Outbound typing indicator state machine
//!
//! Tracks whether the local user counts as "typing" toward one private
//! conversation. The machine is clock-injected: callers pass `Instant`s
//! in, so tests never sleep. Transitions map one-to-one onto the wire
//! commands the caller must send (`typing` / `stopTyping`).

use std::time::{Duration, Instant};

/// What the caller must put on the wire after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingSignal {
    /// Announce that typing started
    Start,
    /// Announce that typing stopped
    Stop,
}

/// Typing state for a single private conversation
#[derive(Debug)]
pub struct TypingTracker {
    idle_after: Duration,
    last_keystroke: Option<Instant>,
}

impl TypingTracker {
    /// Creates a tracker that goes idle after `idle_after` without a
    /// keystroke
    pub fn new(idle_after: Duration) -> Self {
        Self {
            idle_after,
            last_keystroke: None,
        }
    }

    /// Whether the local user currently counts as typing
    pub fn is_typing(&self) -> bool {
        self.last_keystroke.is_some()
    }

    /// Record a keystroke at `now`
    ///
    /// # Returns
    ///
    /// Returns `Some(TypingSignal::Start)` on the first keystroke of a
    /// burst; later keystrokes only refresh the idle deadline.
    pub fn keystroke(&mut self, now: Instant) -> Option<TypingSignal> {
        let was_typing = self.last_keystroke.is_some();
        self.last_keystroke = Some(now);
        if was_typing {
            None
        } else {
            Some(TypingSignal::Start)
        }
    }

    /// Check the idle deadline at `now`
    ///
    /// # Returns
    ///
    /// Returns `Some(TypingSignal::Stop)` exactly once when the idle
    /// window has elapsed since the last keystroke.
    pub fn poll(&mut self, now: Instant) -> Option<TypingSignal> {
        match self.last_keystroke {
            Some(last) if now.duration_since(last) >= self.idle_after => {
                self.last_keystroke = None;
                Some(TypingSignal::Stop)
            }
            _ => None,
        }
    }

    /// Record that the pending message was sent
    ///
    /// Sending ends the burst immediately.
    ///
    /// # Returns
    ///
    /// Returns `Some(TypingSignal::Stop)` if a burst was in progress.
    pub fn message_sent(&mut self) -> Option<TypingSignal> {
        if self.last_keystroke.take().is_some() {
            Some(TypingSignal::Stop)
        } else {
            None
        }
    }
}
