//! Chat moderation helpers: banned-word filtering and rate limiting
//!
//! Self-contained; not wired into the lifecycles. The rate limiter keeps a
//! sliding window per actor and prunes entries as their window expires, so
//! the map only ever holds actors with recent activity.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};

/// Case-insensitive substring filter over a configured banned list.
#[derive(Debug, Clone)]
pub struct WordFilter {
    banned: Vec<String>,
}

impl WordFilter {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            banned: words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Whether `text` contains any banned word.
    pub fn flags(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.banned.iter().any(|w| lowered.contains(w.as_str()))
    }
}

/// Per-actor sliding-window message counter.
#[derive(Debug)]
pub struct RateLimiter {
    max_events: usize,
    window: Duration,
    seen: HashMap<String, VecDeque<DateTime<Utc>>>,
}

impl RateLimiter {
    pub fn new(max_events: usize, window: Duration) -> Self {
        Self {
            max_events,
            window,
            seen: HashMap::new(),
        }
    }

    /// Record one event for `actor_id` at `at`. Returns false once the
    /// actor exceeds `max_events` inside the window.
    pub fn record(&mut self, actor_id: &str, at: DateTime<Utc>) -> bool {
        let cutoff = at - self.window;

        let events = self.seen.entry(actor_id.to_string()).or_default();
        while events.front().is_some_and(|&t| t <= cutoff) {
            events.pop_front();
        }
        events.push_back(at);

        let within = events.len() <= self.max_events;

        // drop actors whose whole window has expired elsewhere in the map
        self.seen.retain(|_, evs| {
            while evs.front().is_some_and(|&t| t <= cutoff) {
                evs.pop_front();
            }
            !evs.is_empty()
        });

        within
    }

    /// Actors currently tracked; shrinks as windows expire.
    pub fn tracked_actors(&self) -> usize {
        self.seen.len()
    }
}
