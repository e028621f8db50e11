//! Time-bounded sliding window

use std::collections::VecDeque;

/// A value stamped with the tick it was observed at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedEntry<T> {
    pub timestamp: f64,
    pub value: T,
}

/// Queue of timestamped entries, oldest at the front.
///
/// Entries are evicted by age rather than by count: anything stamped
/// strictly before the cutoff handed to [`TimedWindow::pop_expired`] goes.
#[derive(Debug, Clone)]
pub struct TimedWindow<T> {
    entries: VecDeque<TimedEntry<T>>,
}

impl<T> TimedWindow<T> {
    /// Create an empty window
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Create an empty window with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Append an entry at the back
    pub fn push(&mut self, timestamp: f64, value: T) {
        self.entries.push_back(TimedEntry { timestamp, value });
    }

    /// Remove and return the oldest entry if it is older than `cutoff`
    pub fn pop_expired(&mut self, cutoff: f64) -> Option<TimedEntry<T>> {
        match self.entries.front() {
            Some(front) if front.timestamp < cutoff => self.entries.pop_front(),
            _ => None,
        }
    }

    /// Drop every entry older than `cutoff`, returning how many went
    pub fn evict_before(&mut self, cutoff: f64) -> usize {
        let mut evicted = 0;
        while self.pop_expired(cutoff).is_some() {
            evicted += 1;
        }
        evicted
    }

    /// Time between the oldest and newest entry, if there are at least two
    pub fn span(&self) -> Option<f64> {
        if self.entries.len() < 2 {
            return None;
        }
        match (self.entries.front(), self.entries.back()) {
            (Some(first), Some(last)) => Some(last.timestamp - first.timestamp),
            _ => None,
        }
    }

    /// Timestamp of the oldest entry
    pub fn oldest_timestamp(&self) -> Option<f64> {
        self.entries.front().map(|e| e.timestamp)
    }

    /// Timestamp of the newest entry
    pub fn latest_timestamp(&self) -> Option<f64> {
        self.entries.back().map(|e| e.timestamp)
    }

    /// Number of entries currently held
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if window is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries oldest first
    pub fn iter(&self) -> impl Iterator<Item = &TimedEntry<T>> {
        self.entries.iter()
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T> Default for TimedWindow<T> {
    fn default() -> Self {
        Self::new()
    }
}
