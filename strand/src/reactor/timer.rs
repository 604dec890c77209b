use std::collections::BTreeMap;
use std::task::Waker;
use std::time::Instant;

/// Position of an entry in the [`TimerQueue`].
///
/// Keys order by deadline first and by insertion sequence second, so
/// timers with equal deadlines fire in the order they were registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct TimerKey {
    pub(crate) deadline: Instant,
    seq: u64,
}

/// Pending wake-ups ordered by deadline.
///
/// Entries are removed when they fire or when their owner cancels them;
/// a cancelled timer never wakes anything.
pub(crate) struct TimerQueue {
    entries: BTreeMap<TimerKey, Waker>,
    next_seq: u64,
}

impl TimerQueue {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_seq: 0,
        }
    }

    /// Registers `waker` to be woken once `deadline` has passed.
    pub(crate) fn insert(&mut self, deadline: Instant, waker: Waker) -> TimerKey {
        let key = TimerKey {
            deadline,
            seq: self.next_seq,
        };
        self.next_seq += 1;

        self.entries.insert(key, waker);
        key
    }

    /// Cancels a timer. Returns `false` if it already fired.
    pub(crate) fn remove(&mut self, key: TimerKey) -> bool {
        self.entries.remove(&key).is_some()
    }

    /// Replaces the waker of a pending timer.
    ///
    /// Returns `false` if the timer is no longer queued.
    pub(crate) fn set_waker(&mut self, key: TimerKey, waker: &Waker) -> bool {
        match self.entries.get_mut(&key) {
            Some(current) => {
                if !current.will_wake(waker) {
                    current.clone_from(waker);
                }
                true
            }
            None => false,
        }
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.entries.first_key_value().map(|(key, _)| key.deadline)
    }

    /// Removes every timer whose deadline is at or before `now`.
    ///
    /// Wakers are returned in firing order: ascending deadline, then
    /// insertion order.
    pub(crate) fn expired(&mut self, now: Instant) -> Vec<Waker> {
        let mut fired = Vec::new();

        while let Some(entry) = self.entries.first_entry() {
            if entry.key().deadline > now {
                break;
            }
            fired.push(entry.remove());
        }

        fired
    }

    /// Drops every pending timer. Returns how many were discarded.
    pub(crate) fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
