use crate::error::TaskFailure;
use crate::task::{self, JoinHandle, TaskId};

use std::future::{Future, poll_fn};
use std::task::Poll;

/// A collection of tasks awaited as a group.
///
/// `JoinSet` keeps its handles in submission order and aggregates their
/// outcomes fail-soft: one task failing never stops or cancels the
/// others. It is especially useful for scenarios like:
/// - fanning out independent requests and reporting successes and
///   failures side by side,
/// - speculative execution where the first finisher wins,
/// - making sure background tasks are cancelled when their owner goes
///   away.
///
/// Dropping a `JoinSet` aborts every task it still holds.
pub struct JoinSet<T: Send + 'static> {
    /// Handles paired with their submission index.
    entries: Vec<(usize, JoinHandle<T>)>,

    /// Index given to the next handle added to the set.
    next_index: usize,
}

impl<T: Send + 'static> JoinSet<T> {
    /// Creates a new, empty `JoinSet`.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_index: 0,
        }
    }

    /// Spawns a task on the current runtime and adds it to the set.
    ///
    /// # Panics
    ///
    /// Panics if called outside the context of a running runtime.
    pub fn spawn<F>(&mut self, future: F) -> TaskId
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.push(task::spawn(future))
    }

    /// Spawns a fallible task on the current runtime and adds it to the set.
    ///
    /// # Panics
    ///
    /// Panics if called outside the context of a running runtime.
    pub fn try_spawn<F, E>(&mut self, future: F) -> TaskId
    where
        E: std::error::Error + Send + Sync + 'static,
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.push(task::try_spawn(future))
    }

    /// Adds an already spawned task to the set.
    pub fn push(&mut self, handle: JoinHandle<T>) -> TaskId {
        let id = handle.id();

        self.entries.push((self.next_index, handle));
        self.next_index += 1;

        id
    }

    /// Returns the number of tasks not yet joined.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Waits for the next task in the set to finish.
    ///
    /// Returns the task's submission index together with its outcome, or
    /// `None` if the set is empty. Outcomes come back in completion order.
    pub async fn join_next(&mut self) -> Option<(usize, Result<T, TaskFailure>)> {
        if self.entries.is_empty() {
            return None;
        }

        poll_fn(|cx| {
            let ready = self
                .entries
                .iter()
                .position(|(_, handle)| handle.poll_finished(cx).is_ready());

            match ready {
                Some(i) => {
                    let (index, handle) = self.entries.swap_remove(i);
                    Poll::Ready(handle.take_outcome().map(|outcome| (index, outcome)))
                }
                None => Poll::Pending,
            }
        })
        .await
    }

    /// Waits for every task in the set and returns their outcomes in
    /// submission order, one slot per task.
    ///
    /// The set is empty afterwards. If this future is dropped before it
    /// completes, the tasks stay in the set.
    pub async fn join_slots(&mut self) -> Vec<Result<T, TaskFailure>> {
        poll_fn(|cx| {
            let mut pending = false;

            for (_, handle) in &self.entries {
                if handle.poll_finished(cx).is_pending() {
                    pending = true;
                }
            }

            if pending { Poll::Pending } else { Poll::Ready(()) }
        })
        .await;

        let mut entries = std::mem::take(&mut self.entries);
        entries.sort_by_key(|(index, _)| *index);

        entries
            .into_iter()
            .filter_map(|(_, handle)| handle.take_outcome())
            .collect()
    }

    /// Waits for every task in the set and partitions the outcomes.
    ///
    /// Both `results` and `failures` keep the relative submission order of
    /// the tasks they came from.
    pub async fn join_all(&mut self) -> Partitioned<T> {
        Partitioned::from_slots(self.join_slots().await)
    }

    /// Waits for the first task to finish and aborts all others.
    ///
    /// Returns `None` if the set was empty.
    pub async fn race(&mut self) -> Option<Result<T, TaskFailure>> {
        let first = self.join_next().await.map(|(_, outcome)| outcome);
        self.abort_all();
        first
    }

    /// Aborts all tasks currently managed by the set.
    ///
    /// The set is cleared immediately; outcomes of tasks that had not been
    /// joined yet are discarded.
    pub fn abort_all(&mut self) {
        for (_, handle) in self.entries.drain(..) {
            handle.abort();
        }
    }
}

impl<T: Send + 'static> Default for JoinSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> FromIterator<JoinHandle<T>> for JoinSet<T> {
    fn from_iter<I: IntoIterator<Item = JoinHandle<T>>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T: Send + 'static> Extend<JoinHandle<T>> for JoinSet<T> {
    fn extend<I: IntoIterator<Item = JoinHandle<T>>>(&mut self, iter: I) {
        for handle in iter {
            self.push(handle);
        }
    }
}

impl<T: Send + 'static> Drop for JoinSet<T> {
    fn drop(&mut self) {
        self.abort_all();
    }
}

/// Outcomes of a group of tasks split by success.
#[derive(Debug, Clone)]
pub struct Partitioned<T> {
    /// Values of the tasks that completed, in submission order.
    pub results: Vec<T>,

    /// Failures of the tasks that failed, in submission order.
    pub failures: Vec<TaskFailure>,
}

impl<T> Partitioned<T> {
    pub fn from_slots<I>(slots: I) -> Self
    where
        I: IntoIterator<Item = Result<T, TaskFailure>>,
    {
        let mut results = Vec::new();
        let mut failures = Vec::new();

        for slot in slots {
            match slot {
                Ok(value) => results.push(value),
                Err(failure) => failures.push(failure),
            }
        }

        Self { results, failures }
    }

    /// Returns `true` if no task failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_parts(self) -> (Vec<T>, Vec<TaskFailure>) {
        (self.results, self.failures)
    }
}

/// Waits until every task is finished and returns the values of the ones
/// that completed alongside the failures of the ones that did not.
///
/// Aggregation is fail-soft: a failing task never cancels its siblings.
/// Both lists follow the order of `handles`, regardless of the order in
/// which the tasks finished. Dropping the returned future before it
/// resolves aborts the tasks, the same way dropping a [`JoinSet`] does.
pub async fn await_all<T, I>(handles: I) -> (Vec<T>, Vec<TaskFailure>)
where
    T: Send + 'static,
    I: IntoIterator<Item = JoinHandle<T>>,
{
    let mut set: JoinSet<T> = handles.into_iter().collect();
    set.join_all().await.into_parts()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[test]
    fn partition_keeps_relative_order() {
        let slots = vec![
            Ok(1),
            Err(TaskFailure::new(TaskId::from_raw(2), FailureKind::Error, "two")),
            Ok(3),
            Err(TaskFailure::new(TaskId::from_raw(4), FailureKind::Panic, "four")),
            Ok(5),
        ];

        let partitioned = Partitioned::from_slots(slots);

        assert!(!partitioned.is_success());
        assert_eq!(partitioned.results, vec![1, 3, 5]);

        let failed: Vec<_> = partitioned.failures.iter().map(|f| f.task()).collect();
        assert_eq!(failed, vec![TaskId::from_raw(2), TaskId::from_raw(4)]);
    }

    #[test]
    fn partition_of_nothing_is_success() {
        let partitioned = Partitioned::<u8>::from_slots(Vec::new());

        assert!(partitioned.is_success());
        assert!(partitioned.into_parts().0.is_empty());
    }
}
