use std::collections::VecDeque;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

/// A unit of blocking work.
pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// Thread pool running operations that would otherwise block the driver.
///
/// Threads are spawned lazily up to `max_threads` and exit after staying
/// idle for `keep_alive`. The pool never runs scheduler code: a job only
/// stores its result and fires a waker.
pub(crate) struct BlockingPool {
    shared: Arc<Shared>,
}

struct Shared {
    state: Mutex<PoolState>,

    /// Signals queued jobs to idle threads and thread exits to `shutdown`.
    condvar: Condvar,

    max_threads: usize,
    keep_alive: Duration,
    thread_name: String,
}

struct PoolState {
    jobs: VecDeque<Job>,

    /// Threads alive, busy or idle.
    threads: usize,

    /// Threads waiting for a job.
    idle: usize,

    /// Wake-ups sent to idle threads and not yet consumed.
    notified: usize,

    closed: bool,

    /// Suffix of the next spawned thread name.
    next_thread: usize,
}

impl BlockingPool {
    pub(crate) fn new(max_threads: usize, keep_alive: Duration, thread_name: String) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(PoolState {
                    jobs: VecDeque::new(),
                    threads: 0,
                    idle: 0,
                    notified: 0,
                    closed: false,
                    next_thread: 0,
                }),
                condvar: Condvar::new(),
                max_threads,
                keep_alive,
                thread_name,
            }),
        }
    }

    /// Queues `job` for execution on a pool thread.
    ///
    /// Fails if the pool is shut down or if no thread exists and a new one
    /// could not be spawned.
    pub(crate) fn spawn(&self, job: Job) -> io::Result<()> {
        let mut state = self.shared.state.lock().unwrap();

        if state.closed {
            return Err(io::Error::other("blocking pool is shut down"));
        }

        state.jobs.push_back(job);

        if state.idle > state.notified {
            state.notified += 1;
            drop(state);
            self.shared.condvar.notify_one();
            return Ok(());
        }

        if state.threads >= self.shared.max_threads {
            // Saturated; a busy thread picks the job up when it frees up.
            return Ok(());
        }

        let name = format!("{}-{}", self.shared.thread_name, state.next_thread);
        let shared = self.shared.clone();

        match thread::Builder::new()
            .name(name.clone())
            .spawn(move || shared.work())
        {
            Ok(_) => {
                state.threads += 1;
                state.next_thread += 1;
                debug!(thread = %name, threads = state.threads, "blocking thread started");
                Ok(())
            }
            Err(err) if state.threads == 0 => {
                state.jobs.pop_back();
                Err(err)
            }
            Err(err) => {
                warn!(error = %err, "failed to grow blocking pool");
                Ok(())
            }
        }
    }

    /// Stops accepting jobs and waits up to `grace` for threads to exit.
    ///
    /// Jobs still queued are dropped without running. Threads busy past
    /// the grace period are left to finish on their own; they hold no
    /// runtime state.
    pub(crate) fn shutdown(&self, grace: Duration) -> usize {
        let deadline = Instant::now() + grace;
        let mut state = self.shared.state.lock().unwrap();

        state.closed = true;
        let dropped = state.jobs.len();
        state.jobs.clear();
        self.shared.condvar.notify_all();

        while state.threads > 0 {
            let timeout = deadline.saturating_duration_since(Instant::now());
            if timeout.is_zero() {
                break;
            }

            state = self.shared.condvar.wait_timeout(state, timeout).unwrap().0;
        }

        if state.threads > 0 {
            debug!(busy = state.threads, "blocking threads still running after shutdown");
        }

        dropped
    }
}

impl Shared {
    /// Pool thread main loop.
    fn work(&self) {
        let mut state = self.state.lock().unwrap();

        loop {
            if let Some(job) = state.jobs.pop_front() {
                drop(state);

                if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                    warn!("blocking job panicked");
                }

                state = self.state.lock().unwrap();
                continue;
            }

            if state.closed {
                break;
            }

            state.idle += 1;
            let (guard, timeout) = self.condvar.wait_timeout(state, self.keep_alive).unwrap();
            state = guard;
            state.idle -= 1;

            if state.notified > 0 {
                state.notified -= 1;
                continue;
            }

            if timeout.timed_out() && state.jobs.is_empty() {
                trace!("blocking thread idle, exiting");
                break;
            }
        }

        state.threads -= 1;
        drop(state);

        // Lets `shutdown` observe the exit.
        self.condvar.notify_all();
    }
}
