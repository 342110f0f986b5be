// Chunk: docs/chunks/async_highlight - Generation-tagged asynchronous token requests
//!
//! Token request jobs and the executors that run them.
//!
//! A [`HighlightJob`] carries everything a worker needs: an `Arc` snapshot of
//! the tree, the token provider, the byte range and the generation the
//! request was issued at. Workers never touch the canvas; they post a
//! [`HighlightResponse`] on the completion channel and the owner thread
//! drains it.
//!
//! Two executors are provided:
//!
//! - [`ThreadPoolExecutor`]: worker threads fed by a crossbeam channel.
//! - [`DeferredExecutor`]: holds jobs until the caller runs them, in any
//!   order. Single-threaded hosts and deterministic tests use this one.

use std::collections::VecDeque;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, SendError, Sender};
use log::{debug, warn};
use neon_syntax::{ParseTree, SyntaxError, Token, TokenProvider};

use crate::invalidation::Generation;

/// One asynchronous token request.
pub struct HighlightJob {
    pub request_id: u64,
    pub generation: Generation,
    pub range: Range<usize>,
    pub tree: Arc<ParseTree>,
    pub provider: Arc<dyn TokenProvider>,
}

impl HighlightJob {
    /// Runs the query. A panic inside the provider becomes a
    /// `QueryFailure` response instead of taking the worker down.
    pub fn run(self) -> HighlightResponse {
        let HighlightJob {
            request_id,
            generation,
            range,
            tree,
            provider,
        } = self;
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            provider.tokens(&tree, range.clone())
        }))
        .unwrap_or_else(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(SyntaxError::QueryFailure {
                start: range.start,
                end: range.end,
                message: format!("query panicked: {}", message),
            })
        });
        HighlightResponse {
            request_id,
            generation,
            range,
            result,
        }
    }
}

/// The outcome of a [`HighlightJob`].
#[derive(Debug)]
pub struct HighlightResponse {
    pub request_id: u64,
    pub generation: Generation,
    pub range: Range<usize>,
    pub result: Result<Vec<Token>, SyntaxError>,
}

// =============================================================================
// Completion channel
// =============================================================================

/// Sending half of the completion channel.
///
/// Cloneable and `Send`, so every worker holds one. After each send the
/// optional waker runs, letting a host run loop know completions are ready.
#[derive(Clone)]
pub struct CompletionSender {
    sender: Sender<HighlightResponse>,
    waker: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl CompletionSender {
    pub fn send(&self, response: HighlightResponse) -> Result<(), SendError<HighlightResponse>> {
        let result = self.sender.send(response);
        if let Some(waker) = &self.waker {
            waker();
        }
        result
    }
}

/// Receiving half of the completion channel, drained by the owner thread.
pub struct CompletionReceiver {
    receiver: Receiver<HighlightResponse>,
}

impl CompletionReceiver {
    /// Tries to receive a completion without blocking.
    pub fn try_recv(&self) -> Option<HighlightResponse> {
        self.receiver.try_recv().ok()
    }

    /// Waits up to `timeout` for a completion.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<HighlightResponse> {
        match self.receiver.recv_timeout(timeout) {
            Ok(response) => Some(response),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Creates a completion channel.
///
/// `waker` is called after every completion is posted, from whichever
/// thread posted it.
pub fn completion_channel(
    waker: Option<Arc<dyn Fn() + Send + Sync>>,
) -> (CompletionSender, CompletionReceiver) {
    let (sender, receiver) = unbounded();
    (
        CompletionSender { sender, waker },
        CompletionReceiver { receiver },
    )
}

// =============================================================================
// Executors
// =============================================================================

/// Runs highlight jobs somewhere and posts their responses.
pub trait JobExecutor {
    fn submit(&mut self, job: HighlightJob);
}

/// A fixed set of worker threads sharing one job queue.
pub struct ThreadPoolExecutor {
    jobs: Option<Sender<HighlightJob>>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPoolExecutor {
    /// Starts `threads` workers (at least one) posting to `completions`.
    pub fn new(threads: usize, completions: CompletionSender) -> Self {
        let (jobs, queue) = unbounded::<HighlightJob>();
        let workers = (0..threads.max(1))
            .map(|index| {
                let queue = queue.clone();
                let completions = completions.clone();
                thread::spawn(move || {
                    while let Ok(job) = queue.recv() {
                        let request_id = job.request_id;
                        if completions.send(job.run()).is_err() {
                            // Owner dropped the receiver
                            debug!("highlight worker {} exiting at request {}", index, request_id);
                            break;
                        }
                    }
                })
            })
            .collect();
        Self {
            jobs: Some(jobs),
            workers,
        }
    }

    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }
}

impl JobExecutor for ThreadPoolExecutor {
    fn submit(&mut self, job: HighlightJob) {
        let Some(jobs) = &self.jobs else {
            return;
        };
        if let Err(err) = jobs.send(job) {
            warn!("highlight request {} dropped: workers are gone", err.0.request_id);
        }
    }
}

impl Drop for ThreadPoolExecutor {
    fn drop(&mut self) {
        // Closing the queue lets every worker finish its current job and exit
        self.jobs.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

/// Holds submitted jobs until the caller runs them.
///
/// Clones share the same queue, so a test can keep one handle while the
/// scheduler owns another.
#[derive(Clone)]
pub struct DeferredExecutor {
    queue: Arc<Mutex<VecDeque<HighlightJob>>>,
    completions: CompletionSender,
}

impl DeferredExecutor {
    pub fn new(completions: CompletionSender) -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            completions,
        }
    }

    /// Number of jobs waiting to run.
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    /// Ranges of the waiting jobs, oldest first.
    pub fn pending_ranges(&self) -> Vec<Range<usize>> {
        self.lock().iter().map(|job| job.range.clone()).collect()
    }

    /// Runs the oldest job. Returns false if there was none.
    pub fn run_next(&self) -> bool {
        self.run_at(0)
    }

    /// Runs the newest job. Returns false if there was none.
    pub fn run_newest(&self) -> bool {
        let len = self.pending();
        len > 0 && self.run_at(len - 1)
    }

    /// Runs the job at `index` in submission order.
    pub fn run_at(&self, index: usize) -> bool {
        let job = self.lock().remove(index);
        match job {
            Some(job) => {
                // A closed channel means nobody will look at the result
                let _ = self.completions.send(job.run());
                true
            }
            None => false,
        }
    }

    /// Runs every waiting job, oldest first. Returns how many ran.
    pub fn run_all(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        ran
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<HighlightJob>> {
        // Jobs never run under the lock, so a poisoned queue is still intact
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl JobExecutor for DeferredExecutor {
    fn submit(&mut self, job: HighlightJob) {
        self.lock().push_back(job);
    }
}
