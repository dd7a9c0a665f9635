//! Task pipeline - bounded producer → worker pool → reducer
//!
//! A [`WorkerPool`] owns a fixed set of long-lived worker threads fed through a
//! bounded task channel. Each [`WorkerPool::reduce`] call:
//!
//! 1. spawns a scoped producer that pushes the tasks, blocking when the
//!    channel is full;
//! 2. lets the workers run the work function and push results into a bounded
//!    result channel;
//! 3. reduces exactly as many results as tasks were submitted on the calling
//!    thread, keeping the best by the comparator.
//!
//! Ties go to the lowest submission index, so the reduced value does not
//! depend on which worker finished first. Every message carries the epoch of
//! its call; anything left over from an earlier (cancelled or failed) call is
//! dropped on sight.

use std::any::Any;
use std::cmp::Ordering;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use log::{debug, info, warn};

use crate::error::PipelineError;

/// How often blocked producer / reducer loops look at the cancel flag
const CANCEL_POLL: Duration = Duration::from_millis(10);

struct Job<T> {
    epoch: u64,
    index: usize,
    task: T,
}

struct Outcome<R> {
    epoch: u64,
    index: usize,
    result: Result<R, String>,
}

#[derive(Default)]
struct Shared {
    epoch: AtomicU64,
    cancelled: AtomicBool,
}

impl Shared {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(AtomicOrdering::SeqCst)
    }

    fn is_stale(&self, epoch: u64) -> bool {
        self.is_cancelled() || epoch != self.epoch.load(AtomicOrdering::SeqCst)
    }
}

/// Handle that cancels the reduction currently running on a pool.
///
/// Cloneable and usable from any thread. A cancel issued while no reduction
/// is running is forgotten when the next one starts.
#[derive(Clone)]
pub struct Canceller {
    shared: Arc<Shared>,
}

impl Canceller {
    pub fn cancel(&self) {
        self.shared.cancelled.store(true, AtomicOrdering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.is_cancelled()
    }
}

/// Fixed pool of worker threads running `work` over submitted tasks
pub struct WorkerPool<T, R> {
    jobs: Option<Sender<Job<T>>>,
    outcomes: Option<Receiver<Outcome<R>>>,
    workers: Vec<JoinHandle<()>>,
    shared: Arc<Shared>,
}

impl<T, R> WorkerPool<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    /// Spawn `workers` threads (at least one) with channels of `capacity`
    pub fn new<F>(workers: usize, capacity: usize, work: F) -> Result<Self, PipelineError>
    where
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        let workers = workers.max(1);
        let capacity = capacity.max(1);
        let (job_tx, job_rx) = bounded::<Job<T>>(capacity);
        let (outcome_tx, outcome_rx) = bounded::<Outcome<R>>(capacity);
        let shared = Arc::new(Shared::default());
        let work = Arc::new(work);

        let mut pool = Self {
            jobs: Some(job_tx),
            outcomes: Some(outcome_rx),
            workers: Vec::with_capacity(workers),
            shared,
        };

        for id in 0..workers {
            let jobs = job_rx.clone();
            let outcomes = outcome_tx.clone();
            let work = Arc::clone(&work);
            let shared = Arc::clone(&pool.shared);
            // On error the partially built pool is dropped, which joins the
            // workers already running.
            let handle = thread::Builder::new()
                .name(format!("search-worker-{id}"))
                .spawn(move || worker_loop(id, jobs, outcomes, work.as_ref(), &shared))?;
            pool.workers.push(handle);
        }

        info!("worker pool started: {workers} workers, channel capacity {capacity}");
        Ok(pool)
    }

    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    pub fn canceller(&self) -> Canceller {
        Canceller {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Run every task and return the best result by `compare`.
    ///
    /// `Ok(None)` for an empty task list. Equal results resolve to the one
    /// whose task was submitted first.
    pub fn reduce<C>(&mut self, tasks: Vec<T>, compare: C) -> Result<Option<R>, PipelineError>
    where
        C: Fn(&R, &R) -> Ordering,
    {
        let epoch = self.shared.epoch.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        self.shared.cancelled.store(false, AtomicOrdering::SeqCst);

        let workload = tasks.len();
        if workload == 0 {
            return Ok(None);
        }

        let jobs = self.jobs.clone().ok_or(PipelineError::Disconnected)?;
        let outcomes = self.outcomes.as_ref().ok_or(PipelineError::Disconnected)?;
        let shared = self.shared.as_ref();
        debug!("epoch {epoch}: submitting {workload} tasks");

        thread::scope(|scope| {
            scope.spawn(move || produce(jobs, tasks, epoch, shared));

            let reduced = collect(outcomes, shared, epoch, workload, &compare);
            if reduced.is_err() {
                // Releases the producer if it is blocked on a full channel.
                shared.cancelled.store(true, AtomicOrdering::SeqCst);
            }
            reduced
        })
    }
}

impl<T, R> Drop for WorkerPool<T, R> {
    fn drop(&mut self) {
        self.shared.cancelled.store(true, AtomicOrdering::SeqCst);
        // Closing both channels wakes workers blocked on either side.
        self.jobs.take();
        self.outcomes.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!("worker thread panicked during shutdown");
            }
        }
        debug!("worker pool shut down");
    }
}

fn worker_loop<T, R, F>(
    id: usize,
    jobs: Receiver<Job<T>>,
    outcomes: Sender<Outcome<R>>,
    work: &F,
    shared: &Shared,
) where
    F: Fn(T) -> R,
{
    debug!("worker {id} started");
    for job in jobs.iter() {
        if shared.is_stale(job.epoch) {
            continue;
        }
        let result = panic::catch_unwind(AssertUnwindSafe(|| work(job.task)))
            .map_err(|payload| panic_message(payload.as_ref()));
        if let Err(message) = &result {
            warn!("worker {id}: task {} panicked: {message}", job.index);
        }
        let outcome = Outcome {
            epoch: job.epoch,
            index: job.index,
            result,
        };
        if outcomes.send(outcome).is_err() {
            break;
        }
    }
    debug!("worker {id} exiting");
}

fn produce<T>(jobs: Sender<Job<T>>, tasks: Vec<T>, epoch: u64, shared: &Shared) {
    for (index, task) in tasks.into_iter().enumerate() {
        let mut job = Job { epoch, index, task };
        loop {
            if shared.is_cancelled() {
                return;
            }
            match jobs.send_timeout(job, CANCEL_POLL) {
                Ok(()) => break,
                Err(SendTimeoutError::Timeout(back)) => job = back,
                Err(SendTimeoutError::Disconnected(_)) => return,
            }
        }
    }
}

fn collect<R, C>(
    outcomes: &Receiver<Outcome<R>>,
    shared: &Shared,
    epoch: u64,
    workload: usize,
    compare: &C,
) -> Result<Option<R>, PipelineError>
where
    C: Fn(&R, &R) -> Ordering,
{
    let mut best: Option<(usize, R)> = None;
    let mut received = 0;

    while received < workload {
        if shared.is_cancelled() {
            warn!("epoch {epoch}: cancelled after {received}/{workload} results");
            return Err(PipelineError::Cancelled);
        }
        let outcome = match outcomes.recv_timeout(CANCEL_POLL) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return Err(PipelineError::Disconnected),
        };
        if outcome.epoch != epoch {
            continue;
        }
        received += 1;

        let index = outcome.index;
        let result = outcome
            .result
            .map_err(|message| PipelineError::WorkerPanicked { index, message })?;
        best = Some(match best {
            Some((best_index, current)) if !improves(&result, index, &current, best_index, compare) => {
                (best_index, current)
            }
            _ => (index, result),
        });
    }

    Ok(best.map(|(_, result)| result))
}

/// Whether `candidate` (task `index`) replaces `best` (task `best_index`)
fn improves<R, C>(candidate: &R, index: usize, best: &R, best_index: usize, compare: &C) -> bool
where
    C: Fn(&R, &R) -> Ordering,
{
    match compare(candidate, best) {
        Ordering::Greater => true,
        Ordering::Equal => index < best_index,
        Ordering::Less => false,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// One-shot reduce on scoped threads.
///
/// Unlike [`WorkerPool`] the work function may borrow from the caller. A
/// panicking task propagates when the scope ends.
pub fn reduce_scoped<T, R, F, C>(tasks: Vec<T>, workers: usize, work: F, compare: C) -> Option<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync,
    C: Fn(&R, &R) -> Ordering,
{
    let workload = tasks.len();
    if workload == 0 {
        return None;
    }
    let workers = workers.clamp(1, workload);

    // Sized to the workload so queuing every task up front never blocks.
    let (job_tx, job_rx) = bounded(workload);
    for job in tasks.into_iter().enumerate() {
        if job_tx.send(job).is_err() {
            return None;
        }
    }
    drop(job_tx);

    let (result_tx, result_rx) = bounded::<(usize, R)>(workers);
    let work = &work;
    thread::scope(|scope| {
        for _ in 0..workers {
            let jobs = job_rx.clone();
            let results = result_tx.clone();
            scope.spawn(move || {
                for (index, task) in jobs.iter() {
                    if results.send((index, work(task))).is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        let mut best: Option<(usize, R)> = None;
        for (index, result) in result_rx.iter().take(workload) {
            best = Some(match best {
                Some((best_index, current))
                    if !improves(&result, index, &current, best_index, &compare) =>
                {
                    (best_index, current)
                }
                _ => (index, result),
            });
        }
        best.map(|(_, result)| result)
    })
}
