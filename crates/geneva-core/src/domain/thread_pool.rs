//! A fixed-size pool of worker threads draining a [`BoundedQueue`] of tasks.
//!
//! Used to parallelize the adapt and evaluate phases of the optimization
//! engine (§4.6, §5). Submitted jobs that panic are caught rather than
//! propagated across the thread boundary; the pool accumulates them so the
//! driver can surface an aggregated error after draining.

use super::queue::BoundedQueue;
use geneva_error::{GenevaError, GenevaResult};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

type Job = Box<dyn FnOnce() + Send + 'static>;

enum Message {
    Work(Job),
    Terminate,
}

/// A handle to a task's eventual result, returned by [`ThreadPool::schedule`].
pub struct TaskHandle<T> {
    receiver: std::sync::mpsc::Receiver<T>,
}

impl<T> TaskHandle<T> {
    /// Blocks until the task completes and returns its result. A task that
    /// panicked never sends, so the receiver disconnects; that surfaces here
    /// as a `ThreadPool` error instead of propagating the panic.
    pub fn result(self) -> GenevaResult<T> {
        self.receiver.recv().map_err(|_| {
            geneva_error::geneva_err!(ThreadPool: "worker task panicked before producing a result")
        })
    }
}

pub struct ThreadPool {
    queue: Arc<BoundedQueue<Message>>,
    workers: Vec<Worker>,
    wait_group: WaitGroup,
    errors: Arc<Mutex<Vec<GenevaError>>>,
}

impl ThreadPool {
    /// Creates a pool of `size` long-lived worker threads. `size == 0` is
    /// treated as one worker — a pool with no workers can never drain.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let queue = Arc::new(BoundedQueue::unbounded());
        let errors = Arc::new(Mutex::new(Vec::new()));

        let workers = (0..size)
            .map(|id| Worker::new(id, Arc::clone(&queue)))
            .collect();

        Self {
            queue,
            workers,
            wait_group: WaitGroup::new(),
            errors,
        }
    }

    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    pub fn is_alive(&self) -> bool {
        self.workers.iter().any(|w| w.is_alive())
    }

    /// Submits a fire-and-forget job. A panic inside `f` is captured and
    /// recorded rather than unwinding the worker thread.
    pub fn submit<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let guard = self.wait_group.guard();
        let errors = Arc::clone(&self.errors);
        let job: Job = Box::new(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(f));
            if result.is_err() {
                errors.lock().unwrap().push(geneva_error::geneva_err!(
                    ThreadPool: "worker task panicked"
                ));
            }
            drop(guard);
        });
        self.queue.push_and_block(Message::Work(job));
    }

    /// Submits a job and returns a handle to its result. A panic inside `f`
    /// is recorded in [`ThreadPool::take_errors`]; the handle is never
    /// fulfilled in that case, so callers that rely on `schedule` should
    /// check `has_errors` after draining.
    pub fn schedule<F, T>(&self, f: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = std::sync::mpsc::sync_channel(1);
        let guard = self.wait_group.guard();
        let errors = Arc::clone(&self.errors);
        let job: Job = Box::new(move || {
            match panic::catch_unwind(AssertUnwindSafe(f)) {
                Ok(value) => {
                    let _ = tx.send(value);
                }
                Err(_) => {
                    errors.lock().unwrap().push(geneva_error::geneva_err!(
                        ThreadPool: "worker task panicked"
                    ));
                }
            }
            drop(guard);
        });
        self.queue.push_and_block(Message::Work(job));
        TaskHandle { receiver: rx }
    }

    /// Blocks until every submitted job that hasn't finished yet has
    /// finished. Returns the number of jobs that were drained.
    pub fn drain_queue(&self) -> usize {
        self.wait_group.wait()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.lock().unwrap().is_empty()
    }

    /// Drains and returns the accumulated task errors.
    pub fn take_errors(&self) -> Vec<GenevaError> {
        std::mem::take(&mut self.errors.lock().unwrap())
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        for _ in &self.workers {
            self.queue.push_and_block(Message::Terminate);
        }
        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                thread.join().unwrap();
            }
        }
    }
}

struct Worker {
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    fn new(id: usize, queue: Arc<BoundedQueue<Message>>) -> Self {
        Worker {
            id,
            thread: Some(thread::spawn(move || loop {
                match queue.wait_and_pop() {
                    Message::Work(job) => job(),
                    Message::Terminate => break,
                }
            })),
        }
    }

    fn is_alive(&self) -> bool {
        self.thread.is_some()
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("is_alive", &self.is_alive())
            .finish()
    }
}

/// Lets a driver thread wait for a set of in-flight guards to all drop.
#[derive(Clone)]
pub struct WaitGroup {
    inner: Arc<Inner>,
    total_count: Arc<AtomicUsize>,
}

struct Inner {
    counter: AtomicUsize,
    lock: Mutex<()>,
    cvar: Condvar,
}

pub struct WaitGuard {
    wg: WaitGroup,
}

impl Drop for WaitGuard {
    fn drop(&mut self) {
        if self.wg.inner.counter.fetch_sub(1, Ordering::AcqRel) == 1 {
            let _guard = self.wg.inner.lock.lock().unwrap();
            self.wg.inner.cvar.notify_all();
        }
    }
}

impl WaitGroup {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                counter: AtomicUsize::new(0),
                lock: Mutex::new(()),
                cvar: Condvar::new(),
            }),
            total_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn get_count(&self) -> usize {
        self.total_count.load(Ordering::Acquire)
    }

    pub fn guard(&self) -> WaitGuard {
        self.inner.counter.fetch_add(1, Ordering::AcqRel);
        self.total_count.fetch_add(1, Ordering::AcqRel);
        WaitGuard { wg: self.clone() }
    }

    pub fn wait(&self) -> usize {
        if self.inner.counter.load(Ordering::Acquire) == 0 {
            return 0;
        }

        let lock = self.inner.lock.lock().unwrap();
        let _ = self
            .inner
            .cvar
            .wait_while(lock, |_| self.inner.counter.load(Ordering::Acquire) != 0);

        self.get_count()
    }

    /// Waits up to `timeout`; returns whether the counter reached zero.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        if self.inner.counter.load(Ordering::Acquire) == 0 {
            return true;
        }
        let lock = self.inner.lock.lock().unwrap();
        let (_, result) = self
            .inner
            .cvar
            .wait_timeout_while(lock, timeout, |_| {
                self.inner.counter.load(Ordering::Acquire) != 0
            })
            .unwrap();
        !result.timed_out()
    }
}

impl Default for WaitGroup {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn submit_runs_jobs() {
        let pool = ThreadPool::new(4);
        let counter = Arc::new(AtomicU32::new(0));
        for _ in 0..8 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.drain_queue();
        assert_eq!(counter.load(Ordering::SeqCst), 8);
        assert!(!pool.has_errors());
    }

    #[test]
    fn schedule_returns_result() {
        let pool = ThreadPool::new(2);
        let handle = pool.schedule(|| 21 * 2);
        assert_eq!(handle.result().unwrap(), 42);
    }

    #[test]
    fn scheduled_task_panic_surfaces_as_error_not_a_driver_panic() {
        let pool = ThreadPool::new(2);
        let handle = pool.schedule(|| -> u32 { panic!("boom") });
        pool.drain_queue();
        assert!(handle.result().is_err());
        assert!(pool.has_errors());
    }

    #[test]
    fn panicking_task_is_captured_not_propagated() {
        let pool = ThreadPool::new(2);
        pool.submit(|| panic!("boom"));
        pool.drain_queue();
        assert!(pool.has_errors());
        let errors = pool.take_errors();
        assert_eq!(errors.len(), 1);
        assert!(!pool.has_errors());
    }

    #[test]
    fn wait_group_zero_tasks_returns_immediately() {
        let wg = WaitGroup::new();
        assert_eq!(wg.wait(), 0);
    }
}
