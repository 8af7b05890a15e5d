//! Process-wide singleton that owns the producer threads filling a bounded
//! queue of random-word buffers, and hands out monotonically-distinct seeds
//! from a separate stream (§4.5).

use crate::domain::queue::BoundedQueue;
use geneva_error::{GenevaResult, geneva_err};
use rand::{RngCore, SeedableRng};
use rand::rngs::SmallRng;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const DEFAULT_BUFFER_WORDS: usize = 1024;
const DEFAULT_QUEUE_CAPACITY: usize = 8;
const GET_BUFFER_TIMEOUT: Duration = Duration::from_millis(250);
const PRODUCER_POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// A fixed-size array of uniform 32-bit words plus a read cursor.
///
/// Produced by a factory producer thread, consumed word-by-word by a
/// [`super::RandomProxy`], then handed back for recycling rather than
/// reallocated.
pub(crate) struct Buffer {
    words: Box<[u32]>,
    cursor: usize,
}

impl Buffer {
    fn new(size: usize) -> Self {
        Self {
            words: vec![0u32; size].into_boxed_slice(),
            cursor: 0,
        }
    }

    pub(crate) fn next_u32(&mut self) -> Option<u32> {
        let word = *self.words.get(self.cursor)?;
        self.cursor += 1;
        Some(word)
    }
}

/// Construction-time knobs for [`RandomFactory::init`].
#[derive(Debug, Clone)]
pub struct FactoryConfig {
    pub n_producer_threads: u16,
    pub buffer_size: usize,
    pub buffer_queue_capacity: usize,
    pub start_seed: Option<u64>,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            n_producer_threads: 2,
            buffer_size: DEFAULT_BUFFER_WORDS,
            buffer_queue_capacity: DEFAULT_QUEUE_CAPACITY,
            start_seed: None,
        }
    }
}

struct Inner {
    filled: Arc<BoundedQueue<Buffer>>,
    empty: Arc<BoundedQueue<Buffer>>,
    producers: Mutex<Vec<JoinHandle<()>>>,
    shutdown: Arc<AtomicBool>,
    seed_counter: AtomicU64,
    seed_base: u32,
}

impl Inner {
    fn start(config: FactoryConfig) -> Self {
        let filled = Arc::new(BoundedQueue::new(config.buffer_queue_capacity.max(1)));
        let empty = Arc::new(BoundedQueue::unbounded());
        let shutdown = Arc::new(AtomicBool::new(false));

        let start_seed = config.start_seed.unwrap_or_else(|| {
            // Mix the address of a fresh stack allocation with the current
            // time to get a process-specific default when the caller does
            // not ask for reproducibility.
            let now = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0);
            let marker = 0u8;
            now ^ ((&marker as *const u8 as u64).wrapping_mul(0x9E3779B97F4A7C15))
        });

        let mut producers = Vec::with_capacity(config.n_producer_threads as usize);
        for producer_id in 0..config.n_producer_threads.max(1) {
            let filled = Arc::clone(&filled);
            let empty = Arc::clone(&empty);
            let shutdown = Arc::clone(&shutdown);
            let buffer_size = config.buffer_size.max(1);
            let producer_seed = start_seed ^ ((producer_id as u64 + 1).wrapping_mul(0xD1B54A32D192ED03));

            producers.push(thread::spawn(move || {
                let mut rng = SmallRng::seed_from_u64(producer_seed);
                while !shutdown.load(Ordering::Acquire) {
                    let mut buffer = empty
                        .pop_wait_timeout(PRODUCER_POLL_TIMEOUT)
                        .unwrap_or_else(|| Buffer::new(buffer_size));

                    for word in buffer.words.iter_mut() {
                        *word = rng.next_u32();
                    }
                    buffer.cursor = 0;

                    let mut pending = buffer;
                    loop {
                        if shutdown.load(Ordering::Acquire) {
                            return;
                        }
                        match filled.push_and_wait(pending, PRODUCER_POLL_TIMEOUT) {
                            Ok(()) => break,
                            Err(returned) => pending = returned,
                        }
                    }
                }
            }));
        }

        Self {
            filled,
            empty,
            producers: Mutex::new(producers),
            shutdown,
            seed_counter: AtomicU64::new(0),
            seed_base: (start_seed >> 32) as u32 ^ start_seed as u32,
        }
    }

    fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        let mut producers = self.producers.lock().unwrap();
        for handle in producers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

static FACTORY: OnceLock<Mutex<Option<Arc<Inner>>>> = OnceLock::new();

fn slot() -> &'static Mutex<Option<Arc<Inner>>> {
    FACTORY.get_or_init(|| Mutex::new(None))
}

/// A handle to the process-wide random number factory.
///
/// Cloning is cheap (it clones an `Arc`); every clone shares the same
/// producer threads and buffer queue.
#[derive(Clone)]
pub struct RandomFactory {
    inner: Arc<Inner>,
}

impl RandomFactory {
    /// Starts the process-wide factory with the given configuration. Fails
    /// if a factory is already active — matching §4.5's "exactly one
    /// factory per process" contract.
    pub fn init(config: FactoryConfig) -> GenevaResult<Self> {
        let mut guard = slot().lock().unwrap();
        if guard.is_some() {
            return Err(geneva_err!(
                Random: "a random factory is already active for this process"
            ));
        }
        let inner = Arc::new(Inner::start(config));
        *guard = Some(Arc::clone(&inner));
        Ok(Self { inner })
    }

    /// Returns the process-wide factory, lazily starting one with default
    /// configuration if none exists yet.
    pub fn global() -> Self {
        let mut guard = slot().lock().unwrap();
        if let Some(inner) = guard.as_ref() {
            return Self {
                inner: Arc::clone(inner),
            };
        }
        let inner = Arc::new(Inner::start(FactoryConfig::default()));
        *guard = Some(Arc::clone(&inner));
        Self { inner }
    }

    /// Tears the factory down, joining its producer threads. Exists for
    /// test isolation: a later call to [`RandomFactory::init`] or
    /// [`RandomFactory::global`] starts a fresh one.
    pub fn shutdown(&self) {
        let mut guard = slot().lock().unwrap();
        if let Some(active) = guard.as_ref() {
            if Arc::ptr_eq(active, &self.inner) {
                guard.take();
            }
        }
        drop(guard);
        self.inner.shutdown();
    }

    /// Hands out the next seed in the monotonically-distinct seed stream.
    /// Seeds differ for every call within a process's lifetime (the stream
    /// can wrap only after `u32::MAX` draws).
    pub fn next_seed(&self) -> u32 {
        let counter = self.inner.seed_counter.fetch_add(1, Ordering::Relaxed);
        (counter as u32) ^ self.inner.seed_base
    }

    pub(crate) fn get_buffer(&self) -> Option<Buffer> {
        self.inner.filled.pop_wait_timeout(GET_BUFFER_TIMEOUT)
    }

    pub(crate) fn return_buffer(&self, mut buffer: Buffer) {
        buffer.cursor = 0;
        let _ = self.inner.empty.try_push(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    // The factory is a process-wide singleton; cargo runs tests in the same
    // process on separate threads, so these tests serialize on a local lock
    // rather than fighting each other for the global slot.
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn seeds_are_pairwise_distinct() {
        let _serial = TEST_LOCK.lock().unwrap();
        let factory = RandomFactory::init(FactoryConfig {
            n_producer_threads: 1,
            start_seed: Some(42),
            ..Default::default()
        })
        .unwrap();

        let mut seen = HashSet::new();
        for _ in 0..100_000 {
            assert!(seen.insert(factory.next_seed()));
        }
        factory.shutdown();
    }

    #[test]
    fn second_init_is_rejected_while_one_is_active() {
        let _serial = TEST_LOCK.lock().unwrap();
        let factory = RandomFactory::init(FactoryConfig {
            start_seed: Some(7),
            ..Default::default()
        })
        .unwrap();

        let second = RandomFactory::init(FactoryConfig::default());
        assert!(second.is_err());
        factory.shutdown();
    }

    #[test]
    fn get_buffer_yields_usable_words() {
        let _serial = TEST_LOCK.lock().unwrap();
        let factory = RandomFactory::init(FactoryConfig {
            n_producer_threads: 1,
            buffer_size: 64,
            start_seed: Some(1),
            ..Default::default()
        })
        .unwrap();

        let mut buffer = factory.get_buffer().expect("buffer should arrive within timeout");
        let mut drew_any_nonzero = false;
        while let Some(word) = buffer.next_u32() {
            drew_any_nonzero |= word != 0;
        }
        assert!(drew_any_nonzero);
        factory.return_buffer(buffer);
        factory.shutdown();
    }
}
