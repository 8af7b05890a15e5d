//! Per-consumer view onto the random factory's buffer stream.
//!
//! A proxy holds at most one buffer at a time and implements [`RngCore`] so
//! any `rand`/`rand_distr` distribution — and the bi-normal in
//! [`super::distributions`] — can sample through it directly. Proxies are
//! meant to be thread-local: every worker thread that needs randomness owns
//! its own proxy (§5).

use super::factory::{Buffer, RandomFactory};
use rand_core::RngCore;

pub struct RandomProxy {
    factory: RandomFactory,
    buffer: Option<Buffer>,
}

impl RandomProxy {
    pub fn new(factory: RandomFactory) -> Self {
        Self {
            factory,
            buffer: None,
        }
    }

    /// Creates a proxy against the process-wide factory, starting it with
    /// defaults if necessary.
    pub fn from_global() -> Self {
        Self::new(RandomFactory::global())
    }

    fn pull_word(&mut self) -> u32 {
        loop {
            if let Some(buffer) = self.buffer.as_mut() {
                if let Some(word) = buffer.next_u32() {
                    return word;
                }
                let exhausted = self.buffer.take().unwrap();
                self.factory.return_buffer(exhausted);
            }

            // get_buffer() itself applies a bounded internal timeout; a
            // caller that needs a hard ceiling on total wait time should
            // not park a proxy on a factory with no live producer threads.
            if let Some(fresh) = self.factory.get_buffer() {
                self.buffer = Some(fresh);
            }
        }
    }
}

impl RngCore for RandomProxy {
    fn next_u32(&mut self) -> u32 {
        self.pull_word()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.pull_word() as u64;
        let lo = self.pull_word() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        let mut chunks = dst.chunks_exact_mut(4);
        for chunk in &mut chunks {
            chunk.copy_from_slice(&self.pull_word().to_le_bytes());
        }
        let remainder = chunks.into_remainder();
        if !remainder.is_empty() {
            let word = self.pull_word().to_le_bytes();
            remainder.copy_from_slice(&word[..remainder.len()]);
        }
    }
}

impl Drop for RandomProxy {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.factory.return_buffer(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::factory::FactoryConfig;
    use rand::Rng;
    use std::sync::Mutex;

    static TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn proxy_yields_values_across_buffer_boundaries() {
        let _serial = TEST_LOCK.lock().unwrap();
        let factory = RandomFactory::init(FactoryConfig {
            n_producer_threads: 1,
            buffer_size: 8,
            start_seed: Some(99),
            ..Default::default()
        })
        .unwrap();

        let mut proxy = RandomProxy::new(factory.clone());
        let mut values = Vec::new();
        for _ in 0..64 {
            values.push(proxy.next_u32());
        }
        assert!(values.iter().any(|&v| v != values[0]));
        drop(proxy);
        factory.shutdown();
    }

    #[test]
    fn proxy_supports_rand_distributions() {
        let _serial = TEST_LOCK.lock().unwrap();
        let factory = RandomFactory::init(FactoryConfig {
            n_producer_threads: 1,
            start_seed: Some(5),
            ..Default::default()
        })
        .unwrap();

        let mut proxy = RandomProxy::new(factory.clone());
        for _ in 0..100 {
            let v: f64 = proxy.random_range(0.0..1.0);
            assert!((0.0..1.0).contains(&v));
        }
        factory.shutdown();
    }
}
