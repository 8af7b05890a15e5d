//! Low-level concurrency primitives shared by the random layer and the
//! engine's worker pool: a bounded thread-safe queue and a fixed-size thread
//! pool built on top of it.

pub mod queue;
pub mod thread_pool;
