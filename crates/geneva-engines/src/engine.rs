//! The minimal evolutionary-engine abstraction: an iterator-like `next()`
//! plus a `run`-until-predicate convenience (§4.7).

use geneva_error::GenevaResult;

/// One full pass of the parent-child base loop: `grow? -> recombine -> adapt
/// -> evaluate -> post -> select -> halt?`.
///
/// Implementors encapsulate the entire evolutionary step; the `Epoch` they
/// return is a lightweight report a caller can inspect without reaching into
/// engine internals.
pub trait Engine {
    type Epoch;

    /// Advances the engine by exactly one iteration of the base loop.
    fn next(&mut self) -> GenevaResult<Self::Epoch>;
}

/// Convenience methods for running an [`Engine`] under a termination
/// condition, without requiring changes to the core trait.
pub trait EngineExt<E: Engine> {
    /// Calls `next()` until `limit` returns true for the produced epoch, or
    /// `next()` itself errors. The final epoch (or error) is returned.
    fn run<F>(&mut self, limit: F) -> GenevaResult<E::Epoch>
    where
        F: Fn(&E::Epoch) -> bool;
}

impl<E: Engine> EngineExt<E> for E {
    fn run<F>(&mut self, limit: F) -> GenevaResult<E::Epoch>
    where
        F: Fn(&E::Epoch) -> bool,
    {
        loop {
            let epoch = self.next()?;
            if limit(&epoch) {
                return Ok(epoch);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        n: u32,
    }

    struct CounterEpoch {
        n: u32,
    }

    impl Engine for Counter {
        type Epoch = CounterEpoch;

        fn next(&mut self) -> GenevaResult<Self::Epoch> {
            self.n += 1;
            Ok(CounterEpoch { n: self.n })
        }
    }

    #[test]
    fn run_stops_at_predicate() {
        let mut counter = Counter::default();
        let epoch = counter.run(|e| e.n >= 5).unwrap();
        assert_eq!(epoch.n, 5);
    }
}
