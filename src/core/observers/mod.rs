// Copyright 2019-2024 linprog developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Observers
//!
//! The driver can report its progress after initialization and after every iteration.
//! This interface can be used to implement loggers or to send metrics to a storage.
//!
//! The observer [`SlogLogger`](`crate::core::observers::SlogLogger`) logs progress to
//! the terminal and requires the `slog-logger` feature.
//!
//! For each observer it can be defined how often it is called, via the
//! [`ObserverMode`] enum (`Always`, `Never`, or `Every(i)` for every `i`th iteration).
//!
//! Custom observers can be used as well by implementing the [`Observe`] trait.

#[cfg(feature = "slog-logger")]
pub mod slog_logger;

#[cfg(feature = "slog-logger")]
pub use slog_logger::SlogLogger;

use crate::core::{Error, LpFloat, SolveState, KV};
use std::default::Default;
use std::sync::{Arc, Mutex};

/// An interface which every observer is required to implement
///
/// # Example
///
/// ```
/// use linprog::core::observers::Observe;
/// use linprog::core::{Error, SolveState, KV};
///
/// struct MyObserver {}
///
/// impl<F: linprog::core::LpFloat> Observe<F> for MyObserver {
///     fn observe_init(&mut self, name: &str, kv: &KV) -> Result<(), Error> {
///         // Executed once before the iteration loop starts
///         Ok(())
///     }
///
///     fn observe_iter(&mut self, state: &SolveState<F>, kv: &KV) -> Result<(), Error> {
///         // Executed after each iteration
///         Ok(())
///     }
/// }
/// ```
pub trait Observe<F> {
    /// Called once after initialization of the solver.
    fn observe_init(&mut self, _name: &str, _kv: &KV) -> Result<(), Error> {
        Ok(())
    }

    /// Called at every iteration of the solver.
    fn observe_iter(&mut self, _state: &SolveState<F>, _kv: &KV) -> Result<(), Error> {
        Ok(())
    }
}

type ObserversVec<F> = Vec<(Arc<Mutex<dyn Observe<F> + Send>>, ObserverMode)>;

/// Container for observers.
///
/// This type also implements [`Observe`] and therefore can be used like a single
/// observer. Each observer has an [`ObserverMode`] attached which indicates when the
/// observer will be called.
#[derive(Clone, Default)]
pub struct Observers<F> {
    /// Vector of `Observe`rs with the corresponding `ObserverMode`
    observers: ObserversVec<F>,
}

impl<F> Observers<F>
where
    F: LpFloat,
{
    /// Construct a new empty `Observers` instance.
    pub fn new() -> Self {
        Observers { observers: vec![] }
    }

    /// Add another observer with a corresponding [`ObserverMode`].
    pub fn push<OBS: Observe<F> + Send + 'static>(
        &mut self,
        observer: OBS,
        mode: ObserverMode,
    ) -> &mut Self {
        self.observers.push((Arc::new(Mutex::new(observer)), mode));
        self
    }

    /// Returns true if there are no observers stored.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl<F: LpFloat> Observe<F> for Observers<F> {
    /// After initialization of the solver, this loops over all stored observers and
    /// calls them.
    fn observe_init(&mut self, name: &str, kv: &KV) -> Result<(), Error> {
        for l in self.observers.iter() {
            l.0.lock().unwrap().observe_init(name, kv)?
        }
        Ok(())
    }

    /// Called after each iteration.
    ///
    /// Loops over all observers, and based on whether the condition for calling the
    /// observers are met, calls them.
    fn observe_iter(&mut self, state: &SolveState<F>, kv: &KV) -> Result<(), Error> {
        for l in self.observers.iter_mut() {
            let iter = state.get_iter();
            let observer = &mut l.0.lock().unwrap();
            match l.1 {
                ObserverMode::Always => observer.observe_iter(state, kv),
                ObserverMode::Every(i) if iter % i == 0 => observer.observe_iter(state, kv),
                ObserverMode::Never | ObserverMode::Every(_) => Ok(()),
            }?
        }
        Ok(())
    }
}

/// Indicates when to call an observer.
///
/// `Always` calls the observer in every iteration, `Every(X)` calls the observer
/// every X iterations and `Never` deactivates the observer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ObserverMode {
    /// Never call the observer
    Never,
    /// Call observer in every iteration
    Always,
    /// Call observer every N iterations
    Every(u64),
}

impl Default for ObserverMode {
    /// The default for `ObserverMode` is `Always`
    fn default() -> ObserverMode {
        ObserverMode::Always
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    send_sync_test!(observermode, ObserverMode);

    #[test]
    fn test_observers() {
        struct TestStor {
            pub solver_name: String,
            pub init_called: usize,
            pub iter_called: usize,
        }

        impl TestStor {
            fn new() -> Arc<Mutex<TestStor>> {
                Arc::new(Mutex::new(TestStor {
                    solver_name: String::new(),
                    init_called: 0,
                    iter_called: 0,
                }))
            }
        }

        struct TestObs {
            data: Arc<Mutex<TestStor>>,
        }

        impl<F: LpFloat> Observe<F> for TestObs {
            fn observe_init(&mut self, name: &str, _kv: &KV) -> Result<(), Error> {
                self.data.lock().unwrap().solver_name = name.into();
                self.data.lock().unwrap().init_called += 1;
                Ok(())
            }

            fn observe_iter(&mut self, _state: &SolveState<F>, _kv: &KV) -> Result<(), Error> {
                self.data.lock().unwrap().iter_called += 1;
                Ok(())
            }
        }

        let test_stor_1 = TestStor::new();
        let test_obs_1 = TestObs {
            data: test_stor_1.clone(),
        };

        let test_stor_2 = TestStor::new();
        let test_obs_2 = TestObs {
            data: test_stor_2.clone(),
        };

        let test_stor_3 = TestStor::new();
        let test_obs_3 = TestObs {
            data: test_stor_3.clone(),
        };

        let storages = [test_stor_1, test_stor_2, test_stor_3];

        let mut obs: Observers<f64> = Observers::new();
        obs.push(test_obs_1, ObserverMode::Never)
            .push(test_obs_2, ObserverMode::Always)
            .push(test_obs_3, ObserverMode::Every(3));

        obs.observe_init("simplex", &make_kv!()).unwrap();

        // all `init_called` should be 1, all `iter_called` 0
        for s in storages.iter() {
            let observer = s.lock().unwrap();
            assert_eq!(observer.solver_name, "simplex");
            assert_eq!(observer.init_called, 1);
            assert_eq!(observer.iter_called, 0);
        }

        let mut state: SolveState<f64> = SolveState::new();
        obs.observe_iter(&state, &make_kv!()).unwrap();

        assert_eq!(storages[0].lock().unwrap().iter_called, 0);
        assert_eq!(storages[1].lock().unwrap().iter_called, 1);
        // iter 0: 0 % 3 == 0, observer called
        assert_eq!(storages[2].lock().unwrap().iter_called, 1);

        state.increment_iter();
        obs.observe_iter(&state, &make_kv!()).unwrap();

        assert_eq!(storages[0].lock().unwrap().iter_called, 0);
        assert_eq!(storages[1].lock().unwrap().iter_called, 2);
        assert_eq!(storages[2].lock().unwrap().iter_called, 1);

        state.increment_iter();
        state.increment_iter();
        obs.observe_iter(&state, &make_kv!()).unwrap();

        assert_eq!(storages[0].lock().unwrap().iter_called, 0);
        assert_eq!(storages[1].lock().unwrap().iter_called, 3);
        assert_eq!(storages[2].lock().unwrap().iter_called, 2);
    }
}
