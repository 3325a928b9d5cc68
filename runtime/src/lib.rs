//! # Bus Reservation Runtime
//!
//! The Store runtime that coordinates reducer execution and effect handling.
//!
//! Every action sent to a [`Store`] is reduced under exclusive access to the
//! state, and any `Effect::Send` the reducer returns is reduced before
//! `send` returns. Because the store is the only writer, the seat
//! test-and-set performed while booking can never interleave with another
//! booking on the same bus.
//!
//! ## Example
//!
//! ```ignore
//! use bus_reservation_runtime::Store;
//!
//! let mut store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething)?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field);
//! ```

use bus_reservation_core::{effect::Effect, reducer::Reducer};

/// Upper bound on actions reduced for a single [`Store::send`] call.
pub const MAX_ACTIONS_PER_SEND: usize = 64;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Effects kept feeding actions back past the configured bound
        ///
        /// The state reflects every action reduced before the limit was hit.
        #[error("Effect feedback exceeded {limit} actions for a single send")]
        FeedbackLimit {
            /// The bound that was exceeded
            limit: usize,
        },
    }
}

pub use error::StoreError;

/// The Store - runtime for reducers
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer implementation
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: S,
    reducer: R,
    environment: E,
    max_actions: usize,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
    A: std::fmt::Debug,
{
    /// Create a new store with initial state, reducer, and environment
    #[must_use]
    pub const fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self {
            state: initial_state,
            reducer,
            environment,
            max_actions: MAX_ACTIONS_PER_SEND,
        }
    }

    /// Send an action and run the resulting effects to completion
    ///
    /// Effects run depth-first in the order the reducer returned them: an
    /// action fed back through `Effect::Send` has its own effects executed
    /// before the next sibling effect.
    ///
    /// Returns the number of actions reduced, including `action` itself.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::FeedbackLimit`] if more than the configured
    /// number of actions would be reduced for this call.
    #[tracing::instrument(skip(self), name = "store_send")]
    pub fn send(&mut self, action: A) -> Result<usize, StoreError> {
        tracing::debug!("Processing action");

        let mut processed = 0;
        let mut pending = vec![Effect::send(action)];

        while let Some(effect) = pending.pop() {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                },
                Effect::Send(action) => {
                    if processed == self.max_actions {
                        tracing::warn!(limit = self.max_actions, "Effect feedback limit reached");
                        return Err(StoreError::FeedbackLimit {
                            limit: self.max_actions,
                        });
                    }
                    processed += 1;

                    let span = tracing::debug_span!("reducer_execution");
                    let _enter = span.enter();
                    let effects = self
                        .reducer
                        .reduce(&mut self.state, *action, &self.environment);
                    tracing::trace!("Reducer completed, returned {} effects", effects.len());

                    pending.extend(effects.into_iter().rev());
                },
            }
        }

        tracing::debug!(actions = processed, "Action processing completed");
        Ok(processed)
    }

    /// Read current state via a closure
    ///
    /// ```ignore
    /// let route_count = store.state(|s| s.directory.routes().len());
    /// ```
    pub fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        f(&self.state)
    }

    /// Consume the store and return its state
    #[must_use]
    pub fn into_state(self) -> S {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bus_reservation_core::{smallvec, SmallVec};
    use proptest::prelude::*;

    #[derive(Debug, Default)]
    struct LogState {
        log: Vec<&'static str>,
        countdown_hits: u32,
    }

    #[derive(Debug, Clone)]
    enum LogAction {
        Record(&'static str),
        Fanout,
        Countdown(u32),
        Forever,
    }

    struct LogReducer;

    impl Reducer for LogReducer {
        type State = LogState;
        type Action = LogAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut LogState,
            action: LogAction,
            _env: &(),
        ) -> SmallVec<[Effect<LogAction>; 4]> {
            match action {
                LogAction::Record(entry) => {
                    state.log.push(entry);
                    SmallVec::new()
                },
                LogAction::Fanout => smallvec![
                    Effect::send(LogAction::Record("first")),
                    Effect::None,
                    Effect::send(LogAction::Record("second")),
                    Effect::send(LogAction::Record("third")),
                ],
                LogAction::Countdown(0) => SmallVec::new(),
                LogAction::Countdown(n) => {
                    state.countdown_hits += 1;
                    smallvec![Effect::send(LogAction::Countdown(n - 1))]
                },
                LogAction::Forever => smallvec![Effect::send(LogAction::Forever)],
            }
        }
    }

    #[test]
    fn effects_run_in_order() {
        let mut store = Store::new(LogState::default(), LogReducer, ());

        let processed = store.send(LogAction::Fanout);

        assert_eq!(processed, Ok(4));
        assert_eq!(store.state(|s| s.log.clone()), vec!["first", "second", "third"]);
    }

    #[test]
    fn runaway_feedback_is_bounded() {
        let mut store = Store::new(LogState::default(), LogReducer, ());
        store.max_actions = 8;

        let result = store.send(LogAction::Forever);

        assert_eq!(result, Err(StoreError::FeedbackLimit { limit: 8 }));
    }

    proptest! {
        #[test]
        fn countdown_reduces_every_step(n in 0_u32..40) {
            let mut store = Store::new(LogState::default(), LogReducer, ());

            let processed = store.send(LogAction::Countdown(n));

            prop_assert_eq!(processed, Ok(n as usize + 1));
            prop_assert_eq!(store.into_state().countdown_hits, n);
        }
    }
}
