//! Ergonomic testing utilities for reducers
//!
//! This module provides a fluent API for testing reducers with readable Given-When-Then syntax.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use bus_reservation_core::{effect::Effect, reducer::Reducer};

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for effect assertion functions
type EffectAssertion<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Fluent API for testing reducers with Given-When-Then syntax
///
/// # Example
///
/// ```ignore
/// use bus_reservation::{
///     Limits, Password, ReservationDirectory, SessionAction, SessionEnvironment, SessionReducer,
///     SessionState,
/// };
/// use bus_reservation_testing::{test_clock, ReducerTest};
/// use std::sync::Arc;
///
/// let mut directory = ReservationDirectory::seeded(Limits::default())?;
/// directory.register_user("alice", "pw1")?;
///
/// ReducerTest::new(SessionReducer::new())
///     .with_env(SessionEnvironment::new(Arc::new(test_clock())))
///     .given_state(SessionState::new(directory))
///     .when_action(SessionAction::LogIn {
///         username: "alice".to_string(),
///         password: Password::new("pw1"),
///     })
///     .then_state(|state| assert!(!state.is_logged_in()))
///     .then_effects(|effects| assert_eq!(effects.len(), 1))
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    initial_state: Option<S>,
    actions: Vec<A>,
    state_assertions: Vec<StateAssertion<S>>,
    effect_assertions: Vec<EffectAssertion<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            actions: Vec::new(),
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
        }
    }

    /// Set the environment for the test
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Add an action to reduce (When)
    ///
    /// Actions are reduced in the order they were added. Effect assertions
    /// only see the effects returned for the last action.
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.actions.push(action);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the resulting effects (Then)
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if initial state, action, or environment is not set,
    /// or if any assertions fail.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");

        assert!(
            !self.actions.is_empty(),
            "At least one action must be set with when_action()"
        );

        let env = self
            .environment
            .expect("Environment must be set with with_env()");

        let mut effects = Vec::new();
        for action in self.actions {
            effects = self.reducer.reduce(&mut state, action, &env).into_vec();
        }

        for assertion in self.state_assertions {
            assertion(&state);
        }

        for assertion in self.effect_assertions {
            assertion(&effects);
        }
    }
}

/// Helper assertions for effects
pub mod assertions {
    use bus_reservation_core::effect::Effect;

    /// Assert that there are no effects
    ///
    /// # Panics
    ///
    /// Panics if any effect would do something when executed.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Assert the number of effects
    ///
    /// # Panics
    ///
    /// Panics if the number of effects doesn't match expected.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(
            effects.len(),
            expected,
            "Expected {} effects, but found {}",
            expected,
            effects.len()
        );
    }

    /// Collect every action the effects feed back into the reducer, in execution order
    #[must_use]
    pub fn sent_actions<A>(effects: &[Effect<A>]) -> Vec<&A> {
        let mut sent = Vec::new();
        for effect in effects {
            match effect {
                Effect::None => {},
                Effect::Send(action) => sent.push(action.as_ref()),
            }
        }
        sent
    }

    /// Assert that the effects feed back exactly one action and return it
    ///
    /// # Panics
    ///
    /// Panics if zero or several actions are sent.
    #[allow(clippy::panic)] // Test assertion
    #[must_use]
    pub fn assert_single_send<A: std::fmt::Debug>(effects: &[Effect<A>]) -> &A {
        match sent_actions(effects).as_slice() {
            [action] => *action,
            other => panic!("Expected exactly one sent action, but found {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bus_reservation_core::{smallvec, SmallVec};

    #[derive(Clone, Debug, PartialEq)]
    struct TestState {
        free_seats: u32,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Reserve,
        Reserved,
        Release,
    }

    struct TestReducer;

    struct TestEnv;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = TestEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Reserve => smallvec![Effect::send(TestAction::Reserved)],
                TestAction::Reserved => {
                    state.free_seats -= 1;
                    smallvec![Effect::None]
                },
                TestAction::Release => {
                    state.free_seats += 1;
                    SmallVec::new()
                },
            }
        }
    }

    #[test]
    fn command_feeds_back_event() {
        ReducerTest::new(TestReducer)
            .with_env(TestEnv)
            .given_state(TestState { free_seats: 3 })
            .when_action(TestAction::Reserve)
            .then_state(|state| assert_eq!(state.free_seats, 3))
            .then_effects(|effects| {
                assert_eq!(assertions::assert_single_send(effects), &TestAction::Reserved);
            })
            .run();
    }

    #[test]
    fn actions_apply_in_order() {
        ReducerTest::new(TestReducer)
            .with_env(TestEnv)
            .given_state(TestState { free_seats: 3 })
            .when_action(TestAction::Reserved)
            .when_action(TestAction::Reserved)
            .when_action(TestAction::Release)
            .then_state(|state| assert_eq!(state.free_seats, 2))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn sent_actions_skip_no_ops() {
        let effects = vec![
            Effect::send(TestAction::Reserve),
            Effect::None,
            Effect::send(TestAction::Release),
        ];

        assert_eq!(
            assertions::sent_actions(&effects),
            vec![&TestAction::Reserve, &TestAction::Release]
        );
        assertions::assert_effects_count(&effects, 3);
    }
}
