//! # Bus Reservation Core
//!
//! Core traits and types for the bus reservation system.
//!
//! The booking workflow is modelled with the Reducer pattern:
//!
//! - **State**: Domain state for a feature (the reservation directory plus session)
//! - **Action**: All possible inputs to a reducer (commands and the events they produce)
//! - **Reducer**: Function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Follow-up work described as a value, executed by the runtime
//! - **Environment**: Injected dependencies (the clock used to stamp tickets)
//!
//! ## Example
//!
//! ```
//! use bus_reservation_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Default)]
//! struct SeatCounter {
//!     reserved: u32,
//! }
//!
//! enum SeatAction {
//!     Reserve,
//!     Reserved,
//! }
//!
//! struct SeatCounterReducer;
//!
//! impl Reducer for SeatCounterReducer {
//!     type State = SeatCounter;
//!     type Action = SeatAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut SeatCounter,
//!         action: SeatAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<SeatAction>; 4]> {
//!         match action {
//!             SeatAction::Reserve => smallvec![Effect::send(SeatAction::Reserved)],
//!             SeatAction::Reserved => {
//!                 state.reserved += 1;
//!                 SmallVec::new()
//!             }
//!         }
//!     }
//! }
//! ```

pub use chrono::{DateTime, Utc};
pub use smallvec::{smallvec, SmallVec};

/// Reducer module - The core trait for business logic
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// Validates the action, updates state in place and returns the
        /// effects the runtime should execute afterwards.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects are values returned from reducers. They are NOT executed by the
/// reducer; the Store runtime interprets them after the reducer returns.
pub mod effect {
    /// Effect type - describes follow-up work to be executed by the runtime
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Feed an action back into the reducer
        Send(Box<Action>),
    }

    impl<Action> Effect<Action> {
        /// Feed `action` back into the reducer once the current reduction completes
        #[must_use]
        pub fn send(action: Action) -> Self {
            Self::Send(Box::new(action))
        }

        /// Returns true if this effect does nothing when executed
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Self::None)
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use bus_reservation_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let booked_at = clock.now();
    /// assert!(booked_at <= clock.now());
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
