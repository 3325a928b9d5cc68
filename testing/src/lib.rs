//! # Bus Reservation Testing
//!
//! Testing utilities and helpers for the bus reservation reducers.
//!
//! This crate provides:
//! - A deterministic `Clock` for stamping tickets
//! - `ReducerTest`, a Given-When-Then builder for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use bus_reservation::{
//!     Limits, ReservationDirectory, SessionAction, SessionEnvironment, SessionReducer,
//!     SessionState,
//! };
//! use bus_reservation_testing::{assertions, test_clock, ReducerTest};
//! use std::sync::Arc;
//!
//! let directory = ReservationDirectory::seeded(Limits::default())?;
//!
//! ReducerTest::new(SessionReducer::new())
//!     .with_env(SessionEnvironment::new(Arc::new(test_clock())))
//!     .given_state(SessionState::new(directory))
//!     .when_action(SessionAction::LogOut)
//!     .then_state(|state| assert!(!state.is_logged_in()))
//!     .then_effects(|effects| assert!(assertions::assert_single_send(effects).is_event()))
//!     .run();
//! ```

use bus_reservation_core::environment::Clock;
use chrono::{DateTime, Utc};

pub mod reducer_test;

pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use bus_reservation_testing::mocks::FixedClock;
    /// use bus_reservation_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

pub use mocks::{test_clock, FixedClock};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_frozen_at_new_year() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }
}
