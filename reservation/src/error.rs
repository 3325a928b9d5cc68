//! Error types for reservation operations.

use crate::types::{BusNumber, RouteId, SeatNumber, Username};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for reservation operations.
pub type Result<T> = std::result::Result<T, ReservationError>;

/// Broad failure categories, used to decide how a failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// A user, ticket, route or bus limit has been reached.
    CapacityExceeded,
    /// A user, route or bus lookup missed.
    NotFound,
    /// An out-of-range or malformed selection.
    InvalidInput,
    /// The seat is not in the state the operation requires.
    OperationFailed,
    /// Username and password did not match a registered user.
    AuthenticationFailed,
}

/// Every way a reservation operation can fail.
///
/// None of these are fatal: callers report them and carry on.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationError {
    // ═══════════════════════════════════════════════════════════
    // Capacity
    // ═══════════════════════════════════════════════════════════

    /// The directory already holds the maximum number of users.
    #[error("User limit reached.")]
    UserLimitReached {
        /// Configured user limit
        limit: usize,
    },

    /// The user already holds the maximum number of tickets.
    #[error("Ticket limit reached.")]
    TicketLimitReached {
        /// Configured ticket limit
        limit: usize,
    },

    /// The directory already holds the maximum number of routes.
    #[error("Route limit reached.")]
    RouteLimitReached {
        /// Configured route limit
        limit: usize,
    },

    /// The directory already holds the maximum number of buses.
    #[error("Bus limit reached.")]
    BusLimitReached {
        /// Configured bus limit
        limit: usize,
    },

    // ═══════════════════════════════════════════════════════════
    // Lookups
    // ═══════════════════════════════════════════════════════════

    /// No user is registered under this name.
    #[error("User {username} not found.")]
    UserNotFound {
        /// The name that was looked up
        username: Username,
    },

    /// No route carries this identifier.
    #[error("Route {route} not found.")]
    RouteNotFound {
        /// The route that was looked up
        route: RouteId,
    },

    // ═══════════════════════════════════════════════════════════
    // Input validation
    // ═══════════════════════════════════════════════════════════

    /// The route identifier entered while booking matches no route.
    #[error("Invalid route number.")]
    InvalidRouteNumber {
        /// Raw input
        input: String,
    },

    /// A 1-based route position outside the route list.
    #[error("Invalid route selected.")]
    InvalidRouteSelection {
        /// The requested position
        ordinal: usize,
        /// Number of routes available
        count: usize,
    },

    /// The bus identifier is unknown or belongs to another route.
    #[error("Invalid bus number.")]
    InvalidBusNumber {
        /// Raw input
        input: String,
    },

    /// The seat is non-numeric or outside the bus's seat range.
    #[error("Invalid seat number.")]
    InvalidSeatNumber {
        /// Raw input
        input: String,
    },

    /// A 1-based ticket position outside the user's ticket list.
    #[error("Invalid ticket index.")]
    InvalidTicketIndex {
        /// Raw input
        input: String,
    },

    /// A bus must hold between 1 and 100 seats.
    #[error("Invalid seat capacity {seats}: a bus holds 1 to 100 seats.")]
    InvalidSeatCapacity {
        /// Requested seat count
        seats: usize,
    },

    /// Another user is already registered under this name.
    #[error("Username {username} is already taken.")]
    UsernameTaken {
        /// The contested name
        username: Username,
    },

    /// A route with this identifier already exists.
    #[error("Route {route} already exists.")]
    DuplicateRoute {
        /// The contested identifier
        route: RouteId,
    },

    /// A bus with this number already exists.
    #[error("Bus {bus} already exists.")]
    DuplicateBus {
        /// The contested number
        bus: BusNumber,
    },

    // ═══════════════════════════════════════════════════════════
    // Seat state
    // ═══════════════════════════════════════════════════════════

    /// The seat is already reserved.
    #[error("Seat booking failed. The seat is already reserved or does not exist.")]
    SeatUnavailable {
        /// Bus carrying the seat
        bus: BusNumber,
        /// The seat
        seat: SeatNumber,
    },

    /// The seat is free, so there is nothing to cancel.
    #[error("Seat {seat} on bus {bus} is not reserved.")]
    SeatNotReserved {
        /// Bus carrying the seat
        bus: BusNumber,
        /// The seat
        seat: SeatNumber,
    },

    // ═══════════════════════════════════════════════════════════
    // Session
    // ═══════════════════════════════════════════════════════════

    /// Username and password did not match.
    #[error("Authentication failed.")]
    AuthenticationFailed,

    /// The operation needs a logged-in user.
    #[error("Please log in first.")]
    NotLoggedIn,

    /// Log in was attempted while a user is logged in.
    #[error("Already logged in as {username}.")]
    AlreadyLoggedIn {
        /// The user currently logged in
        username: Username,
    },
}

impl ReservationError {
    /// The broad category this failure belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UserLimitReached { .. }
            | Self::TicketLimitReached { .. }
            | Self::RouteLimitReached { .. }
            | Self::BusLimitReached { .. } => ErrorKind::CapacityExceeded,
            Self::UserNotFound { .. } | Self::RouteNotFound { .. } => ErrorKind::NotFound,
            Self::InvalidRouteNumber { .. }
            | Self::InvalidRouteSelection { .. }
            | Self::InvalidBusNumber { .. }
            | Self::InvalidSeatNumber { .. }
            | Self::InvalidTicketIndex { .. }
            | Self::InvalidSeatCapacity { .. }
            | Self::UsernameTaken { .. }
            | Self::DuplicateRoute { .. }
            | Self::DuplicateBus { .. }
            | Self::NotLoggedIn
            | Self::AlreadyLoggedIn { .. } => ErrorKind::InvalidInput,
            Self::SeatUnavailable { .. } | Self::SeatNotReserved { .. } => {
                ErrorKind::OperationFailed
            },
            Self::AuthenticationFailed => ErrorKind::AuthenticationFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_console_wording() {
        let err = ReservationError::SeatUnavailable {
            bus: BusNumber::new("B001"),
            seat: SeatNumber::new(5),
        };
        assert_eq!(
            err.to_string(),
            "Seat booking failed. The seat is already reserved or does not exist."
        );
        assert_eq!(
            ReservationError::InvalidRouteNumber { input: "R999".into() }.to_string(),
            "Invalid route number."
        );
    }

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            ReservationError::UserLimitReached { limit: 100 }.kind(),
            ErrorKind::CapacityExceeded
        );
        assert_eq!(
            ReservationError::UserNotFound { username: Username::new("ghost") }.kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            ReservationError::InvalidSeatNumber { input: "abc".into() }.kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            ReservationError::SeatNotReserved {
                bus: BusNumber::new("B002"),
                seat: SeatNumber::new(1),
            }
            .kind(),
            ErrorKind::OperationFailed
        );
        assert_eq!(
            ReservationError::AuthenticationFailed.kind(),
            ErrorKind::AuthenticationFailed
        );
    }
}
