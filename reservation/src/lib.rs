//! Bus seat reservation: routes, buses, users and tickets.
//!
//! The directory owns every route, bus and user. A [`SessionReducer`] drives
//! it from console commands, and the [`Console`] turns menu answers into
//! those commands. It demonstrates:
//!
//! - Seat bookkeeping with explicit results instead of silent failures
//! - Capacity limits enforced as policy ([`Limits`])
//! - Command/event handling through the reducer and store
//! - Testing with `ReducerTest`
//!
//! # Quick Start
//!
//! ```no_run
//! use bus_reservation::{
//!     Limits, ReservationDirectory, SeatSelection, SessionAction, SessionEnvironment,
//!     SessionReducer, SessionState, Password,
//! };
//! use bus_reservation_core::environment::SystemClock;
//! use bus_reservation_runtime::Store;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let directory = ReservationDirectory::seeded(Limits::default())?;
//! let env = SessionEnvironment::new(Arc::new(SystemClock));
//! let mut store = Store::new(SessionState::new(directory), SessionReducer::new(), env);
//!
//! store.send(SessionAction::Register {
//!     username: "alice".to_string(),
//!     password: Password::new("pw1"),
//! })?;
//! store.send(SessionAction::LogIn {
//!     username: "alice".to_string(),
//!     password: Password::new("pw1"),
//! })?;
//! store.send(SessionAction::BookTicket {
//!     selection: SeatSelection::new("R001", "B001", "5"),
//! })?;
//!
//! let booked = store.state(|s| s.last_ticket.clone());
//! println!("Booked: {booked:?}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod console;
pub mod directory;
pub mod error;
pub mod session;
pub mod types;

pub use config::{Config, ConfigError};
pub use console::{Console, ConsoleError, SessionStore};
pub use directory::{Limits, ReservationDirectory, SeatSelection};
pub use error::{ErrorKind, ReservationError, Result};
pub use session::{
    Password, Recorded, Session, SessionAction, SessionEnvironment, SessionEvent, SessionReducer,
    SessionState,
};
pub use types::{
    Bus, BusNumber, BusView, Fare, Route, RouteId, SeatNumber, Ticket, TicketId, TicketView, User,
    Username,
};
