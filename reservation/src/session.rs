//! Session reducer: the menu state machine over a [`ReservationDirectory`].
//!
//! Each command runs its directory operation and feeds back exactly one
//! [`Recorded`] event, either the success event or
//! [`SessionEvent::CommandFailed`]. Only the reducer builds a `Recorded`, and
//! the state accepts it only while that command is in flight, so a session
//! is opened only by a successful log in. Events only touch session
//! bookkeeping, so a caller can read `last_error` and `last_ticket` as soon
//! as [`Store::send`] returns.
//!
//! [`Store::send`]: bus_reservation_runtime::Store::send

use crate::directory::{ReservationDirectory, SeatSelection};
use crate::error::ReservationError;
use crate::types::{Ticket, Username};
use bus_reservation_core::{
    effect::Effect, environment::Clock, reducer::Reducer, smallvec, SmallVec,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Number of events kept in [`SessionState::journal`]
pub const JOURNAL_CAPACITY: usize = 32;

/// Password as typed at a prompt; never printed by `Debug`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Password(String);

impl Password {
    /// Wraps a typed password
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// The cleartext password
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Who, if anyone, is at the console
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Session {
    /// Nobody is logged in
    #[default]
    LoggedOut,
    /// A user has authenticated
    LoggedIn {
        /// The authenticated user
        username: Username,
    },
}

/// State owned by the store: the directory plus the console session
#[derive(Clone, Debug)]
pub struct SessionState {
    /// All users, routes and buses
    pub directory: ReservationDirectory,
    /// Current session
    pub session: Session,
    /// Failure reported by the most recent command, if it failed
    pub last_error: Option<ReservationError>,
    /// Ticket from the most recent booking or cancellation
    pub last_ticket: Option<Ticket>,
    journal: VecDeque<SessionEvent>,
    issued: u64,
    awaiting: Option<u64>,
}

impl SessionState {
    /// Starts logged out over `directory`
    #[must_use]
    pub fn new(directory: ReservationDirectory) -> Self {
        Self {
            directory,
            session: Session::LoggedOut,
            last_error: None,
            last_ticket: None,
            journal: VecDeque::with_capacity(JOURNAL_CAPACITY),
            issued: 0,
            awaiting: None,
        }
    }

    /// The logged-in user, if any
    #[must_use]
    pub const fn current_user(&self) -> Option<&Username> {
        match &self.session {
            Session::LoggedIn { username } => Some(username),
            Session::LoggedOut => None,
        }
    }

    /// Whether a user is logged in
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        matches!(self.session, Session::LoggedIn { .. })
    }

    /// The most recent events, oldest first
    pub fn journal(&self) -> impl Iterator<Item = &SessionEvent> {
        self.journal.iter()
    }

    /// Seals `event` as the outcome of the command being reduced
    fn issue(&mut self, event: SessionEvent) -> Recorded {
        self.issued += 1;
        self.awaiting = Some(self.issued);
        Recorded {
            sequence: self.issued,
            event,
        }
    }

    /// Takes back an issued event; `None` if it was not the one awaited
    fn accept(&mut self, recorded: Recorded) -> Option<SessionEvent> {
        if self.awaiting != Some(recorded.sequence) {
            return None;
        }
        self.awaiting = None;
        Some(recorded.event)
    }

    fn record(&mut self, event: SessionEvent) {
        if self.journal.len() == JOURNAL_CAPACITY {
            self.journal.pop_front();
        }
        self.journal.push_back(event);
    }
}

/// Outcome of a session command
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// An account was created
    UserRegistered {
        /// The new user
        username: Username,
    },
    /// A user authenticated
    LoggedIn {
        /// The authenticated user
        username: Username,
    },
    /// The session ended
    LoggedOut {
        /// The user who left
        username: Username,
    },
    /// A seat was reserved and the ticket attached to its passenger
    TicketBooked {
        /// The new ticket
        ticket: Ticket,
    },
    /// A ticket was retracted and its seat freed
    TicketCancelled {
        /// The retracted ticket
        ticket: Ticket,
    },
    /// A command was rejected
    CommandFailed {
        /// Why
        error: ReservationError,
    },
}

/// An event produced by [`SessionReducer`] for the command it just ran
///
/// Only the reducer can construct one, and a state applies it only while
/// the command that produced it is being reduced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Recorded {
    sequence: u64,
    event: SessionEvent,
}

impl Recorded {
    /// The event
    #[must_use]
    pub const fn event(&self) -> &SessionEvent {
        &self.event
    }
}

/// Commands issued by the console and the events fed back for them
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionAction {
    // Commands
    /// Command: create an account
    Register {
        /// Requested username
        username: String,
        /// Chosen password
        password: Password,
    },
    /// Command: authenticate
    LogIn {
        /// Username
        username: String,
        /// Password
        password: Password,
    },
    /// Command: end the session
    LogOut,
    /// Command: book a seat for the logged-in user
    BookTicket {
        /// Raw route, bus and seat answers
        selection: SeatSelection,
    },
    /// Command: cancel one of the logged-in user's tickets
    CancelTicket {
        /// 1-based position in the user's ticket list
        index: usize,
    },

    // Events
    /// Event fed back by the reducer
    #[serde(skip_deserializing)]
    Event(Recorded),
}

impl SessionAction {
    /// Check if this action is a command
    #[must_use]
    pub const fn is_command(&self) -> bool {
        !self.is_event()
    }

    /// Check if this action is an event
    #[must_use]
    pub const fn is_event(&self) -> bool {
        matches!(self, Self::Event(_))
    }

    /// The event carried by this action, if it is one
    #[must_use]
    pub const fn event(&self) -> Option<&SessionEvent> {
        match self {
            Self::Event(recorded) => Some(recorded.event()),
            _ => None,
        }
    }
}

/// Environment dependencies for the session reducer
#[derive(Clone)]
pub struct SessionEnvironment {
    /// Clock used to stamp tickets
    pub clock: Arc<dyn Clock>,
}

impl SessionEnvironment {
    /// Creates a new `SessionEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

/// Reducer driving the console session
#[derive(Clone, Debug, Default)]
pub struct SessionReducer;

impl SessionReducer {
    /// Creates a new `SessionReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn logged_in(state: &SessionState) -> Result<Username, ReservationError> {
        state
            .current_user()
            .cloned()
            .ok_or(ReservationError::NotLoggedIn)
    }

    /// Runs a command against the directory, producing its event
    fn handle_command(
        state: &mut SessionState,
        command: SessionAction,
        env: &SessionEnvironment,
    ) -> Result<SessionEvent, ReservationError> {
        match command {
            SessionAction::Register { username, password } => {
                let user = state
                    .directory
                    .register_user(&username, password.expose())?;
                Ok(SessionEvent::UserRegistered {
                    username: user.username().clone(),
                })
            },
            SessionAction::LogIn { username, password } => {
                if let Some(current) = state.current_user() {
                    return Err(ReservationError::AlreadyLoggedIn {
                        username: current.clone(),
                    });
                }
                let user = state
                    .directory
                    .authenticate_user(&username, password.expose())?;
                Ok(SessionEvent::LoggedIn {
                    username: user.username().clone(),
                })
            },
            SessionAction::LogOut => {
                let username = Self::logged_in(state)?;
                Ok(SessionEvent::LoggedOut { username })
            },
            SessionAction::BookTicket { selection } => {
                let username = Self::logged_in(state)?;
                let ticket = state.directory.book_ticket(
                    username.as_str(),
                    &selection,
                    env.clock.now(),
                )?;
                Ok(SessionEvent::TicketBooked { ticket })
            },
            SessionAction::CancelTicket { index } => {
                let username = Self::logged_in(state)?;
                let ticket = state.directory.cancel_ticket(username.as_str(), index)?;
                Ok(SessionEvent::TicketCancelled { ticket })
            },
            SessionAction::Event(recorded) => Ok(recorded.event),
        }
    }

    /// Applies an event to session bookkeeping
    fn apply_event(state: &mut SessionState, event: &SessionEvent) {
        match event {
            SessionEvent::UserRegistered { .. } => {
                state.last_error = None;
            },
            SessionEvent::LoggedIn { username } => {
                tracing::info!(%username, "Logged in");
                state.session = Session::LoggedIn {
                    username: username.clone(),
                };
                state.last_error = None;
            },
            SessionEvent::LoggedOut { username } => {
                tracing::info!(%username, "Logged out");
                state.session = Session::LoggedOut;
                state.last_ticket = None;
                state.last_error = None;
            },
            SessionEvent::TicketBooked { ticket } | SessionEvent::TicketCancelled { ticket } => {
                state.last_ticket = Some(ticket.clone());
                state.last_error = None;
            },
            SessionEvent::CommandFailed { error } => {
                tracing::warn!(kind = ?error.kind(), %error, "Command rejected");
                state.last_error = Some(error.clone());
            },
        }
    }
}

impl Reducer for SessionReducer {
    type State = SessionState;
    type Action = SessionAction;
    type Environment = SessionEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        if let SessionAction::Event(recorded) = action {
            match state.accept(recorded) {
                Some(event) => {
                    Self::apply_event(state, &event);
                    state.record(event);
                },
                None => tracing::warn!("Ignoring event that no pending command produced"),
            }
            return SmallVec::new();
        }

        let event = Self::handle_command(state, action, env)
            .unwrap_or_else(|error| SessionEvent::CommandFailed { error });
        let recorded = state.issue(event);
        smallvec![Effect::send(SessionAction::Event(recorded))]
    }
}
