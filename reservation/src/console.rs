//! Interactive console over any `BufRead` input and `Write` output.
//!
//! Input is read as whitespace-separated tokens that may span lines, so a
//! script like `"2\nalice pw1\n"` answers three prompts. Output is plain
//! line-oriented text; diagnostics go through `tracing`, never to `output`.

use crate::directory::{ReservationDirectory, SeatSelection};
use crate::error::ReservationError;
use crate::session::{Password, SessionAction, SessionEnvironment, SessionReducer, SessionState};
use bus_reservation_runtime::{Store, StoreError};
use std::collections::VecDeque;
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Store type driven by the console
pub type SessionStore = Store<SessionState, SessionAction, SessionEnvironment, SessionReducer>;

/// Failures that end a console run
///
/// Reservation failures are never among them; those are printed and the
/// menu loop continues.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Reading input or writing output failed
    #[error("console I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The store refused to process an action
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Whitespace-delimited tokens across input lines
struct Tokens<R> {
    reader: R,
    buffered: VecDeque<String>,
}

impl<R: BufRead> Tokens<R> {
    const fn new(reader: R) -> Self {
        Self {
            reader,
            buffered: VecDeque::new(),
        }
    }

    /// Next token, or `None` at end of input
    fn next_token(&mut self) -> io::Result<Option<String>> {
        loop {
            if let Some(token) = self.buffered.pop_front() {
                return Ok(Some(token));
            }
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.buffered
                .extend(line.split_whitespace().map(str::to_owned));
        }
    }
}

enum Flow {
    Continue,
    Exit,
}

/// Reads the next token or leaves the menu loop at end of input
macro_rules! next_or_exit {
    ($console:expr, $prompt:expr) => {
        match $console.prompt($prompt)? {
            Some(token) => token,
            None => return Ok(Flow::Exit),
        }
    };
}

/// Menu-driven front end for a [`SessionStore`]
pub struct Console<R, W> {
    store: SessionStore,
    input: Tokens<R>,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Creates a console reading `input` and writing `output`
    #[must_use]
    pub fn new(store: SessionStore, input: R, output: W) -> Self {
        Self {
            store,
            input: Tokens::new(input),
            output,
        }
    }

    /// The underlying store
    #[must_use]
    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Consumes the console, returning the store and output
    pub fn into_parts(self) -> (SessionStore, W) {
        (self.store, self.output)
    }

    /// Run menus until the user exits or input ends
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError`] if I/O fails or the store rejects an action.
    pub fn run(&mut self) -> Result<(), ConsoleError> {
        tracing::info!("Console session started");

        loop {
            let flow = if self.store.state(SessionState::is_logged_in) {
                self.user_menu()?
            } else {
                self.main_menu()?
            };
            if matches!(flow, Flow::Exit) {
                break;
            }
        }

        writeln!(self.output, "Exiting the Bus Reservation System. Goodbye!")?;
        self.output.flush()?;
        tracing::info!("Console session ended");
        Ok(())
    }

    fn prompt(&mut self, text: &str) -> Result<Option<String>, ConsoleError> {
        write!(self.output, "{text}")?;
        self.output.flush()?;
        Ok(self.input.next_token()?)
    }

    fn main_menu(&mut self) -> Result<Flow, ConsoleError> {
        let choice = next_or_exit!(self, "1. Register\n2. Log In\n3. Exit\nEnter your choice: ");

        match choice.parse::<u32>() {
            Ok(1) => {
                let username = next_or_exit!(self, "Enter username: ");
                let password = next_or_exit!(self, "Enter password: ");
                self.store.send(SessionAction::Register {
                    username,
                    password: Password::new(password),
                })?;
                if !self.report_failure()? {
                    writeln!(self.output, "User registered successfully.")?;
                }
            },
            Ok(2) => {
                let username = next_or_exit!(self, "Enter username: ");
                let password = next_or_exit!(self, "Enter password: ");
                self.store.send(SessionAction::LogIn {
                    username,
                    password: Password::new(password),
                })?;
                match self.store.state(|s| s.last_error.clone()) {
                    None => writeln!(self.output, "Logged in successfully!")?,
                    Some(error @ ReservationError::AuthenticationFailed) => {
                        writeln!(self.output, "{error}")?;
                        writeln!(
                            self.output,
                            "Authentication failed! Please check your username and password."
                        )?;
                    },
                    Some(error) => writeln!(self.output, "{error}")?,
                }
            },
            Ok(3) => return Ok(Flow::Exit),
            _ => writeln!(self.output, "Invalid choice.")?,
        }
        Ok(Flow::Continue)
    }

    fn user_menu(&mut self) -> Result<Flow, ConsoleError> {
        let choice = next_or_exit!(
            self,
            "1. Display Routes\n2. Display Buses\n3. Book Ticket\n4. Logout\n5. My Tickets\n6. Cancel Ticket\nEnter your choice: "
        );

        match choice.parse::<u32>() {
            Ok(1) => self.display_routes()?,
            Ok(2) => self.display_buses()?,
            Ok(3) => return self.book_ticket(),
            Ok(4) => {
                self.store.send(SessionAction::LogOut)?;
                if !self.report_failure()? {
                    writeln!(self.output, "Logged out successfully.")?;
                }
            },
            Ok(5) => self.display_tickets()?,
            Ok(6) => return self.cancel_ticket(),
            _ => writeln!(self.output, "Invalid choice.")?,
        }
        Ok(Flow::Continue)
    }

    fn display_routes(&mut self) -> Result<(), ConsoleError> {
        let text = self.store.state(|s| render_routes(&s.directory));
        write!(self.output, "{text}")?;
        Ok(())
    }

    fn display_buses(&mut self) -> Result<(), ConsoleError> {
        let text = self.store.state(|s| {
            let mut text = String::from("Available Buses:\n");
            for view in s.directory.bus_views() {
                let _ = writeln!(text, "\n{view}");
            }
            text
        });
        write!(self.output, "{text}")?;
        Ok(())
    }

    /// Route, then bus, then seat; each answer is checked before the next prompt
    fn book_ticket(&mut self) -> Result<Flow, ConsoleError> {
        self.display_routes()?;
        let route = next_or_exit!(self, "Select a Route (Enter the Route Number): ");

        let buses = self.store.state(|s| -> Result<_, ReservationError> {
            let ordinal = s.directory.resolve_route(&route)?;
            let route = s.directory.route_at(ordinal)?;
            let mut text = format!("Buses for Route {}:\n", route.id());
            for bus in s.directory.buses_for_route(ordinal)? {
                if let Some(view) = s.directory.bus_view(bus) {
                    let _ = writeln!(text, "\n{view}");
                }
            }
            Ok((ordinal, text))
        });
        let ordinal = match buses {
            Ok((ordinal, text)) => {
                write!(self.output, "{text}")?;
                ordinal
            },
            Err(error) => {
                writeln!(self.output, "{error}")?;
                return Ok(Flow::Continue);
            },
        };

        let bus = next_or_exit!(self, "Select a Bus (Enter the Bus Number): ");
        if let Err(error) = self
            .store
            .state(|s| s.directory.resolve_bus(ordinal, &bus).map(|_| ()))
        {
            writeln!(self.output, "{error}")?;
            return Ok(Flow::Continue);
        }

        let seat = next_or_exit!(self, "Enter the seat number you want to book: ");
        self.store.send(SessionAction::BookTicket {
            selection: SeatSelection::new(route, bus, seat),
        })?;

        if !self.report_failure()? {
            let ticket = self.store.state(|s| {
                s.last_ticket
                    .as_ref()
                    .and_then(|ticket| s.directory.ticket_view(ticket))
                    .map(|view| view.to_string())
            });
            writeln!(self.output, "Ticket booked successfully!")?;
            if let Some(ticket) = ticket {
                writeln!(self.output, "{ticket}")?;
            }
        }
        Ok(Flow::Continue)
    }

    fn display_tickets(&mut self) -> Result<(), ConsoleError> {
        let text = self.store.state(|s| -> Result<String, ReservationError> {
            let Some(username) = s.current_user() else {
                return Err(ReservationError::NotLoggedIn);
            };
            let views = s.directory.ticket_views(username.as_str())?;
            if views.is_empty() {
                return Ok(String::from("You have no tickets.\n"));
            }
            let mut text = String::from("Your Tickets:\n");
            for (index, view) in views.iter().enumerate() {
                let _ = writeln!(text, "{}. {view}", index + 1);
            }
            Ok(text)
        });

        match text {
            Ok(text) => write!(self.output, "{text}")?,
            Err(error) => writeln!(self.output, "{error}")?,
        }
        Ok(())
    }

    fn cancel_ticket(&mut self) -> Result<Flow, ConsoleError> {
        self.display_tickets()?;
        let answer = next_or_exit!(self, "Enter the ticket number to cancel: ");

        let Ok(index) = answer.parse::<usize>() else {
            let error = ReservationError::InvalidTicketIndex { input: answer };
            writeln!(self.output, "{error}")?;
            return Ok(Flow::Continue);
        };

        self.store.send(SessionAction::CancelTicket { index })?;
        if !self.report_failure()? {
            writeln!(self.output, "Ticket cancelled successfully.")?;
        }
        Ok(Flow::Continue)
    }

    /// Prints the last command's failure, returning whether there was one
    fn report_failure(&mut self) -> Result<bool, ConsoleError> {
        match self.store.state(|s| s.last_error.clone()) {
            Some(error) => {
                writeln!(self.output, "{error}")?;
                Ok(true)
            },
            None => Ok(false),
        }
    }
}

fn render_routes(directory: &ReservationDirectory) -> String {
    let mut text = String::from("Available Routes:\n");
    for route in directory.routes() {
        let _ = writeln!(text, "{route}");
    }
    text
}
