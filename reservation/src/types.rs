//! Domain types for the bus reservation system.
//!
//! Routes and buses are records owned by the [`ReservationDirectory`]; tickets
//! refer back to them by identifier only, never by reference, so a ticket
//! stays valid however the directory's collections move.
//!
//! [`ReservationDirectory`]: crate::directory::ReservationDirectory

use crate::error::{ReservationError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Business identifier of a route (e.g. `R001`)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteId(String);

impl RouteId {
    /// Creates a route identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Business identifier of a bus (e.g. `B001`)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusNumber(String);

impl BusNumber {
    /// Creates a bus number
    #[must_use]
    pub fn new(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Returns the number as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BusNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Login name of a user
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    /// Creates a username
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a ticket
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId(Uuid);

impl TicketId {
    /// Creates a new random `TicketId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 1-based seat number on a bus
///
/// Any value can be represented; whether it names a real seat is decided
/// by the [`Bus`] it is used against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeatNumber(u16);

impl SeatNumber {
    /// Wraps a raw seat number
    #[must_use]
    pub const fn new(number: u16) -> Self {
        Self(number)
    }

    /// Returns the raw seat number
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for SeatNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ticket price in minor currency units (avoids floating point issues)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fare(u64);

impl Fare {
    /// Creates a fare from minor units
    #[must_use]
    pub const fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    /// Creates a fare from whole currency units, saturating at `u64::MAX` minor units
    #[must_use]
    pub const fn from_units(units: u64) -> Self {
        Self(units.saturating_mul(100))
    }

    /// Returns the fare in minor units
    #[must_use]
    pub const fn minor(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Fare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 % 100 {
            0 => write!(f, "{}", self.0 / 100),
            cents => write!(f, "{}.{cents:02}", self.0 / 100),
        }
    }
}

// ============================================================================
// Route
// ============================================================================

/// A named path between two points with its schedule and fare
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    id: RouteId,
    source: String,
    destination: String,
    distance_km: u32,
    arrival: String,
    departure: String,
    fare: Fare,
}

impl Route {
    /// Creates a route
    #[must_use]
    pub fn new(
        id: RouteId,
        source: impl Into<String>,
        destination: impl Into<String>,
        distance_km: u32,
        arrival: impl Into<String>,
        departure: impl Into<String>,
        fare: Fare,
    ) -> Self {
        Self {
            id,
            source: source.into(),
            destination: destination.into(),
            distance_km,
            arrival: arrival.into(),
            departure: departure.into(),
            fare,
        }
    }

    /// Route identifier
    #[must_use]
    pub const fn id(&self) -> &RouteId {
        &self.id
    }

    /// Where the route starts
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Where the route ends
    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Length in kilometres
    #[must_use]
    pub const fn distance_km(&self) -> u32 {
        self.distance_km
    }

    /// Arrival time, as printed on the timetable
    #[must_use]
    pub fn arrival(&self) -> &str {
        &self.arrival
    }

    /// Departure time, as printed on the timetable
    #[must_use]
    pub fn departure(&self) -> &str {
        &self.departure
    }

    /// Price of one seat
    #[must_use]
    pub const fn fare(&self) -> Fare {
        self.fare
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Route Name: {} ({} to {})",
            self.id, self.source, self.destination
        )
    }
}

// ============================================================================
// Bus
// ============================================================================

/// A bus bound to one route, tracking which of its seats are reserved
///
/// Seat `n` is stored at index `n - 1`; the seat list length is fixed at
/// construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bus {
    number: BusNumber,
    route: RouteId,
    seats: Vec<bool>,
}

impl Bus {
    /// Largest number of seats a bus can carry
    pub const MAX_SEATS: usize = 100;

    /// Creates a bus with every seat free
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::InvalidSeatCapacity`] unless
    /// `1 <= total_seats <= 100`.
    pub fn new(number: BusNumber, route: RouteId, total_seats: usize) -> Result<Self> {
        if !(1..=Self::MAX_SEATS).contains(&total_seats) {
            return Err(ReservationError::InvalidSeatCapacity { seats: total_seats });
        }

        Ok(Self {
            number,
            route,
            seats: vec![false; total_seats],
        })
    }

    /// Bus number
    #[must_use]
    pub const fn number(&self) -> &BusNumber {
        &self.number
    }

    /// Route this bus runs on
    #[must_use]
    pub const fn route(&self) -> &RouteId {
        &self.route
    }

    /// Total number of seats
    #[must_use]
    pub fn total_seats(&self) -> usize {
        self.seats.len()
    }

    fn index_of(&self, seat: SeatNumber) -> Result<usize> {
        match usize::from(seat.get()) {
            n @ 1.. if n <= self.seats.len() => Ok(n - 1),
            _ => Err(ReservationError::InvalidSeatNumber {
                input: seat.to_string(),
            }),
        }
    }

    /// Whether `seat` exists on this bus
    #[must_use]
    pub fn has_seat(&self, seat: SeatNumber) -> bool {
        self.index_of(seat).is_ok()
    }

    /// Whether `seat` exists and is reserved
    #[must_use]
    pub fn is_reserved(&self, seat: SeatNumber) -> bool {
        self.index_of(seat).is_ok_and(|index| self.seats[index])
    }

    /// Reserve a free seat
    ///
    /// # Errors
    ///
    /// - [`ReservationError::InvalidSeatNumber`] if the seat is outside `1..=total_seats`
    /// - [`ReservationError::SeatUnavailable`] if the seat is already reserved
    pub fn reserve_seat(&mut self, seat: SeatNumber) -> Result<()> {
        let index = self.index_of(seat)?;
        if self.seats[index] {
            return Err(ReservationError::SeatUnavailable {
                bus: self.number.clone(),
                seat,
            });
        }
        self.seats[index] = true;
        Ok(())
    }

    /// Free a reserved seat
    ///
    /// # Errors
    ///
    /// - [`ReservationError::InvalidSeatNumber`] if the seat is outside `1..=total_seats`
    /// - [`ReservationError::SeatNotReserved`] if the seat is already free
    pub fn cancel_seat(&mut self, seat: SeatNumber) -> Result<()> {
        let index = self.index_of(seat)?;
        if !self.seats[index] {
            return Err(ReservationError::SeatNotReserved {
                bus: self.number.clone(),
                seat,
            });
        }
        self.seats[index] = false;
        Ok(())
    }

    /// Free seats in ascending order
    pub fn available_seats(&self) -> impl Iterator<Item = SeatNumber> + '_ {
        self.seats
            .iter()
            .zip(1_u16..)
            .filter(|(reserved, _)| !**reserved)
            .map(|(_, number)| SeatNumber::new(number))
    }

    /// Number of reserved seats
    #[must_use]
    pub fn reserved_count(&self) -> usize {
        self.seats.iter().filter(|reserved| **reserved).count()
    }
}

/// A bus joined with its route, for display
#[derive(Clone, Copy, Debug)]
pub struct BusView<'a> {
    /// The bus
    pub bus: &'a Bus,
    /// The route the bus runs on
    pub route: &'a Route,
}

impl fmt::Display for BusView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { bus, route } = self;
        writeln!(f, "Bus Number: {}", bus.number)?;
        writeln!(
            f,
            "Route: {} ({} to {})",
            route.id, route.source, route.destination
        )?;
        writeln!(f, "Distance: {} km", route.distance_km)?;
        writeln!(f, "Total Seats: {}", bus.total_seats())?;
        write!(f, "Available Seats:")?;
        for (reserved, number) in bus.seats.iter().zip(1_u16..) {
            if *reserved {
                write!(f, " NA")?;
            } else {
                write!(f, " {number}")?;
            }
        }
        writeln!(f)?;
        writeln!(f, "Ticket Fare: {}", route.fare)?;
        writeln!(f, "Arrival Time: {}", route.arrival)?;
        write!(f, "Departure Time: {}", route.departure)
    }
}

// ============================================================================
// Ticket
// ============================================================================

/// Proof of one passenger's seat on one bus
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    id: TicketId,
    passenger: Username,
    seat: SeatNumber,
    route: RouteId,
    bus: BusNumber,
    booked_at: DateTime<Utc>,
}

impl Ticket {
    /// Creates a ticket with a fresh identifier
    #[must_use]
    pub fn new(
        passenger: Username,
        seat: SeatNumber,
        route: RouteId,
        bus: BusNumber,
        booked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TicketId::new(),
            passenger,
            seat,
            route,
            bus,
            booked_at,
        }
    }

    /// Ticket identifier
    #[must_use]
    pub const fn id(&self) -> TicketId {
        self.id
    }

    /// Name of the passenger holding the seat
    #[must_use]
    pub const fn passenger(&self) -> &Username {
        &self.passenger
    }

    /// Booked seat
    #[must_use]
    pub const fn seat(&self) -> SeatNumber {
        self.seat
    }

    /// Route travelled
    #[must_use]
    pub const fn route(&self) -> &RouteId {
        &self.route
    }

    /// Bus carrying the seat
    #[must_use]
    pub const fn bus(&self) -> &BusNumber {
        &self.bus
    }

    /// When the booking was made
    #[must_use]
    pub const fn booked_at(&self) -> DateTime<Utc> {
        self.booked_at
    }
}

/// A ticket joined with its route, for display
#[derive(Clone, Copy, Debug)]
pub struct TicketView<'a> {
    /// The ticket
    pub ticket: &'a Ticket,
    /// The route named on the ticket
    pub route: &'a Route,
}

impl fmt::Display for TicketView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { ticket, route } = self;
        write!(
            f,
            "Passenger: {}, Bus Number: {}, Seat Number: {}, Ticket Fare: {}, Arrival: {}, Departure: {}",
            ticket.passenger, ticket.bus, ticket.seat, route.fare, route.arrival, route.departure
        )
    }
}

// ============================================================================
// User
// ============================================================================

/// A registered account and the tickets it has booked
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    username: Username,
    password: String,
    tickets: Vec<Ticket>,
    ticket_limit: usize,
}

impl User {
    /// Creates a user with no tickets
    #[must_use]
    pub fn new(username: Username, password: impl Into<String>, ticket_limit: usize) -> Self {
        Self {
            username,
            password: password.into(),
            tickets: Vec::new(),
            ticket_limit,
        }
    }

    /// Login name
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Exact, case-sensitive password comparison
    #[must_use]
    pub fn verify_password(&self, password: &str) -> bool {
        self.password == password
    }

    /// Tickets in booking order
    #[must_use]
    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    /// Number of tickets held
    #[must_use]
    pub fn ticket_count(&self) -> usize {
        self.tickets.len()
    }

    /// Whether another ticket would exceed the limit
    #[must_use]
    pub fn at_ticket_limit(&self) -> bool {
        self.tickets.len() >= self.ticket_limit
    }

    /// Ticket at 1-based `index`
    #[must_use]
    pub fn ticket(&self, index: usize) -> Option<&Ticket> {
        index.checked_sub(1).and_then(|i| self.tickets.get(i))
    }

    /// Append a ticket
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::TicketLimitReached`] when the user already
    /// holds the maximum number of tickets; the list is left unchanged.
    pub fn add_ticket(&mut self, ticket: Ticket) -> Result<()> {
        if self.at_ticket_limit() {
            tracing::warn!(username = %self.username, limit = self.ticket_limit, "Ticket limit reached");
            return Err(ReservationError::TicketLimitReached {
                limit: self.ticket_limit,
            });
        }
        self.tickets.push(ticket);
        Ok(())
    }

    /// Remove the ticket at 1-based `index`, shifting later tickets down
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::InvalidTicketIndex`] if `index` is outside
    /// `1..=ticket_count`; the list is left unchanged.
    pub fn remove_ticket(&mut self, index: usize) -> Result<Ticket> {
        if !(1..=self.tickets.len()).contains(&index) {
            return Err(ReservationError::InvalidTicketIndex {
                input: index.to_string(),
            });
        }
        Ok(self.tickets.remove(index - 1))
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("tickets", &self.tickets)
            .field("ticket_limit", &self.ticket_limit)
            .finish()
    }
}
