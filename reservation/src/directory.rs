//! The reservation directory: every route, bus and user for the process lifetime.
//!
//! All lookups are linear scans in insertion order; the collections are
//! small and bounded by [`Limits`].

use crate::error::{ReservationError, Result};
use crate::types::{
    Bus, BusNumber, BusView, Fare, Route, RouteId, SeatNumber, Ticket, TicketView, User, Username,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Capacity policy enforced at each operation boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum registered users
    pub max_users: usize,
    /// Maximum routes
    pub max_routes: usize,
    /// Maximum buses
    pub max_buses: usize,
    /// Maximum tickets a single user may hold
    pub max_tickets_per_user: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_users: 100,
            max_routes: 10,
            max_buses: 10,
            max_tickets_per_user: 10,
        }
    }
}

/// Raw booking choices, exactly as the passenger entered them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatSelection {
    /// Route identifier (e.g. `R001`)
    pub route: String,
    /// Bus number (e.g. `B001`)
    pub bus: String,
    /// Seat number, not yet parsed
    pub seat: String,
}

impl SeatSelection {
    /// Bundles the three booking answers
    #[must_use]
    pub fn new(route: impl Into<String>, bus: impl Into<String>, seat: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            bus: bus.into(),
            seat: seat.into(),
        }
    }
}

/// Aggregate root holding all users, routes and buses
#[derive(Debug, Clone, Default)]
pub struct ReservationDirectory {
    limits: Limits,
    routes: Vec<Route>,
    buses: Vec<Bus>,
    users: Vec<User>,
}

impl ReservationDirectory {
    /// Creates an empty directory
    #[must_use]
    pub const fn new(limits: Limits) -> Self {
        Self {
            limits,
            routes: Vec::new(),
            buses: Vec::new(),
            users: Vec::new(),
        }
    }

    /// Creates a directory holding the three sample routes and their buses
    ///
    /// # Errors
    ///
    /// Fails only if `limits` cannot hold three routes and three buses.
    pub fn seeded(limits: Limits) -> Result<Self> {
        let mut directory = Self::new(limits);

        for (id, source, destination, distance, fare, arrival, departure) in [
            ("R001", "City A", "City B", 200, 800, "6:00 AM", "6:20 AM"),
            ("R002", "City B", "City C", 150, 600, "12:00 PM", "12:20 PM"),
            ("R003", "City C", "City D", 180, 720, "7:00 PM", "7:20 PM"),
        ] {
            directory.add_route(Route::new(
                RouteId::new(id),
                source,
                destination,
                distance,
                arrival,
                departure,
                Fare::from_units(fare),
            ))?;
        }

        for (number, route, seats) in [("B001", "R001", 20), ("B002", "R002", 15), ("B003", "R003", 18)] {
            directory.add_bus(Bus::new(BusNumber::new(number), RouteId::new(route), seats)?)?;
        }

        tracing::debug!(
            routes = directory.routes.len(),
            buses = directory.buses.len(),
            "Seeded sample data"
        );
        Ok(directory)
    }

    /// Capacity policy in force
    #[must_use]
    pub const fn limits(&self) -> &Limits {
        &self.limits
    }

    // ========================================================================
    // Routes and buses
    // ========================================================================

    /// Add a route
    ///
    /// # Errors
    ///
    /// [`ReservationError::RouteLimitReached`] or [`ReservationError::DuplicateRoute`].
    pub fn add_route(&mut self, route: Route) -> Result<()> {
        if self.routes.len() >= self.limits.max_routes {
            return Err(ReservationError::RouteLimitReached {
                limit: self.limits.max_routes,
            });
        }
        if self.route(route.id()).is_some() {
            return Err(ReservationError::DuplicateRoute {
                route: route.id().clone(),
            });
        }
        self.routes.push(route);
        Ok(())
    }

    /// Add a bus running on an existing route
    ///
    /// # Errors
    ///
    /// [`ReservationError::BusLimitReached`], [`ReservationError::DuplicateBus`],
    /// or [`ReservationError::RouteNotFound`] if the bus names an unknown route.
    pub fn add_bus(&mut self, bus: Bus) -> Result<()> {
        if self.buses.len() >= self.limits.max_buses {
            return Err(ReservationError::BusLimitReached {
                limit: self.limits.max_buses,
            });
        }
        if self.bus(bus.number()).is_some() {
            return Err(ReservationError::DuplicateBus {
                bus: bus.number().clone(),
            });
        }
        if self.route(bus.route()).is_none() {
            return Err(ReservationError::RouteNotFound {
                route: bus.route().clone(),
            });
        }
        self.buses.push(bus);
        Ok(())
    }

    /// Routes in insertion order
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Buses in insertion order
    #[must_use]
    pub fn buses(&self) -> &[Bus] {
        &self.buses
    }

    /// Route by identifier
    #[must_use]
    pub fn route(&self, id: &RouteId) -> Option<&Route> {
        self.routes.iter().find(|route| route.id() == id)
    }

    /// Bus by number
    #[must_use]
    pub fn bus(&self, number: &BusNumber) -> Option<&Bus> {
        self.buses.iter().find(|bus| bus.number() == number)
    }

    /// Route at 1-based position
    ///
    /// # Errors
    ///
    /// [`ReservationError::InvalidRouteSelection`] if `ordinal` is outside `1..=route_count`.
    pub fn route_at(&self, ordinal: usize) -> Result<&Route> {
        ordinal
            .checked_sub(1)
            .and_then(|index| self.routes.get(index))
            .ok_or(ReservationError::InvalidRouteSelection {
                ordinal,
                count: self.routes.len(),
            })
    }

    /// Buses running on the route at 1-based position, in insertion order
    ///
    /// Buses are matched by route identifier.
    ///
    /// # Errors
    ///
    /// [`ReservationError::InvalidRouteSelection`] if `ordinal` is outside `1..=route_count`.
    pub fn buses_for_route(&self, ordinal: usize) -> Result<Vec<&Bus>> {
        let route = self.route_at(ordinal)?;
        Ok(self
            .buses
            .iter()
            .filter(|bus| bus.route() == route.id())
            .collect())
    }

    /// Every bus joined with its route
    pub fn bus_views(&self) -> impl Iterator<Item = BusView<'_>> {
        self.buses.iter().filter_map(|bus| self.bus_view(bus))
    }

    /// A bus joined with its route
    #[must_use]
    pub fn bus_view<'a>(&'a self, bus: &'a Bus) -> Option<BusView<'a>> {
        self.route(bus.route()).map(|route| BusView { bus, route })
    }

    // ========================================================================
    // Booking selections
    // ========================================================================

    /// Resolve a route identifier to its 1-based position
    ///
    /// # Errors
    ///
    /// [`ReservationError::InvalidRouteNumber`] if no route has this identifier.
    pub fn resolve_route(&self, input: &str) -> Result<usize> {
        self.routes
            .iter()
            .position(|route| route.id().as_str() == input)
            .map(|index| index + 1)
            .ok_or_else(|| ReservationError::InvalidRouteNumber {
                input: input.to_string(),
            })
    }

    fn bus_index(&self, ordinal: usize, input: &str) -> Result<usize> {
        let route = self.route_at(ordinal)?;
        self.buses
            .iter()
            .position(|bus| bus.number().as_str() == input && bus.route() == route.id())
            .ok_or_else(|| ReservationError::InvalidBusNumber {
                input: input.to_string(),
            })
    }

    /// Resolve a bus number that must run on the route at 1-based `ordinal`
    ///
    /// # Errors
    ///
    /// - [`ReservationError::InvalidRouteSelection`] if `ordinal` is out of range
    /// - [`ReservationError::InvalidBusNumber`] if the bus is unknown or runs on another route
    pub fn resolve_bus(&self, ordinal: usize, input: &str) -> Result<&Bus> {
        self.bus_index(ordinal, input).map(|index| &self.buses[index])
    }

    /// Parse a seat entry against a bus
    ///
    /// # Errors
    ///
    /// [`ReservationError::InvalidSeatNumber`] if `input` is not a number or
    /// is outside `1..=total_seats`.
    pub fn parse_seat(bus: &Bus, input: &str) -> Result<SeatNumber> {
        input
            .trim()
            .parse::<u16>()
            .ok()
            .map(SeatNumber::new)
            .filter(|seat| bus.has_seat(*seat))
            .ok_or_else(|| ReservationError::InvalidSeatNumber {
                input: input.to_string(),
            })
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Registered users in registration order
    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Register a new user
    ///
    /// # Errors
    ///
    /// - [`ReservationError::UserLimitReached`] when the directory is full
    /// - [`ReservationError::UsernameTaken`] when the name is already registered
    pub fn register_user(&mut self, username: &str, password: &str) -> Result<&User> {
        if self.users.len() >= self.limits.max_users {
            tracing::warn!(limit = self.limits.max_users, "User limit reached");
            return Err(ReservationError::UserLimitReached {
                limit: self.limits.max_users,
            });
        }
        if self.find_user(username).is_ok() {
            return Err(ReservationError::UsernameTaken {
                username: Username::new(username),
            });
        }

        self.users.push(User::new(
            Username::new(username),
            password,
            self.limits.max_tickets_per_user,
        ));
        tracing::info!(username, users = self.users.len(), "User registered");

        let index = self.users.len() - 1;
        Ok(&self.users[index])
    }

    /// Check a username and password pair
    ///
    /// # Errors
    ///
    /// [`ReservationError::AuthenticationFailed`] unless a user has exactly
    /// this username and password.
    pub fn authenticate_user(&self, username: &str, password: &str) -> Result<&User> {
        self.users
            .iter()
            .find(|user| user.username().as_str() == username && user.verify_password(password))
            .ok_or(ReservationError::AuthenticationFailed)
    }

    fn user_index(&self, username: &str) -> Result<usize> {
        self.users
            .iter()
            .position(|user| user.username().as_str() == username)
            .ok_or_else(|| ReservationError::UserNotFound {
                username: Username::new(username),
            })
    }

    /// User by name
    ///
    /// # Errors
    ///
    /// [`ReservationError::UserNotFound`] if nobody is registered under `username`.
    pub fn find_user(&self, username: &str) -> Result<&User> {
        self.user_index(username).map(|index| &self.users[index])
    }

    /// Tickets held by `username`, joined with their routes
    ///
    /// # Errors
    ///
    /// [`ReservationError::UserNotFound`] if nobody is registered under `username`.
    pub fn ticket_views(&self, username: &str) -> Result<Vec<TicketView<'_>>> {
        let user = self.find_user(username)?;
        Ok(user
            .tickets()
            .iter()
            .filter_map(|ticket| {
                self.route(ticket.route())
                    .map(|route| TicketView { ticket, route })
            })
            .collect())
    }

    /// A ticket joined with its route
    #[must_use]
    pub fn ticket_view<'a>(&'a self, ticket: &'a Ticket) -> Option<TicketView<'a>> {
        self.route(ticket.route())
            .map(|route| TicketView { ticket, route })
    }

    // ========================================================================
    // Booking
    // ========================================================================

    /// Book a seat for `username`
    ///
    /// The user must exist and have room for another ticket before any seat
    /// is touched, so every reserved seat has a ticket holder. The selection
    /// is then validated route, bus, seat in that order.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::UserNotFound`]
    /// - [`ReservationError::TicketLimitReached`]
    /// - [`ReservationError::InvalidRouteNumber`]
    /// - [`ReservationError::InvalidBusNumber`]
    /// - [`ReservationError::InvalidSeatNumber`]
    /// - [`ReservationError::SeatUnavailable`] if the seat is already taken
    pub fn book_ticket(
        &mut self,
        username: &str,
        selection: &SeatSelection,
        booked_at: DateTime<Utc>,
    ) -> Result<Ticket> {
        let user_index = self.user_index(username)?;
        if self.users[user_index].at_ticket_limit() {
            return Err(ReservationError::TicketLimitReached {
                limit: self.limits.max_tickets_per_user,
            });
        }

        let ordinal = self.resolve_route(&selection.route)?;
        let bus_index = self.bus_index(ordinal, &selection.bus)?;
        let seat = Self::parse_seat(&self.buses[bus_index], &selection.seat)?;

        let bus = &mut self.buses[bus_index];
        bus.reserve_seat(seat)?;

        let ticket = Ticket::new(
            Username::new(username),
            seat,
            bus.route().clone(),
            bus.number().clone(),
            booked_at,
        );

        if let Err(error) = self.users[user_index].add_ticket(ticket.clone()) {
            self.buses[bus_index].cancel_seat(seat)?;
            return Err(error);
        }

        tracing::info!(
            username,
            route = %ticket.route(),
            bus = %ticket.bus(),
            seat = %ticket.seat(),
            "Ticket booked"
        );
        Ok(ticket)
    }

    /// Cancel the ticket at 1-based `index` and free its seat
    ///
    /// # Errors
    ///
    /// - [`ReservationError::UserNotFound`]
    /// - [`ReservationError::InvalidTicketIndex`] if `index` is outside `1..=ticket_count`
    /// - [`ReservationError::InvalidBusNumber`] if the ticket's bus no longer exists
    /// - [`ReservationError::SeatNotReserved`] if the seat was already freed
    pub fn cancel_ticket(&mut self, username: &str, index: usize) -> Result<Ticket> {
        let user_index = self.user_index(username)?;
        let (bus_number, seat) = self.users[user_index]
            .ticket(index)
            .map(|ticket| (ticket.bus().clone(), ticket.seat()))
            .ok_or_else(|| ReservationError::InvalidTicketIndex {
                input: index.to_string(),
            })?;

        let bus = self
            .buses
            .iter_mut()
            .find(|bus| bus.number() == &bus_number)
            .ok_or_else(|| ReservationError::InvalidBusNumber {
                input: bus_number.to_string(),
            })?;
        bus.cancel_seat(seat)?;

        let ticket = self.users[user_index].remove_ticket(index)?;
        tracing::info!(username, bus = %bus_number, %seat, "Ticket cancelled");
        Ok(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> ReservationDirectory {
        ReservationDirectory::seeded(Limits::default()).unwrap()
    }

    fn with_alice() -> ReservationDirectory {
        let mut directory = seeded();
        directory.register_user("alice", "pw1").unwrap();
        directory
    }

    fn book(directory: &mut ReservationDirectory, route: &str, bus: &str, seat: &str) -> Result<Ticket> {
        directory.book_ticket("alice", &SeatSelection::new(route, bus, seat), Utc::now())
    }

    #[test]
    fn seed_data_is_in_order() {
        let directory = seeded();

        let routes: Vec<&str> = directory.routes().iter().map(|r| r.id().as_str()).collect();
        let buses: Vec<(&str, usize)> = directory
            .buses()
            .iter()
            .map(|b| (b.number().as_str(), b.total_seats()))
            .collect();

        assert_eq!(routes, vec!["R001", "R002", "R003"]);
        assert_eq!(buses, vec![("B001", 20), ("B002", 15), ("B003", 18)]);
        assert_eq!(directory.route_at(2).unwrap().fare(), Fare::from_units(600));
    }

    #[test]
    fn register_rejects_beyond_capacity() {
        let mut directory = ReservationDirectory::new(Limits::default());
        for n in 0..100 {
            directory.register_user(&format!("user{n}"), "pw").unwrap();
        }

        assert_eq!(
            directory.register_user("late", "pw").map(|_| ()),
            Err(ReservationError::UserLimitReached { limit: 100 })
        );
        assert_eq!(directory.users().len(), 100);
    }

    #[test]
    fn register_rejects_duplicate_username() {
        let mut directory = with_alice();

        assert!(matches!(
            directory.register_user("alice", "other"),
            Err(ReservationError::UsernameTaken { .. })
        ));
        assert_eq!(directory.users().len(), 1);
        assert!(directory.authenticate_user("alice", "pw1").is_ok());
    }

    #[test]
    fn authentication_requires_exact_match() {
        let directory = with_alice();

        assert!(directory.authenticate_user("alice", "pw1").is_ok());
        for (user, password) in [("Alice", "pw1"), ("alice", "PW1"), ("bob", "pw1"), ("alice", "")] {
            assert_eq!(
                directory.authenticate_user(user, password).map(|_| ()),
                Err(ReservationError::AuthenticationFailed)
            );
        }
    }

    #[test]
    fn buses_for_route_matches_route_id() {
        let directory = seeded();

        let buses: Vec<&str> = directory
            .buses_for_route(2)
            .unwrap()
            .into_iter()
            .map(|b| b.number().as_str())
            .collect();

        assert_eq!(buses, vec!["B002"]);
        for ordinal in [0, 4] {
            assert_eq!(
                directory.buses_for_route(ordinal).map(|_| ()),
                Err(ReservationError::InvalidRouteSelection { ordinal, count: 3 })
            );
        }
    }

    #[test]
    fn resolve_bus_requires_matching_route() {
        let directory = seeded();

        assert!(directory.resolve_bus(1, "B001").is_ok());
        assert!(matches!(
            directory.resolve_bus(1, "B002"),
            Err(ReservationError::InvalidBusNumber { .. })
        ));
        assert!(matches!(
            directory.resolve_bus(1, "B999"),
            Err(ReservationError::InvalidBusNumber { .. })
        ));
    }

    #[test]
    fn parse_seat_rejects_non_numeric_and_out_of_range() {
        let directory = seeded();
        let bus = directory.resolve_bus(2, "B002").unwrap();

        assert_eq!(ReservationDirectory::parse_seat(bus, "15"), Ok(SeatNumber::new(15)));
        for input in ["0", "16", "-1", "five", ""] {
            assert_eq!(
                ReservationDirectory::parse_seat(bus, input),
                Err(ReservationError::InvalidSeatNumber { input: input.to_string() })
            );
        }
    }

    #[test]
    fn booking_reserves_seat_and_attaches_ticket() {
        let mut directory = with_alice();

        let ticket = book(&mut directory, "R001", "B001", "5").unwrap();

        assert_eq!(ticket.passenger().as_str(), "alice");
        assert_eq!(ticket.seat(), SeatNumber::new(5));
        assert_eq!(ticket.route().as_str(), "R001");
        assert_eq!(ticket.bus().as_str(), "B001");
        assert!(directory.bus(&BusNumber::new("B001")).unwrap().is_reserved(SeatNumber::new(5)));
        assert_eq!(directory.find_user("alice").unwrap().tickets(), &[ticket]);
    }

    #[test]
    fn booking_taken_seat_fails_without_new_ticket() {
        let mut directory = with_alice();
        book(&mut directory, "R001", "B001", "5").unwrap();

        let err = book(&mut directory, "R001", "B001", "5").unwrap_err();

        assert_eq!(err.kind(), crate::error::ErrorKind::OperationFailed);
        assert_eq!(directory.find_user("alice").unwrap().ticket_count(), 1);
    }

    #[test]
    fn booking_validates_in_order() {
        let mut directory = with_alice();

        assert!(matches!(
            book(&mut directory, "R999", "B999", "x"),
            Err(ReservationError::InvalidRouteNumber { .. })
        ));
        assert!(matches!(
            book(&mut directory, "R001", "B003", "x"),
            Err(ReservationError::InvalidBusNumber { .. })
        ));
        assert!(matches!(
            book(&mut directory, "R001", "B001", "21"),
            Err(ReservationError::InvalidSeatNumber { .. })
        ));
        assert_eq!(directory.bus(&BusNumber::new("B001")).unwrap().reserved_count(), 0);
    }

    #[test]
    fn booking_for_unknown_user_reserves_nothing() {
        let mut directory = seeded();

        let result = directory.book_ticket("ghost", &SeatSelection::new("R001", "B001", "1"), Utc::now());

        assert!(matches!(result, Err(ReservationError::UserNotFound { .. })));
        assert_eq!(directory.bus(&BusNumber::new("B001")).unwrap().reserved_count(), 0);
    }

    #[test]
    fn booking_at_ticket_limit_reserves_nothing() {
        let mut directory = with_alice();
        for seat in 1..=10 {
            book(&mut directory, "R001", "B001", &seat.to_string()).unwrap();
        }

        assert_eq!(
            book(&mut directory, "R001", "B001", "11"),
            Err(ReservationError::TicketLimitReached { limit: 10 })
        );
        assert!(!directory.bus(&BusNumber::new("B001")).unwrap().is_reserved(SeatNumber::new(11)));
    }

    #[test]
    fn cancel_ticket_frees_seat_and_retracts_ticket() {
        let mut directory = with_alice();
        book(&mut directory, "R001", "B001", "5").unwrap();
        book(&mut directory, "R002", "B002", "3").unwrap();

        let cancelled = directory.cancel_ticket("alice", 1).unwrap();

        assert_eq!(cancelled.seat(), SeatNumber::new(5));
        assert!(!directory.bus(&BusNumber::new("B001")).unwrap().is_reserved(SeatNumber::new(5)));
        let remaining = directory.find_user("alice").unwrap().tickets();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].bus().as_str(), "B002");

        assert!(matches!(
            directory.cancel_ticket("alice", 2),
            Err(ReservationError::InvalidTicketIndex { .. })
        ));
    }

    #[test]
    fn add_bus_requires_known_route() {
        let mut directory = seeded();
        let bus = Bus::new(BusNumber::new("B004"), RouteId::new("R404"), 10).unwrap();

        assert!(matches!(
            directory.add_bus(bus),
            Err(ReservationError::RouteNotFound { .. })
        ));
        assert!(matches!(
            directory.add_bus(Bus::new(BusNumber::new("B001"), RouteId::new("R001"), 10).unwrap()),
            Err(ReservationError::DuplicateBus { .. })
        ));
    }
}
