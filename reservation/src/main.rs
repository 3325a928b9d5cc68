//! Bus reservation console.
//!
//! Reads menu answers from stdin and writes the transcript to stdout.
//! Logs go to stderr, filtered by `RUST_LOG`.

use bus_reservation::{
    Config, Console, ReservationDirectory, SessionEnvironment, SessionReducer, SessionState,
};
use bus_reservation_core::environment::SystemClock;
use bus_reservation_runtime::Store;
use std::io;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let config = Config::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_new(&config.log_filter)
                .unwrap_or_else(|_| bus_reservation::config::DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    config.validate()?;
    info!(
        max_users = config.max_users,
        max_tickets_per_user = config.max_tickets_per_user,
        seed = config.seed_sample_data,
        "Configuration loaded"
    );

    let directory = if config.seed_sample_data {
        ReservationDirectory::seeded(config.limits())?
    } else {
        ReservationDirectory::new(config.limits())
    };

    let env = SessionEnvironment::new(Arc::new(SystemClock));
    let store = Store::new(SessionState::new(directory), SessionReducer::new(), env);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut console = Console::new(store, stdin.lock(), stdout.lock());
    console.run()?;

    Ok(())
}
