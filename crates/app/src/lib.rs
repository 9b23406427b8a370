//! `kudi-app` library crate.
//!
//! The application root of the notification subsystem: configuration, the
//! toast queue, the notification center, the dispatcher bridge, and
//! tap-response routing. The demo entrypoint lives in `main.rs`.

pub mod bridge;
pub mod center;
pub mod config;
pub mod routing;
pub mod state;
pub mod toast;

pub use state::AppState;
