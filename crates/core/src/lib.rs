//! Shared domain types for the Kudi notification subsystem.
//!
//! Everything here is plain data: identifiers, notification categories and
//! subtypes, delivery channels, toast visual types, and the naira amount
//! formatter used when composing notification copy.

pub mod category;
pub mod channels;
pub mod error;
pub mod money;
pub mod types;
