//! slotwatch - vaccination slot availability notifier
//!
//! This library checks the public CoWIN calendar for a set of monitored
//! locations over a window of dates and notifies subscribers about sessions
//! they can book.

pub mod aggregation;
pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod filter;
pub mod formatting;
pub mod notification;
pub mod subscribers;
pub mod utils;

// Re-export core types for convenience
pub use self::core::*;
