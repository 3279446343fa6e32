//! Append-only store of thank-you records backed by Postgres.
//!
//! Rows are written once per (mention, recipient) pair and never updated or
//! deleted. Reads are either the full log or the trailing one-week window
//! used for the weekly counts.

pub mod store;
pub mod types;

pub use store::{ThanksRepository, ThanksStore, WEEKLY_WINDOW_DAYS};
pub use types::{NewThanks, Recipient, ThankRecord};
