//! Mention webhook receiver.
//!
//! Tagged colleagues get a like on the mentioning post, a row in the `thanks`
//! log, and a reply with everyone's weekly thank-you counts.

pub mod config;
pub mod error;
pub mod payload;
pub mod pipeline;
pub mod routes;
pub mod signature;
pub mod summary;
pub mod templates;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use config::{Config, ConfigError};
pub use error::AppError;
pub use pipeline::{GraphApi, MentionOutcome, MentionPipeline};
pub use routes::{router, AppState};
