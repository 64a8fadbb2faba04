//! HTTP API
//!
//! One module per concern; shared error-to-status mapping in [`error`].

pub mod ballots;
pub mod error;
pub mod health;
pub mod media;
pub mod members;
pub mod ordering;
pub mod proposals;
pub mod review;
pub mod tags;

pub use error::{ApiError, ApiResult};
