//! Core types and error handling for presite.
//!
//! This module hosts the domain error type shared across the crate and the
//! adapter that turns any build failure into a user-facing message with an
//! actionable suggestion.

pub mod error;

pub use error::{ErrorContext, PresiteError, user_friendly_error};
