//! REST API client module for the console backend.
//!
//! This module provides the `ApiClient` that every service goes through.
//! It injects the bearer token on outbound requests, normalizes failures
//! into a single `ApiError` shape, and reacts to unauthorized responses by
//! clearing the local session and navigating to the sign-in surface.

pub mod client;
pub mod error;

pub use client::{ApiClient, Navigator, NoNavigation};
pub use error::ApiError;
