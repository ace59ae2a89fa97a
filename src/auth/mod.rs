//! Authentication module: token persistence, session verdict, lifecycle.
//!
//! This module provides:
//! - `TokenStore`: persisted bearer token and expiry, single-writer
//! - `claims::decode`: strongly-typed read of the token's embedded claims
//! - `is_authenticated` / `AuthService`: the synchronous session verdict
//!   and the login/logout/identity orchestration around it

pub mod claims;
pub mod session;
pub mod token;

pub use claims::{Claims, ClaimsError};
pub use session::{is_authenticated, AuthService};
pub use token::{Clock, SystemClock, TokenRecord, TokenStore};
