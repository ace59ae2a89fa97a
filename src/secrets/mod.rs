//! Secrets vault module: catalog CRUD plus the on-demand reveal cache.
//!
//! Listing returns names only; a secret's true value is fetched lazily on
//! the first reveal, cached until the secret is edited or deleted, and
//! never refetched without an explicit eviction.

pub mod reveal;
pub mod service;

pub use reveal::{FetchTicket, RevealCache, RevealState, ToggleAction};
pub use service::SecretsService;
