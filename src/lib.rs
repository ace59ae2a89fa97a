//! Vaultpane - client core for a secrets-admin console.
//!
//! This crate implements the non-rendering half of the console: the
//! bearer-token session lifecycle (persisted token store, synchronous
//! authenticated/not verdict, request pipeline that injects the token and
//! reacts to 401s) and the secret-reveal cache that fetches a sensitive
//! value at most once per name.
//!
//! The UI layer is an external collaborator: it calls `AuthService`,
//! `SecretsService`, and `MappingsService` and renders whatever they return.

pub mod api;
pub mod auth;
pub mod config;
pub mod mappings;
pub mod models;
pub mod secrets;

pub use api::{ApiClient, ApiError, Navigator, NoNavigation};
pub use auth::{AuthService, Claims, ClaimsError, TokenRecord, TokenStore};
pub use config::Config;
pub use mappings::MappingsService;
pub use secrets::{RevealState, SecretsService};
