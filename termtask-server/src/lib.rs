//! `TermTask` reference server library.
//!
//! Exposes the task store and identity server for use in tests and
//! embedding. Implements exactly the external interface the client
//! depends on: cookie-sessioned identity endpoints, a token issuance
//! endpoint, and a bearer-authenticated REST task store.

pub mod config;
pub mod server;
pub mod sessions;
pub mod store;
pub mod token;
