//! `stockarium-client`: typed client for the Stockarium REST API.
//!
//! The bearer token and signed-in user live in a [`SessionStore`], so a
//! session survives restarts of the host application. Any `401` from the
//! server, or a token past its expiry, drops the session.
//!
//! [`SessionStore`]: stockarium_local::SessionStore

pub mod client;
pub mod error;
pub mod types;

pub use client::ApiClient;
pub use error::ClientError;
pub use types::{StockAdjustment, StockLevel};
