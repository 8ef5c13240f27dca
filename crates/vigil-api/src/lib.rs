//! Async client for the Vigil alarm panel REST service.
//!
//! This crate owns the wire layer only: DTOs that mirror the service's
//! JSON bodies ([`models`]), transport construction ([`transport`]), and
//! the [`PanelClient`] that performs the HTTP calls. Domain semantics —
//! state normalization, optimistic updates, reconciliation — live in
//! `vigil-core`, which consumes this crate through its gateway seam.

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::PanelClient;
pub use error::Error;
pub use transport::TransportConfig;
