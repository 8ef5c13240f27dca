//! State-reconciliation and optimistic-update engine for Vigil.
//!
//! This crate keeps a hierarchy of buildings and their devices
//! synchronized between the panel service REST API and an interactive
//! display, tolerating latency, partial failure, and concurrent edits:
//!
//! - **[`Console`]** — Central facade: [`connect()`](Console::connect)
//!   loads the building batch and panel flag, then device lists load
//!   lazily per building. [`Console::oneshot()`] provides a lightweight
//!   mode for single CLI invocations.
//!
//! - **[`EntityStore`]** — The single source of truth for UI state.
//!   Reactive snapshots (`DashMap` + `tokio::sync::watch`), per-building
//!   device collections with load-generation counters for
//!   stale-response suppression.
//!
//! - **[`aggregate()`](aggregate::aggregate)** — Pure derivation of a
//!   building's arm status from its devices.
//!
//! - **[`SearchController`]** — Debounced, cancellable query pipeline;
//!   superseded keystrokes and in-flight fetches are discarded by
//!   explicit epoch/generation comparison, never applied out of order.
//!
//! - **[`Mutation`] / [`MutationCoordinator`]** — Every write flows
//!   through one tagged mutation type: optimistic apply, per-item
//!   reconciliation, rollback on failure, per-entity serialization.
//!
//! - **[`BuildingSelector`]** — Client-side narrowing of the visible
//!   building set; no network involved.

pub mod aggregate;
pub mod config;
pub mod console;
mod convert;
pub mod error;
pub mod gateway;
pub mod model;
pub mod mutation;
pub mod notice;
pub mod search;
pub mod selector;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregate::{AggregateStatus, aggregate};
pub use config::ConsoleConfig;
pub use console::Console;
pub use error::CoreError;
pub use gateway::{
    ActionDetail, ActionOutcome, ActionStatus, Gateway, IgnoreFlagsUpdate, RestGateway,
};
pub use model::{
    ArmAction, ArmState, Building, Device, Panel, Schedule, ScheduleDraft, ScheduleShape,
};
pub use mutation::{ActionFailure, Mutation, MutationCoordinator, MutationOutcome};
pub use notice::Notice;
pub use search::SearchController;
pub use selector::BuildingSelector;
pub use store::EntityStore;
pub use stream::EntityStream;
