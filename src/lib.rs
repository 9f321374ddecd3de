//! Client profile loading and enrichment
//!
//! Loads a client's base record from the client data service, renders it into
//! a bounded text context, and merges the inferred attributes returned by an
//! enrichment collaborator into a single view model. Stale results of
//! superseded selections are never shown.

pub mod backend;
pub mod config;
pub mod controller;
pub mod enrichment;
pub mod error;
pub mod models;

pub use config::Config;
pub use controller::{ClientProfileController, LoadPhase, ProfileView, SelectOutcome};
pub use error::{AppError, Result};
