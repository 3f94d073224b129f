//! Mediashift API Library
//!
//! This crate provides the HTTP handlers and application setup for the
//! migration endpoints.

pub mod constants;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::{ErrorResponse, HttpAppError};
