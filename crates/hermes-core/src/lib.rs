//! # Hermes Core
//!
//! Core types and traits for the Hermes command-dispatch framework.
//!
//! This crate provides the foundational types used throughout Hermes:
//!
//! - [`Command`] - Marker trait identifying a command payload type
//! - [`CommandEnvelope`] - Per-invocation context wrapping a command
//! - [`CommandId`] - UUID v7 invocation identifier
//! - [`Principal`] - Authenticated caller (user, service, or anonymous)
//! - [`DispatchError`] - Standard error taxonomy

#![doc(html_root_url = "https://docs.rs/hermes-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod command;
mod envelope;
mod error;
mod principal;

pub use command::Command;
pub use envelope::{CommandEnvelope, CommandId};
pub use error::{DispatchError, DispatchResult, ErrorCategory, ValidationFailure};
pub use principal::Principal;
