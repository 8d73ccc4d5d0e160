//! # Hermes Dispatch
//!
//! Command registration and keyed dispatch for the Hermes
//! command-dispatch framework.
//!
//! Applications group composed pipelines into [`CommandModule`]s at
//! startup, then assemble them into one immutable [`Dispatcher`]. From
//! then on, dispatching is a name lookup plus a pipeline invocation:
//!
//! ```text
//! dispatch::<C, R>() → lookup C::NAME → composed pipeline → Result<R>
//! ```
//!
//! The dispatch table is keyed by [`hermes_core::Command::NAME`], so
//! each command type has exactly one pipeline and duplicate
//! registrations are rejected at startup rather than shadowed at
//! runtime.

#![doc(html_root_url = "https://docs.rs/hermes-dispatch/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod dispatcher;
mod module;

pub use dispatcher::Dispatcher;
pub use module::CommandModule;
