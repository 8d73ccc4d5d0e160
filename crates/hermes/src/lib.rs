//! # Hermes
//!
//! **Typed command-dispatch pipeline framework**
//!
//! Hermes dispatches commands through per-command-type middleware
//! pipelines:
//!
//! - **Typed pipelines** – Each command type gets its own builder, stages,
//!   and terminal handler
//! - **Guard-then-delegate stages** – Authorization and validation stages
//!   short-circuit without invoking the rest of the pipeline
//! - **Deterministic ordering** – First-registered stage is outermost,
//!   always
//! - **Cooperative cancellation** – Every invocation threads a
//!   cancellation token through the whole pipeline
//!
//! ## Quick Start
//!
//! ```
//! use hermes::prelude::*;
//!
//! struct DeactivateUser {
//!     user_id: String,
//! }
//!
//! impl Command for DeactivateUser {
//!     const NAME: &'static str = "deactivateUser";
//! }
//!
//! # tokio_test::block_on(async {
//! let mut builder = PipelineBuilder::<DeactivateUser, i32>::new();
//! let handler = builder
//!     .pipe(stages::require_role("admin"))?
//!     .pipe(stages::validate(|cmd: &DeactivateUser| {
//!         if cmd.user_id.is_empty() {
//!             vec![ValidationFailure::new("user_id", "must not be empty")]
//!         } else {
//!             Vec::new()
//!         }
//!     }))?
//!     .handle(|_envelope, _cancel| async move { Ok(0) })?;
//!
//! let mut module = CommandModule::new("users");
//! module.register::<DeactivateUser, i32>(handler)?;
//! let dispatcher = Dispatcher::from_modules([module])?;
//!
//! let result: i32 = dispatcher
//!     .dispatch(
//!         DeactivateUser { user_id: "u-9".to_string() },
//!         Principal::user("admin-1", ["admin"]),
//!         CancellationToken::new(),
//!     )
//!     .await?;
//! assert_eq!(result, 0);
//! # Ok::<(), DispatchError>(())
//! # });
//! ```
//!
//! ## Architecture
//!
//! Each registered command type has one composed pipeline, stored in a
//! dispatch table keyed by command name:
//!
//! ```text
//! dispatch → lookup by name → stage[0] → stage[1] → ... → terminal handler
//!                                                              ↓
//! Result   ←─────────────────────── pass-through ←─────────────┘
//! ```

#![doc(html_root_url = "https://docs.rs/hermes/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use hermes_core as core;

// Re-export pipeline types
pub use hermes_pipeline as pipeline;

// Re-export dispatch types
pub use hermes_dispatch as dispatch;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use hermes::prelude::*;
/// ```
pub mod prelude {
    pub use hermes_core::{
        Command, CommandEnvelope, CommandId, DispatchError, DispatchResult, ErrorCategory,
        Principal, ValidationFailure,
    };

    // Re-export pipeline composition
    pub use hermes_pipeline::{handler_fn, stages, CommandHandler, PipelineBuilder, Stage};

    // Re-export dispatch types
    pub use hermes_dispatch::{CommandModule, Dispatcher};

    // Re-export the cancellation token every handler signature carries
    pub use tokio_util::sync::CancellationToken;
}
