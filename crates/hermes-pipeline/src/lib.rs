//! # Hermes Pipeline
//!
//! Middleware pipeline composition for the Hermes command-dispatch
//! framework.
//!
//! A pipeline is built per command type: a [`PipelineBuilder`]
//! accumulates middleware stages in registration order and finalizes
//! them with a terminal handler, producing one composed
//! [`CommandHandler`] that the dispatch table stores and invokes for
//! every incoming command of that type.
//!
//! ```text
//! Command → require_role → validate → ... → Terminal handler
//!                                                  ↓
//! Result  ←──────────── pass-through ←─────────────┘
//! ```
//!
//! ## Key properties
//!
//! - **Registration order is execution order**: the first stage piped is
//!   outermost (first in, last out)
//! - **Short-circuit semantics**: a failing guard stage returns its
//!   failure immediately; stages past it and the terminal handler never
//!   run
//! - **Build once, invoke many**: the composed handler is immutable and
//!   safe to invoke concurrently; each invocation carries its own
//!   envelope and cancellation token
//!
//! ## Example
//!
//! ```
//! use hermes_core::{Command, CommandEnvelope, DispatchError, Principal, ValidationFailure};
//! use hermes_pipeline::{stages, PipelineBuilder};
//! use tokio_util::sync::CancellationToken;
//!
//! struct ShutdownNode {
//!     node_id: String,
//! }
//!
//! impl Command for ShutdownNode {
//!     const NAME: &'static str = "shutdownNode";
//! }
//!
//! # tokio_test::block_on(async {
//! let mut builder = PipelineBuilder::<ShutdownNode, i32>::new();
//! let handler = builder
//!     .pipe(stages::require_role("admin"))?
//!     .pipe(stages::validate(|cmd: &ShutdownNode| {
//!         if cmd.node_id.is_empty() {
//!             vec![ValidationFailure::new("node_id", "must not be empty")]
//!         } else {
//!             Vec::new()
//!         }
//!     }))?
//!     .handle(|_envelope, _cancel| async move { Ok(0) })?;
//!
//! let envelope = CommandEnvelope::new(
//!     ShutdownNode { node_id: "node-7".to_string() },
//!     Principal::user("u-1", ["admin"]),
//! );
//! assert_eq!(handler(envelope, CancellationToken::new()).await.unwrap(), 0);
//! # Ok::<(), DispatchError>(())
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-pipeline/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod builder;
mod handler;
pub mod stages;

pub use builder::PipelineBuilder;
pub use handler::{handler_fn, BoxFuture, CommandHandler, Stage};
