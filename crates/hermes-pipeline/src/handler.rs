//! Handler and stage contracts.
//!
//! This module defines the two function shapes the pipeline is built
//! from. A [`CommandHandler`] is an invocable unit of work for one
//! command type; a [`Stage`] is a decorator that receives the next
//! handler in the chain and returns a new handler wrapping it.
//!
//! # Invariants
//!
//! - A stage MUST either delegate to `next` exactly once or short-circuit
//!   with a failure; it never invokes `next` twice
//! - A stage MUST NOT mutate the command payload; context enrichment goes
//!   through the envelope's typed extensions
//! - The composed handler is immutable and safe to invoke concurrently
//!   for independent envelopes

use hermes_core::{CommandEnvelope, DispatchError};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A boxed future, the output of every handler invocation.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An invocable handler for commands of type `C`, producing `R`.
///
/// Both the terminal handler and the composed pipeline have this type, so
/// stages compose uniformly: wrapping a handler yields another handler.
/// The cancellation token is threaded through every invocation; handlers
/// observe it cooperatively at their own suspension points.
pub type CommandHandler<C, R> = Arc<
    dyn Fn(CommandEnvelope<C>, CancellationToken) -> BoxFuture<'static, Result<R, DispatchError>>
        + Send
        + Sync,
>;

/// A pipeline stage: a function that decorates the next handler.
///
/// Stages follow the guard-then-delegate shape: inspect the envelope,
/// decide to short-circuit or delegate, and optionally post-process the
/// delegate's result on the way out. The concrete stages in
/// [`crate::stages`] are all instances of this one contract.
pub type Stage<C, R> = Box<dyn FnOnce(CommandHandler<C, R>) -> CommandHandler<C, R> + Send>;

/// Wraps an async function as a [`CommandHandler`].
///
/// # Example
///
/// ```
/// use hermes_core::{CommandEnvelope, Principal};
/// use hermes_pipeline::handler_fn;
///
/// let handler = handler_fn(|envelope: CommandEnvelope<u32>, _cancel| async move {
///     Ok(*envelope.command() * 2)
/// });
///
/// # tokio_test::block_on(async {
/// let envelope = CommandEnvelope::new(21, Principal::anonymous());
/// let result = handler(envelope, tokio_util::sync::CancellationToken::new()).await;
/// assert_eq!(result.unwrap(), 42);
/// # });
/// ```
pub fn handler_fn<C, R, F, Fut>(f: F) -> CommandHandler<C, R>
where
    C: Send + 'static,
    R: Send + 'static,
    F: Fn(CommandEnvelope<C>, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, DispatchError>> + Send + 'static,
{
    Arc::new(move |envelope, cancel| Box::pin(f(envelope, cancel)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::Principal;

    #[tokio::test]
    async fn test_handler_fn_invokes_function() {
        let handler = handler_fn(|envelope: CommandEnvelope<i32>, _cancel| async move {
            Ok(*envelope.command() + 1)
        });

        let envelope = CommandEnvelope::new(41, Principal::anonymous());
        let result = handler(envelope, CancellationToken::new()).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_handler_is_reinvocable() {
        let handler =
            handler_fn(|envelope: CommandEnvelope<i32>, _cancel| async move {
                Ok(*envelope.command())
            });

        for value in 0..3 {
            let envelope = CommandEnvelope::new(value, Principal::anonymous());
            let result = handler(envelope, CancellationToken::new()).await;
            assert_eq!(result.unwrap(), value);
        }
    }

    #[tokio::test]
    async fn test_stage_wraps_handler() {
        let terminal =
            handler_fn(|_envelope: CommandEnvelope<()>, _cancel| async move { Ok(1_i32) });

        let doubling: Stage<(), i32> = Box::new(|next: CommandHandler<(), i32>| {
            Arc::new(move |envelope, cancel| {
                let fut = next(envelope, cancel);
                Box::pin(async move { fut.await.map(|r| r * 2) })
            })
        });

        let wrapped = doubling(terminal);
        let envelope = CommandEnvelope::new((), Principal::anonymous());
        let result = wrapped(envelope, CancellationToken::new()).await;
        assert_eq!(result.unwrap(), 2);
    }
}
