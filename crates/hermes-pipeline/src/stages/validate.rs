//! Command validation stage.
//!
//! The validator sees the command payload only; one or more failures
//! short-circuit the pipeline with [`DispatchError::ValidationFailed`]
//! carrying the full failure list, and the next handler is never invoked.

use crate::handler::CommandHandler;
use hermes_core::{CommandEnvelope, DispatchError, ValidationFailure};
use std::sync::Arc;

/// Returns a stage that validates the command payload with `validator`.
///
/// The validator returns an ordered list of failures; an empty list means
/// the payload is valid and the invocation delegates to the next handler
/// unchanged. A non-empty list fails the invocation fast with
/// [`DispatchError::ValidationFailed`] carrying exactly those failures.
///
/// # Example
///
/// ```
/// use hermes_core::{CommandEnvelope, DispatchError, Principal, ValidationFailure};
/// use hermes_pipeline::{stages, PipelineBuilder};
///
/// struct Transfer {
///     amount: i64,
/// }
///
/// # tokio_test::block_on(async {
/// let mut builder = PipelineBuilder::<Transfer, i32>::new();
/// let handler = builder
///     .pipe(stages::validate(|cmd: &Transfer| {
///         if cmd.amount <= 0 {
///             vec![ValidationFailure::new("amount", "must be positive")]
///         } else {
///             Vec::new()
///         }
///     }))?
///     .handle(|_envelope, _cancel| async move { Ok(0) })?;
///
/// let envelope = CommandEnvelope::new(Transfer { amount: -5 }, Principal::anonymous());
/// let result = handler(envelope, tokio_util::sync::CancellationToken::new()).await;
/// assert!(matches!(result, Err(DispatchError::ValidationFailed { .. })));
/// # Ok::<(), DispatchError>(())
/// # });
/// ```
pub fn validate<C, R, V>(
    validator: V,
) -> impl FnOnce(CommandHandler<C, R>) -> CommandHandler<C, R> + Send + 'static
where
    C: Send + Sync + 'static,
    R: Send + 'static,
    V: Fn(&C) -> Vec<ValidationFailure> + Send + Sync + 'static,
{
    move |next: CommandHandler<C, R>| -> CommandHandler<C, R> {
        Arc::new(move |envelope: CommandEnvelope<C>, cancel| {
            if cancel.is_cancelled() {
                return Box::pin(std::future::ready(Err(DispatchError::Cancelled)));
            }
            let failures = validator(envelope.command());
            if !failures.is_empty() {
                tracing::debug!(
                    command_id = %envelope.command_id(),
                    failures = failures.len(),
                    "command validation failed"
                );
                return Box::pin(std::future::ready(Err(
                    DispatchError::validation_failed(failures),
                )));
            }
            next(envelope, cancel)
        })
    }
}
