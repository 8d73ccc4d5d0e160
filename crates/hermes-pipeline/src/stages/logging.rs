//! Invocation logging stage.
//!
//! Unlike the guard stages, this stage never short-circuits: it records
//! entry, delegates, and logs the outcome with the elapsed time on the
//! way out. It is the post-processing half of the guard-then-delegate
//! shape.

use crate::handler::CommandHandler;
use hermes_core::{Command, CommandEnvelope};
use std::sync::Arc;
use std::time::Instant;

/// Returns a stage that logs invocation entry and outcome via `tracing`.
///
/// Place it first in the pipeline to observe the full invocation,
/// including rejections by later guard stages.
pub fn log_invocation<C, R>() -> impl FnOnce(CommandHandler<C, R>) -> CommandHandler<C, R> + Send + 'static
where
    C: Command,
    R: Send + 'static,
{
    move |next: CommandHandler<C, R>| -> CommandHandler<C, R> {
        Arc::new(move |envelope: CommandEnvelope<C>, cancel| {
            tracing::debug!(
                command = C::NAME,
                command_id = %envelope.command_id(),
                principal = %envelope.principal().log_id(),
                "command accepted"
            );
            let command_id = envelope.command_id();
            let started = Instant::now();
            let fut = next(envelope, cancel);
            Box::pin(async move {
                let result = fut.await;
                let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                match &result {
                    Ok(_) => tracing::debug!(
                        command = C::NAME,
                        %command_id,
                        elapsed_ms,
                        "command completed"
                    ),
                    Err(err) => tracing::warn!(
                        command = C::NAME,
                        %command_id,
                        elapsed_ms,
                        error = %err,
                        "command failed"
                    ),
                }
                result
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::PipelineBuilder;
    use crate::stages::require_role;
    use hermes_core::{DispatchError, Principal};
    use tokio_util::sync::CancellationToken;

    struct Noop;

    impl Command for Noop {
        const NAME: &'static str = "noop";
    }

    #[tokio::test]
    async fn test_logging_passes_result_through() {
        let mut builder = PipelineBuilder::<Noop, i32>::new();
        builder.pipe(log_invocation()).unwrap();
        let handler = builder
            .handle(|_envelope, _cancel| async move { Ok(7) })
            .unwrap();

        let envelope = CommandEnvelope::new(Noop, Principal::anonymous());
        let result = handler(envelope, CancellationToken::new()).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_logging_observes_downstream_rejection() {
        let mut builder = PipelineBuilder::<Noop, i32>::new();
        builder
            .pipe(log_invocation())
            .unwrap()
            .pipe(require_role("admin"))
            .unwrap();
        let handler = builder
            .handle(|_envelope, _cancel| async move { Ok(0) })
            .unwrap();

        let envelope = CommandEnvelope::new(Noop, Principal::anonymous());
        let result = handler(envelope, CancellationToken::new()).await;
        assert!(matches!(result, Err(DispatchError::Unauthorized { .. })));
    }
}
