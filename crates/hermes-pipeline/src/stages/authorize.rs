//! Authorization stages.
//!
//! [`require_role`] is the common case: reject any invocation whose
//! principal does not hold a given role. [`authorize`] is the general
//! form, delegating the decision to a caller-supplied policy over the
//! whole envelope.
//!
//! Both stages short-circuit: on a deny, the next handler is never
//! invoked and the invoker receives [`DispatchError::Unauthorized`].

use crate::handler::CommandHandler;
use hermes_core::{CommandEnvelope, DispatchError};
use std::sync::Arc;

/// The outcome of an authorization policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// The invocation may proceed.
    Allow,
    /// The invocation is rejected.
    Deny {
        /// The reason for denial, surfaced to the caller.
        reason: String,
    },
}

/// Returns a stage that rejects principals lacking `role`.
///
/// If the envelope's principal does not hold the role, the stage fails
/// with [`DispatchError::Unauthorized`] carrying the missing role, and
/// the next handler is never invoked. Otherwise the invocation passes
/// through unchanged.
///
/// # Example
///
/// ```
/// use hermes_core::{CommandEnvelope, DispatchError, Principal};
/// use hermes_pipeline::{stages, PipelineBuilder};
///
/// # tokio_test::block_on(async {
/// let mut builder = PipelineBuilder::<(), i32>::new();
/// let handler = builder
///     .pipe(stages::require_role("admin"))?
///     .handle(|_envelope, _cancel| async move { Ok(0) })?;
///
/// let envelope = CommandEnvelope::new((), Principal::user("u-1", ["viewer"]));
/// let result = handler(envelope, tokio_util::sync::CancellationToken::new()).await;
/// assert!(matches!(result, Err(DispatchError::Unauthorized { .. })));
/// # Ok::<(), DispatchError>(())
/// # });
/// ```
pub fn require_role<C, R>(
    role: impl Into<String>,
) -> impl FnOnce(CommandHandler<C, R>) -> CommandHandler<C, R> + Send + 'static
where
    C: Send + Sync + 'static,
    R: Send + 'static,
{
    let role = role.into();
    move |next: CommandHandler<C, R>| -> CommandHandler<C, R> {
        Arc::new(move |envelope: CommandEnvelope<C>, cancel| {
            if cancel.is_cancelled() {
                return Box::pin(std::future::ready(Err(DispatchError::Cancelled)));
            }
            if !envelope.principal().is_in_role(&role) {
                tracing::warn!(
                    role = %role,
                    principal = %envelope.principal().log_id(),
                    command_id = %envelope.command_id(),
                    "role check failed"
                );
                return Box::pin(std::future::ready(Err(DispatchError::unauthorized_role(
                    role.clone(),
                ))));
            }
            next(envelope, cancel)
        })
    }
}

/// Returns a stage that defers the authorization decision to `policy`.
///
/// The policy sees the whole envelope, so it can combine the principal
/// with the command payload or with context attached by earlier stages.
/// A [`AccessDecision::Deny`] short-circuits with
/// [`DispatchError::Unauthorized`] carrying the reason.
pub fn authorize<C, R, P>(
    policy: P,
) -> impl FnOnce(CommandHandler<C, R>) -> CommandHandler<C, R> + Send + 'static
where
    C: Send + Sync + 'static,
    R: Send + 'static,
    P: Fn(&CommandEnvelope<C>) -> AccessDecision + Send + Sync + 'static,
{
    move |next: CommandHandler<C, R>| -> CommandHandler<C, R> {
        Arc::new(move |envelope: CommandEnvelope<C>, cancel| {
            if cancel.is_cancelled() {
                return Box::pin(std::future::ready(Err(DispatchError::Cancelled)));
            }
            match policy(&envelope) {
                AccessDecision::Allow => next(envelope, cancel),
                AccessDecision::Deny { reason } => {
                    tracing::warn!(
                        principal = %envelope.principal().log_id(),
                        command_id = %envelope.command_id(),
                        reason = %reason,
                        "authorization denied"
                    );
                    Box::pin(std::future::ready(Err(DispatchError::unauthorized(
                        reason,
                    ))))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::PipelineBuilder;
    use hermes_core::Principal;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_util::sync::CancellationToken;

    fn counting_pipeline(
        role: &str,
        calls: Arc<AtomicUsize>,
    ) -> CommandHandler<(), i32> {
        let mut builder = PipelineBuilder::<(), i32>::new();
        builder.pipe(require_role(role)).unwrap();
        builder
            .handle(move |_envelope, _cancel| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(0)
                }
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_principal_with_role_passes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = counting_pipeline("admin", calls.clone());

        let envelope = CommandEnvelope::new((), Principal::user("u-1", ["admin"]));
        let result = handler(envelope, CancellationToken::new()).await;
        assert_eq!(result.unwrap(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_principal_without_role_is_rejected() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = counting_pipeline("admin", calls.clone());

        let envelope = CommandEnvelope::new((), Principal::user("u-1", ["viewer"]));
        let result = handler(envelope, CancellationToken::new()).await;
        match result {
            Err(DispatchError::Unauthorized { required_role, .. }) => {
                assert_eq!(required_role.as_deref(), Some("admin"));
            }
            _ => panic!("expected Unauthorized"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_anonymous_principal_is_rejected() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = counting_pipeline("admin", calls.clone());

        let envelope = CommandEnvelope::new((), Principal::anonymous());
        let result = handler(envelope, CancellationToken::new()).await;
        assert!(matches!(result, Err(DispatchError::Unauthorized { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_custom_policy_allow_and_deny() {
        let mut builder = PipelineBuilder::<u32, u32>::new();
        builder
            .pipe(authorize(|envelope: &CommandEnvelope<u32>| {
                if *envelope.command() < 100 {
                    AccessDecision::Allow
                } else {
                    AccessDecision::Deny {
                        reason: "amount over limit".to_string(),
                    }
                }
            }))
            .unwrap();
        let handler = builder
            .handle(|envelope: CommandEnvelope<u32>, _cancel| async move {
                Ok(*envelope.command())
            })
            .unwrap();

        let small = CommandEnvelope::new(42, Principal::anonymous());
        assert_eq!(handler(small, CancellationToken::new()).await.unwrap(), 42);

        let large = CommandEnvelope::new(500, Principal::anonymous());
        match handler(large, CancellationToken::new()).await {
            Err(DispatchError::Unauthorized { message, .. }) => {
                assert!(message.contains("amount over limit"));
            }
            _ => panic!("expected Unauthorized"),
        }
    }

    #[tokio::test]
    async fn test_cancelled_before_guard() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = counting_pipeline("admin", calls.clone());

        let token = CancellationToken::new();
        token.cancel();
        let envelope = CommandEnvelope::new((), Principal::user("u-1", ["admin"]));
        let result = handler(envelope, token).await;
        assert!(matches!(result, Err(DispatchError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
