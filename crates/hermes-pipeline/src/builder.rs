//! Per-command-type pipeline builder.
//!
//! A [`PipelineBuilder`] accumulates middleware stages in registration
//! order for one command type, then finalizes them with a terminal
//! handler. Finalization folds the stage list right-to-left around the
//! terminal handler, so the first-registered stage is outermost: it
//! executes first on the way in and last on the way out.
//!
//! ```text
//! invoke → stage[0] → stage[1] → ... → stage[n-1] → terminal handler
//!                                                        ↓
//! result ← stage[0] ← stage[1] ← ... ← stage[n-1] ←──────┘
//! ```
//!
//! The builder is a registration-phase object: it is mutated while the
//! dispatch table is being populated at startup and discarded once the
//! composed handler is produced. The composed handler is long-lived,
//! immutable, and safe to invoke concurrently.

use crate::handler::{handler_fn, CommandHandler, Stage};
use hermes_core::{CommandEnvelope, DispatchError};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Builder that composes middleware stages around a terminal handler for
/// one command type.
///
/// # Example
///
/// ```
/// use hermes_core::{CommandEnvelope, DispatchError, Principal};
/// use hermes_pipeline::{stages, PipelineBuilder};
///
/// struct Reboot;
///
/// # tokio_test::block_on(async {
/// let mut builder = PipelineBuilder::<Reboot, i32>::new();
/// let handler = builder
///     .pipe(stages::require_role("admin"))?
///     .handle(|_envelope, _cancel| async move { Ok(0) })?;
///
/// let envelope = CommandEnvelope::new(Reboot, Principal::user("u-1", ["admin"]));
/// let result = handler(envelope, tokio_util::sync::CancellationToken::new()).await;
/// assert_eq!(result.unwrap(), 0);
/// # Ok::<(), DispatchError>(())
/// # });
/// ```
pub struct PipelineBuilder<C, R> {
    /// Stages in registration order; first entry is outermost.
    stages: Vec<Stage<C, R>>,

    /// Set by [`handle`](Self::handle); any later use fails with
    /// [`DispatchError::BuilderFinalized`].
    finalized: bool,
}

impl<C, R> PipelineBuilder<C, R>
where
    C: Send + Sync + 'static,
    R: Send + 'static,
{
    /// Creates a new builder with an empty stage list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            finalized: false,
        }
    }

    /// Appends a stage to the pipeline.
    ///
    /// Stages execute in registration order on the way in and in reverse
    /// order on the way out. Appending has no side effects beyond
    /// extending the stage list.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::BuilderFinalized`] if
    /// [`handle`](Self::handle) was already called.
    pub fn pipe<S>(&mut self, stage: S) -> Result<&mut Self, DispatchError>
    where
        S: FnOnce(CommandHandler<C, R>) -> CommandHandler<C, R> + Send + 'static,
    {
        if self.finalized {
            return Err(DispatchError::BuilderFinalized);
        }
        self.stages.push(Box::new(stage));
        Ok(self)
    }

    /// Finalizes the builder with a terminal handler, returning the
    /// composed pipeline.
    ///
    /// The stage list is folded right-to-left around `terminal`, so that
    /// `composed = stages[0](stages[1](... stages[n-1](terminal)))`. The
    /// composed handler additionally checks the cancellation token on
    /// entry: an already-cancelled invocation fails with
    /// [`DispatchError::Cancelled`] without entering any stage.
    ///
    /// The builder becomes unusable afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::BuilderFinalized`] if called a second
    /// time.
    pub fn handle<F, Fut>(&mut self, terminal: F) -> Result<CommandHandler<C, R>, DispatchError>
    where
        F: Fn(CommandEnvelope<C>, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, DispatchError>> + Send + 'static,
    {
        if self.finalized {
            return Err(DispatchError::BuilderFinalized);
        }
        self.finalized = true;

        let mut composed = handler_fn(terminal);
        for stage in self.stages.drain(..).rev() {
            composed = stage(composed);
        }

        let inner = composed;
        Ok(std::sync::Arc::new(move |envelope, cancel| {
            if cancel.is_cancelled() {
                return Box::pin(std::future::ready(Err(DispatchError::Cancelled)));
            }
            inner(envelope, cancel)
        }))
    }

    /// Returns the number of stages registered so far.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if the builder has been finalized.
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}

impl<C, R> std::fmt::Debug for PipelineBuilder<C, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("stages", &self.stages.len())
            .field("finalized", &self.finalized)
            .finish()
    }
}

impl<C, R> Default for PipelineBuilder<C, R>
where
    C: Send + Sync + 'static,
    R: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
