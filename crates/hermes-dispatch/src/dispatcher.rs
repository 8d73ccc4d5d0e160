//! Keyed command dispatch.
//!
//! The [`Dispatcher`] owns the full handler map assembled from one or
//! more modules at startup. Dispatch is a map lookup by
//! [`Command::NAME`] followed by a downcast back to the concrete
//! handler type, then a straight pipeline invocation.

use crate::module::{CommandModule, RegisteredHandler};
use hermes_core::{Command, CommandEnvelope, DispatchError, Principal};
use hermes_pipeline::CommandHandler;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

/// Immutable dispatch table over all registered command handlers.
///
/// Built once from the application's modules, then shared for the
/// lifetime of the process. Dispatching is `&self` and safe to call
/// concurrently.
///
/// # Example
///
/// ```
/// use hermes_core::{Command, DispatchError, Principal};
/// use hermes_dispatch::{CommandModule, Dispatcher};
/// use hermes_pipeline::{stages, PipelineBuilder};
/// use tokio_util::sync::CancellationToken;
///
/// struct Reboot;
///
/// impl Command for Reboot {
///     const NAME: &'static str = "reboot";
/// }
///
/// # tokio_test::block_on(async {
/// let mut builder = PipelineBuilder::<Reboot, i32>::new();
/// let handler = builder
///     .pipe(stages::require_role("admin"))?
///     .handle(|_envelope, _cancel| async move { Ok(0) })?;
///
/// let mut module = CommandModule::new("infra");
/// module.register::<Reboot, i32>(handler)?;
/// let dispatcher = Dispatcher::from_modules([module])?;
///
/// let result: i32 = dispatcher
///     .dispatch(Reboot, Principal::user("u-1", ["admin"]), CancellationToken::new())
///     .await?;
/// assert_eq!(result, 0);
/// # Ok::<(), DispatchError>(())
/// # });
/// ```
pub struct Dispatcher {
    handlers: HashMap<&'static str, RegisteredHandler>,
}

impl Dispatcher {
    /// Builds the dispatch table from a set of modules.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::DuplicateHandler`] if two modules
    /// register the same command name.
    pub fn from_modules(
        modules: impl IntoIterator<Item = CommandModule>,
    ) -> Result<Self, DispatchError> {
        let mut handlers = HashMap::new();
        for module in modules {
            for (command, registered) in module.into_handlers() {
                if handlers.contains_key(command) {
                    return Err(DispatchError::DuplicateHandler { command });
                }
                handlers.insert(command, registered);
            }
        }
        tracing::info!(commands = handlers.len(), "dispatch table built");
        Ok(Self { handlers })
    }

    /// Builds the dispatch table from a single module.
    #[must_use]
    pub fn from_module(module: CommandModule) -> Self {
        let handlers = module.into_handlers();
        tracing::info!(commands = handlers.len(), "dispatch table built");
        Self { handlers }
    }

    /// Dispatches `command` on behalf of `principal`.
    ///
    /// Wraps the command in a fresh [`CommandEnvelope`] and invokes the
    /// composed pipeline registered for `C::NAME`. The result type `R`
    /// must match the registration.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnregisteredCommand`] if no handler is
    /// registered for `C::NAME`, a handler error if the registered
    /// result type differs from `R`, or whatever the pipeline itself
    /// fails with.
    pub async fn dispatch<C, R>(
        &self,
        command: C,
        principal: Principal,
        cancel: CancellationToken,
    ) -> Result<R, DispatchError>
    where
        C: Command,
        R: Send + 'static,
    {
        let envelope = CommandEnvelope::new(command, principal);
        self.dispatch_envelope(envelope, cancel).await
    }

    /// Dispatches a pre-built envelope.
    ///
    /// Use this instead of [`dispatch`](Self::dispatch) when the caller
    /// needs to pin the command id or attach extensions before the
    /// pipeline runs.
    ///
    /// # Errors
    ///
    /// Same as [`dispatch`](Self::dispatch).
    pub async fn dispatch_envelope<C, R>(
        &self,
        envelope: CommandEnvelope<C>,
        cancel: CancellationToken,
    ) -> Result<R, DispatchError>
    where
        C: Command,
        R: Send + 'static,
    {
        let registered = self
            .handlers
            .get(C::NAME)
            .ok_or(DispatchError::UnregisteredCommand { command: C::NAME })?;

        let handler = registered
            .handler
            .downcast_ref::<CommandHandler<C, R>>()
            .ok_or_else(|| {
                DispatchError::handler(format!(
                    "handler for `{}` was registered with a different result type",
                    registered.command
                ))
            })?;

        tracing::debug!(
            command = C::NAME,
            command_id = %envelope.command_id(),
            principal = %envelope.principal().log_id(),
            "dispatching command"
        );
        handler(envelope, cancel).await
    }

    /// Returns `true` if a handler is registered for `command`.
    #[must_use]
    pub fn handles(&self, command: &str) -> bool {
        self.handlers.contains_key(command)
    }

    /// Returns the registered command names in arbitrary order.
    pub fn commands(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut commands: Vec<_> = self.handlers.keys().collect();
        commands.sort_unstable();
        f.debug_struct("Dispatcher")
            .field("commands", &commands)
            .finish()
    }
}
