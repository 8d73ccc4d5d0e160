//! Command module registration.
//!
//! A [`CommandModule`] groups the composed pipelines for a set of
//! related commands, keyed by [`Command::NAME`]. Modules are populated
//! once at startup and then handed to the dispatcher; they are not
//! mutated afterwards.

use hermes_core::{Command, DispatchError};
use hermes_pipeline::CommandHandler;
use std::any::Any;
use std::collections::HashMap;

/// A composed handler stored under its command name.
///
/// The handler is type-erased so that handlers for different command
/// types can live in one map; the dispatcher recovers the concrete type
/// at dispatch time.
pub(crate) struct RegisteredHandler {
    /// The command name the handler was registered under.
    pub(crate) command: &'static str,

    /// The erased `CommandHandler<C, R>`.
    pub(crate) handler: Box<dyn Any + Send + Sync>,
}

/// A named group of command handlers, populated at startup.
///
/// # Example
///
/// ```
/// use hermes_core::{Command, DispatchError};
/// use hermes_dispatch::CommandModule;
/// use hermes_pipeline::{stages, PipelineBuilder};
///
/// struct Reboot;
///
/// impl Command for Reboot {
///     const NAME: &'static str = "reboot";
/// }
///
/// # fn main() -> Result<(), DispatchError> {
/// let mut builder = PipelineBuilder::<Reboot, i32>::new();
/// let handler = builder
///     .pipe(stages::require_role("admin"))?
///     .handle(|_envelope, _cancel| async move { Ok(0) })?;
///
/// let mut module = CommandModule::new("infra");
/// module.register::<Reboot, i32>(handler)?;
/// assert!(module.handles("reboot"));
/// # Ok(())
/// # }
/// ```
pub struct CommandModule {
    name: &'static str,
    handlers: HashMap<&'static str, RegisteredHandler>,
}

impl CommandModule {
    /// Creates an empty module. The name appears in logs only.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            handlers: HashMap::new(),
        }
    }

    /// Returns the module name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Registers a composed handler for command type `C`.
    ///
    /// The handler is stored under [`Command::NAME`]; the result type `R`
    /// must match the one the dispatch site asks for.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::DuplicateHandler`] if a handler for
    /// `C::NAME` is already registered in this module.
    pub fn register<C, R>(
        &mut self,
        handler: CommandHandler<C, R>,
    ) -> Result<&mut Self, DispatchError>
    where
        C: Command,
        R: Send + 'static,
    {
        if self.handlers.contains_key(C::NAME) {
            return Err(DispatchError::DuplicateHandler { command: C::NAME });
        }
        tracing::debug!(module = self.name, command = C::NAME, "handler registered");
        self.handlers.insert(
            C::NAME,
            RegisteredHandler {
                command: C::NAME,
                handler: Box::new(handler),
            },
        );
        Ok(self)
    }

    /// Returns `true` if this module has a handler for `command`.
    #[must_use]
    pub fn handles(&self, command: &str) -> bool {
        self.handlers.contains_key(command)
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

    pub(crate) fn into_handlers(self) -> HashMap<&'static str, RegisteredHandler> {
        self.handlers
    }
}

impl std::fmt::Debug for CommandModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut commands: Vec<_> = self.handlers.keys().collect();
        commands.sort_unstable();
        f.debug_struct("CommandModule")
            .field("name", &self.name)
            .field("commands", &commands)
            .finish()
    }
}
