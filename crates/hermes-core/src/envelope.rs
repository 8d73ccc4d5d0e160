//! Per-invocation command envelope.
//!
//! A [`CommandEnvelope`] is created once per incoming command and flows
//! through every pipeline stage down to the terminal handler. Stages read
//! the command and principal, and may enrich the envelope with typed
//! extensions for downstream stages; the command payload itself is
//! reachable only by shared reference and cannot be mutated in flight.

use crate::principal::Principal;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;
use uuid::Uuid;

/// A unique identifier for each command invocation, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for invocation tracking
/// and log correlation.
///
/// # Example
///
/// ```
/// use hermes_core::CommandId;
///
/// let id = CommandId::new();
/// println!("Command ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(Uuid);

impl CommandId {
    /// Creates a new unique command ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `CommandId` from an existing UUID.
    ///
    /// Useful when the ID was assigned by an upstream system.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CommandId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for CommandId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<CommandId> for Uuid {
    fn from(id: CommandId) -> Self {
        id.0
    }
}

/// Per-invocation context that flows through the pipeline.
///
/// The envelope wraps a command payload together with the ambient context
/// stages need: the authenticated [`Principal`], a time-ordered
/// [`CommandId`], the acceptance timestamp, and a typed extension map that
/// stages can use to pass data to downstream stages.
///
/// Each invocation gets its own envelope; concurrent invocations of the
/// same pipeline never share one.
///
/// # Example
///
/// ```
/// use hermes_core::{CommandEnvelope, Principal};
///
/// struct Transfer {
///     amount: u64,
/// }
///
/// let envelope = CommandEnvelope::new(Transfer { amount: 250 }, Principal::user("u-1", ["teller"]));
/// assert_eq!(envelope.command().amount, 250);
/// assert!(envelope.principal().is_in_role("teller"));
/// ```
pub struct CommandEnvelope<C> {
    /// The command payload. Read-only for all stages.
    command: C,

    /// The authenticated caller.
    principal: Principal,

    /// Unique identifier for this invocation.
    command_id: CommandId,

    /// When the command was accepted for processing.
    accepted_at: Instant,

    /// Type-erased extension data.
    ///
    /// Stages can attach arbitrary data here using type-safe keys.
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl<C> CommandEnvelope<C> {
    /// Creates a new envelope for a command with a fresh command ID.
    #[must_use]
    pub fn new(command: C, principal: Principal) -> Self {
        Self {
            command,
            principal,
            command_id: CommandId::new(),
            accepted_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Creates an envelope with a specific command ID.
    ///
    /// Useful when the ID was assigned by an upstream system.
    #[must_use]
    pub fn with_command_id(command: C, principal: Principal, command_id: CommandId) -> Self {
        Self {
            command,
            principal,
            command_id,
            accepted_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Returns the command payload.
    #[must_use]
    pub fn command(&self) -> &C {
        &self.command
    }

    /// Returns the authenticated principal.
    #[must_use]
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Returns the command ID.
    #[must_use]
    pub fn command_id(&self) -> CommandId {
        self.command_id
    }

    /// Returns when the command was accepted for processing.
    #[must_use]
    pub fn accepted_at(&self) -> Instant {
        self.accepted_at
    }

    /// Returns the elapsed time since the command was accepted.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.accepted_at.elapsed()
    }

    /// Consumes the envelope, returning the command payload.
    ///
    /// Intended for terminal handlers that need ownership of the payload.
    #[must_use]
    pub fn into_command(self) -> C {
        self.command
    }

    /// Stores a typed extension value.
    ///
    /// Extensions allow a stage to attach data that downstream stages or
    /// the terminal handler can retrieve.
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_core::{CommandEnvelope, Principal};
    ///
    /// #[derive(Clone)]
    /// struct AuditTag(&'static str);
    ///
    /// let mut envelope = CommandEnvelope::new((), Principal::anonymous());
    /// envelope.set_extension(AuditTag("bulk-import"));
    ///
    /// let tag = envelope.get_extension::<AuditTag>().unwrap();
    /// assert_eq!(tag.0, "bulk-import");
    /// ```
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    ///
    /// Returns `None` if no extension of the given type was stored.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Checks if an extension of the given type exists.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}

impl<C: fmt::Debug> fmt::Debug for CommandEnvelope<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEnvelope")
            .field("command", &self.command)
            .field("principal", &self.principal)
            .field("command_id", &self.command_id)
            .field("extensions", &self.extensions.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct TestCommand {
        value: i32,
    }

    #[test]
    fn test_command_id_is_unique() {
        let a = CommandId::new();
        let b = CommandId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_command_id_display_round_trip() {
        let id = CommandId::new();
        let parsed: Uuid = id.to_string().parse().expect("should parse");
        assert_eq!(CommandId::from(parsed), id);
    }

    #[test]
    fn test_envelope_exposes_command_and_principal() {
        let envelope = CommandEnvelope::new(
            TestCommand { value: 7 },
            Principal::user("u-1", ["admin"]),
        );
        assert_eq!(envelope.command(), &TestCommand { value: 7 });
        assert!(envelope.principal().is_in_role("admin"));
    }

    #[test]
    fn test_into_command() {
        let envelope = CommandEnvelope::new(TestCommand { value: 3 }, Principal::anonymous());
        assert_eq!(envelope.into_command(), TestCommand { value: 3 });
    }

    #[test]
    fn test_with_command_id() {
        let id = CommandId::new();
        let envelope = CommandEnvelope::with_command_id((), Principal::anonymous(), id);
        assert_eq!(envelope.command_id(), id);
    }

    #[test]
    fn test_extensions() {
        #[derive(Debug, Clone, PartialEq)]
        struct Marker {
            value: i32,
        }

        let mut envelope = CommandEnvelope::new((), Principal::anonymous());

        assert!(!envelope.has_extension::<Marker>());
        assert!(envelope.get_extension::<Marker>().is_none());

        envelope.set_extension(Marker { value: 42 });
        assert!(envelope.has_extension::<Marker>());
        assert_eq!(
            envelope.get_extension::<Marker>(),
            Some(&Marker { value: 42 })
        );

        let removed = envelope.remove_extension::<Marker>();
        assert_eq!(removed, Some(Marker { value: 42 }));
        assert!(!envelope.has_extension::<Marker>());
    }

    #[test]
    fn test_elapsed_time() {
        let envelope = CommandEnvelope::new((), Principal::anonymous());
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(envelope.elapsed() >= std::time::Duration::from_millis(5));
    }
}
