//! Command marker trait.

/// Marker trait for command payload types.
///
/// A command is an opaque, immutable payload uniquely identified by its
/// type. The associated [`NAME`](Command::NAME) is the explicit
/// command-type identifier used as the key in the dispatch table, so it
/// must be unique across all registered commands.
///
/// # Example
///
/// ```
/// use hermes_core::Command;
///
/// struct DeactivateAccount {
///     account_id: String,
/// }
///
/// impl Command for DeactivateAccount {
///     const NAME: &'static str = "deactivateAccount";
/// }
///
/// assert_eq!(DeactivateAccount::NAME, "deactivateAccount");
/// ```
pub trait Command: Send + Sync + 'static {
    /// Stable identifier for this command type.
    const NAME: &'static str;
}
