//! Concrete pipeline stages.
//!
//! Every stage here is an instance of the guard-then-delegate shape the
//! pipeline exists to support: inspect the envelope, short-circuit with a
//! failure or delegate to the next handler, and optionally post-process
//! the result on the way out. New cross-cutting concerns (metrics, retry)
//! follow the identical shape.

pub mod authorize;
pub mod logging;
pub mod validate;

pub use authorize::{authorize, require_role, AccessDecision};
pub use logging::log_invocation;
pub use validate::validate;
