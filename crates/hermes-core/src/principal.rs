//! Authenticated caller identity.
//!
//! The [`Principal`] attached to each envelope is what authorization
//! stages consult when deciding whether to let an invocation proceed.

use serde::{Deserialize, Serialize};

/// The authenticated principal on whose behalf a command is executed.
///
/// Role checks performed by authorization stages read the roles carried
/// here; a principal without the required role is rejected before the
/// terminal handler runs.
///
/// # Example
///
/// ```
/// use hermes_core::Principal;
///
/// let admin = Principal::user("u-123", ["admin"]);
/// assert!(admin.is_in_role("admin"));
/// assert!(!admin.is_in_role("auditor"));
/// assert!(!Principal::anonymous().is_in_role("admin"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Principal {
    /// An authenticated end user.
    User {
        /// Unique user identifier.
        user_id: String,
        /// Roles held by the user.
        roles: Vec<String>,
    },
    /// An authenticated peer service.
    Service {
        /// Logical service name.
        service_name: String,
        /// Roles granted to the service.
        roles: Vec<String>,
    },
    /// An unauthenticated caller. Holds no roles.
    Anonymous,
}

impl Principal {
    /// Creates a user principal with the given roles.
    #[must_use]
    pub fn user<I>(user_id: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::User {
            user_id: user_id.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a service principal with the given roles.
    #[must_use]
    pub fn service<I>(service_name: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::Service {
            service_name: service_name.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates an anonymous principal.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self::Anonymous
    }

    /// Returns the roles held by this principal.
    ///
    /// Anonymous callers hold no roles.
    #[must_use]
    pub fn roles(&self) -> &[String] {
        match self {
            Self::User { roles, .. } | Self::Service { roles, .. } => roles,
            Self::Anonymous => &[],
        }
    }

    /// Returns `true` if this principal holds the given role.
    #[must_use]
    pub fn is_in_role(&self, role: &str) -> bool {
        self.roles().iter().any(|r| r == role)
    }

    /// Returns a string identifier suitable for logging.
    ///
    /// This never returns sensitive information like credentials.
    #[must_use]
    pub fn log_id(&self) -> String {
        match self {
            Self::User { user_id, .. } => format!("user:{user_id}"),
            Self::Service { service_name, .. } => format!("service:{service_name}"),
            Self::Anonymous => "anonymous".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_roles() {
        let principal = Principal::user("u-1", ["admin", "operator"]);
        assert_eq!(principal.roles(), ["admin", "operator"]);
        assert!(principal.is_in_role("admin"));
        assert!(principal.is_in_role("operator"));
        assert!(!principal.is_in_role("auditor"));
    }

    #[test]
    fn test_service_roles() {
        let principal = Principal::service("billing", ["invoicing"]);
        assert!(principal.is_in_role("invoicing"));
        assert!(!principal.is_in_role("admin"));
    }

    #[test]
    fn test_anonymous_has_no_roles() {
        let principal = Principal::anonymous();
        assert!(principal.roles().is_empty());
        assert!(!principal.is_in_role("admin"));
    }

    #[test]
    fn test_log_id() {
        assert_eq!(Principal::user("u-1", ["admin"]).log_id(), "user:u-1");
        assert_eq!(
            Principal::service("billing", Vec::<String>::new()).log_id(),
            "service:billing"
        );
        assert_eq!(Principal::anonymous().log_id(), "anonymous");
    }

    #[test]
    fn test_serialization_round_trip() {
        let principal = Principal::user("u-1", ["admin"]);
        let json = serde_json::to_string(&principal).expect("serialization should work");
        assert!(json.contains("\"type\":\"user\""));
        assert!(json.contains("\"user_id\":\"u-1\""));

        let parsed: Principal = serde_json::from_str(&json).expect("deserialization should work");
        assert_eq!(principal, parsed);
    }
}
