use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum CallerError {
    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("Caller may not perform {action}")]
    Forbidden { action: String },
}

impl CallerError {
    pub fn unauthorized(reason: Option<String>) -> Self {
        Self::Unauthorized {
            reason: reason.unwrap_or_else(|| "No reason provided".to_string()),
        }
    }

    pub fn forbidden(action: &str) -> Self {
        Self::Forbidden {
            action: action.into(),
        }
    }
}

/// Platform-wide roles. Roles are independent of any particular app; access to
/// an app's certificates is decided by the [`crate::guard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May manage every app on the platform.
    Admin,
}

/// The identity a request runs as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    User {
        id: String,
        username: String,
        roles: Vec<Role>,
    },

    /// Internal callers such as startup bootstrap and `berthctl`.
    System,
}

impl Caller {
    /// The user ID for this caller, if it is a user.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Caller::User { id, .. } => Some(id),
            Caller::System => None,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        match self {
            Caller::User { roles, .. } => roles.contains(&role),
            Caller::System => true,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

impl std::fmt::Display for Caller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Caller::User { username, .. } => write!(f, "user:{username}"),
            Caller::System => write!(f, "system"),
        }
    }
}
