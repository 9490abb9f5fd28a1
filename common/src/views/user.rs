use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// The unique identifier for this user.
    pub id: String,

    /// The user's login name.
    pub username: String,

    /// Whether this user is a platform administrator.
    pub is_admin: bool,

    pub created_at: DateTime<Utc>,
}
