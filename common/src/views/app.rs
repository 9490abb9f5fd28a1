use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An app owns the certificates attached to it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct App {
    /// The app's name, unique across the platform.
    pub id: String,

    /// Username of the user that created the app.
    pub owner: String,

    /// Usernames of the users sharing access to the app.
    pub collaborators: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
