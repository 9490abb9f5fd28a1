use berth_common::{guard::OwnedResource, views::App};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// A user as referenced from an app: by ID for access checks, by username
/// for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMember {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbApp {
    /// The app's name, which doubles as its identifier.
    #[serde(rename = "_id")]
    pub id: String,

    /// Identifies this incarnation of the app. Names can be reused after a
    /// delete; certificates are keyed by this instead.
    pub uid: Ulid,

    pub owner: AppMember,

    #[serde(default)]
    pub collaborators: Vec<AppMember>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl DbApp {
    pub fn new(id: String, owner: AppMember) -> Self {
        let now = Utc::now();
        Self {
            id,
            uid: Ulid::new(),
            owner,
            collaborators: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the given user owns or collaborates on this app.
    pub fn has_member(&self, user_id: &str) -> bool {
        self.owner.id == user_id || self.is_collaborator(user_id)
    }
}

impl OwnedResource for DbApp {
    fn owner_id(&self) -> &str {
        &self.owner.id
    }

    fn is_collaborator(&self, user_id: &str) -> bool {
        self.collaborators.iter().any(|c| c.id == user_id)
    }
}

impl From<DbApp> for App {
    fn from(value: DbApp) -> Self {
        Self {
            id: value.id,
            owner: value.owner.username,
            collaborators: value
                .collaborators
                .into_iter()
                .map(|c| c.username)
                .collect(),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
