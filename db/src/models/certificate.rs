use berth_common::views::Certificate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

#[derive(Clone, Serialize, Deserialize)]
pub struct DbCertificate {
    #[serde(rename = "_id")]
    pub id: Ulid,

    /// The app this certificate is attached to.
    pub app_id: String,

    /// [`crate::models::DbApp::uid`] of the app at the time of creation.
    pub app_uid: Ulid,

    /// Subject common name. Together with `app_id` this identifies the
    /// record, and it never changes once the record exists.
    pub common_name: String,

    /// Certificate in PEM format, stored as uploaded
    pub certificate: String,

    /// Private key in PEM format, stored as uploaded
    pub private_key: String,

    /// `sha256:<hex>` of the certificate DER
    pub fingerprint: String,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub expires: DateTime<Utc>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for DbCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbCertificate")
            .field("id", &self.id)
            .field("app_id", &self.app_id)
            .field("common_name", &self.common_name)
            .field("fingerprint", &self.fingerprint)
            .field("expires", &self.expires)
            .finish_non_exhaustive()
    }
}

impl From<DbCertificate> for Certificate {
    fn from(value: DbCertificate) -> Self {
        Self {
            app: value.app_id,
            common_name: value.common_name,
            fingerprint: value.fingerprint,
            expires: value.expires,
            certificate: value.certificate,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
