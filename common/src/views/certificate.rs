use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A TLS certificate attached to an app. The private key is accepted on
/// upload but never returned.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Certificate {
    /// The app this certificate belongs to.
    pub app: String,

    /// Subject common name of the certificate. Unique within an app.
    pub common_name: String,

    /// SHA-256 fingerprint of the certificate (format: `sha256:<hex>`)
    pub fingerprint: String,

    /// When the certificate stops being valid (`notAfter`).
    pub expires: DateTime<Utc>,

    /// Certificate in PEM format, exactly as uploaded.
    pub certificate: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
