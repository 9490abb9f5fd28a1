//! Input parameters for the various functions within berth.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Parameters for paginating through a list of records. This is used by the
/// various list endpoints to allow clients to paginate through large sets of
/// records.
#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams, ToSchema)]
pub struct PaginationParams {
    /// The next page token, if any. This is acquired by requesting a paginated
    /// set of records and looking at the `next_token` field.
    pub next_token: Option<String>,

    /// The maximum number of results to return.
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateAppParams {
    /// Name for the new app. A name is generated when omitted.
    #[serde(default)]
    pub id: Option<String>,
}

/// Certificate material uploaded for an app.
#[derive(Clone, Deserialize, Serialize, ToSchema)]
pub struct CertificateParams {
    /// PEM-encoded X.509 certificate.
    pub cert: String,

    /// PEM-encoded private key matching the certificate.
    pub key: String,
}

impl std::fmt::Debug for CertificateParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateParams")
            .field("cert", &format_args!("<{} bytes>", self.cert.len()))
            .field("key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AddCollaboratorParams {
    /// Username of the user to grant access to.
    pub username: String,
}
