use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{AppMember, DbApp, DbCertificate, DbUser};

pub mod memory;
pub mod mongodb;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,

    #[error("Record already exists")]
    AlreadyExists,

    #[error("Common name {found} does not match {expected}")]
    CommonNameMismatch { expected: String, found: String },

    #[error("Query Error: {0}")]
    MongoDB(#[from] ::mongodb::error::Error),

    #[error(transparent)]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Everything the API needs from a backend. Opened before the server starts
/// and shut down once it has drained.
#[async_trait]
pub trait Storage: UserStore + AppStore + CertificateStore + Send + Sync + 'static {
    async fn ping(&self) -> Result<(), StoreError>;
    async fn shutdown(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait UserStore {
    /// Fails with [`StoreError::AlreadyExists`] when the username is taken.
    async fn create(&self, user: DbUser) -> Result<DbUser, StoreError>;
    async fn get(&self, id: &str) -> Result<Option<DbUser>, StoreError>;
    async fn get_by_username(&self, username: &str) -> Result<Option<DbUser>, StoreError>;
    async fn get_by_token_hash(&self, token_hash: &str) -> Result<Option<DbUser>, StoreError>;
    async fn set_token_hash(&self, id: &str, token_hash: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct AppFilter {
    /// Only apps this user owns or collaborates on.
    pub member_id: Option<String>,
}

#[async_trait]
pub trait AppStore {
    /// Fails with [`StoreError::AlreadyExists`] when the name is taken.
    async fn create(&self, app: DbApp) -> Result<DbApp, StoreError>;
    async fn get(&self, id: &str) -> Result<Option<DbApp>, StoreError>;
    async fn list(&self, filter: AppFilter) -> Result<Vec<DbApp>, StoreError>;

    /// Deletes the app together with every certificate attached to it.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    async fn add_collaborator(&self, id: &str, member: AppMember) -> Result<DbApp, StoreError>;
    async fn remove_collaborator(&self, id: &str, user_id: &str) -> Result<DbApp, StoreError>;
}

/// Replacement material for an existing certificate record.
#[derive(Clone)]
pub struct CertificateUpdate {
    /// Common name extracted from the new certificate.
    pub common_name: String,
    pub certificate: String,
    pub private_key: String,
    pub fingerprint: String,
    pub expires: DateTime<Utc>,
}

impl Debug for CertificateUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateUpdate")
            .field("common_name", &self.common_name)
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}

/// Certificates, keyed by the owning app's [`DbApp::uid`] and the common
/// name.
///
/// Implementations make each check-then-write atomic: two concurrent creates
/// for the same key yield exactly one success and one
/// [`StoreError::AlreadyExists`]. Records of a deleted app are never visible
/// to an app later created under the same name.
#[async_trait]
pub trait CertificateStore {
    /// Fails with [`StoreError::NotFound`] when the app named by
    /// `certificate.app_id` no longer exists as `certificate.app_uid`.
    async fn create(&self, certificate: DbCertificate) -> Result<DbCertificate, StoreError>;

    async fn get(
        &self,
        app: &DbApp,
        common_name: &str,
    ) -> Result<Option<DbCertificate>, StoreError>;

    /// All certificates for the app, oldest first.
    async fn list(&self, app: &DbApp) -> Result<Vec<DbCertificate>, StoreError>;

    /// Replaces the certificate and key of the record named `common_name`.
    ///
    /// Fails with [`StoreError::NotFound`] when no such record exists, and
    /// with [`StoreError::CommonNameMismatch`] when `update.common_name`
    /// differs from `common_name`. The record is untouched in both cases.
    async fn update(
        &self,
        app: &DbApp,
        common_name: &str,
        update: CertificateUpdate,
    ) -> Result<DbCertificate, StoreError>;

    async fn delete(&self, app: &DbApp, common_name: &str) -> Result<(), StoreError>;
}
