//! In-process storage backend.
//!
//! Certificates are grouped per app, each group behind its own mutex, so a
//! check-then-write on one app is atomic while operations on other apps
//! never wait on it. Nothing survives a restart.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::{
    models::{AppMember, DbApp, DbCertificate, DbUser},
    storage::{
        AppFilter, AppStore, CertificateStore, CertificateUpdate, Storage, StoreError, UserStore,
    },
};

type CertificateList = Arc<Mutex<Vec<DbCertificate>>>;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    users: RwLock<Vec<DbUser>>,
    apps: RwLock<BTreeMap<String, DbApp>>,
    certificates: RwLock<HashMap<String, CertificateList>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    async fn certificates_for(&self, app_id: &str) -> CertificateList {
        if let Some(list) = self.certificates.read().await.get(app_id) {
            return list.clone();
        }

        self.certificates
            .write()
            .await
            .entry(app_id.to_string())
            .or_default()
            .clone()
    }

    async fn existing_certificates_for(&self, app_id: &str) -> Option<CertificateList> {
        self.certificates.read().await.get(app_id).cloned()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), StoreError> {
        debug!("Memory storage shut down");
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStorage {
    async fn create(&self, user: DbUser) -> Result<DbUser, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::AlreadyExists);
        }

        users.push(user.clone());
        Ok(user)
    }

    async fn get(&self, id: &str) -> Result<Option<DbUser>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id.to_string() == id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<DbUser>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn get_by_token_hash(&self, token_hash: &str) -> Result<Option<DbUser>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.token_hash == token_hash).cloned())
    }

    async fn set_token_hash(&self, id: &str, token_hash: &str) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|u| u.id.to_string() == id)
            .ok_or(StoreError::NotFound)?;

        user.token_hash = token_hash.to_string();
        Ok(())
    }
}

#[async_trait]
impl AppStore for MemoryStorage {
    async fn create(&self, app: DbApp) -> Result<DbApp, StoreError> {
        let mut apps = self.apps.write().await;
        if apps.contains_key(&app.id) {
            return Err(StoreError::AlreadyExists);
        }

        apps.insert(app.id.clone(), app.clone());
        Ok(app)
    }

    async fn get(&self, id: &str) -> Result<Option<DbApp>, StoreError> {
        Ok(self.apps.read().await.get(id).cloned())
    }

    async fn list(&self, filter: AppFilter) -> Result<Vec<DbApp>, StoreError> {
        let apps = self.apps.read().await;
        Ok(apps
            .values()
            .filter(|app| {
                filter
                    .member_id
                    .as_deref()
                    .is_none_or(|user_id| app.has_member(user_id))
            })
            .cloned()
            .collect())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut apps = self.apps.write().await;
        apps.remove(id).ok_or(StoreError::NotFound)?;

        let removed = self.certificates.write().await.remove(id);
        if let Some(list) = removed {
            let count = list.lock().await.len();
            debug!(app_id = id, count, "Cascaded certificate deletion");
        }

        Ok(())
    }

    async fn add_collaborator(&self, id: &str, member: AppMember) -> Result<DbApp, StoreError> {
        let mut apps = self.apps.write().await;
        let app = apps.get_mut(id).ok_or(StoreError::NotFound)?;

        if app.has_member(&member.id) {
            return Err(StoreError::AlreadyExists);
        }

        app.collaborators.push(member);
        app.updated_at = Utc::now();
        Ok(app.clone())
    }

    async fn remove_collaborator(&self, id: &str, user_id: &str) -> Result<DbApp, StoreError> {
        let mut apps = self.apps.write().await;
        let app = apps.get_mut(id).ok_or(StoreError::NotFound)?;

        let position = app
            .collaborators
            .iter()
            .position(|c| c.id == user_id)
            .ok_or(StoreError::NotFound)?;

        app.collaborators.remove(position);
        app.updated_at = Utc::now();
        Ok(app.clone())
    }
}

#[async_trait]
impl CertificateStore for MemoryStorage {
    async fn create(&self, certificate: DbCertificate) -> Result<DbCertificate, StoreError> {
        // Held until the insert lands so a concurrent app delete cannot slip
        // in between the check and the write.
        let apps = self.apps.read().await;
        if !apps
            .get(&certificate.app_id)
            .is_some_and(|app| app.uid == certificate.app_uid)
        {
            return Err(StoreError::NotFound);
        }

        let list = self.certificates_for(&certificate.app_id).await;
        let mut list = list.lock().await;
        drop(apps);

        if list.iter().any(|c| c.common_name == certificate.common_name) {
            return Err(StoreError::AlreadyExists);
        }

        list.push(certificate.clone());
        Ok(certificate)
    }

    async fn get(
        &self,
        app: &DbApp,
        common_name: &str,
    ) -> Result<Option<DbCertificate>, StoreError> {
        let Some(list) = self.existing_certificates_for(&app.id).await else {
            return Ok(None);
        };

        let list = list.lock().await;
        Ok(list
            .iter()
            .find(|c| c.app_uid == app.uid && c.common_name == common_name)
            .cloned())
    }

    async fn list(&self, app: &DbApp) -> Result<Vec<DbCertificate>, StoreError> {
        let Some(list) = self.existing_certificates_for(&app.id).await else {
            return Ok(vec![]);
        };

        let list = list.lock().await;
        Ok(list.iter().filter(|c| c.app_uid == app.uid).cloned().collect())
    }

    async fn update(
        &self,
        app: &DbApp,
        common_name: &str,
        update: CertificateUpdate,
    ) -> Result<DbCertificate, StoreError> {
        let list = self
            .existing_certificates_for(&app.id)
            .await
            .ok_or(StoreError::NotFound)?;
        let mut list = list.lock().await;

        let record = list
            .iter_mut()
            .find(|c| c.app_uid == app.uid && c.common_name == common_name)
            .ok_or(StoreError::NotFound)?;

        if update.common_name != common_name {
            return Err(StoreError::CommonNameMismatch {
                expected: common_name.to_string(),
                found: update.common_name,
            });
        }

        record.certificate = update.certificate;
        record.private_key = update.private_key;
        record.fingerprint = update.fingerprint;
        record.expires = update.expires;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn delete(&self, app: &DbApp, common_name: &str) -> Result<(), StoreError> {
        let list = self
            .existing_certificates_for(&app.id)
            .await
            .ok_or(StoreError::NotFound)?;
        let mut list = list.lock().await;

        let position = list
            .iter()
            .position(|c| c.app_uid == app.uid && c.common_name == common_name)
            .ok_or(StoreError::NotFound)?;

        list.remove(position);
        Ok(())
    }
}
