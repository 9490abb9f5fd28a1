//! The certificate CRUD pipeline.
//!
//! Every operation enters through [`CertificateService::admit`], which
//! resolves the app and then consults the guard. Only an admitted request
//! has its body looked at, and only a validated request reaches the store.
//! The precedence of failures is therefore fixed: missing app, then
//! forbidden, then a malformed body or invalid material, then store
//! conflicts.

use std::sync::Arc;

use berth_common::{
    caller::Caller,
    guard::{self, Operation},
    params::CertificateParams,
};
use berth_db::{
    models::{DbApp, DbCertificate},
    storage::{AppStore, CertificateStore, CertificateUpdate, Storage, StoreError},
};
use chrono::Utc;
use tracing::{info, instrument};
use ulid::Ulid;

use super::{error::CertError, validator};

#[derive(Clone)]
pub struct CertificateService {
    db: Arc<dyn Storage>,
}

impl CertificateService {
    pub fn new(db: Arc<dyn Storage>) -> Self {
        Self { db }
    }

    /// Resolve the app, then authorize the caller against it.
    async fn admit(
        &self,
        caller: &Caller,
        app_id: &str,
        operation: Operation,
    ) -> Result<DbApp, CertError> {
        let app = AppStore::get(&*self.db, app_id)
            .await?
            .ok_or_else(|| CertError::ResourceNotFound(app_id.to_string()))?;

        guard::authorize(caller, &app, operation).map_err(|_| CertError::Forbidden(operation))?;

        Ok(app)
    }

    #[instrument(skip(self, params), fields(%caller))]
    pub async fn create(
        &self,
        caller: &Caller,
        app_id: &str,
        params: Result<CertificateParams, CertError>,
    ) -> Result<DbCertificate, CertError> {
        let app = self
            .admit(caller, app_id, Operation::CreateCertificate)
            .await?;

        let params = params?;
        let validated = validator::validate(&params.cert, &params.key)?;

        let now = Utc::now();
        let record = DbCertificate {
            id: Ulid::new(),
            app_id: app.id.clone(),
            app_uid: app.uid,
            common_name: validated.common_name,
            certificate: params.cert,
            private_key: params.key,
            fingerprint: validated.fingerprint,
            expires: validated.expires,
            created_at: now,
            updated_at: now,
        };

        let common_name = record.common_name.clone();
        let created = CertificateStore::create(&*self.db, record)
            .await
            .map_err(|e| match e {
                // The app was deleted while this request was in flight.
                StoreError::NotFound => CertError::ResourceNotFound(app.id.clone()),
                e => CertError::from_store(e, &common_name),
            })?;

        info!(%common_name, "Certificate created");
        Ok(created)
    }

    #[instrument(skip(self), fields(%caller))]
    pub async fn list(&self, caller: &Caller, app_id: &str) -> Result<Vec<DbCertificate>, CertError> {
        let app = self
            .admit(caller, app_id, Operation::ListCertificates)
            .await?;

        Ok(CertificateStore::list(&*self.db, &app).await?)
    }

    #[instrument(skip(self), fields(%caller))]
    pub async fn get(
        &self,
        caller: &Caller,
        app_id: &str,
        common_name: &str,
    ) -> Result<DbCertificate, CertError> {
        let app = self
            .admit(caller, app_id, Operation::ReadCertificate)
            .await?;

        CertificateStore::get(&*self.db, &app, common_name)
            .await?
            .ok_or_else(|| CertError::RecordNotFound(common_name.to_string()))
    }

    #[instrument(skip(self, params), fields(%caller))]
    pub async fn update(
        &self,
        caller: &Caller,
        app_id: &str,
        common_name: &str,
        params: Result<CertificateParams, CertError>,
    ) -> Result<DbCertificate, CertError> {
        let app = self
            .admit(caller, app_id, Operation::UpdateCertificate)
            .await?;

        let params = params?;
        let validated = validator::validate(&params.cert, &params.key)?;

        let update = CertificateUpdate {
            common_name: validated.common_name,
            certificate: params.cert,
            private_key: params.key,
            fingerprint: validated.fingerprint,
            expires: validated.expires,
        };

        let updated = CertificateStore::update(&*self.db, &app, common_name, update)
            .await
            .map_err(|e| CertError::from_store(e, common_name))?;

        info!("Certificate updated");
        Ok(updated)
    }

    #[instrument(skip(self), fields(%caller))]
    pub async fn delete(
        &self,
        caller: &Caller,
        app_id: &str,
        common_name: &str,
    ) -> Result<(), CertError> {
        let app = self
            .admit(caller, app_id, Operation::DeleteCertificate)
            .await?;

        CertificateStore::delete(&*self.db, &app, common_name)
            .await
            .map_err(|e| CertError::from_store(e, common_name))?;

        info!("Certificate deleted");
        Ok(())
    }
}
