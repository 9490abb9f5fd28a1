use std::sync::Arc;

use berth_db::storage::Storage;

use crate::{
    auth::{AuthManager, TokenAuthProvider},
    certs::CertificateService,
    config::BerthApiConfig,
};

#[derive(Clone)]
pub struct ApiContext {
    pub _config: BerthApiConfig,
    pub db: Arc<dyn Storage>,
    pub auth_manager: Arc<AuthManager>,
    pub certs: CertificateService,
}

impl ApiContext {
    pub fn new(config: BerthApiConfig, db: Arc<dyn Storage>) -> Self {
        let auth_manager = AuthManager::new().with_provider(TokenAuthProvider::new(db.clone()));

        Self {
            _config: config,
            certs: CertificateService::new(db.clone()),
            auth_manager: Arc::new(auth_manager),
            db,
        }
    }
}
