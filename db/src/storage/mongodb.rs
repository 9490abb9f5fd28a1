use async_trait::async_trait;
use bson::{Bson, DateTime as BsonDateTime, doc};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    Client, Collection, Database, IndexModel,
    error::{ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
};
use tracing::{debug, info, warn};

use crate::{
    models::{AppMember, DbApp, DbCertificate, DbUser},
    storage::{
        AppFilter, AppStore, CertificateStore, CertificateUpdate, Storage, StoreError, UserStore,
    },
};

pub const MONGODB_COLLECTION_USERS: &str = "users";
pub const MONGODB_COLLECTION_APPS: &str = "apps";
pub const MONGODB_COLLECTION_CERTIFICATES: &str = "certificates";

const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug)]
pub struct MongoDBStorage(Client);

impl MongoDBStorage {
    /// Connect and make sure the indexes backing the uniqueness guarantees
    /// exist.
    pub async fn new(uri: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        let storage = Self(client);
        storage.ensure_indexes().await?;
        Ok(storage)
    }

    fn get_db(&self) -> Database {
        self.0
            .default_database()
            .unwrap_or_else(|| self.0.database("berth"))
    }

    fn users(&self) -> Collection<DbUser> {
        self.get_db().collection(MONGODB_COLLECTION_USERS)
    }

    fn apps(&self) -> Collection<DbApp> {
        self.get_db().collection(MONGODB_COLLECTION_APPS)
    }

    fn certificates(&self) -> Collection<DbCertificate> {
        self.get_db().collection(MONGODB_COLLECTION_CERTIFICATES)
    }

    async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let unique = || IndexOptions::builder().unique(true).build();

        self.certificates()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "app_uid": 1, "common_name": 1 })
                    .options(unique())
                    .build(),
            )
            .await?;

        self.users()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "username": 1 })
                    .options(unique())
                    .build(),
            )
            .await?;

        self.users()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "token_hash": 1 })
                    .options(unique())
                    .build(),
            )
            .await?;

        info!("MongoDB indexes ensured");
        Ok(())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn map_insert_error(err: mongodb::error::Error) -> StoreError {
    if is_duplicate_key(&err) {
        StoreError::AlreadyExists
    } else {
        StoreError::MongoDB(err)
    }
}

fn certificate_key(app: &DbApp, common_name: &str) -> bson::Document {
    doc! { "app_uid": app.uid.to_string(), "common_name": common_name }
}

fn member_doc(member: &AppMember) -> bson::Document {
    doc! { "id": &member.id, "username": &member.username }
}

#[async_trait]
impl Storage for MongoDBStorage {
    async fn ping(&self) -> Result<(), StoreError> {
        self.get_db().run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), StoreError> {
        self.0.clone().shutdown().await;
        info!("MongoDB client shut down");
        Ok(())
    }
}

#[async_trait]
impl UserStore for MongoDBStorage {
    async fn create(&self, user: DbUser) -> Result<DbUser, StoreError> {
        self.users()
            .insert_one(&user)
            .await
            .map_err(map_insert_error)?;
        Ok(user)
    }

    async fn get(&self, id: &str) -> Result<Option<DbUser>, StoreError> {
        Ok(self.users().find_one(doc! { "_id": id }).await?)
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<DbUser>, StoreError> {
        Ok(self.users().find_one(doc! { "username": username }).await?)
    }

    async fn get_by_token_hash(&self, token_hash: &str) -> Result<Option<DbUser>, StoreError> {
        Ok(self
            .users()
            .find_one(doc! { "token_hash": token_hash })
            .await?)
    }

    async fn set_token_hash(&self, id: &str, token_hash: &str) -> Result<(), StoreError> {
        let result = self
            .users()
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "token_hash": token_hash } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl AppStore for MongoDBStorage {
    async fn create(&self, app: DbApp) -> Result<DbApp, StoreError> {
        self.apps()
            .insert_one(&app)
            .await
            .map_err(map_insert_error)?;

        // Leftovers of an earlier app under this name, if its cascade failed.
        let swept = self
            .certificates()
            .delete_many(doc! { "app_id": &app.id, "app_uid": { "$ne": app.uid.to_string() } })
            .await?;
        if swept.deleted_count > 0 {
            warn!(app_id = %app.id, count = swept.deleted_count, "Swept stale certificates");
        }

        Ok(app)
    }

    async fn get(&self, id: &str) -> Result<Option<DbApp>, StoreError> {
        Ok(self.apps().find_one(doc! { "_id": id }).await?)
    }

    async fn list(&self, filter: AppFilter) -> Result<Vec<DbApp>, StoreError> {
        let mut filter_doc = doc! {};
        if let Some(user_id) = filter.member_id {
            filter_doc.insert(
                "$or",
                vec![
                    Bson::Document(doc! { "owner.id": &user_id }),
                    Bson::Document(doc! { "collaborators.id": &user_id }),
                ],
            );
        }

        self.apps()
            .find(filter_doc)
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await
            .map_err(StoreError::MongoDB)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let app = self
            .apps()
            .find_one_and_delete(doc! { "_id": id })
            .await?
            .ok_or(StoreError::NotFound)?;

        let removed = self
            .certificates()
            .delete_many(doc! { "app_uid": app.uid.to_string() })
            .await?;
        debug!(app_id = id, count = removed.deleted_count, "Cascaded certificate deletion");

        Ok(())
    }

    async fn add_collaborator(&self, id: &str, member: AppMember) -> Result<DbApp, StoreError> {
        let updated = self
            .apps()
            .find_one_and_update(
                doc! {
                    "_id": id,
                    "owner.id": { "$ne": &member.id },
                    "collaborators.id": { "$ne": &member.id },
                },
                doc! {
                    "$push": { "collaborators": member_doc(&member) },
                    "$set": { "updated_at": BsonDateTime::from_chrono(Utc::now()) },
                },
            )
            .return_document(ReturnDocument::After)
            .await?;

        match updated {
            Some(app) => Ok(app),
            None if AppStore::get(self, id).await?.is_some() => Err(StoreError::AlreadyExists),
            None => Err(StoreError::NotFound),
        }
    }

    async fn remove_collaborator(&self, id: &str, user_id: &str) -> Result<DbApp, StoreError> {
        self.apps()
            .find_one_and_update(
                doc! { "_id": id, "collaborators.id": user_id },
                doc! {
                    "$pull": { "collaborators": { "id": user_id } },
                    "$set": { "updated_at": BsonDateTime::from_chrono(Utc::now()) },
                },
            )
            .return_document(ReturnDocument::After)
            .await?
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl CertificateStore for MongoDBStorage {
    async fn create(&self, certificate: DbCertificate) -> Result<DbCertificate, StoreError> {
        // The unique (app_uid, common_name) index arbitrates concurrent creates.
        self.certificates()
            .insert_one(&certificate)
            .await
            .map_err(map_insert_error)?;

        // An app delete that ran before the insert will not cascade to it.
        let app = self
            .apps()
            .find_one(doc! { "_id": &certificate.app_id, "uid": certificate.app_uid.to_string() })
            .await?;
        if app.is_none() {
            self.certificates()
                .delete_one(doc! { "_id": certificate.id.to_string() })
                .await?;
            return Err(StoreError::NotFound);
        }

        Ok(certificate)
    }

    async fn get(
        &self,
        app: &DbApp,
        common_name: &str,
    ) -> Result<Option<DbCertificate>, StoreError> {
        Ok(self
            .certificates()
            .find_one(certificate_key(app, common_name))
            .await?)
    }

    async fn list(&self, app: &DbApp) -> Result<Vec<DbCertificate>, StoreError> {
        self.certificates()
            .find(doc! { "app_uid": app.uid.to_string() })
            .sort(doc! { "created_at": 1, "_id": 1 })
            .await?
            .try_collect()
            .await
            .map_err(StoreError::MongoDB)
    }

    async fn update(
        &self,
        app: &DbApp,
        common_name: &str,
        update: CertificateUpdate,
    ) -> Result<DbCertificate, StoreError> {
        if update.common_name != common_name {
            return match CertificateStore::get(self, app, common_name).await? {
                Some(_) => Err(StoreError::CommonNameMismatch {
                    expected: common_name.to_string(),
                    found: update.common_name,
                }),
                None => Err(StoreError::NotFound),
            };
        }

        self.certificates()
            .find_one_and_update(
                certificate_key(app, common_name),
                doc! {
                    "$set": {
                        "certificate": &update.certificate,
                        "private_key": &update.private_key,
                        "fingerprint": &update.fingerprint,
                        "expires": BsonDateTime::from_chrono(update.expires),
                        "updated_at": BsonDateTime::from_chrono(Utc::now()),
                    }
                },
            )
            .return_document(ReturnDocument::After)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, app: &DbApp, common_name: &str) -> Result<(), StoreError> {
        let result = self
            .certificates()
            .delete_one(certificate_key(app, common_name))
            .await?;

        if result.deleted_count == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
