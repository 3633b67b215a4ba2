use async_trait::async_trait;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson},
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
    Client, Collection, IndexModel,
};
use tracing::info;

use crate::config::MongoConfig;
use crate::error::ServiceError;
use crate::users::repo_types::User;

/// Persistence boundary for user records.
///
/// `replace` is a full overwrite that silently no-ops on a missing id and
/// `delete` is idempotent; existence checks belong to the service layer.
/// `create` and `replace` both surface a username collision as `Conflict`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: User) -> Result<User, ServiceError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ServiceError>;
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, ServiceError>;
    async fn replace(&self, id: &ObjectId, user: User) -> Result<(), ServiceError>;
    async fn set_profile_image(&self, id: &ObjectId, bytes: Vec<u8>) -> Result<(), ServiceError>;
    async fn delete(&self, id: &ObjectId) -> Result<(), ServiceError>;
}

pub struct MongoUserStore {
    users: Collection<User>,
}

impl MongoUserStore {
    /// Connects and provisions the unique username index. The index, not
    /// the service-layer pre-check, is the source of truth for uniqueness
    /// under concurrent registrations.
    pub async fn new(config: &MongoConfig) -> anyhow::Result<Self> {
        let client = Client::with_uri_str(&config.uri).await?;
        let users = client
            .database(&config.database)
            .collection::<User>(&config.collection);

        let index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        users.create_index(index).await?;

        info!(
            database = %config.database,
            collection = %config.collection,
            "connected to mongodb"
        );
        Ok(Self { users })
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        &*err.kind,
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == 11000
    )
}

fn map_write_error(err: mongodb::error::Error) -> ServiceError {
    if is_duplicate_key(&err) {
        ServiceError::Conflict("Username already exists.".into())
    } else {
        ServiceError::storage(err)
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn create(&self, mut user: User) -> Result<User, ServiceError> {
        user.id.get_or_insert_with(ObjectId::new);
        self.users
            .insert_one(&user)
            .await
            .map_err(map_write_error)?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ServiceError> {
        self.users
            .find_one(doc! { "username": username })
            .await
            .map_err(ServiceError::storage)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, ServiceError> {
        self.users
            .find_one(doc! { "_id": id })
            .await
            .map_err(ServiceError::storage)
    }

    async fn replace(&self, id: &ObjectId, user: User) -> Result<(), ServiceError> {
        // The unique username index also polices renames.
        self.users
            .replace_one(doc! { "_id": id }, &user)
            .await
            .map_err(map_write_error)?;
        Ok(())
    }

    async fn set_profile_image(&self, id: &ObjectId, bytes: Vec<u8>) -> Result<(), ServiceError> {
        let image = Bson::Binary(mongodb::bson::Binary {
            subtype: mongodb::bson::spec::BinarySubtype::Generic,
            bytes,
        });
        self.users
            .update_one(doc! { "_id": id }, doc! { "$set": { "profile_image": image } })
            .await
            .map_err(ServiceError::storage)?;
        Ok(())
    }

    async fn delete(&self, id: &ObjectId) -> Result<(), ServiceError> {
        self.users
            .delete_one(doc! { "_id": id })
            .await
            .map_err(ServiceError::storage)?;
        Ok(())
    }
}
