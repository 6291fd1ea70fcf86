//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    options::FindOptions,
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::filters::UserFilters;
use crate::models::{PaginatedUsers, User, UserDocument, now_millis};
use crate::pagination::{PaginationOptions, paginate};
use crate::repository::UserRepository;

pub const USERS_COLLECTION: &str = "users";

/// MongoDB implementation of the UserRepository
#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<UserDocument>,
}

impl MongoUserRepository {
    /// Create a repository over the `users` collection of `db`
    ///
    /// # Example
    /// ```ignore
    /// let client = database::mongodb::connect("mongodb://localhost:27017").await?;
    /// let repo = MongoUserRepository::new(&client.database("users_service"));
    /// ```
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<UserDocument>(USERS_COLLECTION),
        }
    }

    /// Ascending indexes on the filterable fields and on the listing order.
    pub async fn create_indexes(&self) -> UserResult<()> {
        let indexes = ["first_name", "last_name", "email", "country", "created_at"]
            .into_iter()
            .map(|field| {
                let mut keys = Document::new();
                keys.insert(field, 1);
                IndexModel::builder().keys(keys).build()
            })
            .collect::<Vec<_>>();

        self.collection.create_indexes(indexes).await?;
        info!(collection = %self.collection.name(), "User indexes ensured");
        Ok(())
    }

    fn by_id(id: &str) -> Document {
        doc! { "_id": id }
    }

    async fn find_by_id(&self, id: &str) -> UserResult<User> {
        self.collection
            .find_one(Self::by_id(id))
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))?
            .try_into()
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user))]
    async fn create(&self, mut user: User) -> UserResult<User> {
        let now = now_millis();
        user.id = Uuid::new_v4().to_string();
        user.created_at = now;
        user.updated_at = now;

        self.collection.insert_one(UserDocument::from(&user)).await?;

        info!(user_id = %user.id, "User created");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> UserResult<User> {
        self.find_by_id(&id.to_string()).await
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update(&self, mut user: User) -> UserResult<User> {
        user.updated_at = now_millis();

        let result = self
            .collection
            .replace_one(Self::by_id(&user.id), UserDocument::from(&user))
            .await?;

        if result.matched_count == 0 {
            return Err(UserError::NotFound(user.id));
        }

        info!("User updated");
        self.find_by_id(&user.id).await
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: Uuid) -> UserResult<()> {
        let result = self
            .collection
            .delete_one(Self::by_id(&id.to_string()))
            .await?;

        info!(deleted = result.deleted_count, "User delete executed");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_paginated_users(
        &self,
        pagination: PaginationOptions,
        filters: UserFilters,
    ) -> UserResult<PaginatedUsers> {
        let predicate = filters.to_document();

        let total_count = self.collection.count_documents(predicate.clone()).await?;
        let page = paginate(total_count, pagination);

        let options = FindOptions::builder()
            .skip(page.effective_skip())
            .limit(i64::try_from(page.limit()).unwrap_or(i64::MAX))
            .sort(doc! { "created_at": 1, "_id": 1 })
            .build();

        let documents: Vec<UserDocument> = self
            .collection
            .find(predicate)
            .with_options(options)
            .await?
            .try_collect()
            .await?;

        let users = documents
            .into_iter()
            .map(User::try_from)
            .collect::<UserResult<Vec<_>>>()?;

        debug!(
            total_count,
            returned = users.len(),
            page = page.envelope.current_page,
            "Users page fetched"
        );

        Ok(PaginatedUsers {
            pagination: page.envelope,
            users,
        })
    }
}
