use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::UserError;
use crate::pagination::Paginated;

/// User entity as exposed over HTTP and on the notification channels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server generated UUID v4, immutable after creation
    #[schema(example = "0b6f1d55-3d0c-4b7e-9a53-2f1c8f0c2f44")]
    pub id: String,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(length(min = 1))]
    pub nickname: String,
    /// Stored as supplied
    #[validate(length(min = 1))]
    pub password: String,
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// True when every required field is non-empty
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Adopts every mutable field of `incoming` that differs from the current value.
    ///
    /// This is a full replacement of the mutable fields: an empty incoming value
    /// overwrites a non-empty one. `id` and the timestamps are left alone.
    pub fn merge(&mut self, incoming: User) {
        fn adopt(current: &mut String, incoming: String) {
            if *current != incoming {
                *current = incoming;
            }
        }

        adopt(&mut self.first_name, incoming.first_name);
        adopt(&mut self.last_name, incoming.last_name);
        adopt(&mut self.nickname, incoming.nickname);
        adopt(&mut self.email, incoming.email);
        adopt(&mut self.country, incoming.country);
        adopt(&mut self.password, incoming.password);
    }
}

/// Request body for create and update. Absent fields default to empty strings;
/// server-assigned fields are not accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct UserPayload {
    #[schema(example = "Ada")]
    pub first_name: String,
    #[schema(example = "Lovelace")]
    pub last_name: String,
    #[schema(example = "ada")]
    pub nickname: String,
    pub password: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "GB")]
    pub country: String,
}

impl From<UserPayload> for User {
    fn from(payload: UserPayload) -> Self {
        Self {
            first_name: payload.first_name,
            last_name: payload.last_name,
            nickname: payload.nickname,
            password: payload.password,
            email: payload.email,
            country: payload.country,
            ..Default::default()
        }
    }
}

/// A page of users plus its envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginatedUsers {
    #[serde(flatten)]
    pub pagination: Paginated,
    pub users: Vec<User>,
}

/// Current UTC time at the precision MongoDB stores.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Stored shape of a user in the `users` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub password: String,
    pub email: String,
    pub country: String,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

impl From<&User> for UserDocument {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            nickname: user.nickname.clone(),
            password: user.password.clone(),
            email: user.email.clone(),
            country: user.country.clone(),
            created_at: bson::DateTime::from_millis(user.created_at.timestamp_millis()),
            updated_at: bson::DateTime::from_millis(user.updated_at.timestamp_millis()),
        }
    }
}

impl TryFrom<UserDocument> for User {
    type Error = UserError;

    fn try_from(doc: UserDocument) -> Result<Self, Self::Error> {
        let timestamp = |value: bson::DateTime, field: &str| {
            DateTime::<Utc>::from_timestamp_millis(value.timestamp_millis()).ok_or_else(|| {
                UserError::Storage(format!("user {} has an out of range {field}", doc.id))
            })
        };

        let created_at = timestamp(doc.created_at, "created_at")?;
        let updated_at = timestamp(doc.updated_at, "updated_at")?;

        Ok(Self {
            id: doc.id,
            first_name: doc.first_name,
            last_name: doc.last_name,
            nickname: doc.nickname,
            password: doc.password,
            email: doc.email,
            country: doc.country,
            created_at,
            updated_at,
        })
    }
}
