//! Wire contract of the user notification channels.
//!
//! Creation and update carry the full user as JSON; deletion carries the bare id.

use thiserror::Error;

use crate::error::{UserError, UserResult};
use crate::models::User;

pub const TOPIC_USER_CREATED: &str = "user-created";
pub const TOPIC_USER_UPDATED: &str = "user-updated";
pub const TOPIC_USER_DELETED: &str = "user-deleted";

pub fn all_user_topics() -> [&'static str; 3] {
    [TOPIC_USER_CREATED, TOPIC_USER_UPDATED, TOPIC_USER_DELETED]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEvent {
    Created(User),
    Updated(User),
    Deleted(String),
}

#[derive(Debug, Error)]
pub enum EventDecodeError {
    #[error("unknown topic '{0}'")]
    UnknownTopic(String),

    #[error("invalid payload on '{topic}': {source}")]
    InvalidPayload {
        topic: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl UserEvent {
    pub fn topic(&self) -> &'static str {
        match self {
            UserEvent::Created(_) => TOPIC_USER_CREATED,
            UserEvent::Updated(_) => TOPIC_USER_UPDATED,
            UserEvent::Deleted(_) => TOPIC_USER_DELETED,
        }
    }

    /// Encodes the message body published on [`UserEvent::topic`].
    pub fn payload(&self) -> UserResult<String> {
        match self {
            UserEvent::Created(user) | UserEvent::Updated(user) => serde_json::to_string(user)
                .map_err(|e| UserError::Publish(format!("failed to encode user {}: {e}", user.id))),
            UserEvent::Deleted(id) => Ok(id.clone()),
        }
    }

    pub fn decode(topic: &str, payload: &str) -> Result<Self, EventDecodeError> {
        let user = |topic: &'static str| {
            serde_json::from_str::<User>(payload)
                .map_err(|source| EventDecodeError::InvalidPayload { topic, source })
        };

        match topic {
            TOPIC_USER_CREATED => user(TOPIC_USER_CREATED).map(UserEvent::Created),
            TOPIC_USER_UPDATED => user(TOPIC_USER_UPDATED).map(UserEvent::Updated),
            TOPIC_USER_DELETED => Ok(UserEvent::Deleted(payload.to_string())),
            other => Err(EventDecodeError::UnknownTopic(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "u-1".into(),
            first_name: "Ada".into(),
            password: "secret".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_topics() {
        assert_eq!(all_user_topics(), ["user-created", "user-updated", "user-deleted"]);
        assert_eq!(UserEvent::Deleted("x".into()).topic(), "user-deleted");
    }

    #[test]
    fn test_deletion_payload_is_bare_id() {
        let payload = UserEvent::Deleted("0b6f1d55".into()).payload().unwrap();
        assert_eq!(payload, "0b6f1d55");
    }

    #[test]
    fn test_creation_payload_includes_password() {
        let payload = UserEvent::Created(user()).payload().unwrap();
        let json: serde_json::Value = serde_json::from_str(&payload).unwrap();

        assert_eq!(json["id"], "u-1");
        assert_eq!(json["password"], "secret");
    }

    #[test]
    fn test_decode_matches_topic() {
        let body = UserEvent::Updated(user()).payload().unwrap();

        assert_eq!(
            UserEvent::decode(TOPIC_USER_UPDATED, &body).unwrap(),
            UserEvent::Updated(user())
        );
        assert_eq!(
            UserEvent::decode(TOPIC_USER_DELETED, "u-1").unwrap(),
            UserEvent::Deleted("u-1".into())
        );
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(matches!(
            UserEvent::decode("user-renamed", "{}"),
            Err(EventDecodeError::UnknownTopic(_))
        ));
        assert!(matches!(
            UserEvent::decode(TOPIC_USER_CREATED, "u-1"),
            Err(EventDecodeError::InvalidPayload { topic: TOPIC_USER_CREATED, .. })
        ));
    }
}
