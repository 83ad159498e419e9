use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Stored user record (collection `users`).
///
/// `password` holds the bcrypt hash, never the plaintext. The record is
/// never serialized to clients directly; responses go through the
/// whitelisted `UserInfo` DTO in the auth service.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: Option<BsonDateTime>,
}
