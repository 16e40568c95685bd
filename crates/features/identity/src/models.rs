use serde::{Deserialize, Serialize};
use surrealdb::types::SurrealValue;
use utoipa::ToSchema;

/// Stored user row. Never serialized to the wire; see [`UserOut`].
#[derive(Debug, Clone, SurrealValue)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
}

/// Registration payload.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RegisterUser {
    /// Unique login email.
    pub email: String,
    /// Plain-text password; stored only as an argon2 hash.
    pub password: String,
    /// Display name.
    pub name: String,
}

/// Public projection of a user.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserOut {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl From<UserRecord> for UserOut {
    fn from(user: UserRecord) -> Self {
        Self { id: user.id, email: user.email, name: user.name }
    }
}

/// Login payload for the token endpoint.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

/// Issued bearer token.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Partial profile update; absent fields stay untouched. Email is immutable.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub password: Option<String>,
}
