use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::User;

/// Request body for signup. Absent fields default to empty and fail the
/// handler's presence check with a 400 rather than a body-rejection.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            created_at: u.created_at,
        }
    }
}

/// Compact user summary returned by login.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// Response returned after signup.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user: PublicUser,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserSummary,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}
