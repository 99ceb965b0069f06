use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Book record in the database.
///
/// `image_key` is the storage key the cover was uploaded under, kept
/// alongside the URL so deletion never has to parse the URL back apart.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: Uuid,
    pub image_url: String,
    pub image_key: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub author: String,
    pub link: String,
    pub review: Option<String>,
    pub user_id: Uuid, // owning reference, not used for access control
    pub created_at: OffsetDateTime,
}

/// Book joined with its owner's username for the single-book view.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BookWithOwner {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub book: Book,
    pub username: String,
}
