use serde::{Deserialize, Serialize};

use crate::books::repo_types::{Book, BookWithOwner};

/// Request body for add-book. The cover arrives inline (data URL or bare
/// base64), capped by the global body limit.
#[derive(Debug, Deserialize)]
pub struct AddBookRequest {
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub review: Option<String>,
}

/// Request body for update-book. Text fields always overwrite; the cover is
/// replaced only when supplied.
#[derive(Debug, Deserialize)]
pub struct UpdateBookRequest {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub review: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default, rename = "searchTerm")]
    pub search_term: String,
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub book: Book,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BooksResponse {
    pub books: Vec<Book>,
}

#[derive(Debug, Serialize)]
pub struct BookDetailsResponse {
    pub book: BookWithOwner,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
}
