pub use crate::books::repo_types::{Book, BookWithOwner};
use sqlx::PgPool;
use uuid::Uuid;

const BOOK_COLUMNS: &str =
    "id, image_url, image_key, title, subtitle, author, link, review, user_id, created_at";

#[derive(Debug)]
pub struct NewBook<'a> {
    pub image_url: &'a str,
    pub image_key: &'a str,
    pub title: &'a str,
    pub subtitle: Option<&'a str>,
    pub author: &'a str,
    pub link: &'a str,
    pub review: Option<&'a str>,
    pub user_id: Uuid,
}

/// Field set for update-book. Text fields always overwrite; the image pair
/// is only swapped when a new cover was uploaded.
#[derive(Debug)]
pub struct BookUpdate<'a> {
    pub image_url: Option<&'a str>,
    pub image_key: Option<&'a str>,
    pub title: &'a str,
    pub subtitle: Option<&'a str>,
    pub author: &'a str,
    pub link: &'a str,
    pub review: Option<&'a str>,
}

pub async fn insert(db: &PgPool, new: NewBook<'_>) -> anyhow::Result<Book> {
    let book = sqlx::query_as::<_, Book>(&format!(
        r#"
        INSERT INTO books (image_url, image_key, title, subtitle, author, link, review, user_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {BOOK_COLUMNS}
        "#
    ))
    .bind(new.image_url)
    .bind(new.image_key)
    .bind(new.title)
    .bind(new.subtitle)
    .bind(new.author)
    .bind(new.link)
    .bind(new.review)
    .bind(new.user_id)
    .fetch_one(db)
    .await?;
    Ok(book)
}

pub async fn list_newest_first(db: &PgPool) -> anyhow::Result<Vec<Book>> {
    let books = sqlx::query_as::<_, Book>(&format!(
        r#"
        SELECT {BOOK_COLUMNS}
        FROM books
        ORDER BY created_at DESC
        "#
    ))
    .fetch_all(db)
    .await?;
    Ok(books)
}

/// Case-insensitive substring match on title, newest first. An empty term
/// matches everything.
pub async fn search_by_title(db: &PgPool, term: &str) -> anyhow::Result<Vec<Book>> {
    let books = sqlx::query_as::<_, Book>(&format!(
        r#"
        SELECT {BOOK_COLUMNS}
        FROM books
        WHERE title ILIKE $1
        ORDER BY created_at DESC
        "#
    ))
    .bind(like_pattern(term))
    .fetch_all(db)
    .await?;
    Ok(books)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Book>> {
    let book = sqlx::query_as::<_, Book>(&format!(
        r#"
        SELECT {BOOK_COLUMNS}
        FROM books
        WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(book)
}

pub async fn find_with_owner(db: &PgPool, id: Uuid) -> anyhow::Result<Option<BookWithOwner>> {
    let book = sqlx::query_as::<_, BookWithOwner>(
        r#"
        SELECT b.id, b.image_url, b.image_key, b.title, b.subtitle, b.author,
               b.link, b.review, b.user_id, b.created_at, u.username
        FROM books b
        JOIN users u ON u.id = b.user_id
        WHERE b.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(book)
}

pub async fn update(db: &PgPool, id: Uuid, upd: BookUpdate<'_>) -> anyhow::Result<Option<Book>> {
    let book = sqlx::query_as::<_, Book>(&format!(
        r#"
        UPDATE books
        SET title = $2,
            subtitle = $3,
            author = $4,
            link = $5,
            review = $6,
            image_url = COALESCE($7, image_url),
            image_key = COALESCE($8, image_key)
        WHERE id = $1
        RETURNING {BOOK_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(upd.title)
    .bind(upd.subtitle)
    .bind(upd.author)
    .bind(upd.link)
    .bind(upd.review)
    .bind(upd.image_url)
    .bind(upd.image_key)
    .fetch_optional(db)
    .await?;
    Ok(book)
}

pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM books WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

/// Escape LIKE wildcards in a user-supplied term and wrap it for substring
/// matching.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
