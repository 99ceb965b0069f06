use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    books::{
        dto::{
            AddBookRequest, BookDetailsResponse, BookResponse, BooksResponse, DeletedResponse,
            SearchQuery, UpdateBookRequest,
        },
        media,
        repo::{self, BookUpdate, NewBook},
    },
    error::ApiError,
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/fetch-books", get(fetch_books))
        .route("/search", get(search))
        .route("/fetch-book/:id", get(fetch_book))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/add-book", post(add_book))
        .route("/update-book/:id", post(update_book))
        .route("/delete-book/:id", delete(delete_book))
}

#[instrument(skip(state, payload))]
pub async fn add_book(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<AddBookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    if payload.image.is_empty() || payload.title.trim().is_empty() {
        return Err(ApiError::validation("Image and title are required."));
    }

    let asset = media::upload_cover(state.storage.as_ref(), &payload.image).await?;

    let created = repo::insert(
        &state.db,
        NewBook {
            image_url: &asset.url,
            image_key: &asset.key,
            title: &payload.title,
            subtitle: payload.subtitle.as_deref(),
            author: &payload.author,
            link: &payload.link,
            review: payload.review.as_deref(),
            user_id,
        },
    )
    .await;

    let book = match created {
        Ok(b) => b,
        Err(e) => {
            warn!(error = %e, key = %asset.key, "insert failed after upload; removing fresh cover");
            media::delete_cover(state.storage.as_ref(), &asset.key).await;
            return Err(ApiError::Downstream(e));
        }
    };

    info!(book_id = %book.id, user_id = %user_id, "book added");
    Ok(Json(BookResponse {
        book,
        message: "Book added successfully.".into(),
    }))
}

#[instrument(skip(state))]
pub async fn fetch_books(State(state): State<AppState>) -> Result<Json<BooksResponse>, ApiError> {
    let books = repo::list_newest_first(&state.db).await?;
    Ok(Json(BooksResponse { books }))
}

#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<BooksResponse>, ApiError> {
    let books = repo::search_by_title(&state.db, &q.search_term).await?;
    Ok(Json(BooksResponse { books }))
}

#[instrument(skip(state))]
pub async fn fetch_book(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookDetailsResponse>, ApiError> {
    let book = repo::find_with_owner(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Book not found."))?;
    Ok(Json(BookDetailsResponse { book }))
}

#[instrument(skip(state))]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let book = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::validation("Book not found."))?;

    // Asset first, record second; an orphaned asset is accepted, a record
    // pointing at a deleted asset is not.
    media::delete_cover(state.storage.as_ref(), &book.image_key).await;
    repo::delete(&state.db, id).await?;

    info!(book_id = %id, user_id = %user_id, "book deleted");
    Ok(Json(DeletedResponse {
        message: "Book deleted successfully.".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_book(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    let existing = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::validation("Book not found."))?;

    let new_asset = match payload.image.as_deref() {
        Some(raw) if !raw.is_empty() => {
            Some(media::upload_cover(state.storage.as_ref(), raw).await?)
        }
        _ => None,
    };

    let updated = repo::update(
        &state.db,
        id,
        BookUpdate {
            image_url: new_asset.as_ref().map(|a| a.url.as_str()),
            image_key: new_asset.as_ref().map(|a| a.key.as_str()),
            title: &payload.title,
            subtitle: payload.subtitle.as_deref(),
            author: &payload.author,
            link: &payload.link,
            review: payload.review.as_deref(),
        },
    )
    .await;

    let book = match updated {
        Ok(Some(b)) => b,
        Ok(None) => {
            if let Some(asset) = &new_asset {
                media::delete_cover(state.storage.as_ref(), &asset.key).await;
            }
            return Err(ApiError::validation("Book not found."));
        }
        Err(e) => {
            if let Some(asset) = &new_asset {
                warn!(error = %e, key = %asset.key, "update failed after upload; removing fresh cover");
                media::delete_cover(state.storage.as_ref(), &asset.key).await;
            }
            return Err(ApiError::Downstream(e));
        }
    };

    // The old cover goes only once the record points at the new one.
    if new_asset.is_some() {
        media::delete_cover(state.storage.as_ref(), &existing.image_key).await;
    }

    info!(book_id = %book.id, user_id = %user_id, "book updated");
    Ok(Json(BookResponse {
        book,
        message: "Book updated successfully.".into(),
    }))
}
