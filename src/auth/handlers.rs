use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        cookie::{clear_session_cookie, session_cookie},
        dto::{
            LoginRequest, LoginResponse, LogoutResponse, SignupRequest, SignupResponse,
            UserResponse, UserSummary,
        },
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::User,
    },
    error::ApiError,
    state::AppState,
};

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/fetch-user", get(fetch_user))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, jar, payload))]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(mut payload): Json<SignupRequest>,
) -> Result<(CookieJar, Json<SignupResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.username = payload.username.trim().to_string();

    if payload.username.is_empty() || payload.email.is_empty() || payload.password.is_empty() {
        warn!("signup with missing fields");
        return Err(ApiError::validation("All fields are required."));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::validation("Invalid email."));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::validation("Password too short."));
    }

    // Two independent existence checks; a race between concurrent signups is
    // not prevented and falls through to the unique constraint.
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::validation("User already exists."));
    }
    if User::find_by_username(&state.db, &payload.username)
        .await?
        .is_some()
    {
        warn!(username = %payload.username, "username taken");
        return Err(ApiError::validation("Username is taken, try another name."));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.username, &payload.email, &hash).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;
    let jar = jar.add(session_cookie(
        token,
        state.config.jwt.ttl_days,
        state.config.cookie_secure,
    ));

    info!(user_id = %user.id, username = %user.username, "user signed up");
    Ok((
        jar,
        Json(SignupResponse {
            user: user.into(),
            message: "User created successfully.".into(),
        }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(mut payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::validation("Invalid credentials.")
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::validation("Invalid credentials."));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;
    let jar = jar.add(session_cookie(
        token,
        state.config.jwt.ttl_days,
        state.config.cookie_secure,
    ));

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok((
        jar,
        Json(LoginResponse {
            user: UserSummary {
                id: user.id,
                username: user.username,
                email: user.email,
            },
            message: "Logged in successfully.".into(),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn fetch_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::validation("User not found."))?;

    Ok(Json(UserResponse { user: user.into() }))
}

#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    (
        jar.add(clear_session_cookie()),
        Json(LogoutResponse {
            message: "Logged out successfully.".into(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::dto::PublicUser;
    use time::OffsetDateTime;
    use uuid::Uuid;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("reader@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two@at@signs.com"));
        assert!(!is_valid_email("spaces @domain.com"));
        assert!(!is_valid_email("nodot@domain"));
    }

    #[test]
    fn user_row_never_serializes_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            username: "reader".into(),
            email: "reader@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "reader");
    }

    #[test]
    fn public_user_carries_no_secret_field() {
        let user = User {
            id: Uuid::new_v4(),
            username: "reader".into(),
            email: "reader@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        let public: PublicUser = user.into();
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "reader@example.com");
    }
}
