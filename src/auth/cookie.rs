use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

pub const SESSION_COOKIE: &str = "token";

/// HTTP-only, same-site-strict session cookie carrying the signed token.
pub fn session_cookie(token: String, ttl_days: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(Duration::days(ttl_days))
        .path("/")
        .build()
}

/// Zero-max-age cookie that instructs the browser to drop the session.
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(Duration::ZERO)
        .path("/")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_attributes() {
        let c = session_cookie("signed-token".into(), 7, true);
        assert_eq!(c.name(), "token");
        assert_eq!(c.value(), "signed-token");
        assert_eq!(c.http_only(), Some(true));
        assert_eq!(c.secure(), Some(true));
        assert_eq!(c.same_site(), Some(SameSite::Strict));
        assert_eq!(c.max_age(), Some(Duration::days(7)));
        assert_eq!(c.path(), Some("/"));
    }

    #[test]
    fn secure_flag_follows_config() {
        let c = session_cookie("t".into(), 7, false);
        assert_ne!(c.secure(), Some(true));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let c = clear_session_cookie();
        assert_eq!(c.name(), "token");
        assert_eq!(c.value(), "");
        assert_eq!(c.max_age(), Some(Duration::ZERO));
        assert_eq!(c.path(), Some("/"));
    }
}
