use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    /// Base URL covers are served from; objects live at `<base>/<key>`.
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub cookie_secure: bool,
    pub allowed_origin: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            ttl_days: std::env::var("TOKEN_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(7),
        };
        let endpoint = std::env::var("S3_ENDPOINT")?;
        let bucket = std::env::var("S3_BUCKET")?;
        let storage = StorageConfig {
            public_base_url: std::env::var("S3_PUBLIC_URL")
                .unwrap_or_else(|_| format!("{}/{}", endpoint, bucket)),
            access_key: std::env::var("S3_ACCESS_KEY")?,
            secret_key: std::env::var("S3_SECRET_KEY")?,
            endpoint,
            bucket,
        };
        let cookie_secure = std::env::var("APP_ENV")
            .map(|v| v == "production")
            .unwrap_or(false);
        let allowed_origin =
            std::env::var("ALLOWED_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".into());
        Ok(Self {
            database_url,
            jwt,
            storage,
            cookie_secure,
            allowed_origin,
        })
    }
}
