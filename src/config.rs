use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    /// Base URL prepended to object keys when building thumbnail URLs.
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub otp_ttl_minutes: i64,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "mediaverse".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "mediaverse-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let otp_ttl_minutes = std::env::var("OTP_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(5);
        let endpoint =
            std::env::var("STORAGE_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".into());
        let bucket = std::env::var("STORAGE_BUCKET").unwrap_or_else(|_| "mediaverse".into());
        let storage = StorageConfig {
            public_base_url: std::env::var("STORAGE_PUBLIC_URL")
                .unwrap_or_else(|_| format!("{}/{}", endpoint, bucket)),
            endpoint,
            bucket,
            access_key: std::env::var("STORAGE_ACCESS_KEY").unwrap_or_default(),
            secret_key: std::env::var("STORAGE_SECRET_KEY").unwrap_or_default(),
        };
        Ok(Self {
            database_url,
            jwt,
            otp_ttl_minutes,
            storage,
        })
    }
}
