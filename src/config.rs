use serde::Deserialize;

/// Connection settings for the live store. Absence is a valid, expected
/// input: the resolver answers it with the in-memory fallback.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub url: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub max_age_secs: i64,
}

/// S3-compatible object storage for uploaded images and PDFs. Only built
/// when every field is configured.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectsConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub session: SessionConfig,
    pub objects: Option<ObjectsConfig>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let store = StoreConfig {
            url: std::env::var("REDIS_URL").ok(),
            token: std::env::var("REDIS_TOKEN").ok(),
        };

        let session = SessionConfig {
            cookie_name: std::env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "portfolio-auth-token".into()),
            max_age_secs: std::env::var("SESSION_MAX_AGE_SECS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 60 * 24),
        };

        let objects = match (
            std::env::var("S3_ENDPOINT").ok(),
            std::env::var("S3_BUCKET").ok(),
            std::env::var("S3_ACCESS_KEY").ok(),
            std::env::var("S3_SECRET_KEY").ok(),
        ) {
            (Some(endpoint), Some(bucket), Some(access_key), Some(secret_key)) => {
                Some(ObjectsConfig {
                    endpoint,
                    bucket,
                    access_key,
                    secret_key,
                    region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
                })
            }
            _ => None,
        };

        Self {
            store,
            session,
            objects,
        }
    }
}
