use std::path::PathBuf;
use std::time::Duration;

use storyloom_providers::{openai, replicate};

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// Time-to-headers limit in seconds (default: `180`). Streamed
    /// generation bodies are not cut off by it.
    pub request_timeout_secs: u64,
    /// How long in-flight requests may drain after a shutdown signal
    /// (default: `30`).
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `180`                      |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "180".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
        }
    }
}

/// Where generated images are written.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageConfig {
    /// Files under `dir`, served by this server at `/blobs`.
    Local {
        dir: PathBuf,
        public_base_url: String,
    },
    /// An S3 bucket; `public_base_url` fronts the bucket (CDN or website
    /// endpoint).
    S3 {
        bucket: String,
        public_base_url: String,
    },
}

/// Route the local blob directory is served under.
pub const LOCAL_BLOB_ROUTE: &str = "/blobs";

/// Credentials and endpoints of the external services.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    /// Model for prompt improvement; the main model when unset.
    pub openai_improve_model: Option<String>,
    pub replicate_api_token: String,
    pub replicate_base_url: String,
    pub replicate_model: String,
    pub storage: StorageConfig,
    /// Pause between image generation attempts.
    pub image_retry_delay: Duration,
}

impl ProviderConfig {
    /// Load provider configuration from environment variables.
    ///
    /// Panics when a credential is missing so misconfiguration fails at
    /// startup rather than on the first request.
    ///
    /// | Env Var                 | Default                                  |
    /// |-------------------------|------------------------------------------|
    /// | `OPENAI_API_KEY`        | required                                 |
    /// | `OPENAI_BASE_URL`       | `https://api.openai.com/v1`              |
    /// | `OPENAI_MODEL`          | `gpt-4o`                                 |
    /// | `OPENAI_IMPROVE_MODEL`  | unset                                    |
    /// | `REPLICATE_API_TOKEN`   | required                                 |
    /// | `REPLICATE_BASE_URL`    | `https://api.replicate.com/v1`           |
    /// | `REPLICATE_MODEL`       | `black-forest-labs/flux-schnell`         |
    /// | `STORAGE_BACKEND`       | `local` (`local` or `s3`)                |
    /// | `LOCAL_BLOB_DIR`        | `./data/blobs`                           |
    /// | `S3_BUCKET`             | required when `STORAGE_BACKEND=s3`       |
    /// | `BLOB_PUBLIC_BASE_URL`  | `http://localhost:{PORT}/blobs` (local)  |
    /// | `IMAGE_RETRY_DELAY_MS`  | `2000`                                   |
    pub fn from_env(server: &ServerConfig) -> Self {
        let openai_api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set");
        let openai_base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| openai::DEFAULT_BASE_URL.into());
        let openai_model =
            std::env::var("OPENAI_MODEL").unwrap_or_else(|_| openai::DEFAULT_MODEL.into());
        let openai_improve_model = std::env::var("OPENAI_IMPROVE_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty());

        let replicate_api_token =
            std::env::var("REPLICATE_API_TOKEN").expect("REPLICATE_API_TOKEN must be set");
        let replicate_base_url = std::env::var("REPLICATE_BASE_URL")
            .unwrap_or_else(|_| replicate::DEFAULT_BASE_URL.into());
        let replicate_model =
            std::env::var("REPLICATE_MODEL").unwrap_or_else(|_| replicate::DEFAULT_MODEL.into());

        let public_base_url = std::env::var("BLOB_PUBLIC_BASE_URL").ok();
        let backend = std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "local".into());
        let storage = match backend.as_str() {
            "local" => StorageConfig::Local {
                dir: std::env::var("LOCAL_BLOB_DIR")
                    .unwrap_or_else(|_| "./data/blobs".into())
                    .into(),
                public_base_url: public_base_url.unwrap_or_else(|| {
                    format!("http://localhost:{}{LOCAL_BLOB_ROUTE}", server.port)
                }),
            },
            "s3" => StorageConfig::S3 {
                bucket: std::env::var("S3_BUCKET")
                    .expect("S3_BUCKET must be set when STORAGE_BACKEND=s3"),
                public_base_url: public_base_url
                    .expect("BLOB_PUBLIC_BASE_URL must be set when STORAGE_BACKEND=s3"),
            },
            other => panic!("STORAGE_BACKEND must be 'local' or 's3', got '{other}'"),
        };

        let image_retry_delay_ms: u64 = std::env::var("IMAGE_RETRY_DELAY_MS")
            .unwrap_or_else(|_| "2000".into())
            .parse()
            .expect("IMAGE_RETRY_DELAY_MS must be a valid u64");

        Self {
            openai_api_key,
            openai_base_url,
            openai_model,
            openai_improve_model,
            replicate_api_token,
            replicate_base_url,
            replicate_model,
            storage,
            image_retry_delay: Duration::from_millis(image_retry_delay_ms),
        }
    }

    /// Directory to serve at [`LOCAL_BLOB_ROUTE`], if blobs are local.
    pub fn local_blob_dir(&self) -> Option<&std::path::Path> {
        match &self.storage {
            StorageConfig::Local { dir, .. } => Some(dir.as_path()),
            StorageConfig::S3 { .. } => None,
        }
    }
}
