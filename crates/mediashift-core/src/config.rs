//! Configuration module
//!
//! `AppConfig` is always loadable: it carries the database settings and the
//! raw, possibly incomplete offload settings. `MigrationConfig` is the
//! validated form the migration engine is constructed with; building it
//! fails with `AppError::Configuration` unless every required field is set.

use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::error::AppError;
use crate::location::LocationRules;

// Common constants
const MAX_CONNECTIONS: u32 = 5;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const SERVER_PORT: u16 = 4000;
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_KEY_PREFIX: &str = "uploads/";
const DEFAULT_REMOTE_MARKER: &str = "amazonaws.com";
const DEFAULT_MEDIA_TYPE: &str = "attachment";
const DEFAULT_BATCH_SIZE: u32 = 10;
const DEFAULT_SCHEDULE_INTERVAL_MS: u64 = 1000;

/// Raw offload settings as read from the environment. Any field may be missing.
#[derive(Clone, Default)]
pub struct OffloadSettings {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Custom endpoint for S3-compatible providers (MinIO, DigitalOcean Spaces, etc.)
    pub endpoint: Option<String>,
    pub key_prefix: Option<String>,
    pub cdn_url: Option<String>,
    pub remote_marker: Option<String>,
    pub local_root: Option<String>,
    pub media_type: Option<String>,
    pub batch_size: Option<u32>,
}

impl fmt::Debug for OffloadSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OffloadSettings")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("endpoint", &self.endpoint)
            .field("key_prefix", &self.key_prefix)
            .field("cdn_url", &self.cdn_url)
            .field("remote_marker", &self.remote_marker)
            .field("local_root", &self.local_root)
            .field("media_type", &self.media_type)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl OffloadSettings {
    pub fn from_env() -> Self {
        Self {
            bucket: non_empty_var("OFFLOAD_S3_BUCKET"),
            region: non_empty_var("OFFLOAD_S3_REGION"),
            access_key_id: non_empty_var("OFFLOAD_S3_ACCESS_KEY_ID"),
            secret_access_key: non_empty_var("OFFLOAD_S3_SECRET_ACCESS_KEY"),
            endpoint: non_empty_var("OFFLOAD_S3_ENDPOINT"),
            key_prefix: env::var("OFFLOAD_KEY_PREFIX").ok(),
            cdn_url: non_empty_var("OFFLOAD_CDN_URL"),
            remote_marker: non_empty_var("OFFLOAD_REMOTE_MARKER"),
            local_root: non_empty_var("OFFLOAD_LOCAL_ROOT"),
            media_type: non_empty_var("OFFLOAD_MEDIA_TYPE"),
            batch_size: env::var("OFFLOAD_BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n| n > 0),
        }
    }

    /// Whether every required field is present, without building the validated config.
    pub fn is_configured(&self) -> bool {
        self.missing_fields().is_empty()
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.bucket) {
            missing.push("OFFLOAD_S3_BUCKET");
        }
        if is_blank(&self.access_key_id) {
            missing.push("OFFLOAD_S3_ACCESS_KEY_ID");
        }
        if is_blank(&self.secret_access_key) {
            missing.push("OFFLOAD_S3_SECRET_ACCESS_KEY");
        }
        if is_blank(&self.cdn_url) {
            missing.push("OFFLOAD_CDN_URL");
        }
        missing
    }
}

/// Static credentials for the object store.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Validated, immutable migration configuration.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub bucket: String,
    pub region: String,
    pub credentials: Credentials,
    pub endpoint: Option<String>,
    pub location: LocationRules,
    /// Base directory for relative stored paths.
    pub local_root: Option<PathBuf>,
    /// Catalog item type the engine manages.
    pub media_type: String,
    /// Default batch size for the batch endpoint and the scheduler.
    pub batch_size: u32,
}

impl MigrationConfig {
    /// Validate raw settings. Either every required field is non-empty or this fails,
    /// naming all of the missing ones.
    pub fn from_settings(settings: &OffloadSettings) -> Result<Self, AppError> {
        let missing = settings.missing_fields();
        if !missing.is_empty() {
            return Err(AppError::Configuration(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        let cdn_url = settings.cdn_url.clone().unwrap_or_default();
        if !(cdn_url.starts_with("https://") || cdn_url.starts_with("http://")) {
            return Err(AppError::Configuration(
                "OFFLOAD_CDN_URL must be an http(s) URL".to_string(),
            ));
        }

        let key_prefix = settings
            .key_prefix
            .clone()
            .unwrap_or_else(|| DEFAULT_KEY_PREFIX.to_string());
        // Object keys may not climb out of the prefix; the store would reject every put.
        if key_prefix.split('/').any(|segment| segment == "..") {
            return Err(AppError::Configuration(format!(
                "OFFLOAD_KEY_PREFIX must not contain '..' segments: {}",
                key_prefix
            )));
        }

        let remote_marker = settings
            .remote_marker
            .clone()
            .unwrap_or_else(|| DEFAULT_REMOTE_MARKER.to_string());
        if !cdn_url.contains(&remote_marker) {
            // Migrated items are recognised by the marker only; with this CDN host they will
            // keep being selected as local.
            tracing::warn!(
                cdn_url = %cdn_url,
                remote_marker = %remote_marker,
                "CDN URL does not contain the remote marker; migrated items will still classify as local"
            );
        }

        Ok(Self {
            bucket: settings.bucket.clone().unwrap_or_default(),
            region: settings
                .region
                .clone()
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            credentials: Credentials {
                access_key_id: settings.access_key_id.clone().unwrap_or_default(),
                secret_access_key: settings.secret_access_key.clone().unwrap_or_default(),
            },
            endpoint: settings.endpoint.clone(),
            location: LocationRules::new(key_prefix, cdn_url, remote_marker),
            local_root: settings.local_root.as_ref().map(PathBuf::from),
            media_type: settings
                .media_type
                .clone()
                .unwrap_or_else(|| DEFAULT_MEDIA_TYPE.to_string()),
            batch_size: settings.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
        })
    }

    pub fn cdn_base_url(&self) -> &str {
        self.location.cdn_base_url()
    }
}

/// Batch scheduler settings.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub enabled: bool,
    /// Delay between consecutive batches, as backpressure against rate limits.
    pub interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: DEFAULT_SCHEDULE_INTERVAL_MS,
        }
    }
}

/// Process configuration for the API server and the CLI.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub server_port: u16,
    pub environment: String,
    pub offload: OffloadSettings,
    pub scheduler: SchedulerConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let config = AppConfig {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            offload: OffloadSettings::from_env(),
            scheduler: SchedulerConfig {
                enabled: env::var("OFFLOAD_SCHEDULE_ENABLED")
                    .unwrap_or_else(|_| "false".to_string())
                    .to_lowercase()
                    .parse()
                    .unwrap_or(false),
                interval_ms: env::var("OFFLOAD_SCHEDULE_INTERVAL_MS")
                    .unwrap_or_else(|_| DEFAULT_SCHEDULE_INTERVAL_MS.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_SCHEDULE_INTERVAL_MS),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.database_url.starts_with("postgres://")
            || self.database_url.starts_with("postgresql://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }
        if self.db_max_connections == 0 {
            return Err(anyhow::anyhow!("DB_MAX_CONNECTIONS must be at least 1"));
        }
        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Validated migration settings, or the configuration error that disables migration.
    pub fn migration(&self) -> Result<MigrationConfig, AppError> {
        MigrationConfig::from_settings(&self.offload)
    }

    /// Managed media type, available even when offload is not configured.
    pub fn media_type(&self) -> &str {
        self.offload.media_type.as_deref().unwrap_or(DEFAULT_MEDIA_TYPE)
    }

    /// Remote marker, available even when offload is not configured.
    pub fn remote_marker(&self) -> &str {
        self.offload
            .remote_marker
            .as_deref()
            .unwrap_or(DEFAULT_REMOTE_MARKER)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or("").is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_settings() -> OffloadSettings {
        OffloadSettings {
            bucket: Some("media-bucket".to_string()),
            access_key_id: Some("AKIAEXAMPLE".to_string()),
            secret_access_key: Some("secret".to_string()),
            cdn_url: Some("https://media-bucket.s3.amazonaws.com".to_string()),
            ..OffloadSettings::default()
        }
    }

    #[test]
    fn complete_settings_apply_defaults() {
        let config = MigrationConfig::from_settings(&complete_settings()).unwrap();
        assert_eq!(config.bucket, "media-bucket");
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.location.key_prefix(), "uploads/");
        assert_eq!(config.location.remote_marker(), "amazonaws.com");
        assert_eq!(config.media_type, "attachment");
        assert_eq!(config.batch_size, 10);
        assert!(config.local_root.is_none());
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let settings = OffloadSettings {
            bucket: Some("media-bucket".to_string()),
            secret_access_key: Some("   ".to_string()),
            ..OffloadSettings::default()
        };
        assert!(!settings.is_configured());

        let err = MigrationConfig::from_settings(&settings).unwrap_err();
        assert!(err.is_configuration());
        let message = err.to_string();
        assert!(message.contains("OFFLOAD_S3_ACCESS_KEY_ID"));
        assert!(message.contains("OFFLOAD_S3_SECRET_ACCESS_KEY"));
        assert!(message.contains("OFFLOAD_CDN_URL"));
        assert!(!message.contains("OFFLOAD_S3_BUCKET"));
    }

    #[test]
    fn cdn_url_must_be_http() {
        let settings = OffloadSettings {
            cdn_url: Some("cdn.example.com".to_string()),
            ..complete_settings()
        };
        let err = MigrationConfig::from_settings(&settings).unwrap_err();
        assert!(err.to_string().contains("OFFLOAD_CDN_URL"));
    }

    #[test]
    fn empty_prefix_is_allowed() {
        let settings = OffloadSettings {
            key_prefix: Some(String::new()),
            ..complete_settings()
        };
        let config = MigrationConfig::from_settings(&settings).unwrap();
        assert_eq!(config.location.remote_key("/srv/a.jpg").as_deref(), Some("a.jpg"));
    }

    #[test]
    fn parent_segments_in_prefix_are_rejected() {
        for prefix in ["../uploads", "media/../../etc", ".."] {
            let settings = OffloadSettings {
                key_prefix: Some(prefix.to_string()),
                ..complete_settings()
            };
            let err = MigrationConfig::from_settings(&settings).unwrap_err();
            assert!(err.is_configuration(), "{}", prefix);
            assert!(err.to_string().contains("OFFLOAD_KEY_PREFIX"));
        }

        let settings = OffloadSettings {
            key_prefix: Some("media/..backup/".to_string()),
            ..complete_settings()
        };
        assert!(MigrationConfig::from_settings(&settings).is_ok());
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = MigrationConfig::from_settings(&complete_settings()).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("\"secret\""));
        assert!(rendered.contains("<redacted>"));

        let rendered = format!("{:?}", complete_settings());
        assert!(!rendered.contains("\"secret\""));
    }

    #[test]
    fn database_url_must_be_postgres() {
        let config = AppConfig {
            database_url: "mysql://localhost/db".to_string(),
            db_max_connections: 5,
            db_timeout_seconds: 30,
            server_port: 4000,
            environment: "development".to_string(),
            offload: OffloadSettings::default(),
            scheduler: SchedulerConfig::default(),
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            database_url: "postgres://localhost/db".to_string(),
            ..config
        };
        assert!(config.validate().is_ok());
        assert!(config.migration().is_err());
        assert_eq!(config.media_type(), "attachment");
    }
}
