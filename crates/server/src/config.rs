use shared_types::{AppConfig, FeatureFlags};
use std::path::PathBuf;
use std::sync::OnceLock;

static FLAGS: OnceLock<FeatureFlags> = OnceLock::new();

/// Path to the config file, relative to the project root.
const CONFIG_PATH: &str = "config.toml";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_TOKEN_MINUTES: i64 = 30;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
pub const DEFAULT_PINATA_URL: &str = "https://api.pinata.cloud/pinning/pinFileToIPFS";

/// Read `config.toml`, parse feature flags, and store them in the global
/// `OnceLock`. Safe to call multiple times; only the first call has effect.
///
/// If the file is missing or unparseable, all flags default to `false`.
pub fn load_feature_flags() {
    FLAGS.get_or_init(|| match std::fs::read_to_string(CONFIG_PATH) {
        Ok(contents) => {
            let config: AppConfig = toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to parse {CONFIG_PATH}, defaulting all flags off");
                AppConfig::default()
            });
            tracing::info!(flags = ?config.features, "Feature flags loaded");
            config.features
        }
        Err(e) => {
            tracing::info!(error = %e, "{CONFIG_PATH} not found, defaulting all flags off");
            FeatureFlags::default()
        }
    });
}

/// Get the loaded feature flags. Returns all-false defaults if
/// `load_feature_flags()` hasn't been called yet.
pub fn feature_flags() -> &'static FeatureFlags {
    static DEFAULT: FeatureFlags = FeatureFlags {
        pinata: false,
        telemetry: false,
    };
    FLAGS.get().unwrap_or(&DEFAULT)
}

/// Credentials for the Pinata pinning API.
#[derive(Debug, Clone, PartialEq)]
pub enum PinataAuth {
    Jwt(String),
    KeyPair { api_key: String, secret: String },
}

/// Runtime settings read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// `None` selects the in-process memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub pinata_auth: Option<PinataAuth>,
    pub pinata_url: String,
    pub upload_dir: PathBuf,
    pub bind_addr: String,
    pub max_upload_bytes: usize,
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, String> {
    match env_opt(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}

impl Settings {
    /// Load settings from the process environment (and `.env` when present).
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();

        let jwt_secret = env_opt("JWT_SECRET").ok_or("JWT_SECRET must be set")?;

        let pinata_auth = match (
            env_opt("PINATA_JWT"),
            env_opt("PINATA_API_KEY"),
            env_opt("PINATA_SECRET_API_KEY"),
        ) {
            (Some(jwt), _, _) => Some(PinataAuth::Jwt(jwt)),
            (None, Some(api_key), Some(secret)) => Some(PinataAuth::KeyPair { api_key, secret }),
            _ => None,
        };

        Ok(Self {
            database_url: env_opt("DATABASE_URL"),
            database_max_connections: env_parse("DATABASE_MAX_CONNECTIONS", 10)?,
            jwt_secret,
            access_token_minutes: env_parse("ACCESS_TOKEN_EXPIRE_MINUTES", DEFAULT_TOKEN_MINUTES)?,
            pinata_auth,
            pinata_url: env_opt("PINATA_URL").unwrap_or_else(|| DEFAULT_PINATA_URL.to_string()),
            upload_dir: PathBuf::from(
                env_opt("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string()),
            ),
            bind_addr: env_opt("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }

    /// Settings with defaults and the given secret; no database, no Pinata.
    pub fn with_secret(jwt_secret: impl Into<String>, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            database_url: None,
            database_max_connections: 10,
            jwt_secret: jwt_secret.into(),
            access_token_minutes: DEFAULT_TOKEN_MINUTES,
            pinata_auth: None,
            pinata_url: DEFAULT_PINATA_URL.to_string(),
            upload_dir: upload_dir.into(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}
