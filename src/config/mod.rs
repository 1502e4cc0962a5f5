use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

pub const DEFAULT_API_TOKEN: &str = "default-secret-token";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub media: MediaConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub api_token: String,
    /// When false, record create/update/delete skip the bearer check.
    /// Image upload and delete are always protected.
    #[serde(default = "default_true")]
    pub protect_records: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    #[serde(default = "default_origins")]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MediaConfig {
    /// `cloudinary://<api_key>:<api_secret>@<cloud_name>`
    pub cloudinary_url: Option<String>,
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    #[serde(default = "default_folder")]
    pub default_folder: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Resolved Cloudinary account credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

fn default_true() -> bool {
    true
}

fn default_origins() -> Vec<String> {
    vec!["https://tuusuario.github.io".to_string()]
}

fn default_folder() -> String {
    "img".to_string()
}

fn default_api_base() -> String {
    "https://api.cloudinary.com/v1_1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_origins(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            cloudinary_url: None,
            cloud_name: None,
            api_key: None,
            api_secret: None,
            default_folder: default_folder(),
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl MediaConfig {
    /// Explicit fields win over the ones packed into `cloudinary_url`.
    /// Returns `None` unless all three credentials end up present.
    pub fn credentials(&self) -> Option<MediaCredentials> {
        let from_url = self
            .cloudinary_url
            .as_deref()
            .and_then(parse_cloudinary_url);

        let pick = |explicit: &Option<String>, packed: Option<&String>| {
            explicit
                .clone()
                .filter(|s| !s.is_empty())
                .or_else(|| packed.cloned())
        };

        Some(MediaCredentials {
            cloud_name: pick(&self.cloud_name, from_url.as_ref().map(|c| &c.cloud_name))?,
            api_key: pick(&self.api_key, from_url.as_ref().map(|c| &c.api_key))?,
            api_secret: pick(&self.api_secret, from_url.as_ref().map(|c| &c.api_secret))?,
        })
    }
}

fn parse_cloudinary_url(raw: &str) -> Option<MediaCredentials> {
    let url = reqwest::Url::parse(raw).ok()?;
    if url.scheme() != "cloudinary" {
        return None;
    }

    let cloud_name = url.host_str()?.to_string();
    let api_key = url.username().to_string();
    let api_secret = url.password()?.to_string();

    if cloud_name.is_empty() || api_key.is_empty() || api_secret.is_empty() {
        return None;
    }

    Some(MediaCredentials {
        cloud_name,
        api_key,
        api_secret,
    })
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let legacy_origins = std::env::var("CORS_ORIGINS").ok().map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        });

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("database.url", "sqlite://comunicados.db?mode=rwc")?
            .set_default("database.max_connections", 5)?
            .set_default("auth.api_token", DEFAULT_API_TOKEN)?
            .set_default("auth.protect_records", true)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with LINARES__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("LINARES").separator("__"))

            // Flat variables used by existing deployments
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .set_override_option("auth.api_token", std::env::var("API_TOKEN").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("media.cloudinary_url", std::env::var("CLOUDINARY_URL").ok())?
            .set_override_option("cors.allowed_origins", legacy_origins)?

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: "sqlite://comunicados.db?mode=rwc".to_string(),
                max_connections: 5,
            },
            auth: AuthConfig {
                api_token: DEFAULT_API_TOKEN.to_string(),
                protect_records: true,
            },
            cors: CorsConfig::default(),
            media: MediaConfig::default(),
        }
    }
}
