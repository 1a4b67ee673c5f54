use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_RETURN_URL: &str = "http://www.satsang.org.in/payment_response";
pub const DEFAULT_RAZORPAY_API_URL: &str = "https://api.razorpay.com/v1";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub billdesk: Option<BillDeskConfig>,
    pub razorpay: Option<RazorpayConfig>,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Empty means any origin is allowed.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub development: bool,
}

#[derive(Clone, Deserialize)]
pub struct BillDeskConfig {
    pub merchant_id: String,
    pub security_id: String,
    pub base_url: String,
    pub return_url: String,
    pub checksum_key: Option<String>,
    pub checksum_enabled: bool,
}

#[derive(Clone, Deserialize)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: String,
    pub api_base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    File,
    Postgres,
    Memory,
}

#[derive(Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub file_path: PathBuf,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

// Secrets stay out of log output.
impl fmt::Debug for BillDeskConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BillDeskConfig")
            .field("merchant_id", &self.merchant_id)
            .field("security_id", &self.security_id)
            .field("base_url", &self.base_url)
            .field("return_url", &self.return_url)
            .field("checksum_key", &self.checksum_key.as_ref().map(|_| "<redacted>"))
            .field("checksum_enabled", &self.checksum_enabled)
            .finish()
    }
}

impl fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("backend", &self.backend)
            .field("file_path", &self.file_path)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
            request_timeout_secs: 30,
            development: false,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            file_path: PathBuf::from("orders.json"),
            database_url: None,
            max_connections: 10,
        }
    }
}

impl StorageBackend {
    fn parse(value: &str) -> Result<Self, config::ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(config::ConfigError::Message(format!(
                "unknown storage backend '{}', expected file, postgres or memory",
                other
            ))),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(config::Environment::default())
    }

    fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080)?
            .set_default("request.timeout.secs", 30)?
            .set_default("storage.backend", "file")?
            .set_default("orders.file", "orders.json")?
            .set_default("database.max.connections", 10)?
            // Values stay strings so digit-only secrets keep their leading zeros;
            // get_int and get_bool still convert on read.
            .add_source(environment.separator("_").try_parsing(false))
            .build()?;

        // Manual construction due to environment variable naming
        let billdesk = match config.get_string("bd.mid") {
            Ok(merchant_id) => Some(BillDeskConfig {
                merchant_id,
                security_id: config.get_string("bd.sec.id")?,
                base_url: config.get_string("bd.base.url")?,
                return_url: config
                    .get_string("bd.return.url")
                    .unwrap_or_else(|_| DEFAULT_RETURN_URL.to_string()),
                checksum_key: config.get_string("bd.checksum.key").ok(),
                checksum_enabled: config.get_bool("bd.checksum.enabled").unwrap_or(true),
            }),
            Err(_) => None,
        };

        let razorpay = match config.get_string("razorpay.key.id") {
            Ok(key_id) => {
                let key_secret = config.get_string("razorpay.key.secret")?;
                if key_secret.trim().is_empty() {
                    return Err(config::ConfigError::Message(
                        "RAZORPAY_KEY_SECRET must not be empty".to_string(),
                    ));
                }
                Some(RazorpayConfig {
                    key_id,
                    key_secret,
                    api_base_url: config
                        .get_string("razorpay.api.url")
                        .unwrap_or_else(|_| DEFAULT_RAZORPAY_API_URL.to_string()),
                    timeout_secs: config.get_int("razorpay.timeout.secs").unwrap_or(30) as u64,
                })
            }
            Err(_) => None,
        };

        let cors_origins = config
            .get_string("cors.origins")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Config {
            server: ServerConfig {
                host: config.get_string("host").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: config.get_int("port").unwrap_or(8080) as u16,
                cors_origins,
                request_timeout_secs: config.get_int("request.timeout.secs").unwrap_or(30) as u64,
                development: config
                    .get_string("app.env")
                    .map(|env| env.eq_ignore_ascii_case("development"))
                    .unwrap_or(false),
            },
            billdesk,
            razorpay,
            storage: StorageConfig {
                backend: StorageBackend::parse(&config.get_string("storage.backend")?)?,
                file_path: PathBuf::from(config.get_string("orders.file")?),
                database_url: config.get_string("database.url").ok(),
                max_connections: config.get_int("database.max.connections").unwrap_or(10) as u32,
            },
        })
    }
}
