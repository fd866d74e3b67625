use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level gateway configuration, read once at startup.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub environment: Environment,
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub services: ServicesConfig,
    pub webhooks: WebhookConfig,
    pub log: LogConfig,
    pub runtime: RuntimeSettings,
}

/// Thin Arc-wrapped config for inexpensive cloning into handlers and middleware.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ApiConfig {
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Deployment environment. Only `development` exposes error internals and verbose
/// access logs.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    #[serde(alias = "dev")]
    Development,
    Test,
    #[serde(alias = "stage")]
    Staging,
    #[serde(alias = "prod")]
    Production,
}

impl Environment {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }

    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A credential that never shows up in `Debug` output or logs.
#[derive(Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() { f.write_str("Secret(<unset>)") } else { f.write_str("Secret(***)") }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
    /// Seconds in-flight requests get to finish after a shutdown signal.
    pub shutdown_grace_secs: u64,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Cross-cutting HTTP policy: CORS, body cap and static assets.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub allowed_origin: String,
    pub allowed_headers: Vec<String>,
    pub max_body_bytes: usize,
    pub static_dir: PathBuf,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub openai: OpenAiConfig,
    pub supabase: SupabaseConfig,
}

/// Embedding provider settings (OpenAI-compatible API).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: Secret,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_input_chars: usize,
}

/// Managed Postgres/vector store settings (Supabase `PostgREST`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_key: Secret,
    pub timeout_secs: u64,
    pub documents_table: String,
    pub blogs_table: String,
    pub analytics_table: String,
    pub match_function: String,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Shared secret expected in `x-webhook-secret`. Unset rejects every webhook call.
    pub secret: Option<Secret>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub filter: Option<String>,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeFlavor {
    #[default]
    MultiThread,
    CurrentThread,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub flavor: RuntimeFlavor,
    pub worker_threads: Option<usize>,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3001,
            ssl: None,
            shutdown_grace_secs: 30,
        }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            allowed_origin: "http://localhost:3000".to_owned(),
            allowed_headers: ["Content-Type", "Authorization", "X-Requested-With", "X-Request-Id"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            max_body_bytes: crate::constants::MAX_BODY_BYTES,
            static_dir: PathBuf::from("public"),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: Secret::default(),
            base_url: "https://api.openai.com/v1".to_owned(),
            model: "text-embedding-3-small".to_owned(),
            timeout_secs: 30,
            max_input_chars: 8_000,
        }
    }
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            service_key: Secret::default(),
            timeout_secs: 15,
            documents_table: "documents".to_owned(),
            blogs_table: "blogs".to_owned(),
            analytics_table: "search_analytics".to_owned(),
            match_function: "match_documents".to_owned(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), dir: None, json: false, filter: None }
    }
}
