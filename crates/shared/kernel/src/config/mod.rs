use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::de::DeserializeOwned;
use sgate_domain::config::ApiConfig;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

pub use config::Map;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_VAR: &str = "SGATE_CONFIG";
/// Prefix for structured overrides, e.g. `SGATE__SERVER__PORT`.
pub const ENV_PREFIX: &str = "SGATE";

const DEFAULT_CONFIG_FILE: &str = "server";

/// Conventional variable names honored on top of the `SGATE__*` tree.
const ENV_ALIASES: &[(&str, &str)] = &[
    ("APP_ENV", "environment"),
    ("PORT", "server.port"),
    ("FRONTEND_URL", "http.allowed_origin"),
    ("OPENAI_API_KEY", "services.openai.api_key"),
    ("SUPABASE_URL", "services.supabase.url"),
    ("SUPABASE_SERVICE_KEY", "services.supabase.service_key"),
    ("WEBHOOK_SECRET", "webhooks.secret"),
];

#[sgate_derive::sgate_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// A reusable configuration loader that combines file-based settings with environment
/// overrides.
///
/// Layers, lowest priority first:
/// 1. **File**: `path` when given (must exist), otherwise `server.{toml,..}` in the working
///    directory when present.
/// 2. **Environment**: variables prefixed with `SGATE__`; nested keys use double
///    underscores (`SGATE__HTTP__ALLOWED_ORIGIN` maps to `http.allowed_origin`).
///
/// # Errors
/// Fails when an explicit file is missing or the merged tree does not match `T`.
///
/// # Example
/// ```rust
/// use sgate_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let config = base_builder(path.map(|p| p.as_ref().to_path_buf()), None)
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

/// Loads the gateway [`ApiConfig`] from the process environment.
///
/// Same layering as [`load_config`]; the file path falls back to `SGATE_CONFIG`, and the
/// conventional variables (`PORT`, `FRONTEND_URL`, `OPENAI_API_KEY`, `SUPABASE_URL`,
/// `SUPABASE_SERVICE_KEY`, `WEBHOOK_SECRET`, `APP_ENV`) override everything else.
///
/// # Errors
/// Fails when an explicit file is missing or a value has the wrong shape.
pub fn load_api_config(path: Option<impl AsRef<Path>>) -> Result<ApiConfig, ConfigError> {
    let vars: Map<String, String> = std::env::vars().collect();
    load_api_config_from(path, &vars)
}

/// [`load_api_config`] over an explicit variable set instead of the process environment.
///
/// # Errors
/// Fails when an explicit file is missing or a value has the wrong shape.
pub fn load_api_config_from(
    path: Option<impl AsRef<Path>>,
    vars: &Map<String, String>,
) -> Result<ApiConfig, ConfigError> {
    let path = path
        .map(|p| p.as_ref().to_path_buf())
        .or_else(|| vars.get(CONFIG_PATH_VAR).map(PathBuf::from));

    let mut builder = base_builder(path, Some(vars.clone()));
    for (var, key) in ENV_ALIASES {
        let value = vars.get(*var).filter(|v| !v.trim().is_empty()).cloned();
        builder = builder.set_override_option(*key, value).context(*var)?;
    }

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<ApiConfig>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

fn base_builder(
    path: Option<PathBuf>,
    vars: Option<Map<String, String>>,
) -> ConfigBuilder<DefaultState> {
    let file = match path {
        Some(path) => {
            info!("Loading config from {}", path.display());
            File::from(path.as_path()).required(true)
        }
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    Config::builder().add_source(file).add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .convert_case(config::Case::Snake)
            .try_parsing(true)
            .source(vars),
    )
}
