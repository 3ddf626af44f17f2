use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["agroprice.toml", "config/agroprice.toml"];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
    pub cors_allow_any_origin: bool,
}

#[derive(Clone, Debug)]
pub struct ModelConfig {
    pub band_pct: Decimal,
    pub confidence_pct: Decimal,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub model_band_pct: Option<Decimal>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8000,
                graceful_shutdown_secs: 15,
                cors_allow_any_origin: true,
            },
            model: ModelConfig { band_pct: Decimal::TEN, confidence_pct: Decimal::from(90) },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_CANDIDATES[0]));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
            if let Some(cors_allow_any_origin) = server.cors_allow_any_origin {
                self.server.cors_allow_any_origin = cors_allow_any_origin;
            }
        }

        if let Some(model) = patch.model {
            if let Some(band_pct) = model.band_pct {
                self.model.band_pct = band_pct;
            }
            if let Some(confidence_pct) = model.confidence_pct {
                self.model.confidence_pct = confidence_pct;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("AGROPRICE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("AGROPRICE_SERVER_PORT") {
            self.server.port = parse_u16("AGROPRICE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("AGROPRICE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("AGROPRICE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }
        if let Some(value) = read_env("AGROPRICE_SERVER_CORS_ALLOW_ANY_ORIGIN") {
            self.server.cors_allow_any_origin =
                parse_bool("AGROPRICE_SERVER_CORS_ALLOW_ANY_ORIGIN", &value)?;
        }

        if let Some(value) = read_env("AGROPRICE_MODEL_BAND_PCT") {
            self.model.band_pct = parse_decimal("AGROPRICE_MODEL_BAND_PCT", &value)?;
        }
        if let Some(value) = read_env("AGROPRICE_MODEL_CONFIDENCE_PCT") {
            self.model.confidence_pct = parse_decimal("AGROPRICE_MODEL_CONFIDENCE_PCT", &value)?;
        }

        let log_level =
            read_env("AGROPRICE_LOGGING_LEVEL").or_else(|| read_env("AGROPRICE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("AGROPRICE_LOGGING_FORMAT").or_else(|| read_env("AGROPRICE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(band_pct) = overrides.model_band_pct {
            self.model.band_pct = band_pct;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server(&self.server)?;
        validate_model(&self.model)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    CONFIG_FILE_CANDIDATES.iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_model(model: &ModelConfig) -> Result<(), ConfigError> {
    if model.band_pct <= Decimal::ZERO || model.band_pct >= Decimal::ONE_HUNDRED {
        return Err(ConfigError::Validation(
            "model.band_pct must be in range (0, 100)".to_string(),
        ));
    }

    if model.confidence_pct <= Decimal::ZERO || model.confidence_pct > Decimal::ONE_HUNDRED {
        return Err(ConfigError::Validation(
            "model.confidence_pct must be in range (0, 100]".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    value.trim().parse::<Decimal>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    model: Option<ModelPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
    cors_allow_any_origin: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct ModelPatch {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    band_pct: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    confidence_pct: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_are_valid_without_any_file() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.server.port == 8000, "default port should be 8000")?;
        ensure(config.server.cors_allow_any_origin, "cors should default to permissive")?;
        ensure(config.model.band_pct == Decimal::TEN, "default band should be 10%")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_AGROPRICE_BIND", "0.0.0.0");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("agroprice.toml");
            fs::write(
                &path,
                r#"
[server]
bind_address = "${TEST_AGROPRICE_BIND}"
port = 9100

[model]
band_pct = 12.5
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.server.bind_address == "0.0.0.0",
                "bind address should be loaded from environment",
            )?;
            ensure(config.server.port == 9100, "port should be loaded from file")?;
            ensure(
                config.model.band_pct == Decimal::new(125, 1),
                "band should be loaded from file",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_AGROPRICE_BIND"]);
        result
    }

    #[test]
    fn missing_interpolation_variable_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("agroprice.toml");
        fs::write(&path, "[server]\nbind_address = \"${AGROPRICE_TEST_UNSET_VAR}\"\n")
            .map_err(|err| err.to_string())?;

        let result = AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() });

        ensure(
            matches!(result, Err(ConfigError::MissingEnvInterpolation { ref var }) if var == "AGROPRICE_TEST_UNSET_VAR"),
            "missing variable should be named in the error",
        )
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("AGROPRICE_LOG_LEVEL", "warn");
        env::set_var("AGROPRICE_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["AGROPRICE_LOG_LEVEL", "AGROPRICE_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("AGROPRICE_SERVER_PORT", "9200");
        env::set_var("AGROPRICE_SERVER_BIND_ADDRESS", "10.0.0.1");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("agroprice.toml");
            fs::write(
                &path,
                r#"
[server]
bind_address = "192.168.1.10"
port = 9100
graceful_shutdown_secs = 5

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    bind_address: Some("127.0.0.2".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.server.bind_address == "127.0.0.2", "override bind address should win")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.server.port == 9200, "env port should win over file and defaults")?;
            ensure(
                config.server.graceful_shutdown_secs == 5,
                "file value should win over defaults",
            )?;
            Ok(())
        })();

        clear_vars(&["AGROPRICE_SERVER_PORT", "AGROPRICE_SERVER_BIND_ADDRESS"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("AGROPRICE_MODEL_BAND_PCT", "150");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("model.band_pct")
            );
            ensure(has_message, "validation failure should mention model.band_pct")
        })();

        clear_vars(&["AGROPRICE_MODEL_BAND_PCT"]);
        result
    }

    #[test]
    fn malformed_env_override_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("AGROPRICE_SERVER_PORT", "not-a-port");
        let result = AppConfig::load(LoadOptions::default());
        clear_vars(&["AGROPRICE_SERVER_PORT"]);

        ensure(
            matches!(result, Err(ConfigError::InvalidEnvOverride { ref key, .. }) if key == "AGROPRICE_SERVER_PORT"),
            "invalid port should be reported as an env override error",
        )
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let result = AppConfig::load(LoadOptions {
            config_path: Some("does-not-exist/agroprice.toml".into()),
            require_file: true,
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "missing required file should fail",
        )
    }
}
