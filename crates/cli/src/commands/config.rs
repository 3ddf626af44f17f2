use std::env;
use std::fs;
use std::path::Path;

use agroprice_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

use super::{CommandResult, EXIT_INVALID_INPUT};

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_INVALID_INPUT,
            )
        }
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let lines = [
        "effective config (source precedence: env > file > default):".to_string(),
        render_line(
            "server.bind_address",
            &config.server.bind_address,
            source("server.bind_address", &["AGROPRICE_SERVER_BIND_ADDRESS"]),
        ),
        render_line(
            "server.port",
            &config.server.port.to_string(),
            source("server.port", &["AGROPRICE_SERVER_PORT"]),
        ),
        render_line(
            "server.graceful_shutdown_secs",
            &config.server.graceful_shutdown_secs.to_string(),
            source("server.graceful_shutdown_secs", &["AGROPRICE_SERVER_GRACEFUL_SHUTDOWN_SECS"]),
        ),
        render_line(
            "server.cors_allow_any_origin",
            &config.server.cors_allow_any_origin.to_string(),
            source("server.cors_allow_any_origin", &["AGROPRICE_SERVER_CORS_ALLOW_ANY_ORIGIN"]),
        ),
        render_line(
            "model.band_pct",
            &config.model.band_pct.normalize().to_string(),
            source("model.band_pct", &["AGROPRICE_MODEL_BAND_PCT"]),
        ),
        render_line(
            "model.confidence_pct",
            &config.model.confidence_pct.normalize().to_string(),
            source("model.confidence_pct", &["AGROPRICE_MODEL_CONFIDENCE_PCT"]),
        ),
        render_line(
            "logging.level",
            &config.logging.level,
            source("logging.level", &["AGROPRICE_LOGGING_LEVEL", "AGROPRICE_LOG_LEVEL"]),
        ),
        render_line(
            "logging.format",
            &format!("{:?}", config.logging.format).to_ascii_lowercase(),
            source("logging.format", &["AGROPRICE_LOGGING_FORMAT", "AGROPRICE_LOG_FORMAT"]),
        ),
    ];

    CommandResult::success("config", lines.join("\n"))
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
