use std::env;
use std::sync::{Mutex, OnceLock};

use agroprice_cli::commands::{
    config, format, micro_market, recommend, FormatArgs, MicroMarketArgs, RecommendArgs,
};
use clap::Parser;
use rust_decimal::Decimal;
use serde_json::Value;

#[derive(Debug, Parser)]
struct RecommendCommand {
    #[command(flatten)]
    args: RecommendArgs,
}

#[test]
fn config_reports_defaults_with_sources() {
    with_env(&[], || {
        let result = config::run();
        assert_eq!(result.exit_code, 0, "expected default config to validate");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["status"], "ok");

        let message = payload["message"].as_str().unwrap_or("");
        assert!(message.contains("- server.port = 8000 (source: default)"));
        assert!(message.contains("- model.band_pct = 10 (source: default)"));
        assert!(message.contains("- logging.format = compact (source: default)"));
    });
}

#[test]
fn config_attributes_env_overrides_including_aliases() {
    with_env(&[("AGROPRICE_SERVER_PORT", "9300"), ("AGROPRICE_LOG_LEVEL", "debug")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let message = payload["message"].as_str().unwrap_or("");
        assert!(message.contains("- server.port = 9300 (source: env (AGROPRICE_SERVER_PORT))"));
        assert!(message.contains("- logging.level = debug (source: env (AGROPRICE_LOG_LEVEL))"));
    });
}

#[test]
fn config_returns_validation_failure_for_out_of_range_band() {
    with_env(&[("AGROPRICE_MODEL_BAND_PCT", "0")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn recommend_prints_engine_result() {
    let result = recommend::run(&RecommendArgs {
        commodity: "cabbage".to_string(),
        predicted_price: Decimal::from(120),
        previous_price: Decimal::from(100),
        price_type: "retail".to_string(),
    });
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["action_type"], "sell");
    assert_eq!(payload["confidence"], "high");
    assert_eq!(payload["price_change_pct"], 20.0);
}

#[test]
fn recommend_rejects_unknown_commodity_with_exit_code_two() {
    let result = recommend::run(&RecommendArgs {
        commodity: "maize".to_string(),
        predicted_price: Decimal::from(50),
        previous_price: Decimal::from(40),
        price_type: "retail".to_string(),
    });
    assert_eq!(result.exit_code, 2);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "recommend");
    assert_eq!(payload["error_class"], "unsupported_commodity");
    assert_eq!(
        payload["message"],
        "Commodity 'maize' not supported. Allowed: [cabbage, kale, onion, potatoes, tomatoes]"
    );
}

#[test]
fn recommend_parses_negative_previous_price_and_rejects_it() {
    let parsed = RecommendCommand::try_parse_from([
        "recommend",
        "--commodity",
        "onion",
        "--predicted-price",
        "10",
        "--previous-price",
        "-5",
    ])
    .expect("negative price should reach the engine");
    assert_eq!(parsed.args.previous_price, Decimal::from(-5));

    let result = recommend::run(&parsed.args);
    assert_eq!(result.exit_code, 2);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["error_class"], "invalid_input");
    assert_eq!(payload["message"], "previous_price must be greater than 0");
}

#[test]
fn micro_market_recommends_lowest_priced_market() {
    let result = micro_market::run(&MicroMarketArgs {
        commodity: "tomatoes".to_string(),
        region: "Nairobi".to_string(),
        radius_km: Some(Decimal::from(30)),
        date: "2025-12-05".to_string(),
    });
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["recommended_market"], "Nairobi Central Market");
    assert_eq!(payload["nearby_markets"][1]["distance_km"], 9.0);
}

#[test]
fn micro_market_rejects_malformed_date() {
    let result = micro_market::run(&MicroMarketArgs {
        commodity: "kale".to_string(),
        region: "Nakuru".to_string(),
        radius_km: None,
        date: "05/12/2025".to_string(),
    });
    assert_eq!(result.exit_code, 2);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["error_class"], "invalid_input");
}

#[test]
fn format_sms_stays_within_one_segment() {
    let result = format::run(&format_args("sms"));
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["format_type"], "sms");
    assert!(payload["character_count"].as_u64().is_some_and(|count| count <= 160));
    assert_eq!(payload["estimated_cost"], 0.5);
}

#[test]
fn format_rejects_unknown_channel() {
    let result = format::run(&format_args("telegram"));
    assert_eq!(result.exit_code, 2);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "format");
    assert_eq!(payload["error_class"], "invalid_input");
}

fn format_args(channel: &str) -> FormatArgs {
    FormatArgs {
        channel: channel.to_string(),
        commodity: "cabbage".to_string(),
        market: "Wakulima (Nairobi)".to_string(),
        date: "2025-12-05".to_string(),
        price: Decimal::new(1155, 1),
        previous_price: Decimal::from(100),
        confidence_pct: Decimal::from(90),
        note: String::new(),
    }
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid json")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "AGROPRICE_SERVER_BIND_ADDRESS",
        "AGROPRICE_SERVER_PORT",
        "AGROPRICE_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "AGROPRICE_SERVER_CORS_ALLOW_ANY_ORIGIN",
        "AGROPRICE_MODEL_BAND_PCT",
        "AGROPRICE_MODEL_CONFIDENCE_PCT",
        "AGROPRICE_LOGGING_LEVEL",
        "AGROPRICE_LOGGING_FORMAT",
        "AGROPRICE_LOG_LEVEL",
        "AGROPRICE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
