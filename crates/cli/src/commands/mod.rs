pub mod config;
pub mod format;
pub mod micro_market;
pub mod recommend;

use agroprice_core::DomainError;
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;

pub const EXIT_INVALID_INPUT: u8 = 2;
pub const EXIT_INTERNAL: u8 = 1;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    /// Prints an engine result as-is rather than wrapping it in an outcome.
    pub fn payload<T: Serialize>(command: &str, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(output) => Self { exit_code: 0, output },
            Err(error) => Self::failure(command, "serialization", error.to_string(), EXIT_INTERNAL),
        }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn domain_failure(command: &str, error: &DomainError) -> Self {
        let error_class = match error {
            DomainError::UnsupportedCommodity { .. } => "unsupported_commodity",
            DomainError::InvalidInput(_) => "invalid_input",
        };
        Self::failure(command, error_class, error.to_string(), EXIT_INVALID_INPUT)
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

#[derive(Debug, Clone, Args)]
pub struct RecommendArgs {
    #[arg(long)]
    pub commodity: String,
    #[arg(long, allow_negative_numbers = true)]
    pub predicted_price: Decimal,
    #[arg(long, allow_negative_numbers = true)]
    pub previous_price: Decimal,
    #[arg(long, default_value = "retail")]
    pub price_type: String,
}

#[derive(Debug, Clone, Args)]
pub struct MicroMarketArgs {
    #[arg(long)]
    pub commodity: String,
    #[arg(long)]
    pub region: String,
    #[arg(long, allow_negative_numbers = true, help = "Search radius in km (defaults to 50)")]
    pub radius_km: Option<Decimal>,
    #[arg(long, help = "Forecast date, YYYY-MM-DD")]
    pub date: String,
}

#[derive(Debug, Clone, Args)]
pub struct FormatArgs {
    #[arg(long, help = "sms, whatsapp or bulletin")]
    pub channel: String,
    #[arg(long)]
    pub commodity: String,
    #[arg(long)]
    pub market: String,
    #[arg(long)]
    pub date: String,
    #[arg(long, allow_negative_numbers = true)]
    pub price: Decimal,
    #[arg(long, allow_negative_numbers = true)]
    pub previous_price: Decimal,
    #[arg(long, allow_negative_numbers = true, default_value = "90")]
    pub confidence_pct: Decimal,
    #[arg(long, default_value = "")]
    pub note: String,
}
