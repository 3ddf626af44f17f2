//! Channel-specific rendering of a prediction for SMS, WhatsApp and printed bulletins.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tera::{Context, Tera};
use thiserror::Error;

use crate::{errors::DomainError, price::price_label};

/// Characters billed as one SMS.
pub const SMS_SEGMENT_CHARS: usize = 160;

/// KES charged per SMS segment.
pub const SMS_COST_PER_SEGMENT: Decimal = Decimal::from_parts(50, 0, 0, false, 2);

/// Length an overlong market name is cut to before the SMS drops other detail.
pub const SMS_MARKET_ABBREVIATION_CHARS: usize = 12;

const DEFAULT_CONFIDENCE_PCT: Decimal = Decimal::from_parts(90, 0, 0, false, 0);

const WHATSAPP_TEMPLATE: &str = "\u{1F4CA} *Market Price Forecast*

\u{1F96C} Commodity: {{ commodity }}
\u{1F4CD} Market: {{ market }}
\u{1F4C5} Date: {{ date }}

\u{1F4B0} Predicted Price: *KES {{ price }}/kg*
\u{1F4C8} Previous Price: KES {{ previous_price }}/kg
\u{2705} Confidence: {{ confidence }}%
{% if note %}
\u{1F4DD} {{ note }}
{% endif %}
_Powered by Agroprice Market Forecaster_";

const BULLETIN_TEMPLATE: &str = "MARKET PRICE BULLETIN
{{ rule }}

Commodity:          {{ commodity_upper }}
Market Location:    {{ market }}{% if region %}, {{ region }}{% endif %}
Forecast Date:      {{ date }}

PRICE FORECAST
{{ rule }}
Predicted Price:    KES {{ price }} per kg
Previous Price:     KES {{ previous_price }} per kg
Price Range:        {{ price_range }}
Confidence Level:   {{ confidence }}%

NOTES
{{ rule }}
{{ bulletin_note }}

This forecast is provided as guidance only. Actual market prices may vary.
Report generated by Agroprice Market Forecaster.
";

#[derive(Debug, Error)]
pub enum MessagingError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("template rendering failed: {0}")]
    Template(#[from] tera::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Sms,
    WhatsApp,
    Bulletin,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sms => "sms",
            Self::WhatsApp => "whatsapp",
            Self::Bulletin => "bulletin",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sms" => Ok(Self::Sms),
            "whatsapp" => Ok(Self::WhatsApp),
            "bulletin" => Ok(Self::Bulletin),
            _ => Err(DomainError::invalid_input(
                "Invalid format_type. Allowed: 'sms', 'whatsapp', 'bulletin'",
            )),
        }
    }
}

impl FromStr for Channel {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A prediction as handed to the formatter. Missing fields fall back to
/// display placeholders so partially filled records still render.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRecord {
    #[serde(default = "not_available")]
    pub commodity: String,
    #[serde(default = "not_available")]
    pub market: String,
    #[serde(default, alias = "admin1")]
    pub region: Option<String>,
    #[serde(default = "not_available")]
    pub date: String,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub prediction_per_kg: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub previous_month_price: Decimal,
    #[serde(default, alias = "pricetype")]
    pub market_type: Option<String>,
    #[serde(default = "default_confidence", with = "rust_decimal::serde::float")]
    pub confidence_pct: Decimal,
    #[serde(default)]
    pub note: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub lower_bound: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub upper_bound: Option<Decimal>,
}

fn not_available() -> String {
    "N/A".to_string()
}

fn default_confidence() -> Decimal {
    DEFAULT_CONFIDENCE_PCT
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedMessage {
    pub format_type: Channel,
    pub formatted_message: String,
    pub character_count: usize,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub estimated_cost: Option<Decimal>,
}

pub struct MessageFormatter {
    templates: Tera,
}

impl MessageFormatter {
    pub fn new() -> Result<Self, MessagingError> {
        let mut templates = Tera::default();
        templates.add_raw_templates(vec![
            ("whatsapp.txt", WHATSAPP_TEMPLATE),
            ("bulletin.txt", BULLETIN_TEMPLATE),
        ])?;
        Ok(Self { templates })
    }

    pub fn format(
        &self,
        record: &PredictionRecord,
        format_type: &str,
    ) -> Result<FormattedMessage, MessagingError> {
        let channel = Channel::parse(format_type)?;
        self.render(record, channel)
    }

    pub fn render(
        &self,
        record: &PredictionRecord,
        channel: Channel,
    ) -> Result<FormattedMessage, MessagingError> {
        let (formatted_message, estimated_cost) = match channel {
            Channel::Sms => {
                let text = render_sms(record);
                let segments = text.chars().count().div_ceil(SMS_SEGMENT_CHARS).max(1);
                (text, Some(SMS_COST_PER_SEGMENT * Decimal::from(segments)))
            }
            Channel::WhatsApp => {
                (self.templates.render("whatsapp.txt", &template_context(record))?, Some(Decimal::ZERO))
            }
            Channel::Bulletin => (self.templates.render("bulletin.txt", &template_context(record))?, None),
        };

        Ok(FormattedMessage {
            format_type: channel,
            character_count: formatted_message.chars().count(),
            formatted_message,
            estimated_cost,
        })
    }
}

fn template_context(record: &PredictionRecord) -> Context {
    let price_range = match (record.lower_bound, record.upper_bound) {
        (Some(lower), Some(upper)) => {
            format!("KES {} - {} per kg", price_label(lower), price_label(upper))
        }
        _ => "Not available".to_string(),
    };
    let note = record.note.trim();

    let mut context = Context::new();
    context.insert("commodity", &record.commodity);
    context.insert("commodity_upper", &record.commodity.to_uppercase());
    context.insert("market", &record.market);
    context.insert("region", record.region.as_deref().unwrap_or(""));
    context.insert("date", &record.date);
    context.insert("price", &price_label(record.prediction_per_kg));
    context.insert("previous_price", &price_label(record.previous_month_price));
    context.insert("confidence", &record.confidence_pct.normalize().to_string());
    context.insert("price_range", &price_range);
    context.insert("rule", &"=".repeat(50));
    context.insert("note", note);
    context.insert("bulletin_note", if note.is_empty() { "No additional notes." } else { note });
    context
}

/// Renders the single-line SMS, shedding detail until it fits one segment:
/// full text, then an abbreviated market name, then no previous-price clause,
/// then a hard cut with an ellipsis.
fn render_sms(record: &PredictionRecord) -> String {
    let price = price_label(record.prediction_per_kg);
    let previous = price_label(record.previous_month_price);
    let commodity = single_line(&record.commodity);
    let date = single_line(&record.date);
    let market_name = single_line(&record.market);
    let sms = |market: &str, previous: Option<&str>| {
        let mut text = format!("{commodity} @ {market}: KES {price}/kg on {date}.");
        if let Some(previous) = previous {
            text.push_str(&format!(" Prev: KES {previous}/kg"));
        }
        text
    };

    let full = sms(&market_name, Some(&previous));
    if fits_segment(&full) {
        return full;
    }

    let market = abbreviate(&market_name, SMS_MARKET_ABBREVIATION_CHARS);
    let abbreviated = sms(&market, Some(&previous));
    if fits_segment(&abbreviated) {
        return abbreviated;
    }

    let without_previous = sms(&market, None);
    if fits_segment(&without_previous) {
        return without_previous;
    }

    let head: String = without_previous.chars().take(SMS_SEGMENT_CHARS - 3).collect();
    format!("{head}...")
}

/// Collapses every whitespace run, newlines included, into a single space.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fits_segment(text: &str) -> bool {
    text.chars().count() <= SMS_SEGMENT_CHARS
}

fn abbreviate(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    let head: String = name.chars().take(max_chars).collect();
    format!("{}.", head.trim_end())
}
