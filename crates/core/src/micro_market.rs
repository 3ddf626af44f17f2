//! Localized price estimates across a small set of synthetic nearby markets.
//!
//! Each market price is the commodity ceiling scaled by a market-type
//! multiplier, so results depend only on the commodity and radius.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    commodity::{Commodity, ThresholdTable},
    errors::DomainError,
    price::{price_label, round_distance, round_price},
};

pub const DEFAULT_MICRO_MARKET_RADIUS_KM: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Variance, in (KES/kg)^2, above which shopping around is worth suggesting.
pub const VARIANCE_ALERT_THRESHOLD: Decimal = Decimal::TEN;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketType {
    Wholesale,
    Retail,
    Mixed,
}

struct MarketProfile {
    name: fn(&str) -> String,
    distance_factor: Decimal,
    market_type: MarketType,
    multiplier: Decimal,
}

const MARKET_PROFILES: [MarketProfile; 3] = [
    MarketProfile {
        name: central_market_name,
        distance_factor: Decimal::ZERO,
        market_type: MarketType::Wholesale,
        multiplier: Decimal::from_parts(90, 0, 0, false, 2),
    },
    MarketProfile {
        name: retail_hub_name,
        distance_factor: Decimal::from_parts(3, 0, 0, false, 1),
        market_type: MarketType::Retail,
        multiplier: Decimal::from_parts(110, 0, 0, false, 2),
    },
    MarketProfile {
        name: outlying_market_name,
        distance_factor: Decimal::from_parts(6, 0, 0, false, 1),
        market_type: MarketType::Mixed,
        multiplier: Decimal::from_parts(95, 0, 0, false, 2),
    },
];

fn central_market_name(region: &str) -> String {
    format!("{region} Central Market")
}

fn retail_hub_name(region: &str) -> String {
    format!("{region} Retail Hub")
}

fn outlying_market_name(region: &str) -> String {
    format!("Near {region} Market")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MicroMarketInput<'a> {
    pub commodity: &'a str,
    pub region: &'a str,
    pub radius_km: Option<Decimal>,
    pub date: &'a str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearbyMarket {
    pub market_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub distance_km: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub estimated_price: Decimal,
    pub market_type: MarketType,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedForecast {
    #[serde(with = "rust_decimal::serde::float")]
    pub average_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub min_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub max_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_variance: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicroMarketResult {
    pub nearby_markets: Vec<NearbyMarket>,
    pub localized_forecast: LocalizedForecast,
    pub recommended_market: String,
    pub market_comparison: String,
}

pub trait MicroMarketEstimator: Send + Sync {
    fn estimate(&self, input: &MicroMarketInput<'_>) -> Result<MicroMarketResult, DomainError>;
}

pub struct DeterministicMicroMarketEstimator {
    thresholds: &'static ThresholdTable,
}

impl DeterministicMicroMarketEstimator {
    pub fn new(thresholds: &'static ThresholdTable) -> Self {
        Self { thresholds }
    }
}

impl Default for DeterministicMicroMarketEstimator {
    fn default() -> Self {
        Self::new(ThresholdTable::standard())
    }
}

impl MicroMarketEstimator for DeterministicMicroMarketEstimator {
    fn estimate(&self, input: &MicroMarketInput<'_>) -> Result<MicroMarketResult, DomainError> {
        estimate_with_thresholds(self.thresholds, input)
    }
}

pub fn estimate_with_thresholds(
    thresholds: &ThresholdTable,
    input: &MicroMarketInput<'_>,
) -> Result<MicroMarketResult, DomainError> {
    let commodity = Commodity::parse(input.commodity)?;
    let radius_km = input.radius_km.unwrap_or(DEFAULT_MICRO_MARKET_RADIUS_KM);
    if radius_km <= Decimal::ZERO {
        return Err(DomainError::invalid_input("radius_km must be greater than 0"));
    }
    let region = input.region.trim();
    if region.is_empty() {
        return Err(DomainError::invalid_input("region must not be empty"));
    }
    NaiveDate::parse_from_str(input.date.trim(), "%Y-%m-%d").map_err(|_| {
        DomainError::invalid_input(format!("Invalid date: '{}'. Expected YYYY-MM-DD", input.date))
    })?;

    let ceiling = thresholds.ceiling(commodity)?;
    let nearby_markets: Vec<NearbyMarket> = MARKET_PROFILES
        .iter()
        .map(|profile| NearbyMarket {
            market_name: (profile.name)(region),
            distance_km: round_distance(radius_km * profile.distance_factor),
            estimated_price: round_price(ceiling * profile.multiplier),
            market_type: profile.market_type,
        })
        .collect();

    let prices: Vec<Decimal> = nearby_markets.iter().map(|market| market.estimated_price).collect();
    let localized_forecast = summarize(&prices)
        .ok_or_else(|| DomainError::invalid_input("no nearby markets to compare"))?;

    // min_by keeps the first of equal minima, so ties resolve to listing order.
    let recommended_market = nearby_markets
        .iter()
        .min_by(|left, right| left.estimated_price.cmp(&right.estimated_price))
        .map(|market| market.market_name.clone())
        .unwrap_or_default();

    let spread = localized_forecast.max_price - localized_forecast.min_price;
    let market_comparison = if localized_forecast.price_variance > VARIANCE_ALERT_THRESHOLD {
        format!(
            "High price variance ({}) across nearby markets. Trading at {recommended_market} could save up to {} KES/kg.",
            price_label(localized_forecast.price_variance),
            price_label(spread),
        )
    } else {
        format!(
            "Nearby markets are well-aligned on price (spread {} KES/kg).",
            price_label(spread)
        )
    };

    Ok(MicroMarketResult { nearby_markets, localized_forecast, recommended_market, market_comparison })
}

/// Mean, extrema and population variance of a price set, each rounded to 2dp.
pub fn summarize(prices: &[Decimal]) -> Option<LocalizedForecast> {
    let min_price = prices.iter().copied().min()?;
    let max_price = prices.iter().copied().max()?;
    let count = Decimal::from(prices.len());
    let mean = prices.iter().sum::<Decimal>() / count;
    let variance =
        prices.iter().map(|price| (*price - mean) * (*price - mean)).sum::<Decimal>() / count;

    Some(LocalizedForecast {
        average_price: round_price(mean),
        min_price: round_price(min_price),
        max_price: round_price(max_price),
        price_variance: round_price(variance),
    })
}
