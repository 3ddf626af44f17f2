//! Price forecasting over an opaque model.
//!
//! The model only produces a point estimate with a band and a confidence; this
//! module validates inputs, applies the commodity ceiling check, and shapes the
//! result for callers.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    commodity::{Commodity, PriceType, ThresholdTable},
    errors::DomainError,
    price::{price_label, round_price},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelFeatures {
    pub date: NaiveDate,
    pub region: String,
    pub market: String,
    pub commodity: Commodity,
    pub price_type: PriceType,
    pub previous_price: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEstimate {
    pub mean: Decimal,
    pub lower: Decimal,
    pub upper: Decimal,
    /// Fraction in `(0, 1]`.
    pub confidence: Decimal,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("model unavailable: {0}")]
    Unavailable(String),
    #[error("model rejected features: {0}")]
    Rejected(String),
}

pub trait PriceModel: Send + Sync {
    fn name(&self) -> &str;
    fn predict(&self, features: &ModelFeatures) -> Result<ModelEstimate, ModelError>;
}

/// Baseline model that carries the previous price forward inside a fixed band.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CarryForwardModel {
    band_pct: Decimal,
    confidence_pct: Decimal,
}

impl CarryForwardModel {
    pub fn new(band_pct: Decimal, confidence_pct: Decimal) -> Self {
        Self { band_pct, confidence_pct }
    }
}

impl Default for CarryForwardModel {
    fn default() -> Self {
        Self::new(Decimal::TEN, Decimal::from(90))
    }
}

impl PriceModel for CarryForwardModel {
    fn name(&self) -> &str {
        "carry-forward"
    }

    fn predict(&self, features: &ModelFeatures) -> Result<ModelEstimate, ModelError> {
        if features.previous_price <= Decimal::ZERO {
            return Err(ModelError::Rejected("previous price must be positive".to_string()));
        }
        let out_of_range = || ModelError::Rejected("previous price is out of range".to_string());
        let band = features
            .previous_price
            .checked_mul(self.band_pct)
            .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
            .ok_or_else(out_of_range)?;
        Ok(ModelEstimate {
            mean: features.previous_price,
            lower: features.previous_price.checked_sub(band).ok_or_else(out_of_range)?,
            upper: features.previous_price.checked_add(band).ok_or_else(out_of_range)?,
            confidence: self.confidence_pct / Decimal::ONE_HUNDRED,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub date: String,
    pub admin1: String,
    pub market: String,
    pub commodity: String,
    pub pricetype: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub previous_month_price: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    pub commodity: String,
    pub market: String,
    pub date: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub prediction_per_kg: Decimal,
    pub unit: String,
    pub market_type: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub previous_month_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub confidence_pct: Decimal,
    pub error_margin: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub lower_bound: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub upper_bound: Decimal,
    pub unreasonable: bool,
    pub note: String,
}

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ForecastRequest {
    pub fn features(&self) -> Result<ModelFeatures, DomainError> {
        let commodity = Commodity::parse(&self.commodity)?;
        let price_type = PriceType::parse(&self.pricetype)?;
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|_| {
            DomainError::invalid_input(format!(
                "Invalid date: '{}'. Expected YYYY-MM-DD",
                self.date
            ))
        })?;
        let market = self.market.trim();
        if market.is_empty() {
            return Err(DomainError::invalid_input("market must not be empty"));
        }
        let region = self.admin1.trim();
        if region.is_empty() {
            return Err(DomainError::invalid_input("admin1 must not be empty"));
        }
        if self.previous_month_price <= Decimal::ZERO {
            return Err(DomainError::invalid_input("previous_month_price must be greater than 0"));
        }

        Ok(ModelFeatures {
            date,
            region: region.to_string(),
            market: market.to_string(),
            commodity,
            price_type,
            previous_price: self.previous_month_price,
        })
    }
}

pub fn forecast<M>(
    model: &M,
    thresholds: &ThresholdTable,
    request: &ForecastRequest,
) -> Result<Forecast, ForecastError>
where
    M: PriceModel + ?Sized,
{
    let features = request.features()?;
    let ceiling = thresholds.ceiling(features.commodity)?;
    let estimate = model.predict(&features)?;
    let margin = estimate
        .upper
        .checked_sub(estimate.mean)
        .ok_or_else(|| ModelError::Rejected("estimate band is out of range".to_string()))?;

    let prediction = round_price(estimate.mean);
    let unreasonable = estimate.mean > ceiling;
    let note = if unreasonable {
        format!("Unreasonable: exceeds normal threshold of {} per kg.", ceiling.normalize())
    } else {
        "Prediction within normal range.".to_string()
    };

    Ok(Forecast {
        commodity: request.commodity.clone(),
        market: request.market.clone(),
        date: request.date.clone(),
        prediction_per_kg: prediction,
        unit: "kg".to_string(),
        market_type: request.pricetype.clone(),
        previous_month_price: request.previous_month_price,
        confidence_pct: (estimate.confidence * Decimal::ONE_HUNDRED).normalize(),
        error_margin: format!("+-{}", price_label(round_price(margin))),
        lower_bound: round_price(estimate.lower),
        upper_bound: round_price(estimate.upper),
        unreasonable,
        note,
    })
}
