//! Sell/hold recommendations derived from predicted versus previous price.
//!
//! The percent change is bucketed at +/-10%: a rise of 10% or more is a
//! high-confidence sell, any smaller rise a medium-confidence sell, a change
//! in (-10%, 0%] a medium-confidence hold, and a drop of 10% or more a
//! high-confidence hold. Two context lines follow the trend lines: one framed
//! by price type and one checking the prediction against the commodity ceiling.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    commodity::{Commodity, PriceType, ThresholdTable},
    errors::DomainError,
    price::{price_label, round_price},
};

/// Percent change at which a move counts as significant.
pub const SIGNIFICANT_CHANGE_PCT: Decimal = Decimal::TEN;

/// Share of the ceiling at which a prediction is flagged as approaching it.
pub const CEILING_WARNING_RATIO: Decimal = Decimal::from_parts(8, 0, 0, false, 1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Sell,
    Hold,
    Buy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecommendationInput<'a> {
    pub commodity: &'a str,
    pub predicted_price: Decimal,
    pub previous_price: Decimal,
    pub price_type: &'a str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub recommendations: Vec<String>,
    pub action_type: ActionType,
    pub confidence: ConfidenceLevel,
    pub rationale: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_change_pct: Decimal,
}

pub trait RecommendationEngine: Send + Sync {
    fn recommend(
        &self,
        input: &RecommendationInput<'_>,
    ) -> Result<RecommendationResult, DomainError>;
}

pub struct DeterministicRecommendationEngine {
    thresholds: &'static ThresholdTable,
}

impl DeterministicRecommendationEngine {
    pub fn new(thresholds: &'static ThresholdTable) -> Self {
        Self { thresholds }
    }
}

impl Default for DeterministicRecommendationEngine {
    fn default() -> Self {
        Self::new(ThresholdTable::standard())
    }
}

impl RecommendationEngine for DeterministicRecommendationEngine {
    fn recommend(
        &self,
        input: &RecommendationInput<'_>,
    ) -> Result<RecommendationResult, DomainError> {
        recommend_with_thresholds(self.thresholds, input)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PriceTrend {
    SharpRise,
    ModerateRise,
    Steady,
    SharpDecline,
}

impl PriceTrend {
    fn classify(change_pct: Decimal) -> Self {
        if change_pct >= SIGNIFICANT_CHANGE_PCT {
            Self::SharpRise
        } else if change_pct > Decimal::ZERO {
            Self::ModerateRise
        } else if change_pct > -SIGNIFICANT_CHANGE_PCT {
            Self::Steady
        } else {
            Self::SharpDecline
        }
    }

    fn action(self) -> ActionType {
        match self {
            Self::SharpRise | Self::ModerateRise => ActionType::Sell,
            Self::Steady | Self::SharpDecline => ActionType::Hold,
        }
    }

    fn confidence(self) -> ConfidenceLevel {
        match self {
            Self::SharpRise | Self::SharpDecline => ConfidenceLevel::High,
            Self::ModerateRise | Self::Steady => ConfidenceLevel::Medium,
        }
    }
}

pub fn percent_change(predicted: Decimal, previous: Decimal) -> Result<Decimal, DomainError> {
    if previous <= Decimal::ZERO {
        return Err(DomainError::invalid_input("previous_price must be greater than 0"));
    }
    predicted
        .checked_sub(previous)
        .and_then(|delta| delta.checked_div(previous))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(|| DomainError::invalid_input("price change is out of range"))
}

pub fn recommend_with_thresholds(
    thresholds: &ThresholdTable,
    input: &RecommendationInput<'_>,
) -> Result<RecommendationResult, DomainError> {
    let commodity = Commodity::parse(input.commodity)?;
    let price_type = PriceType::parse(input.price_type)?;
    let change_pct = percent_change(input.predicted_price, input.previous_price)?;
    let ceiling = thresholds.ceiling(commodity)?;

    let trend = PriceTrend::classify(change_pct);
    let magnitude = format!("{:.1}", change_pct.abs());

    let (mut recommendations, rationale) = match trend {
        PriceTrend::SharpRise => (
            vec![
                format!("Predicted price increase of {magnitude}% - consider selling soon"),
                "Market conditions favor sellers".to_string(),
            ],
            "Significant price increase predicted. Selling now or in the near future could maximize returns.",
        ),
        PriceTrend::ModerateRise => (
            vec![
                format!("Moderate price increase of {magnitude}% expected"),
                "Consider selling within the next few days".to_string(),
            ],
            "Moderate price increase expected. Timing the market in the next week could be beneficial.",
        ),
        PriceTrend::Steady => {
            let headline = if change_pct.is_zero() {
                "Stable prices expected".to_string()
            } else {
                format!("Slight price decrease of {magnitude}% expected")
            };
            (
                vec![headline, "No urgent action required - monitor the market before selling".to_string()],
                "Price stable or slightly declining. Normal selling patterns can continue while monitoring the market.",
            )
        }
        PriceTrend::SharpDecline => (
            vec![
                format!("Predicted price drop of {magnitude}% - consider holding"),
                "Consider storage options if possible".to_string(),
            ],
            "Significant price decline predicted. Hold your produce and wait for recovery before selling.",
        ),
    };

    recommendations.push(price_type_line(price_type, trend.action()).to_string());
    recommendations.push(ceiling_line(commodity, input.predicted_price, ceiling));

    Ok(RecommendationResult {
        recommendations,
        action_type: trend.action(),
        confidence: trend.confidence(),
        rationale: rationale.to_string(),
        price_change_pct: round_price(change_pct),
    })
}

fn price_type_line(price_type: PriceType, action: ActionType) -> &'static str {
    match (price_type, action) {
        (PriceType::Retail, ActionType::Sell) => {
            "Retail prices are rising - good time to market your produce directly to buyers"
        }
        (PriceType::Wholesale, ActionType::Sell) => {
            "Wholesale buyers are paying more - consider moving bulk volumes"
        }
        (PriceType::Retail, _) => "Retail demand is soft - avoid discounting produce at the stall",
        (PriceType::Wholesale, _) => {
            "Wholesale prices are under pressure - delay bulk sales where storage allows"
        }
    }
}

fn ceiling_line(commodity: Commodity, predicted: Decimal, ceiling: Decimal) -> String {
    let price = price_label(predicted);
    let limit = price_label(ceiling);
    if predicted > ceiling {
        format!(
            "Predicted price of {price} KES/kg is above the normal ceiling of {limit} KES/kg for {commodity} - unusually high, verify before acting"
        )
    } else if predicted >= ceiling * CEILING_WARNING_RATIO {
        format!("Price approaching threshold limit ({limit} KES/kg)")
    } else {
        format!("Predicted price is within the normal range for {commodity} (ceiling {limit} KES/kg)")
    }
}
