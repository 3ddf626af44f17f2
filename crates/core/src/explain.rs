//! Placeholder explainability: which factors drive a prediction.
//!
//! Factor weights come from a [`FactorAttribution`] so a model-backed source
//! (feature importances, SHAP values) can replace the static one.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{commodity::Commodity, errors::DomainError, price::price_label};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExplanationRequest {
    #[serde(default)]
    pub prediction_id: Option<String>,
    pub commodity: String,
    pub market: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub predicted_price: Decimal,
    #[serde(default)]
    pub features: Map<String, Value>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImpactLevel {
    High,
    Medium,
    Low,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfluencingFactor {
    pub factor: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub importance: Decimal,
    pub impact: ImpactLevel,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceFactors {
    pub data_quality: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub historical_accuracy: Decimal,
    pub sample_size: String,
    pub market_volatility: String,
    pub prediction_reliability: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction_id: Option<String>,
    pub commodity: String,
    pub market: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub predicted_price: Decimal,
    pub top_influencing_factors: Vec<InfluencingFactor>,
    pub explanation_summary: String,
    pub confidence_factors: ConfidenceFactors,
}

pub trait FactorAttribution: Send + Sync {
    fn attribute(&self, commodity: Commodity, request: &ExplanationRequest)
        -> Vec<InfluencingFactor>;

    fn confidence(&self, commodity: Commodity) -> ConfidenceFactors;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StaticFactorAttribution;

impl FactorAttribution for StaticFactorAttribution {
    fn attribute(
        &self,
        _commodity: Commodity,
        request: &ExplanationRequest,
    ) -> Vec<InfluencingFactor> {
        let previous = feature_label(&request.features, "previous_month_price");
        let price_type = request
            .features
            .get("pricetype")
            .and_then(Value::as_str)
            .unwrap_or("retail")
            .to_string();

        vec![
            factor(
                "Previous Month Price",
                45,
                ImpactLevel::High,
                format!("Historical price of {previous} KES/kg strongly influences forecast"),
            ),
            factor(
                "Market Location",
                25,
                ImpactLevel::Medium,
                format!(
                    "{} market has specific price patterns based on historical data",
                    request.market
                ),
            ),
            factor(
                "Seasonality",
                15,
                ImpactLevel::Medium,
                "Time of year affects supply and demand dynamics".to_string(),
            ),
            factor(
                "Price Type",
                10,
                ImpactLevel::Low,
                format!("{price_type} pricing typically differs from wholesale"),
            ),
            factor(
                "Regional Factors",
                5,
                ImpactLevel::Low,
                "Regional economic and agricultural conditions".to_string(),
            ),
        ]
    }

    fn confidence(&self, _commodity: Commodity) -> ConfidenceFactors {
        ConfidenceFactors {
            data_quality: "high".to_string(),
            historical_accuracy: Decimal::new(85, 2),
            sample_size: "adequate".to_string(),
            market_volatility: "moderate".to_string(),
            prediction_reliability: "good".to_string(),
        }
    }
}

fn factor(name: &str, weight_pct: i64, impact: ImpactLevel, description: String) -> InfluencingFactor {
    InfluencingFactor {
        factor: name.to_string(),
        importance: Decimal::new(weight_pct, 2),
        impact,
        description,
    }
}

fn feature_label(features: &Map<String, Value>, key: &str) -> String {
    match features.get(key) {
        Some(Value::String(value)) => value.clone(),
        Some(Value::Null) | None => "N/A".to_string(),
        Some(other) => other.to_string(),
    }
}

pub fn explain<A>(attribution: &A, request: &ExplanationRequest) -> Result<Explanation, DomainError>
where
    A: FactorAttribution + ?Sized,
{
    let commodity = Commodity::parse(&request.commodity)?;

    let mut factors = attribution.attribute(commodity, request);
    factors.sort_by(|left, right| right.importance.cmp(&left.importance));

    let explanation_summary = summarize(request, &factors);

    Ok(Explanation {
        prediction_id: request.prediction_id.clone(),
        commodity: request.commodity.clone(),
        market: request.market.clone(),
        predicted_price: request.predicted_price,
        top_influencing_factors: factors,
        explanation_summary,
        confidence_factors: attribution.confidence(commodity),
    })
}

fn summarize(request: &ExplanationRequest, factors: &[InfluencingFactor]) -> String {
    let opening = format!(
        "The predicted price of {} KES/kg for {} at {}",
        price_label(request.predicted_price),
        request.commodity,
        request.market
    );
    let share = |factor: &InfluencingFactor| format!("{:.0}%", factor.importance * Decimal::ONE_HUNDRED);

    match factors {
        [] => format!("{opening} has no attributed factors."),
        [only] => format!(
            "{opening} is driven entirely by {} ({}).",
            only.factor,
            share(only)
        ),
        [first, second, rest @ ..] => {
            let mut summary = format!(
                "{opening} is primarily influenced by {} ({} of the prediction), followed by {} ({}).",
                first.factor,
                share(first),
                second.factor,
                share(second)
            );
            if !rest.is_empty() {
                let remaining: Decimal = rest.iter().map(|factor| factor.importance).sum();
                let names: Vec<&str> = rest.iter().map(|factor| factor.factor.as_str()).collect();
                summary.push_str(&format!(
                    " The remaining {:.0}% comes from {}.",
                    remaining * Decimal::ONE_HUNDRED,
                    names.join(", ")
                ));
            }
            summary
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{explain, ExplanationRequest, ImpactLevel, StaticFactorAttribution};
    use crate::errors::DomainError;

    fn request(commodity: &str) -> ExplanationRequest {
        serde_json::from_value(json!({
            "commodity": commodity,
            "market": "Gikomba",
            "predicted_price": 115.5,
            "features": {"previous_month_price": 100.0, "pricetype": "wholesale"}
        }))
        .expect("request should deserialize")
    }

    #[test]
    fn factors_are_ranked_by_importance_and_sum_to_one() {
        let explanation =
            explain(&StaticFactorAttribution, &request("cabbage")).expect("explanation");

        let weights: Vec<Decimal> =
            explanation.top_influencing_factors.iter().map(|f| f.importance).collect();
        assert!(weights.windows(2).all(|pair| pair[0] >= pair[1]));
        assert_eq!(weights.iter().copied().sum::<Decimal>(), Decimal::ONE);
        assert_eq!(explanation.top_influencing_factors[0].impact, ImpactLevel::High);
    }

    #[test]
    fn descriptions_and_summary_interpolate_the_request() {
        let explanation = explain(&StaticFactorAttribution, &request("kale")).expect("explanation");

        assert!(explanation.top_influencing_factors[0].description.contains("100.0 KES/kg"));
        assert!(explanation.top_influencing_factors[3].description.starts_with("wholesale"));
        assert_eq!(
            explanation.explanation_summary,
            "The predicted price of 115.5 KES/kg for kale at Gikomba is primarily influenced by \
             Previous Month Price (45% of the prediction), followed by Market Location (25%). \
             The remaining 30% comes from Seasonality, Price Type, Regional Factors."
        );
    }

    #[test]
    fn missing_features_render_as_not_available() {
        let mut bare = request("onion");
        bare.features.clear();

        let explanation = explain(&StaticFactorAttribution, &bare).expect("explanation");

        assert!(explanation.top_influencing_factors[0].description.contains("N/A KES/kg"));
    }

    #[test]
    fn unsupported_commodity_is_rejected() {
        let error = explain(&StaticFactorAttribution, &request("maize")).expect_err("unsupported");

        assert!(matches!(error, DomainError::UnsupportedCommodity { .. }));
    }
}
