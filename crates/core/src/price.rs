use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a monetary amount or statistic to two decimal places, halves away from zero.
pub fn round_price(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_distance(km: Decimal) -> Decimal {
    km.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Renders a price with at least one decimal place: `100` -> `100.0`, `115.50` -> `115.5`.
pub fn price_label(amount: Decimal) -> String {
    let normalized = amount.normalize();
    if normalized.scale() == 0 {
        format!("{normalized}.0")
    } else {
        normalized.to_string()
    }
}
