use serde::{Deserialize, Serialize};

use crate::commodity::Commodity;

/// Aggregate usage and outcome figures reported by `/impact-stats`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImpactStats {
    pub total_predictions: u64,
    pub total_users: u64,
    pub average_accuracy: f64,
    pub total_markets_covered: u32,
    pub commodities_tracked: Vec<Commodity>,
    pub user_satisfaction: f64,
    pub cost_savings_estimate: f64,
    pub last_updated: String,
}
