use std::sync::Arc;

use agroprice_core::config::{AppConfig, ModelConfig};
use agroprice_core::{
    CarryForwardModel, DeterministicMicroMarketEstimator, DeterministicRecommendationEngine,
    FactorAttribution, MessageFormatter, MessagingError, MicroMarketEstimator, PriceModel,
    RecommendationEngine, StaticFactorAttribution, ThresholdTable,
};
use agroprice_store::{FeedbackSink, InMemoryFeedbackSink, StaticImpactStats, StatsSource};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

/// Shared, read-only handles passed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub thresholds: &'static ThresholdTable,
    pub model: Arc<dyn PriceModel>,
    pub recommender: Arc<dyn RecommendationEngine>,
    pub micro_markets: Arc<dyn MicroMarketEstimator>,
    pub formatter: Arc<MessageFormatter>,
    pub attribution: Arc<dyn FactorAttribution>,
    pub feedback: Arc<dyn FeedbackSink>,
    pub stats: Arc<dyn StatsSource>,
}

impl AppState {
    pub fn from_model_config(model: &ModelConfig) -> Result<Self, MessagingError> {
        let thresholds = ThresholdTable::standard();
        Ok(Self {
            thresholds,
            model: Arc::new(CarryForwardModel::new(model.band_pct, model.confidence_pct)),
            recommender: Arc::new(DeterministicRecommendationEngine::new(thresholds)),
            micro_markets: Arc::new(DeterministicMicroMarketEstimator::new(thresholds)),
            formatter: Arc::new(MessageFormatter::new()?),
            attribution: Arc::new(StaticFactorAttribution),
            feedback: Arc::new(InMemoryFeedbackSink::default()),
            stats: Arc::new(StaticImpactStats),
        })
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("message templates failed to load: {0}")]
    Templates(#[from] MessagingError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    let state = AppState::from_model_config(&config.model)?;
    info!(
        event_name = "system.bootstrap.state_ready",
        correlation_id = "bootstrap",
        price_model = state.model.name(),
        commodities = state.thresholds.len(),
        "engines and collaborators initialized"
    );

    Ok(Application { config, state })
}

#[cfg(test)]
mod tests {
    use agroprice_core::config::{AppConfig, LoadOptions};

    use crate::bootstrap::bootstrap_with_config;

    #[test]
    fn bootstrap_wires_the_standard_threshold_table() {
        let config = AppConfig::load(LoadOptions::default()).expect("default config");

        let app = bootstrap_with_config(config).expect("bootstrap with defaults");

        assert_eq!(app.state.thresholds.len(), 5);
        assert_eq!(app.state.model.name(), "carry-forward");
        assert_eq!(app.config.server.port, 8000);
    }
}
