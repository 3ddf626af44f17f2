pub mod commodity;
pub mod config;
pub mod errors;
pub mod explain;
pub mod feedback;
pub mod forecast;
pub mod impact;
pub mod messaging;
pub mod micro_market;
pub mod price;
pub mod recommendation;

pub use commodity::{Commodity, PriceType, ThresholdTable};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use explain::{
    explain, Explanation, ExplanationRequest, FactorAttribution, InfluencingFactor,
    StaticFactorAttribution,
};
pub use feedback::{FeedbackId, FeedbackReceipt, FeedbackRecord, FeedbackSubmission};
pub use forecast::{
    forecast, CarryForwardModel, Forecast, ForecastError, ForecastRequest, ModelError,
    ModelEstimate, ModelFeatures, PriceModel,
};
pub use impact::ImpactStats;
pub use messaging::{Channel, FormattedMessage, MessageFormatter, MessagingError, PredictionRecord};
pub use micro_market::{
    DeterministicMicroMarketEstimator, LocalizedForecast, MarketType, MicroMarketEstimator,
    MicroMarketInput, MicroMarketResult, NearbyMarket, DEFAULT_MICRO_MARKET_RADIUS_KM,
};
pub use recommendation::{
    ActionType, ConfidenceLevel, DeterministicRecommendationEngine, RecommendationEngine,
    RecommendationInput, RecommendationResult,
};
