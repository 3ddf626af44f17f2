use agroprice_core::{DeterministicRecommendationEngine, RecommendationEngine, RecommendationInput};

use super::{CommandResult, RecommendArgs};

pub fn run(args: &RecommendArgs) -> CommandResult {
    let engine = DeterministicRecommendationEngine::default();
    let input = RecommendationInput {
        commodity: &args.commodity,
        predicted_price: args.predicted_price,
        previous_price: args.previous_price,
        price_type: &args.price_type,
    };

    match engine.recommend(&input) {
        Ok(result) => CommandResult::payload("recommend", &result),
        Err(error) => CommandResult::domain_failure("recommend", &error),
    }
}
