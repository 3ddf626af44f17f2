use agroprice_core::{DeterministicMicroMarketEstimator, MicroMarketEstimator, MicroMarketInput};

use super::{CommandResult, MicroMarketArgs};

pub fn run(args: &MicroMarketArgs) -> CommandResult {
    let estimator = DeterministicMicroMarketEstimator::default();
    let input = MicroMarketInput {
        commodity: &args.commodity,
        region: &args.region,
        radius_km: args.radius_km,
        date: &args.date,
    };

    match estimator.estimate(&input) {
        Ok(result) => CommandResult::payload("micro-market", &result),
        Err(error) => CommandResult::domain_failure("micro-market", &error),
    }
}
