use agroprice_core::{MessageFormatter, MessagingError, PredictionRecord};

use super::{CommandResult, FormatArgs, EXIT_INTERNAL};

pub fn run(args: &FormatArgs) -> CommandResult {
    let formatter = match MessageFormatter::new() {
        Ok(formatter) => formatter,
        Err(error) => return failure(error),
    };

    let record = PredictionRecord {
        commodity: args.commodity.clone(),
        market: args.market.clone(),
        region: None,
        date: args.date.clone(),
        prediction_per_kg: args.price,
        previous_month_price: args.previous_price,
        market_type: None,
        confidence_pct: args.confidence_pct,
        note: args.note.clone(),
        lower_bound: None,
        upper_bound: None,
    };

    match formatter.format(&record, &args.channel) {
        Ok(message) => CommandResult::payload("format", &message),
        Err(error) => failure(error),
    }
}

fn failure(error: MessagingError) -> CommandResult {
    match error {
        MessagingError::Domain(error) => CommandResult::domain_failure("format", &error),
        MessagingError::Template(error) => {
            CommandResult::failure("format", "rendering", error.to_string(), EXIT_INTERNAL)
        }
    }
}
