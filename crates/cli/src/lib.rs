pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use commands::{FormatArgs, MicroMarketArgs, RecommendArgs};

#[derive(Debug, Parser)]
#[command(
    name = "agroprice",
    about = "Agroprice operator CLI",
    long_about = "Inspect configuration and run the recommendation, micro-market and message engines offline.",
    after_help = "Examples:\n  agroprice config\n  agroprice recommend --commodity cabbage --predicted-price 120 --previous-price 100\n  agroprice format --channel sms --commodity kale --market Gikomba --date 2025-12-05 --price 42.5 --previous-price 40"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Derive sell/hold advice from a predicted and a previous price")]
    Recommend(RecommendArgs),
    #[command(about = "Estimate prices across synthetic nearby markets for a region")]
    MicroMarket(MicroMarketArgs),
    #[command(about = "Render a prediction as an SMS, WhatsApp message or bulletin")]
    Format(FormatArgs),
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => commands::config::run(),
        Command::Recommend(args) => commands::recommend::run(&args),
        Command::MicroMarket(args) => commands::micro_market::run(&args),
        Command::Format(args) => commands::format::run(&args),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
