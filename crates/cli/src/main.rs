use std::process::ExitCode;

fn main() -> ExitCode {
    agroprice_cli::run()
}
