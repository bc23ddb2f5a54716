use clap::Parser;
use pmk_cli::cli::Cli;
use pmk_cli::remediation;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let telemetry = if cli.json_logs {
        pmk_telemetry::init_json_telemetry("pmk")
    } else {
        pmk_telemetry::init_telemetry("pmk")
    };
    if let Err(e) = telemetry {
        eprintln!("Failed to initialize telemetry: {e}");
    }

    match pmk_cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            if let Some(hint) = remediation::hint_for(&e) {
                eprintln!("hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}
