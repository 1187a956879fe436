// Tue Jan 13 2026 - Alex

use clap::Parser;
use stack_analyzer::ui::{Args, Config};
use stack_analyzer::utils::LoggingUtils;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.quiet { "error".to_string() } else { args.log_level.clone() };
    LoggingUtils::init_logger(LoggingUtils::level_from_str(&log_level), !args.no_color);

    let config = match Config::from_args(args) {
        Ok(config) => config,
        Err(message) => {
            log::error!("{message}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(message) = config.validate() {
        log::error!("{message}");
        return ExitCode::FAILURE;
    }

    match stack_analyzer::pipeline::run(&config) {
        Ok(report) => {
            if config.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(err) => {
                        log::error!("failed to serialize report: {err}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                print!("{report}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
