use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use you_choose::commands::{self, Cli};
use you_choose::config::Config;
use you_choose::db::Database;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let ctx = match cli.context(&config.locale) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let database = match Database::new(&config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match commands::run(&database, &ctx, cli.command).await {
        Ok(output) => {
            match serde_json::to_string_pretty(&output) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    error!("Failed to print output: {}", e);
                    return ExitCode::FAILURE;
                }
            }
            info!("Done");
            ExitCode::SUCCESS
        }
        Err(problem) => {
            match serde_json::to_string_pretty(&problem) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("{}", problem),
            }
            ExitCode::FAILURE
        }
    }
}
