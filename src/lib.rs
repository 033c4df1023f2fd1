pub mod advisor;
pub mod analysis;
pub mod auth;
pub mod cli;
pub mod cures;
pub mod error;
pub mod models;
pub mod server;
pub mod upstream;

use cli::Args;
use log::info;
use server::Server;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat Model: {}", args.gemini_model);
    info!("Chat Base URL: {:?}", args.chat_base_url);
    info!("Classifier Base URL: {:?}", args.classifier_base_url);
    info!("Classifier Timeout: {}s", args.classifier_timeout_secs);
    info!("Weather Configured: {}", args.weather_base_url.is_some());
    info!("Identity Provider Configured: {}", args.cognito_domain.is_some());
    info!("-------------------------");

    let server = Server::new(args)?;
    server.run().await?;

    Ok(())
}
