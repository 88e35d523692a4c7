//! Example: List live channels grouped by broadcast type
//!
//! Run with: cargo run -p ktvlive --example list_channels
//! Or with a channel to look up its Jikkyo endpoint:
//! cargo run -p ktvlive --example list_channels -- gr011

use ktvconfig::get_config;
use ktvlive::logging::init_logging;
use ktvlive::{ChannelsClient, ChannelsGateway, FetchOutcome};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = get_config();
    init_logging(&config);

    let client = ChannelsClient::from_config(&config).await?;
    println!("Fetching channels from {}...\n", client.base_url());

    let gateway = ChannelsGateway::new(client);

    let directory = match gateway.fetch_directory().await {
        FetchOutcome::Success(directory) => directory,
        FetchOutcome::Failed => return Ok(()),
    };

    println!("Found {} channels total:", directory.len());
    for (channel_type, channels) in directory.buckets() {
        println!("\n=== {} ({}) ===", channel_type.label(), channels.len());
        for channel in channels {
            let now = channel
                .program_present
                .as_ref()
                .map(|p| p.title.as_str())
                .unwrap_or("-");
            println!(
                "  {:<8} {:<24} {:>5} viewers  {}",
                channel.display_channel_id, channel.name, channel.viewer_count, now
            );
        }
    }

    if let Some(channel) = env::args().nth(1) {
        println!("\nJikkyo for {}:", channel);
        if let FetchOutcome::Success(info) = gateway.locate_jikkyo_gateway(channel.as_str()).await {
            match info.websocket_url {
                Some(url) => println!("  {}", url),
                None => println!("  no commentary available"),
            }
        }
    }

    Ok(())
}
