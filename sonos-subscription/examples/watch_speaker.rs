//! Subscribe to a speaker's AVTransport events and keep the lease alive
//!
//! Usage:
//!
//! ```text
//! SONOS_LOG_MODE=development cargo run --example watch_speaker -- <speaker-ip> <callback-url>
//! ```
//!
//! Notifications are delivered to `<callback-url>`; serving it is up to you.
//! Press Ctrl-C to unsubscribe and exit.

use gena_client::HttpTransport;
use sonos_subscription::logging::init_logging_from_env;
use sonos_subscription::{DeviceTarget, EventSubscriber, SubscriptionManager};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging_from_env()?;

    let mut args = std::env::args().skip(1);
    let (Some(speaker_ip), Some(callback_url)) = (args.next(), args.next()) else {
        eprintln!("usage: watch_speaker <speaker-ip> <callback-url>");
        std::process::exit(2);
    };

    let manager = SubscriptionManager::new(
        HttpTransport::new()?,
        DeviceTarget::av_transport(speaker_ip),
    );

    let lease = manager.subscribe(&callback_url).await?;
    println!(
        "Subscribed with SID {} (lease: {})",
        lease.sid,
        lease
            .lease_seconds
            .map(|s| format!("{}s", s))
            .unwrap_or_else(|| "not granted".to_string())
    );

    tokio::signal::ctrl_c().await?;

    match manager.unsubscribe().await {
        Ok(released) => println!("Unsubscribed {} (HTTP {})", released.sid, released.status),
        Err(e) => println!("Unsubscribe not confirmed: {}", e),
    }

    Ok(())
}
