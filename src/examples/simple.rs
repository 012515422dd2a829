//! Simple example of using reqwest-proxy-rotator.

use reqwest_middleware::ClientBuilder;
use reqwest_proxy_rotator::{ProxyRotator, ProxyRotatorConfig, ProxyRotatorMiddleware, ProxyRotatorSettings};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let settings: ProxyRotatorSettings = serde_json::from_value(serde_json::json!({
        "username": std::env::var("PROXY_USERNAME")?,
        "password": std::env::var("PROXY_PASSWORD")?,
        // one `host:port` per line
        "proxies_file": "proxies.txt",
        "remove_proxy_for_status_codes": [403, 407, 503],
        "randomize_session": true,
    }))?;

    let rotator = Arc::new(ProxyRotator::new(ProxyRotatorConfig::from_settings(settings)?));

    let client = ClientBuilder::new(reqwest::Client::new())
        .with(ProxyRotatorMiddleware::new(Arc::clone(&rotator)))
        .build();

    println!("Sending requests...");
    for _ in 0..3 {
        let response = client.get("http://httpbin.org/ip").send().await?;
        println!("Status: {}", response.status());
        println!("Response: {}", response.text().await?);
    }

    let (total, active) = rotator.get_stats();
    println!("{}/{} proxies still active", active, total);

    Ok(())
}
