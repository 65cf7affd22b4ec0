use std::time::Duration;

use sturdy_http::{CallClient, RequestSpec, RetryPolicy};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = std::env::var("STURDY_DEMO_URL")?;
    let token = std::env::var("STURDY_DEMO_TOKEN")?;

    let client = CallClient::new().with_policy(
        RetryPolicy::default()
            .with_initial_delay(Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(8)),
    );

    let spec = RequestSpec::get(url)
        .bearer_auth(token)
        .timeout(Duration::from_secs(5))
        .build()?;

    let body: serde_json::Value = client.call(&spec).await?;
    println!("{body:#}");

    Ok(())
}
