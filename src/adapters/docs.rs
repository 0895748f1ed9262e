use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = "Carrier-Agent/1.0";

/// Downloads the API documentation page. Never fails: on error the returned
/// text is a marker describing the problem, so the run can continue.
pub async fn fetch_docs(url: &str) -> String {
    match try_fetch(url).await {
        Ok(html) => {
            tracing::debug!("Fetched {} bytes of documentation", html.len());
            html
        }
        Err(e) => {
            tracing::warn!("⚠️ Documentation fetch failed: {}", e);
            format!("/* docs fetch error: {} */", e)
        }
    }
}

async fn try_fetch(url: &str) -> reqwest::Result<String> {
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .build()?;
    client.get(url).send().await?.error_for_status()?.text().await
}
