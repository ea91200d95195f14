use std::time::Duration;

/// Best-effort reachability probe of the generative service's model listing.
pub async fn check_generative(base_url: &str, api_key: Option<&str>) -> bool {
    let Some(key) = api_key.filter(|k| !k.trim().is_empty()) else {
        return false;
    };
    let url = format!("{}/models", base_url.trim_end_matches('/'));
    let Ok(client) = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
    else {
        return false;
    };
    client
        .get(url)
        .bearer_auth(key)
        .send()
        .await
        .map(|r| r.status().is_success())
        .unwrap_or(false)
}
