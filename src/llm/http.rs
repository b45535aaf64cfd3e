use std::net::IpAddr;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::errors::ApiError;

/// Client for one provider; loopback servers are reached without a proxy.
pub(crate) fn http_client(base_url: &str) -> Client {
    let builder = Client::builder();
    let builder = if is_loopback(base_url) {
        builder.no_proxy()
    } else {
        builder
    };
    builder.build().unwrap_or_else(|err| {
        tracing::warn!("Falling back to default HTTP client: {}", err);
        Client::new()
    })
}

fn is_loopback(base_url: &str) -> bool {
    let Ok(url) = Url::parse(base_url) else {
        return false;
    };
    match url.host_str() {
        Some("localhost") => true,
        Some(host) => host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .map(|ip| ip.is_loopback())
            .unwrap_or(false),
        None => false,
    }
}

/// POSTs `body` as JSON and decodes a successful JSON reply into `T`.
///
/// Transport failures and non-success statuses become `Gateway` errors; the
/// response body is included so operators can see what the server said.
pub(crate) async fn post_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    body: &Value,
    bearer: Option<&str>,
    label: &str,
) -> Result<T, ApiError> {
    let mut builder = client.post(url).json(body);
    if let Some(token) = bearer {
        builder = builder.bearer_auth(token);
    }

    let res = builder.send().await.map_err(|err| {
        if err.is_timeout() {
            ApiError::GatewayTimeout(format!("{}: {}", label, err))
        } else {
            ApiError::Gateway(format!("{} request failed: {}", label, err))
        }
    })?;

    let status = res.status();
    if !status.is_success() {
        let text = res.text().await.unwrap_or_default();
        return Err(ApiError::Gateway(format!(
            "{} returned {}: {}",
            label,
            status,
            text.trim()
        )));
    }

    res.json::<T>()
        .await
        .map_err(|err| ApiError::Gateway(format!("{} sent a malformed response: {}", label, err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_hosts_are_recognized() {
        assert!(is_loopback("http://localhost:11434"));
        assert!(is_loopback("http://127.0.0.1:1234/"));
        assert!(is_loopback("http://[::1]:8080"));
        assert!(!is_loopback("https://api.openai.com"));
        assert!(!is_loopback("not a url"));
    }
}
