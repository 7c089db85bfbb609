//! Web tools: Tavily search, Pexels image search, generic HTTP fetch.
//!
//! All functions return the provider's raw response text on success and
//! descriptive error text on failure. Network errors never propagate.

use crate::provider::http::shared_client;

const TAVILY_URL: &str = "https://api.tavily.com/search";
const PEXELS_URL: &str = "https://api.pexels.com/v1/search";

/// Search the web via the Tavily API.
pub async fn tavily_search(api_key: &str, query: &str) -> String {
    tavily_search_at(TAVILY_URL, api_key, query).await
}

pub(crate) async fn tavily_search_at(url: &str, api_key: &str, query: &str) -> String {
    let body = serde_json::json!({
        "api_key": api_key,
        "query": query,
        "search_depth": "advanced",
        "include_answer": true,
        "include_images": false,
        "include_raw_content": true,
        "max_results": 3,
        "include_domains": [],
        "exclude_domains": [],
    });

    let result = async {
        let resp = shared_client().post(url).json(&body).send().await?;
        resp.text().await
    }
    .await;

    match result {
        Ok(text) => text,
        Err(e) => format!("Error searching: {e}"),
    }
}

/// Search for a stock photo via the Pexels API.
pub async fn pexels_search(api_key: &str, query: &str) -> String {
    pexels_search_at(PEXELS_URL, api_key, query).await
}

pub(crate) async fn pexels_search_at(url: &str, api_key: &str, query: &str) -> String {
    let result = async {
        let resp = shared_client()
            .get(url)
            .query(&[("query", query), ("per_page", "1")])
            .header("Authorization", api_key)
            .send()
            .await?;
        resp.text().await
    }
    .await;

    match result {
        Ok(text) => text,
        Err(e) => format!("Error searching images: {e}"),
    }
}

/// Fetch a URL, honoring optional `{method, headers, body}` request options.
pub async fn fetch_http(url: &str, options: Option<&serde_json::Value>) -> String {
    let method = options
        .and_then(|o| o.get("method"))
        .and_then(|m| m.as_str())
        .unwrap_or("GET")
        .to_uppercase();

    let method = match method.parse::<reqwest::Method>() {
        Ok(m) => m,
        Err(_) => return format!("Error fetchHttp: unsupported method {method}"),
    };

    let mut req = shared_client().request(method, url);

    if let Some(headers) = options.and_then(|o| o.get("headers")).and_then(|h| h.as_object()) {
        for (key, value) in headers {
            if let Some(v) = value.as_str() {
                req = req.header(key, v);
            }
        }
    }
    if let Some(body) = options.and_then(|o| o.get("body")) {
        match body {
            serde_json::Value::String(s) => req = req.body(s.clone()),
            other => req = req.json(other),
        }
    }

    let result = async { req.send().await?.text().await }.await;
    match result {
        Ok(text) => text,
        Err(e) => format!("Error fetchHttp: {e}"),
    }
}
