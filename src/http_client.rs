use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use tracing::debug;

const BROWSER_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client. The first caller decides the timeout.
pub fn http_client(timeout_secs: u64) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build http client")
    })
}

pub fn fetch_text(client: &Client, url: &str, extra_headers: &[(&str, &str)]) -> Result<String> {
    let mut req = client
        .get(url)
        .header(USER_AGENT, BROWSER_UA)
        .header(ACCEPT, "application/json, text/html;q=0.9, */*;q=0.8");
    for (name, value) in extra_headers {
        req = req.header(*name, *value);
    }

    debug!(url, "GET");
    let resp = req.send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {}: {}", status, snippet(&body)));
    }
    debug!(url, bytes = body.len(), "fetched");
    Ok(body)
}

pub(crate) fn snippet(body: &str) -> String {
    body.trim()
        .replace('\n', " ")
        .replace('\r', " ")
        .chars()
        .take(220)
        .collect()
}
