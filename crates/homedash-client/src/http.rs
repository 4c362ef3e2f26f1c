use anyhow::{Context, bail};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

const BODY_HINT_LIMIT: usize = 200;

pub fn build_client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("build http client")
}

/// POSTs to `url` and returns the body of a 2xx reply.
///
/// No retries: every caller surfaces the failure or waits for its next cycle.
pub async fn post_text<B>(client: &Client, url: &str, body: Option<&B>) -> anyhow::Result<String>
where
    B: Serialize + ?Sized,
{
    let mut request = client.post(url);
    if let Some(body) = body {
        request = request.json(body);
    }
    let response = request
        .send()
        .await
        .with_context(|| format!("send request to {url}"))?;
    let status = response.status();
    let text = response.text().await.context("read response body")?;
    if !status.is_success() {
        bail!("{}", status_message(status, &text));
    }
    Ok(text)
}

fn status_message(status: StatusCode, body: &str) -> String {
    let hint = body.trim();
    if hint.is_empty() {
        return format!("request failed with status {status}");
    }
    let mut end = hint.len().min(BODY_HINT_LIMIT);
    while !hint.is_char_boundary(end) {
        end -= 1;
    }
    format!("request failed with status {status}: {}", &hint[..end])
}

pub fn is_network_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        if let Some(reqwest_err) = cause.downcast_ref::<reqwest::Error>() {
            return reqwest_err.is_timeout()
                || reqwest_err.is_connect()
                || reqwest_err.is_request();
        }
        false
    })
}
