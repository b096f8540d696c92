//! Client for the remote URL-to-text reader service.

use super::content::clean_full_content;
use super::summary::extract_summary;
use super::types::{FetchOptions, PageSummary};
use crate::error::FetchError;
use anyhow::Result;

/// Prefix `https://` onto inputs that carry no HTTP scheme.
pub fn normalize_target_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

pub struct ReaderClient {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl ReaderClient {
    pub fn new(base_url: &str, options: &FetchOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(options.max_redirects))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: options.user_agent.clone(),
        })
    }

    /// Reader endpoint for a target page: the target is percent-encoded into
    /// the path.
    pub fn endpoint_for(&self, target: &str) -> String {
        let normalized = normalize_target_url(target);
        format!("{}/{}", self.base_url, urlencoding::encode(&normalized))
    }

    /// Fetch the raw reader document for `target`.
    pub async fn fetch_raw(&self, target: &str) -> Result<String, FetchError> {
        let endpoint = self.endpoint_for(target);
        tracing::debug!(target, endpoint = %endpoint, "requesting reader document");

        let request_error = |e: reqwest::Error| FetchError::Request {
            url: endpoint.clone(),
            message: e.to_string(),
        };

        let response = self
            .client
            .get(&endpoint)
            .header(reqwest::header::ACCEPT, "text/plain")
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), detail = %detail, "reader returned error status");
            return Err(FetchError::Status {
                url: endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(request_error)?;
        tracing::debug!(target, bytes = body.len(), "reader document received");
        Ok(body)
    }

    /// Summarize `target` through the reader service.
    ///
    /// Any failure yields [`PageSummary::unavailable`].
    pub async fn summarize(&self, target: &str) -> PageSummary {
        match self.fetch_raw(target).await {
            Ok(raw) => summarize_document(&raw),
            Err(e) => {
                tracing::warn!(target, error = %e, "reader fetch failed, summary unavailable");
                PageSummary::unavailable()
            }
        }
    }
}

/// Derive both the card summary and the detail text from one document.
pub fn summarize_document(raw: &str) -> PageSummary {
    let summary = PageSummary {
        summary: extract_summary(raw),
        full_content: clean_full_content(raw),
    };
    tracing::debug!(
        raw_len = raw.len(),
        summary_len = summary.summary.chars().count(),
        "reader document summarized"
    );
    summary
}
