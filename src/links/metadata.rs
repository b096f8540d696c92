use super::guard::{ensure_public_host, redirect_hop};
use super::types::{FetchOptions, PageMetadata};
use crate::error::FetchError;
use anyhow::Result;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

const UNTITLED: &str = "Untitled";
const DEFAULT_FAVICON_PATH: &str = "/favicon.ico";

static TITLE_SELECTORS: LazyLock<Vec<(Selector, Option<&'static str>)>> = LazyLock::new(|| {
    selectors(&[
        ("title", None),
        (r#"meta[property="og:title"]"#, Some("content")),
        (r#"meta[name="twitter:title"]"#, Some("content")),
    ])
});
static DESCRIPTION_SELECTORS: LazyLock<Vec<(Selector, Option<&'static str>)>> =
    LazyLock::new(|| {
        selectors(&[
            (r#"meta[name="description"]"#, Some("content")),
            (r#"meta[property="og:description"]"#, Some("content")),
            (r#"meta[name="twitter:description"]"#, Some("content")),
        ])
    });
static FAVICON_SELECTORS: LazyLock<Vec<(Selector, Option<&'static str>)>> = LazyLock::new(|| {
    selectors(&[
        (r#"link[rel="icon"]"#, Some("href")),
        (r#"link[rel="shortcut icon"]"#, Some("href")),
        (r#"link[rel="apple-touch-icon"]"#, Some("href")),
    ])
});

/// `(selector, attribute)` pairs; a `None` attribute reads the element text.
fn selectors(specs: &[(&str, Option<&'static str>)]) -> Vec<(Selector, Option<&'static str>)> {
    specs
        .iter()
        .map(|(css, attr)| {
            let selector = Selector::parse(css).expect("metadata selector must parse");
            (selector, *attr)
        })
        .collect()
}

/// Fetches a page and reads its title, description and favicon.
pub struct MetadataFetcher {
    client: reqwest::Client,
    max_redirects: usize,
    block_private_hosts: bool,
}

impl MetadataFetcher {
    pub fn new(options: &FetchOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(options.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            max_redirects: options.max_redirects,
            block_private_hosts: options.block_private_hosts,
        })
    }

    /// Fetch page metadata, falling back to hostname-derived values on any
    /// failure. Never returns an error.
    pub async fn fetch(&self, url: &Url) -> PageMetadata {
        match self.try_fetch(url).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "page metadata fetch failed, using fallback");
                fallback_metadata(url)
            }
        }
    }

    /// Fetch page metadata, surfacing transport and status failures.
    ///
    /// Redirects are followed here rather than by the client so that every
    /// hop passes the private-host guard.
    pub async fn try_fetch(&self, url: &Url) -> Result<PageMetadata, FetchError> {
        let mut current = url.clone();
        let mut hops = 0usize;

        let response = loop {
            if self.block_private_hosts {
                ensure_public_host(&current).await?;
            }

            let response = self
                .client
                .get(current.as_str())
                .send()
                .await
                .map_err(|e| FetchError::Request {
                    url: current.to_string(),
                    message: e.to_string(),
                })?;

            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok());
            let Some(location) = location.filter(|_| response.status().is_redirection()) else {
                break response;
            };

            if hops >= self.max_redirects {
                return Err(FetchError::Request {
                    url: url.to_string(),
                    message: format!("stopped after {hops} redirects"),
                });
            }
            let next = redirect_hop(&current, location, self.block_private_hosts)?;
            tracing::debug!(from = %current, to = %next, "following redirect");
            hops += 1;
            current = next;
        };

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: current.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| FetchError::Request {
            url: current.to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!(url = %current, bytes = body.len(), "fetched page for metadata");
        Ok(extract_metadata(&body, &current))
    }
}

/// Parse title, description and favicon out of an HTML document.
pub fn extract_metadata(html: &str, page_url: &Url) -> PageMetadata {
    let document = Html::parse_document(html);
    let origin = page_url.origin().ascii_serialization();

    let title = first_match(&document, &TITLE_SELECTORS).unwrap_or_else(|| UNTITLED.to_string());
    let description = first_match(&document, &DESCRIPTION_SELECTORS);
    let favicon = first_match(&document, &FAVICON_SELECTORS)
        .unwrap_or_else(|| DEFAULT_FAVICON_PATH.to_string());

    PageMetadata {
        title,
        favicon: resolve_favicon(&favicon, &origin),
        description,
    }
}

/// Metadata used when the page could not be fetched.
pub fn fallback_metadata(page_url: &Url) -> PageMetadata {
    let origin = page_url.origin().ascii_serialization();
    PageMetadata {
        title: page_url.host_str().unwrap_or_default().to_string(),
        favicon: format!("{origin}{DEFAULT_FAVICON_PATH}"),
        description: None,
    }
}

/// Make a favicon href absolute against the page origin.
pub fn resolve_favicon(href: &str, origin: &str) -> String {
    if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("{origin}{href}")
    } else if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{origin}/{href}")
    }
}

fn first_match(document: &Html, candidates: &[(Selector, Option<&'static str>)]) -> Option<String> {
    candidates.iter().find_map(|(selector, attr)| {
        let element = document.select(selector).next()?;
        let value = match attr {
            Some(name) => element.value().attr(name)?.to_string(),
            None => element.text().collect::<String>(),
        };
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}
