use crate::config::Config;
use crate::error::{BookmarkError, StoreError};
use crate::links::{MetadataFetcher, ReaderClient};
use crate::store::{Bookmark, BookmarkStore, NewBookmark, User};
use anyhow::Result;
use std::sync::Arc;
use url::Url;

/// Accept only absolute `http`/`https` URLs with a host.
pub fn validate_bookmark_url(raw: &str) -> Result<Url, BookmarkError> {
    let url = Url::parse(raw.trim()).map_err(|_| BookmarkError::InvalidUrl)?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(BookmarkError::InvalidUrl);
    }
    Ok(url)
}

/// Trim tags, drop empties and repeats. First occurrence keeps its position.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !out.iter().any(|seen| seen == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Bookmark workflows on top of the store and the page fetchers.
pub struct BookmarkService {
    store: Arc<dyn BookmarkStore>,
    metadata: MetadataFetcher,
    reader: ReaderClient,
}

impl BookmarkService {
    pub fn new(store: Arc<dyn BookmarkStore>, metadata: MetadataFetcher, reader: ReaderClient) -> Self {
        Self {
            store,
            metadata,
            reader,
        }
    }

    pub fn from_config(store: Arc<dyn BookmarkStore>, config: &Config) -> Result<Self> {
        let metadata = MetadataFetcher::new(&config.fetch.options())?;
        let reader = ReaderClient::new(
            &config.reader.base_url,
            &config.reader.options(&config.fetch),
        )?;
        Ok(Self::new(store, metadata, reader))
    }

    /// Save `url` for `user`, deriving metadata and summary from the page.
    pub async fn create(
        &self,
        user: &User,
        url: &str,
        tags: &[String],
    ) -> Result<Bookmark, BookmarkError> {
        let url = url.trim();
        let parsed = validate_bookmark_url(url)?;
        let tags = normalize_tags(tags);

        if self.store.find_bookmark_by_url(&user.id, url).await?.is_some() {
            return Err(BookmarkError::AlreadyExists);
        }

        let (metadata, summary) =
            tokio::join!(self.metadata.fetch(&parsed), self.reader.summarize(url));
        tracing::debug!(
            url,
            title = %metadata.title,
            summary_len = summary.summary.chars().count(),
            "page fetched for bookmark"
        );

        let saved = self
            .store
            .insert_bookmark(NewBookmark {
                user_id: user.id.clone(),
                url: url.to_string(),
                title: metadata.title,
                favicon: metadata.favicon,
                description: metadata.description,
                summary: summary.summary,
                full_content: summary.full_content,
                tags,
            })
            .await;

        match saved {
            Ok(bookmark) => {
                tracing::info!(user_id = %user.id, bookmark_id = %bookmark.id, "bookmark created");
                Ok(bookmark)
            }
            // Lost a race with a concurrent save of the same URL.
            Err(StoreError::Conflict(_)) => Err(BookmarkError::AlreadyExists),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list(&self, user: &User, tag: Option<&str>) -> Result<Vec<Bookmark>, BookmarkError> {
        let tag = tag.map(str::trim).filter(|t| !t.is_empty());
        Ok(self.store.list_bookmarks(&user.id, tag).await?)
    }

    pub async fn get(&self, user: &User, id: &str) -> Result<Bookmark, BookmarkError> {
        self.store
            .get_bookmark(&user.id, id)
            .await?
            .ok_or(BookmarkError::NotFound)
    }

    pub async fn delete(&self, user: &User, id: &str) -> Result<(), BookmarkError> {
        if self.store.delete_bookmark(&user.id, id).await? {
            tracing::info!(user_id = %user.id, bookmark_id = id, "bookmark deleted");
            Ok(())
        } else {
            Err(BookmarkError::NotFound)
        }
    }

    pub async fn tags(&self, user: &User) -> Result<Vec<String>, BookmarkError> {
        Ok(self.store.list_tags(&user.id).await?)
    }
}
