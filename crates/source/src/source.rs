use crate::{parse_emote_set, Result, SourceError};
use async_trait::async_trait;
use emote_core::{RawEmoteEntry, DEFAULT_API_BASE_URL};
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Supplies the raw entries of an emote set
#[async_trait]
pub trait DictionarySource: Send + Sync {
    async fn fetch_raw_emotes(&self, emote_set_id: &str) -> Result<Vec<RawEmoteEntry>>;

    /// Short label for logs
    fn describe(&self) -> String;
}

/// Fetches emote sets from the 7TV REST API
#[derive(Debug, Clone)]
pub struct SevenTvSource {
    client: Client,
    base_url: String,
}

impl SevenTvSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("emote-inline/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn emote_set_url(&self, emote_set_id: &str) -> String {
        format!("{}/emote-sets/{}", self.base_url, emote_set_id.trim())
    }
}

#[async_trait]
impl DictionarySource for SevenTvSource {
    async fn fetch_raw_emotes(&self, emote_set_id: &str) -> Result<Vec<RawEmoteEntry>> {
        let url = self.emote_set_url(emote_set_id);
        log::debug!("Fetching emotes from: {url}");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.bytes().await?;
        parse_emote_set(&body)
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

impl Default for SevenTvSource {
    fn default() -> Self {
        Self::with_client(Client::new(), DEFAULT_API_BASE_URL)
    }
}

/// Reads a previously saved emote-set response; the set id is ignored
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DictionarySource for FileSource {
    async fn fetch_raw_emotes(&self, _emote_set_id: &str) -> Result<Vec<RawEmoteEntry>> {
        let body = tokio::fs::read(&self.path).await?;
        parse_emote_set(&body)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Serves a fixed list of entries regardless of the set id
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    entries: Vec<RawEmoteEntry>,
}

impl StaticSource {
    pub fn new(entries: Vec<RawEmoteEntry>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl DictionarySource for StaticSource {
    async fn fetch_raw_emotes(&self, _emote_set_id: &str) -> Result<Vec<RawEmoteEntry>> {
        Ok(self.entries.clone())
    }

    fn describe(&self) -> String {
        format!("static({} entries)", self.entries.len())
    }
}
