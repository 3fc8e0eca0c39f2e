//! HTTP schedule feed backed by `reqwest`.

use async_trait::async_trait;
use log::{info, warn};
use reqwest::{Client, StatusCode};

use super::source::ScheduleFeed;
use crate::config::FeedSettings;
use crate::error::{ProgrammeError, ProgrammeResult};
use crate::models::{
    parse_schedule_json_str, parse_talk_detail_json_str, parse_talk_details_json_str, Schedule,
    TalkDetail, TalkDetailCache, TalkId,
};

/// Feed reading the conference programme and talk details over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFeed {
    client: Client,
    schedule_url: String,
    detail_url_template: String,
    bulk_detail_url: Option<String>,
}

impl HttpFeed {
    pub fn new(settings: &FeedSettings) -> ProgrammeResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("progpdf/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProgrammeError::Feed(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, settings))
    }

    pub fn with_client(client: Client, settings: &FeedSettings) -> Self {
        Self {
            client,
            schedule_url: settings.schedule_url.clone(),
            detail_url_template: settings.detail_url_template.clone(),
            bulk_detail_url: settings.bulk_detail_url.clone(),
        }
    }

    pub fn detail_url(&self, id: &TalkId) -> String {
        self.detail_url_template.replace("{id}", id.as_str())
    }

    /// GET a URL and return the body, `None` on 404.
    async fn get_text(&self, url: &str) -> ProgrammeResult<Option<String>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProgrammeError::Feed(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ProgrammeError::Feed(format!(
                "GET {} returned HTTP {}",
                url, status
            )));
        }

        response
            .text()
            .await
            .map(Some)
            .map_err(|e| ProgrammeError::Feed(format!("Failed to read body of {}: {}", url, e)))
    }
}

#[async_trait]
impl ScheduleFeed for HttpFeed {
    async fn fetch_schedule(&self) -> ProgrammeResult<Schedule> {
        info!("Fetching schedule from {}", self.schedule_url);
        let body = self.get_text(&self.schedule_url).await?.ok_or_else(|| {
            ProgrammeError::Feed(format!("Schedule not found at {}", self.schedule_url))
        })?;
        let schedule = parse_schedule_json_str(&body)?;
        info!(
            "Loaded {} talks over {} days (checksum {})",
            schedule.talk_count(),
            schedule.days.len(),
            schedule.checksum
        );
        Ok(schedule)
    }

    async fn fetch_detail(&self, id: &TalkId) -> ProgrammeResult<Option<TalkDetail>> {
        let url = self.detail_url(id);
        match self.get_text(&url).await? {
            Some(body) => parse_talk_detail_json_str(&body),
            None => Ok(None),
        }
    }

    async fn fetch_all_details(&self, ids: &[TalkId]) -> ProgrammeResult<TalkDetailCache> {
        let Some(bulk_url) = &self.bulk_detail_url else {
            let mut cache = TalkDetailCache::new();
            for id in ids {
                if let Some(detail) = self.fetch_detail(id).await? {
                    cache.insert(detail);
                }
            }
            info!("Fetched {} of {} talk details", cache.len(), ids.len());
            return Ok(cache);
        };

        info!("Fetching talk details from {}", bulk_url);
        let Some(body) = self.get_text(bulk_url).await? else {
            warn!("Bulk detail feed {} not found, rendering without details", bulk_url);
            return Ok(TalkDetailCache::new());
        };
        let cache: TalkDetailCache = parse_talk_details_json_str(&body)?
            .into_iter()
            .filter(|d| ids.contains(&d.id))
            .collect();
        info!("Fetched {} of {} talk details", cache.len(), ids.len());
        Ok(cache)
    }
}
