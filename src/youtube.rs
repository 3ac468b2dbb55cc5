use std::collections::HashSet;

use anyhow::{Context, Result};
use log::{debug, trace, warn};
use thiserror::Error;

use crate::common::VideoID;
use crate::config::Config;
use crate::source::base::{SearchResultItem, VideoDetail, VideoDetails, VideoSearch};

/// Most results the API returns per search page, and most IDs accepted per
/// `videos` lookup
const MAX_PAGE_SIZE: usize = 50;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Error from {url} - status {status}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct YTSearchListResponse {
    next_page_token: Option<String>,
    #[serde(default)]
    items: Vec<YTSearchResult>,
}

#[derive(Deserialize, Debug, Clone)]
struct YTSearchResult {
    id: YTSearchResultId,
    snippet: YTSearchSnippet,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct YTSearchResultId {
    video_id: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
struct YTSearchSnippet {
    published_at: String,
    title: String,
    channel_title: String,
}

#[derive(Deserialize, Debug, Clone)]
struct YTVideoListResponse {
    #[serde(default)]
    items: Vec<YTVideo>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct YTVideo {
    id: String,
    snippet: YTVideoSnippet,
    #[serde(default)]
    content_details: YTVideoContentDetails,
    #[serde(default)]
    statistics: YTVideoStatistics,
    topic_details: Option<YTTopicDetails>,
    recording_details: Option<YTRecordingDetails>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct YTVideoSnippet {
    published_at: String,
    title: String,
    #[serde(default)]
    description: String,
    channel_title: String,
    tags: Option<Vec<String>>,
    #[serde(default)]
    category_id: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
struct YTVideoContentDetails {
    duration: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
struct YTVideoStatistics {
    view_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct YTTopicDetails {
    topic_categories: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct YTRecordingDetails {
    location_description: Option<String>,
}

/// Body of a failed API call
#[derive(Deserialize, Debug)]
struct YTErrorResponse {
    error: YTErrorBody,
}

#[derive(Deserialize, Debug)]
struct YTErrorBody {
    message: String,
}

impl From<YTVideo> for VideoDetail {
    fn from(v: YTVideo) -> Self {
        VideoDetail {
            id: VideoID::new(v.id),
            title: v.snippet.title,
            description: v.snippet.description,
            channel_title: v.snippet.channel_title,
            tags: v.snippet.tags,
            category_id: v.snippet.category_id,
            topic_categories: v.topic_details.and_then(|t| t.topic_categories),
            published_at: v.snippet.published_at,
            duration: v.content_details.duration,
            view_count: v.statistics.view_count.unwrap_or_default(),
            comment_count: v.statistics.comment_count,
            recording_location: v.recording_details.and_then(|r| r.location_description),
        }
    }
}

/// One page of search results
#[derive(Debug)]
pub(crate) struct SearchPage {
    pub items: Vec<SearchResultItem>,
    pub next_page_token: Option<String>,
}

/// Collect up to `max_results` items by repeatedly calling `fetch_page` with
/// a page size and the continuation token from the previous page. Stops when
/// enough items are collected or the source gives no further token
pub(crate) fn paginate<F>(max_results: usize, mut fetch_page: F) -> Result<Vec<SearchResultItem>>
where
    F: FnMut(usize, Option<&str>) -> Result<SearchPage>,
{
    let mut found: Vec<SearchResultItem> = vec![];
    let mut page_token: Option<String> = None;

    while found.len() < max_results {
        let remaining = max_results - found.len();
        let page = fetch_page(remaining.min(MAX_PAGE_SIZE), page_token.as_deref())?;

        if page.items.is_empty() {
            if page.next_page_token.is_some() {
                warn!("Search page was empty but had a continuation token, stopping");
            }
            break;
        }

        // Never trust the page size to have been honoured
        found.extend(page.items.into_iter().take(remaining));

        page_token = page.next_page_token;
        if page_token.is_none() {
            break;
        }
    }

    Ok(found)
}

/// Client for the Youtube Data API (v3)
#[derive(Debug)]
pub struct YoutubeQuery<'a> {
    cfg: &'a Config,
}

impl<'a> YoutubeQuery<'a> {
    pub fn new(cfg: &Config) -> YoutubeQuery {
        YoutubeQuery { cfg }
    }

    /// GET an API endpoint and parse the JSON response
    fn request_data<T: serde::de::DeserializeOwned + std::fmt::Debug>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!(
            "{prefix}/youtube/v3/{endpoint}",
            prefix = self.cfg.api_prefix,
            endpoint = endpoint
        );
        debug!("Retrieving URL {} with {:?}", &url, params);

        let mut req = attohttpc::get(&url);
        for (k, v) in params {
            req = req.param(k, v);
        }
        let resp = req
            .param("key", self.cfg.api_key())
            .send()
            .with_context(|| format!("Request to {} failed", &url))?;
        let status = resp.status();
        let text = resp.text()?;
        trace!("Raw response: {}", &text);

        if !status.is_success() {
            let message = serde_json::from_str::<YTErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(ApiError::Status {
                url,
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let data: T = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse response from {}", &url))?;
        trace!("Raw deserialisation: {:?}", &data);
        Ok(data)
    }

    fn search_page(
        &self,
        keyword: &str,
        page_size: usize,
        page_token: Option<&str>,
    ) -> Result<SearchPage> {
        let mut params = vec![
            ("part", "snippet".to_string()),
            ("type", "video".to_string()),
            ("q", keyword.to_string()),
            ("maxResults", page_size.to_string()),
        ];
        if let Some(pt) = page_token {
            params.push(("pageToken", pt.to_string()));
        }

        let d: YTSearchListResponse = self.request_data("search", &params)?;
        debug!(
            "Search page had {} items, next page token {:?}",
            d.items.len(),
            d.next_page_token
        );

        let items = d
            .items
            .into_iter()
            .map(|r| SearchResultItem {
                id: VideoID::new(r.id.video_id),
                title: r.snippet.title,
                channel_title: r.snippet.channel_title,
                published_at: r.snippet.published_at,
            })
            .collect();

        Ok(SearchPage {
            items,
            next_page_token: d.next_page_token,
        })
    }
}

impl<'a> VideoSearch for YoutubeQuery<'a> {
    fn search(&self, keyword: &str, max_results: usize) -> Result<Vec<SearchResultItem>> {
        paginate(max_results, |page_size, page_token| {
            self.search_page(keyword, page_size, page_token)
        })
    }
}

impl<'a> VideoDetails for YoutubeQuery<'a> {
    fn details(&self, ids: &[VideoID]) -> Result<Vec<VideoDetail>> {
        // Search can return the same video twice, only ask about it once
        let mut seen = HashSet::new();
        let unique: Vec<&str> = ids
            .iter()
            .map(|v| v.id_str())
            .filter(|id| seen.insert(*id))
            .collect();

        let mut found: Vec<VideoDetail> = vec![];
        for batch in unique.chunks(MAX_PAGE_SIZE) {
            let params = vec![
                (
                    "part",
                    "snippet,contentDetails,statistics,topicDetails,recordingDetails".to_string(),
                ),
                ("id", batch.join(",")),
            ];
            let d: YTVideoListResponse = self.request_data("videos", &params)?;
            if d.items.len() < batch.len() {
                debug!(
                    "Asked for {} videos but only {} were returned",
                    batch.len(),
                    d.items.len()
                );
            }
            found.extend(d.items.into_iter().map(VideoDetail::from));
        }

        Ok(found)
    }
}
