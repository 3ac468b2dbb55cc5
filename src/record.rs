use std::collections::HashMap;

use anyhow::Result;
use log::{debug, info};

use crate::common::{VideoID, NOT_AVAILABLE};
use crate::source::base::{CaptionSource, Captions, SearchResultItem, VideoDetail, VideoDetails};

/// One row of the output file
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OutputRecord {
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Channel Title")]
    pub channel_title: String,
    #[serde(rename = "Keyword Tags")]
    pub keyword_tags: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Topic Details")]
    pub topic_details: String,
    #[serde(rename = "Published At")]
    pub published_at: String,
    #[serde(rename = "Duration")]
    pub duration: String,
    #[serde(rename = "View Count")]
    pub view_count: String,
    #[serde(rename = "Comment Count")]
    pub comment_count: String,
    #[serde(rename = "Captions Available")]
    pub captions_available: bool,
    #[serde(rename = "Caption Text")]
    pub caption_text: String,
    #[serde(rename = "Recording Location")]
    pub recording_location: String,
}

/// Join a list as `a, b, c`, or the placeholder when missing or empty
fn join_or_placeholder(values: &Option<Vec<String>>) -> String {
    match values {
        Some(v) if !v.is_empty() => v.join(", "),
        _ => NOT_AVAILABLE.into(),
    }
}

impl OutputRecord {
    pub fn new(detail: VideoDetail, captions: Captions) -> OutputRecord {
        let (captions_available, caption_text) = match captions {
            Captions::Available(text) => (true, text),
            Captions::Unavailable => (false, NOT_AVAILABLE.into()),
        };

        OutputRecord {
            url: detail.id.watch_url(),
            keyword_tags: join_or_placeholder(&detail.tags),
            topic_details: join_or_placeholder(&detail.topic_categories),
            title: detail.title,
            description: detail.description,
            channel_title: detail.channel_title,
            category: detail.category_id,
            published_at: detail.published_at,
            duration: detail.duration,
            view_count: detail.view_count,
            comment_count: detail.comment_count.unwrap_or_else(|| "0".into()),
            captions_available,
            caption_text,
            recording_location: detail
                .recording_location
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| NOT_AVAILABLE.into()),
        }
    }
}

/// Build one record per search item, in search order. Details for all items
/// are looked up first; items with no details are skipped. Captions are then
/// fetched for each remaining item
pub fn assemble<D, C>(
    items: &[SearchResultItem],
    details: &D,
    captions: &C,
) -> Result<Vec<OutputRecord>>
where
    D: VideoDetails + ?Sized,
    C: CaptionSource + ?Sized,
{
    let ids: Vec<VideoID> = items.iter().map(|i| i.id.clone()).collect();
    let by_id: HashMap<VideoID, VideoDetail> = details
        .details(&ids)?
        .into_iter()
        .map(|d| (d.id.clone(), d))
        .collect();

    let mut records = vec![];
    for item in items {
        let detail = match by_id.get(&item.id) {
            Some(d) => d.clone(),
            None => {
                info!("No details for {} ({:?}), skipping", item.id, item.title);
                continue;
            }
        };

        let c = captions.captions(&item.id);
        debug!(
            "Assembling record for {} (captions available: {})",
            item.id,
            c.is_available()
        );
        records.push(OutputRecord::new(detail, c));
    }

    Ok(records)
}
