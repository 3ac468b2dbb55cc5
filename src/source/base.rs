use anyhow::Result;

use crate::common::VideoID;

/// One hit from a keyword search. Only the ID is used further on
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResultItem {
    pub id: VideoID,
    pub title: String,
    pub channel_title: String,
    pub published_at: String,
}

/// Full metadata for a video
#[derive(Debug, Clone, PartialEq)]
pub struct VideoDetail {
    pub id: VideoID,
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub tags: Option<Vec<String>>,
    pub category_id: String,
    pub topic_categories: Option<Vec<String>>,
    /// ISO-8601 timestamp, as given by the API
    pub published_at: String,
    /// ISO-8601 duration, e.g `PT4M13S`
    pub duration: String,
    pub view_count: String,
    pub comment_count: Option<String>,
    pub recording_location: Option<String>,
}

/// Outcome of a caption lookup. There is no error variant: a failed lookup
/// is reported as `Unavailable`
#[derive(Debug, Clone, PartialEq)]
pub enum Captions {
    Available(String),
    Unavailable,
}

impl Captions {
    pub fn is_available(&self) -> bool {
        match self {
            Captions::Available(_) => true,
            Captions::Unavailable => false,
        }
    }
}

/// Something which can be searched for videos by keyword
pub trait VideoSearch {
    /// Return up to `max_results` videos matching `keyword`, in the order
    /// the source ranks them
    fn search(&self, keyword: &str, max_results: usize) -> Result<Vec<SearchResultItem>>;
}

/// Source of full video metadata
pub trait VideoDetails {
    /// Look up details for the given videos. Videos the source doesn't know
    /// about (deleted, private) are left out of the result rather than being
    /// an error. Order of the result is not significant
    fn details(&self, ids: &[VideoID]) -> Result<Vec<VideoDetail>>;
}

/// Source of caption text for a video
pub trait CaptionSource {
    fn captions(&self, id: &VideoID) -> Captions;
}
