/// Placeholder written in place of missing optional values
pub const NOT_AVAILABLE: &str = "N/A";

/// Identifier for a video on Youtube
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoID {
    pub id: String,
}

impl VideoID {
    pub fn new(id: impl Into<String>) -> VideoID {
        VideoID { id: id.into() }
    }

    pub fn id_str(&self) -> &str {
        &self.id
    }

    /// Public watch page for the video
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={id}", id = self.id)
    }
}

impl std::fmt::Display for VideoID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}
