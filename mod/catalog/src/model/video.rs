use serde::{Deserialize, Serialize};

/// What a pasted source link turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoKind {
    Video,
    Playlist,
    Live,
}

/// A catalog entry, stored at `videos/{id}`.
///
/// `kind` and `thumbnail_url` are derived from `url` at commit time by
/// the classifier and are only ever re-derived from a new url, never
/// edited directly. `category` is a soft reference checked against the
/// category collection before every write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub thumbnail_url: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Publication date, `YYYY-MM-DD`.
    pub date: String,
    pub kind: VideoKind,
}

/// Input for committing a new video.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVideo {
    pub title: String,
    pub description: String,
    pub url: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Defaults to today when omitted.
    #[serde(default)]
    pub date: Option<String>,
}
