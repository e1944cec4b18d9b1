//! Source-URL classification.
//!
//! Turns a pasted link into a typed reference plus a deterministic
//! thumbnail address. Pure: no network fetch is performed, and the
//! derived thumbnail may 404 at render time — accepted, unvalidated.

use thiserror::Error;
use url::Url;

use crate::model::VideoKind;

/// Short-form host whose whole path is the video id.
const SHORT_HOST: &str = "youtu.be";

/// Long-form hosts carrying ids in query parameters or path segments.
const LONG_HOSTS: &[&str] = &["youtube.com", "www.youtube.com", "m.youtube.com"];

/// Thumbnail address shown for playlists whose first item is unknown.
pub const PLAYLIST_PLACEHOLDER_THUMBNAIL: &str = "/assets/playlist-placeholder.svg";

/// The link was not recognized as any supported source. Callers must not
/// commit a video for a rejected link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unrecognized video url")]
pub struct Rejected;

/// A successfully classified source link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub kind: VideoKind,
    /// Platform-assigned id extracted from the link.
    pub canonical_id: String,
    pub thumbnail_url: String,
    /// For playlists: the id of the first item, when the link names one.
    pub first_item_id: Option<String>,
}

/// Deterministic thumbnail address for a video or live id.
pub fn thumbnail_for(canonical_id: &str) -> String {
    format!("https://img.youtube.com/vi/{canonical_id}/hqdefault.jpg")
}

/// Classify a raw link. Rules are ordered; the first match wins:
///
/// 1. short host with a bare path segment → video
/// 2. long host with a `list` parameter → playlist (a `v` parameter
///    alongside names the first item)
/// 3. long host with a `v` parameter → video
/// 4. long host with a `/live/` path segment → live
/// 5. anything else, or a malformed URL → rejected
pub fn classify(raw: &str) -> Result<Classified, Rejected> {
    let parsed = Url::parse(raw).map_err(|_| Rejected)?;
    let host = parsed.host_str().ok_or(Rejected)?;

    if host.eq_ignore_ascii_case(SHORT_HOST) {
        let id = first_path_segment(&parsed).ok_or(Rejected)?;
        return Ok(video(id));
    }

    if !LONG_HOSTS.iter().any(|h| host.eq_ignore_ascii_case(h)) {
        return Err(Rejected);
    }

    let v = query_param(&parsed, "v");
    if let Some(list_id) = query_param(&parsed, "list") {
        return Ok(playlist(list_id, v));
    }
    if let Some(id) = v {
        return Ok(video(&id));
    }
    if let Some(id) = live_segment(&parsed) {
        return Ok(Classified {
            kind: VideoKind::Live,
            thumbnail_url: thumbnail_for(&id),
            canonical_id: id,
            first_item_id: None,
        });
    }

    Err(Rejected)
}

fn video(id: &str) -> Classified {
    Classified {
        kind: VideoKind::Video,
        canonical_id: id.to_string(),
        thumbnail_url: thumbnail_for(id),
        first_item_id: None,
    }
}

fn playlist(list_id: String, first_item_id: Option<String>) -> Classified {
    let thumbnail_url = match &first_item_id {
        Some(item) => thumbnail_for(item),
        None => PLAYLIST_PLACEHOLDER_THUMBNAIL.to_string(),
    };
    Classified {
        kind: VideoKind::Playlist,
        canonical_id: list_id,
        thumbnail_url,
        first_item_id,
    }
}

fn first_path_segment(url: &Url) -> Option<&str> {
    url.path_segments()
        .and_then(|mut segments| segments.next())
        .filter(|s| !s.is_empty())
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// The segment following `/live/`, up to the next path separator; the
/// query never reaches here.
fn live_segment(url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?;
    segments
        .by_ref()
        .find(|segment| *segment == "live")
        .and_then(|_| segments.next())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_form_link() {
        let c = classify("https://youtu.be/abc123").unwrap();
        assert_eq!(c.kind, VideoKind::Video);
        assert_eq!(c.canonical_id, "abc123");
        assert_eq!(
            c.thumbnail_url,
            "https://img.youtube.com/vi/abc123/hqdefault.jpg"
        );
        assert_eq!(c.first_item_id, None);
    }

    #[test]
    fn test_short_and_long_form_agree() {
        let short = classify("https://youtu.be/abc123").unwrap();
        let long = classify("https://www.youtube.com/watch?v=abc123").unwrap();
        assert_eq!(short.canonical_id, long.canonical_id);
        assert_eq!(short.kind, long.kind);
        assert_eq!(short.thumbnail_url, long.thumbnail_url);
    }

    #[test]
    fn test_playlist_without_first_item() {
        let c = classify("https://www.youtube.com/playlist?list=PL1").unwrap();
        assert_eq!(c.kind, VideoKind::Playlist);
        assert_eq!(c.canonical_id, "PL1");
        assert_eq!(c.first_item_id, None);
        assert_eq!(c.thumbnail_url, PLAYLIST_PLACEHOLDER_THUMBNAIL);
    }

    #[test]
    fn test_playlist_with_first_item() {
        let c = classify("https://www.youtube.com/watch?v=abc123&list=PL1").unwrap();
        assert_eq!(c.kind, VideoKind::Playlist);
        assert_eq!(c.canonical_id, "PL1");
        assert_eq!(c.first_item_id, Some("abc123".to_string()));
        // The playlist borrows its first item's thumbnail.
        assert_eq!(
            c.thumbnail_url,
            "https://img.youtube.com/vi/abc123/hqdefault.jpg"
        );
    }

    #[test]
    fn test_live_link() {
        let c = classify("https://www.youtube.com/live/xyz789?feature=share").unwrap();
        assert_eq!(c.kind, VideoKind::Live);
        assert_eq!(c.canonical_id, "xyz789");
        assert_eq!(
            c.thumbnail_url,
            "https://img.youtube.com/vi/xyz789/hqdefault.jpg"
        );
    }

    #[test]
    fn test_rejections() {
        assert_eq!(classify("not a url"), Err(Rejected));
        assert_eq!(classify("https://vimeo.com/12345"), Err(Rejected));
        assert_eq!(classify("https://youtu.be/"), Err(Rejected));
        assert_eq!(classify("https://www.youtube.com/watch"), Err(Rejected));
        assert_eq!(classify("https://www.youtube.com/live/"), Err(Rejected));
    }

    #[test]
    fn test_host_case_insensitive() {
        let c = classify("https://WWW.YOUTUBE.COM/watch?v=abc123").unwrap();
        assert_eq!(c.canonical_id, "abc123");
    }
}
