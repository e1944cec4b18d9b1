//! Referential-integrity decision procedures.
//!
//! Pure and synchronous, evaluated against caller-supplied snapshots.
//! Two concurrent admin operations can interleave around these checks;
//! that window is accepted for single-admin usage, and a violated
//! precondition always surfaces as a rejection, never a silent no-op.

use crate::model::{Category, Video};

/// A category may be deleted only while no video references it.
pub fn can_delete_category(name: &str, videos: &[Video]) -> bool {
    !videos.iter().any(|video| video.category == name)
}

/// A video may be committed only with a category that exists.
pub fn can_commit_video(category: &str, categories: &[Category]) -> bool {
    categories.iter().any(|c| c.name == category)
}

#[cfg(test)]
mod tests {
    use crate::model::VideoKind;

    use super::*;

    fn video(category: &str) -> Video {
        Video {
            id: "v1".into(),
            title: "t".into(),
            description: "d".into(),
            url: "https://youtu.be/abc".into(),
            thumbnail_url: "https://img.youtube.com/vi/abc/hqdefault.jpg".into(),
            category: category.into(),
            tags: vec![],
            date: "2024-01-01".into(),
            kind: VideoKind::Video,
        }
    }

    #[test]
    fn test_can_delete_category() {
        // Empty catalog: anything may go.
        assert!(can_delete_category("Programming", &[]));

        let videos = [video("Programming"), video("Music")];
        assert!(!can_delete_category("Programming", &videos));
        assert!(!can_delete_category("Music", &videos));
        assert!(can_delete_category("Cooking", &videos));
    }

    #[test]
    fn test_can_commit_video() {
        assert!(!can_commit_video("Programming", &[]));

        let categories = [
            Category {
                name: "Programming".into(),
            },
            Category {
                name: "Music".into(),
            },
        ];
        assert!(can_commit_video("Programming", &categories));
        assert!(!can_commit_video("programming", &categories)); // exact match
        assert!(!can_commit_video("Cooking", &categories));
    }
}
