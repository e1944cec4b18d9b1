use vidgate_core::{ListParams, ListResult, merge_patch, new_id, today};
use vidgate_kv::KVStore;

use crate::model::{CreateVideo, Video};
use crate::service::classify::classify;
use crate::service::integrity::can_commit_video;
use crate::service::{CatalogError, CatalogService, VIDEOS_PREFIX, video_key};

impl CatalogService {
    /// List videos, optionally filtered by category and free text.
    pub fn list_videos(
        &self,
        params: &ListParams,
        category: Option<&str>,
    ) -> Result<ListResult<Video>, CatalogError> {
        let mut items: Vec<Video> = self.scan_docs(VIDEOS_PREFIX)?;

        if let Some(category) = category {
            items.retain(|v| v.category == category);
        }
        if let Some(q) = params.q.as_deref() {
            let needle = q.to_lowercase();
            items.retain(|v| {
                v.title.to_lowercase().contains(&needle)
                    || v.description.to_lowercase().contains(&needle)
                    || v.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            });
        }

        let total = items.len();
        let items = items
            .into_iter()
            .skip(params.offset)
            .take(params.limit)
            .collect();
        Ok(ListResult { items, total })
    }

    /// Get a video by id.
    pub fn get_video(&self, id: &str) -> Result<Video, CatalogError> {
        self.require_doc(&video_key(id), &format!("video {id}"))
    }

    /// Commit a new video: classify the link, derive kind and thumbnail,
    /// check the category reference, then write.
    pub fn add_video(&self, input: CreateVideo) -> Result<Video, CatalogError> {
        if input.title.trim().is_empty() {
            return Err(CatalogError::Validation("title must not be empty".into()));
        }

        let classified = classify(&input.url)
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        let categories = self.list_categories()?;
        if !can_commit_video(&input.category, &categories) {
            return Err(CatalogError::UnknownCategory(input.category));
        }

        let video = Video {
            id: new_id(),
            title: input.title,
            description: input.description,
            url: input.url,
            thumbnail_url: classified.thumbnail_url,
            category: input.category,
            tags: input.tags,
            date: input.date.unwrap_or_else(today),
            kind: classified.kind,
        };
        self.write_doc(&video_key(&video.id), &video)?;
        tracing::info!(video = %video.id, kind = ?video.kind, "committed video");
        Ok(video)
    }

    /// Update a video with JSON merge-patch semantics.
    ///
    /// `kind` and `thumbnail_url` are derived fields: they are stripped
    /// from the patch and recomputed when the url changes. The category
    /// reference is re-checked before the write.
    pub fn update_video(
        &self,
        id: &str,
        mut patch: serde_json::Value,
    ) -> Result<Video, CatalogError> {
        let current = self.get_video(id)?;

        if let Some(obj) = patch.as_object_mut() {
            obj.remove("id");
            obj.remove("kind");
            obj.remove("thumbnail_url");
        }

        let mut base = serde_json::to_value(&current)
            .map_err(|e| CatalogError::Internal(e.to_string()))?;
        merge_patch(&mut base, &patch);
        base["id"] = serde_json::json!(current.id);

        let mut updated: Video =
            serde_json::from_value(base).map_err(|e| CatalogError::Validation(e.to_string()))?;

        if updated.url != current.url {
            let classified = classify(&updated.url)
                .map_err(|e| CatalogError::Validation(e.to_string()))?;
            updated.kind = classified.kind;
            updated.thumbnail_url = classified.thumbnail_url;
        }

        let categories = self.list_categories()?;
        if !can_commit_video(&updated.category, &categories) {
            return Err(CatalogError::UnknownCategory(updated.category));
        }

        self.write_doc(&video_key(id), &updated)?;
        Ok(updated)
    }

    /// Delete a video by id.
    pub fn delete_video(&self, id: &str) -> Result<(), CatalogError> {
        let key = video_key(id);
        self.require_doc::<Video>(&key, &format!("video {id}"))?;
        self.store.delete(&key)?;
        Ok(())
    }
}
