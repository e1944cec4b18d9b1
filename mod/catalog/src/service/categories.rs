use vidgate_kv::KVStore;

use crate::model::{Category, Video};
use crate::service::integrity::can_delete_category;
use crate::service::{
    CATEGORIES_PREFIX, CatalogError, CatalogService, VIDEOS_PREFIX, category_key,
};

impl CatalogService {
    /// List all categories.
    pub fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.scan_docs(CATEGORIES_PREFIX)
    }

    /// Create a category. The name is the identifier; inserting an
    /// existing name is a conflict, not an overwrite.
    pub fn add_category(&self, name: &str) -> Result<Category, CatalogError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::Validation(
                "category name must not be empty".into(),
            ));
        }

        let category = Category {
            name: name.to_string(),
        };
        if self.write_doc_if_absent(&category_key(name), &category)? {
            Ok(category)
        } else {
            Err(CatalogError::Conflict(format!(
                "category {name} already exists"
            )))
        }
    }

    /// Delete a category, provided no video references it.
    pub fn remove_category(&self, name: &str) -> Result<(), CatalogError> {
        let key = category_key(name);
        self.require_doc::<Category>(&key, &format!("category {name}"))?;

        let videos: Vec<Video> = self.scan_docs(VIDEOS_PREFIX)?;
        if !can_delete_category(name, &videos) {
            return Err(CatalogError::CategoryInUse(name.to_string()));
        }

        self.store.delete(&key)?;
        tracing::info!(category = name, "removed category");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vidgate_kv::RedbStore;

    use crate::model::CreateVideo;

    use super::*;

    fn test_service() -> Arc<CatalogService> {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        CatalogService::new(Arc::new(RedbStore::open(tmp.path()).unwrap()))
    }

    #[test]
    fn test_add_and_list() {
        let svc = test_service();

        svc.add_category("Programming").unwrap();
        svc.add_category("  Music  ").unwrap();

        let names: Vec<String> = svc
            .list_categories()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Music".to_string(), "Programming".to_string()]);
    }

    #[test]
    fn test_duplicate_name_is_conflict() {
        let svc = test_service();
        svc.add_category("Programming").unwrap();

        assert!(matches!(
            svc.add_category("Programming"),
            Err(CatalogError::Conflict(_))
        ));
        assert!(matches!(
            svc.add_category(""),
            Err(CatalogError::Validation(_))
        ));
    }

    #[test]
    fn test_remove_blocked_while_referenced() {
        let svc = test_service();
        svc.add_category("Programming").unwrap();

        let video = svc
            .add_video(CreateVideo {
                title: "Intro".into(),
                description: "d".into(),
                url: "https://youtu.be/abc123".into(),
                category: "Programming".into(),
                tags: vec![],
                date: None,
            })
            .unwrap();

        assert!(matches!(
            svc.remove_category("Programming"),
            Err(CatalogError::CategoryInUse(_))
        ));

        svc.delete_video(&video.id).unwrap();
        svc.remove_category("Programming").unwrap();
        assert!(svc.list_categories().unwrap().is_empty());
    }

    #[test]
    fn test_remove_unknown_category() {
        let svc = test_service();
        assert!(matches!(
            svc.remove_category("Nope"),
            Err(CatalogError::NotFound(_))
        ));
    }
}
