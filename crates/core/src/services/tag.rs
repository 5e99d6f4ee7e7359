//! Tag service.

use foodgram_common::{AppError, AppResult};
use foodgram_db::repositories::TagRepository;

use super::projection::TagView;

/// Read access to recipe tags.
#[derive(Clone)]
pub struct TagService {
    tag_repo: TagRepository,
}

impl TagService {
    /// Create a new tag service.
    #[must_use]
    pub const fn new(tag_repo: TagRepository) -> Self {
        Self { tag_repo }
    }

    /// List all tags.
    pub async fn list(&self) -> AppResult<Vec<TagView>> {
        let tags = self.tag_repo.list().await?;
        Ok(tags.into_iter().map(TagView::from).collect())
    }

    /// Get a tag by ID.
    pub async fn get(&self, id: &str) -> AppResult<TagView> {
        self.tag_repo
            .find_by_id(id)
            .await?
            .map(TagView::from)
            .ok_or_else(|| AppError::NotFound(format!("Tag {id}")))
    }
}
