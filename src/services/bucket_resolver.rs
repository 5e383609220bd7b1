use async_trait::async_trait;

use crate::domain::task::Section;
use crate::error::AppResult;

#[async_trait]
pub trait BucketResolver: Send + Sync {
    /// Maps a bucket ref from the category table to a section id, if one exists.
    async fn resolve_bucket(&self, project_id: &str, bucket: &str) -> AppResult<Option<String>>;
}

#[async_trait]
pub trait SectionDirectory: Send + Sync {
    async fn list_sections(&self, project_id: &str) -> AppResult<Vec<Section>>;
}
