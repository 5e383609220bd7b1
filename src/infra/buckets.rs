use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{OnceCell, RwLock};

use crate::error::{AppError, AppResult};
use crate::services::{BucketResolver, SectionDirectory};

/// Bucket refs in the category table are section ids already.
pub struct StaticBucketResolver;

#[async_trait]
impl BucketResolver for StaticBucketResolver {
    async fn resolve_bucket(&self, _project_id: &str, bucket: &str) -> AppResult<Option<String>> {
        let id = bucket.trim();
        Ok((!id.is_empty()).then(|| id.to_string()))
    }
}

/// Resolves section names through the tracker, listing each project's sections once.
///
/// Concurrent first lookups for a project share one listing call.
pub struct CachedSectionResolver {
    directory: Arc<dyn SectionDirectory>,
    sections: RwLock<HashMap<String, Arc<SectionCell>>>,
}

type SectionCell = OnceCell<HashMap<String, String>>;

impl CachedSectionResolver {
    pub fn new(directory: Arc<dyn SectionDirectory>) -> Self {
        Self {
            directory,
            sections: RwLock::new(HashMap::new()),
        }
    }

    async fn project_cell(&self, project_id: &str) -> Arc<SectionCell> {
        if let Some(cell) = self.sections.read().await.get(project_id) {
            return cell.clone();
        }
        self.sections
            .write()
            .await
            .entry(project_id.to_string())
            .or_default()
            .clone()
    }
}

#[async_trait]
impl BucketResolver for CachedSectionResolver {
    async fn resolve_bucket(&self, project_id: &str, bucket: &str) -> AppResult<Option<String>> {
        let cell = self.project_cell(project_id).await;
        let by_name = cell
            .get_or_try_init(|| async {
                let listed = self.directory.list_sections(project_id).await?;
                tracing::debug!(project_id, sections = listed.len(), "cached project sections");
                Ok::<_, AppError>(
                    listed
                        .into_iter()
                        .map(|section| (section.name, section.id))
                        .collect(),
                )
            })
            .await?;
        Ok(by_name.get(bucket).cloned())
    }
}
