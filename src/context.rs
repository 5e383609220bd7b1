use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::composer::TaskComposer;
use crate::services::{BucketResolver, TaskTrackerService};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub composer: Arc<TaskComposer>,
    pub task_tracker: Arc<dyn TaskTrackerService>,
    pub bucket_resolver: Arc<dyn BucketResolver>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        composer: TaskComposer,
        task_tracker: Arc<dyn TaskTrackerService>,
        bucket_resolver: Arc<dyn BucketResolver>,
    ) -> Self {
        Self {
            config,
            composer: Arc::new(composer),
            task_tracker,
            bucket_resolver,
        }
    }
}
