use crate::context::AppContext;
use crate::domain::submission::RawSubmission;
use crate::domain::task::{CreatedTask, TaskCommand};
use crate::error::{AppError, AppResult};

pub struct RelayOutcome {
    pub command: TaskCommand,
    pub section_id: Option<String>,
    pub task: CreatedTask,
}

pub async fn relay_submission(ctx: &AppContext, raw: RawSubmission) -> AppResult<RelayOutcome> {
    let command = ctx.composer.compose_raw(raw);
    let mut section_id = resolve_section(ctx, &command).await;

    let first_attempt = ctx
        .task_tracker
        .create_task(&command, section_id.as_deref())
        .await;
    let task = match first_attempt {
        // The tracker answers 400 for a section id it does not know.
        Err(AppError::TrackerRejected { status: 400, body }) if section_id.is_some() => {
            tracing::warn!(
                section = section_id.as_deref().unwrap_or_default(),
                response = %body,
                "tracker rejected section, retrying in default section"
            );
            section_id = None;
            ctx.task_tracker.create_task(&command, None).await?
        }
        result => result?,
    };

    tracing::info!(
        task_id = %task.id,
        title = %command.title,
        section = section_id.as_deref().unwrap_or("<default>"),
        "created task"
    );

    Ok(RelayOutcome {
        command,
        section_id,
        task,
    })
}

/// A missing section never blocks task creation; the tracker falls back to its default.
async fn resolve_section(ctx: &AppContext, command: &TaskCommand) -> Option<String> {
    let Some(bucket) = command.destination_bucket_id.as_deref() else {
        tracing::warn!(title = %command.title, "no bucket mapped for category, using default section");
        return None;
    };

    match ctx
        .bucket_resolver
        .resolve_bucket(&command.destination_project_id, bucket)
        .await
    {
        Ok(Some(id)) => Some(id),
        Ok(None) => {
            tracing::warn!(bucket, "bucket not found in project, using default section");
            None
        }
        Err(err) => {
            tracing::warn!(bucket, error = %err, "bucket lookup failed, using default section");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::config::{AppConfig, StoredConfig};
    use crate::domain::category::CategoryMapping;
    use crate::domain::composer::TaskComposer;
    use crate::domain::priority::PriorityMapping;
    use crate::infra::buckets::StaticBucketResolver;
    use crate::services::{BucketResolver, TaskTrackerService};

    #[derive(Default)]
    struct RecordingTracker {
        calls: Mutex<Vec<(TaskCommand, Option<String>)>>,
        reject_sections: Option<u16>,
    }

    #[async_trait]
    impl TaskTrackerService for RecordingTracker {
        async fn create_task(
            &self,
            command: &TaskCommand,
            section_id: Option<&str>,
        ) -> AppResult<CreatedTask> {
            self.calls
                .lock()
                .unwrap()
                .push((command.clone(), section_id.map(str::to_string)));
            if let (Some(status), Some(_)) = (self.reject_sections, section_id) {
                return Err(AppError::TrackerRejected {
                    status,
                    body: "section: Not a recognized ID".to_string(),
                });
            }
            Ok(CreatedTask {
                id: "42".to_string(),
                url: None,
            })
        }
    }

    struct BrokenResolver;

    #[async_trait]
    impl BucketResolver for BrokenResolver {
        async fn resolve_bucket(&self, _: &str, _: &str) -> AppResult<Option<String>> {
            Err(AppError::TrackerTransport("timed out".to_string()))
        }
    }

    fn context(
        tracker: Arc<RecordingTracker>,
        resolver: Arc<dyn BucketResolver>,
    ) -> AppContext {
        let config = AppConfig::resolve(StoredConfig::default(), |_| None).unwrap();
        let composer = TaskComposer::new(
            CategoryMapping::builtin(),
            PriorityMapping::builtin(),
            "1200",
        );
        AppContext::new(config, composer, tracker, resolver)
    }

    fn feature_request() -> RawSubmission {
        RawSubmission {
            first_name: Some("Sarah".to_string()),
            last_name: Some("Johnson".to_string()),
            request_type: Some("Feature Requests".to_string()),
            priority: Some("High".to_string()),
            ..RawSubmission::default()
        }
    }

    #[tokio::test]
    async fn creates_task_in_resolved_section() {
        let tracker = Arc::new(RecordingTracker::default());
        let ctx = context(tracker.clone(), Arc::new(StaticBucketResolver));

        let outcome = relay_submission(&ctx, feature_request()).await.unwrap();

        assert_eq!(outcome.task.id, "42");
        assert_eq!(outcome.section_id.as_deref(), Some("Feature Requests"));
        let calls = tracker.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0.title, "✨ [Feature Requests] Sarah Johnson");
    }

    #[tokio::test]
    async fn unmapped_category_goes_to_default_section() {
        let tracker = Arc::new(RecordingTracker::default());
        let ctx = context(tracker.clone(), Arc::new(StaticBucketResolver));
        let raw = RawSubmission {
            request_type: Some("Billing".to_string()),
            ..feature_request()
        };

        let outcome = relay_submission(&ctx, raw).await.unwrap();

        assert_eq!(outcome.section_id, None);
        assert_eq!(tracker.calls.lock().unwrap()[0].1, None);
    }

    #[tokio::test]
    async fn resolver_failure_still_creates_task() {
        let tracker = Arc::new(RecordingTracker::default());
        let ctx = context(tracker.clone(), Arc::new(BrokenResolver));

        let outcome = relay_submission(&ctx, feature_request()).await.unwrap();

        assert_eq!(outcome.section_id, None);
        assert_eq!(tracker.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_section_id_falls_back_to_default_section() {
        let tracker = Arc::new(RecordingTracker {
            reject_sections: Some(400),
            ..RecordingTracker::default()
        });
        let ctx = context(tracker.clone(), Arc::new(StaticBucketResolver));

        let outcome = relay_submission(&ctx, feature_request()).await.unwrap();

        assert_eq!(outcome.section_id, None);
        let calls = tracker.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1.as_deref(), Some("Feature Requests"));
        assert_eq!(calls[1].1, None);
    }

    #[tokio::test]
    async fn other_rejections_are_not_retried() {
        let tracker = Arc::new(RecordingTracker {
            reject_sections: Some(403),
            ..RecordingTracker::default()
        });
        let ctx = context(tracker.clone(), Arc::new(StaticBucketResolver));

        let err = relay_submission(&ctx, feature_request())
            .await
            .err()
            .unwrap();

        assert!(matches!(err, AppError::TrackerRejected { status: 403, .. }));
        assert_eq!(tracker.calls.lock().unwrap().len(), 1);
    }
}
