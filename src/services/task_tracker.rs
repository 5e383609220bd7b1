use async_trait::async_trait;

use crate::domain::task::{CreatedTask, TaskCommand};
use crate::error::AppResult;

#[async_trait]
pub trait TaskTrackerService: Send + Sync {
    /// `section_id` is the resolved bucket; `None` leaves placement to the tracker.
    async fn create_task(
        &self,
        command: &TaskCommand,
        section_id: Option<&str>,
    ) -> AppResult<CreatedTask>;
}
