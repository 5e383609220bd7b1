use crate::domain::category::CategoryMapping;
use crate::domain::priority::PriorityMapping;
use crate::domain::submission::{RawSubmission, Submission};
use crate::domain::task::TaskCommand;

/// Turns a submission into a task-creation command. Total and deterministic.
#[derive(Debug, Clone)]
pub struct TaskComposer {
    categories: CategoryMapping,
    priorities: PriorityMapping,
    project_id: String,
}

impl TaskComposer {
    pub fn new(
        categories: CategoryMapping,
        priorities: PriorityMapping,
        project_id: impl Into<String>,
    ) -> Self {
        Self {
            categories,
            priorities,
            project_id: project_id.into(),
        }
    }

    pub fn compose_raw(&self, raw: RawSubmission) -> TaskCommand {
        self.compose(&Submission::normalize(raw))
    }

    pub fn compose(&self, submission: &Submission) -> TaskCommand {
        let route = self.categories.lookup(&submission.category);

        let title = format!(
            "{} [{}] {}",
            route.marker,
            submission.category,
            submission.full_name()
        );

        TaskCommand {
            title,
            body: compose_body(submission),
            destination_project_id: self.project_id.clone(),
            destination_bucket_id: route.bucket.map(str::to_string),
            priority_value: self.priorities.resolve(&submission.priority).clone(),
        }
    }
}

fn compose_body(submission: &Submission) -> String {
    format!(
        "Email: {}\nRequest Type: {}\nPriority: {}\n\nDescription:\n{}",
        submission.email, submission.category, submission.priority, submission.description
    )
    .trim()
    .to_string()
}
