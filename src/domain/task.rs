use serde::Serialize;

use crate::domain::priority::PriorityValue;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCommand {
    pub title: String,
    pub body: String,
    pub destination_project_id: String,
    /// `None` files the task under the project's default section.
    pub destination_bucket_id: Option<String>,
    pub priority_value: PriorityValue,
}

#[derive(Debug, Clone)]
pub struct CreatedTask {
    pub id: String,
    pub url: Option<String>,
}

/// A grouping inside a tracker project that tasks can be filed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: String,
    pub name: String,
}
