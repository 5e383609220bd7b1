use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{
    Client, Response,
    header::{ACCEPT, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::domain::task::{CreatedTask, Section, TaskCommand};
use crate::error::{AppError, AppResult};
use crate::services::{SectionDirectory, TaskTrackerService};

pub struct AsanaClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    priority_field_id: Option<String>,
}

impl AsanaClient {
    pub fn new(base_url: String, token: Option<String>, priority_field_id: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            token,
            priority_field_id,
        }
    }

    fn token(&self) -> AppResult<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| AppError::Configuration("tracker token not configured".to_string()))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn read_data<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::TrackerRejected {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|err| {
            AppError::TrackerTransport(format!("failed to read tracker response: {err}"))
        })?;
        let envelope: DataEnvelope<T> = serde_json::from_slice(&bytes)
            .map_err(|err| AppError::TrackerResponse(err.to_string()))?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl TaskTrackerService for AsanaClient {
    async fn create_task(
        &self,
        command: &TaskCommand,
        section_id: Option<&str>,
    ) -> AppResult<CreatedTask> {
        let token = self.token()?;
        let request_body =
            CreateTaskRequest::new(command, section_id, self.priority_field_id.as_deref());

        let response = self
            .http
            .post(self.endpoint("tasks"))
            .query(&[("opt_fields", "gid,permalink_url")])
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|err| AppError::TrackerTransport(format!("failed to call tracker: {err}")))?;

        let task: TaskResponse = Self::read_data(response).await?;
        Ok(CreatedTask {
            id: task.gid,
            url: task.permalink_url,
        })
    }
}

#[async_trait]
impl SectionDirectory for AsanaClient {
    async fn list_sections(&self, project_id: &str) -> AppResult<Vec<Section>> {
        let token = self.token()?;
        let response = self
            .http
            .get(self.endpoint(&format!("projects/{}/sections", project_id.trim())))
            .query(&[("opt_fields", "name")])
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| {
                AppError::TrackerTransport(format!("failed to list sections: {err}"))
            })?;

        let sections: Vec<SectionResponse> = Self::read_data(response).await?;
        Ok(sections
            .into_iter()
            .map(|section| Section {
                id: section.gid,
                name: section.name,
            })
            .collect())
    }
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct TaskResponse {
    gid: String,
    #[serde(default)]
    permalink_url: Option<String>,
}

#[derive(Deserialize)]
struct SectionResponse {
    gid: String,
    name: String,
}

#[derive(Serialize)]
struct CreateTaskRequest {
    data: CreateTaskFields,
}

#[derive(Serialize)]
struct CreateTaskFields {
    name: String,
    notes: String,
    projects: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    memberships: Vec<Membership>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    custom_fields: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct Membership {
    project: String,
    section: String,
}

impl CreateTaskRequest {
    fn new(command: &TaskCommand, section_id: Option<&str>, priority_field: Option<&str>) -> Self {
        let project = command.destination_project_id.clone();
        let memberships = section_id
            .map(|section| Membership {
                project: project.clone(),
                section: section.to_string(),
            })
            .into_iter()
            .collect();
        let custom_fields = priority_field
            .map(|field| (field.to_string(), command.priority_value.as_str().to_string()))
            .into_iter()
            .collect();

        Self {
            data: CreateTaskFields {
                name: command.title.clone(),
                notes: command.body.clone(),
                projects: vec![project],
                memberships,
                custom_fields,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::priority::PriorityValue;

    fn command() -> TaskCommand {
        TaskCommand {
            title: "🐛 [Bug Reports] Sam Lee".to_string(),
            body: "Email: sam@example.com".to_string(),
            destination_project_id: "1200".to_string(),
            destination_bucket_id: Some("Bug Reports".to_string()),
            priority_value: PriorityValue("high".to_string()),
        }
    }

    #[test]
    fn request_places_task_in_resolved_section() {
        let body = serde_json::to_value(CreateTaskRequest::new(&command(), Some("1201"), None))
            .unwrap();
        assert_eq!(body["data"]["name"], "🐛 [Bug Reports] Sam Lee");
        assert_eq!(body["data"]["projects"][0], "1200");
        assert_eq!(body["data"]["memberships"][0]["project"], "1200");
        assert_eq!(body["data"]["memberships"][0]["section"], "1201");
        assert!(body["data"].get("custom_fields").is_none());
    }

    #[test]
    fn request_without_section_omits_memberships() {
        let body =
            serde_json::to_value(CreateTaskRequest::new(&command(), None, Some("9000"))).unwrap();
        assert!(body["data"].get("memberships").is_none());
        assert_eq!(body["data"]["custom_fields"]["9000"], "high");
    }

    #[test]
    fn parses_task_envelope() {
        let envelope: DataEnvelope<TaskResponse> = serde_json::from_str(
            r#"{"data":{"gid":"42","permalink_url":"https://app.asana.com/0/1200/42"}}"#,
        )
        .unwrap();
        assert_eq!(envelope.data.gid, "42");
        assert_eq!(
            envelope.data.permalink_url.as_deref(),
            Some("https://app.asana.com/0/1200/42")
        );
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let client = AsanaClient::new("https://tracker.test/api/1.0/".to_string(), None, None);
        assert_eq!(client.endpoint("tasks"), "https://tracker.test/api/1.0/tasks");
    }

    fn reply(status: u16, body: &'static str) -> Response {
        Response::from(
            axum::http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn client_error_reply_is_a_rejection() {
        let err = AsanaClient::read_data::<TaskResponse>(reply(400, "bad"))
            .await
            .unwrap_err();
        match err {
            AppError::TrackerRejected { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "bad");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_reply_is_a_retryable_rejection() {
        let err = AsanaClient::read_data::<TaskResponse>(reply(503, "maintenance"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::TrackerRejected { status: 503, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn success_reply_yields_sections() {
        let sections: Vec<SectionResponse> = AsanaClient::read_data(reply(
            200,
            r#"{"data":[{"gid":"1201","name":"Bug Reports"},{"gid":"1202","name":"Feature Requests"}]}"#,
        ))
        .await
        .unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].gid, "1202");
        assert_eq!(sections[1].name, "Feature Requests");
    }

    #[tokio::test]
    async fn garbled_success_reply_is_not_retryable() {
        let err = AsanaClient::read_data::<TaskResponse>(reply(201, "<html>oops</html>"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::TrackerResponse(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn missing_token_is_a_configuration_error() {
        let client = AsanaClient::new("https://tracker.test".to_string(), None, None);
        let err = client.create_task(&command(), None).await.unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }
}
