use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::config::AppConfig;
use crate::model::{
    Assignment, AssignmentId, Customer, CustomerId, LoginRequest, LoginResponse, Project,
    ProjectId, Resource, ResourceId, Task, TaskId, Timesheet, TimesheetId, TimesheetSummary,
};
use chrono::NaiveDate;

/// Failures the access layer reports to screens. Callers decide the
/// user-facing wording; `Status` keeps whatever message the backend sent.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("{message}")]
    Status { code: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// Thin wrapper over the REST backend. One independent request per call;
/// no retries, no caching. Cloneable into worker threads.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, String> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| format!("failed to build HTTP client: {}", e))?;
        Ok(ApiClient {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T, ApiError> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        decode_body(check_status(response)?)
    }

    fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<T, ApiError> {
        let mut request = self.http.post(self.url(path)).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        decode_body(check_status(response)?)
    }

    /// POST whose response body the caller does not care about.
    fn post_unit<B: Serialize>(&self, path: &str, token: &str, body: &B) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        check_status(response).map(|_| ())
    }

    fn put_unit<B: Serialize>(&self, path: &str, token: &str, body: &B) -> Result<(), ApiError> {
        let response = self
            .http
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        check_status(response).map(|_| ())
    }

    // Auth

    pub fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.post("auth/login", None, request)
    }

    // Resources

    pub fn resources(&self, token: &str) -> Result<Vec<Resource>, ApiError> {
        self.get("resource/all", token)
    }

    pub fn resource(&self, token: &str, id: ResourceId) -> Result<Resource, ApiError> {
        self.get(&format!("resource/{}", id), token)
    }

    pub fn create_resource(&self, token: &str, resource: &Resource) -> Result<(), ApiError> {
        self.post_unit("resource/add", token, resource)
    }

    pub fn update_resource(
        &self,
        token: &str,
        id: ResourceId,
        resource: &Resource,
    ) -> Result<(), ApiError> {
        self.put_unit(&format!("resource/update/{}", id), token, resource)
    }

    // Customers

    pub fn customers(&self, token: &str) -> Result<Vec<Customer>, ApiError> {
        self.get("customer/all", token)
    }

    pub fn active_customers(&self, token: &str) -> Result<Vec<Customer>, ApiError> {
        self.get("customer/active", token)
    }

    pub fn customer(&self, token: &str, id: CustomerId) -> Result<Customer, ApiError> {
        self.get(&format!("customer/{}", id), token)
    }

    pub fn create_customer(&self, token: &str, customer: &Customer) -> Result<(), ApiError> {
        self.post_unit("customer/add", token, customer)
    }

    pub fn update_customer(
        &self,
        token: &str,
        id: CustomerId,
        customer: &Customer,
    ) -> Result<(), ApiError> {
        self.put_unit(&format!("customer/update/{}", id), token, customer)
    }

    // Projects

    pub fn projects(&self, token: &str) -> Result<Vec<Project>, ApiError> {
        self.get("project/all", token)
    }

    pub fn projects_by_customer(
        &self,
        token: &str,
        customer_id: CustomerId,
    ) -> Result<Vec<Project>, ApiError> {
        self.get(&format!("project/customer/{}", customer_id), token)
    }

    pub fn project(&self, token: &str, id: ProjectId) -> Result<Project, ApiError> {
        self.get(&format!("project/{}", id), token)
    }

    pub fn create_project(
        &self,
        token: &str,
        customer_id: CustomerId,
        project: &Project,
    ) -> Result<(), ApiError> {
        self.post_unit(&format!("project/add/{}", customer_id), token, project)
    }

    /// Customer reassignment travels as a query parameter, per the backend
    /// contract.
    pub fn update_project(
        &self,
        token: &str,
        id: ProjectId,
        customer_id: CustomerId,
        project: &Project,
    ) -> Result<(), ApiError> {
        self.put_unit(
            &format!("project/modify/{}?customerId={}", id, customer_id),
            token,
            project,
        )
    }

    // Tasks

    pub fn tasks_by_project(
        &self,
        token: &str,
        project_id: ProjectId,
    ) -> Result<Vec<Task>, ApiError> {
        self.get(&format!("tasks/by-project/{}", project_id), token)
    }

    pub fn task(&self, token: &str, id: TaskId) -> Result<Task, ApiError> {
        self.get(&format!("tasks/{}", id), token)
    }

    pub fn create_task(&self, token: &str, task: &Task) -> Result<(), ApiError> {
        self.post_unit("tasks/create", token, task)
    }

    pub fn update_task(&self, token: &str, id: TaskId, task: &Task) -> Result<(), ApiError> {
        self.put_unit(&format!("tasks/update/{}", id), token, task)
    }

    // Assignments

    pub fn assignments_by_resource(
        &self,
        token: &str,
        resource_id: ResourceId,
    ) -> Result<Vec<Assignment>, ApiError> {
        self.get(&format!("assign-resource/resource/{}", resource_id), token)
    }

    pub fn assignments_by_project(
        &self,
        token: &str,
        project_id: ProjectId,
    ) -> Result<Vec<Assignment>, ApiError> {
        self.get(&format!("assign-resource/project/{}", project_id), token)
    }

    pub fn assignment(&self, token: &str, id: AssignmentId) -> Result<Assignment, ApiError> {
        self.get(&format!("assign-resource/{}", id), token)
    }

    pub fn create_assignment(&self, token: &str, assignment: &Assignment) -> Result<(), ApiError> {
        self.post_unit("assign-resource/add", token, assignment)
    }

    pub fn update_assignment(
        &self,
        token: &str,
        id: AssignmentId,
        assignment: &Assignment,
    ) -> Result<(), ApiError> {
        self.put_unit(&format!("assign-resource/update/{}", id), token, assignment)
    }

    // Timesheets

    pub fn timesheets_by_resource(
        &self,
        token: &str,
        resource_id: ResourceId,
    ) -> Result<Vec<TimesheetSummary>, ApiError> {
        self.get(&format!("timesheets/by-resource/{}", resource_id), token)
    }

    pub fn timesheet(&self, token: &str, id: TimesheetId) -> Result<Timesheet, ApiError> {
        self.get(&format!("timesheets/{}", id), token)
    }

    /// Existence check backing the duplicate-week guard.
    pub fn timesheet_exists(
        &self,
        token: &str,
        resource_id: ResourceId,
        week_start: NaiveDate,
        week_end: NaiveDate,
    ) -> Result<bool, ApiError> {
        self.get(
            &format!(
                "timesheets/exists?resourceId={}&weekStartDate={}&weekEndDate={}",
                resource_id, week_start, week_end
            ),
            token,
        )
    }

    pub fn submit_timesheet(&self, token: &str, timesheet: &Timesheet) -> Result<(), ApiError> {
        self.post_unit("timesheets", token, timesheet)
    }
}

fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(ApiError::Status {
        code: status.as_u16(),
        message: extract_error_message(status.as_u16(), &body),
    })
}

fn decode_body<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response.json().map_err(|e| ApiError::Decode(e.to_string()))
}

/// Best-effort extraction of the backend's error wording: a `message` field
/// in a JSON error body, then the raw body, then the bare status code.
fn extract_error_message(code: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            if !message.is_empty() {
                return message.to_string();
            }
        }
        if let Some(message) = value.get("error").and_then(|m| m.as_str()) {
            if !message.is_empty() {
                return message.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    format!("request failed with status {}", code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new(&AppConfig::default()).unwrap()
    }

    #[test]
    fn urls_join_without_double_slashes() {
        let client = client();
        assert_eq!(
            client.url("/resource/all"),
            "http://localhost:8080/api/resource/all"
        );
        assert_eq!(
            client.url("auth/login"),
            "http://localhost:8080/api/auth/login"
        );
    }

    #[test]
    fn exists_query_carries_week_bounds() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 9).unwrap();
        let path = format!(
            "timesheets/exists?resourceId={}&weekStartDate={}&weekEndDate={}",
            7, start, end
        );
        assert_eq!(
            path,
            "timesheets/exists?resourceId=7&weekStartDate=2024-06-03&weekEndDate=2024-06-09"
        );
    }

    #[test]
    fn server_message_is_preferred_over_raw_body() {
        assert_eq!(
            extract_error_message(409, r#"{"message":"Timesheet already exists"}"#),
            "Timesheet already exists"
        );
        assert_eq!(
            extract_error_message(500, r#"{"error":"boom"}"#),
            "boom"
        );
        assert_eq!(extract_error_message(400, "plain failure"), "plain failure");
        assert_eq!(
            extract_error_message(502, ""),
            "request failed with status 502"
        );
    }
}
