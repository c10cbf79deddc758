use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type ResourceId = i64;
pub type CustomerId = i64;
pub type ProjectId = i64;
pub type TaskId = i64;
pub type AssignmentId = i64;
pub type TimesheetId = i64;

/// Timesheet status ids as the backend reports them.
pub const STATUS_NEW: i64 = 1;
pub const STATUS_SUBMITTED: i64 = 2;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email_id: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub resource_id: ResourceId,
    pub email_id: String,
    pub first_name: String,
    pub last_name: String,
    pub role: i64,
    pub role_name: String,
    pub expires_in: i64,
}

/// An employee account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<ResourceId>,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone_number: String,
    pub email_id: String,
    /// Only sent on create; the backend never returns it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zipcode: String,
    #[serde(default)]
    pub country: String,
    pub role: i64,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<ResourceId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    pub customer_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zipcode: String,
    #[serde(default)]
    pub country: String,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<ResourceId>,
}

/// A project, owned by a customer. The customer reference is embedded in
/// responses; on writes the customer travels in the URL instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    pub project_name: String,
    #[serde(default)]
    pub project_description: String,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<ResourceId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    pub task_name: String,
    pub active: bool,
    pub project_id: ProjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<ResourceId>,
}

/// A resource-to-project assignment with its validity window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AssignmentId>,
    pub resource_id: ResourceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    pub project_id: ProjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<ResourceId>,
}

/// One row of the "manage timesheets" listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetSummary {
    pub timesheet_id: TimesheetId,
    #[serde(default)]
    pub resource_name: String,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    #[serde(default)]
    pub total_hours: f64,
    #[serde(default)]
    pub status_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetHour {
    pub week_date: NaiveDate,
    pub working_hours_billable: f64,
    pub working_hours_not_billable: f64,
    #[serde(default)]
    pub notes: String,
}

/// One (project, task) pairing inside a timesheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetLine {
    pub project_id: ProjectId,
    pub task_id: TaskId,
    pub hours: Vec<TimesheetHour>,
}

/// A full week-bounded timesheet, both as fetched and as submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timesheet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timesheet_id: Option<TimesheetId>,
    pub resource_id: ResourceId,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub status_id: i64,
    pub lines: Vec<TimesheetLine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timesheet_hour_uses_working_hours_wire_names() {
        let hour = TimesheetHour {
            week_date: NaiveDate::from_ymd_opt(2024, 6, 4).unwrap(),
            working_hours_billable: 4.0,
            working_hours_not_billable: 0.0,
            notes: "design".to_string(),
        };
        let json = serde_json::to_value(&hour).unwrap();
        assert_eq!(json["weekDate"], "2024-06-04");
        assert_eq!(json["workingHoursBillable"], 4.0);
        assert_eq!(json["workingHoursNotBillable"], 0.0);
        assert_eq!(json["notes"], "design");
    }

    #[test]
    fn fresh_timesheet_omits_its_id() {
        let sheet = Timesheet {
            timesheet_id: None,
            resource_id: 7,
            week_start_date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            week_end_date: NaiveDate::from_ymd_opt(2024, 6, 9).unwrap(),
            status_id: STATUS_NEW,
            lines: Vec::new(),
        };
        let json = serde_json::to_value(&sheet).unwrap();
        assert!(json.get("timesheetId").is_none());
        assert_eq!(json["weekStartDate"], "2024-06-03");
        assert_eq!(json["weekEndDate"], "2024-06-09");
    }

    #[test]
    fn project_deserializes_with_embedded_customer() {
        let json = r#"{
            "projectId": 3,
            "projectName": "Billing revamp",
            "projectDescription": "",
            "active": true,
            "customer": {
                "customerId": 9,
                "customerName": "Acme",
                "active": true
            }
        }"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.project_id, Some(3));
        let customer = project.customer.unwrap();
        assert_eq!(customer.customer_id, Some(9));
        assert_eq!(customer.customer_name, "Acme");
    }
}
