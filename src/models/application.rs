use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// ==============================================================================
// Application Status
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "selected")]
    Selected,
    #[serde(rename = "rejected")]
    Rejected,
    #[serde(rename = "not selected")]
    NotSelected,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized value: {0}")]
pub struct UnknownValue(pub String);

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::InProgress => "in progress",
            ApplicationStatus::Selected => "selected",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::NotSelected => "not selected",
        }
    }

    /// Parse a status an employer may move an application into.
    /// `pending` is the initial state only and is not a valid target.
    pub fn parse_target(s: &str) -> Option<Self> {
        match s.parse::<Self>().ok()? {
            ApplicationStatus::Pending => None,
            status => Some(status),
        }
    }

    /// Statuses that trigger a status-change email to the applicant.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Selected | ApplicationStatus::Rejected | ApplicationStatus::NotSelected
        )
    }

    /// `rejected_at` value that keeps the status/timestamp invariant for this status.
    pub fn rejected_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            ApplicationStatus::Rejected => Some(now),
            _ => None,
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "in progress" => Ok(ApplicationStatus::InProgress),
            "selected" => Ok(ApplicationStatus::Selected),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "not selected" => Ok(ApplicationStatus::NotSelected),
            _ => Err(UnknownValue(s.to_string())),
        }
    }
}

impl TryFrom<String> for ApplicationStatus {
    type Error = UnknownValue;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ==============================================================================
// Submission snapshots
// ==============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub level: Option<String>,
    pub institution: Option<String>,
    pub university: Option<String>,
    pub branch: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub marks: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceDetail {
    pub company: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub title: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

// ==============================================================================
// Application
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub experience: i32,
    pub resume: String,
    pub education: Json<Vec<Education>>,
    pub experience_details: Json<Vec<ExperienceDetail>>,
    pub questions_and_answers: Json<Vec<QuestionAnswer>>,
    #[sqlx(try_from = "String")]
    pub status: ApplicationStatus,
    pub rejected_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to insert a fresh application in `pending` status.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub experience: i32,
    pub resume: String,
    pub education: Vec<Education>,
    pub experience_details: Vec<ExperienceDetail>,
    pub questions_and_answers: Vec<QuestionAnswer>,
}

/// A status write applied to one or many applications.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub status: ApplicationStatus,
    pub notes: Option<String>,
    pub rejected_at: Option<DateTime<Utc>>,
}

impl StatusChange {
    pub fn new(status: ApplicationStatus, notes: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            status,
            notes,
            rejected_at: status.rejected_at(now),
        }
    }
}

// ==============================================================================
// Requests / Responses
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateApplicationRequest {
    pub job_id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub experience: i32,
    pub resume_path: Option<String>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub experience_details: Vec<ExperienceDetail>,
    #[serde(default)]
    pub questions_and_answers: Vec<QuestionAnswer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkUpdateStatusRequest {
    #[serde(default)]
    pub ids: Vec<String>,
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkStatusSummary {
    pub matched_count: usize,
    pub modified_count: usize,
}

#[derive(Debug, Serialize)]
pub struct AppliedJobsResponse {
    pub applied_jobs: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_rejects_pending_and_unknown() {
        assert_eq!(ApplicationStatus::parse_target("pending"), None);
        assert_eq!(ApplicationStatus::parse_target("accepted"), None);
        assert_eq!(ApplicationStatus::parse_target("Rejected"), None);
        assert_eq!(
            ApplicationStatus::parse_target("not selected"),
            Some(ApplicationStatus::NotSelected)
        );
        assert_eq!(
            ApplicationStatus::parse_target("in progress"),
            Some(ApplicationStatus::InProgress)
        );
    }

    #[test]
    fn test_rejected_at_only_for_rejected() {
        let now = Utc::now();
        assert_eq!(ApplicationStatus::Rejected.rejected_at(now), Some(now));
        assert_eq!(ApplicationStatus::Selected.rejected_at(now), None);
        assert_eq!(ApplicationStatus::InProgress.rejected_at(now), None);
        assert_eq!(ApplicationStatus::NotSelected.rejected_at(now), None);
    }

    #[test]
    fn test_status_serializes_with_spaces() {
        let json = serde_json::to_string(&ApplicationStatus::NotSelected).unwrap();
        assert_eq!(json, "\"not selected\"");
        let back: ApplicationStatus = serde_json::from_str("\"in progress\"").unwrap();
        assert_eq!(back, ApplicationStatus::InProgress);
    }

    #[test]
    fn test_status_parses_from_stored_text() {
        assert_eq!("not selected".parse::<ApplicationStatus>(), Ok(ApplicationStatus::NotSelected));
        assert_eq!("pending".parse::<ApplicationStatus>(), Ok(ApplicationStatus::Pending));
        assert_eq!(
            "hired".parse::<ApplicationStatus>(),
            Err(UnknownValue("hired".to_string()))
        );
        assert_eq!(
            ApplicationStatus::try_from("rejected".to_string()),
            Ok(ApplicationStatus::Rejected)
        );
    }

    #[test]
    fn test_in_progress_is_not_terminal() {
        assert!(!ApplicationStatus::InProgress.is_terminal());
        assert!(ApplicationStatus::Selected.is_terminal());
        assert!(ApplicationStatus::Rejected.is_terminal());
        assert!(ApplicationStatus::NotSelected.is_terminal());
    }
}
