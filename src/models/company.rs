use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Employer-owned organisation that posts jobs.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: Uuid,
    pub company_name: String,
    pub company_type: Option<String>,
    pub location: Option<String>,
    pub company_logo: Option<String>,
    pub site_url: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCompany {
    pub company_name: String,
    pub company_type: Option<String>,
    pub location: Option<String>,
    pub company_logo: Option<String>,
    pub site_url: Option<String>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCompany {
    pub company_name: Option<String>,
    pub company_type: Option<String>,
    pub location: Option<String>,
    pub company_logo: Option<String>,
    pub site_url: Option<String>,
}
