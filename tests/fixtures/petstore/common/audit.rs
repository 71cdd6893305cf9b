use serde::{Deserialize, Serialize};

/// Bookkeeping fields shared by stored records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Audit {
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "updatedBy", skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}
