use chrono::{DateTime, Utc};
use glsync_schema::Visibility;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbProject {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub path_with_namespace: Option<String>,
    pub web_url: Option<String>,
    #[sqlx(try_from = "String")]
    pub visibility: Visibility,
    pub archived: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub last_activity_at: Option<DateTime<Utc>>,
    /// When this row was last written by a fetch or an explicit update.
    pub last_synced: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbNamespace {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub path: String,
    pub kind: Option<String>,
    pub full_path: Option<String>,
}
