//! Wire types for the GitLab projects API.
//!
//! These mirror the subset of the upstream JSON we care about; unknown
//! fields are ignored on deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// GitLab project visibility level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Internal,
    Public,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Internal => "internal",
            Visibility::Public => "public",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Visibility::Private),
            "internal" => Ok(Visibility::Internal),
            "public" => Ok(Visibility::Public),
            other => Err(format!(
                "unknown visibility '{other}' (expected private, internal or public)"
            )),
        }
    }
}

impl TryFrom<String> for Visibility {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// One project as returned by `GET /projects` and `GET /projects/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteProject {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub path_with_namespace: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_activity_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub namespace: Option<RemoteNamespace>,
}

/// The organizational grouping a project belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteNamespace {
    pub id: i64,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub full_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn remote_project_ignores_unknown_fields() {
        let value = json!({
            "id": 42,
            "name": "demo",
            "visibility": "public",
            "star_count": 7,
            "forks_count": 3,
            "namespace": {
                "id": 9,
                "name": "group",
                "path": "group",
                "kind": "group",
                "full_path": "group",
                "avatar_url": null
            }
        });

        let project: RemoteProject = serde_json::from_value(value).expect("should decode");
        assert_eq!(project.id, 42);
        assert_eq!(project.name, "demo");
        assert_eq!(project.visibility, Visibility::Public);
        assert!(!project.archived);
        assert_eq!(project.namespace.as_ref().map(|n| n.id), Some(9));
    }

    #[test]
    fn missing_visibility_defaults_to_private() {
        let project: RemoteProject =
            serde_json::from_value(json!({"id": 1, "name": "bare"})).expect("should decode");
        assert_eq!(project.visibility, Visibility::Private);
    }

    #[test]
    fn visibility_round_trips_through_str() {
        for v in [Visibility::Private, Visibility::Internal, Visibility::Public] {
            assert_eq!(v.as_str().parse::<Visibility>(), Ok(v));
        }
        assert!("secret".parse::<Visibility>().is_err());
    }
}
