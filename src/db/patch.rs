use glsync_schema::Visibility;
use serde::{Deserialize, Serialize};

/// Partial update for a stored project. `None` fields keep their current
/// value (COALESCE in the UPDATE statement).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub visibility: Option<Visibility>,
    pub archived: Option<bool>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.visibility.is_none()
            && self.archived.is_none()
    }
}
