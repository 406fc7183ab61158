use serde::{Deserialize, Serialize};

/// Task model
///
/// A task may be nested under another task through `parent_id`. A task
/// without a name is "unnamed"; front ends prompt for one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Task {
    /// Create a new task. Empty names are stored as absent.
    pub fn new(id: i64, name: Option<String>, parent_id: Option<i64>) -> Self {
        Self {
            id,
            parent_id,
            name: name.filter(|n| !n.trim().is_empty()),
        }
    }

    pub fn is_unnamed(&self) -> bool {
        self.name.is_none()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Name for display, empty string when unnamed
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}
