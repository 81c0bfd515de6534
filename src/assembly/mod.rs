pub mod compose;
pub mod datasources;
pub mod fetch;
pub mod registry;
pub mod scope;

use serde::{Deserialize, Serialize};

/// Caller identity for a single assembly request. Either, both, or neither
/// field may be present; with neither, only platform-wide data access nodes
/// contribute data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: Option<String>,
    pub team_id: Option<String>,
}

impl UserContext {
    pub fn new(user_id: Option<String>, team_id: Option<String>) -> Self {
        Self { user_id, team_id }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_identity(&self) -> bool {
        self.user_id.is_some() || self.team_id.is_some()
    }
}
