use serde::{Deserialize, Serialize};

use super::UserContext;
use super::datasources::DataSourceConfig;

/// Breadth of data a data access node may read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Platform-wide, unfiltered. Only ever assigned by administrators when
    /// authoring a chatbot; no request input is parsed into this value.
    All,
    TeamSpecific,
    UserSpecific,
}

impl Scope {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Scope::All),
            "team_specific" => Some(Scope::TeamSpecific),
            "user_specific" => Some(Scope::UserSpecific),
            _ => None,
        }
    }
}

/// How a query against a data source must be constrained for a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    /// Full-table read (platform-wide scope only).
    Unfiltered,
    ByColumn {
        column: &'static str,
        value: String,
    },
    /// No query at all. A scoped node with no matching identity yields no
    /// data — never an unfiltered read.
    Deny,
}

/// Decide how to constrain a read for `(scope, caller)`, in this order:
/// team column match, user column match, team scope falling back to the user
/// column when the source has no team column (inherently per-user sources),
/// platform-wide, deny.
pub fn resolve_filter(
    config: &DataSourceConfig,
    scope: Scope,
    context: &UserContext,
) -> FilterDecision {
    match scope {
        Scope::TeamSpecific => {
            if let (Some(column), Some(team_id)) = (config.team_column, context.team_id.as_deref())
            {
                return FilterDecision::ByColumn {
                    column,
                    value: team_id.to_string(),
                };
            }
            if config.team_column.is_none()
                && let (Some(column), Some(user_id)) =
                    (config.user_column, context.user_id.as_deref())
            {
                return FilterDecision::ByColumn {
                    column,
                    value: user_id.to_string(),
                };
            }
            FilterDecision::Deny
        }
        Scope::UserSpecific => {
            if let (Some(column), Some(user_id)) = (config.user_column, context.user_id.as_deref())
            {
                return FilterDecision::ByColumn {
                    column,
                    value: user_id.to_string(),
                };
            }
            FilterDecision::Deny
        }
        Scope::All => FilterDecision::Unfiltered,
    }
}

/// Fixed sentence fragment describing the scope inside the data access
/// instruction text.
pub fn scope_sentence(scope: Scope) -> &'static str {
    match scope {
        Scope::All => "across all accounts (platform-wide)",
        Scope::TeamSpecific => "scoped to the user's team/business only",
        Scope::UserSpecific => "scoped to the current user only",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::datasources::data_source_config;

    fn ctx(user_id: Option<&str>, team_id: Option<&str>) -> UserContext {
        UserContext::new(user_id.map(String::from), team_id.map(String::from))
    }

    #[test]
    fn team_scope_filters_by_team_column() {
        let tasks = data_source_config("tasks").unwrap();
        let decision = resolve_filter(tasks, Scope::TeamSpecific, &ctx(Some("u1"), Some("t1")));
        assert_eq!(
            decision,
            FilterDecision::ByColumn {
                column: "team_id",
                value: "t1".into()
            }
        );
    }

    #[test]
    fn user_scope_filters_by_user_column() {
        let tasks = data_source_config("tasks").unwrap();
        let decision = resolve_filter(tasks, Scope::UserSpecific, &ctx(Some("u1"), Some("t1")));
        assert_eq!(
            decision,
            FilterDecision::ByColumn {
                column: "assigned_to",
                value: "u1".into()
            }
        );
    }

    #[test]
    fn team_scope_without_team_column_falls_back_to_user() {
        // playbooks is inherently per-user: no team column
        let playbooks = data_source_config("playbooks").unwrap();
        let decision = resolve_filter(playbooks, Scope::TeamSpecific, &ctx(Some("u1"), Some("t1")));
        assert_eq!(
            decision,
            FilterDecision::ByColumn {
                column: "user_id",
                value: "u1".into()
            }
        );
    }

    #[test]
    fn user_scope_without_user_id_denies() {
        let tasks = data_source_config("tasks").unwrap();
        assert_eq!(
            resolve_filter(tasks, Scope::UserSpecific, &ctx(None, Some("t1"))),
            FilterDecision::Deny
        );
    }

    #[test]
    fn team_scope_without_any_identity_denies() {
        let tasks = data_source_config("tasks").unwrap();
        assert_eq!(
            resolve_filter(tasks, Scope::TeamSpecific, &UserContext::empty()),
            FilterDecision::Deny
        );
    }

    #[test]
    fn team_scope_with_team_column_but_no_team_id_denies() {
        // Sources with a team column never fall back to the user column
        // under team scope: a user id must not stand in for a team.
        let tasks = data_source_config("tasks").unwrap();
        assert_eq!(
            resolve_filter(tasks, Scope::TeamSpecific, &ctx(Some("u1"), None)),
            FilterDecision::Deny
        );
    }

    #[test]
    fn user_scope_on_unowned_source_denies() {
        let services = data_source_config("global_services").unwrap();
        assert_eq!(
            resolve_filter(services, Scope::UserSpecific, &ctx(Some("u1"), Some("t1"))),
            FilterDecision::Deny
        );
    }

    #[test]
    fn all_scope_is_unfiltered_even_without_identity() {
        let services = data_source_config("global_services").unwrap();
        assert_eq!(
            resolve_filter(services, Scope::All, &UserContext::empty()),
            FilterDecision::Unfiltered
        );
    }

    #[test]
    fn parses_known_scopes_only() {
        assert_eq!(Scope::parse("all"), Some(Scope::All));
        assert_eq!(Scope::parse("team_specific"), Some(Scope::TeamSpecific));
        assert_eq!(Scope::parse("user_specific"), Some(Scope::UserSpecific));
        assert_eq!(Scope::parse("everything"), None);
    }

    #[test]
    fn sentences_are_fixed() {
        assert_eq!(scope_sentence(Scope::All), "across all accounts (platform-wide)");
        assert_eq!(
            scope_sentence(Scope::TeamSpecific),
            "scoped to the user's team/business only"
        );
        assert_eq!(
            scope_sentence(Scope::UserSpecific),
            "scoped to the current user only"
        );
    }
}
