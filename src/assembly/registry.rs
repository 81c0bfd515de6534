use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::scope::Scope;

/// The closed set of node kinds a chatbot can link. Adding a kind means
/// adding a registry entry, a settings variant, and a render arm — the
/// compiler walks you through the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    DataAccess,
    SubAgent,
    WebSearch,
    Attachments,
}

/// Registry entry for one node kind: display name plus default settings.
#[derive(Debug, Clone, Copy)]
pub struct NodeDefinition {
    pub key: &'static str,
    pub name: &'static str,
    pub kind: NodeKind,
}

impl NodeDefinition {
    pub fn default_settings(&self) -> Value {
        match self.kind {
            NodeKind::DataAccess => json!({ "data_source": "", "scope": "team_specific" }),
            NodeKind::SubAgent => json!({ "expertise_prompt": "" }),
            NodeKind::WebSearch | NodeKind::Attachments => json!({}),
        }
    }
}

const NODE_DEFINITIONS: &[NodeDefinition] = &[
    NodeDefinition {
        key: "data_access",
        name: "Data access",
        kind: NodeKind::DataAccess,
    },
    NodeDefinition {
        key: "sub_agent",
        name: "Sub-agent",
        kind: NodeKind::SubAgent,
    },
    NodeDefinition {
        key: "web_search",
        name: "Web search",
        kind: NodeKind::WebSearch,
    },
    NodeDefinition {
        key: "attachments",
        name: "Attachments",
        kind: NodeKind::Attachments,
    },
];

/// Look up a node kind by its link key. Callers must skip nodes whose key
/// is unknown; there is no other error path.
pub fn node_definition(key: &str) -> Option<&'static NodeDefinition> {
    NODE_DEFINITIONS.iter().find(|def| def.key == key)
}

/// Typed per-kind settings, produced from the registry defaults overlaid by
/// the link's overrides.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NodeSettings {
    DataAccess { data_source: String, scope: Scope },
    SubAgent { expertise_prompt: String },
    WebSearch {},
    Attachments {},
}

/// Shallow-merge the definition's default settings with a link's overrides,
/// then decode into the typed settings for the definition's kind. Fields the
/// override omits keep their defaults; a missing or unrecognized scope is
/// treated as team-scoped (never wider).
pub fn resolve_settings(def: &NodeDefinition, overrides: Option<&Value>) -> NodeSettings {
    let mut merged = def.default_settings();
    if let (Some(base), Some(Value::Object(extra))) = (merged.as_object_mut(), overrides) {
        for (key, value) in extra {
            base.insert(key.clone(), value.clone());
        }
    }

    match def.kind {
        NodeKind::DataAccess => {
            let data_source = merged["data_source"].as_str().unwrap_or("").to_string();
            let scope = merged["scope"]
                .as_str()
                .and_then(Scope::parse)
                .unwrap_or(Scope::TeamSpecific);
            NodeSettings::DataAccess { data_source, scope }
        }
        NodeKind::SubAgent => NodeSettings::SubAgent {
            expertise_prompt: merged["expertise_prompt"].as_str().unwrap_or("").to_string(),
        },
        NodeKind::WebSearch => NodeSettings::WebSearch {},
        NodeKind::Attachments => NodeSettings::Attachments {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_all_four_kinds() {
        assert_eq!(node_definition("data_access").unwrap().kind, NodeKind::DataAccess);
        assert_eq!(node_definition("sub_agent").unwrap().kind, NodeKind::SubAgent);
        assert_eq!(node_definition("web_search").unwrap().kind, NodeKind::WebSearch);
        assert_eq!(node_definition("attachments").unwrap().kind, NodeKind::Attachments);
    }

    #[test]
    fn unknown_key_is_none() {
        assert!(node_definition("vector_search").is_none());
    }

    #[test]
    fn kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&NodeKind::DataAccess).unwrap(),
            "\"data_access\""
        );
        assert_eq!(
            serde_json::to_string(&NodeKind::WebSearch).unwrap(),
            "\"web_search\""
        );
    }

    #[test]
    fn overrides_overlay_defaults() {
        let def = node_definition("data_access").unwrap();
        let settings = resolve_settings(
            def,
            Some(&json!({ "data_source": "tasks", "scope": "user_specific" })),
        );
        assert_eq!(
            settings,
            NodeSettings::DataAccess {
                data_source: "tasks".into(),
                scope: Scope::UserSpecific,
            }
        );
    }

    #[test]
    fn omitted_fields_keep_defaults() {
        let def = node_definition("data_access").unwrap();
        let settings = resolve_settings(def, Some(&json!({ "data_source": "playbooks" })));
        assert_eq!(
            settings,
            NodeSettings::DataAccess {
                data_source: "playbooks".into(),
                scope: Scope::TeamSpecific,
            }
        );
    }

    #[test]
    fn unrecognized_scope_narrows_to_team() {
        let def = node_definition("data_access").unwrap();
        let settings = resolve_settings(
            def,
            Some(&json!({ "data_source": "tasks", "scope": "everything" })),
        );
        assert_eq!(
            settings,
            NodeSettings::DataAccess {
                data_source: "tasks".into(),
                scope: Scope::TeamSpecific,
            }
        );
    }

    #[test]
    fn non_object_overrides_are_ignored() {
        let def = node_definition("sub_agent").unwrap();
        let settings = resolve_settings(def, Some(&json!("bogus")));
        assert_eq!(
            settings,
            NodeSettings::SubAgent {
                expertise_prompt: String::new(),
            }
        );
    }

    #[test]
    fn no_overrides_yields_defaults() {
        let def = node_definition("sub_agent").unwrap();
        let settings = resolve_settings(def, None);
        assert_eq!(
            settings,
            NodeSettings::SubAgent {
                expertise_prompt: String::new(),
            }
        );
    }

    #[test]
    fn capability_settings_serialize_as_empty_objects() {
        assert_eq!(
            serde_json::to_value(NodeSettings::WebSearch {}).unwrap(),
            json!({})
        );
    }
}
