//! Pane configuration.
//!
//! Every field has a default, so a JSON document only needs the fields it
//! changes:
//!
//! ```json
//! { "ghost": { "background": "#ccc" }, "hit_policy": "outermost" }
//! ```

use dp_core::traversal::{DEFAULT_CONTAINER_KINDS, DefaultTraversalHelper};
use serde::{Deserialize, Serialize};

/// Visual style of the drop placeholder, in host style-sheet terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GhostStyle {
    pub display: String,
    pub background: String,
    pub border: String,
}

impl Default for GhostStyle {
    fn default() -> Self {
        Self {
            display: "inline-block".to_string(),
            background: "gray".to_string(),
            border: "dashed 1px black".to_string(),
        }
    }
}

/// Which node a pointer-down focuses when several nested ones contain the
/// point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitPolicy {
    /// The deepest container, or the first leaf, under the pointer.
    #[default]
    Innermost,
    /// The top-most node under the pointer.
    Outermost,
}

/// Configuration for [`DesignPane`](crate::pane::DesignPane).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaneConfig {
    /// Style of the drop placeholder. Its size always follows the focused
    /// node.
    pub ghost: GhostStyle,

    /// Intrinsic element kinds the default traversal policy treats as
    /// containers. Default: **div, section, article**.
    pub container_kinds: Vec<String>,

    pub hit_policy: HitPolicy,
}

impl Default for PaneConfig {
    fn default() -> Self {
        Self {
            ghost: GhostStyle::default(),
            container_kinds: DEFAULT_CONTAINER_KINDS.iter().map(|k| k.to_string()).collect(),
            hit_policy: HitPolicy::default(),
        }
    }
}

impl PaneConfig {
    /// Parse a JSON configuration document.
    ///
    /// # Errors
    /// Returns a readable message for malformed JSON or unknown fields.
    pub fn from_json(text: &str) -> Result<Self, String> {
        serde_json::from_str(text).map_err(|e| format!("Config parse error: {e}"))
    }

    /// Traversal policy built from [`container_kinds`](Self::container_kinds).
    pub fn traversal_helper(&self) -> DefaultTraversalHelper {
        DefaultTraversalHelper::with_container_kinds(&self.container_kinds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dp_core::model::Node;
    use dp_core::traversal::TraversalHelper;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_is_the_default() {
        assert_eq!(PaneConfig::from_json("{}").unwrap(), PaneConfig::default());
    }

    #[test]
    fn partial_documents_keep_other_defaults() {
        let config = PaneConfig::from_json(
            r##"{ "ghost": { "background": "#ccc" }, "hit_policy": "outermost" }"##,
        )
        .unwrap();
        assert_eq!(config.ghost.background, "#ccc");
        assert_eq!(config.ghost.border, "dashed 1px black");
        assert_eq!(config.hit_policy, HitPolicy::Outermost);
        assert_eq!(config.container_kinds, ["div", "section", "article"]);
    }

    #[test]
    fn container_kinds_drive_the_traversal_policy() {
        let config = PaneConfig::from_json(r#"{ "container_kinds": ["ul", "li"] }"#).unwrap();
        let traversal = config.traversal_helper();
        assert!(traversal.is_container(&Node::element("ul")));
        assert!(!traversal.is_container(&Node::element("div")));
    }

    #[test]
    fn rejects_unknown_fields_and_bad_json() {
        let err = PaneConfig::from_json(r#"{ "ghots": {} }"#).unwrap_err();
        assert!(err.starts_with("Config parse error"), "got: {err}");
        assert!(PaneConfig::from_json("{").is_err());
        assert!(PaneConfig::from_json(r#"{ "hit_policy": "sideways" }"#).is_err());
    }
}
