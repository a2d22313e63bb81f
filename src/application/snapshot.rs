//! Snapshot file model: a tree, its inclusion set and its view state.

use serde::{Deserialize, Serialize};

use crate::domain::{
    Blueprint, DomainError, DomainResult, InclusionSet, ItemId, NodeData, NodeFlags, NodeKey,
    NodeKind, Payload, TreeState,
};

/// Node kind tag as written in snapshot files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecKind {
    Root,
    Group,
    Tool,
    Element,
    Item,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One node of a snapshot tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub kind: SpecKind,
    /// Group/tool name, element id or item id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Element an item belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub invalid: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub excluded: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub suppressed: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub fix_applied: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(kind: SpecKind, name: Option<&str>) -> Self {
        Self {
            kind,
            name: name.map(str::to_string),
            element: None,
            position: None,
            template: None,
            invalid: false,
            excluded: false,
            suppressed: false,
            fix_applied: false,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<NodeSpec>) -> Self {
        self.children = children;
        self
    }

    fn required_name(&self) -> DomainResult<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| DomainError::InvalidNode(format!("{:?} node without name", self.kind)))
    }
}

impl Blueprint for NodeSpec {
    fn node_data(&self) -> DomainResult<NodeData> {
        let kind = match self.kind {
            SpecKind::Root => NodeKind::Root,
            SpecKind::Group => NodeKind::group(self.required_name()?),
            SpecKind::Tool => NodeKind::tool(self.required_name()?),
            SpecKind::Element => NodeKind::element(self.required_name()?),
            SpecKind::Item => {
                let mut payload = Payload::new(self.required_name()?);
                if let Some(element) = &self.element {
                    payload = payload.with_element(element.as_str());
                }
                if let Some(position) = self.position {
                    payload = payload.with_position(position);
                }
                if let Some(template) = &self.template {
                    payload = payload.with_template(template.as_str());
                }
                NodeKind::item(payload)
            }
        };
        let flags = NodeFlags {
            invalid: self.invalid,
            excluded: self.excluded,
            suppressed: self.suppressed,
            fix_applied: self.fix_applied,
        };
        Ok(NodeData::new(kind).with_flags(flags))
    }

    fn child_blueprints(&self) -> &[Self] {
        &self.children
    }
}

/// Persisted expansion and selection, as node keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotState {
    pub expanded: Vec<String>,
    pub selected: Vec<String>,
}

impl SnapshotState {
    pub fn to_tree_state(&self) -> TreeState {
        TreeState::with_keys(
            self.expanded.iter().map(NodeKey::new),
            self.selected.iter().map(NodeKey::new),
        )
    }

    pub fn from_tree_state(state: &TreeState) -> Self {
        Self {
            expanded: state.expanded_keys().map(|k| k.to_string()).collect(),
            selected: state.selected_keys().iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Top-level snapshot document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub included: Vec<String>,
    #[serde(default)]
    pub state: SnapshotState,
    pub root: NodeSpec,
}

impl Snapshot {
    pub fn inclusion_set(&self) -> InclusionSet {
        InclusionSet::from_items(self.included.iter().map(|id| ItemId::new(id.as_str())))
    }

    /// Replace the persisted inclusion list (sorted, from the set).
    pub fn set_included(&mut self, inclusion: &InclusionSet) {
        self.included = inclusion.items().map(|id| id.to_string()).collect();
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
