//! Domain entities: core data structures

use std::cmp::Ordering;
use std::fmt;

/// Identity of an includable item (problem descriptor, changed file).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Reference to the element (file, class, ...) an item belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Item carried by an item node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Identity used for inclusion and de-duplication
    pub id: ItemId,
    /// Element the item was reported against
    pub element: Option<ElementId>,
    /// Source offset, when the item is anchored in a document
    pub position: Option<u32>,
    /// Description template, fallback ordering key
    pub template: String,
}

impl Payload {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(id),
            element: None,
            position: None,
            template: String::new(),
        }
    }

    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(ElementId::new(element));
        self
    }

    pub fn with_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }
}

/// Ordering used when sibling items are requested in document order.
///
/// Anchored items sort by position, last occurrence first, so that applying
/// edits in this order never shifts the offsets of the remaining items.
/// Anything else falls back to the description template.
pub fn compare_by_position(a: &Payload, b: &Payload) -> Ordering {
    match (a.position, b.position) {
        (Some(pa), Some(pb)) => pb.cmp(&pa),
        _ => a.template.cmp(&b.template),
    }
}

/// Tagged node kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Group { name: String },
    Tool { name: String },
    Element { element: ElementId },
    Item(Payload),
}

impl NodeKind {
    pub fn group(name: impl Into<String>) -> Self {
        Self::Group { name: name.into() }
    }

    pub fn tool(name: impl Into<String>) -> Self {
        Self::Tool { name: name.into() }
    }

    pub fn element(element: impl Into<String>) -> Self {
        Self::Element {
            element: ElementId::new(element),
        }
    }

    pub fn item(payload: Payload) -> Self {
        Self::Item(payload)
    }

    /// Display label, also used for label-path lookup.
    pub fn label(&self) -> &str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Group { name } | NodeKind::Tool { name } => name,
            NodeKind::Element { element } => element.as_str(),
            NodeKind::Item(payload) => payload.id.as_str(),
        }
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            NodeKind::Item(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn is_item(&self) -> bool {
        matches!(self, NodeKind::Item(_))
    }

    /// Identity key that survives a rebuild of the tree.
    pub fn key(&self) -> NodeKey {
        let key = match self {
            NodeKind::Root => "root".to_string(),
            NodeKind::Group { name } => format!("group:{}", name),
            NodeKind::Tool { name } => format!("tool:{}", name),
            NodeKind::Element { element } => format!("element:{}", element),
            NodeKind::Item(payload) => format!("item:{}", payload.id),
        };
        NodeKey(key)
    }
}

/// Node identity across rebuilds, e.g. `group:Probable bugs` or `item:D1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(String);

impl NodeKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Freshness and visibility flags of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeFlags {
    /// Payload no longer resolves (e.g. its document range was edited away)
    pub invalid: bool,
    /// Excluded from the results by the user
    pub excluded: bool,
    /// Suppressed from view
    pub suppressed: bool,
    /// Already resolved externally (quick fix applied)
    pub fix_applied: bool,
}

impl NodeFlags {
    pub fn is_valid(&self) -> bool {
        !self.invalid
    }

    /// Valid and neither excluded, suppressed nor already fixed.
    pub fn is_actionable(&self) -> bool {
        self.is_valid() && !self.excluded && !self.suppressed && !self.fix_applied
    }
}

/// Tri-state inclusion status of a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Clear,
    Partial,
    Full,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Clear => "clear",
            Status::Partial => "partial",
            Status::Full => "full",
        };
        write!(f, "{}", s)
    }
}

/// Ordering of sibling items in a resolved selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolveOrder {
    #[default]
    Insertion,
    ByPosition,
}
