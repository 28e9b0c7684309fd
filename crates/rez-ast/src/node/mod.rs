//! The node model: one variant-tagged record per block kind.
//!
//! Every block the parser accepts becomes a [`Node`]: common fields
//! (id, position, status, attribute map) plus a [`NodeKind`] payload for
//! variant-specific state. Variants are flat; polymorphic behaviour is a
//! match over the kind, not a hierarchy.
//!
//! Two processing passes run over a finished tree:
//!
//! 1. `pre_process` — pure normalization: default attribute values and
//!    item tag expansion. Runs once when a block finishes parsing and
//!    again at the head of the process pass (it is idempotent, and tag
//!    expansion only completes once every `@derive` has been seen).
//! 2. `process` — derived state: template compilation, recursion into
//!    owned children.
//!
//! Validation never mutates nodes; failures during processing are recorded
//! on `status` and surfaced by the validation driver.

mod game;

pub use game::{Fragment, Game};

use crate::attribute::{AttrValue, Attribute};
use crate::foundation::SourcePos;
use crate::hierarchy::TypeHierarchy;
use crate::template::{CompiledTemplate, TemplateEnvelope};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Processing state of a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeStatus {
    #[default]
    Ok,
    /// A processing step failed; the message is surfaced at validation.
    Error(String),
}

impl NodeStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, NodeStatus::Ok)
    }
}

/// Variant-specific payload of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// `@scene` — owns its cards; `layout` is compiled during `process`
    Scene {
        cards: Vec<Node>,
        layout: Option<CompiledTemplate>,
    },
    /// `@card` — `content` is compiled during `process`
    Card { content: Option<CompiledTemplate> },
    /// `@item`
    Item,
    /// `@inventory` — owns its slots
    Inventory { slots: Vec<Node> },
    /// `@slot`
    Slot,
    /// `@asset`
    Asset,
    /// `@group`
    Group,
    /// `@helper`
    Helper,
    /// `@task`
    Task,
    /// `@actor`
    Actor,
}

impl NodeKind {
    /// Stable kind label, also used as the id-map registration kind.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Scene { .. } => "scene",
            NodeKind::Card { .. } => "card",
            NodeKind::Item => "item",
            NodeKind::Inventory { .. } => "inventory",
            NodeKind::Slot => "slot",
            NodeKind::Asset => "asset",
            NodeKind::Group => "group",
            NodeKind::Helper => "helper",
            NodeKind::Task => "task",
            NodeKind::Actor => "actor",
        }
    }
}

/// A parsed block: common fields plus the variant payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Author-supplied or generated id; anonymous blocks have none
    pub id: Option<String>,
    /// Physical position of the `@label` that introduced the block
    pub position: SourcePos,
    pub status: NodeStatus,
    /// Attribute map in source order; duplicate names resolved last-wins
    /// at parse time
    pub attributes: IndexMap<String, Attribute>,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(
        kind: NodeKind,
        id: Option<String>,
        position: SourcePos,
        attributes: IndexMap<String, Attribute>,
    ) -> Self {
        Self {
            id,
            position,
            status: NodeStatus::Ok,
            attributes,
            kind,
        }
    }

    /// Stable kind label, e.g. `"item"`.
    pub fn node_type(&self) -> &'static str {
        self.kind.label()
    }

    /// Human-readable description used in diagnostics and the validation
    /// ledger.
    pub fn describe(&self) -> String {
        match &self.id {
            Some(id) => format!("{} '{}'", self.node_type(), id),
            None => format!("anonymous {}", self.node_type()),
        }
    }

    /// Attribute lookup by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Structural children, in source order. Only scenes and inventories
    /// own children; every other variant is a leaf.
    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Scene { cards, .. } => cards,
            NodeKind::Inventory { slots } => slots,
            _ => &[],
        }
    }

    /// Fold a parsed child block into this node.
    pub fn add_child(&mut self, child: Node) {
        match &mut self.kind {
            NodeKind::Scene { cards, .. } => cards.push(child),
            NodeKind::Inventory { slots } => slots.push(child),
            // Leaf kinds are never given a child parser by the grammar
            _ => {}
        }
    }

    /// Pure normalization: default attribute values and tag expansion.
    /// Idempotent.
    pub fn pre_process(&mut self, hierarchy: &TypeHierarchy) {
        if matches!(self.kind, NodeKind::Inventory { .. }) {
            self.default_attribute("apply_effects", AttrValue::Boolean(false));
        } else if matches!(self.kind, NodeKind::Card { .. }) {
            self.default_attribute("bindings", AttrValue::List(Vec::new()));
        } else if matches!(self.kind, NodeKind::Item) {
            self.expand_item_tags(hierarchy);
        }
        for child in self.children_mut() {
            child.pre_process(hierarchy);
        }
    }

    /// Compute derived state: compile templates, recurse into children.
    /// Failures land on `status`, never panic.
    pub fn process(&mut self, hierarchy: &TypeHierarchy) {
        match &mut self.kind {
            NodeKind::Scene { cards, layout } => {
                *layout = Self::compile_template_attr(
                    &self.attributes,
                    "layout",
                    TemplateEnvelope::SceneLayout,
                    &mut self.status,
                );
                for card in cards {
                    card.process(hierarchy);
                }
            }
            NodeKind::Card { content } => {
                *content = Self::compile_template_attr(
                    &self.attributes,
                    "content",
                    TemplateEnvelope::CardContent,
                    &mut self.status,
                );
            }
            NodeKind::Inventory { slots } => {
                for slot in slots {
                    slot.process(hierarchy);
                }
            }
            _ => {}
        }
    }

    fn children_mut(&mut self) -> &mut [Node] {
        match &mut self.kind {
            NodeKind::Scene { cards, .. } => cards,
            NodeKind::Inventory { slots } => slots,
            _ => &mut [],
        }
    }

    /// Insert `value` under `name` unless the author already set one.
    fn default_attribute(&mut self, name: &str, value: AttrValue) {
        if !self.attributes.contains_key(name) {
            self.attributes
                .insert(name.to_string(), Attribute::new(name, value));
        }
    }

    /// Expand the item's `type` keyword into the `tags` set: every
    /// transitive ancestor of the type becomes a tag. Additive, so safe to
    /// run on a partial hierarchy and again on the complete one.
    fn expand_item_tags(&mut self, hierarchy: &TypeHierarchy) {
        let type_tag = match self.attributes.get("type").map(|a| &a.value) {
            Some(AttrValue::Keyword(tag)) => tag.clone(),
            _ => return,
        };

        let tags = self
            .attributes
            .entry("tags".to_string())
            .or_insert_with(|| Attribute::new("tags", AttrValue::Set(Vec::new())));
        let AttrValue::Set(members) = &mut tags.value else {
            // Author supplied a non-set `tags`; the type check reports it
            return;
        };
        for ancestor in hierarchy.fan_out(&type_tag) {
            let tag = AttrValue::Keyword(ancestor.clone());
            if !members.contains(&tag) {
                members.push(tag);
            }
        }
    }

    fn compile_template_attr(
        attributes: &IndexMap<String, Attribute>,
        name: &str,
        envelope: TemplateEnvelope,
        status: &mut NodeStatus,
    ) -> Option<CompiledTemplate> {
        let source = match attributes.get(name).map(|a| &a.value) {
            Some(AttrValue::String(source)) => source,
            // Missing or mis-typed attributes are the validator's problem
            _ => return None,
        };
        match CompiledTemplate::compile(source, envelope) {
            Ok(template) => Some(template),
            Err(err) => {
                *status = NodeStatus::Error(format!("template '{}': {}", name, err));
                None
            }
        }
    }
}
