//! The root game node.
//!
//! `Game` aggregates every top-level block by kind, owns the identifier
//! map and the type hierarchy, and drives the process pass over the whole
//! tree. Parsing hands a fully populated `Game` across the phase boundary;
//! validation only ever borrows it.

use crate::attribute::{AttrValue, Attribute};
use crate::foundation::SourcePos;
use crate::hierarchy::TypeHierarchy;
use crate::id_map::IdMap;
use crate::node::{Node, NodeKind, NodeStatus};
use crate::template::{CompiledTemplate, TemplateEnvelope};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Anonymous delimited content (`@script begin … end`, `@styles begin … end`)
/// attached to the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub position: SourcePos,
    pub content: String,
}

/// The root of a parsed source: sub-collections indexed by kind plus the
/// shared registries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// The game block's id; fixed, there is only one game per source
    pub id: String,
    pub position: SourcePos,
    pub status: NodeStatus,
    pub attributes: IndexMap<String, Attribute>,
    /// Compiled `layout` attribute, filled in by the process pass
    pub layout: Option<CompiledTemplate>,

    pub scenes: Vec<Node>,
    pub cards: Vec<Node>,
    pub items: Vec<Node>,
    pub inventories: Vec<Node>,
    pub slots: Vec<Node>,
    pub tasks: Vec<Node>,
    pub actors: Vec<Node>,
    pub assets: Vec<Node>,
    pub groups: Vec<Node>,
    pub helpers: Vec<Node>,

    pub scripts: Vec<Fragment>,
    pub stylesheets: Vec<Fragment>,

    /// Every id registered during the parse, duplicates included
    pub id_map: IdMap,
    /// Keyword subtype DAG built from `@derive` statements
    pub hierarchy: TypeHierarchy,
}

impl Game {
    pub const ID: &'static str = "game";

    pub fn new(position: SourcePos, attributes: IndexMap<String, Attribute>) -> Self {
        Self {
            id: Self::ID.to_string(),
            position,
            status: NodeStatus::Ok,
            attributes,
            layout: None,
            scenes: Vec::new(),
            cards: Vec::new(),
            items: Vec::new(),
            inventories: Vec::new(),
            slots: Vec::new(),
            tasks: Vec::new(),
            actors: Vec::new(),
            assets: Vec::new(),
            groups: Vec::new(),
            helpers: Vec::new(),
            scripts: Vec::new(),
            stylesheets: Vec::new(),
            id_map: IdMap::new(),
            hierarchy: TypeHierarchy::new(),
        }
    }

    /// Stable kind label of the root.
    pub fn node_type(&self) -> &'static str {
        "game"
    }

    /// Attribute lookup by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// File a parsed top-level block into its kind collection.
    pub fn add_node(&mut self, node: Node) {
        match node.kind {
            NodeKind::Scene { .. } => self.scenes.push(node),
            NodeKind::Card { .. } => self.cards.push(node),
            NodeKind::Item => self.items.push(node),
            NodeKind::Inventory { .. } => self.inventories.push(node),
            NodeKind::Slot => self.slots.push(node),
            NodeKind::Task => self.tasks.push(node),
            NodeKind::Actor => self.actors.push(node),
            NodeKind::Asset => self.assets.push(node),
            NodeKind::Group => self.groups.push(node),
            NodeKind::Helper => self.helpers.push(node),
        }
    }

    /// Attach an anonymous delimited block under its content key.
    pub fn add_fragment(&mut self, key: &str, fragment: Fragment) {
        match key {
            "styles" => self.stylesheets.push(fragment),
            _ => self.scripts.push(fragment),
        }
    }

    /// All direct children in fixed kind order (scenes, cards, items,
    /// inventories, slots, tasks, actors, assets, groups, helpers), each
    /// collection in declaration order. The validation driver's traversal
    /// order, and therefore error order, follows this.
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.scenes
            .iter()
            .chain(&self.cards)
            .chain(&self.items)
            .chain(&self.inventories)
            .chain(&self.slots)
            .chain(&self.tasks)
            .chain(&self.actors)
            .chain(&self.assets)
            .chain(&self.groups)
            .chain(&self.helpers)
    }

    /// The `@task` block with the given id, if any.
    pub fn task(&self, id: &str) -> Option<&Node> {
        self.tasks.iter().find(|t| t.id.as_deref() == Some(id))
    }

    /// Every slot in the game: top-level slots first, then each
    /// inventory's slots in declaration order.
    pub fn all_slots(&self) -> impl Iterator<Item = &Node> {
        self.slots
            .iter()
            .chain(self.inventories.iter().flat_map(|inv| inv.children()))
    }

    /// Run the process pass over the whole tree: `pre_process` (now that
    /// the hierarchy has seen every `@derive`), then `process`.
    pub fn process(&mut self) {
        let hierarchy = &self.hierarchy;

        if let Some(AttrValue::String(source)) =
            self.attributes.get("layout").map(|attr| &attr.value)
        {
            match CompiledTemplate::compile(source, TemplateEnvelope::GameLayout) {
                Ok(template) => self.layout = Some(template),
                Err(err) => {
                    self.status = NodeStatus::Error(format!("template 'layout': {}", err));
                }
            }
        }

        for collection in [
            &mut self.scenes,
            &mut self.cards,
            &mut self.items,
            &mut self.inventories,
            &mut self.slots,
            &mut self.tasks,
            &mut self.actors,
            &mut self.assets,
            &mut self.groups,
            &mut self.helpers,
        ] {
            for node in collection.iter_mut() {
                node.pre_process(hierarchy);
                node.process(hierarchy);
            }
        }
    }
}
