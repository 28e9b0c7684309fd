//! Attributes: typed named values attached to blocks.
//!
//! Every attribute value carries its own type tag, so collections may hold
//! heterogeneously tagged elements and the validator can test tags without
//! re-parsing anything.

use crate::btree::BehaviourTree;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of attribute value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttrType {
    Number,
    String,
    Boolean,
    Keyword,
    Set,
    List,
    Function,
    ElemRef,
    BTree,
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttrType::Number => "number",
            AttrType::String => "string",
            AttrType::Boolean => "boolean",
            AttrType::Keyword => "keyword",
            AttrType::Set => "set",
            AttrType::List => "list",
            AttrType::Function => "function",
            AttrType::ElemRef => "elem_ref",
            AttrType::BTree => "btree",
        };
        write!(f, "{}", name)
    }
}

/// A tagged attribute value.
///
/// The tag always matches [`AttrType`]: `value.kind()` is derived from the
/// variant, so a value can never disagree with its declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Number(f64),
    String(String),
    Boolean(bool),
    /// `:keyword` — stored without the leading colon
    Keyword(String),
    /// `#{ ... }` — heterogeneously tagged members
    Set(Vec<AttrValue>),
    /// `[ ... ]` — heterogeneously tagged members
    List(Vec<AttrValue>),
    /// `(a, b) => { ... }` — parameter names plus the raw script body
    Function {
        params: Vec<String>,
        body: String,
    },
    /// `#id` — reference to another block, resolved through the id map
    ElemRef(String),
    /// `^[ ... ]` — behaviour tree
    BTree(BehaviourTree),
}

impl AttrValue {
    /// The type tag of this value.
    pub fn kind(&self) -> AttrType {
        match self {
            AttrValue::Number(_) => AttrType::Number,
            AttrValue::String(_) => AttrType::String,
            AttrValue::Boolean(_) => AttrType::Boolean,
            AttrValue::Keyword(_) => AttrType::Keyword,
            AttrValue::Set(_) => AttrType::Set,
            AttrValue::List(_) => AttrType::List,
            AttrValue::Function { .. } => AttrType::Function,
            AttrValue::ElemRef(_) => AttrType::ElemRef,
            AttrValue::BTree(_) => AttrType::BTree,
        }
    }

    /// Collection members, for `Set` and `List` values.
    pub fn elements(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::Set(items) | AttrValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// String payload of a `String` or `Keyword` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) | AttrValue::Keyword(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric payload of a `Number` value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean payload of a `Boolean` value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Number(n) => write!(f, "{}", n),
            AttrValue::String(s) => write!(f, "{:?}", s),
            AttrValue::Boolean(b) => write!(f, "{}", b),
            AttrValue::Keyword(k) => write!(f, ":{}", k),
            AttrValue::Set(items) => {
                write!(f, "#{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "}}")
            }
            AttrValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            AttrValue::Function { params, .. } => {
                write!(f, "({}) => {{...}}", params.join(", "))
            }
            AttrValue::ElemRef(id) => write!(f, "#{}", id),
            AttrValue::BTree(tree) => write!(f, "^[{}]", tree.task),
        }
    }
}

/// A named, typed value attached to a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: AttrValue,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: AttrValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// The type tag of the attribute's value.
    pub fn kind(&self) -> AttrType {
        self.value.kind()
    }
}
