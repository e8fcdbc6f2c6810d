use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::tree::NodeKey;

/// Schema-level tree value carried by a change-tree node.
///
/// Payloads are not yet typed; a codec turns them into application values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    key: NodeKey,
    body: PayloadBody,
}

/// Body of a payload, one variant per schema construct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "data", rename_all = "snake_case")]
pub enum PayloadBody {
    Leaf(Value),
    AnyData(Value),
    LeafSet(Vec<Payload>),
    LeafSetEntry(Value),
    Container(Vec<Payload>),
    Choice(Vec<Payload>),
    /// Keyed list wrapper; entries are `MapEntry` payloads
    Map(Vec<Payload>),
    MapEntry(Vec<Payload>),
    UnkeyedList(Vec<Payload>),
    UnkeyedListEntry(Vec<Payload>),
}

/// Discriminant of [`PayloadBody`], used in classification and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadShape {
    Leaf,
    AnyData,
    LeafSet,
    LeafSetEntry,
    Container,
    Choice,
    Map,
    MapEntry,
    UnkeyedList,
    UnkeyedListEntry,
}

impl fmt::Display for PayloadShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PayloadShape::Leaf => "leaf",
            PayloadShape::AnyData => "anydata",
            PayloadShape::LeafSet => "leaf-list",
            PayloadShape::LeafSetEntry => "leaf-list entry",
            PayloadShape::Container => "container",
            PayloadShape::Choice => "choice",
            PayloadShape::Map => "keyed list",
            PayloadShape::MapEntry => "keyed list entry",
            PayloadShape::UnkeyedList => "unkeyed list",
            PayloadShape::UnkeyedListEntry => "unkeyed list entry",
        };
        f.write_str(name)
    }
}

impl PayloadBody {
    pub fn shape(&self) -> PayloadShape {
        match self {
            PayloadBody::Leaf(_) => PayloadShape::Leaf,
            PayloadBody::AnyData(_) => PayloadShape::AnyData,
            PayloadBody::LeafSet(_) => PayloadShape::LeafSet,
            PayloadBody::LeafSetEntry(_) => PayloadShape::LeafSetEntry,
            PayloadBody::Container(_) => PayloadShape::Container,
            PayloadBody::Choice(_) => PayloadShape::Choice,
            PayloadBody::Map(_) => PayloadShape::Map,
            PayloadBody::MapEntry(_) => PayloadShape::MapEntry,
            PayloadBody::UnkeyedList(_) => PayloadShape::UnkeyedList,
            PayloadBody::UnkeyedListEntry(_) => PayloadShape::UnkeyedListEntry,
        }
    }
}

impl Payload {
    pub fn new(key: NodeKey, body: PayloadBody) -> Self {
        Self { key, body }
    }

    pub fn leaf(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(NodeKey::node(name), PayloadBody::Leaf(value.into()))
    }

    pub fn anydata(name: impl Into<String>, value: Value) -> Self {
        Self::new(NodeKey::node(name), PayloadBody::AnyData(value))
    }

    pub fn container(name: impl Into<String>, children: Vec<Payload>) -> Self {
        Self::new(NodeKey::node(name), PayloadBody::Container(children))
    }

    pub fn choice(name: impl Into<String>, children: Vec<Payload>) -> Self {
        Self::new(NodeKey::node(name), PayloadBody::Choice(children))
    }

    pub fn map(name: impl Into<String>, entries: Vec<Payload>) -> Self {
        Self::new(NodeKey::node(name), PayloadBody::Map(entries))
    }

    /// Keyed list entry; `key` should be a [`NodeKey::Entry`]
    pub fn map_entry(key: NodeKey, children: Vec<Payload>) -> Self {
        Self::new(key, PayloadBody::MapEntry(children))
    }

    pub fn leaf_set(name: impl Into<String>, entries: Vec<Payload>) -> Self {
        Self::new(NodeKey::node(name), PayloadBody::LeafSet(entries))
    }

    /// Leaf-list entry keyed by its own value
    pub fn leaf_set_entry(name: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        let rendered = match &value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Self::new(
            NodeKey::value(name, rendered),
            PayloadBody::LeafSetEntry(value),
        )
    }

    pub fn unkeyed_list(name: impl Into<String>, entries: Vec<Payload>) -> Self {
        Self::new(NodeKey::node(name), PayloadBody::UnkeyedList(entries))
    }

    pub fn unkeyed_list_entry(name: impl Into<String>, children: Vec<Payload>) -> Self {
        Self::new(NodeKey::node(name), PayloadBody::UnkeyedListEntry(children))
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    pub fn body(&self) -> &PayloadBody {
        &self.body
    }

    pub fn shape(&self) -> PayloadShape {
        self.body.shape()
    }

    /// Nested payloads; empty for scalar bodies
    pub fn children(&self) -> &[Payload] {
        match &self.body {
            PayloadBody::Leaf(_) | PayloadBody::AnyData(_) | PayloadBody::LeafSetEntry(_) => &[],
            PayloadBody::LeafSet(children)
            | PayloadBody::Container(children)
            | PayloadBody::Choice(children)
            | PayloadBody::Map(children)
            | PayloadBody::MapEntry(children)
            | PayloadBody::UnkeyedList(children)
            | PayloadBody::UnkeyedListEntry(children) => children,
        }
    }

    pub fn child(&self, key: &NodeKey) -> Option<&Payload> {
        self.children().iter().find(|c| c.key() == key)
    }
}
