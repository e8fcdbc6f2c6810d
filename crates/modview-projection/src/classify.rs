//! Structural classification of change-tree nodes
//!
//! Decides, from payload shape alone, whether a node has its own output
//! identity, is a transparent wrapper whose children surface in its parent's
//! position, or cannot be addressed at all.

use std::fmt;

use modview_core::tree::{ChangeNode, NodeKey, PayloadShape};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructuralClass {
    /// Leaf-like data with no individually addressable output node
    NotAddressable,
    /// Choice-style wrapper; children belong to the enclosing object
    TransparentContainer,
    /// Keyed-list wrapper; each entry is its own output node
    TransparentList,
    VisibleContainer,
    /// No payload and a key that says nothing about shape
    Unknown,
}

impl StructuralClass {
    pub fn is_transparent(self) -> bool {
        matches!(
            self,
            StructuralClass::TransparentContainer | StructuralClass::TransparentList
        )
    }
}

impl fmt::Display for StructuralClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StructuralClass::NotAddressable => "not_addressable",
            StructuralClass::TransparentContainer => "transparent_container",
            StructuralClass::TransparentList => "transparent_list",
            StructuralClass::VisibleContainer => "visible_container",
            StructuralClass::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Classify a node by its after payload, else its before payload, else its key
pub fn classify(node: &ChangeNode) -> StructuralClass {
    match node.after().or_else(|| node.before()) {
        Some(payload) => classify_shape(payload.shape()),
        None => match node.key() {
            NodeKey::Entry { .. } => StructuralClass::VisibleContainer,
            NodeKey::Value { .. } => StructuralClass::NotAddressable,
            NodeKey::Node(_) => StructuralClass::Unknown,
        },
    }
}

fn classify_shape(shape: PayloadShape) -> StructuralClass {
    match shape {
        PayloadShape::Leaf
        | PayloadShape::AnyData
        | PayloadShape::LeafSet
        | PayloadShape::LeafSetEntry
        | PayloadShape::UnkeyedList
        | PayloadShape::UnkeyedListEntry => StructuralClass::NotAddressable,
        PayloadShape::Map => StructuralClass::TransparentList,
        PayloadShape::Choice => StructuralClass::TransparentContainer,
        PayloadShape::Container | PayloadShape::MapEntry => StructuralClass::VisibleContainer,
    }
}

/// Classify a node, looking through transparent layers
///
/// Only the first child of a transparent node is inspected. A transparent
/// node that bottoms out in another transparent node, or in nothing, counts as
/// not addressable.
pub fn classify_recursive(node: &ChangeNode) -> StructuralClass {
    let class = classify(node);
    if !class.is_transparent() {
        return class;
    }
    match node.children().first() {
        Some(first) => match classify_recursive(first) {
            nested if nested.is_transparent() => StructuralClass::NotAddressable,
            nested => nested,
        },
        None => StructuralClass::NotAddressable,
    }
}
