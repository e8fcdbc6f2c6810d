//! Declarative schema model and the reference codec built on it.
//!
//! Applications normally plug in their own generated codecs; [`SchemaCodec`]
//! interprets a [`SchemaNode`] tree directly and produces [`DataObject`]s.

pub mod cache;
pub mod codec;

pub use cache::{CacheStats, CodecCache, LruCache};
pub use codec::{DataObject, SchemaCodec};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::codec::Addressability;
use crate::errors::{ExError, ProjectionError, Result};

/// One node of a schema definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemaNode {
    Container {
        name: String,
        #[serde(default)]
        children: Vec<SchemaNode>,
    },
    /// List whose entries are identified by `keys`
    List {
        name: String,
        keys: Vec<String>,
        #[serde(default)]
        children: Vec<SchemaNode>,
    },
    UnkeyedList {
        name: String,
        #[serde(default)]
        children: Vec<SchemaNode>,
    },
    Leaf {
        name: String,
    },
    LeafList {
        name: String,
    },
    AnyData {
        name: String,
    },
    Choice {
        name: String,
        cases: Vec<CaseNode>,
    },
    /// Children contributed to the enclosing node by an extension module
    Augmentation {
        name: String,
        #[serde(default)]
        children: Vec<SchemaNode>,
    },
}

/// One case of a choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseNode {
    pub name: String,
    #[serde(default)]
    pub children: Vec<SchemaNode>,
}

impl CaseNode {
    pub fn new(name: impl Into<String>, children: Vec<SchemaNode>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }
}

/// Where a data child was found relative to its parent
pub(crate) enum Located<'a> {
    Direct(&'a SchemaNode),
    Augmented {
        augmentation: &'a SchemaNode,
        node: &'a SchemaNode,
    },
}

impl<'a> Located<'a> {
    pub(crate) fn node(&self) -> &'a SchemaNode {
        match self {
            Located::Direct(node) | Located::Augmented { node, .. } => node,
        }
    }
}

impl SchemaNode {
    pub fn container(name: impl Into<String>, children: Vec<SchemaNode>) -> Self {
        SchemaNode::Container {
            name: name.into(),
            children,
        }
    }

    pub fn list<K: Into<String>>(
        name: impl Into<String>,
        keys: impl IntoIterator<Item = K>,
        children: Vec<SchemaNode>,
    ) -> Self {
        SchemaNode::List {
            name: name.into(),
            keys: keys.into_iter().map(Into::into).collect(),
            children,
        }
    }

    pub fn unkeyed_list(name: impl Into<String>, children: Vec<SchemaNode>) -> Self {
        SchemaNode::UnkeyedList {
            name: name.into(),
            children,
        }
    }

    pub fn leaf(name: impl Into<String>) -> Self {
        SchemaNode::Leaf { name: name.into() }
    }

    pub fn leaf_list(name: impl Into<String>) -> Self {
        SchemaNode::LeafList { name: name.into() }
    }

    pub fn anydata(name: impl Into<String>) -> Self {
        SchemaNode::AnyData { name: name.into() }
    }

    pub fn choice(name: impl Into<String>, cases: Vec<CaseNode>) -> Self {
        SchemaNode::Choice {
            name: name.into(),
            cases,
        }
    }

    pub fn augmentation(name: impl Into<String>, children: Vec<SchemaNode>) -> Self {
        SchemaNode::Augmentation {
            name: name.into(),
            children,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SchemaNode::Container { name, .. }
            | SchemaNode::List { name, .. }
            | SchemaNode::UnkeyedList { name, .. }
            | SchemaNode::Leaf { name }
            | SchemaNode::LeafList { name }
            | SchemaNode::AnyData { name }
            | SchemaNode::Choice { name, .. }
            | SchemaNode::Augmentation { name, .. } => name,
        }
    }

    /// Construct name used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            SchemaNode::Container { .. } => "container",
            SchemaNode::List { .. } => "keyed list",
            SchemaNode::UnkeyedList { .. } => "unkeyed list",
            SchemaNode::Leaf { .. } => "leaf",
            SchemaNode::LeafList { .. } => "leaf-list",
            SchemaNode::AnyData { .. } => "anydata",
            SchemaNode::Choice { .. } => "choice",
            SchemaNode::Augmentation { .. } => "augmentation",
        }
    }

    /// Children of a data-container node; empty for everything else
    pub fn data_children(&self) -> &[SchemaNode] {
        match self {
            SchemaNode::Container { children, .. }
            | SchemaNode::List { children, .. }
            | SchemaNode::UnkeyedList { children, .. }
            | SchemaNode::Augmentation { children, .. } => children,
            SchemaNode::Leaf { .. }
            | SchemaNode::LeafList { .. }
            | SchemaNode::AnyData { .. }
            | SchemaNode::Choice { .. } => &[],
        }
    }

    /// Child-addressability summary of this node
    pub fn addressability(&self) -> Addressability {
        match self {
            SchemaNode::Container { children, .. }
            | SchemaNode::List { children, .. }
            | SchemaNode::UnkeyedList { children, .. }
            | SchemaNode::Augmentation { children, .. } => summarize(children),
            SchemaNode::Choice { cases, .. } => {
                let mut have_addressable = false;
                let mut have_unaddressable = false;
                for case in cases {
                    match summarize(&case.children) {
                        Addressability::Addressable => have_addressable = true,
                        Addressability::Unaddressable => have_unaddressable = true,
                        // a mixed case makes the whole choice mixed
                        Addressability::Mixed => return Addressability::Mixed,
                    }
                }
                combine(have_addressable, have_unaddressable)
            }
            SchemaNode::Leaf { .. } | SchemaNode::LeafList { .. } | SchemaNode::AnyData { .. } => {
                Addressability::Unaddressable
            }
        }
    }

    /// Reject definitions where two data children share a name
    ///
    /// Augmentation children and choice-case children live in the namespace
    /// of the enclosing node.
    ///
    /// # Errors
    ///
    /// `ERR_INVALID_INPUT` naming the first duplicate found.
    pub fn validate(&self) -> Result<()> {
        let mut names = Namespace::default();
        match self {
            SchemaNode::Choice { cases, .. } => {
                for case in cases {
                    check_namespace(self.name(), &case.children, &mut names)?;
                }
            }
            node => check_namespace(node.name(), node.data_children(), &mut names)?,
        }
        for child in self.data_children() {
            child.validate()?;
        }
        if let SchemaNode::Choice { cases, .. } = self {
            for child in cases.iter().flat_map(|c| c.children.iter()) {
                child.validate()?;
            }
        }
        Ok(())
    }
}

fn summarize(children: &[SchemaNode]) -> Addressability {
    let mut have_addressable = false;
    let mut have_unaddressable = false;
    for child in children {
        match child {
            SchemaNode::Container { .. }
            | SchemaNode::Augmentation { .. }
            | SchemaNode::List { .. } => have_addressable = true,
            SchemaNode::UnkeyedList { .. }
            | SchemaNode::Leaf { .. }
            | SchemaNode::LeafList { .. }
            | SchemaNode::AnyData { .. } => have_unaddressable = true,
            SchemaNode::Choice { .. } => match child.addressability() {
                Addressability::Addressable => have_addressable = true,
                Addressability::Unaddressable => have_unaddressable = true,
                Addressability::Mixed => {
                    have_addressable = true;
                    have_unaddressable = true;
                }
            },
        }
    }
    combine(have_addressable, have_unaddressable)
}

fn combine(have_addressable: bool, have_unaddressable: bool) -> Addressability {
    match (have_addressable, have_unaddressable) {
        // empty or all unaddressable
        (false, _) => Addressability::Unaddressable,
        (true, true) => Addressability::Mixed,
        (true, false) => Addressability::Addressable,
    }
}

/// Names flattened into one output position: data children (through
/// augmentations and choice cases) and augmentations (through choice cases)
#[derive(Default)]
struct Namespace<'a> {
    data: HashSet<&'a str>,
    augmentations: HashSet<&'a str>,
}

fn check_namespace<'a>(
    parent: &str,
    children: &'a [SchemaNode],
    names: &mut Namespace<'a>,
) -> Result<()> {
    for child in children {
        match child {
            SchemaNode::Augmentation { name, children } => {
                if !names.augmentations.insert(name.as_str()) {
                    return Err(duplicate(parent, &format!("+{}", name)));
                }
                check_namespace(parent, children, names)?;
            }
            SchemaNode::Choice { name, cases } => {
                insert_unique(parent, name, &mut names.data)?;
                for case in cases {
                    check_namespace(parent, &case.children, names)?;
                }
            }
            other => insert_unique(parent, other.name(), &mut names.data)?,
        }
    }
    Ok(())
}

fn insert_unique<'a>(parent: &str, name: &'a str, seen: &mut HashSet<&'a str>) -> Result<()> {
    if seen.insert(name) {
        Ok(())
    } else {
        Err(duplicate(parent, name))
    }
}

fn duplicate(parent: &str, name: &str) -> ExError {
    ProjectionError::DuplicateSchemaChild {
        parent: parent.to_string(),
        name: name.to_string(),
    }
    .into()
}

/// Find a data child by name, looking through augmentations
pub(crate) fn locate<'a>(children: &'a [SchemaNode], name: &str) -> Option<Located<'a>> {
    if let Some(node) = children
        .iter()
        .find(|c| !matches!(c, SchemaNode::Augmentation { .. }) && c.name() == name)
    {
        return Some(Located::Direct(node));
    }
    children.iter().find_map(|augmentation| match augmentation {
        SchemaNode::Augmentation { children, .. } => children
            .iter()
            .find(|c| c.name() == name)
            .map(|node| Located::Augmented { augmentation, node }),
        _ => None,
    })
}

/// Find augmentation `name` among `children` or inside any choice case below
/// them, returning the `(choice, case)` chain that leads to it
pub(crate) fn locate_augmentation<'a>(
    children: &'a [SchemaNode],
    name: &str,
) -> Option<(Vec<(&'a str, &'a str)>, &'a SchemaNode)> {
    if let Some(node) = children
        .iter()
        .find(|c| matches!(c, SchemaNode::Augmentation { .. }) && c.name() == name)
    {
        return Some((Vec::new(), node));
    }
    for child in children {
        let SchemaNode::Choice {
            name: choice,
            cases,
        } = child
        else {
            continue;
        };
        for case in cases {
            if let Some((mut chain, node)) = locate_augmentation(&case.children, name) {
                chain.insert(0, (choice.as_str(), case.name.as_str()));
                return Some((chain, node));
            }
        }
    }
    None
}

/// Find `name` declared directly in choice case `case`, returning the
/// `(choice, case)` chain that leads to it
pub(crate) fn locate_in_case<'a>(
    children: &'a [SchemaNode],
    case: &str,
    name: &str,
) -> Option<(Vec<(&'a str, &'a str)>, &'a SchemaNode)> {
    for child in children {
        let SchemaNode::Choice {
            name: choice,
            cases,
        } = child
        else {
            continue;
        };
        for candidate in cases {
            if candidate.name == case {
                if let Some(node) = candidate.children.iter().find(|c| c.name() == name) {
                    return Some((vec![(choice.as_str(), candidate.name.as_str())], node));
                }
            }
            if let Some((mut path, node)) = locate_in_case(&candidate.children, case, name) {
                path.insert(0, (choice.as_str(), candidate.name.as_str()));
                return Some((path, node));
            }
        }
    }
    None
}
