use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identity of a change-tree node within its parent.
///
/// The shape of the key carries structural information: a keyed list entry is
/// always individually addressable, a value-bearing entry never is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKey {
    /// Plain schema identifier
    Node(String),
    /// Uniquely-keyed list entry
    Entry {
        name: String,
        keys: BTreeMap<String, String>,
    },
    /// Value-bearing entry, e.g. one member of a leaf-list
    Value { name: String, value: String },
}

impl NodeKey {
    pub fn node(name: impl Into<String>) -> Self {
        NodeKey::Node(name.into())
    }

    pub fn entry<K, V>(name: impl Into<String>, keys: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        NodeKey::Entry {
            name: name.into(),
            keys: keys
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn value(name: impl Into<String>, value: impl Into<String>) -> Self {
        NodeKey::Value {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Schema identifier, regardless of key shape
    pub fn name(&self) -> &str {
        match self {
            NodeKey::Node(name) => name,
            NodeKey::Entry { name, .. } | NodeKey::Value { name, .. } => name,
        }
    }

    pub fn is_entry(&self) -> bool {
        matches!(self, NodeKey::Entry { .. })
    }

    pub fn is_value(&self) -> bool {
        matches!(self, NodeKey::Value { .. })
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Node(name) => write!(f, "{}", name),
            NodeKey::Entry { name, keys } => {
                write!(f, "{}[", name)?;
                for (i, (k, v)) in keys.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}={}", k, v)?;
                }
                write!(f, "]")
            }
            NodeKey::Value { name, value } => write!(f, "{}[.={}]", name, value),
        }
    }
}
