//! Codec resolver boundary.
//!
//! A codec binds one schema node to its typed representation. The projection
//! engine never looks inside a codec; it only asks it to resolve children,
//! translate payloads and decompose output steps into change-tree hops.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::{ProjectionError, Result};
use crate::tree::{NodeKey, Payload};

/// Output-level identity of a modification.
///
/// `case` names the choice case a child was declared in, when it was reached
/// through one; it plays no part in change-tree addressing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    /// A single addressable object such as a container
    Node { name: String, case: Option<String> },
    /// One entry of a uniquely-keyed list
    Entry {
        name: String,
        case: Option<String>,
        keys: BTreeMap<String, String>,
    },
    /// Synthetic identity of an aggregate assembled from scattered siblings
    Aggregate { name: String },
}

impl Step {
    pub fn node(name: impl Into<String>) -> Self {
        Step::Node {
            name: name.into(),
            case: None,
        }
    }

    pub fn node_in_case(case: impl Into<String>, name: impl Into<String>) -> Self {
        Step::Node {
            name: name.into(),
            case: Some(case.into()),
        }
    }

    pub fn entry<K, V>(name: impl Into<String>, keys: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Step::Entry {
            name: name.into(),
            case: None,
            keys: keys
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn aggregate(name: impl Into<String>) -> Self {
        Step::Aggregate { name: name.into() }
    }

    /// Move this step into the given choice case
    pub fn in_case(self, case: impl Into<String>) -> Self {
        match self {
            Step::Node { name, .. } => Step::Node {
                name,
                case: Some(case.into()),
            },
            Step::Entry { name, keys, .. } => Step::Entry {
                name,
                case: Some(case.into()),
                keys,
            },
            aggregate @ Step::Aggregate { .. } => aggregate,
        }
    }

    /// Schema name of the modified object
    pub fn name(&self) -> &str {
        match self {
            Step::Node { name, .. } | Step::Entry { name, .. } | Step::Aggregate { name } => name,
        }
    }

    pub fn case(&self) -> Option<&str> {
        match self {
            Step::Node { case, .. } | Step::Entry { case, .. } => case.as_deref(),
            Step::Aggregate { .. } => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(case) = self.case() {
            write!(f, "{}/", case)?;
        }
        match self {
            Step::Node { name, .. } => write!(f, "{}", name),
            Step::Entry { name, keys, .. } => {
                write!(f, "{}[", name)?;
                for (i, (k, v)) in keys.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}={}", k, v)?;
                }
                write!(f, "]")
            }
            Step::Aggregate { name } => write!(f, "+{}", name),
        }
    }
}

/// Whether a codec's descendants can each be referenced individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Addressability {
    /// Every child is addressable
    Addressable,
    /// No child is addressable
    Unaddressable,
    /// Some children are addressable, some are not
    Mixed,
}

/// Kind tag of a resolved child codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecKind {
    Object,
    Aggregate,
    Transparent,
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CodecKind::Object => "object",
            CodecKind::Aggregate => "aggregate",
            CodecKind::Transparent => "transparent",
        };
        f.write_str(name)
    }
}

/// A child codec together with its kind.
#[derive(Debug)]
pub enum ChildCodec<C> {
    /// Single addressable value
    Object(Arc<C>),
    /// Value collected from several sibling keys
    Aggregate(Arc<C>),
    /// Grouping construct whose children are inlined into the parent
    Transparent(Arc<C>),
}

impl<C> ChildCodec<C> {
    pub fn codec(&self) -> &Arc<C> {
        match self {
            ChildCodec::Object(c) | ChildCodec::Aggregate(c) | ChildCodec::Transparent(c) => c,
        }
    }

    pub fn kind(&self) -> CodecKind {
        match self {
            ChildCodec::Object(_) => CodecKind::Object,
            ChildCodec::Aggregate(_) => CodecKind::Aggregate,
            ChildCodec::Transparent(_) => CodecKind::Transparent,
        }
    }
}

impl<C> Clone for ChildCodec<C> {
    fn clone(&self) -> Self {
        match self {
            ChildCodec::Object(c) => ChildCodec::Object(c.clone()),
            ChildCodec::Aggregate(c) => ChildCodec::Aggregate(c.clone()),
            ChildCodec::Transparent(c) => ChildCodec::Transparent(c.clone()),
        }
    }
}

/// Result of decomposing an output step.
#[derive(Debug)]
pub struct StepTarget<C> {
    /// Codec of the step's target
    pub codec: ChildCodec<C>,
    /// Change-tree keys to follow from the current node, in order
    ///
    /// For an aggregate target they lead to the node whose children carry
    /// the members; empty when those are the current node's own children.
    pub hops: Vec<NodeKey>,
}

/// Schema-bound translator between change-tree payloads and typed values.
///
/// Implementations are immutable for the lifetime of a schema generation and
/// are shared across threads.
pub trait Codec: fmt::Debug + Send + Sync + Sized + 'static {
    /// Typed value produced by deserialization
    type Value: fmt::Debug + Send + Sync + 'static;

    /// Name used in diagnostics
    fn name(&self) -> &str;

    /// Child-addressability summary of this codec
    fn addressability(&self) -> Addressability;

    /// Resolve the codec of a direct change-tree child
    ///
    /// # Errors
    ///
    /// `ERR_UNKNOWN_CHILD` when the schema has no such child.
    fn resolve_child(&self, key: &NodeKey) -> Result<ChildCodec<Self>>;

    /// Decompose an output step into change-tree hops plus the target codec
    ///
    /// # Errors
    ///
    /// `ERR_UNKNOWN_CHILD` when the step is not a valid child of this codec.
    fn child_for_step(&self, step: &Step) -> Result<StepTarget<Self>>;

    /// Output step of a node this codec describes
    ///
    /// Aggregate codecs ignore `key` and return their synthetic identity.
    ///
    /// # Errors
    ///
    /// `ERR_INVALID_INPUT` when the key cannot identify an instance of this codec.
    fn step_of(&self, key: Option<&NodeKey>) -> Result<Step>;

    /// Translate a payload into a typed value
    ///
    /// # Errors
    ///
    /// `ERR_DESERIALIZATION` when the payload does not match the codec.
    fn deserialize(&self, payload: &Payload) -> Result<Self::Value>;

    /// Keys whose nodes make up one aggregate value; empty for other kinds
    fn declared_keys(&self) -> &[NodeKey] {
        &[]
    }

    /// Extract an aggregate's value from the payload of its parent
    ///
    /// Returns `None` when none of the declared children are present.
    ///
    /// # Errors
    ///
    /// `ERR_DESERIALIZATION` for malformed members, `ERR_INVARIANT_VIOLATION`
    /// when called on a codec that is not an aggregate.
    fn filter_from(&self, _parent: &Payload) -> Result<Option<Self::Value>> {
        Err(ProjectionError::NotAnAggregate {
            codec: self.name().to_string(),
        }
        .into())
    }
}
