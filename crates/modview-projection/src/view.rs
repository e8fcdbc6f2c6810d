//! Lazily materialized modification views.

use std::fmt;
use std::sync::Arc;

use modview_core::codec::{Codec, Step};
use modview_core::errors::Result;
use modview_core::tree::{ChangeNode, NodeKey, Payload};

use crate::children::enumerate;
use crate::kind::{aggregate_source_kind, resolve_kind, ModificationType};
use crate::lookup::lookup;
use crate::memo::Memo;

/// Change-tree nodes a view is built from.
#[derive(Debug, Clone)]
pub enum Backing {
    /// One node carrying the view's own data
    Single(Arc<ChangeNode>),
    /// Members of an aggregate, scattered among the children of `parent`
    Scattered {
        parent: Arc<ChangeNode>,
        members: Vec<Arc<ChangeNode>>,
    },
}

impl Backing {
    /// Nodes enumerated for the view's children
    pub fn child_nodes(&self) -> &[Arc<ChangeNode>] {
        match self {
            Backing::Single(node) => node.children(),
            Backing::Scattered { members, .. } => members,
        }
    }

    /// Resolve the first hop of a lookup
    pub fn first_hop(&self, key: &NodeKey) -> Option<&Arc<ChangeNode>> {
        match self {
            Backing::Single(node) => node.child(key),
            Backing::Scattered { members, .. } => members.iter().find(|m| m.key() == key),
        }
    }

    /// Node whose payloads hold the view's data
    pub fn payload_parent(&self) -> &Arc<ChangeNode> {
        match self {
            Backing::Single(node) => node,
            Backing::Scattered { parent, .. } => parent,
        }
    }

    /// Keys of the backing nodes, for diagnostics
    pub fn keys(&self) -> Vec<&NodeKey> {
        match self {
            Backing::Single(node) => vec![node.key()],
            Backing::Scattered { members, .. } => members.iter().map(|m| m.key()).collect(),
        }
    }
}

/// Typed, lazily computed view of one changed output node.
///
/// Identity (`step`, codec, backing) is fixed at construction. Kind, data and
/// children are computed on first access and published once; concurrent
/// callers always observe the same values.
pub struct ModificationView<C: Codec> {
    codec: Arc<C>,
    step: Step,
    backing: Backing,
    kind: Memo<ModificationType>,
    before: Memo<Option<C::Value>>,
    after: Memo<Option<C::Value>>,
    children: Memo<Vec<Arc<ModificationView<C>>>>,
}

impl<C: Codec> ModificationView<C> {
    /// View over a single modified node
    ///
    /// # Errors
    ///
    /// Whatever the codec reports when turning the node's key into a step.
    pub fn from_node(codec: Arc<C>, node: Arc<ChangeNode>) -> Result<Self> {
        let step = codec.step_of(Some(node.key()))?;
        Ok(Self::with_backing(codec, step, Backing::Single(node)))
    }

    /// Aggregate view over `members`, all children of `parent`
    ///
    /// # Errors
    ///
    /// Whatever the codec reports when producing the aggregate's step.
    pub fn aggregate(
        codec: Arc<C>,
        parent: Arc<ChangeNode>,
        members: Vec<Arc<ChangeNode>>,
    ) -> Result<Self> {
        let step = codec.step_of(None)?;
        Ok(Self::with_backing(
            codec,
            step,
            Backing::Scattered { parent, members },
        ))
    }

    fn with_backing(codec: Arc<C>, step: Step, backing: Backing) -> Self {
        Self {
            codec,
            step,
            backing,
            kind: Memo::new(),
            before: Memo::new(),
            after: Memo::new(),
            children: Memo::new(),
        }
    }

    pub fn step(&self) -> &Step {
        &self.step
    }

    pub fn codec(&self) -> &Arc<C> {
        &self.codec
    }

    pub fn backing(&self) -> &Backing {
        &self.backing
    }

    /// Output modification kind
    ///
    /// # Errors
    ///
    /// `ERR_INVARIANT_VIOLATION` when the backing carries no change.
    pub fn kind(&self) -> Result<ModificationType> {
        self.kind.get_or_try_init(|| self.load_kind()).copied()
    }

    fn load_kind(&self) -> Result<ModificationType> {
        let source = match &self.backing {
            Backing::Single(node) => node.kind(),
            Backing::Scattered { parent, .. } => aggregate_source_kind(
                self.carries_members(parent.before()),
                self.carries_members(parent.after()),
            ),
        };
        resolve_kind(
            source,
            self.codec.addressability(),
            self.backing.child_nodes(),
            &self.step,
        )
    }

    fn carries_members(&self, payload: Option<&Payload>) -> bool {
        let declared = self.codec.declared_keys();
        payload.is_some_and(|p| p.children().iter().any(|c| declared.contains(c.key())))
    }

    /// Value before the change, `None` when the node did not exist
    ///
    /// # Errors
    ///
    /// `ERR_DESERIALIZATION` when the payload does not fit the codec. The
    /// failure is not cached.
    pub fn before(&self) -> Result<Option<&C::Value>> {
        self.before
            .get_or_try_init(|| self.load_value("before", |n| n.before()))
            .map(Option::as_ref)
    }

    /// Value after the change, `None` when the node no longer exists
    ///
    /// # Errors
    ///
    /// `ERR_DESERIALIZATION` when the payload does not fit the codec. The
    /// failure is not cached.
    pub fn after(&self) -> Result<Option<&C::Value>> {
        self.after
            .get_or_try_init(|| self.load_value("after", |n| n.after()))
            .map(Option::as_ref)
    }

    fn load_value<F>(&self, side: &'static str, payload_of: F) -> Result<Option<C::Value>>
    where
        F: Fn(&ChangeNode) -> Option<&Payload>,
    {
        let loaded = match &self.backing {
            Backing::Single(node) => payload_of(node.as_ref())
                .map(|p| self.codec.deserialize(p))
                .transpose(),
            Backing::Scattered { parent, .. } => payload_of(parent.as_ref())
                .map(|p| self.codec.filter_from(p))
                .transpose()
                .map(Option::flatten),
        };
        loaded.map_err(|err| {
            tracing::debug!(step = %self.step, side, err.code = err.code(), "payload deserialization failed");
            err
        })
    }

    /// Modified children, flattened and merged, in a stable order
    pub fn children(&self) -> &[Arc<ModificationView<C>>] {
        self.children
            .get_or_init(|| enumerate(&self.codec, &self.backing))
    }

    /// Modified child identified by `step`
    ///
    /// Absent or unmodified children, and steps the codec does not know,
    /// yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// `ERR_INVARIANT_VIOLATION` when the codec decomposes the step
    /// inconsistently, or the codec's error when building the child view.
    pub fn child(&self, step: &Step) -> Result<Option<Arc<ModificationView<C>>>> {
        Ok(lookup(&self.codec, &self.backing, step)?.map(Arc::new))
    }

    /// Modified children with schema name `name`, whatever their case
    pub fn children_named(&self, name: &str) -> Vec<Arc<ModificationView<C>>> {
        self.children()
            .iter()
            .filter(|c| c.step.name() == name && !matches!(c.step, Step::Aggregate { .. }))
            .cloned()
            .collect()
    }

    /// Modified children with schema name `name` declared in choice case `case`
    pub fn children_in_case(&self, case: &str, name: &str) -> Vec<Arc<ModificationView<C>>> {
        self.children()
            .iter()
            .filter(|c| c.step.name() == name && c.step.case() == Some(case))
            .cloned()
            .collect()
    }

    /// # Errors
    ///
    /// As [`ModificationView::child`].
    pub fn child_container(&self, name: &str) -> Result<Option<Arc<ModificationView<C>>>> {
        self.child(&Step::node(name))
    }

    /// # Errors
    ///
    /// As [`ModificationView::child`].
    pub fn child_entry<K, V>(
        &self,
        name: &str,
        keys: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Option<Arc<ModificationView<C>>>>
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.child(&Step::entry(name, keys))
    }

    /// # Errors
    ///
    /// As [`ModificationView::child`].
    pub fn child_aggregate(&self, name: &str) -> Result<Option<Arc<ModificationView<C>>>> {
        self.child(&Step::aggregate(name))
    }
}

impl<C: Codec> fmt::Debug for ModificationView<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModificationView")
            .field("step", &self.step)
            .field("backing", &self.backing.keys())
            .field("kind", &self.kind)
            .finish()
    }
}
