use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::tree::{NodeKey, Payload};

/// How a change-tree node changed, as reported by the producing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Neither this node nor anything below it changed
    Unmodified,
    /// Node came into existence as a side effect of a descendant write
    Appeared,
    /// Node vanished as a side effect of a descendant delete
    Disappeared,
    /// Node was explicitly written
    Write,
    /// Node was explicitly deleted
    Delete,
    /// Some descendant changed
    SubtreeModified,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChangeKind::Unmodified => "unmodified",
            ChangeKind::Appeared => "appeared",
            ChangeKind::Disappeared => "disappeared",
            ChangeKind::Write => "write",
            ChangeKind::Delete => "delete",
            ChangeKind::SubtreeModified => "subtree_modified",
        };
        f.write_str(name)
    }
}

/// One node of a change tree.
///
/// Nodes are immutable once built and shared through `Arc`, so views can hold
/// on to the parts of the tree they were created from.
///
/// Invariant: an [`ChangeKind::Unmodified`] node has `before == after` and no
/// modified descendants.
pub struct ChangeNode {
    key: NodeKey,
    kind: ChangeKind,
    before: Option<Payload>,
    after: Option<Payload>,
    children: Vec<Arc<ChangeNode>>,
    index: HashMap<NodeKey, usize>,
}

impl ChangeNode {
    pub fn builder(key: NodeKey, kind: ChangeKind) -> ChangeNodeBuilder {
        ChangeNodeBuilder {
            key,
            kind,
            before: None,
            after: None,
            children: Vec::new(),
        }
    }

    /// Node whose payload did not change
    pub fn unmodified(payload: Payload) -> Arc<Self> {
        Self::builder(payload.key().clone(), ChangeKind::Unmodified)
            .before(payload.clone())
            .after(payload)
            .build()
    }

    /// Node that was explicitly written, with no child-level detail
    pub fn written(before: Option<Payload>, after: Payload) -> Arc<Self> {
        let mut builder = Self::builder(after.key().clone(), ChangeKind::Write).after(after);
        builder.before = before;
        builder.build()
    }

    /// Node that was explicitly deleted
    pub fn deleted(before: Payload) -> Arc<Self> {
        Self::builder(before.key().clone(), ChangeKind::Delete)
            .before(before)
            .build()
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    pub fn before(&self) -> Option<&Payload> {
        self.before.as_ref()
    }

    pub fn after(&self) -> Option<&Payload> {
        self.after.as_ref()
    }

    /// Direct children in source order
    pub fn children(&self) -> &[Arc<ChangeNode>] {
        &self.children
    }

    /// Point lookup of a direct child, modified or not
    pub fn child(&self, key: &NodeKey) -> Option<&Arc<ChangeNode>> {
        self.index.get(key).map(|&i| &self.children[i])
    }

    pub fn is_modified(&self) -> bool {
        self.kind != ChangeKind::Unmodified
    }
}

impl fmt::Debug for ChangeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNode")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("children", &self.children.len())
            .finish()
    }
}

/// Builder for [`ChangeNode`].
#[derive(Debug)]
pub struct ChangeNodeBuilder {
    key: NodeKey,
    kind: ChangeKind,
    before: Option<Payload>,
    after: Option<Payload>,
    children: Vec<Arc<ChangeNode>>,
}

impl ChangeNodeBuilder {
    pub fn before(mut self, payload: Payload) -> Self {
        self.before = Some(payload);
        self
    }

    pub fn after(mut self, payload: Payload) -> Self {
        self.after = Some(payload);
        self
    }

    /// Append a child; a child with an already-present key replaces it in place
    pub fn child(mut self, child: Arc<ChangeNode>) -> Self {
        match self.children.iter().position(|c| c.key() == child.key()) {
            Some(pos) => self.children[pos] = child,
            None => self.children.push(child),
        }
        self
    }

    pub fn children(self, children: impl IntoIterator<Item = Arc<ChangeNode>>) -> Self {
        children.into_iter().fold(self, |b, c| b.child(c))
    }

    pub fn build(self) -> Arc<ChangeNode> {
        debug_assert!(
            self.kind != ChangeKind::Unmodified
                || (self.before == self.after && self.children.iter().all(|c| !c.is_modified())),
            "unmodified node {} carries a change",
            self.key
        );
        let index = self
            .children
            .iter()
            .enumerate()
            .map(|(i, c)| (c.key().clone(), i))
            .collect();
        Arc::new(ChangeNode {
            key: self.key,
            kind: self.kind,
            before: self.before,
            after: self.after,
            children: self.children,
            index,
        })
    }
}
