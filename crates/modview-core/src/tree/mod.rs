//! Change-tree input model.
//!
//! A change tree is produced by an upstream store when a transaction commits.
//! Every [`ChangeNode`] records how its subtree changed together with the
//! before/after [`Payload`]s. The projection engine only ever reads it.

pub mod key;
pub mod node;
pub mod payload;

pub use key::NodeKey;
pub use node::{ChangeKind, ChangeNode, ChangeNodeBuilder};
pub use payload::{Payload, PayloadBody, PayloadShape};
