//! Listener-facing wrapping of projected roots.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use modview_core::codec::{ChildCodec, Codec, Step};
use modview_core::errors::Result;
use modview_core::tree::ChangeNode;

use crate::project;
use crate::view::ModificationView;

/// Logical datastore a change was committed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalDatastore {
    Configuration,
    Operational,
}

impl fmt::Display for LogicalDatastore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogicalDatastore::Configuration => "configuration",
            LogicalDatastore::Operational => "operational",
        };
        f.write_str(name)
    }
}

/// One change-tree root as delivered by the store
#[derive(Debug)]
pub struct DataTreeCandidate<C> {
    /// Output-level path from the datastore root to `root`
    pub root_path: Vec<Step>,
    pub root: Arc<ChangeNode>,
    pub codec: ChildCodec<C>,
}

/// Projected change to one subtree, handed to listeners.
pub struct DataTreeModification<C: Codec> {
    datastore: LogicalDatastore,
    root_path: Vec<Step>,
    root_view: Arc<ModificationView<C>>,
}

impl<C: Codec> DataTreeModification<C> {
    pub fn datastore(&self) -> LogicalDatastore {
        self.datastore
    }

    pub fn root_path(&self) -> &[Step] {
        &self.root_path
    }

    pub fn root_view(&self) -> &Arc<ModificationView<C>> {
        &self.root_view
    }
}

impl<C: Codec> fmt::Debug for DataTreeModification<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataTreeModification")
            .field("datastore", &self.datastore)
            .field("root_path", &self.root_path)
            .field("root_view", &self.root_view)
            .finish()
    }
}

/// Project a batch of candidates from one datastore
///
/// Candidates whose root is unmodified produce no modification.
///
/// # Errors
///
/// The first error raised while projecting a root.
pub fn project_candidates<C, I>(
    datastore: LogicalDatastore,
    candidates: I,
) -> Result<Vec<DataTreeModification<C>>>
where
    C: Codec,
    I: IntoIterator<Item = DataTreeCandidate<C>>,
{
    let mut out = Vec::new();
    for candidate in candidates {
        if let Some(root_view) = project(candidate.root, candidate.codec)? {
            out.push(DataTreeModification {
                datastore,
                root_path: candidate.root_path,
                root_view,
            });
        }
    }
    Ok(out)
}
