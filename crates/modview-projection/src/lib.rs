//! ModView Projection - lazy typed views over change trees
//!
//! Turns a schema-level change tree into [`ModificationView`]s that compute
//! their kind, data and children on first access:
//! - `classify`: structural classification of change-tree nodes
//! - `kind`: collapsing source kinds into `Write | Delete | SubtreeModified`
//! - `view`: the memoized view itself, with enumeration and targeted lookup
//!
//! ## Logging Ownership
//!
//! The entry points in this module own lifecycle logging (`log_op_start!`,
//! `log_op_end!`, `log_op_error!`). Enumeration and lookup only emit debug
//! diagnostics for children they skip.

pub mod candidate;
pub mod classify;
mod children;
pub mod kind;
mod lookup;
pub mod memo;
pub mod view;

use std::sync::Arc;
use std::time::Instant;

use modview_core::codec::{ChildCodec, Codec};
use modview_core::errors::{ProjectionError, Result};
use modview_core::tree::ChangeNode;
use modview_core::{log_op_end, log_op_error, log_op_start};

pub use candidate::{project_candidates, DataTreeCandidate, DataTreeModification, LogicalDatastore};
pub use classify::{classify, classify_recursive, StructuralClass};
pub use kind::ModificationType;
pub use view::{Backing, ModificationView};

/// Project a change-tree root through its codec
///
/// Returns `Ok(None)` when nothing under `root` changed. An aggregate codec
/// projects the aggregate carried by `root`'s children.
///
/// # Errors
///
/// `ERR_INVARIANT_VIOLATION` for a transparent root codec, or the codec's
/// error when building the root view.
pub fn project<C: Codec>(
    root: Arc<ChangeNode>,
    codec: ChildCodec<C>,
) -> Result<Option<Arc<ModificationView<C>>>> {
    log_op_start!("project", key = %root.key(), codec = codec.codec().name());
    let start = Instant::now();

    let result = project_impl(root, codec).map_err(|e| {
        log_op_error!(
            "project",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "project",
        duration_ms = start.elapsed().as_millis() as u64,
        projected = result.is_some()
    );
    Ok(result)
}

fn project_impl<C: Codec>(
    root: Arc<ChangeNode>,
    codec: ChildCodec<C>,
) -> Result<Option<Arc<ModificationView<C>>>> {
    if !root.is_modified() {
        return Ok(None);
    }
    match codec {
        ChildCodec::Object(object) => {
            ModificationView::from_node(object, root).map(|v| Some(Arc::new(v)))
        }
        ChildCodec::Aggregate(aggregate) => {
            lookup::gather(aggregate, &root).map(|v| v.map(Arc::new))
        }
        ChildCodec::Transparent(_) => Err(ProjectionError::TransparentStepTarget {
            step: root.key().to_string(),
        }
        .into()),
    }
}

/// Project several roots, dropping the unmodified ones
///
/// # Errors
///
/// The first error raised by [`project`].
pub fn project_batch<C, I>(roots: I) -> Result<Vec<Arc<ModificationView<C>>>>
where
    C: Codec,
    I: IntoIterator<Item = (Arc<ChangeNode>, ChildCodec<C>)>,
{
    let mut views = Vec::new();
    for (root, codec) in roots {
        if let Some(view) = project(root, codec)? {
            views.push(view);
        }
    }
    Ok(views)
}
