//! Targeted child lookup by output step.

use std::sync::Arc;

use modview_core::codec::{ChildCodec, Codec, Step};
use modview_core::errors::{ExErrorKind, ProjectionError, Result};
use modview_core::log_skip;
use modview_core::tree::{ChangeNode, NodeKey};

use crate::classify::{classify, StructuralClass};
use crate::view::{Backing, ModificationView};

const OP: &str = "lookup_child";

/// Find the modified child of `backing` identified by `step`
///
/// Yields the same view (by step and backing) as enumerating the children
/// and filtering by step.
///
/// # Errors
///
/// `ERR_INVARIANT_VIOLATION` when the codec decomposes an object step into no
/// hops or returns a transparent target.
pub(crate) fn lookup<C: Codec>(
    codec: &Arc<C>,
    backing: &Backing,
    step: &Step,
) -> Result<Option<ModificationView<C>>> {
    let target = match codec.child_for_step(step) {
        Ok(target) => target,
        Err(err) if err.kind() == ExErrorKind::UnknownChild => {
            log_skip!(OP, &err, step = %step);
            return Ok(None);
        }
        Err(err) => return Err(err),
    };
    tracing::trace!(step = %step, hop_count = target.hops.len(), "step decomposed");

    match target.codec {
        ChildCodec::Transparent(_) => Err(ProjectionError::TransparentStepTarget {
            step: step.to_string(),
        }
        .into()),
        ChildCodec::Aggregate(aggregate) => match target.hops.split_first() {
            None => gather(aggregate, backing.payload_parent()),
            Some((first, rest)) => match follow(backing, first, rest) {
                Some(parent) => gather(aggregate, parent),
                None => Ok(None),
            },
        },
        ChildCodec::Object(object) => {
            let Some((first, rest)) = target.hops.split_first() else {
                return Err(ProjectionError::EmptyStepDecomposition {
                    step: step.to_string(),
                }
                .into());
            };
            match follow(backing, first, rest) {
                Some(node) if node.is_modified() => {
                    ModificationView::from_node(object, Arc::clone(node)).map(Some)
                }
                _ => Ok(None),
            }
        }
    }
}

fn follow<'a>(backing: &'a Backing, first: &NodeKey, rest: &[NodeKey]) -> Option<&'a Arc<ChangeNode>> {
    let mut current = backing.first_hop(first);
    for hop in rest {
        current = current.and_then(|node| node.child(hop));
    }
    current
}

/// Collect the modified members of an aggregate from the children of `parent`
///
/// Members are kept in the parent's child order and filtered the same way
/// enumeration filters them.
pub(crate) fn gather<C: Codec>(
    aggregate: Arc<C>,
    parent: &Arc<ChangeNode>,
) -> Result<Option<ModificationView<C>>> {
    let declared = aggregate.declared_keys();
    let members: Vec<_> = parent
        .children()
        .iter()
        .filter(|member| {
            member.is_modified()
                && declared.contains(member.key())
                && classify(member) != StructuralClass::NotAddressable
        })
        .cloned()
        .collect();
    if members.is_empty() {
        return Ok(None);
    }
    ModificationView::aggregate(aggregate, Arc::clone(parent), members).map(Some)
}
