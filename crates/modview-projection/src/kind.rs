//! Output modification kinds and the rules collapsing source kinds into them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use modview_core::codec::Addressability;
use modview_core::errors::{ProjectionError, Result};
use modview_core::tree::{ChangeKind, ChangeNode};

use crate::classify::{classify_recursive, StructuralClass};

/// Modification kind reported to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModificationType {
    /// Node was created or replaced as a whole
    Write,
    Delete,
    /// Node stayed in place; inspect its children for the detail
    SubtreeModified,
}

impl fmt::Display for ModificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModificationType::Write => "write",
            ModificationType::Delete => "delete",
            ModificationType::SubtreeModified => "subtree_modified",
        };
        f.write_str(name)
    }
}

/// Collapse a source kind into an output kind
///
/// `children` are the nodes scanned when the codec reports mixed
/// addressability; the scan stops at the first child that cannot be
/// addressed. `subject` names the node in the error.
///
/// # Errors
///
/// `ERR_INVARIANT_VIOLATION` for an [`ChangeKind::Unmodified`] source.
pub fn resolve_kind(
    source: ChangeKind,
    addressability: Addressability,
    children: &[Arc<ChangeNode>],
    subject: impl fmt::Display,
) -> Result<ModificationType> {
    match source {
        ChangeKind::Appeared | ChangeKind::Write => Ok(ModificationType::Write),
        ChangeKind::Disappeared | ChangeKind::Delete => Ok(ModificationType::Delete),
        ChangeKind::SubtreeModified => Ok(match addressability {
            Addressability::Addressable => ModificationType::SubtreeModified,
            Addressability::Unaddressable => ModificationType::Write,
            Addressability::Mixed => {
                if children
                    .iter()
                    .any(|c| classify_recursive(c) == StructuralClass::NotAddressable)
                {
                    ModificationType::Write
                } else {
                    ModificationType::SubtreeModified
                }
            }
        }),
        ChangeKind::Unmodified => Err(ProjectionError::UnmodifiedNode {
            key: subject.to_string(),
        }
        .into()),
    }
}

/// Source kind of an aggregate, from whether its filtered value exists on
/// either side
pub fn aggregate_source_kind(before_present: bool, after_present: bool) -> ChangeKind {
    match (before_present, after_present) {
        (false, false) => ChangeKind::Unmodified,
        (false, true) => ChangeKind::Appeared,
        (true, false) => ChangeKind::Disappeared,
        (true, true) => ChangeKind::SubtreeModified,
    }
}
