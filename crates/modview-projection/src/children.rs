//! Child enumeration
//!
//! Walks the modified children of a backing, looking through transparent
//! layers, expanding keyed lists into their entries and merging aggregate
//! members into one view per aggregate.

use std::sync::Arc;

use modview_core::codec::{ChildCodec, Codec, Step};
use modview_core::tree::ChangeNode;
use modview_core::log_skip;

use crate::classify::{classify, StructuralClass};
use crate::view::{Backing, ModificationView};

const OP: &str = "enumerate_children";

struct PendingAggregate<C> {
    step: Step,
    codec: Arc<C>,
    parent: Arc<ChangeNode>,
    members: Vec<Arc<ChangeNode>>,
}

struct Enumeration<C: Codec> {
    views: Vec<Arc<ModificationView<C>>>,
    aggregates: Vec<PendingAggregate<C>>,
}

/// Build the child views of a backing
///
/// Children that cannot be projected are logged at debug level and skipped.
pub(crate) fn enumerate<C: Codec>(codec: &Arc<C>, backing: &Backing) -> Vec<Arc<ModificationView<C>>> {
    let mut enumeration = Enumeration {
        views: Vec::new(),
        aggregates: Vec::new(),
    };
    enumeration.populate(codec, backing.payload_parent(), backing.child_nodes());
    let views = enumeration.finish();

    tracing::trace!(codec = codec.name(), child_count = views.len(), "children enumerated");
    views
}

impl<C: Codec> Enumeration<C> {
    fn populate(&mut self, codec: &Arc<C>, parent: &Arc<ChangeNode>, nodes: &[Arc<ChangeNode>]) {
        for node in nodes {
            if !node.is_modified() {
                continue;
            }
            let class = classify(node);
            if class == StructuralClass::NotAddressable {
                continue;
            }

            let child = match codec.resolve_child(node.key()) {
                Ok(child) => child,
                Err(err) => {
                    log_skip!(OP, &err, key = %node.key(), class = %class);
                    continue;
                }
            };

            match child {
                ChildCodec::Transparent(transparent) => {
                    self.populate(&transparent, node, node.children());
                }
                ChildCodec::Aggregate(aggregate) => self.defer(aggregate, parent, node),
                ChildCodec::Object(object) => match class {
                    StructuralClass::TransparentList => {
                        for entry in node.children().iter().filter(|e| e.is_modified()) {
                            self.push(&object, entry);
                        }
                    }
                    StructuralClass::TransparentContainer => {
                        self.populate(&object, node, node.children());
                    }
                    StructuralClass::VisibleContainer | StructuralClass::Unknown => {
                        self.push(&object, node);
                    }
                    StructuralClass::NotAddressable => {}
                },
            }
        }
    }

    fn push(&mut self, codec: &Arc<C>, node: &Arc<ChangeNode>) {
        match ModificationView::from_node(Arc::clone(codec), Arc::clone(node)) {
            Ok(view) => self.views.push(Arc::new(view)),
            Err(err) => log_skip!(OP, &err, key = %node.key()),
        }
    }

    fn defer(&mut self, codec: Arc<C>, parent: &Arc<ChangeNode>, node: &Arc<ChangeNode>) {
        let step = match codec.step_of(None) {
            Ok(step) => step,
            Err(err) => {
                log_skip!(OP, &err, key = %node.key());
                return;
            }
        };
        // same codec, or the same aggregate re-resolved after cache eviction
        let pending = self.aggregates.iter_mut().find(|p| {
            Arc::ptr_eq(&p.codec, &codec) || (p.step == step && Arc::ptr_eq(&p.parent, parent))
        });
        match pending {
            Some(pending) => pending.members.push(Arc::clone(node)),
            None => self.aggregates.push(PendingAggregate {
                step,
                codec,
                parent: Arc::clone(parent),
                members: vec![Arc::clone(node)],
            }),
        }
    }

    fn finish(mut self) -> Vec<Arc<ModificationView<C>>> {
        for PendingAggregate {
            step,
            codec,
            parent,
            members,
        } in self.aggregates
        {
            match ModificationView::aggregate(codec, parent, members) {
                Ok(view) => self.views.push(Arc::new(view)),
                Err(err) => log_skip!(OP, &err, step = %step),
            }
        }
        self.views
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modview_core::schema::{CaseNode, CodecCache, SchemaCodec, SchemaNode};
    use modview_core::tree::{ChangeKind, NodeKey, Payload};

    fn root_codec() -> Arc<SchemaCodec> {
        let schema = SchemaNode::container(
            "top",
            vec![
                SchemaNode::leaf("hostname"),
                SchemaNode::container("a", vec![]),
                SchemaNode::list("item", ["id"], vec![SchemaNode::leaf("id")]),
                SchemaNode::choice(
                    "mode",
                    vec![CaseNode::new("fast", vec![SchemaNode::container("turbo", vec![])])],
                ),
                SchemaNode::augmentation(
                    "ext",
                    vec![SchemaNode::container("x", vec![]), SchemaNode::container("y", vec![])],
                ),
            ],
        );
        SchemaCodec::root(schema, Arc::new(CodecCache::new(32))).unwrap()
    }

    fn entry(id: &str) -> Arc<ChangeNode> {
        let key = NodeKey::entry("item", [("id", id)]);
        ChangeNode::written(
            None,
            Payload::map_entry(key, vec![Payload::leaf("id", id)]),
        )
    }

    fn steps(views: &[Arc<ModificationView<SchemaCodec>>]) -> Vec<String> {
        views.iter().map(|v| v.step().to_string()).collect()
    }

    #[test]
    fn test_order_plain_then_aggregates() {
        let root = ChangeNode::builder(NodeKey::node("top"), ChangeKind::SubtreeModified)
            .after(Payload::container("top", vec![]))
            .child(ChangeNode::written(None, Payload::container("x", vec![])))
            .child(ChangeNode::written(None, Payload::leaf("hostname", "r1")))
            .child(
                ChangeNode::builder(NodeKey::node("item"), ChangeKind::SubtreeModified)
                    .after(Payload::map("item", vec![]))
                    .child(entry("1"))
                    .child(ChangeNode::unmodified(Payload::map_entry(
                        NodeKey::entry("item", [("id", "2")]),
                        vec![],
                    )))
                    .child(entry("3"))
                    .build(),
            )
            .child(
                ChangeNode::builder(NodeKey::node("mode"), ChangeKind::SubtreeModified)
                    .after(Payload::choice("mode", vec![]))
                    .child(ChangeNode::written(None, Payload::container("turbo", vec![])))
                    .build(),
            )
            .child(ChangeNode::written(None, Payload::container("y", vec![])))
            .child(ChangeNode::unmodified(Payload::container("a", vec![])))
            .build();

        let views = enumerate(&root_codec(), &Backing::Single(root));
        assert_eq!(
            steps(&views),
            vec!["item[id=1]", "item[id=3]", "fast/turbo", "+ext"]
        );
        let aggregate = &views[3];
        assert_eq!(aggregate.backing().child_nodes().len(), 2);
    }

    #[test]
    fn test_unknown_child_is_skipped() {
        let root = ChangeNode::builder(NodeKey::node("top"), ChangeKind::SubtreeModified)
            .after(Payload::container("top", vec![]))
            .child(ChangeNode::written(None, Payload::container("stray", vec![])))
            .child(ChangeNode::written(None, Payload::container("a", vec![])))
            .build();

        let views = enumerate(&root_codec(), &Backing::Single(root));
        assert_eq!(steps(&views), vec!["a"]);
    }
}
