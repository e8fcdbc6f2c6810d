use std::sync::Arc;

use modview_core::schema::{CaseNode, CodecCache, SchemaCodec, SchemaNode};

/// Schema used across the codec tests
///
/// ```text
/// network
///   hostname            leaf
///   tags                leaf-list
///   system              container { contact leaf }
///   interface[name]     list { name, mtu leaves, counters container }
///   hops                unkeyed list { addr leaf }
///   transport           choice
///     tcp:  tcp-opts    container { window leaf }
///     udp:  udp-port    leaf
///           inner       choice { deep: deep container }
///   vendor              augmentation { vendor-id leaf, vendor-cfg container }
/// ```
#[allow(dead_code)]
pub fn network_schema() -> SchemaNode {
    SchemaNode::container(
        "network",
        vec![
            SchemaNode::leaf("hostname"),
            SchemaNode::leaf_list("tags"),
            SchemaNode::container("system", vec![SchemaNode::leaf("contact")]),
            SchemaNode::list(
                "interface",
                ["name"],
                vec![
                    SchemaNode::leaf("name"),
                    SchemaNode::leaf("mtu"),
                    SchemaNode::container("counters", vec![SchemaNode::leaf("rx")]),
                ],
            ),
            SchemaNode::unkeyed_list("hops", vec![SchemaNode::leaf("addr")]),
            SchemaNode::choice(
                "transport",
                vec![
                    CaseNode::new(
                        "tcp",
                        vec![SchemaNode::container(
                            "tcp-opts",
                            vec![SchemaNode::leaf("window")],
                        )],
                    ),
                    CaseNode::new(
                        "udp",
                        vec![
                            SchemaNode::leaf("udp-port"),
                            SchemaNode::choice(
                                "inner",
                                vec![CaseNode::new(
                                    "deep",
                                    vec![SchemaNode::container("deep", vec![])],
                                )],
                            ),
                        ],
                    ),
                ],
            ),
            SchemaNode::augmentation(
                "vendor",
                vec![
                    SchemaNode::leaf("vendor-id"),
                    SchemaNode::container("vendor-cfg", vec![SchemaNode::leaf("mode")]),
                ],
            ),
        ],
    )
}

#[allow(dead_code)]
pub fn network_codec(capacity: usize) -> Arc<SchemaCodec> {
    SchemaCodec::root(network_schema(), Arc::new(CodecCache::new(capacity)))
        .expect("network schema is valid")
}
