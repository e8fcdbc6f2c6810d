use std::sync::Arc;

use modview_core::codec::ChildCodec;
use modview_core::schema::{CaseNode, CodecCache, SchemaCodec, SchemaNode};
use modview_core::tree::{ChangeKind, ChangeNode, NodeKey, Payload};
use modview_projection::ModificationView;

pub type View = ModificationView<SchemaCodec>;

/// Device schema shared by the projection tests
///
/// ```text
/// device                      (mixed)
///   hostname                  leaf
///   system                    container { contact }            (unaddressable)
///   interfaces                container                        (addressable)
///     interface[name]         list { name, mtu, stats { rx } }
///   transport                 choice
///     tcp: tcp-opts           container { window }
///     udp: udp-port           leaf
///   ext                       augmentation { x { a }, y { b }, flag }
/// ```
#[allow(dead_code)]
pub fn device_schema() -> SchemaNode {
    SchemaNode::container(
        "device",
        vec![
            SchemaNode::leaf("hostname"),
            SchemaNode::container("system", vec![SchemaNode::leaf("contact")]),
            SchemaNode::container(
                "interfaces",
                vec![SchemaNode::list(
                    "interface",
                    ["name"],
                    vec![
                        SchemaNode::leaf("name"),
                        SchemaNode::leaf("mtu"),
                        SchemaNode::container("stats", vec![SchemaNode::leaf("rx")]),
                    ],
                )],
            ),
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
                    CaseNode::new("udp", vec![SchemaNode::leaf("udp-port")]),
                ],
            ),
            SchemaNode::augmentation(
                "ext",
                vec![
                    SchemaNode::container("x", vec![SchemaNode::leaf("a")]),
                    SchemaNode::container("y", vec![SchemaNode::leaf("b")]),
                    SchemaNode::leaf("flag"),
                ],
            ),
        ],
    )
}

#[allow(dead_code)]
pub fn device_codec() -> Arc<SchemaCodec> {
    SchemaCodec::root(device_schema(), Arc::new(CodecCache::new(64)))
        .expect("device schema is valid")
}

#[allow(dead_code)]
pub fn root_codec() -> ChildCodec<SchemaCodec> {
    ChildCodec::Object(device_codec())
}

/// Schema whose root only holds containers
#[allow(dead_code)]
pub fn catalog_codec() -> ChildCodec<SchemaCodec> {
    let schema = SchemaNode::container(
        "catalog",
        vec![
            SchemaNode::container("shelf", vec![SchemaNode::leaf("label")]),
            SchemaNode::container("bin", vec![]),
        ],
    );
    ChildCodec::Object(
        SchemaCodec::root(schema, Arc::new(CodecCache::new(8))).expect("catalog schema is valid"),
    )
}

/// Structurally modified node with the given before and after payloads
#[allow(dead_code)]
pub fn modified(
    before: Payload,
    after: Payload,
    children: Vec<Arc<ChangeNode>>,
) -> Arc<ChangeNode> {
    ChangeNode::builder(after.key().clone(), ChangeKind::SubtreeModified)
        .before(before)
        .after(after)
        .children(children)
        .build()
}

/// Structurally modified container whose payloads carry no members
#[allow(dead_code)]
pub fn touched(name: &str, children: Vec<Arc<ChangeNode>>) -> Arc<ChangeNode> {
    modified(
        Payload::container(name, vec![]),
        Payload::container(name, vec![]),
        children,
    )
}

#[allow(dead_code)]
pub fn interface_key(name: &str) -> NodeKey {
    NodeKey::entry("interface", [("name", name)])
}

#[allow(dead_code)]
pub fn interface_payload(name: &str, mtu: u32) -> Payload {
    Payload::map_entry(
        interface_key(name),
        vec![Payload::leaf("name", name), Payload::leaf("mtu", mtu)],
    )
}

/// `interfaces` container holding the given interface list children
#[allow(dead_code)]
pub fn interfaces(entries: Vec<Arc<ChangeNode>>) -> Arc<ChangeNode> {
    let list = ChangeNode::builder(NodeKey::node("interface"), ChangeKind::SubtreeModified)
        .before(Payload::map("interface", vec![]))
        .after(Payload::map("interface", vec![]))
        .children(entries)
        .build();
    touched("interfaces", vec![list])
}

/// Device root without a hostname, so the mixed scan only sees containers
#[allow(dead_code)]
pub fn device(children: Vec<Arc<ChangeNode>>) -> Arc<ChangeNode> {
    touched("device", children)
}

#[allow(dead_code)]
pub fn project_device(root: Arc<ChangeNode>) -> Arc<View> {
    modview_projection::project(root, root_codec())
        .expect("projection succeeds")
        .expect("root is modified")
}

#[allow(dead_code)]
pub fn steps(views: &[Arc<View>]) -> Vec<String> {
    views.iter().map(|v| v.step().to_string()).collect()
}

/// Schema with aggregates reached through transparent layers
///
/// ```text
/// site                        (mixed)
///   mode                      choice
///     fast: turbo             container
///           ext               augmentation { boost { level } }
///     slow: idle              leaf
///   site-ext                  augmentation { z }
///   port[id]                  list { id, qos-ext augmentation { qos { prio } } }
/// ```
#[allow(dead_code)]
pub fn site_codec() -> ChildCodec<SchemaCodec> {
    let schema = SchemaNode::container(
        "site",
        vec![
            SchemaNode::choice(
                "mode",
                vec![
                    CaseNode::new(
                        "fast",
                        vec![
                            SchemaNode::container("turbo", vec![]),
                            SchemaNode::augmentation(
                                "ext",
                                vec![SchemaNode::container(
                                    "boost",
                                    vec![SchemaNode::leaf("level")],
                                )],
                            ),
                        ],
                    ),
                    CaseNode::new("slow", vec![SchemaNode::leaf("idle")]),
                ],
            ),
            SchemaNode::augmentation("site-ext", vec![SchemaNode::container("z", vec![])]),
            SchemaNode::list(
                "port",
                ["id"],
                vec![
                    SchemaNode::leaf("id"),
                    SchemaNode::augmentation(
                        "qos-ext",
                        vec![SchemaNode::container("qos", vec![SchemaNode::leaf("prio")])],
                    ),
                ],
            ),
        ],
    );
    ChildCodec::Object(
        SchemaCodec::root(schema, Arc::new(CodecCache::new(32))).expect("site schema is valid"),
    )
}

/// Site change touching the in-case aggregate, the top-level aggregate and
/// the aggregate under a list entry
#[allow(dead_code)]
pub fn layered_change() -> Arc<ChangeNode> {
    let boost = Payload::container("boost", vec![Payload::leaf("level", 3)]);
    let mode = modified(
        Payload::choice("mode", vec![]),
        Payload::choice(
            "mode",
            vec![boost.clone(), Payload::container("turbo", vec![])],
        ),
        vec![
            ChangeNode::written(None, boost),
            ChangeNode::written(None, Payload::container("turbo", vec![])),
        ],
    );

    let port_key = NodeKey::entry("port", [("id", "1")]);
    let qos = Payload::container("qos", vec![Payload::leaf("prio", 1)]);
    let entry = modified(
        Payload::map_entry(port_key.clone(), vec![Payload::leaf("id", "1")]),
        Payload::map_entry(port_key, vec![Payload::leaf("id", "1"), qos.clone()]),
        vec![ChangeNode::written(None, qos)],
    );
    let ports = modified(
        Payload::map("port", vec![]),
        Payload::map("port", vec![]),
        vec![entry],
    );

    let z = Payload::container("z", vec![]);
    modified(
        Payload::container("site", vec![]),
        Payload::container("site", vec![z.clone()]),
        vec![mode, ChangeNode::written(None, z), ports],
    )
}

#[allow(dead_code)]
pub fn project_site(root: Arc<ChangeNode>) -> Arc<View> {
    modview_projection::project(root, site_codec())
        .expect("projection succeeds")
        .expect("root is modified")
}
