#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;

use common::*;
use modview_core::codec::Step;
use modview_core::tree::{ChangeNode, NodeKey, Payload};
use modview_projection::ModificationType;

/// Device change touching every kind of child the schema offers
fn rich_change() -> Arc<ChangeNode> {
    let eth0_before = interface_payload("eth0", 1500);
    let eth0_after = Payload::map_entry(
        interface_key("eth0"),
        vec![
            Payload::leaf("name", "eth0"),
            Payload::leaf("mtu", 9000),
            Payload::container("stats", vec![Payload::leaf("rx", 1)]),
        ],
    );
    let eth0 = modified(
        eth0_before,
        eth0_after,
        vec![
            ChangeNode::written(Some(Payload::leaf("mtu", 1500)), Payload::leaf("mtu", 9000)),
            ChangeNode::written(
                None,
                Payload::container("stats", vec![Payload::leaf("rx", 1)]),
            ),
        ],
    );
    let eth1 = ChangeNode::deleted(interface_payload("eth1", 1500));
    let eth2 = ChangeNode::unmodified(interface_payload("eth2", 1500));

    let transport = modified(
        Payload::choice("transport", vec![]),
        Payload::choice(
            "transport",
            vec![Payload::container("tcp-opts", vec![])],
        ),
        vec![ChangeNode::written(None, Payload::container("tcp-opts", vec![]))],
    );

    let x = ChangeNode::written(None, Payload::container("x", vec![Payload::leaf("a", 1)]));
    let y = ChangeNode::deleted(Payload::container("y", vec![Payload::leaf("b", 2)]));

    modified(
        Payload::container(
            "device",
            vec![Payload::container("y", vec![Payload::leaf("b", 2)])],
        ),
        Payload::container(
            "device",
            vec![Payload::container("x", vec![Payload::leaf("a", 1)])],
        ),
        vec![
            x,
            touched("system", vec![]),
            interfaces(vec![eth0, eth1, eth2]),
            transport,
            y,
        ],
    )
}

fn assert_same_view(found: &View, expected: &View) {
    assert_eq!(found.step(), expected.step());
    assert_eq!(found.kind().unwrap(), expected.kind().unwrap());
    assert_eq!(found.before().unwrap(), expected.before().unwrap());
    assert_eq!(found.after().unwrap(), expected.after().unwrap());
    assert_eq!(found.backing().keys(), expected.backing().keys());
}

/// Every enumerated child, at every depth, is found again by its step
fn check_equivalence(view: &View) -> usize {
    let mut checked = 0;
    for child in view.children() {
        let found = view
            .child(child.step())
            .unwrap()
            .unwrap_or_else(|| panic!("lookup of {} found nothing", child.step()));
        assert_same_view(&found, child);
        checked += 1 + check_equivalence(child);
    }
    checked
}

#[test]
fn test_lookup_matches_enumeration_everywhere() {
    let root = project_device(rich_change());
    let checked = check_equivalence(&root);

    // system, interfaces, eth0, eth1, stats, tcp-opts, ext, x, y
    assert_eq!(checked, 9);
}

#[test]
fn test_lookup_matches_enumeration_through_transparent_layers() {
    let root = project_site(layered_change());
    let checked = check_equivalence(&root);

    // turbo, port[id=1], +qos-ext, qos, +ext, boost, +site-ext, z
    assert_eq!(checked, 8);
}

#[test]
fn test_aggregate_in_case_found_through_choice_node() {
    let root = project_site(layered_change());

    let ext = root.child_aggregate("ext").unwrap().expect("ext changed");
    assert_eq!(ext.backing().payload_parent().key(), &NodeKey::node("mode"));
    assert_eq!(ext.backing().keys(), vec![&NodeKey::node("boost")]);
    assert_eq!(ext.kind().unwrap(), ModificationType::Write);

    let without_mode = modified(
        Payload::container("site", vec![]),
        Payload::container("site", vec![Payload::container("z", vec![])]),
        vec![ChangeNode::written(None, Payload::container("z", vec![]))],
    );
    let root = project_site(without_mode);
    assert!(root.child_aggregate("ext").unwrap().is_none());
    assert!(root.child_aggregate("site-ext").unwrap().is_some());
}

#[test]
fn test_aggregate_children_found_through_scattered_backing() {
    let root = project_device(rich_change());
    let ext = root.child_aggregate("ext").unwrap().unwrap();

    assert_eq!(ext.kind().unwrap(), ModificationType::SubtreeModified);
    assert_eq!(steps(ext.children()), vec!["x", "y"]);

    let y = ext.child(&Step::node("y")).unwrap().unwrap();
    assert_eq!(y.kind().unwrap(), ModificationType::Delete);
}

#[test]
fn test_convenience_lookups() {
    let root = project_device(rich_change());

    let interfaces = root.child_container("interfaces").unwrap().unwrap();
    let eth0 = interfaces
        .child_entry("interface", [("name", "eth0")])
        .unwrap()
        .unwrap();
    assert_eq!(eth0.step(), &Step::entry("interface", [("name", "eth0")]));

    // eth2 exists in the tree but did not change
    assert!(interfaces
        .child_entry("interface", [("name", "eth2")])
        .unwrap()
        .is_none());
    assert!(interfaces
        .child_entry("interface", [("name", "eth9")])
        .unwrap()
        .is_none());
}

#[test]
fn test_case_child_needs_its_case() {
    let root = project_device(rich_change());

    assert!(root
        .child(&Step::node_in_case("tcp", "tcp-opts"))
        .unwrap()
        .is_some());
    assert!(root.child(&Step::node("tcp-opts")).unwrap().is_none());
}

#[test]
fn test_unknown_and_leaf_steps_are_absent() {
    let root = project_device(rich_change());

    assert!(root.child(&Step::node("no-such-thing")).unwrap().is_none());
    assert!(root.child(&Step::node("hostname")).unwrap().is_none());
    assert!(root.child(&Step::aggregate("other")).unwrap().is_none());
}

#[test]
fn test_lookup_does_not_require_enumeration() {
    let root = project_device(rich_change());
    let eth1 = root
        .child_container("interfaces")
        .unwrap()
        .unwrap()
        .child_entry("interface", [("name", "eth1")])
        .unwrap()
        .unwrap();

    assert_eq!(eth1.kind().unwrap(), ModificationType::Delete);
    assert!(eth1.after().unwrap().is_none());
    assert_eq!(
        eth1.before().unwrap().unwrap().get("mtu"),
        Some(&serde_json::json!(1500))
    );
}
