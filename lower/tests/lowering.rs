// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Fabric exports ingested, lowered and checked against sample flows

#![allow(clippy::unwrap_used, clippy::expect_used)] // valid in tests

use fabric_lower::{derive_topology, lower};
use model::{DEFAULT_VRF, Flow, InterfaceType, LineAction};
use policy::{Diagnostics, PolicyGraph, ingest};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::net::Ipv4Addr;

const CLIENT: Ipv4Addr = Ipv4Addr::new(10, 2, 2, 2);
const SERVER: Ipv4Addr = Ipv4Addr::new(10, 1, 1, 10);

fn tcp(dst_port: u16) -> Flow {
    Flow::tcp(CLIENT, 40000, SERVER, dst_port)
}

fn leaf(id: &str, name: &str) -> Value {
    json!({"fabricNodePEp": {"attributes": {"id": id, "name": name, "role": "leaf"}}})
}

/// One tenant with an EPG on `eth1/1` of leaf 101 providing contract `C`, whose
/// filter has the single `entry`
fn tenant(entry: &Value, epg_extra: &[Value], tenant_extra: &[Value]) -> Value {
    let mut epg_children = vec![
        json!({"fvRsBd": {"attributes": {"tnFvBDName": "BD"}}}),
        json!({"fvRsProv": {"attributes": {"tnVzBrCPName": "C"}}}),
        json!({"fvRsPathAtt": {"attributes": {
            "tDn": "topology/pod-1/paths-101/pathep-[eth1/1]",
            "encap": "vlan-100"}}}),
    ];
    epg_children.extend_from_slice(epg_extra);
    let mut children = vec![
        json!({"fvCtx": {"attributes": {"name": "V"}}}),
        json!({"fvBD": {"attributes": {"name": "BD"}, "children": [
            {"fvSubnet": {"attributes": {"ip": "10.1.1.0/24"}}},
            {"fvRsCtx": {"attributes": {"tnFvCtxName": "V"}}}
        ]}}),
        json!({"fvAp": {"attributes": {"name": "A"}, "children": [
            {"fvAEPg": {"attributes": {"name": "E"}, "children": epg_children}}
        ]}}),
        json!({"vzFilter": {"attributes": {"name": "web"}, "children": [
            {"vzEntry": {"attributes": entry}}
        ]}}),
        json!({"vzBrCP": {"attributes": {"name": "C"}, "children": [
            {"vzSubj": {"attributes": {"name": "s1"}, "children": [
                {"vzRsSubjFiltAtt": {"attributes": {"tnVzFilterName": "web"}}}
            ]}}
        ]}}),
    ];
    children.extend_from_slice(tenant_extra);
    json!({"polUni": {"attributes": {"name": "Lab"}, "children": [
        {"fvTenant": {"attributes": {"name": "T"}, "children": children}},
        {"fabricInst": {"attributes": {}, "children": [leaf("101", "leaf1")]}}
    ]}})
}

fn http_entry() -> Value {
    json!({"name": "http", "etherT": "ip", "prot": "tcp", "dFromPort": "80", "dToPort": "80"})
}

fn ingest_ok(root: &Value, diags: &mut Diagnostics) -> PolicyGraph {
    ingest(root, "lab.json", diags).unwrap()
}

#[test]
fn test_single_leaf_fabric() {
    let mut diags = Diagnostics::new();
    let graph = ingest_ok(&tenant(&http_entry(), &[], &[]), &mut diags);
    let devices = lower(&graph, &mut diags);
    assert_eq!(devices.keys().collect::<Vec<_>>(), vec!["leaf1"]);
    let device = &devices["leaf1"];

    assert!(device.routing_instance(DEFAULT_VRF).is_some());
    assert!(device.routing_instance("T:V").is_some());

    let vlan = device
        .interfaces()
        .find(|iface| iface.iftype == InterfaceType::Vlan && iface.name.ends_with("-BD"))
        .unwrap();
    assert_ne!(vlan.name, "vlan100-BD");
    assert_eq!(vlan.addresses, vec!["10.1.1.0/24".parse().unwrap()]);
    assert_eq!(vlan.vrf, "T:V");

    let acl = device.acl("~CONTRACT~T:C").unwrap();
    assert_eq!(acl.len(), 2);
    assert_eq!(acl.lines[0].action, LineAction::Permit);
    assert_eq!(acl.lines[1].action, LineAction::Deny);

    let eth = device.interface("eth1/1").unwrap();
    assert_eq!(eth.incoming_filter.as_deref(), Some("~CONTRACT~T:C"));
    assert_eq!(eth.outgoing_filter, None);
    assert_eq!(eth.vlan, Some(100));
    assert_eq!(eth.vrf, "T:V");
    assert_eq!(device.filter_incoming("eth1/1", &tcp(80)), Some(LineAction::Permit));
    assert_eq!(device.filter_incoming("eth1/1", &tcp(81)), Some(LineAction::Deny));

    assert_eq!(diags.warnings().count(), 0);
    assert!(device.validate().is_ok());
}

#[test]
fn test_bridge_domain_path_attachment_sets_vlan() {
    let mut root = tenant(&http_entry(), &[], &[]);
    root["polUni"]["children"][0]["fvTenant"]["children"][1]["fvBD"]["children"]
        .as_array_mut()
        .unwrap()
        .push(json!({"fvRsPathAtt": {"attributes": {
            "tDn": "topology/pod-1/paths-101/pathep-[eth1/2]",
            "encap": "vlan-100"}}}));
    let mut diags = Diagnostics::new();
    let graph = ingest_ok(&root, &mut diags);
    let devices = lower(&graph, &mut diags);
    let device = &devices["leaf1"];

    let vlan = device.interface("vlan100-BD").unwrap();
    assert_eq!(vlan.iftype, InterfaceType::Vlan);
    assert_eq!(vlan.vlan, Some(100));
    assert_eq!(vlan.addresses, vec!["10.1.1.0/24".parse().unwrap()]);
    assert!(device.interface("eth1/2").is_none());
    assert_eq!(diags.warnings().count(), 0);
}

#[test]
fn test_placeholder_ports_are_unconstrained() {
    let entries = [
        json!({"name": "e", "prot": "tcp", "dFromPort": "unspecified", "dToPort": "unspecified"}),
        json!({"name": "e", "prot": "tcp", "dFromPort": "0", "dToPort": "0"}),
        json!({"name": "e", "prot": "tcp", "dPort": "0-0", "sFromPort": "unspecified"}),
        json!({"name": "e", "prot": "6", "arpOpc": "unspecified"}),
    ];
    for entry in &entries {
        let mut diags = Diagnostics::new();
        let graph = ingest_ok(&tenant(entry, &[], &[]), &mut diags);
        let devices = lower(&graph, &mut diags);
        let device = &devices["leaf1"];
        for port in [80, 443, 65535] {
            assert_eq!(
                device.filter_incoming("eth1/1", &tcp(port)),
                Some(LineAction::Permit),
                "{entry} on port {port}"
            );
        }
        assert!(!diags.any_warning_contains("port"), "{entry}");
        assert!(!diags.any_warning_contains("ARP"), "{entry}");
    }
}

#[test]
fn test_taboo_takes_precedence() {
    let any_tcp = json!({"name": "tcp", "prot": "tcp"});
    let epg_extra = [
        json!({"fvRsCons": {"attributes": {"tnVzBrCPName": "C"}}}),
        json!({"fvRsProtBy": {"attributes": {"tnVzTabooName": "NoSsh"}}}),
    ];
    let tenant_extra = [
        json!({"vzFilter": {"attributes": {"name": "ssh"}, "children": [
            {"vzEntry": {"attributes": {"name": "ssh", "prot": "tcp", "dFromPort": "22", "dToPort": "22"}}}
        ]}}),
        json!({"vzTaboo": {"attributes": {"name": "NoSsh"}, "children": [
            {"vzTSubj": {"attributes": {"name": "ts"}, "children": [
                {"vzRsDenyRule": {"attributes": {"tnVzFilterName": "ssh"}}}
            ]}}
        ]}}),
    ];
    let mut diags = Diagnostics::new();
    let graph = ingest_ok(&tenant(&any_tcp, &epg_extra, &tenant_extra), &mut diags);
    let devices = lower(&graph, &mut diags);
    let device = &devices["leaf1"];

    assert!(device.acl("~TABOO~T:NoSsh").is_some());
    let eth = device.interface("eth1/1").unwrap();
    let outgoing = eth.outgoing_filter.as_deref().unwrap();
    assert!(outgoing.starts_with("~EPG_POLICY~"));
    assert_eq!(device.filter_outgoing("eth1/1", &tcp(22)), Some(LineAction::Deny));
    assert_eq!(device.filter_outgoing("eth1/1", &tcp(80)), Some(LineAction::Permit));
    assert_eq!(device.filter_incoming("eth1/1", &tcp(22)), Some(LineAction::Deny));
    assert_eq!(device.filter_incoming("eth1/1", &tcp(8080)), Some(LineAction::Permit));
    assert_eq!(diags.warnings().count(), 0);
}

#[test]
fn test_spine_leaf_topology() {
    let mut nodes = vec![];
    for n in 1..=3 {
        nodes.push(json!({"fabricNodePEp": {"attributes": {
            "id": format!("{}", 200 + n), "name": format!("spine{n}"), "role": "spine"}}}));
    }
    for n in 1..=4 {
        nodes.push(leaf(&format!("{}", 100 + n), &format!("leaf{n}")));
    }
    nodes.push(json!({"fabricNodePEp": {"attributes": {
        "id": "301", "name": "DC1-Leaf-09", "role": "unspecified"}}}));
    nodes.push(json!({"fabricNodePEp": {"attributes": {"id": "1", "name": "apic1", "role": "controller"}}}));
    let root = json!({"polUni": {"children": [
        {"fabricInst": {"attributes": {}, "children": nodes}}
    ]}});
    let mut diags = Diagnostics::new();
    let graph = ingest_ok(&root, &mut diags);
    let links = derive_topology(&graph);
    assert_eq!(links.len(), 3 * 5);
    let spines = ["spine1", "spine2", "spine3"];
    assert!(
        links
            .iter()
            .all(|link| spines.iter().any(|spine| link.connects(spine)))
    );
    assert!(!links.iter().any(|link| link.connects("apic1")));

    let devices = lower(&graph, &mut diags);
    assert_eq!(devices.len(), 9);
}

#[test]
fn test_dangling_vrf_keeps_vlan_interface() {
    let root = json!({"fvTenant": {"attributes": {"name": "T"}, "children": [
        {"fvBD": {"attributes": {"name": "BD"}, "children": [
            {"fvSubnet": {"attributes": {"ip": "10.9.0.1/16"}}},
            {"fvRsCtx": {"attributes": {"tnFvCtxName": "Gone"}}}
        ]}}
    ]}});
    let mut diags = Diagnostics::new();
    let graph = ingest_ok(&root, &mut diags);
    let bd = graph.bridge_domains().by_key("T:BD").unwrap();
    assert!(!bd.vrf.as_ref().unwrap().is_resolved());

    let devices = lower(&graph, &mut diags);
    assert_eq!(devices.len(), 1);
    let device = devices.values().next().unwrap();
    let vlan = device
        .interfaces()
        .find(|iface| iface.iftype == InterfaceType::Vlan)
        .unwrap();
    assert!(vlan.name.ends_with("-BD"));
    assert_eq!(vlan.vrf, DEFAULT_VRF);
    assert_eq!(vlan.addresses, vec!["10.9.0.1/16".parse().unwrap()]);
    assert!(diags.any_warning_contains("unknown VRF T:Gone"));
}

#[test]
fn test_contract_without_subjects() {
    let tenant_extra = [json!({"vzBrCP": {"attributes": {"name": "Empty"}}})];
    let epg_extra = [json!({"fvRsCons": {"attributes": {"tnVzBrCPName": "Empty"}}})];
    let mut diags = Diagnostics::new();
    let graph = ingest_ok(&tenant(&http_entry(), &epg_extra, &tenant_extra), &mut diags);
    let devices = lower(&graph, &mut diags);
    let device = &devices["leaf1"];
    assert!(device.acl("~CONTRACT~T:Empty").is_none());
    assert!(device.acl("~CONTRACT~T:C").is_some());
    assert_eq!(device.interface("eth1/1").unwrap().outgoing_filter, None);
    assert!(diags.any_warning_contains("no subjects"));
}

#[test]
fn test_lowering_is_deterministic() {
    let epg_extra = [json!({"fvRsCons": {"attributes": {"tnVzBrCPName": "C"}}})];
    let root = tenant(&http_entry(), &epg_extra, &[]);
    let run = || {
        let mut diags = Diagnostics::new();
        let graph = ingest_ok(&root, &mut diags);
        let devices = lower(&graph, &mut diags);
        let topology = derive_topology(&graph);
        let messages: Vec<String> = diags.iter().map(|d| d.message.clone()).collect();
        (devices, topology, messages)
    };
    assert_eq!(run(), run());
}
