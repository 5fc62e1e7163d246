// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Reference resolution and freezing of the policy graph

use ordermap::OrderSet;
use std::collections::BTreeMap;
use std::path::Path;
use tracectl::trace_target;
use tracing::{debug, info};

use crate::builder::PolicyGraphBuilder;
use crate::diagnostics::Diagnostics;
use crate::graph::{Idx, PolicyGraph, Ref, Table};
use crate::keys::{COMMON_TENANT, compose, is_qualified, qualify};
use crate::objects::{
    BridgeDomain, Contract, ContractInterface, ContractRelations, Filter, PathAttachment, PortKind,
    TabooContract, VpcPair, Vrf,
};

trace_target!("resolve", tracectl::LevelFilter::INFO, &["policy"]);

const TAG: &str = "resolve";

/// Composite key to index, as [`Table::from_map`] will assign them
fn index_of<T>(map: &BTreeMap<String, T>) -> BTreeMap<String, Idx<T>> {
    map.keys()
        .enumerate()
        .map(|(n, key)| (key.clone(), Idx::new(n)))
        .collect()
}

/// Qualify and bind a reference made from within `tenant`. An unqualified name that is
/// not found in `tenant` is looked up in the common tenant.
fn bind<T>(
    reference: &mut Ref<T>,
    tenant: &str,
    index: &BTreeMap<String, Idx<T>>,
    what: &str,
    owner: &str,
    diags: &mut Diagnostics,
) {
    let key = qualify(tenant, reference.name());
    if let Some(idx) = index.get(&key) {
        reference.bind(key, Some(*idx));
        return;
    }
    if !is_qualified(reference.name()) {
        let common = compose(COMMON_TENANT, reference.name());
        if let Some(idx) = index.get(&common) {
            debug!("{owner}: {what} {} found in tenant {COMMON_TENANT}", reference.name());
            reference.bind(common, Some(*idx));
            return;
        }
    }
    diags.warn(TAG, format!("{owner} references unknown {what} {key}"));
    reference.bind(key, None);
}

struct Indices<'a> {
    vrfs: &'a BTreeMap<String, Idx<Vrf>>,
    bridge_domains: &'a BTreeMap<String, Idx<BridgeDomain>>,
    contracts: &'a BTreeMap<String, Idx<Contract>>,
    taboos: &'a BTreeMap<String, Idx<TabooContract>>,
    filters: &'a BTreeMap<String, Idx<Filter>>,
    contract_interfaces: &'a BTreeMap<String, Idx<ContractInterface>>,
}

impl Indices<'_> {
    fn bind_relations(
        &self,
        relations: &mut ContractRelations,
        tenant: &str,
        owner: &str,
        diags: &mut Diagnostics,
    ) {
        for r in relations.provided.iter_mut().chain(relations.consumed.iter_mut()) {
            bind(r, tenant, self.contracts, "contract", owner, diags);
        }
        for r in relations
            .provided_interfaces
            .iter_mut()
            .chain(relations.consumed_interfaces.iter_mut())
        {
            bind(r, tenant, self.contract_interfaces, "contract interface", owner, diags);
        }
        for r in &mut relations.taboos {
            bind(r, tenant, self.taboos, "taboo contract", owner, diags);
        }
    }
}

fn bind_references(builder: &mut PolicyGraphBuilder, diags: &mut Diagnostics) {
    let vrfs = index_of(&builder.vrfs);
    let bridge_domains = index_of(&builder.bridge_domains);
    let contracts = index_of(&builder.contracts);
    let taboos = index_of(&builder.taboos);
    let filters = index_of(&builder.filters);
    let contract_interfaces = index_of(&builder.contract_interfaces);
    let idx = Indices {
        vrfs: &vrfs,
        bridge_domains: &bridge_domains,
        contracts: &contracts,
        taboos: &taboos,
        filters: &filters,
        contract_interfaces: &contract_interfaces,
    };

    for bd in builder.bridge_domains.values_mut() {
        let owner = format!("Bridge domain {}", bd.key);
        if let Some(vrf) = bd.vrf.as_mut() {
            bind(vrf, &bd.tenant, idx.vrfs, "VRF", &owner, diags);
        }
    }
    for epg in builder.epgs.values_mut() {
        let owner = format!("EPG {}", epg.key);
        if let Some(bd) = epg.bridge_domain.as_mut() {
            bind(bd, &epg.tenant, idx.bridge_domains, "bridge domain", &owner, diags);
        }
        idx.bind_relations(&mut epg.relations, &epg.tenant, &owner, diags);
    }
    for contract in builder.contracts.values_mut() {
        let owner = format!("Contract {}", contract.key);
        for subject in &mut contract.subjects {
            for fref in &mut subject.filters {
                bind(&mut fref.filter, &contract.tenant, idx.filters, "filter", &owner, diags);
            }
        }
    }
    for taboo in builder.taboos.values_mut() {
        let owner = format!("Taboo contract {}", taboo.key);
        for subject in &mut taboo.subjects {
            for fref in &mut subject.filters {
                bind(&mut fref.filter, &taboo.tenant, idx.filters, "filter", &owner, diags);
            }
        }
    }
    for cpif in builder.contract_interfaces.values_mut() {
        let owner = format!("Contract interface {}", cpif.key);
        if let Some(exported) = cpif.exported.as_mut() {
            bind(exported, &cpif.tenant, idx.contracts, "contract", &owner, diags);
        }
    }
    for l3out in builder.l3outs.values_mut() {
        let owner = format!("L3Out {}", l3out.key);
        if let Some(vrf) = l3out.vrf.as_mut() {
            bind(vrf, &l3out.tenant, idx.vrfs, "VRF", &owner, diags);
        }
        for epg in &mut l3out.external_epgs {
            let owner = format!("External EPG {}", epg.key);
            idx.bind_relations(&mut epg.relations, &l3out.tenant, &owner, diags);
        }
    }
    for l2out in builder.l2outs.values_mut() {
        let owner = format!("L2Out {}", l2out.key);
        if let Some(bd) = l2out.bridge_domain.as_mut() {
            bind(bd, &l2out.tenant, idx.bridge_domains, "bridge domain", &owner, diags);
        }
        for epg in &mut l2out.external_epgs {
            let owner = format!("External EPG {}", epg.key);
            idx.bind_relations(&mut epg.relations, &l2out.tenant, &owner, diags);
        }
    }
}

/// Names from identity policies and management addresses, which may precede their node
fn apply_node_extras(builder: &mut PolicyGraphBuilder, diags: &mut Diagnostics) {
    for (node_id, name) in &builder.node_names {
        let unnamed = builder
            .fabric_nodes
            .get_mut(node_id)
            .filter(|node| node.name.trim().is_empty());
        if let Some(node) = unnamed {
            node.name.clone_from(name);
        }
    }
    for (node_id, info) in std::mem::take(&mut builder.management) {
        match builder.fabric_nodes.get_mut(&node_id) {
            Some(node) => node.management = Some(info),
            None => diags.warn(
                TAG,
                format!(
                    "Management address {} references unknown node {node_id}",
                    info.address
                ),
            ),
        }
    }
}

type AttachmentIndex = BTreeMap<String, BTreeMap<String, PathAttachment>>;

/// Index path attachments per node and interface, last attachment winning, and bind the
/// attached interfaces of known nodes to their EPG
fn index_attachments(
    builder: &mut PolicyGraphBuilder,
    diags: &mut Diagnostics,
) -> AttachmentIndex {
    let mut index = AttachmentIndex::new();
    for attachment in std::mem::take(&mut builder.path_attachments) {
        let target = attachment.target.clone();
        if let Some(node_b) = target.node_id2.as_deref() {
            let known = builder
                .vpc_pairs
                .iter()
                .any(|pair| pair.peer_of(&target.node_id) == Some(node_b));
            if !known {
                builder.vpc_pairs.push(VpcPair {
                    id: format!("{}-{node_b}", target.node_id),
                    name: None,
                    node_a: target.node_id.clone(),
                    node_b: node_b.to_owned(),
                });
            }
        }
        for node_id in target.node_ids() {
            match builder.fabric_nodes.get_mut(node_id) {
                Some(node) => {
                    let iface = node.interface_mut(&target.interface);
                    iface.kind = if target.is_vpc() {
                        PortKind::Vpc
                    } else {
                        PortKind::Physical
                    };
                    iface.epg.clone_from(&attachment.epg);
                    iface.encap.clone_from(&attachment.encap);
                }
                None => diags.warn(
                    TAG,
                    format!(
                        "Path attachment {} references unknown node {node_id}",
                        attachment.tdn
                    ),
                ),
            }
            let previous = index
                .entry(node_id.to_owned())
                .or_default()
                .insert(target.interface.clone(), attachment.clone());
            if let Some(previous) = previous {
                diags.info(
                    TAG,
                    format!(
                        "Interface {} of node {node_id} attached again ({} replaces {})",
                        target.interface,
                        attachment.epg.as_deref().unwrap_or(&attachment.tdn),
                        previous.epg.as_deref().unwrap_or(&previous.tdn),
                    ),
                );
            }
        }
    }
    index
}

/// Top-level name of the graph: the policy universe name, or one derived from the source
fn graph_name(builder: &PolicyGraphBuilder) -> String {
    match &builder.name {
        Some(name) => name.to_lowercase(),
        None => {
            let stem = Path::new(&builder.source)
                .file_stem()
                .and_then(|s| s.to_str())
                .filter(|s| !s.is_empty())
                .unwrap_or("fabric");
            format!("aci-{}", stem.to_lowercase())
        }
    }
}

pub(crate) fn finalize(mut builder: PolicyGraphBuilder, diags: &mut Diagnostics) -> PolicyGraph {
    let name = graph_name(&builder);
    apply_node_extras(&mut builder, diags);
    bind_references(&mut builder, diags);
    let path_attachments = index_attachments(&mut builder, diags);

    let node_interfaces = builder
        .fabric_nodes
        .iter()
        .map(|(id, node)| {
            let names: OrderSet<String> = node.interfaces.keys().cloned().collect();
            (id.clone(), names)
        })
        .collect();

    let graph = PolicyGraph {
        name,
        source: builder.source,
        tenants: Table::from_map(builder.tenants),
        vrfs: Table::from_map(builder.vrfs),
        bridge_domains: Table::from_map(builder.bridge_domains),
        application_profiles: Table::from_map(builder.application_profiles),
        epgs: Table::from_map(builder.epgs),
        contracts: Table::from_map(builder.contracts),
        taboos: Table::from_map(builder.taboos),
        filters: Table::from_map(builder.filters),
        contract_interfaces: Table::from_map(builder.contract_interfaces),
        l3outs: Table::from_map(builder.l3outs),
        l2outs: Table::from_map(builder.l2outs),
        fabric_nodes: Table::from_map(builder.fabric_nodes),
        vpc_pairs: builder.vpc_pairs,
        path_attachments,
        node_interfaces,
    };
    info!(
        "Finalized policy graph {}: {} tenants, {} EPGs, {} contracts, {} fabric nodes",
        graph.name,
        graph.tenants.len(),
        graph.epgs.len(),
        graph.contracts.len(),
        graph.fabric_nodes.len()
    );
    graph
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // valid in tests
mod test {
    use crate::builder::PolicyGraphBuilder;
    use crate::diagnostics::{Diagnostics, Severity};
    use crate::graph::Ref;
    use crate::objects::{ManagementInfo, PathAttachment, PathTarget, PortKind};
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    fn attachment(tdn: &str, epg: &str) -> PathAttachment {
        let mut att = PathAttachment::new(tdn, PathTarget::parse(tdn).unwrap());
        att.epg = Some(epg.to_owned());
        att.encap = Some(format!("vlan-{}", epg.len()));
        att
    }

    #[test]
    #[traced_test]
    fn test_dangling_vrf_kept() {
        let mut builder = PolicyGraphBuilder::new("x");
        let bd = builder.bridge_domain_mut("T", "BD").unwrap();
        bd.add_subnet("10.1.1.1/24");
        bd.vrf = Some(Ref::new("nope"));
        let mut diags = Diagnostics::new();
        let graph = builder.finalize(&mut diags);

        let bd = graph.bridge_domains().by_key("T:BD").unwrap();
        let vrf = bd.vrf.as_ref().unwrap();
        assert_eq!(vrf.name(), "nope");
        assert_eq!(vrf.key(), "T:nope");
        assert!(!vrf.is_resolved());
        assert!(graph.vrfs().resolve(vrf).is_none());
        assert_eq!(diags.with_tag("resolve").count(), 1);
        assert!(logs_contain("references unknown VRF T:nope"));
    }

    #[test]
    fn test_common_tenant_fallback() {
        let mut builder = PolicyGraphBuilder::new("x");
        builder.vrf_mut("common", "shared").unwrap();
        builder.vrf_mut("T", "own").unwrap();
        builder.bridge_domain_mut("T", "a").unwrap().vrf = Some(Ref::new("shared"));
        builder.bridge_domain_mut("T", "b").unwrap().vrf = Some(Ref::new("own"));
        builder.bridge_domain_mut("U", "c").unwrap().vrf = Some(Ref::new("T:own"));
        let mut diags = Diagnostics::new();
        let graph = builder.finalize(&mut diags);

        let key_of = |bd: &str| {
            let bd = graph.bridge_domains().by_key(bd).unwrap();
            let vrf = bd.vrf.as_ref().unwrap();
            assert!(vrf.is_resolved());
            graph.vrfs().resolve(vrf).unwrap().key.clone()
        };
        assert_eq!(key_of("T:a"), "common:shared");
        assert_eq!(key_of("T:b"), "T:own");
        assert_eq!(key_of("U:c"), "T:own");
        assert!(diags.is_empty());
    }

    #[test]
    fn test_path_attachments_last_write_wins() {
        let mut builder = PolicyGraphBuilder::new("x");
        builder.fabric_node_mut("101").unwrap();
        let tdn = "topology/pod-1/paths-101/pathep-[eth1/1]";
        builder.add_path_attachment(attachment(tdn, "T:A:web"));
        builder.add_path_attachment(attachment(tdn, "T:A:db"));
        let mut diags = Diagnostics::new();
        let graph = builder.finalize(&mut diags);

        let atts = graph.path_attachments("101").unwrap();
        assert_eq!(atts.len(), 1);
        assert_eq!(atts["eth1/1"].epg.as_deref(), Some("T:A:db"));
        let node = graph.fabric_nodes().by_key("101").unwrap();
        assert_eq!(node.interfaces["eth1/1"].epg.as_deref(), Some("T:A:db"));
        assert_eq!(graph.node_interfaces("101").unwrap().len(), 1);
        let notes: Vec<_> = diags.iter().collect();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, Severity::Info);
    }

    #[test]
    fn test_vpc_attachment_on_both_nodes() {
        let mut builder = PolicyGraphBuilder::new("x");
        builder.fabric_node_mut("101").unwrap();
        builder.fabric_node_mut("102").unwrap();
        builder.add_path_attachment(attachment(
            "topology/pod-1/protpaths-101-102/pathep-[vpc-srv]",
            "T:A:web",
        ));
        let mut diags = Diagnostics::new();
        let graph = builder.finalize(&mut diags);

        for node in ["101", "102"] {
            let att = &graph.path_attachments(node).unwrap()["vpc-srv"];
            assert!(att.is_vpc());
            let fabric_node = graph.fabric_nodes().by_key(node).unwrap();
            assert_eq!(fabric_node.interfaces["vpc-srv"].kind, PortKind::Vpc);
        }
        assert_eq!(graph.vpc_peer("102"), Some("101"));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_node_names_and_management() {
        let mut builder = PolicyGraphBuilder::new("x");
        builder.set_management(
            "101",
            ManagementInfo {
                address: "10.0.0.1/24".to_owned(),
                ..Default::default()
            },
        );
        builder.set_node_name("101", "leaf-a");
        builder.fabric_node_mut("101").unwrap();
        builder.fabric_node_mut("102").unwrap().name = "own-name".to_owned();
        builder.set_node_name("102", "ignored");
        let mut diags = Diagnostics::new();
        let graph = builder.finalize(&mut diags);

        let leaf = graph.fabric_nodes().by_key("101").unwrap();
        assert_eq!(leaf.hostname(), "leaf-a");
        assert!(leaf.management.is_some());
        assert_eq!(graph.fabric_nodes().by_key("102").unwrap().hostname(), "own-name");
    }

    #[test]
    fn test_graph_name() {
        let mut diags = Diagnostics::new();
        let mut builder = PolicyGraphBuilder::new("/tmp/Fabric-01.json");
        let derived = PolicyGraphBuilder::new("/tmp/Fabric-01.json").finalize(&mut diags);
        assert_eq!(derived.name(), "aci-fabric-01");
        builder.set_name("Prod");
        assert_eq!(builder.finalize(&mut diags).name(), "prod");
    }
}
