// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Device hostnames of fabric nodes

use policy::PolicyGraph;
use std::collections::{BTreeMap, BTreeSet};

/// Numeric node ids first, in numeric order, then the others by name
fn node_order(node_id: &str) -> (bool, u64, &str) {
    match node_id.parse() {
        Ok(id) => (false, id, node_id),
        Err(_) => (true, 0, node_id),
    }
}

/// Hostname of every fabric node, by node id. A node's hostname is its name, or its id
/// when unnamed. A hostname already taken by a node with a smaller id gets the node id
/// and a counter appended, as in `leaf-102-2`. Ids compare as numbers when they are.
#[must_use]
pub fn device_hostnames(graph: &PolicyGraph) -> BTreeMap<String, String> {
    let mut nodes: Vec<_> = graph.fabric_nodes().values().collect();
    nodes.sort_by(|a, b| node_order(&a.node_id).cmp(&node_order(&b.node_id)));

    let mut used = BTreeSet::new();
    let mut hostnames = BTreeMap::new();
    for node in nodes {
        let base = node.hostname();
        let mut hostname = base.to_owned();
        let mut suffix = 2;
        while used.contains(&hostname) {
            hostname = format!("{base}-{}-{suffix}", node.node_id);
            suffix += 1;
        }
        used.insert(hostname.clone());
        hostnames.insert(node.node_id.clone(), hostname);
    }
    hostnames
}
