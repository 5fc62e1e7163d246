// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Physical topology of a folded-Clos fabric: every spine is linked to every leaf

use model::Link;
use policy::PolicyGraph;
use policy::objects::NodeRole;
use std::collections::BTreeSet;
use tracectl::trace_target;
use tracing::debug;

use crate::hostnames::device_hostnames;

trace_target!("topology", tracectl::LevelFilter::INFO, &["lower"]);

/// Links between fabric devices, by hostname. There is one link per (spine, leaf) pair of
/// distinct nodes; path attachments play no part.
#[must_use]
pub fn derive_topology(graph: &PolicyGraph) -> BTreeSet<Link> {
    let hostnames = device_hostnames(graph);
    let mut spines = vec![];
    let mut leaves = vec![];
    for node in graph.fabric_nodes().values() {
        let Some(hostname) = hostnames.get(&node.node_id) else {
            continue;
        };
        match node.effective_role() {
            NodeRole::Spine => spines.push((node.node_id.as_str(), hostname.as_str())),
            NodeRole::Leaf => leaves.push((node.node_id.as_str(), hostname.as_str())),
            NodeRole::Other => debug!("Node {} is neither spine nor leaf", node.node_id),
        }
    }
    let links: BTreeSet<Link> = spines
        .iter()
        .flat_map(|spine| leaves.iter().map(move |leaf| (spine, leaf)))
        .filter(|((spine_id, _), (leaf_id, _))| spine_id != leaf_id)
        .map(|((_, spine), (_, leaf))| Link::new(spine, leaf))
        .collect();
    debug!(
        "Topology of {}: {} spines, {} leaves, {} links",
        graph.name(),
        spines.len(),
        leaves.len(),
        links.len()
    );
    links
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // valid in tests
mod test {
    use super::derive_topology;
    use model::Link;
    use policy::objects::{PathAttachment, PathTarget};
    use policy::{Diagnostics, PolicyGraph, PolicyGraphBuilder};
    use pretty_assertions::assert_eq;

    fn fabric(spines: usize, leaves: usize, others: usize) -> PolicyGraph {
        let mut builder = PolicyGraphBuilder::new("test");
        for n in 0..spines {
            let node = builder.fabric_node_mut(&format!("{}", 200 + n)).unwrap();
            node.name = format!("spine{n}");
            node.role = Some("Spine".to_owned());
        }
        for n in 0..leaves {
            let node = builder.fabric_node_mut(&format!("{}", 1000 + n)).unwrap();
            node.role = Some("leaf".to_owned());
        }
        for n in 0..others {
            let node = builder.fabric_node_mut(&format!("{}", 5000 + n)).unwrap();
            node.role = Some("controller".to_owned());
        }
        builder.finalize(&mut Diagnostics::new())
    }

    #[test]
    fn test_two_by_two() {
        let graph = fabric(2, 2, 1);
        let links = derive_topology(&graph);
        let expected = [
            Link::new("spine0", "1000"),
            Link::new("spine0", "1001"),
            Link::new("spine1", "1000"),
            Link::new("spine1", "1001"),
        ];
        assert_eq!(links, expected.into_iter().collect());
    }

    #[test]
    fn test_roles_inferred_from_names() {
        let mut builder = PolicyGraphBuilder::new("test");
        builder.fabric_node_mut("1").unwrap().name = "DC1-Spine-01".to_owned();
        builder.fabric_node_mut("2").unwrap().name = "DC1-Leaf-01".to_owned();
        builder.fabric_node_mut("3").unwrap().name = "DC1-Border-01".to_owned();
        let graph = builder.finalize(&mut Diagnostics::new());
        let links = derive_topology(&graph);
        assert_eq!(links.len(), 1);
        assert!(links.contains(&Link::new("DC1-Leaf-01", "DC1-Spine-01")));
    }

    #[test]
    fn test_path_attachments_do_not_matter() {
        let plain = derive_topology(&fabric(1, 2, 0));
        let mut builder = PolicyGraphBuilder::new("test");
        builder.fabric_node_mut("200").unwrap().role = Some("spine".to_owned());
        builder.fabric_node_mut("200").unwrap().name = "spine0".to_owned();
        builder.fabric_node_mut("1000").unwrap().role = Some("leaf".to_owned());
        builder.fabric_node_mut("1001").unwrap().role = Some("leaf".to_owned());
        let tdn = "topology/pod-1/protpaths-1000-1001/pathep-[vpc1]";
        builder.add_path_attachment(PathAttachment::new(tdn, PathTarget::parse(tdn).unwrap()));
        let attached = derive_topology(&builder.finalize(&mut Diagnostics::new()));
        assert_eq!(plain, attached);
    }

    #[test]
    fn test_cardinality() {
        bolero::check!()
            .with_type()
            .cloned()
            .for_each(|(spines, leaves, others): (u8, u8, u8)| {
                let (spines, leaves, others) =
                    (usize::from(spines % 8), usize::from(leaves % 8), usize::from(others % 3));
                let graph = fabric(spines, leaves, others);
                let links = derive_topology(&graph);
                assert_eq!(links.len(), spines * leaves);
                for link in &links {
                    assert!(!link.is_self_loop());
                    let spine_ends = [link.node_a(), link.node_b()]
                        .iter()
                        .filter(|end| end.starts_with("spine"))
                        .count();
                    assert_eq!(spine_ends, 1);
                }
            });
    }
}
