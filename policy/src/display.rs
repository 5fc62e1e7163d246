// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Display implementations for the policy graph

use std::fmt::{Display, Formatter};

use crate::graph::PolicyGraph;
use crate::objects::{FabricNode, NodeRole, PathAttachment};

macro_rules! COUNT_FMT {
    () => {
        " {:<22} {:>6}"
    };
}

macro_rules! NODE_FMT {
    () => {
        " {:<8} {:<24} {:<6} {:<5} {:>5}"
    };
}

impl Display for NodeRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeRole::Spine => write!(f, "spine"),
            NodeRole::Leaf => write!(f, "leaf"),
            NodeRole::Other => write!(f, "other"),
        }
    }
}

impl Display for FabricNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            NODE_FMT!(),
            self.node_id,
            self.hostname(),
            self.effective_role(),
            self.pod_id.as_deref().unwrap_or("-"),
            self.interfaces.len()
        )
    }
}

impl Display for PathAttachment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} encap {} epg {}{}",
            self.interface(),
            self.encap.as_deref().unwrap_or("-"),
            self.epg.as_deref().unwrap_or("-"),
            if self.is_vpc() { " (vpc)" } else { "" }
        )
    }
}

impl Display for PolicyGraph {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, " ─────── policy graph {} ({}) ───────", self.name, self.source)?;
        writeln!(f, COUNT_FMT!(), "tenants", self.tenants.len())?;
        writeln!(f, COUNT_FMT!(), "vrfs", self.vrfs.len())?;
        writeln!(f, COUNT_FMT!(), "bridge domains", self.bridge_domains.len())?;
        writeln!(f, COUNT_FMT!(), "application profiles", self.application_profiles.len())?;
        writeln!(f, COUNT_FMT!(), "epgs", self.epgs.len())?;
        writeln!(f, COUNT_FMT!(), "contracts", self.contracts.len())?;
        writeln!(f, COUNT_FMT!(), "taboo contracts", self.taboos.len())?;
        writeln!(f, COUNT_FMT!(), "filters", self.filters.len())?;
        writeln!(f, COUNT_FMT!(), "contract interfaces", self.contract_interfaces.len())?;
        writeln!(f, COUNT_FMT!(), "l3outs", self.l3outs.len())?;
        writeln!(f, COUNT_FMT!(), "l2outs", self.l2outs.len())?;
        writeln!(f, COUNT_FMT!(), "vpc pairs", self.vpc_pairs.len())?;
        if !self.fabric_nodes.is_empty() {
            writeln!(f, NODE_FMT!(), "NODE", "HOSTNAME", "ROLE", "POD", "IFS")?;
            for node in self.fabric_nodes.values() {
                writeln!(f, "{node}")?;
                for att in self
                    .path_attachments
                    .get(&node.node_id)
                    .into_iter()
                    .flat_map(|atts| atts.values())
                {
                    writeln!(f, "   {att}")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // valid in tests
mod test {
    use crate::builder::PolicyGraphBuilder;
    use crate::diagnostics::Diagnostics;
    use crate::objects::{PathAttachment, PathTarget};

    #[test]
    fn test_graph_summary() {
        let mut builder = PolicyGraphBuilder::new("lab.json");
        builder.tenant_mut("T").unwrap();
        let node = builder.fabric_node_mut("101").unwrap();
        node.name = "leaf1".to_owned();
        node.role = Some("leaf".to_owned());
        let tdn = "topology/pod-1/paths-101/pathep-[eth1/1]";
        let mut att = PathAttachment::new(tdn, PathTarget::parse(tdn).unwrap());
        att.encap = Some("vlan-10".to_owned());
        builder.add_path_attachment(att);
        let graph = builder.finalize(&mut Diagnostics::new());

        let text = graph.to_string();
        assert!(text.contains("policy graph aci-lab (lab.json)"));
        assert!(text.contains("leaf1"));
        assert!(text.contains("leaf "));
        assert!(text.contains("eth1/1 encap vlan-10 epg -"));
    }
}
