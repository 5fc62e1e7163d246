// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The open policy graph. Entities are created with get-or-create accessors,
//! mutated while the input is walked, and frozen by [`PolicyGraphBuilder::finalize`].

use std::collections::BTreeMap;
use tracing::debug;

use crate::diagnostics::Diagnostics;
use crate::graph::PolicyGraph;
use crate::keys::compose;
use crate::objects::{
    ApplicationProfile, BridgeDomain, Contract, ContractInterface, Epg, FabricNode, Filter, L2Out,
    L3Out, ManagementInfo, PathAttachment, TabooContract, Tenant, VpcPair, Vrf,
};
use crate::resolve;

/// Return `None` out of a get-or-create accessor if any of the names is blank
macro_rules! require_names {
    ($($name:expr),+) => {
        if $($name.trim().is_empty())||+ {
            return None;
        }
    };
}

#[derive(Debug, Default)]
pub struct PolicyGraphBuilder {
    pub(crate) name: Option<String>,
    pub(crate) source: String,
    pub(crate) tenants: BTreeMap<String, Tenant>,
    pub(crate) vrfs: BTreeMap<String, Vrf>,
    pub(crate) bridge_domains: BTreeMap<String, BridgeDomain>,
    pub(crate) application_profiles: BTreeMap<String, ApplicationProfile>,
    pub(crate) epgs: BTreeMap<String, Epg>,
    pub(crate) contracts: BTreeMap<String, Contract>,
    pub(crate) taboos: BTreeMap<String, TabooContract>,
    pub(crate) filters: BTreeMap<String, Filter>,
    pub(crate) contract_interfaces: BTreeMap<String, ContractInterface>,
    pub(crate) l3outs: BTreeMap<String, L3Out>,
    pub(crate) l2outs: BTreeMap<String, L2Out>,
    pub(crate) fabric_nodes: BTreeMap<String, FabricNode>,
    pub(crate) node_names: BTreeMap<String, String>, /* node id -> name from identity policies */
    pub(crate) vpc_pairs: Vec<VpcPair>,
    pub(crate) path_attachments: Vec<PathAttachment>, /* in input order */
    pub(crate) management: Vec<(String, ManagementInfo)>, /* node id, info */
}

impl PolicyGraphBuilder {
    #[must_use]
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_owned(),
            ..Default::default()
        }
    }
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
    pub fn set_name(&mut self, name: &str) {
        if !name.trim().is_empty() {
            self.name = Some(name.trim().to_owned());
        }
    }

    /// The tenant named `name`, created if missing
    pub fn tenant_mut(&mut self, name: &str) -> Option<&mut Tenant> {
        require_names!(name);
        Some(self.tenants.entry(name.to_owned()).or_insert_with(|| {
            debug!("New tenant {name}");
            Tenant::new(name)
        }))
    }
    fn owning_tenant(&mut self, tenant: &str) -> &mut Tenant {
        self.tenants
            .entry(tenant.to_owned())
            .or_insert_with(|| Tenant::new(tenant))
    }

    pub fn vrf_mut(&mut self, tenant: &str, name: &str) -> Option<&mut Vrf> {
        require_names!(tenant, name);
        let key = compose(tenant, name);
        self.owning_tenant(tenant).vrfs.insert(key.clone());
        Some(self.vrfs.entry(key).or_insert_with(|| Vrf::new(tenant, name)))
    }
    pub fn bridge_domain_mut(&mut self, tenant: &str, name: &str) -> Option<&mut BridgeDomain> {
        require_names!(tenant, name);
        let key = compose(tenant, name);
        self.owning_tenant(tenant).bridge_domains.insert(key.clone());
        Some(
            self.bridge_domains
                .entry(key)
                .or_insert_with(|| BridgeDomain::new(tenant, name)),
        )
    }
    pub fn application_profile_mut(
        &mut self,
        tenant: &str,
        name: &str,
    ) -> Option<&mut ApplicationProfile> {
        require_names!(tenant, name);
        let key = compose(tenant, name);
        self.owning_tenant(tenant)
            .application_profiles
            .insert(key.clone());
        Some(
            self.application_profiles
                .entry(key)
                .or_insert_with(|| ApplicationProfile::new(tenant, name)),
        )
    }
    /// The EPG `name` of `tenant`, under application profile `ap` if given
    pub fn epg_mut(&mut self, tenant: &str, ap: Option<&str>, name: &str) -> Option<&mut Epg> {
        require_names!(tenant, name);
        let ap = ap.filter(|ap| !ap.trim().is_empty());
        let epg = Epg::new(tenant, ap, name);
        let key = epg.key.clone();
        self.owning_tenant(tenant).epgs.insert(key.clone());
        if let Some(profile) = ap.and_then(|ap| self.application_profile_mut(tenant, ap)) {
            profile.epgs.insert(key.clone());
        }
        Some(self.epgs.entry(key).or_insert(epg))
    }
    pub fn contract_mut(&mut self, tenant: &str, name: &str) -> Option<&mut Contract> {
        require_names!(tenant, name);
        let key = compose(tenant, name);
        self.owning_tenant(tenant).contracts.insert(key.clone());
        Some(
            self.contracts
                .entry(key)
                .or_insert_with(|| Contract::new(tenant, name)),
        )
    }
    pub fn taboo_mut(&mut self, tenant: &str, name: &str) -> Option<&mut TabooContract> {
        require_names!(tenant, name);
        let key = compose(tenant, name);
        self.owning_tenant(tenant).taboos.insert(key.clone());
        Some(
            self.taboos
                .entry(key)
                .or_insert_with(|| TabooContract::new(tenant, name)),
        )
    }
    pub fn filter_mut(&mut self, tenant: &str, name: &str) -> Option<&mut Filter> {
        require_names!(tenant, name);
        let key = compose(tenant, name);
        self.owning_tenant(tenant).filters.insert(key.clone());
        Some(
            self.filters
                .entry(key)
                .or_insert_with(|| Filter::new(tenant, name)),
        )
    }
    pub fn contract_interface_mut(
        &mut self,
        tenant: &str,
        name: &str,
    ) -> Option<&mut ContractInterface> {
        require_names!(tenant, name);
        let key = compose(tenant, name);
        self.owning_tenant(tenant)
            .contract_interfaces
            .insert(key.clone());
        Some(
            self.contract_interfaces
                .entry(key)
                .or_insert_with(|| ContractInterface::new(tenant, name)),
        )
    }
    pub fn l3out_mut(&mut self, tenant: &str, name: &str) -> Option<&mut L3Out> {
        require_names!(tenant, name);
        let key = compose(tenant, name);
        self.owning_tenant(tenant).l3outs.insert(key.clone());
        Some(
            self.l3outs
                .entry(key)
                .or_insert_with(|| L3Out::new(tenant, name)),
        )
    }
    pub fn l2out_mut(&mut self, tenant: &str, name: &str) -> Option<&mut L2Out> {
        require_names!(tenant, name);
        let key = compose(tenant, name);
        self.owning_tenant(tenant).l2outs.insert(key.clone());
        Some(
            self.l2outs
                .entry(key)
                .or_insert_with(|| L2Out::new(tenant, name)),
        )
    }
    /// The fabric node with id `node_id`, created if missing
    pub fn fabric_node_mut(&mut self, node_id: &str) -> Option<&mut FabricNode> {
        require_names!(node_id);
        let node_id = node_id.trim();
        Some(
            self.fabric_nodes
                .entry(node_id.to_owned())
                .or_insert_with(|| {
                    debug!("New fabric node {node_id}");
                    FabricNode::new(node_id)
                }),
        )
    }

    /// Record the name an identity policy gives to a node. It is used when the node has no
    /// name of its own.
    pub fn set_node_name(&mut self, node_id: &str, name: &str) {
        if !node_id.trim().is_empty() && !name.trim().is_empty() {
            self.node_names
                .insert(node_id.trim().to_owned(), name.trim().to_owned());
        }
    }
    pub fn add_vpc_pair(&mut self, pair: VpcPair) {
        if !self.vpc_pairs.contains(&pair) {
            self.vpc_pairs.push(pair);
        }
    }
    /// Record a path attachment. Attachments are indexed per node when the graph is finalized.
    pub fn add_path_attachment(&mut self, attachment: PathAttachment) {
        self.path_attachments.push(attachment);
    }
    /// Record management addressing for a node that may not have been seen yet
    pub fn set_management(&mut self, node_id: &str, info: ManagementInfo) {
        self.management.push((node_id.to_owned(), info));
    }

    #[must_use]
    pub fn tenant(&self, name: &str) -> Option<&Tenant> {
        self.tenants.get(name)
    }
    #[must_use]
    pub fn epg(&self, key: &str) -> Option<&Epg> {
        self.epgs.get(key)
    }
    #[must_use]
    pub fn bridge_domain(&self, key: &str) -> Option<&BridgeDomain> {
        self.bridge_domains.get(key)
    }
    #[must_use]
    pub fn fabric_node(&self, node_id: &str) -> Option<&FabricNode> {
        self.fabric_nodes.get(node_id)
    }

    /// Resolve references, index path attachments and freeze the graph.
    #[must_use]
    pub fn finalize(self, diags: &mut Diagnostics) -> PolicyGraph {
        resolve::finalize(self, diags)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // valid in tests
mod test {
    use super::PolicyGraphBuilder;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blank_names_not_registered() {
        let mut builder = PolicyGraphBuilder::new("test");
        assert!(builder.tenant_mut("").is_none());
        assert!(builder.vrf_mut("T", " ").is_none());
        assert!(builder.epg_mut("", Some("A"), "E").is_none());
        assert!(builder.fabric_node_mut("").is_none());
        assert!(builder.tenant("").is_none());
        assert!(builder.tenant("T").is_none());
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let mut builder = PolicyGraphBuilder::new("test");
        builder.bridge_domain_mut("T", "BD").unwrap().add_subnet("10.0.0.1/24");
        builder.bridge_domain_mut("T", "BD").unwrap().add_subnet("10.0.1.1/24");
        let bd = builder.bridge_domain("T:BD").unwrap();
        assert_eq!(bd.subnets, vec!["10.0.0.1/24", "10.0.1.1/24"]);
        let tenant = builder.tenant("T").unwrap();
        assert_eq!(tenant.bridge_domains.len(), 1);
        assert!(tenant.bridge_domains.contains("T:BD"));
    }

    #[test]
    fn test_epg_keys() {
        let mut builder = PolicyGraphBuilder::new("test");
        builder.epg_mut("T", Some("A"), "E").unwrap();
        builder.epg_mut("T", None, "E").unwrap();
        builder.epg_mut("T", Some(""), "F").unwrap();
        assert!(builder.epg("T:A:E").is_some());
        assert!(builder.epg("T:E").is_some());
        assert!(builder.epg("T:F").is_some());
        let ap = builder.application_profiles.get("T:A").unwrap();
        assert!(ap.epgs.contains("T:A:E"));
    }
}
