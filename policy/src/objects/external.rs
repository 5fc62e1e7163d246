// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! External connectivity: routed (L3Out) and bridged (L2Out) outsides

use crate::attributes::Attributes;
use crate::graph::Ref;
use crate::keys::compose;
use crate::objects::tenant::{BridgeDomain, ContractRelations, Vrf};

#[derive(Clone, Debug, PartialEq)]
/// An external EPG. Its key is `tenant:outside:epg`.
pub struct ExternalEpg {
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub subnets: Vec<String>,
    pub relations: ContractRelations,
}
impl ExternalEpg {
    #[must_use]
    pub fn new(outside_key: &str, name: &str) -> Self {
        Self {
            key: compose(outside_key, name),
            name: name.to_owned(),
            description: None,
            subnets: vec![],
            relations: ContractRelations::default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct L3StaticRoute {
    pub prefix: String,
    pub next_hops: Vec<String>,
    pub preference: Option<String>,
    pub interface: Option<String>,
    pub node_id: Option<String>, /* set when configured under a logical node profile */
}
impl L3StaticRoute {
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_owned(),
            ..Default::default()
        }
    }
    pub fn add_next_hop(&mut self, next_hop: &str) {
        if !self.next_hops.iter().any(|nh| nh == next_hop) {
            self.next_hops.push(next_hop.to_owned());
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BgpPeer {
    pub address: String,
    pub remote_as: Option<String>,
    pub local_as: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BgpConfig {
    pub router_id: Option<String>,
    pub asn: Option<u32>,
    pub peers: Vec<BgpPeer>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct OspfConfig {
    pub name: Option<String>,
    pub area: Option<String>,
    pub area_type: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
/// A border leaf taking part in an L3Out
pub struct L3OutNode {
    pub tdn: String,
    pub node_id: Option<String>,
    pub router_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
/// A routed interface of an L3Out
pub struct L3OutPath {
    pub tdn: String,
    pub address: Option<String>,
    pub encap: Option<String>,
    pub if_type: Option<String>, /* ifInstT */
    pub mtu: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
/// A routed outside
pub struct L3Out {
    pub key: String,
    pub name: String,
    pub tenant: String,
    pub description: Option<String>,
    pub vrf: Option<Ref<Vrf>>,
    pub enforce_route_control: Option<String>,
    pub mpls_enabled: Option<String>,
    pub target_dscp: Option<String>,
    pub external_epgs: Vec<ExternalEpg>,
    pub static_routes: Vec<L3StaticRoute>,
    pub bgp: Option<BgpConfig>,
    pub ospf: Option<OspfConfig>,
    pub nodes: Vec<L3OutNode>,
    pub paths: Vec<L3OutPath>,
    pub attrs: Attributes,
}
impl L3Out {
    #[must_use]
    pub fn new(tenant: &str, name: &str) -> Self {
        Self {
            key: compose(tenant, name),
            name: name.to_owned(),
            tenant: tenant.to_owned(),
            description: None,
            vrf: None,
            enforce_route_control: None,
            mpls_enabled: None,
            target_dscp: None,
            external_epgs: vec![],
            static_routes: vec![],
            bgp: None,
            ospf: None,
            nodes: vec![],
            paths: vec![],
            attrs: Attributes::new(),
        }
    }
    /// Default name of an external EPG configured without one
    #[must_use]
    pub fn default_epg_name(&self) -> String {
        format!("extepg-{}", self.name)
    }
    /// Index of the external EPG named `name`, created if missing
    pub fn external_epg_index(&mut self, name: &str) -> usize {
        if let Some(pos) = self.external_epgs.iter().position(|e| e.name == name) {
            return pos;
        }
        self.external_epgs.push(ExternalEpg::new(&self.key, name));
        self.external_epgs.len() - 1
    }
    #[must_use]
    pub fn external_epg(&self, name: &str) -> Option<&ExternalEpg> {
        self.external_epgs.iter().find(|e| e.name == name)
    }
}

#[derive(Clone, Debug, PartialEq)]
/// A bridged outside
pub struct L2Out {
    pub key: String,
    pub name: String,
    pub tenant: String,
    pub description: Option<String>,
    pub bridge_domain: Option<Ref<BridgeDomain>>,
    pub encap: Option<String>,
    pub external_epgs: Vec<ExternalEpg>,
    pub attrs: Attributes,
}
impl L2Out {
    #[must_use]
    pub fn new(tenant: &str, name: &str) -> Self {
        Self {
            key: compose(tenant, name),
            name: name.to_owned(),
            tenant: tenant.to_owned(),
            description: None,
            bridge_domain: None,
            encap: None,
            external_epgs: vec![],
            attrs: Attributes::new(),
        }
    }
}
