// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Tenant-scoped entities: tenants, VRFs, bridge domains, application profiles and EPGs

use std::collections::BTreeSet;

use crate::attributes::Attributes;
use crate::graph::Ref;
use crate::keys::compose;
use crate::objects::contract::{Contract, ContractInterface, TabooContract};

#[derive(Clone, Debug, Default, PartialEq)]
/// A tenant. Child collections hold composite keys; the entities live in the graph.
pub struct Tenant {
    pub name: String, /* key */
    pub description: Option<String>,
    pub attrs: Attributes,
    pub vrfs: BTreeSet<String>,
    pub bridge_domains: BTreeSet<String>,
    pub application_profiles: BTreeSet<String>,
    pub epgs: BTreeSet<String>,
    pub contracts: BTreeSet<String>,
    pub taboos: BTreeSet<String>,
    pub filters: BTreeSet<String>,
    pub contract_interfaces: BTreeSet<String>,
    pub l3outs: BTreeSet<String>,
    pub l2outs: BTreeSet<String>,
}
impl Tenant {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Vrf {
    pub key: String,
    pub name: String,
    pub tenant: String,
    pub description: Option<String>,
    pub policy_enforcement: Option<String>, /* pcEnfPref */
    pub enforcement_direction: Option<String>, /* pcEnfDir */
    pub attrs: Attributes,
}
impl Vrf {
    #[must_use]
    pub fn new(tenant: &str, name: &str) -> Self {
        Self {
            key: compose(tenant, name),
            name: name.to_owned(),
            tenant: tenant.to_owned(),
            description: None,
            policy_enforcement: None,
            enforcement_direction: None,
            attrs: Attributes::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BridgeDomain {
    pub key: String,
    pub name: String,
    pub tenant: String,
    pub description: Option<String>,
    pub vrf: Option<Ref<Vrf>>,
    pub subnets: Vec<String>, /* CIDR strings, as configured */
    pub encap: Option<String>,
    pub arp_flood: bool,
    pub unicast_route: bool,
    pub limit_ip_learn: bool,
    pub unknown_unicast: Option<String>,
    pub mac: Option<String>,
    pub attrs: Attributes,
}
impl BridgeDomain {
    #[must_use]
    pub fn new(tenant: &str, name: &str) -> Self {
        Self {
            key: compose(tenant, name),
            name: name.to_owned(),
            tenant: tenant.to_owned(),
            description: None,
            vrf: None,
            subnets: vec![],
            encap: None,
            arp_flood: false,
            unicast_route: true,
            limit_ip_learn: false,
            unknown_unicast: None,
            mac: None,
            attrs: Attributes::new(),
        }
    }
    pub fn add_subnet(&mut self, subnet: &str) {
        if !self.subnets.iter().any(|s| s == subnet) {
            self.subnets.push(subnet.to_owned());
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApplicationProfile {
    pub key: String,
    pub name: String,
    pub tenant: String,
    pub description: Option<String>,
    pub epgs: BTreeSet<String>,
}
impl ApplicationProfile {
    #[must_use]
    pub fn new(tenant: &str, name: &str) -> Self {
        Self {
            key: compose(tenant, name),
            name: name.to_owned(),
            tenant: tenant.to_owned(),
            description: None,
            epgs: BTreeSet::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
/// Contract relationships shared by EPGs and external EPGs
pub struct ContractRelations {
    pub provided: Vec<Ref<Contract>>,
    pub consumed: Vec<Ref<Contract>>,
    pub provided_interfaces: Vec<Ref<ContractInterface>>,
    pub consumed_interfaces: Vec<Ref<ContractInterface>>,
    pub taboos: Vec<Ref<TabooContract>>,
}
impl ContractRelations {
    fn push_unique<T>(refs: &mut Vec<Ref<T>>, name: &str) {
        if !refs.iter().any(|r| r.name() == name) {
            refs.push(Ref::new(name));
        }
    }
    pub fn provide(&mut self, contract: &str) {
        Self::push_unique(&mut self.provided, contract);
    }
    pub fn consume(&mut self, contract: &str) {
        Self::push_unique(&mut self.consumed, contract);
    }
    pub fn provide_interface(&mut self, cpif: &str) {
        Self::push_unique(&mut self.provided_interfaces, cpif);
    }
    pub fn consume_interface(&mut self, cpif: &str) {
        Self::push_unique(&mut self.consumed_interfaces, cpif);
    }
    pub fn protect_by(&mut self, taboo: &str) {
        Self::push_unique(&mut self.taboos, taboo);
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.provided.is_empty()
            && self.consumed.is_empty()
            && self.provided_interfaces.is_empty()
            && self.consumed_interfaces.is_empty()
            && self.taboos.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
/// An endpoint group. Its key is `tenant:ap:epg`, or `tenant:epg` when it sits directly
/// under its tenant.
pub struct Epg {
    pub key: String,
    pub name: String,
    pub tenant: String,
    pub application_profile: Option<String>,
    pub description: Option<String>,
    pub bridge_domain: Option<Ref<BridgeDomain>>,
    pub relations: ContractRelations,
    pub domains: Vec<String>, /* fvRsDomAtt targets */
    pub attrs: Attributes,
}
impl Epg {
    #[must_use]
    pub fn new(tenant: &str, application_profile: Option<&str>, name: &str) -> Self {
        let parent = match application_profile {
            Some(ap) => compose(tenant, ap),
            None => tenant.to_owned(),
        };
        Self {
            key: compose(&parent, name),
            name: name.to_owned(),
            tenant: tenant.to_owned(),
            application_profile: application_profile.map(str::to_owned),
            description: None,
            bridge_domain: None,
            relations: ContractRelations::default(),
            domains: vec![],
            attrs: Attributes::new(),
        }
    }
}
