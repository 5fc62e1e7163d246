// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Per-device configuration

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::acl::{Acl, AclTable, LineAction};
use crate::errors::{ModelError, ModelResult};
use crate::flow::Flow;
use crate::interface::Interface;
use crate::routing::{DEFAULT_VRF, RoutingInstance};

#[derive(Clone, Debug, PartialEq, Serialize)]
/// The vendor-neutral configuration of one device. A [`DeviceConfig`] always has
/// a routing instance named [`DEFAULT_VRF`].
pub struct DeviceConfig {
    pub hostname: String,
    routing_instances: BTreeMap<String, RoutingInstance>,
    interfaces: BTreeMap<String, Interface>,
    acls: AclTable,
}

impl DeviceConfig {
    #[must_use]
    pub fn new(hostname: &str) -> Self {
        let mut routing_instances = BTreeMap::new();
        routing_instances.insert(DEFAULT_VRF.to_owned(), RoutingInstance::new(DEFAULT_VRF));
        Self {
            hostname: hostname.to_owned(),
            routing_instances,
            interfaces: BTreeMap::new(),
            acls: AclTable::new(),
        }
    }

    /// Add a [`RoutingInstance`]
    pub fn add_routing_instance(&mut self, instance: RoutingInstance) -> ModelResult {
        if self.routing_instances.contains_key(&instance.name) {
            return Err(ModelError::DuplicateRoutingInstance {
                device: self.hostname.clone(),
                name: instance.name,
            });
        }
        self.routing_instances.insert(instance.name.clone(), instance);
        Ok(())
    }
    #[must_use]
    pub fn routing_instance(&self, name: &str) -> Option<&RoutingInstance> {
        self.routing_instances.get(name)
    }
    pub fn routing_instance_mut(&mut self, name: &str) -> Option<&mut RoutingInstance> {
        self.routing_instances.get_mut(name)
    }
    pub fn routing_instances(&self) -> impl Iterator<Item = &RoutingInstance> {
        self.routing_instances.values()
    }

    /// Add an [`Interface`]. Interface names are unique within a device.
    pub fn add_interface(&mut self, interface: Interface) -> ModelResult {
        if self.interfaces.contains_key(&interface.name) {
            return Err(ModelError::DuplicateInterface {
                device: self.hostname.clone(),
                name: interface.name,
            });
        }
        debug!("{}: adding interface {}", self.hostname, interface.name);
        self.interfaces.insert(interface.name.clone(), interface);
        Ok(())
    }
    #[must_use]
    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.get(name)
    }
    pub fn interface_mut(&mut self, name: &str) -> Option<&mut Interface> {
        self.interfaces.get_mut(name)
    }
    pub fn interfaces(&self) -> impl Iterator<Item = &Interface> {
        self.interfaces.values()
    }

    /// Add an [`Acl`]. Access list names are unique within a device.
    pub fn add_acl(&mut self, acl: Acl) -> ModelResult {
        self.acls.add(acl).map_err(|acl| ModelError::DuplicateAcl {
            device: self.hostname.clone(),
            name: acl.name,
        })
    }
    #[must_use]
    pub fn acl(&self, name: &str) -> Option<&Acl> {
        self.acls.get(name)
    }
    #[must_use]
    pub fn acls(&self) -> &AclTable {
        &self.acls
    }

    /// What the incoming filter of interface `ifname` does with `flow`. An interface without
    /// a filter permits everything; `None` if there is no such interface.
    #[must_use]
    pub fn filter_incoming(&self, ifname: &str, flow: &Flow) -> Option<LineAction> {
        let iface = self.interfaces.get(ifname)?;
        Some(self.apply_filter(iface.incoming_filter.as_deref(), flow))
    }
    /// Same as [`DeviceConfig::filter_incoming`] for the outgoing filter
    #[must_use]
    pub fn filter_outgoing(&self, ifname: &str, flow: &Flow) -> Option<LineAction> {
        let iface = self.interfaces.get(ifname)?;
        Some(self.apply_filter(iface.outgoing_filter.as_deref(), flow))
    }
    fn apply_filter(&self, filter: Option<&str>, flow: &Flow) -> LineAction {
        match filter {
            None => LineAction::Permit,
            Some(name) => self
                .acls
                .get(name)
                .map_or(LineAction::Deny, |acl| acl.filter(flow, &self.acls)),
        }
    }

    /// Check that every interface refers to existing routing instances and access lists
    pub fn validate(&self) -> ModelResult {
        if self.hostname.is_empty() {
            return Err(ModelError::MissingIdentifier("device hostname"));
        }
        for iface in self.interfaces.values() {
            if !self.routing_instances.contains_key(&iface.vrf) {
                return Err(ModelError::UnknownRoutingInstance {
                    device: self.hostname.clone(),
                    interface: iface.name.clone(),
                    vrf: iface.vrf.clone(),
                });
            }
            let filters = [&iface.incoming_filter, &iface.outgoing_filter];
            for acl in filters.into_iter().flatten() {
                if !self.acls.contains(acl) {
                    return Err(ModelError::UnknownAcl {
                        device: self.hostname.clone(),
                        interface: iface.name.clone(),
                        acl: acl.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // valid in tests
mod test {
    use super::DeviceConfig;
    use crate::acl::{Acl, AclLine, LineAction, MatchExpr};
    use crate::errors::ModelError;
    use crate::flow::Flow;
    use crate::interface::{Interface, InterfaceType};
    use crate::routing::{DEFAULT_VRF, RoutingInstance};
    use pretty_assertions::assert_eq;
    use std::net::Ipv4Addr;
    use tracing_test::traced_test;

    #[test]
    fn test_default_routing_instance() {
        let device = DeviceConfig::new("leaf1");
        assert!(device.routing_instance(DEFAULT_VRF).unwrap().is_default());
        assert_eq!(device.routing_instances().count(), 1);
    }

    #[traced_test]
    #[test]
    fn test_duplicates_rejected() {
        let mut device = DeviceConfig::new("leaf1");
        device
            .add_interface(Interface::new("eth1/1", InterfaceType::Physical))
            .unwrap();
        assert!(logs_contain("leaf1: adding interface eth1/1"));
        assert_eq!(
            device.add_interface(Interface::new("eth1/1", InterfaceType::Physical)),
            Err(ModelError::DuplicateInterface {
                device: "leaf1".to_owned(),
                name: "eth1/1".to_owned()
            })
        );
        assert_eq!(
            device.add_routing_instance(RoutingInstance::new(DEFAULT_VRF)),
            Err(ModelError::DuplicateRoutingInstance {
                device: "leaf1".to_owned(),
                name: DEFAULT_VRF.to_owned()
            })
        );
        device.add_acl(Acl::new("acl")).unwrap();
        assert_eq!(
            device.add_acl(Acl::new("acl")),
            Err(ModelError::DuplicateAcl {
                device: "leaf1".to_owned(),
                name: "acl".to_owned()
            })
        );
    }

    #[test]
    fn test_interface_filters() {
        let mut device = DeviceConfig::new("leaf1");
        let mut acl = Acl::new("ssh-only");
        acl.add_line(AclLine::permit(
            "ssh",
            MatchExpr::DstPorts(vec![crate::PortRange::single(22)]),
        ));
        device.add_acl(acl).unwrap();
        let mut iface = Interface::new("eth1/2", InterfaceType::Physical);
        iface.incoming_filter = Some("ssh-only".to_owned());
        device.add_interface(iface).unwrap();
        device.validate().unwrap();

        let src = Ipv4Addr::new(10, 0, 0, 1);
        let dst = Ipv4Addr::new(10, 0, 0, 2);
        let ssh = Flow::tcp(src, 50000, dst, 22);
        let web = Flow::tcp(src, 50000, dst, 80);
        assert_eq!(device.filter_incoming("eth1/2", &ssh), Some(LineAction::Permit));
        assert_eq!(device.filter_incoming("eth1/2", &web), Some(LineAction::Deny));
        assert_eq!(device.filter_outgoing("eth1/2", &web), Some(LineAction::Permit));
        assert_eq!(device.filter_incoming("eth1/3", &web), None);
    }

    #[test]
    fn test_validate_dangling() {
        let mut device = DeviceConfig::new("leaf1");
        device
            .add_interface(Interface::new("vlan10-bd", InterfaceType::Vlan).set_vrf("t:missing"))
            .unwrap();
        assert_eq!(
            device.validate(),
            Err(ModelError::UnknownRoutingInstance {
                device: "leaf1".to_owned(),
                interface: "vlan10-bd".to_owned(),
                vrf: "t:missing".to_owned()
            })
        );
    }
}
