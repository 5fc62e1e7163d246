// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Device interfaces

use ipnet::Ipv4Net;
use serde::Serialize;
use strum::Display;

use crate::routing::DEFAULT_VRF;

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterfaceType {
    Physical,
    Aggregated,
    Vlan,
    Loopback,
    Other,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
/// A device interface. Addresses are kept in configuration order.
pub struct Interface {
    pub name: String, /* key */
    pub iftype: InterfaceType,
    pub description: Option<String>,
    pub addresses: Vec<Ipv4Net>,
    pub admin_up: bool,
    pub vrf: String,
    pub mtu: Option<u16>,
    pub vlan: Option<u16>,
    pub incoming_filter: Option<String>, /* name of an access list */
    pub outgoing_filter: Option<String>, /* name of an access list */
}

impl Interface {
    #[must_use]
    pub fn new(name: &str, iftype: InterfaceType) -> Self {
        Self {
            name: name.to_owned(),
            iftype,
            description: None,
            addresses: vec![],
            admin_up: true,
            vrf: DEFAULT_VRF.to_owned(),
            mtu: None,
            vlan: None,
            incoming_filter: None,
            outgoing_filter: None,
        }
    }
    #[must_use]
    pub fn set_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }
    #[must_use]
    pub fn set_admin_up(mut self, admin_up: bool) -> Self {
        self.admin_up = admin_up;
        self
    }
    #[must_use]
    pub fn set_vrf(mut self, vrf: &str) -> Self {
        vrf.clone_into(&mut self.vrf);
        self
    }
    #[must_use]
    pub fn set_mtu(mut self, mtu: u16) -> Self {
        self.mtu = Some(mtu);
        self
    }
    #[must_use]
    pub fn set_vlan(mut self, vlan: u16) -> Self {
        self.vlan = Some(vlan);
        self
    }
    /// Add an address unless it is already configured
    #[must_use]
    pub fn add_address(mut self, address: Ipv4Net) -> Self {
        self.push_address(address);
        self
    }
    pub fn push_address(&mut self, address: Ipv4Net) {
        if !self.addresses.contains(&address) {
            self.addresses.push(address);
        }
    }
    #[must_use]
    pub fn primary_address(&self) -> Option<&Ipv4Net> {
        self.addresses.first()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // valid in tests
mod test {
    use super::{Interface, InterfaceType};

    #[test]
    fn test_interface_builder() {
        let iface = Interface::new("vlan10-web", InterfaceType::Vlan)
            .set_vlan(10)
            .set_vrf("prod:vrf1")
            .add_address("10.1.1.1/24".parse().unwrap())
            .add_address("10.1.1.1/24".parse().unwrap())
            .add_address("10.2.2.1/24".parse().unwrap());
        assert_eq!(iface.addresses.len(), 2);
        assert_eq!(iface.primary_address().unwrap().prefix_len(), 24);
        assert_eq!(iface.vrf, "prod:vrf1");
        assert!(iface.admin_up);
        assert_eq!(iface.iftype.to_string(), "VLAN");
    }
}
