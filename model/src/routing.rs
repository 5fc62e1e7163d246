// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Routing instances and static routes

use ipnet::Ipv4Net;
use serde::Serialize;
use std::net::Ipv4Addr;

/// Name of the routing instance every device carries
pub const DEFAULT_VRF: &str = "default";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StaticRoute {
    pub prefix: Ipv4Net,
    pub next_hop: Option<Ipv4Addr>,
    pub next_hop_interface: Option<String>,
    pub admin_distance: u8,
}
impl StaticRoute {
    pub const DEFAULT_ADMIN_DISTANCE: u8 = 1;

    #[must_use]
    pub fn new(prefix: Ipv4Net) -> Self {
        Self {
            prefix,
            next_hop: None,
            next_hop_interface: None,
            admin_distance: Self::DEFAULT_ADMIN_DISTANCE,
        }
    }
    #[must_use]
    pub fn set_next_hop(mut self, next_hop: Ipv4Addr) -> Self {
        self.next_hop = Some(next_hop);
        self
    }
    #[must_use]
    pub fn set_next_hop_interface(mut self, ifname: &str) -> Self {
        self.next_hop_interface = Some(ifname.to_owned());
        self
    }
    #[must_use]
    pub fn set_admin_distance(mut self, distance: u8) -> Self {
        self.admin_distance = distance;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoutingInstance {
    pub name: String,
    pub description: Option<String>,
    pub static_routes: Vec<StaticRoute>,
}
impl RoutingInstance {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            description: None,
            static_routes: vec![],
        }
    }
    #[must_use]
    pub fn set_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }
    pub fn add_static_route(&mut self, route: StaticRoute) {
        if !self.static_routes.contains(&route) {
            self.static_routes.push(route);
        }
    }
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_VRF
    }
}
