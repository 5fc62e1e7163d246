// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The lowering engine: one device configuration per fabric node

use ipnet::Ipv4Net;
use model::{
    DEFAULT_VRF, DeviceConfig, Interface, InterfaceType, ModelResult, RoutingInstance, StaticRoute,
};
use policy::objects::{Epg, FabricNode, NodeInterface, PortKind};
use policy::{Diagnostics, PolicyGraph};
use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;
use tracectl::trace_target;
use tracing::{debug, info};

use crate::acl::PolicyAcls;
use crate::config::LowerConfig;
use crate::hostnames::device_hostnames;

trace_target!("lower", tracectl::LevelFilter::INFO, &["lower"]);

const TAG: &str = "lower";

/// VLAN id of an encapsulation such as `vlan-100`
fn vlan_of(encap: &str) -> Option<u16> {
    encap
        .trim()
        .strip_prefix("vlan-")
        .and_then(|id| id.parse().ok())
        .filter(|id| (1..=4094).contains(id))
}

/// Deterministic VLAN id in `1..=4094` for a key, used when no encapsulation is known
fn hashed_vlan(key: &str) -> u16 {
    let hash = key
        .encode_utf16()
        .fold(0i32, |h, c| h.wrapping_mul(31).wrapping_add(i32::from(c)));
    u16::try_from(hash.unsigned_abs() % 4094 + 1).unwrap_or(1)
}

/// An address with its prefix length, or a bare address taken as a host route
fn parse_address(raw: &str) -> Option<Ipv4Net> {
    let raw = raw.trim();
    raw.parse::<Ipv4Net>()
        .ok()
        .or_else(|| raw.parse::<Ipv4Addr>().ok().map(Ipv4Net::from))
}

fn report(result: ModelResult, diags: &mut Diagnostics) {
    if let Err(e) = result {
        diags.warn(TAG, e.to_string());
    }
}

/// What every device gets, computed once for the whole fabric
struct FabricWide {
    routing_instances: Vec<RoutingInstance>,
    bridge_domain_interfaces: Vec<Interface>,
    static_routes: Vec<(String, StaticRoute)>, /* routing instance, route */
}

impl FabricWide {
    fn build(graph: &PolicyGraph, config: &LowerConfig, diags: &mut Diagnostics) -> Self {
        let routing_instances = graph
            .vrfs()
            .values()
            .map(|vrf| {
                let instance = RoutingInstance::new(&vrf.key);
                match &vrf.description {
                    Some(description) => instance.set_description(description),
                    None => instance,
                }
            })
            .collect();
        Self {
            routing_instances,
            bridge_domain_interfaces: Self::bridge_domain_interfaces(graph, config, diags),
            static_routes: Self::static_routes(graph, diags),
        }
    }

    /// One VLAN interface per bridge domain, named `vlan<id>-<bd name>`, carrying the
    /// bridge domain subnets. A name already taken by another tenant's bridge domain
    /// becomes `vlan<id>-<tenant>-<bd name>`.
    fn bridge_domain_interfaces(
        graph: &PolicyGraph,
        config: &LowerConfig,
        diags: &mut Diagnostics,
    ) -> Vec<Interface> {
        let mut interfaces = vec![];
        let mut names = BTreeSet::new();
        for bd in graph.bridge_domains().values() {
            let vlan = bd
                .encap
                .as_deref()
                .and_then(vlan_of)
                .unwrap_or_else(|| hashed_vlan(&bd.key));
            let mut name = format!("vlan{vlan}-{}", bd.name);
            if names.contains(&name) {
                name = format!("vlan{vlan}-{}-{}", bd.tenant, bd.name);
            }
            names.insert(name.clone());
            let mut iface = Interface::new(&name, InterfaceType::Vlan)
                .set_vlan(vlan)
                .set_mtu(config.mtu)
                .set_description(&format!("Bridge domain {}", bd.key));
            match bd.vrf.as_ref() {
                Some(vrf) => match graph.vrfs().resolve(vrf) {
                    Some(vrf) => iface = iface.set_vrf(&vrf.key),
                    None => diags.warn(
                        TAG,
                        format!(
                            "Bridge domain {} is bound to unknown VRF {}, its interface {} stays in VRF {DEFAULT_VRF}",
                            bd.key,
                            vrf.key(),
                            iface.name
                        ),
                    ),
                },
                None => debug!("Bridge domain {} has no VRF", bd.key),
            }
            for subnet in &bd.subnets {
                match subnet.trim().parse::<Ipv4Net>() {
                    Ok(net) => iface.push_address(net),
                    Err(_) => diags.warn(
                        TAG,
                        format!("Bridge domain {} has an invalid subnet {subnet}", bd.key),
                    ),
                }
            }
            interfaces.push(iface);
        }
        interfaces
    }

    /// Static routes of every L3Out, in the routing instance of its VRF
    fn static_routes(
        graph: &PolicyGraph,
        diags: &mut Diagnostics,
    ) -> Vec<(String, StaticRoute)> {
        let mut routes = vec![];
        for l3out in graph.l3outs().values() {
            let vrf = l3out
                .vrf
                .as_ref()
                .and_then(|vrf| graph.vrfs().resolve(vrf))
                .map_or(DEFAULT_VRF, |vrf| vrf.key.as_str());
            for route in &l3out.static_routes {
                let Ok(prefix) = route.prefix.trim().parse::<Ipv4Net>() else {
                    diags.warn(
                        TAG,
                        format!(
                            "L3Out {} has an invalid static route prefix {}",
                            l3out.key, route.prefix
                        ),
                    );
                    continue;
                };
                let distance = route
                    .preference
                    .as_deref()
                    .and_then(|pref| pref.trim().parse().ok())
                    .unwrap_or(StaticRoute::DEFAULT_ADMIN_DISTANCE);
                let base = StaticRoute::new(prefix).set_admin_distance(distance);
                if route.next_hops.is_empty() {
                    routes.push((vrf.to_owned(), base));
                    continue;
                }
                for next_hop in &route.next_hops {
                    match next_hop.trim().parse::<Ipv4Addr>() {
                        Ok(nh) => routes.push((vrf.to_owned(), base.clone().set_next_hop(nh))),
                        Err(_) => diags.warn(
                            TAG,
                            format!(
                                "L3Out {} route {prefix} has an invalid next hop {next_hop}",
                                l3out.key
                            ),
                        ),
                    }
                }
            }
        }
        routes
    }
}

struct Lowering<'a> {
    graph: &'a PolicyGraph,
    config: &'a LowerConfig,
    policy: &'a PolicyAcls,
    hostnames: &'a BTreeMap<String, String>,
    fabric: &'a FabricWide,
}

impl Lowering<'_> {
    fn device(
        &self,
        hostname: &str,
        node: Option<&FabricNode>,
        diags: &mut Diagnostics,
    ) -> DeviceConfig {
        let mut device = DeviceConfig::new(hostname);
        for instance in &self.fabric.routing_instances {
            report(device.add_routing_instance(instance.clone()), diags);
        }
        for acl in self.policy.acls() {
            report(device.add_acl(acl.clone()), diags);
        }
        self.add_loopback(&mut device, node, diags);
        if let Some(node) = node {
            for iface in node.interfaces.values() {
                let lowered = self.node_interface(node, iface, diags);
                report(device.add_interface(lowered), diags);
            }
            self.add_peer_link(&mut device, node, diags);
            self.add_management(&mut device, node, diags);
        }
        for iface in &self.fabric.bridge_domain_interfaces {
            report(device.add_interface(iface.clone()), diags);
        }
        for (vrf, route) in &self.fabric.static_routes {
            if let Some(instance) = device.routing_instance_mut(vrf) {
                instance.add_static_route(route.clone());
            }
        }
        report(device.validate(), diags);
        info!(
            "Lowered device {hostname}: {} interfaces, {} access lists",
            device.interfaces().count(),
            device.acls().len()
        );
        device
    }

    /// The loopback, addressed with the router id an L3Out gives the node, if any
    fn add_loopback(
        &self,
        device: &mut DeviceConfig,
        node: Option<&FabricNode>,
        diags: &mut Diagnostics,
    ) {
        let mut loopback = Interface::new(&self.config.loopback_interface, InterfaceType::Loopback);
        let router_id = node.and_then(|node| {
            self.graph
                .l3outs()
                .values()
                .flat_map(|l3out| l3out.nodes.iter())
                .filter(|l3node| l3node.node_id.as_deref() == Some(node.node_id.as_str()))
                .find_map(|l3node| l3node.router_id.as_deref())
        });
        if let Some(router_id) = router_id {
            match router_id.trim().parse::<Ipv4Addr>() {
                Ok(addr) => loopback.push_address(Ipv4Net::from(addr)),
                Err(_) => diags.warn(
                    TAG,
                    format!("Device {}: invalid router id {router_id}", device.hostname),
                ),
            }
        }
        report(device.add_interface(loopback), diags);
    }

    /// VRF of the bridge domain of an EPG, when both references resolve
    fn epg_vrf(&self, epg: &Epg) -> Option<&str> {
        let bd = epg
            .bridge_domain
            .as_ref()
            .and_then(|bd| self.graph.bridge_domains().resolve(bd))?;
        let vrf = bd.vrf.as_ref().and_then(|vrf| self.graph.vrfs().resolve(vrf))?;
        Some(&vrf.key)
    }

    fn node_interface(
        &self,
        node: &FabricNode,
        iface: &NodeInterface,
        diags: &mut Diagnostics,
    ) -> Interface {
        let iftype = match iface.kind {
            PortKind::Physical => InterfaceType::Physical,
            PortKind::PortChannel | PortKind::Vpc => InterfaceType::Aggregated,
        };
        let mut lowered = Interface::new(&iface.name, iftype)
            .set_admin_up(iface.enabled)
            .set_mtu(iface.mtu.unwrap_or(self.config.mtu));

        let attachment = self
            .graph
            .path_attachments(&node.node_id)
            .and_then(|atts| atts.get(&iface.name));
        let description = match attachment {
            Some(att) if att.epg_name.is_some() => Some(format!(
                "EPG {}:{} encap {}",
                att.epg_tenant.as_deref().unwrap_or_default(),
                att.epg_name.as_deref().unwrap_or_default(),
                att.encap.as_deref().unwrap_or("-")
            )),
            Some(att) => att.description.clone().or_else(|| iface.description.clone()),
            None => iface.description.clone(),
        };
        if let Some(description) = description {
            lowered = lowered.set_description(&description);
        }
        if let Some(vlan) = iface.encap.as_deref().and_then(vlan_of) {
            lowered = lowered.set_vlan(vlan);
        }

        let Some(epg_key) = iface.epg.as_deref() else {
            return lowered;
        };
        let Some(epg) = self.graph.epgs().by_key(epg_key) else {
            diags.warn(
                TAG,
                format!(
                    "Interface {} of node {} is bound to unknown EPG {epg_key}",
                    iface.name, node.node_id
                ),
            );
            return lowered;
        };
        if let Some(vrf) = self.epg_vrf(epg) {
            lowered = lowered.set_vrf(vrf);
        }
        if let Some(filters) = self.policy.epg_filters(&epg.key) {
            lowered.incoming_filter.clone_from(&filters.incoming);
            lowered.outgoing_filter.clone_from(&filters.outgoing);
        }
        lowered
    }

    /// The vPC peer link of a node that belongs to a vPC pair
    fn add_peer_link(
        &self,
        device: &mut DeviceConfig,
        node: &FabricNode,
        diags: &mut Diagnostics,
    ) {
        let Some(peer) = self.graph.vpc_peer(&node.node_id) else {
            return;
        };
        let peer = self.hostnames.get(peer).map_or(peer, String::as_str);
        let link = Interface::new(&self.config.peer_link_interface, InterfaceType::Aggregated)
            .set_description(&format!("vPC peer link to {peer}"))
            .set_mtu(self.config.mtu);
        report(device.add_interface(link), diags);
    }

    /// The out-of-band management interface, always administratively up
    fn add_management(
        &self,
        device: &mut DeviceConfig,
        node: &FabricNode,
        diags: &mut Diagnostics,
    ) {
        let Some(info) = node
            .management
            .as_ref()
            .filter(|info| !info.address.trim().is_empty())
        else {
            return;
        };
        let description = match info.gateway.as_deref() {
            Some(gateway) => format!("Out-of-band management, gateway {gateway}"),
            None => "Out-of-band management".to_owned(),
        };
        let mut mgmt = Interface::new(&self.config.mgmt_interface, InterfaceType::Physical)
            .set_admin_up(true)
            .set_description(&description);
        match parse_address(&info.address) {
            Some(address) => mgmt.push_address(address),
            None => diags.warn(
                TAG,
                format!(
                    "Node {} has an invalid management address {}",
                    node.node_id, info.address
                ),
            ),
        }
        report(device.add_interface(mgmt), diags);
    }
}

/// Lower `graph` with the default [`LowerConfig`]
pub fn lower(graph: &PolicyGraph, diags: &mut Diagnostics) -> BTreeMap<String, DeviceConfig> {
    lower_with(graph, &LowerConfig::default(), diags)
}

/// Build the configuration of every device of the fabric, by hostname. A graph without
/// fabric nodes gives one device named after the graph. Lowering never fails: what
/// cannot be expressed is reported in `diags`.
pub fn lower_with(
    graph: &PolicyGraph,
    config: &LowerConfig,
    diags: &mut Diagnostics,
) -> BTreeMap<String, DeviceConfig> {
    let policy = PolicyAcls::compile(graph, diags);
    let hostnames = device_hostnames(graph);
    for node in graph.fabric_nodes().values() {
        if let Some(hostname) = hostnames.get(&node.node_id).filter(|h| *h != node.hostname()) {
            diags.warn(
                TAG,
                format!(
                    "Duplicate hostname {} for node {}, using {hostname}",
                    node.hostname(),
                    node.node_id
                ),
            );
        }
    }
    let fabric = FabricWide::build(graph, config, diags);
    let lowering = Lowering {
        graph,
        config,
        policy: &policy,
        hostnames: &hostnames,
        fabric: &fabric,
    };

    let mut devices = BTreeMap::new();
    if graph.fabric_nodes().is_empty() {
        let hostname = config
            .synthetic_hostname
            .clone()
            .unwrap_or_else(|| graph.name().to_owned());
        debug!("No fabric nodes, lowering {} as a single device", hostname);
        let device = lowering.device(&hostname, None, diags);
        devices.insert(hostname, device);
    }
    for node in graph.fabric_nodes().values() {
        let Some(hostname) = hostnames.get(&node.node_id) else {
            continue;
        };
        let device = lowering.device(hostname, Some(node), diags);
        devices.insert(hostname.clone(), device);
    }
    info!(
        "Lowered {} into {} devices with {} access lists each",
        graph.name(),
        devices.len(),
        policy.len()
    );
    devices
}
