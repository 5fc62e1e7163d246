// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Display implementations for the device model

use std::fmt::{Display, Formatter};

use crate::acl::{Acl, AclLine, MatchExpr, PortRange};
use crate::device::DeviceConfig;
use crate::interface::Interface;
use crate::link::Link;
use crate::routing::{RoutingInstance, StaticRoute};

fn fmt_list<T: Display>(f: &mut Formatter<'_>, items: &[T], sep: &str) -> std::fmt::Result {
    for (n, item) in items.iter().enumerate() {
        if n > 0 {
            write!(f, "{sep}")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl Display for PortRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.start() == self.end() {
            write!(f, "{}", self.start())
        } else {
            write!(f, "{}-{}", self.start(), self.end())
        }
    }
}

impl Display for MatchExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchExpr::True => write!(f, "any"),
            MatchExpr::False => write!(f, "none"),
            MatchExpr::And(exprs) => {
                write!(f, "(")?;
                fmt_list(f, exprs, " and ")?;
                write!(f, ")")
            }
            MatchExpr::Or(exprs) => {
                write!(f, "(")?;
                fmt_list(f, exprs, " or ")?;
                write!(f, ")")
            }
            MatchExpr::IpProtocol(p) => write!(f, "proto {p}"),
            MatchExpr::SrcPorts(ports) => {
                write!(f, "sport ")?;
                fmt_list(f, ports, ",")
            }
            MatchExpr::DstPorts(ports) => {
                write!(f, "dport ")?;
                fmt_list(f, ports, ",")
            }
            MatchExpr::IcmpType(t) => write!(f, "icmp-type {t}"),
            MatchExpr::IcmpCode(c) => write!(f, "icmp-code {c}"),
            MatchExpr::SrcIp(net) => write!(f, "src {net}"),
            MatchExpr::DstIp(net) => write!(f, "dst {net}"),
            MatchExpr::PermittedByAcl(name) => write!(f, "permitted-by {name}"),
        }
    }
}

impl Display for AclLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:<6} {} [{}]", self.action, self.matcher, self.name)
    }
}

impl Display for Acl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, " acl {}", self.name)?;
        for (seq, line) in self.lines.iter().enumerate() {
            writeln!(f, "   {:>3} {line}", (seq + 1) * 10)?;
        }
        Ok(())
    }
}

impl Display for Interface {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = if self.admin_up { "up" } else { "down" };
        write!(f, " {:<24} {:<10} {:<5} vrf {}", self.name, self.iftype, state, self.vrf)?;
        if let Some(vlan) = self.vlan {
            write!(f, " vlan {vlan}")?;
        }
        if !self.addresses.is_empty() {
            write!(f, " addr ")?;
            fmt_list(f, &self.addresses, ",")?;
        }
        if let Some(acl) = &self.incoming_filter {
            write!(f, " in {acl}")?;
        }
        if let Some(acl) = &self.outgoing_filter {
            write!(f, " out {acl}")?;
        }
        if let Some(descr) = &self.description {
            write!(f, " ({descr})")?;
        }
        Ok(())
    }
}

impl Display for StaticRoute {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "   route {}", self.prefix)?;
        if let Some(nh) = self.next_hop {
            write!(f, " via {nh}")?;
        }
        if let Some(ifname) = &self.next_hop_interface {
            write!(f, " dev {ifname}")?;
        }
        write!(f, " distance {}", self.admin_distance)
    }
}

impl Display for RoutingInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, " vrf {}", self.name)?;
        for route in &self.static_routes {
            writeln!(f, "{route}")?;
        }
        Ok(())
    }
}

impl Display for DeviceConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "━━━━━━━━━ device {} ━━━━━━━━━", self.hostname)?;
        for instance in self.routing_instances() {
            write!(f, "{instance}")?;
        }
        for iface in self.interfaces() {
            writeln!(f, "{iface}")?;
        }
        for acl in self.acls().values() {
            write!(f, "{acl}")?;
        }
        Ok(())
    }
}

impl Display for Link {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <-> {}", self.node_a(), self.node_b())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // valid in tests
mod test {
    use crate::acl::{AclLine, IP_PROTO_TCP, MatchExpr, PortRange};

    #[test]
    fn test_line_display() {
        let line = AclLine::permit(
            "web/http",
            MatchExpr::and(vec![
                MatchExpr::IpProtocol(IP_PROTO_TCP),
                MatchExpr::DstPorts(vec![PortRange::new(80, 81).unwrap()]),
            ]),
        );
        assert_eq!(line.to_string(), "permit (proto 6 and dport 80-81) [web/http]");
    }
}
