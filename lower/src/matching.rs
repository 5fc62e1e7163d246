// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Match predicates of filter entries. Field values are interpreted here: placeholders,
//! protocol/port/ICMP mnemonics, port ranges, ether types and addresses.

use ipnet::Ipv4Net;
use model::acl::{
    IP_PROTO_GRE, IP_PROTO_ICMP, IP_PROTO_IGMP, IP_PROTO_IPINIP, IP_PROTO_OSPF, IP_PROTO_PIM,
    IP_PROTO_SCTP, IP_PROTO_TCP, IP_PROTO_UDP,
};
use model::{MatchExpr, PortRange};
use policy::Diagnostics;
use policy::objects::EntryFields;
use std::net::Ipv4Addr;
use tracing::debug;

const TAG: &str = "lower";

const ETHERTYPE_IPV4: u32 = 0x0800;
const ETHERTYPE_ARP: u32 = 0x0806;
const ETHERTYPE_IPV6: u32 = 0x86dd;

static PROTOCOL_NAMES: &[(&str, u8)] = &[
    ("icmp", IP_PROTO_ICMP),
    ("igmp", IP_PROTO_IGMP),
    ("ipinip", IP_PROTO_IPINIP),
    ("tcp", IP_PROTO_TCP),
    ("udp", IP_PROTO_UDP),
    ("gre", IP_PROTO_GRE),
    ("ospf", IP_PROTO_OSPF),
    ("ospfigp", IP_PROTO_OSPF),
    ("pim", IP_PROTO_PIM),
    ("sctp", IP_PROTO_SCTP),
];

static PORT_NAMES: &[(&str, u16)] = &[
    ("ftpData", 20),
    ("ssh", 22),
    ("smtp", 25),
    ("dns", 53),
    ("http", 80),
    ("pop3", 110),
    ("https", 443),
    ("rtsp", 554),
];

static ICMP_TYPE_NAMES: &[(&str, u8)] = &[
    ("echo-reply", 0),
    ("echo-rep", 0),
    ("destination-unreachable", 3),
    ("dest-unreachable", 3),
    ("dst-unreach", 3),
    ("source-quench", 4),
    ("src-quench", 4),
    ("redirect", 5),
    ("echo-request", 8),
    ("echo", 8),
    ("router-advert", 9),
    ("router-solicit", 10),
    ("time-exceeded", 11),
    ("param-problem", 12),
    ("timestamp", 13),
    ("timestamp-reply", 14),
];

static ETHERTYPE_NAMES: &[(&str, u32)] = &[
    ("ip", ETHERTYPE_IPV4),
    ("ipv4", ETHERTYPE_IPV4),
    ("arp", ETHERTYPE_ARP),
    ("ipv6", ETHERTYPE_IPV6),
    ("trill", 0x22f3),
    ("mpls", 0x8847),
    ("mpls_ucast", 0x8847),
    ("mpls_unicast", 0x8847),
    ("mpls_multicast", 0x8848),
    ("mac_security", 0x88e5),
    ("fcoe", 0x8906),
];

/// True for values that stand for "no constraint"
fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty()
        || value.eq_ignore_ascii_case("unspecified")
        || value.eq_ignore_ascii_case("any")
}

/// The value of a field, unless it is absent or a placeholder
fn given(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !is_placeholder(v))
}

fn lookup<T: Copy>(table: &[(&str, T)], name: &str) -> Option<T> {
    table
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| *v)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
/// A port field after interpretation
pub enum PortValue {
    Any,
    Port(u16),
    Range(u16, u16),
    Invalid,
}

fn port_number(value: &str) -> Option<u16> {
    let value = value.trim();
    lookup(PORT_NAMES, value).or_else(|| value.parse().ok())
}

impl PortValue {
    /// Interpret a port field: a number, a mnemonic or a `from-to` range. `0` and `0-0`
    /// are placeholders, as are the generic ones.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> PortValue {
        let Some(raw) = given(raw) else {
            return PortValue::Any;
        };
        if raw == "0" || raw == "0-0" {
            return PortValue::Any;
        }
        if let Some(port) = port_number(raw) {
            return PortValue::Port(port);
        }
        match raw.split_once('-').map(|(a, b)| (port_number(a), port_number(b))) {
            Some((Some(a), Some(b))) => PortValue::Range(a, b),
            _ => PortValue::Invalid,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Protocol {
    Any,
    Number(u8),
    /// A protocol the model never carries (IPv6 only)
    Never,
}

/// Compiles the fields of one filter entry into a [`MatchExpr`], reporting what it
/// cannot express as warnings on behalf of `origin`
pub struct EntryCompiler<'a> {
    origin: &'a str,
    diags: &'a mut Diagnostics,
}

impl<'a> EntryCompiler<'a> {
    #[must_use]
    pub fn new(origin: &'a str, diags: &'a mut Diagnostics) -> Self {
        Self { origin, diags }
    }

    fn warn(&mut self, message: &str) {
        self.diags.warn(TAG, format!("{}: {message}", self.origin));
    }

    /// A conjunction of every constraint the fields carry. Unconstrained fields
    /// contribute nothing; fields without a usable value are dropped with a warning.
    pub fn compile(&mut self, fields: &EntryFields) -> MatchExpr {
        let mut conjuncts = vec![];
        if let Some(ether) = self.ether_type(fields.ether_type.as_deref()) {
            conjuncts.push(ether);
        }
        let protocol = self.protocol(fields.protocol.as_deref());
        match protocol {
            Protocol::Any => {}
            Protocol::Number(proto) => conjuncts.push(MatchExpr::IpProtocol(proto)),
            Protocol::Never => conjuncts.push(MatchExpr::False),
        }
        if let Some(ranges) = self.ports(
            "destination",
            fields.d_from_port.as_deref(),
            fields.d_to_port.as_deref(),
            fields.d_port.as_deref(),
        ) {
            conjuncts.push(MatchExpr::DstPorts(ranges));
        }
        if let Some(ranges) = self.ports(
            "source",
            fields.s_from_port.as_deref(),
            fields.s_to_port.as_deref(),
            fields.s_port.as_deref(),
        ) {
            conjuncts.push(MatchExpr::SrcPorts(ranges));
        }
        if protocol == Protocol::Number(IP_PROTO_ICMP) {
            conjuncts.extend(self.icmp(
                fields.icmpv4_type.as_deref(),
                fields.icmpv4_code.as_deref(),
            ));
        } else if given(fields.icmpv4_type.as_deref()).is_some() {
            debug!("{}: ICMP type ignored for a non-ICMP entry", self.origin);
        }
        if let Some(icmpv6) = given(fields.icmpv6_type.as_deref()) {
            self.warn(&format!("ICMPv6 type {icmpv6} is not modeled"));
        }
        if let Some(opcode) = given(fields.arp_opcode.as_deref()) {
            self.warn(&format!("ARP opcode {opcode} is not modeled, ignoring it"));
        }
        if let Some(rules) = given(fields.tcp_rules.as_deref()) {
            self.warn(&format!("TCP flags {rules} are not modeled, ignoring them"));
        }
        if fields.stateful {
            self.warn("stateful matching is not modeled");
        }
        if fields.apply_to_frag {
            self.warn("fragment matching is not modeled");
        }
        if let Some(net) = self.address("source", fields.src_addr.as_deref()) {
            conjuncts.push(MatchExpr::SrcIp(net));
        }
        if let Some(net) = self.address("destination", fields.dst_addr.as_deref()) {
            conjuncts.push(MatchExpr::DstIp(net));
        }
        MatchExpr::and(conjuncts)
    }

    /// `None` when the ether type does not constrain IPv4 flows, `Some(False)` when
    /// no IPv4 flow can match it. Bare digits are hexadecimal, like the `0x` form.
    fn ether_type(&mut self, raw: Option<&str>) -> Option<MatchExpr> {
        let raw = given(raw)?;
        let lower = raw.to_ascii_lowercase();
        let value = if let Some(hex) = lower.strip_prefix("0x") {
            u32::from_str_radix(hex, 16).ok()
        } else if lower.chars().all(|c| c.is_ascii_hexdigit()) {
            u32::from_str_radix(&lower, 16).ok()
        } else {
            lookup(ETHERTYPE_NAMES, &lower)
        };
        match value {
            Some(ETHERTYPE_IPV4) => None,
            Some(ETHERTYPE_ARP) => {
                self.warn("ARP ether type never matches IP traffic");
                Some(MatchExpr::False)
            }
            Some(ETHERTYPE_IPV6) => {
                self.warn("IPv6 ether type never matches IPv4 traffic");
                Some(MatchExpr::False)
            }
            Some(other) => {
                self.warn(&format!(
                    "non-IP ether type {raw} (0x{other:04x}) never matches IP traffic"
                ));
                Some(MatchExpr::False)
            }
            None => {
                self.warn(&format!("unknown ether type {raw}, the entry never matches"));
                Some(MatchExpr::False)
            }
        }
    }

    fn protocol(&mut self, raw: Option<&str>) -> Protocol {
        let Some(raw) = given(raw) else {
            return Protocol::Any;
        };
        if raw.eq_ignore_ascii_case("ip") || raw.eq_ignore_ascii_case("ipv4") {
            return Protocol::Any;
        }
        if raw.eq_ignore_ascii_case("icmpv6") {
            self.warn("ICMPv6 never matches IPv4 traffic");
            return Protocol::Never;
        }
        match lookup(PROTOCOL_NAMES, raw).or_else(|| raw.parse().ok()) {
            Some(proto) => Protocol::Number(proto),
            None => {
                self.warn(&format!("unknown protocol {raw}, matching any protocol"));
                Protocol::Any
            }
        }
    }

    /// Port constraint from the single-port field, or else from a `from`/`to` pair. A
    /// pair constrains only when both of its bounds are given.
    fn ports(
        &mut self,
        what: &str,
        from: Option<&str>,
        to: Option<&str>,
        single: Option<&str>,
    ) -> Option<Vec<PortRange>> {
        let range = match PortValue::parse(single) {
            PortValue::Port(port) => Ok(PortRange::single(port)),
            PortValue::Range(start, end) => PortRange::new(start, end),
            PortValue::Invalid => {
                self.warn(&format!(
                    "invalid {what} port {}, matching any port",
                    single.unwrap_or_default()
                ));
                return None;
            }
            PortValue::Any => match (PortValue::parse(from), PortValue::parse(to)) {
                (PortValue::Invalid, _) | (_, PortValue::Invalid) => {
                    self.warn(&format!(
                        "invalid {what} port range {}-{}, matching any port",
                        from.unwrap_or_default(),
                        to.unwrap_or_default()
                    ));
                    return None;
                }
                (PortValue::Any, _) | (_, PortValue::Any) => return None,
                (
                    PortValue::Port(start) | PortValue::Range(start, _),
                    PortValue::Port(end) | PortValue::Range(_, end),
                ) => PortRange::new(start, end),
            },
        };
        match range {
            Ok(range) => Some(vec![range]),
            Err(e) => {
                self.warn(&format!("{what} ports: {e}, matching any port"));
                None
            }
        }
    }

    fn icmp(&mut self, icmp_type: Option<&str>, icmp_code: Option<&str>) -> Vec<MatchExpr> {
        let mut matches = vec![];
        if let Some(raw) = given(icmp_type) {
            match lookup(ICMP_TYPE_NAMES, raw).or_else(|| raw.parse().ok()) {
                Some(t) => matches.push(MatchExpr::IcmpType(t)),
                None => self.warn(&format!("invalid ICMP type {raw}, matching any type")),
            }
        }
        if let Some(raw) = given(icmp_code) {
            match raw.parse() {
                Ok(code) => matches.push(MatchExpr::IcmpCode(code)),
                Err(_) => self.warn(&format!("invalid ICMP code {raw}, matching any code")),
            }
        }
        matches
    }

    fn address(&mut self, what: &str, raw: Option<&str>) -> Option<Ipv4Net> {
        let raw = given(raw)?;
        let net = raw
            .parse::<Ipv4Net>()
            .ok()
            .or_else(|| raw.parse::<Ipv4Addr>().ok().map(Ipv4Net::from));
        match net {
            Some(net) if net.prefix_len() == 0 => None,
            Some(net) => Some(net),
            None => {
                self.warn(&format!("invalid {what} address {raw}, matching any address"));
                None
            }
        }
    }
}
