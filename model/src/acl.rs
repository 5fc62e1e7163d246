// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Access lists: ordered lines of permit/deny actions over match predicates

use ipnet::Ipv4Net;
use serde::Serialize;
use std::collections::BTreeMap;
use strum::Display;

use crate::errors::ModelError;
use crate::flow::Flow;

pub const IP_PROTO_ICMP: u8 = 1;
pub const IP_PROTO_IGMP: u8 = 2;
pub const IP_PROTO_IPINIP: u8 = 4;
pub const IP_PROTO_TCP: u8 = 6;
pub const IP_PROTO_UDP: u8 = 17;
pub const IP_PROTO_GRE: u8 = 47;
pub const IP_PROTO_OSPF: u8 = 89;
pub const IP_PROTO_PIM: u8 = 103;
pub const IP_PROTO_SCTP: u8 = 132;

/// Maximum nesting of [`MatchExpr::PermittedByAcl`] references followed during evaluation.
/// Deeper (or cyclic) references do not match.
pub const MAX_ACL_DEPTH: usize = 8;

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[strum(serialize_all = "lowercase")]
pub enum LineAction {
    Permit,
    Deny,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
/// An inclusive range of transport ports
pub struct PortRange {
    start: u16,
    end: u16,
}
impl PortRange {
    pub fn new(start: u16, end: u16) -> Result<Self, ModelError> {
        if start > end {
            return Err(ModelError::InvalidPortRange(start, end));
        }
        Ok(Self { start, end })
    }
    #[must_use]
    pub fn single(port: u16) -> Self {
        Self {
            start: port,
            end: port,
        }
    }
    #[must_use]
    pub fn start(&self) -> u16 {
        self.start
    }
    #[must_use]
    pub fn end(&self) -> u16 {
        self.end
    }
    #[must_use]
    pub fn contains(&self, port: u16) -> bool {
        self.start <= port && port <= self.end
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
/// A predicate over a [`Flow`]
pub enum MatchExpr {
    True,
    False,
    And(Vec<MatchExpr>),
    Or(Vec<MatchExpr>),
    IpProtocol(u8),
    SrcPorts(Vec<PortRange>),
    DstPorts(Vec<PortRange>),
    IcmpType(u8),
    IcmpCode(u8),
    SrcIp(Ipv4Net),
    DstIp(Ipv4Net),
    /// Matches flows that the named access list permits
    PermittedByAcl(String),
}

impl MatchExpr {
    /// Conjunction of `exprs`. Collapses to [`MatchExpr::True`] when empty and to
    /// the single expression when only one is given.
    #[must_use]
    pub fn and(mut exprs: Vec<MatchExpr>) -> MatchExpr {
        exprs.retain(|e| *e != MatchExpr::True);
        if exprs.contains(&MatchExpr::False) {
            return MatchExpr::False;
        }
        match exprs.len() {
            0 => MatchExpr::True,
            1 => exprs.swap_remove(0),
            _ => MatchExpr::And(exprs),
        }
    }
    /// Disjunction of `exprs`. An empty disjunction never matches.
    #[must_use]
    pub fn or(mut exprs: Vec<MatchExpr>) -> MatchExpr {
        if exprs.contains(&MatchExpr::True) {
            return MatchExpr::True;
        }
        exprs.retain(|e| *e != MatchExpr::False);
        match exprs.len() {
            0 => MatchExpr::False,
            1 => exprs.swap_remove(0),
            _ => MatchExpr::Or(exprs),
        }
    }

    /// Evaluate this predicate against `flow`. `acls` resolves [`MatchExpr::PermittedByAcl`].
    #[must_use]
    pub fn matches(&self, flow: &Flow, acls: &AclTable) -> bool {
        self.matches_at(flow, acls, 0)
    }

    fn matches_at(&self, flow: &Flow, acls: &AclTable, depth: usize) -> bool {
        match self {
            MatchExpr::True => true,
            MatchExpr::False => false,
            MatchExpr::And(exprs) => exprs.iter().all(|e| e.matches_at(flow, acls, depth)),
            MatchExpr::Or(exprs) => exprs.iter().any(|e| e.matches_at(flow, acls, depth)),
            MatchExpr::IpProtocol(proto) => flow.ip_protocol == *proto,
            MatchExpr::SrcPorts(ranges) => flow
                .src_port
                .is_some_and(|p| ranges.iter().any(|r| r.contains(p))),
            MatchExpr::DstPorts(ranges) => flow
                .dst_port
                .is_some_and(|p| ranges.iter().any(|r| r.contains(p))),
            MatchExpr::IcmpType(icmp_type) => flow.icmp_type == Some(*icmp_type),
            MatchExpr::IcmpCode(icmp_code) => flow.icmp_code == Some(*icmp_code),
            MatchExpr::SrcIp(net) => net.contains(&flow.src_ip),
            MatchExpr::DstIp(net) => net.contains(&flow.dst_ip),
            MatchExpr::PermittedByAcl(name) => {
                depth < MAX_ACL_DEPTH
                    && acls
                        .get(name)
                        .is_some_and(|acl| acl.filter_at(flow, acls, depth + 1) == LineAction::Permit)
            }
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct AclLine {
    pub name: String,
    pub action: LineAction,
    pub matcher: MatchExpr,
}
impl AclLine {
    #[must_use]
    pub fn new(name: &str, action: LineAction, matcher: MatchExpr) -> Self {
        Self {
            name: name.to_owned(),
            action,
            matcher,
        }
    }
    #[must_use]
    pub fn permit(name: &str, matcher: MatchExpr) -> Self {
        Self::new(name, LineAction::Permit, matcher)
    }
    #[must_use]
    pub fn deny(name: &str, matcher: MatchExpr) -> Self {
        Self::new(name, LineAction::Deny, matcher)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
/// A named, ordered access list. The first matching line decides; a flow that
/// matches no line is denied.
pub struct Acl {
    pub name: String,
    pub lines: Vec<AclLine>,
}
impl Acl {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            lines: vec![],
        }
    }
    pub fn add_line(&mut self, line: AclLine) {
        self.lines.push(line);
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
    /// Decide what this access list does with `flow`
    #[must_use]
    pub fn filter(&self, flow: &Flow, acls: &AclTable) -> LineAction {
        self.filter_at(flow, acls, 0)
    }
    /// The first line matching `flow`, if any
    #[must_use]
    pub fn matching_line(&self, flow: &Flow, acls: &AclTable) -> Option<&AclLine> {
        self.lines.iter().find(|l| l.matcher.matches(flow, acls))
    }
    fn filter_at(&self, flow: &Flow, acls: &AclTable, depth: usize) -> LineAction {
        self.lines
            .iter()
            .find(|l| l.matcher.matches_at(flow, acls, depth))
            .map_or(LineAction::Deny, |l| l.action)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
/// The access lists of a device, by name
pub struct AclTable(BTreeMap<String, Acl>);
impl AclTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Acl> {
        self.0.get(name)
    }
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }
    /// Add an [`Acl`]. Returns the access list back if one with the same name exists.
    pub fn add(&mut self, acl: Acl) -> Result<(), Acl> {
        if self.0.contains_key(&acl.name) {
            return Err(acl);
        }
        self.0.insert(acl.name.clone(), acl);
        Ok(())
    }
    pub fn values(&self) -> impl Iterator<Item = &Acl> {
        self.0.values()
    }
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}
