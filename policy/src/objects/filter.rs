// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Tenant filters and their entries

use crate::attributes::Attributes;
use crate::keys::compose;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
/// Match fields of a filter entry, as written in the input. Interpretation
/// (placeholders, mnemonics, ranges) happens when access lists are compiled.
pub struct EntryFields {
    pub ether_type: Option<String>,
    pub protocol: Option<String>,
    pub d_port: Option<String>,
    pub d_from_port: Option<String>,
    pub d_to_port: Option<String>,
    pub s_port: Option<String>,
    pub s_from_port: Option<String>,
    pub s_to_port: Option<String>,
    pub icmpv4_type: Option<String>,
    pub icmpv4_code: Option<String>,
    pub icmpv6_type: Option<String>,
    pub icmpv6_code: Option<String>,
    pub arp_opcode: Option<String>,
    pub tcp_rules: Option<String>,
    pub src_addr: Option<String>,
    pub dst_addr: Option<String>,
    pub apply_to_frag: bool,
    pub stateful: bool,
}

impl EntryFields {
    #[must_use]
    pub fn from_attributes(attrs: &Attributes) -> Self {
        Self {
            ether_type: attrs.owned("etherT"),
            protocol: attrs.owned("prot"),
            d_port: attrs.owned("dPort"),
            d_from_port: attrs.owned("dFromPort"),
            d_to_port: attrs.owned("dToPort"),
            s_port: attrs.owned("sPort"),
            s_from_port: attrs.owned("sFromPort"),
            s_to_port: attrs.owned("sToPort"),
            icmpv4_type: attrs.owned("icmpv4T"),
            icmpv4_code: attrs.owned("icmpv4C"),
            icmpv6_type: attrs.owned("icmpv6T"),
            icmpv6_code: attrs.owned("icmpv6C"),
            arp_opcode: attrs.owned("arpOpc"),
            tcp_rules: attrs.owned("tcpRules"),
            src_addr: attrs.owned("srcAddr"),
            dst_addr: attrs.owned("dstAddr"),
            apply_to_frag: attrs.is_yes("applyToFrag"),
            stateful: attrs.is_yes("stateful"),
        }
    }
    /// True if no match field is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FilterEntry {
    pub name: String,
    pub description: Option<String>,
    pub fields: EntryFields,
}
impl FilterEntry {
    #[must_use]
    pub fn new(name: &str, fields: EntryFields) -> Self {
        Self {
            name: name.to_owned(),
            description: None,
            fields,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// A reusable tenant filter
pub struct Filter {
    pub key: String,
    pub name: String,
    pub tenant: String,
    pub description: Option<String>,
    pub entries: Vec<FilterEntry>,
}
impl Filter {
    #[must_use]
    pub fn new(tenant: &str, name: &str) -> Self {
        Self {
            key: compose(tenant, name),
            name: name.to_owned(),
            tenant: tenant.to_owned(),
            description: None,
            entries: vec![],
        }
    }
}
