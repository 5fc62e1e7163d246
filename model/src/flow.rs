// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Probe flows used to evaluate access lists

use std::net::Ipv4Addr;

use crate::acl::{IP_PROTO_ICMP, IP_PROTO_TCP, IP_PROTO_UDP};

#[derive(Clone, Debug, Eq, PartialEq)]
/// A single IPv4 flow. Ports are only meaningful for TCP/UDP-like protocols and
/// ICMP type/code only for ICMP.
pub struct Flow {
    pub src_ip: Ipv4Addr,
    pub dst_ip: Ipv4Addr,
    pub ip_protocol: u8,
    pub src_port: Option<u16>,
    pub dst_port: Option<u16>,
    pub icmp_type: Option<u8>,
    pub icmp_code: Option<u8>,
}

impl Flow {
    #[must_use]
    pub fn new(src_ip: Ipv4Addr, dst_ip: Ipv4Addr, ip_protocol: u8) -> Self {
        Self {
            src_ip,
            dst_ip,
            ip_protocol,
            src_port: None,
            dst_port: None,
            icmp_type: None,
            icmp_code: None,
        }
    }
    #[must_use]
    pub fn tcp(src_ip: Ipv4Addr, src_port: u16, dst_ip: Ipv4Addr, dst_port: u16) -> Self {
        Self::new(src_ip, dst_ip, IP_PROTO_TCP).set_ports(src_port, dst_port)
    }
    #[must_use]
    pub fn udp(src_ip: Ipv4Addr, src_port: u16, dst_ip: Ipv4Addr, dst_port: u16) -> Self {
        Self::new(src_ip, dst_ip, IP_PROTO_UDP).set_ports(src_port, dst_port)
    }
    #[must_use]
    pub fn icmp(src_ip: Ipv4Addr, dst_ip: Ipv4Addr, icmp_type: u8, icmp_code: u8) -> Self {
        let mut flow = Self::new(src_ip, dst_ip, IP_PROTO_ICMP);
        flow.icmp_type = Some(icmp_type);
        flow.icmp_code = Some(icmp_code);
        flow
    }
    #[must_use]
    pub fn set_ports(mut self, src_port: u16, dst_port: u16) -> Self {
        self.src_port = Some(src_port);
        self.dst_port = Some(dst_port);
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // valid in tests
mod test {
    use super::Flow;
    use crate::acl::{AclTable, IP_PROTO_ICMP, MatchExpr};
    use std::net::Ipv4Addr;

    #[test]
    fn test_icmp_flow_has_no_ports() {
        let flow = Flow::icmp(Ipv4Addr::LOCALHOST, Ipv4Addr::LOCALHOST, 8, 0);
        let acls = AclTable::new();
        assert_eq!(flow.ip_protocol, IP_PROTO_ICMP);
        assert!(MatchExpr::IcmpType(8).matches(&flow, &acls));
        assert!(!MatchExpr::DstPorts(vec![crate::PortRange::single(0)]).matches(&flow, &acls));
    }

    #[test]
    fn test_address_match() {
        let flow = Flow::udp(
            Ipv4Addr::new(192, 168, 1, 10),
            53,
            Ipv4Addr::new(10, 0, 0, 1),
            53,
        );
        let acls = AclTable::new();
        assert!(MatchExpr::SrcIp("192.168.1.0/24".parse().unwrap()).matches(&flow, &acls));
        assert!(!MatchExpr::DstIp("192.168.1.0/24".parse().unwrap()).matches(&flow, &acls));
    }
}
