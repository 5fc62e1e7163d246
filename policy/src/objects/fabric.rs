// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Fabric nodes, their interfaces, path attachments and vPC pairs

use ordermap::OrderMap;

use crate::attributes::Attributes;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum NodeRole {
    Spine,
    Leaf,
    Other,
}

impl NodeRole {
    /// Role of a node given its configured role and its name. The comparison ignores case.
    /// A missing or `unspecified` role is inferred from the name: `-spine-` gives
    /// [`NodeRole::Spine`], `-leaf-` gives [`NodeRole::Leaf`].
    #[must_use]
    pub fn infer(role: Option<&str>, name: &str) -> NodeRole {
        match role.map(str::trim) {
            None | Some("") => Self::from_name(name),
            Some(r) if r.eq_ignore_ascii_case("unspecified") => Self::from_name(name),
            Some(r) if r.eq_ignore_ascii_case("spine") => NodeRole::Spine,
            Some(r) if r.eq_ignore_ascii_case("leaf") => NodeRole::Leaf,
            Some(_) => NodeRole::Other,
        }
    }
    fn from_name(name: &str) -> NodeRole {
        let name = name.to_ascii_lowercase();
        if name.contains("-spine-") {
            NodeRole::Spine
        } else if name.contains("-leaf-") {
            NodeRole::Leaf
        } else {
            NodeRole::Other
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
/// Out-of-band management addressing of a node
pub struct ManagementInfo {
    pub address: String,
    pub gateway: Option<String>,
    pub address6: Option<String>,
    pub gateway6: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PortKind {
    #[default]
    Physical,
    PortChannel,
    Vpc,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeInterface {
    pub name: String,
    pub kind: PortKind,
    pub enabled: bool,
    pub description: Option<String>,
    pub mtu: Option<u16>,
    pub epg: Option<String>,   /* key of the bound EPG */
    pub encap: Option<String>, /* encapsulation of the binding */
}
impl NodeInterface {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            kind: PortKind::Physical,
            enabled: true,
            description: None,
            mtu: None,
            epg: None,
            encap: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// A switch of the fabric, keyed by node id
pub struct FabricNode {
    pub node_id: String,
    pub name: String, /* may be empty */
    pub role: Option<String>,
    pub pod_id: Option<String>,
    pub serial: Option<String>,
    pub management: Option<ManagementInfo>,
    pub interfaces: OrderMap<String, NodeInterface>,
    pub attrs: Attributes,
}
impl FabricNode {
    #[must_use]
    pub fn new(node_id: &str) -> Self {
        Self {
            node_id: node_id.to_owned(),
            name: String::new(),
            role: None,
            pod_id: None,
            serial: None,
            management: None,
            interfaces: OrderMap::new(),
            attrs: Attributes::new(),
        }
    }
    /// Device hostname: the node name, or the node id when unnamed
    #[must_use]
    pub fn hostname(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.node_id
        } else {
            &self.name
        }
    }
    #[must_use]
    pub fn effective_role(&self) -> NodeRole {
        NodeRole::infer(self.role.as_deref(), &self.name)
    }
    /// The interface named `name`, created if missing
    pub fn interface_mut(&mut self, name: &str) -> &mut NodeInterface {
        self.interfaces
            .entry(name.to_owned())
            .or_insert_with(|| NodeInterface::new(name))
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
/// Location named by a path distinguished name, e.g.
/// `topology/pod-1/paths-101/pathep-[eth1/1]` or
/// `topology/pod-1/protpaths-101-102/pathep-[vpc-pg]`
pub struct PathTarget {
    pub pod_id: Option<String>,
    pub node_id: String,
    pub node_id2: Option<String>,
    pub interface: String,
}
impl PathTarget {
    fn segment_after<'a>(tdn: &'a str, marker: &str) -> Option<&'a str> {
        let start = tdn.find(marker)? + marker.len();
        let rest = &tdn[start..];
        Some(rest.split('/').next().unwrap_or(rest))
    }
    /// Parse a path distinguished name. `None` if it names no node or no interface.
    #[must_use]
    pub fn parse(tdn: &str) -> Option<PathTarget> {
        let pod_id = Self::segment_after(tdn, "pod-")
            .filter(|p| !p.is_empty())
            .map(str::to_owned);
        let (node_id, node_id2) = if let Some(pair) = Self::segment_after(tdn, "/protpaths-") {
            let mut ids = pair.split('-');
            let first = ids.next().unwrap_or_default().to_owned();
            let second = ids.next().filter(|id| !id.is_empty()).map(str::to_owned);
            (first, second)
        } else {
            let single = Self::segment_after(tdn, "/paths-")?;
            (single.to_owned(), None)
        };
        let start = tdn.find("/pathep-[")? + "/pathep-[".len();
        let end = start + tdn[start..].rfind(']')?;
        let interface = tdn[start..end].to_owned();
        if node_id.is_empty() || interface.is_empty() {
            return None;
        }
        Some(PathTarget {
            pod_id,
            node_id,
            node_id2,
            interface,
        })
    }
    #[must_use]
    pub fn is_vpc(&self) -> bool {
        self.node_id2.is_some()
    }
    /// The node ids this target lives on
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.node_id.as_str()).chain(self.node_id2.as_deref())
    }
}

#[derive(Clone, Debug, PartialEq)]
/// A binding of an EPG to a fabric location
pub struct PathAttachment {
    pub tdn: String,
    pub target: PathTarget,
    pub encap: Option<String>,
    pub description: Option<String>,
    pub mode: Option<String>,
    pub epg: Option<String>, /* EPG key */
    pub epg_name: Option<String>,
    pub epg_tenant: Option<String>,
    pub epg_description: Option<String>,
}
impl PathAttachment {
    #[must_use]
    pub fn new(tdn: &str, target: PathTarget) -> Self {
        Self {
            tdn: tdn.to_owned(),
            target,
            encap: None,
            description: None,
            mode: None,
            epg: None,
            epg_name: None,
            epg_tenant: None,
            epg_description: None,
        }
    }
    #[must_use]
    pub fn is_vpc(&self) -> bool {
        self.target.is_vpc()
    }
    #[must_use]
    pub fn interface(&self) -> &str {
        &self.target.interface
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
/// Two leaves forming a virtual port-channel domain
pub struct VpcPair {
    pub id: String,
    pub name: Option<String>,
    pub node_a: String,
    pub node_b: String,
}
impl VpcPair {
    #[must_use]
    pub fn peer_of(&self, node_id: &str) -> Option<&str> {
        if self.node_a == node_id {
            Some(&self.node_b)
        } else if self.node_b == node_id {
            Some(&self.node_a)
        } else {
            None
        }
    }
}
