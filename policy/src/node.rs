// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Typed view of the raw policy tree: `{ "<typeTag>": { "attributes": {..}, "children": [..] } }`

use serde_json::Value;

use crate::attributes::Attributes;
use crate::errors::IngestError;

#[derive(Clone, Debug, Eq, PartialEq)]
/// The kinds of policy node the dispatcher understands. Anything else is
/// [`NodeKind::Unknown`] and is only walked through.
pub enum NodeKind {
    PolUni,
    FabricInst,
    CtrlrInst,
    // tenant policy
    Tenant,
    Vrf,
    BridgeDomain,
    Subnet,
    RsCtx,
    ApplicationProfile,
    Epg,
    RsBd,
    RsProv,
    RsCons,
    RsProvIf,
    RsConsIf,
    RsProtBy,
    RsPathAtt,
    RsDomAtt,
    // contracts and filters
    Filter,
    FilterEntry,
    Contract,
    Subject,
    TabooSubject,
    RsSubjFiltAtt,
    RsDenyRule,
    Taboo,
    ContractInterface,
    RsIf,
    // external connectivity
    L3Out,
    RsEctx,
    ExternalEpg,
    ExternalSubnet,
    StaticRoute,
    NextHop,
    BgpExtP,
    BgpPeer,
    OspfExtP,
    LogicalNodeProfile,
    RsNodeL3OutAtt,
    LogicalInterfaceProfile,
    RsPathL3OutAtt,
    L2Out,
    RsEBd,
    L2ExternalEpg,
    // fabric
    FabricProtPol,
    ExplicitGroup,
    NodePEp,
    NodeIdentPol,
    NodeIdentP,
    FabricInterface,
    PhysIf,
    // management
    MgmtP,
    MgmtOoB,
    RsOoBStNode,
    Unknown(String),
}

/// Type tags of the known node kinds. Some kinds have more than one spelling in exports.
static TAG_TABLE: &[(&str, NodeKind)] = &[
    ("polUni", NodeKind::PolUni),
    ("fabricInst", NodeKind::FabricInst),
    ("ctrlrInst", NodeKind::CtrlrInst),
    ("fvTenant", NodeKind::Tenant),
    ("fvCtx", NodeKind::Vrf),
    ("fvBD", NodeKind::BridgeDomain),
    ("fvSubnet", NodeKind::Subnet),
    ("fvRsCtx", NodeKind::RsCtx),
    ("fvAp", NodeKind::ApplicationProfile),
    ("fvAEPg", NodeKind::Epg),
    ("fvRsBd", NodeKind::RsBd),
    ("fvRsProv", NodeKind::RsProv),
    ("fvRsCons", NodeKind::RsCons),
    ("fvRsProvIf", NodeKind::RsProvIf),
    ("fvRsConsIf", NodeKind::RsConsIf),
    ("fvRsProtBy", NodeKind::RsProtBy),
    ("fvRsPathAtt", NodeKind::RsPathAtt),
    ("fvRsDomAtt", NodeKind::RsDomAtt),
    ("vzFilter", NodeKind::Filter),
    ("vzEntry", NodeKind::FilterEntry),
    ("vzBrCP", NodeKind::Contract),
    ("vzSubj", NodeKind::Subject),
    ("vzTSubj", NodeKind::TabooSubject),
    ("vzRsSubjFiltAtt", NodeKind::RsSubjFiltAtt),
    ("vzRsDenyRule", NodeKind::RsDenyRule),
    ("vzTaboo", NodeKind::Taboo),
    ("vzCPIf", NodeKind::ContractInterface),
    ("vzRsIf", NodeKind::RsIf),
    ("l3extOut", NodeKind::L3Out),
    ("l3ExtOut", NodeKind::L3Out),
    ("l3extRsEctx", NodeKind::RsEctx),
    ("l3extInstP", NodeKind::ExternalEpg),
    ("l3ExtInstP", NodeKind::ExternalEpg),
    ("l3extSubnet", NodeKind::ExternalSubnet),
    ("l3ExtSubnet", NodeKind::ExternalSubnet),
    ("ipRouteP", NodeKind::StaticRoute),
    ("ipNexthopP", NodeKind::NextHop),
    ("bgpExtP", NodeKind::BgpExtP),
    ("bgpPeerP", NodeKind::BgpPeer),
    ("ospfExtP", NodeKind::OspfExtP),
    ("l3extLNodeP", NodeKind::LogicalNodeProfile),
    ("l3extRsNodeL3OutAtt", NodeKind::RsNodeL3OutAtt),
    ("l3extLIfP", NodeKind::LogicalInterfaceProfile),
    ("l3extRsPathL3OutAtt", NodeKind::RsPathL3OutAtt),
    ("l2extOut", NodeKind::L2Out),
    ("l2ExtOut", NodeKind::L2Out),
    ("l2extRsEBd", NodeKind::RsEBd),
    ("l2extInstP", NodeKind::L2ExternalEpg),
    ("fabricProtPol", NodeKind::FabricProtPol),
    ("fabricExplicitGEp", NodeKind::ExplicitGroup),
    ("fabricNodePEp", NodeKind::NodePEp),
    ("fabricNodeIdentPol", NodeKind::NodeIdentPol),
    ("fabricNodeIdentP", NodeKind::NodeIdentP),
    ("fabricInterface", NodeKind::FabricInterface),
    ("l1PhysIf", NodeKind::PhysIf),
    ("mgmtMgmtP", NodeKind::MgmtP),
    ("mgmtOoB", NodeKind::MgmtOoB),
    ("mgmtRsOoBStNode", NodeKind::RsOoBStNode),
];

impl NodeKind {
    #[must_use]
    pub fn from_tag(tag: &str) -> NodeKind {
        TAG_TABLE
            .iter()
            .find(|(t, _)| *t == tag)
            .map_or_else(|| NodeKind::Unknown(tag.to_owned()), |(_, kind)| kind.clone())
    }
    /// The canonical type tag of this kind
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            NodeKind::Unknown(tag) => tag,
            kind => TAG_TABLE
                .iter()
                .find(|(_, k)| k == kind)
                .map_or("", |(tag, _)| *tag),
        }
    }
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, NodeKind::Unknown(_))
    }
}

#[derive(Clone, Debug, PartialEq)]
/// One node of the policy tree
pub struct RawNode {
    pub kind: NodeKind,
    pub attributes: Attributes,
    pub children: Vec<RawNode>,
}

impl RawNode {
    #[must_use]
    pub fn new(kind: NodeKind, attributes: Attributes) -> Self {
        Self {
            kind,
            attributes,
            children: vec![],
        }
    }
    #[must_use]
    pub fn child(mut self, child: RawNode) -> Self {
        self.children.push(child);
        self
    }

    /// Build a node from its JSON form. An absent or null `attributes` / `children`
    /// is the same as an empty one.
    pub fn from_json(value: &Value) -> Result<RawNode, IngestError> {
        Self::parse(value, "$")
    }

    /// Build a node from the JSON form of its body, when the type tag is known separately
    pub fn from_tagged_json(tag: &str, body: &Value) -> Result<RawNode, IngestError> {
        Self::parse_body(tag, body, &format!("$/{tag}"))
    }

    fn parse(value: &Value, path: &str) -> Result<RawNode, IngestError> {
        let Some(object) = value.as_object().filter(|o| o.len() == 1) else {
            return Err(IngestError::MalformedNode {
                path: path.to_owned(),
            });
        };
        let mut entries = object.iter();
        let Some((tag, body)) = entries.next() else {
            return Err(IngestError::MalformedNode {
                path: path.to_owned(),
            });
        };
        Self::parse_body(tag, body, &format!("{path}/{tag}"))
    }

    fn parse_body(tag: &str, body: &Value, path: &str) -> Result<RawNode, IngestError> {
        let body = match body {
            Value::Null => return Ok(RawNode::new(NodeKind::from_tag(tag), Attributes::new())),
            Value::Object(body) => body,
            _ => {
                return Err(IngestError::MalformedNode {
                    path: path.to_owned(),
                });
            }
        };
        let attributes = match body.get("attributes") {
            None | Some(Value::Null) => Attributes::new(),
            Some(Value::Object(map)) => Attributes::from_json(map),
            Some(_) => {
                return Err(IngestError::MalformedField {
                    path: path.to_owned(),
                    field: "attributes",
                    expected: "an object",
                });
            }
        };
        let children = match body.get("children") {
            None | Some(Value::Null) => vec![],
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(n, item)| Self::parse(item, &format!("{path}[{n}]")))
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(IngestError::MalformedField {
                    path: path.to_owned(),
                    field: "children",
                    expected: "an array",
                });
            }
        };
        Ok(RawNode {
            kind: NodeKind::from_tag(tag),
            attributes,
            children,
        })
    }

    /// Number of nodes in this subtree
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(RawNode::count).sum::<usize>()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // valid in tests
mod test {
    use super::{NodeKind, RawNode};
    use crate::errors::IngestError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_tag_table() {
        assert_eq!(NodeKind::from_tag("fvTenant"), NodeKind::Tenant);
        assert_eq!(NodeKind::from_tag("l3ExtOut"), NodeKind::L3Out);
        assert_eq!(NodeKind::L3Out.tag(), "l3extOut");
        assert_eq!(
            NodeKind::from_tag("fvSomethingNew"),
            NodeKind::Unknown("fvSomethingNew".to_owned())
        );
        assert_eq!(NodeKind::from_tag("fvSomethingNew").tag(), "fvSomethingNew");
        assert!(!NodeKind::from_tag("fvSomethingNew").is_known());
    }

    #[test]
    fn test_parse_nested() {
        let value = json!({
            "fvTenant": {
                "attributes": {"name": "T"},
                "children": [
                    {"fvCtx": {"attributes": {"name": "V"}}},
                    {"fvWrapper": {"children": [{"fvBD": {"attributes": {"name": "BD"}, "children": null}}]}}
                ]
            }
        });
        let node = RawNode::from_json(&value).unwrap();
        assert_eq!(node.kind, NodeKind::Tenant);
        assert_eq!(node.attributes.name(), Some("T"));
        assert_eq!(node.children.len(), 2);
        assert_eq!(
            node.children[1].kind,
            NodeKind::Unknown("fvWrapper".to_owned())
        );
        assert_eq!(node.children[1].children[0].kind, NodeKind::BridgeDomain);
        assert_eq!(node.count(), 4);
    }

    #[test]
    fn test_malformed_nodes() {
        let two_tags = json!({"fvTenant": {}, "fvCtx": {}});
        assert_eq!(
            RawNode::from_json(&two_tags),
            Err(IngestError::MalformedNode {
                path: "$".to_owned()
            })
        );
        let bad_children = json!({"fvTenant": {"children": {"fvCtx": {}}}});
        assert_eq!(
            RawNode::from_json(&bad_children),
            Err(IngestError::MalformedField {
                path: "$/fvTenant".to_owned(),
                field: "children",
                expected: "an array"
            })
        );
        let bad_child = json!({"fvTenant": {"children": ["oops"]}});
        assert_eq!(
            RawNode::from_json(&bad_child),
            Err(IngestError::MalformedNode {
                path: "$/fvTenant[0]".to_owned()
            })
        );
    }
}
