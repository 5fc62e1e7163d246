// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Node dispatcher: walks the policy tree and populates a [`PolicyGraphBuilder`]

use serde_json::Value;
use tracectl::trace_target;
use tracing::{debug, info};

use crate::attributes::Attributes;
use crate::builder::PolicyGraphBuilder;
use crate::diagnostics::Diagnostics;
use crate::errors::IngestError;
use crate::graph::{PolicyGraph, Ref};
use crate::keys::compose;
use crate::node::{NodeKind, RawNode};
use crate::objects::{
    BgpConfig, BgpPeer, ContractLike, ContractRelations, EntryFields, ExternalEpg, FilterAction,
    FilterEntry, FilterRef, L3OutNode, L3OutPath, L3StaticRoute, ManagementInfo, OspfConfig,
    PathAttachment, PathTarget, VpcPair,
};

trace_target!("ingest", tracectl::LevelFilter::INFO, &["policy"]);

const TAG: &str = "ingest";

/// Owner of contract relations
#[derive(Clone, Debug)]
enum Owner {
    Epg(String),                               /* EPG key */
    L3External { l3out: String, epg: String }, /* local names */
    L2External { l2out: String, epg: String },
}

/// The contract or taboo contract whose subjects are being walked
#[derive(Clone, Debug)]
enum ContractScope {
    Contract(String),
    Taboo(String),
}

#[derive(Clone, Debug, Default)]
/// What the ancestors of a node established
struct Context {
    tenant: Option<String>,
    ap: Option<String>,
    bd: Option<String>,
    epg: Option<String>, /* key */
    owner: Option<Owner>,
    contract: Option<ContractScope>,
    subject: Option<String>,
    filter: Option<String>,
    cpif: Option<String>,
    l3out: Option<String>,
    l3node: Option<String>,
    route: Option<usize>,
    l2out: Option<String>,
    node: Option<String>,
}
impl Context {
    /// A context scoped to `tenant` only
    fn in_tenant(tenant: &str) -> Self {
        Self {
            tenant: Some(tenant.to_owned()),
            ..Default::default()
        }
    }
}

/// Extract the id of a node from a distinguished name such as `topology/pod-1/node-101`
fn node_id_from_dn(dn: &str) -> Option<&str> {
    dn.split('/')
        .find_map(|part| part.strip_prefix("node-"))
        .filter(|id| !id.is_empty())
}

/// Extract `(tenant, contract)` from a contract distinguished name `uni/tn-T/brc-C`
fn contract_from_dn(dn: &str) -> Option<(&str, &str)> {
    let mut tenant = None;
    let mut contract = None;
    for part in dn.split('/') {
        if let Some(t) = part.strip_prefix("tn-") {
            tenant = Some(t);
        } else if let Some(c) = part.strip_prefix("brc-") {
            contract = Some(c);
        }
    }
    Some((tenant?, contract?)).filter(|(t, c)| !t.is_empty() && !c.is_empty())
}

struct Dispatcher<'a> {
    builder: PolicyGraphBuilder,
    diags: &'a mut Diagnostics,
}

impl Dispatcher<'_> {
    fn dispatch(&mut self, node: &RawNode, ctx: &Context) {
        if let Some(ctx) = self.visit(node, ctx) {
            for child in &node.children {
                self.dispatch(child, &ctx);
            }
        }
    }

    /// Apply one node to the graph. Returns the context for its children, or `None`
    /// if the node was dropped and its subtree must not be walked.
    fn visit(&mut self, node: &RawNode, ctx: &Context) -> Option<Context> {
        let attrs = &node.attributes;
        match &node.kind {
            NodeKind::PolUni => {
                if let Some(name) = attrs.name() {
                    self.builder.set_name(name);
                }
                Some(ctx.clone())
            }
            NodeKind::Tenant => self.tenant(attrs),
            NodeKind::Vrf => self.vrf(attrs, ctx),
            NodeKind::BridgeDomain => self.bridge_domain(attrs, ctx),
            NodeKind::Subnet => {
                self.subnet(attrs, ctx);
                Some(ctx.clone())
            }
            NodeKind::RsCtx => {
                self.bd_vrf(attrs, ctx);
                Some(ctx.clone())
            }
            NodeKind::ApplicationProfile => self.application_profile(attrs, ctx),
            NodeKind::Epg => self.epg(attrs, ctx),
            NodeKind::RsBd => {
                self.epg_bd(attrs, ctx);
                Some(ctx.clone())
            }
            NodeKind::RsProv
            | NodeKind::RsCons
            | NodeKind::RsProvIf
            | NodeKind::RsConsIf
            | NodeKind::RsProtBy => {
                self.relation(&node.kind, attrs, ctx);
                Some(ctx.clone())
            }
            NodeKind::RsPathAtt => {
                self.path_attachment(attrs, ctx);
                Some(ctx.clone())
            }
            NodeKind::RsDomAtt => {
                self.domain(attrs, ctx);
                Some(ctx.clone())
            }
            NodeKind::Filter => self.filter(attrs, ctx),
            NodeKind::FilterEntry => {
                self.filter_entry(attrs, ctx);
                Some(ctx.clone())
            }
            NodeKind::Contract => self.contract(attrs, ctx, false),
            NodeKind::Taboo => self.contract(attrs, ctx, true),
            NodeKind::Subject | NodeKind::TabooSubject => self.subject(attrs, ctx),
            NodeKind::RsSubjFiltAtt | NodeKind::RsDenyRule => {
                self.filter_ref(attrs, ctx);
                Some(ctx.clone())
            }
            NodeKind::ContractInterface => self.contract_interface(attrs, ctx),
            NodeKind::RsIf => {
                self.exported_contract(attrs, ctx);
                Some(ctx.clone())
            }
            NodeKind::L3Out => self.l3out(attrs, ctx),
            NodeKind::RsEctx => {
                self.l3out_vrf(attrs, ctx);
                Some(ctx.clone())
            }
            NodeKind::ExternalEpg => self.l3_external_epg(attrs, ctx),
            NodeKind::ExternalSubnet => {
                self.external_subnet(attrs, ctx);
                Some(ctx.clone())
            }
            NodeKind::StaticRoute => self.static_route(attrs, ctx),
            NodeKind::NextHop => {
                self.next_hop(attrs, ctx);
                Some(ctx.clone())
            }
            NodeKind::BgpExtP => {
                self.bgp(attrs, ctx);
                Some(ctx.clone())
            }
            NodeKind::BgpPeer => {
                self.bgp_peer(attrs, ctx);
                Some(ctx.clone())
            }
            NodeKind::OspfExtP => {
                self.ospf(attrs, ctx);
                Some(ctx.clone())
            }
            NodeKind::RsNodeL3OutAtt => self.l3out_node(attrs, ctx),
            NodeKind::RsPathL3OutAtt => {
                self.l3out_path(attrs, ctx);
                Some(ctx.clone())
            }
            NodeKind::L2Out => self.l2out(attrs, ctx),
            NodeKind::RsEBd => {
                self.l2out_bd(attrs, ctx);
                Some(ctx.clone())
            }
            NodeKind::L2ExternalEpg => self.l2_external_epg(attrs, ctx),
            NodeKind::ExplicitGroup => {
                self.explicit_group(node);
                Some(ctx.clone())
            }
            NodeKind::NodePEp => self.node_endpoint(attrs, ctx),
            NodeKind::NodeIdentP => {
                self.node_identity(attrs);
                Some(ctx.clone())
            }
            NodeKind::FabricInterface | NodeKind::PhysIf => {
                self.node_interface(&node.kind, attrs, ctx);
                Some(ctx.clone())
            }
            NodeKind::RsOoBStNode => {
                self.management(attrs);
                Some(ctx.clone())
            }
            NodeKind::FabricInst
            | NodeKind::CtrlrInst
            | NodeKind::FabricProtPol
            | NodeKind::NodeIdentPol
            | NodeKind::LogicalNodeProfile
            | NodeKind::LogicalInterfaceProfile
            | NodeKind::MgmtP
            | NodeKind::MgmtOoB => Some(ctx.clone()),
            NodeKind::Unknown(tag) => {
                debug!("Walking through unknown node {tag}");
                Some(ctx.clone())
            }
        }
    }

    /// The name of a node, or a warning if it has none
    fn required<'n>(&mut self, attrs: &'n Attributes, key: &str, what: &str) -> Option<&'n str> {
        let value = attrs.non_empty(key);
        if value.is_none() {
            self.diags
                .warn(TAG, format!("{what} without a {key}, skipping"));
        }
        value
    }
    /// The enclosing tenant, or a warning if there is none
    fn tenant_of<'c>(&mut self, ctx: &'c Context, what: &str) -> Option<&'c str> {
        let tenant = ctx.tenant.as_deref();
        if tenant.is_none() {
            self.diags
                .warn(TAG, format!("{what} outside of any tenant, skipping"));
        }
        tenant
    }

    fn tenant(&mut self, attrs: &Attributes) -> Option<Context> {
        let name = self.required(attrs, "name", "Tenant")?;
        let tenant = self.builder.tenant_mut(name)?;
        tenant.description = attrs.owned("descr");
        tenant.attrs = attrs.clone();
        Some(Context::in_tenant(name))
    }

    fn vrf(&mut self, attrs: &Attributes, ctx: &Context) -> Option<Context> {
        let tenant = self.tenant_of(ctx, "VRF")?;
        let name = self.required(attrs, "name", "VRF")?;
        let vrf = self.builder.vrf_mut(tenant, name)?;
        vrf.description = attrs.owned("descr");
        vrf.policy_enforcement = attrs.owned("pcEnfPref");
        vrf.enforcement_direction = attrs.owned("pcEnfDir");
        vrf.attrs = attrs.clone();
        Some(ctx.clone())
    }

    fn bridge_domain(&mut self, attrs: &Attributes, ctx: &Context) -> Option<Context> {
        let tenant = self.tenant_of(ctx, "Bridge domain")?;
        let name = self.required(attrs, "name", "Bridge domain")?;
        let bd = self.builder.bridge_domain_mut(tenant, name)?;
        bd.description = attrs.owned("descr");
        bd.arp_flood = attrs.is_yes("arpFlood");
        bd.unicast_route = attrs
            .non_empty("unicastRoute")
            .is_none_or(|_| attrs.is_yes("unicastRoute"));
        bd.limit_ip_learn = attrs.is_yes("limitIpLearnToSubnets");
        bd.unknown_unicast = attrs.owned("unkMacUcastAct");
        bd.mac = attrs.owned("mac");
        bd.attrs = attrs.clone();
        Some(Context {
            bd: Some(name.to_owned()),
            ..Context::in_tenant(tenant)
        })
    }

    fn subnet(&mut self, attrs: &Attributes, ctx: &Context) {
        let Some(ip) = self.required(attrs, "ip", "Subnet") else {
            return;
        };
        let (Some(tenant), Some(bd)) = (ctx.tenant.as_deref(), ctx.bd.as_deref()) else {
            debug!("Ignoring subnet {ip} outside of a bridge domain");
            return;
        };
        if let Some(bd) = self.builder.bridge_domain_mut(tenant, bd) {
            bd.add_subnet(ip);
        }
    }

    fn bd_vrf(&mut self, attrs: &Attributes, ctx: &Context) {
        let (Some(tenant), Some(bd)) = (ctx.tenant.as_deref(), ctx.bd.as_deref()) else {
            return;
        };
        let Some(vrf) = attrs.non_empty("tnFvCtxName") else {
            self.diags.warn(
                TAG,
                format!(
                    "Bridge domain {} has a VRF binding without a VRF name",
                    compose(tenant, bd)
                ),
            );
            return;
        };
        if let Some(bd) = self.builder.bridge_domain_mut(tenant, bd) {
            bd.vrf = Some(Ref::new(vrf));
        }
    }

    fn application_profile(&mut self, attrs: &Attributes, ctx: &Context) -> Option<Context> {
        let tenant = self.tenant_of(ctx, "Application profile")?;
        let name = self.required(attrs, "name", "Application profile")?;
        let ap = self.builder.application_profile_mut(tenant, name)?;
        ap.description = attrs.owned("descr");
        Some(Context {
            ap: Some(name.to_owned()),
            ..Context::in_tenant(tenant)
        })
    }

    fn epg(&mut self, attrs: &Attributes, ctx: &Context) -> Option<Context> {
        let tenant = self.tenant_of(ctx, "EPG")?;
        let name = self.required(attrs, "name", "EPG")?;
        let epg = self.builder.epg_mut(tenant, ctx.ap.as_deref(), name)?;
        epg.description = attrs.owned("descr");
        epg.attrs = attrs.clone();
        let key = epg.key.clone();
        Some(Context {
            ap: ctx.ap.clone(),
            epg: Some(key.clone()),
            owner: Some(Owner::Epg(key)),
            ..Context::in_tenant(tenant)
        })
    }

    fn epg_bd(&mut self, attrs: &Attributes, ctx: &Context) {
        let Some(key) = ctx.epg.as_deref() else {
            return;
        };
        match attrs.non_empty("tnFvBDName") {
            Some(bd) => {
                if let Some(epg) = self.builder.epgs.get_mut(key) {
                    epg.bridge_domain = Some(Ref::new(bd));
                }
            }
            None => self.diags.warn(
                TAG,
                format!("EPG {key} has a bridge domain binding without a bridge domain name"),
            ),
        }
    }

    /// The contract relations of the EPG or external EPG being walked
    fn relations_mut(&mut self, ctx: &Context) -> Option<&mut ContractRelations> {
        let tenant = ctx.tenant.as_deref()?;
        match ctx.owner.as_ref()? {
            Owner::Epg(key) => self.builder.epgs.get_mut(key).map(|e| &mut e.relations),
            Owner::L3External { l3out, epg } => {
                let l3out = self.builder.l3out_mut(tenant, l3out)?;
                let idx = l3out.external_epg_index(epg);
                Some(&mut l3out.external_epgs[idx].relations)
            }
            Owner::L2External { l2out, epg } => {
                let l2out = self.builder.l2out_mut(tenant, l2out)?;
                l2out
                    .external_epgs
                    .iter_mut()
                    .find(|e| &e.name == epg)
                    .map(|e| &mut e.relations)
            }
        }
    }

    fn relation(&mut self, kind: &NodeKind, attrs: &Attributes, ctx: &Context) {
        let field = match kind {
            NodeKind::RsProv | NodeKind::RsCons => "tnVzBrCPName",
            NodeKind::RsProvIf | NodeKind::RsConsIf => "tnVzCPIfName",
            _ => "tnVzTabooName",
        };
        let Some(target) = attrs.non_empty(field) else {
            self.diags
                .warn(TAG, format!("{} without {field}, skipping", kind.tag()));
            return;
        };
        let Some(relations) = self.relations_mut(ctx) else {
            debug!("Ignoring {} {target} outside of an EPG", kind.tag());
            return;
        };
        match kind {
            NodeKind::RsProv => relations.provide(target),
            NodeKind::RsCons => relations.consume(target),
            NodeKind::RsProvIf => relations.provide_interface(target),
            NodeKind::RsConsIf => relations.consume_interface(target),
            _ => relations.protect_by(target),
        }
    }

    fn path_attachment(&mut self, attrs: &Attributes, ctx: &Context) {
        let Some(tdn) = self.required(attrs, "tDn", "Path attachment") else {
            return;
        };
        let encap = attrs.owned("encap");
        if let (Some(tenant), Some(bd), None) =
            (ctx.tenant.as_deref(), ctx.bd.as_deref(), ctx.epg.as_ref())
        {
            if let (Some(bd), Some(encap)) = (self.builder.bridge_domain_mut(tenant, bd), encap) {
                bd.encap = Some(encap);
            }
            return;
        }
        let Some(target) = PathTarget::parse(tdn) else {
            self.diags
                .warn(TAG, format!("Cannot parse path attachment target {tdn}"));
            return;
        };
        let mut attachment = PathAttachment::new(tdn, target);
        attachment.encap = encap;
        attachment.description = attrs.owned("descr");
        attachment.mode = attrs.owned("mode");
        if let Some(epg) = ctx.epg.as_deref().and_then(|key| self.builder.epg(key)) {
            attachment.epg = Some(epg.key.clone());
            attachment.epg_name = Some(epg.name.clone());
            attachment.epg_tenant = Some(epg.tenant.clone());
            attachment.epg_description.clone_from(&epg.description);
        }
        self.builder.add_path_attachment(attachment);
    }

    fn domain(&mut self, attrs: &Attributes, ctx: &Context) {
        let Some(key) = ctx.epg.as_deref() else {
            return;
        };
        let Some(tdn) = attrs.non_empty("tDn") else {
            return;
        };
        match self.builder.epgs.get_mut(key) {
            Some(epg) if !epg.domains.iter().any(|d| d == tdn) => epg.domains.push(tdn.to_owned()),
            _ => {}
        }
    }

    fn filter(&mut self, attrs: &Attributes, ctx: &Context) -> Option<Context> {
        let tenant = self.tenant_of(ctx, "Filter")?;
        let name = self.required(attrs, "name", "Filter")?;
        let filter = self.builder.filter_mut(tenant, name)?;
        filter.description = attrs.owned("descr");
        Some(Context {
            filter: Some(name.to_owned()),
            ..Context::in_tenant(tenant)
        })
    }

    fn filter_entry(&mut self, attrs: &Attributes, ctx: &Context) {
        let (Some(tenant), Some(filter)) = (ctx.tenant.as_deref(), ctx.filter.as_deref()) else {
            debug!("Ignoring filter entry outside of a filter");
            return;
        };
        let Some(filter) = self.builder.filter_mut(tenant, filter) else {
            return;
        };
        let mut entry = FilterEntry::new(
            attrs.name().unwrap_or_default(),
            EntryFields::from_attributes(attrs),
        );
        entry.description = attrs.owned("descr");
        let existing = filter
            .entries
            .iter_mut()
            .find(|e| !e.name.is_empty() && e.name == entry.name);
        match existing {
            Some(existing) => *existing = entry,
            None => filter.entries.push(entry),
        }
    }

    fn contract(&mut self, attrs: &Attributes, ctx: &Context, taboo: bool) -> Option<Context> {
        let what = if taboo { "Taboo contract" } else { "Contract" };
        let tenant = self.tenant_of(ctx, what)?;
        let name = self.required(attrs, "name", what)?;
        let scope = if taboo {
            let taboo = self.builder.taboo_mut(tenant, name)?;
            taboo.description = attrs.owned("descr");
            taboo.scope = attrs.owned("scope");
            taboo.attrs = attrs.clone();
            ContractScope::Taboo(name.to_owned())
        } else {
            let contract = self.builder.contract_mut(tenant, name)?;
            contract.description = attrs.owned("descr");
            contract.scope = attrs.owned("scope");
            contract.attrs = attrs.clone();
            ContractScope::Contract(name.to_owned())
        };
        Some(Context {
            contract: Some(scope),
            ..Context::in_tenant(tenant)
        })
    }

    /// The contract or taboo contract being walked
    fn contract_like_mut(&mut self, ctx: &Context) -> Option<&mut dyn ContractLike> {
        let tenant = ctx.tenant.as_deref()?;
        match ctx.contract.as_ref()? {
            ContractScope::Contract(name) => self
                .builder
                .contract_mut(tenant, name)
                .map(|c| c as &mut dyn ContractLike),
            ContractScope::Taboo(name) => self
                .builder
                .taboo_mut(tenant, name)
                .map(|t| t as &mut dyn ContractLike),
        }
    }

    fn subject(&mut self, attrs: &Attributes, ctx: &Context) -> Option<Context> {
        let name = self.required(attrs, "name", "Contract subject")?;
        let Some(contract) = self.contract_like_mut(ctx) else {
            debug!("Ignoring subject {name} outside of a contract");
            return None;
        };
        let subject = contract.subject_mut(name);
        subject.description = attrs.owned("descr");
        subject.reverse_ports = attrs.is_yes("revFltPorts");
        Some(Context {
            subject: Some(name.to_owned()),
            ..ctx.clone()
        })
    }

    fn filter_ref(&mut self, attrs: &Attributes, ctx: &Context) {
        let Some(name) = self.required(attrs, "tnVzFilterName", "Filter reference") else {
            return;
        };
        let Some(subject) = ctx.subject.as_deref() else {
            self.diags.warn(
                TAG,
                format!("Filter reference {name} outside of a contract subject, skipping"),
            );
            return;
        };
        let Some(contract) = self.contract_like_mut(ctx) else {
            return;
        };
        let mut filter_ref = FilterRef::new(name);
        filter_ref.action = FilterAction::from_attr(attrs.non_empty("action"));
        filter_ref.fields = EntryFields::from_attributes(attrs);
        contract.subject_mut(subject).filters.push(filter_ref);
    }

    fn contract_interface(&mut self, attrs: &Attributes, ctx: &Context) -> Option<Context> {
        let tenant = self.tenant_of(ctx, "Contract interface")?;
        let name = self.required(attrs, "name", "Contract interface")?;
        let cpif = self.builder.contract_interface_mut(tenant, name)?;
        cpif.description = attrs.owned("descr");
        Some(Context {
            cpif: Some(name.to_owned()),
            ..Context::in_tenant(tenant)
        })
    }

    fn exported_contract(&mut self, attrs: &Attributes, ctx: &Context) {
        let (Some(tenant), Some(cpif)) = (ctx.tenant.as_deref(), ctx.cpif.as_deref()) else {
            return;
        };
        let exported = attrs.non_empty("tnVzBrCPName").map(str::to_owned).or_else(|| {
            attrs
                .non_empty("tDn")
                .and_then(contract_from_dn)
                .map(|(tenant, contract)| compose(tenant, contract))
        });
        let Some(exported) = exported else {
            self.diags.warn(
                TAG,
                format!("Contract interface {} exports no contract", compose(tenant, cpif)),
            );
            return;
        };
        if let Some(cpif) = self.builder.contract_interface_mut(tenant, cpif) {
            cpif.exported = Some(Ref::new(&exported));
        }
    }

    fn l3out(&mut self, attrs: &Attributes, ctx: &Context) -> Option<Context> {
        let tenant = self.tenant_of(ctx, "L3Out")?;
        let name = self.required(attrs, "name", "L3Out")?;
        let l3out = self.builder.l3out_mut(tenant, name)?;
        l3out.description = attrs.owned("descr");
        l3out.enforce_route_control = attrs.owned("enforceRtctrl");
        l3out.mpls_enabled = attrs.owned("mplsEnabled");
        l3out.target_dscp = attrs.owned("targetDscp");
        l3out.attrs = attrs.clone();
        Some(Context {
            l3out: Some(name.to_owned()),
            ..Context::in_tenant(tenant)
        })
    }

    fn l3out_vrf(&mut self, attrs: &Attributes, ctx: &Context) {
        let (Some(tenant), Some(name)) = (ctx.tenant.as_deref(), ctx.l3out.as_deref()) else {
            return;
        };
        let Some(vrf) = attrs.non_empty("tnFvCtxName") else {
            self.diags.warn(
                TAG,
                format!("L3Out {} has a VRF binding without a VRF name", compose(tenant, name)),
            );
            return;
        };
        if let Some(l3out) = self.builder.l3out_mut(tenant, name) {
            l3out.vrf = Some(Ref::new(vrf));
        }
    }

    fn l3_external_epg(&mut self, attrs: &Attributes, ctx: &Context) -> Option<Context> {
        let tenant = ctx.tenant.as_deref()?;
        let Some(name) = ctx.l3out.as_deref() else {
            self.diags
                .warn(TAG, "External EPG outside of an L3Out, skipping");
            return None;
        };
        let l3out = self.builder.l3out_mut(tenant, name)?;
        let epg = attrs
            .name()
            .map_or_else(|| l3out.default_epg_name(), str::to_owned);
        let idx = l3out.external_epg_index(&epg);
        l3out.external_epgs[idx].description = attrs.owned("descr");
        Some(Context {
            owner: Some(Owner::L3External {
                l3out: name.to_owned(),
                epg,
            }),
            ..ctx.clone()
        })
    }

    fn external_subnet(&mut self, attrs: &Attributes, ctx: &Context) {
        let Some(ip) = self.required(attrs, "ip", "External subnet") else {
            return;
        };
        let (Some(tenant), Some(Owner::L3External { l3out, epg })) =
            (ctx.tenant.as_deref(), ctx.owner.as_ref())
        else {
            return;
        };
        if let Some(l3out) = self.builder.l3out_mut(tenant, l3out) {
            let idx = l3out.external_epg_index(epg);
            let subnets = &mut l3out.external_epgs[idx].subnets;
            if !subnets.iter().any(|s| s == ip) {
                subnets.push(ip.to_owned());
            }
        }
    }

    fn static_route(&mut self, attrs: &Attributes, ctx: &Context) -> Option<Context> {
        let tenant = ctx.tenant.as_deref()?;
        let name = ctx.l3out.as_deref()?;
        let prefix = self.required(attrs, "ip", "Static route")?;
        let mut route = L3StaticRoute::new(prefix);
        if let Some(next_hop) = attrs.non_empty("nextHop") {
            route.add_next_hop(next_hop);
        }
        route.preference = attrs.owned("pref");
        route.interface = attrs.owned("ifName");
        route.node_id.clone_from(&ctx.l3node);
        let l3out = self.builder.l3out_mut(tenant, name)?;
        l3out.static_routes.push(route);
        Some(Context {
            route: Some(l3out.static_routes.len() - 1),
            ..ctx.clone()
        })
    }

    fn next_hop(&mut self, attrs: &Attributes, ctx: &Context) {
        let Some(next_hop) = self.required(attrs, "nhAddr", "Static route next hop") else {
            return;
        };
        let (Some(tenant), Some(name), Some(idx)) =
            (ctx.tenant.as_deref(), ctx.l3out.as_deref(), ctx.route)
        else {
            return;
        };
        if let Some(route) = self
            .builder
            .l3out_mut(tenant, name)
            .and_then(|l3out| l3out.static_routes.get_mut(idx))
        {
            route.add_next_hop(next_hop);
        }
    }

    fn bgp(&mut self, attrs: &Attributes, ctx: &Context) {
        let (Some(tenant), Some(name)) = (ctx.tenant.as_deref(), ctx.l3out.as_deref()) else {
            return;
        };
        let asn = attrs.non_empty("asn");
        let parsed = asn.and_then(|asn| asn.parse::<u32>().ok());
        if let (Some(asn), None) = (asn, parsed) {
            self.diags.warn(
                TAG,
                format!("Invalid AS number '{asn}' in L3Out {}, ignoring", compose(tenant, name)),
            );
        }
        if let Some(l3out) = self.builder.l3out_mut(tenant, name) {
            let bgp = l3out.bgp.get_or_insert_with(BgpConfig::default);
            if let Some(router_id) = attrs.owned("routerId") {
                bgp.router_id = Some(router_id);
            }
            if parsed.is_some() {
                bgp.asn = parsed;
            }
        }
    }

    fn bgp_peer(&mut self, attrs: &Attributes, ctx: &Context) {
        let Some(address) = self.required(attrs, "addr", "BGP peer") else {
            return;
        };
        let (Some(tenant), Some(name)) = (ctx.tenant.as_deref(), ctx.l3out.as_deref()) else {
            return;
        };
        if let Some(l3out) = self.builder.l3out_mut(tenant, name) {
            let bgp = l3out.bgp.get_or_insert_with(BgpConfig::default);
            bgp.peers.push(BgpPeer {
                address: address.to_owned(),
                remote_as: attrs.owned("asn"),
                local_as: attrs.owned("localAsn"),
                description: attrs.owned("descr"),
            });
        }
    }

    fn ospf(&mut self, attrs: &Attributes, ctx: &Context) {
        let (Some(tenant), Some(name)) = (ctx.tenant.as_deref(), ctx.l3out.as_deref()) else {
            return;
        };
        if let Some(l3out) = self.builder.l3out_mut(tenant, name) {
            l3out.ospf = Some(OspfConfig {
                name: attrs.owned("name"),
                area: attrs.first_non_empty(&["areaId", "area"]).map(str::to_owned),
                area_type: attrs.owned("areaType"),
            });
        }
    }

    fn l3out_node(&mut self, attrs: &Attributes, ctx: &Context) -> Option<Context> {
        let tenant = ctx.tenant.as_deref()?;
        let name = ctx.l3out.as_deref()?;
        let tdn = self.required(attrs, "tDn", "L3Out node")?;
        let node_id = node_id_from_dn(tdn).map(str::to_owned);
        let l3out = self.builder.l3out_mut(tenant, name)?;
        l3out.nodes.push(L3OutNode {
            tdn: tdn.to_owned(),
            node_id: node_id.clone(),
            router_id: attrs.owned("rtrId"),
        });
        Some(Context {
            l3node: node_id,
            ..ctx.clone()
        })
    }

    fn l3out_path(&mut self, attrs: &Attributes, ctx: &Context) {
        let Some(tdn) = self.required(attrs, "tDn", "L3Out path") else {
            return;
        };
        let (Some(tenant), Some(name)) = (ctx.tenant.as_deref(), ctx.l3out.as_deref()) else {
            return;
        };
        let path = L3OutPath {
            tdn: tdn.to_owned(),
            address: attrs.owned("addr"),
            encap: attrs.owned("encap"),
            if_type: attrs.owned("ifInstT"),
            mtu: attrs.owned("mtu"),
        };
        let encap = path.encap.clone();
        if let Some(l3out) = self.builder.l3out_mut(tenant, name) {
            l3out.paths.push(path);
        }
        match PathTarget::parse(tdn) {
            Some(target) => {
                let mut attachment = PathAttachment::new(tdn, target);
                attachment.encap = encap;
                attachment.description = Some(format!("L3Out {}", compose(tenant, name)));
                self.builder.add_path_attachment(attachment);
            }
            None => self
                .diags
                .warn(TAG, format!("Cannot parse L3Out path target {tdn}")),
        }
    }

    fn l2out(&mut self, attrs: &Attributes, ctx: &Context) -> Option<Context> {
        let tenant = self.tenant_of(ctx, "L2Out")?;
        let name = self.required(attrs, "name", "L2Out")?;
        let l2out = self.builder.l2out_mut(tenant, name)?;
        l2out.description = attrs.owned("descr");
        l2out.attrs = attrs.clone();
        Some(Context {
            l2out: Some(name.to_owned()),
            ..Context::in_tenant(tenant)
        })
    }

    fn l2out_bd(&mut self, attrs: &Attributes, ctx: &Context) {
        let (Some(tenant), Some(name)) = (ctx.tenant.as_deref(), ctx.l2out.as_deref()) else {
            return;
        };
        let bd = attrs.non_empty("tnFvBDName");
        if let Some(l2out) = self.builder.l2out_mut(tenant, name) {
            l2out.bridge_domain = bd.map(Ref::new);
            l2out.encap = attrs.owned("encap");
        }
        if bd.is_none() {
            self.diags.warn(
                TAG,
                format!(
                    "L2Out {} has a bridge domain binding without a bridge domain name",
                    compose(tenant, name)
                ),
            );
        }
    }

    fn l2_external_epg(&mut self, attrs: &Attributes, ctx: &Context) -> Option<Context> {
        let tenant = ctx.tenant.as_deref()?;
        let Some(name) = ctx.l2out.as_deref() else {
            self.diags
                .warn(TAG, "L2 external EPG outside of an L2Out, skipping");
            return None;
        };
        let l2out = self.builder.l2out_mut(tenant, name)?;
        let epg = attrs
            .name()
            .map_or_else(|| format!("extepg-{name}"), str::to_owned);
        if !l2out.external_epgs.iter().any(|e| e.name == epg) {
            let mut external = ExternalEpg::new(&l2out.key, &epg);
            external.description = attrs.owned("descr");
            l2out.external_epgs.push(external);
        }
        Some(Context {
            owner: Some(Owner::L2External {
                l2out: name.to_owned(),
                epg,
            }),
            ..ctx.clone()
        })
    }

    /// An explicit protection group with exactly two node endpoints is a vPC pair
    fn explicit_group(&mut self, node: &RawNode) {
        let members: Vec<&str> = node
            .children
            .iter()
            .filter(|child| child.kind == NodeKind::NodePEp)
            .filter_map(|child| child.attributes.first_non_empty(&["id", "nodeId"]))
            .collect();
        let id = node
            .attributes
            .first_non_empty(&["id", "name"])
            .unwrap_or_default();
        if let [node_a, node_b] = members.as_slice() {
            self.builder.add_vpc_pair(VpcPair {
                id: id.to_owned(),
                name: node.attributes.owned("name"),
                node_a: (*node_a).to_owned(),
                node_b: (*node_b).to_owned(),
            });
        } else if !members.is_empty() {
            debug!(
                "Protection group {id} has {} member nodes, not a vPC pair",
                members.len()
            );
        }
    }

    fn node_endpoint(&mut self, attrs: &Attributes, ctx: &Context) -> Option<Context> {
        let Some(node_id) = attrs.first_non_empty(&["id", "nodeId"]) else {
            self.diags
                .warn(TAG, "Fabric node without a node id, skipping");
            return None;
        };
        let node = self.builder.fabric_node_mut(node_id)?;
        if let Some(name) = attrs.name() {
            node.name = name.to_owned();
        }
        if let Some(role) = attrs.owned("role") {
            node.role = Some(role);
        }
        if let Some(pod) = attrs.owned("podId") {
            node.pod_id = Some(pod);
        }
        node.attrs = attrs.clone();
        Some(Context {
            node: Some(node_id.to_owned()),
            ..ctx.clone()
        })
    }

    fn node_identity(&mut self, attrs: &Attributes) {
        let Some(node_id) = attrs.first_non_empty(&["nodeId", "id"]) else {
            self.diags
                .warn(TAG, "Node identity without a node id, skipping");
            return;
        };
        if let Some(name) = attrs.name() {
            self.builder.set_node_name(node_id, name);
        }
        if let Some(node) = self.builder.fabric_node_mut(node_id) {
            if let Some(serial) = attrs.owned("serial") {
                node.serial = Some(serial);
            }
            if node.role.is_none() {
                node.role = attrs.owned("role");
            }
        }
    }

    fn node_interface(&mut self, kind: &NodeKind, attrs: &Attributes, ctx: &Context) {
        let field = if *kind == NodeKind::PhysIf { "id" } else { "name" };
        let Some(name) = self.required(attrs, field, "Node interface") else {
            return;
        };
        let Some(node) = ctx
            .node
            .as_deref()
            .and_then(|id| self.builder.fabric_node_mut(id))
        else {
            debug!("Ignoring interface {name} outside of a fabric node");
            return;
        };
        let iface = node.interface_mut(name);
        if let Some(descr) = attrs.owned("descr") {
            iface.description = Some(descr);
        }
        if let Some(state) = attrs.non_empty("adminSt") {
            iface.enabled = !state.eq_ignore_ascii_case("down");
        }
        if let Some(mtu) = attrs.non_empty("mtu") {
            iface.mtu = mtu.parse().ok();
        }
    }

    fn management(&mut self, attrs: &Attributes) {
        let Some(tdn) = self.required(attrs, "tDn", "Management address") else {
            return;
        };
        let Some(address) = attrs.owned("addr") else {
            debug!("Management binding {tdn} carries no address");
            return;
        };
        let Some(node_id) = node_id_from_dn(tdn) else {
            self.diags
                .warn(TAG, format!("Could not parse node id from management target {tdn}"));
            return;
        };
        self.builder.set_management(
            node_id,
            ManagementInfo {
                address,
                gateway: attrs.owned("gw"),
                address6: attrs.owned("addr6"),
                gateway6: attrs.owned("gw6"),
            },
        );
    }
}

/// Parse the root of an export into the top-level nodes to dispatch
fn root_nodes(root: &Value, source: &str) -> Result<Vec<RawNode>, IngestError> {
    let Some(object) = root.as_object() else {
        return Err(IngestError::RootNotObject(source.to_owned()));
    };
    if let Some(imdata) = object.get("imdata") {
        let Some(items) = imdata.as_array() else {
            return Err(IngestError::MalformedField {
                path: "$".to_owned(),
                field: "imdata",
                expected: "an array",
            });
        };
        return items.iter().map(RawNode::from_json).collect();
    }
    if let Some(body) = object.get("polUni") {
        return Ok(vec![RawNode::from_tagged_json("polUni", body)?]);
    }
    let single_tag = object.len() == 1
        && !object.contains_key("attributes")
        && !object.contains_key("children");
    if single_tag {
        Ok(vec![RawNode::from_json(root)?])
    } else {
        Ok(vec![RawNode::from_tagged_json("polUni", root)?])
    }
}

/// Ingest a parsed export. Fails only on structurally malformed input;
/// everything else is reported through `diags`.
pub fn ingest(
    root: &Value,
    source: &str,
    diags: &mut Diagnostics,
) -> Result<PolicyGraph, IngestError> {
    let nodes = root_nodes(root, source)?;
    let count: usize = nodes.iter().map(RawNode::count).sum();
    info!("Ingesting {count} policy nodes from {source}");

    let mut dispatcher = Dispatcher {
        builder: PolicyGraphBuilder::new(source),
        diags,
    };
    let ctx = Context::default();
    for node in &nodes {
        dispatcher.dispatch(node, &ctx);
    }
    let Dispatcher { builder, diags } = dispatcher;
    Ok(builder.finalize(diags))
}

/// Ingest a JSON export given as text
pub fn ingest_str(
    text: &str,
    source: &str,
    diags: &mut Diagnostics,
) -> Result<PolicyGraph, IngestError> {
    let root: Value =
        serde_json::from_str(text).map_err(|e| IngestError::InvalidJson(e.to_string()))?;
    ingest(&root, source, diags)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // valid in tests
mod test {
    use super::{contract_from_dn, ingest, ingest_str, node_id_from_dn};
    use crate::diagnostics::Diagnostics;
    use crate::errors::IngestError;
    use crate::objects::ContractLike;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tracing_test::traced_test;

    fn sample() -> serde_json::Value {
        json!({"polUni": {"attributes": {"name": "Lab"}, "children": [
            {"fvTenant": {"attributes": {"name": "T"}, "children": [
                {"fvCtx": {"attributes": {"name": "V", "pcEnfPref": "enforced"}}},
                {"fvBD": {"attributes": {"name": "BD", "arpFlood": "yes"}, "children": [
                    {"fvSubnet": {"attributes": {"ip": "10.1.1.1/24"}}},
                    {"fvRsCtx": {"attributes": {"tnFvCtxName": "V"}}}
                ]}},
                {"fvAp": {"attributes": {"name": "A"}, "children": [
                    {"fvAEPg": {"attributes": {"name": "E"}, "children": [
                        {"fvRsBd": {"attributes": {"tnFvBDName": "BD"}}},
                        {"fvRsProv": {"attributes": {"tnVzBrCPName": "C"}}},
                        {"fvRsProtBy": {"attributes": {"tnVzTabooName": "NoSsh"}}},
                        {"fvRsPathAtt": {"attributes": {
                            "tDn": "topology/pod-1/paths-101/pathep-[eth1/1]",
                            "encap": "vlan-100"}}}
                    ]}}
                ]}},
                {"vzFilter": {"attributes": {"name": "http"}, "children": [
                    {"vzEntry": {"attributes": {"name": "e1", "etherT": "ip", "prot": "tcp", "dFromPort": "80", "dToPort": "80"}}}
                ]}},
                {"vzBrCP": {"attributes": {"name": "C", "scope": "context"}, "children": [
                    {"vzSubj": {"attributes": {"name": "s1"}, "children": [
                        {"vzRsSubjFiltAtt": {"attributes": {"tnVzFilterName": "http"}}}
                    ]}}
                ]}},
                {"vzTaboo": {"attributes": {"name": "NoSsh"}, "children": [
                    {"vzTSubj": {"attributes": {"name": "ts"}, "children": [
                        {"vzRsDenyRule": {"attributes": {"tnVzFilterName": "ssh"}}}
                    ]}}
                ]}}
            ]}},
            {"fabricInst": {"attributes": {}, "children": [
                {"fabricProtPol": {"attributes": {}, "children": [
                    {"fabricExplicitGEp": {"attributes": {"name": "pair", "id": "10"}, "children": [
                        {"fabricNodePEp": {"attributes": {"id": "101", "name": "leaf1", "role": "leaf", "podId": "1"}}},
                        {"fabricNodePEp": {"attributes": {"id": "102", "role": "leaf"}}}
                    ]}}
                ]}},
                {"fabricNodeIdentPol": {"attributes": {}, "children": [
                    {"fabricNodeIdentP": {"attributes": {"nodeId": "102", "name": "leaf2", "serial": "S2"}}}
                ]}}
            ]}}
        ]}})
    }

    #[test]
    #[traced_test]
    fn test_ingest_sample() {
        let mut diags = Diagnostics::new();
        let graph = ingest(&sample(), "lab.json", &mut diags).unwrap();
        assert_eq!(graph.name(), "lab");
        assert_eq!(graph.source(), "lab.json");

        let bd = graph.bridge_domains().by_key("T:BD").unwrap();
        assert_eq!(bd.subnets, vec!["10.1.1.1/24"]);
        assert!(bd.arp_flood);
        let vrf = bd.vrf.as_ref().unwrap();
        assert_eq!(vrf.key(), "T:V");
        assert!(vrf.is_resolved());

        let epg = graph.epgs().by_key("T:A:E").unwrap();
        assert_eq!(epg.bridge_domain.as_ref().unwrap().key(), "T:BD");
        assert_eq!(epg.relations.provided[0].key(), "T:C");
        assert_eq!(epg.relations.taboos[0].key(), "T:NoSsh");

        let contract = graph.contracts().by_key("T:C").unwrap();
        assert_eq!(contract.filter_count(), 1);
        assert_eq!(contract.subjects()[0].filters[0].filter.key(), "T:http");

        let leaf2 = graph.fabric_nodes().by_key("102").unwrap();
        assert_eq!(leaf2.hostname(), "leaf2");
        assert_eq!(leaf2.serial.as_deref(), Some("S2"));
        assert_eq!(graph.vpc_peer("101"), Some("102"));

        let att = graph.path_attachments("101").unwrap().get("eth1/1").unwrap();
        assert_eq!(att.encap.as_deref(), Some("vlan-100"));
        assert_eq!(att.epg.as_deref(), Some("T:A:E"));
        assert_eq!(att.epg_tenant.as_deref(), Some("T"));

        // the taboo's filter does not exist
        assert!(diags.any_warning_contains("ssh"));
    }

    #[test]
    fn test_root_forms() {
        let mut diags = Diagnostics::new();
        let tenant = json!({"fvTenant": {"attributes": {"name": "T"}}});
        let graph = ingest(&tenant, "dir/Export.JSON", &mut diags).unwrap();
        assert_eq!(graph.name(), "aci-export");
        assert!(graph.tenants().contains_key("T"));

        let envelope = json!({"imdata": [tenant.clone(), {"fvTenant": {"attributes": {"name": "U"}}}]});
        let graph = ingest(&envelope, "rest", &mut diags).unwrap();
        assert_eq!(graph.tenants().len(), 2);

        let body = json!({"attributes": {"name": "Uni"}, "children": [tenant]});
        let graph = ingest(&body, "x", &mut diags).unwrap();
        assert_eq!(graph.name(), "uni");
        assert_eq!(graph.tenants().len(), 1);
    }

    #[test]
    fn test_structural_errors() {
        let mut diags = Diagnostics::new();
        assert_eq!(
            ingest(&json!([1, 2]), "list", &mut diags).unwrap_err(),
            IngestError::RootNotObject("list".to_owned())
        );
        assert!(matches!(
            ingest_str("{not json", "bad", &mut diags),
            Err(IngestError::InvalidJson(_))
        ));
        assert!(matches!(
            ingest(&json!({"imdata": {}}), "env", &mut diags),
            Err(IngestError::MalformedField { field: "imdata", .. })
        ));
        assert!(matches!(
            ingest(&json!({"polUni": {"children": {}}}), "x", &mut diags),
            Err(IngestError::MalformedField { field: "children", .. })
        ));
    }

    #[test]
    #[traced_test]
    fn test_missing_names_dropped() {
        let mut diags = Diagnostics::new();
        let root = json!({"polUni": {"children": [
            {"fvTenant": {"attributes": {}, "children": [
                {"fvCtx": {"attributes": {"name": "lost"}}}
            ]}},
            {"fvTenant": {"attributes": {"name": "T"}, "children": [
                {"fvBD": {"attributes": {"name": ""}}},
                {"fabricNodePEp": {"attributes": {"name": "orphan"}}}
            ]}}
        ]}});
        let graph = ingest(&root, "x", &mut diags).unwrap();
        assert_eq!(graph.tenants().len(), 1);
        assert!(graph.vrfs().is_empty());
        assert!(graph.bridge_domains().is_empty());
        assert!(graph.fabric_nodes().is_empty());
        assert!(diags.any_warning_contains("Tenant without a name"));
        assert!(diags.any_warning_contains("Bridge domain without a name"));
        assert!(diags.any_warning_contains("Fabric node without a node id"));
        assert!(logs_contain("Tenant without a name"));
    }

    #[test]
    fn test_unknown_wrappers_walked() {
        let mut diags = Diagnostics::new();
        let root = json!({"polUni": {"children": [
            {"someWrapper": {"children": [
                {"otherWrapper": {"attributes": {"x": "1"}, "children": [
                    {"fvTenant": {"attributes": {"name": "Deep"}}}
                ]}}
            ]}}
        ]}});
        let graph = ingest(&root, "x", &mut diags).unwrap();
        assert!(graph.tenants().contains_key("Deep"));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_l3out() {
        let mut diags = Diagnostics::new();
        let root = json!({"fvTenant": {"attributes": {"name": "T"}, "children": [
            {"fvCtx": {"attributes": {"name": "V"}}},
            {"l3extOut": {"attributes": {"name": "wan", "enforceRtctrl": "export"}, "children": [
                {"l3extRsEctx": {"attributes": {"tnFvCtxName": "V"}}},
                {"bgpExtP": {"attributes": {}}},
                {"l3extLNodeP": {"attributes": {"name": "np"}, "children": [
                    {"l3extRsNodeL3OutAtt": {"attributes": {"tDn": "topology/pod-1/node-101", "rtrId": "1.1.1.1"}, "children": [
                        {"ipRouteP": {"attributes": {"ip": "0.0.0.0/0", "pref": "1"}, "children": [
                            {"ipNexthopP": {"attributes": {"nhAddr": "192.0.2.1"}}}
                        ]}}
                    ]}},
                    {"l3extLIfP": {"attributes": {"name": "ifp"}, "children": [
                        {"l3extRsPathL3OutAtt": {"attributes": {
                            "tDn": "topology/pod-1/paths-101/pathep-[eth1/48]",
                            "addr": "192.0.2.2/30", "ifInstT": "l3-port"}}}
                    ]}}
                ]}},
                {"l3extInstP": {"attributes": {}, "children": [
                    {"l3extSubnet": {"attributes": {"ip": "0.0.0.0/0"}}},
                    {"fvRsCons": {"attributes": {"tnVzBrCPName": "web"}}}
                ]}}
            ]}}
        ]}});
        let graph = ingest(&root, "x", &mut diags).unwrap();
        let l3out = graph.l3outs().by_key("T:wan").unwrap();
        assert_eq!(l3out.vrf.as_ref().unwrap().key(), "T:V");
        assert!(l3out.bgp.is_some());
        assert_eq!(l3out.enforce_route_control.as_deref(), Some("export"));
        assert_eq!(l3out.static_routes.len(), 1);
        let route = &l3out.static_routes[0];
        assert_eq!(route.next_hops, vec!["192.0.2.1"]);
        assert_eq!(route.node_id.as_deref(), Some("101"));
        assert_eq!(l3out.nodes[0].router_id.as_deref(), Some("1.1.1.1"));
        assert_eq!(l3out.paths[0].if_type.as_deref(), Some("l3-port"));
        let ext = l3out.external_epg("extepg-wan").unwrap();
        assert_eq!(ext.key, "T:wan:extepg-wan");
        assert_eq!(ext.subnets, vec!["0.0.0.0/0"]);
        assert_eq!(ext.relations.consumed[0].name(), "web");
        assert!(graph.path_attachments("101").unwrap().contains_key("eth1/48"));
        // contract "web" does not exist
        assert!(diags.any_warning_contains("web"));
    }

    #[test]
    fn test_management_and_interfaces() {
        let mut diags = Diagnostics::new();
        let root = json!({"polUni": {"children": [
            {"fvTenant": {"attributes": {"name": "mgmt"}, "children": [
                {"mgmtMgmtP": {"attributes": {"name": "default"}, "children": [
                    {"mgmtOoB": {"attributes": {"name": "default"}, "children": [
                        {"mgmtRsOoBStNode": {"attributes": {"tDn": "topology/pod-1/node-201", "addr": "10.0.0.5/24", "gw": "10.0.0.1"}}},
                        {"mgmtRsOoBStNode": {"attributes": {"tDn": "topology/pod-1/node-999", "addr": "10.0.0.9/24"}}}
                    ]}}
                ]}}
            ]}},
            {"fabricInst": {"children": [
                {"fabricNodePEp": {"attributes": {"id": "201", "name": "DC1-Spine-01", "role": "unspecified"}, "children": [
                    {"l1PhysIf": {"attributes": {"id": "eth1/1", "descr": "to leaf", "adminSt": "down", "mtu": "9000"}}},
                    {"fabricInterface": {"attributes": {"name": "eth1/2"}}}
                ]}}
            ]}}
        ]}});
        let graph = ingest(&root, "x", &mut diags).unwrap();
        let spine = graph.fabric_nodes().by_key("201").unwrap();
        assert_eq!(
            spine.management.as_ref().unwrap().gateway.as_deref(),
            Some("10.0.0.1")
        );
        let eth1 = spine.interfaces.get("eth1/1").unwrap();
        assert!(!eth1.enabled);
        assert_eq!(eth1.mtu, Some(9000));
        assert_eq!(
            graph.node_interfaces("201").unwrap().iter().collect::<Vec<_>>(),
            vec!["eth1/1", "eth1/2"]
        );
        assert!(diags.any_warning_contains("999"));
    }

    #[test]
    fn test_dn_helpers() {
        assert_eq!(node_id_from_dn("topology/pod-1/node-101"), Some("101"));
        assert_eq!(node_id_from_dn("topology/pod-1"), None);
        assert_eq!(contract_from_dn("uni/tn-T/brc-web"), Some(("T", "web")));
        assert_eq!(contract_from_dn("uni/tn-T"), None);
    }
}
