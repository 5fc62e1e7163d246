// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Access lists compiled from contracts and taboo contracts, and the per-EPG policies
//! composed from them

use model::{Acl, AclLine, LineAction, MatchExpr};
use ordermap::OrderSet;
use policy::objects::{ContractLike, ContractRelations, FilterAction, FilterRef};
use policy::{Diagnostics, PolicyGraph};
use std::collections::BTreeMap;
use tracectl::trace_target;
use tracing::debug;

use crate::matching::EntryCompiler;

trace_target!("acl", tracectl::LevelFilter::INFO, &["lower"]);

const TAG: &str = "lower";

pub const CONTRACT_ACL_PREFIX: &str = "~CONTRACT~";
pub const TABOO_ACL_PREFIX: &str = "~TABOO~";
pub const EPG_POLICY_ACL_PREFIX: &str = "~EPG_POLICY~";

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Direction {
    Incoming,
    Outgoing,
}
impl Direction {
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Direction::Incoming => "IN",
            Direction::Outgoing => "OUT",
        }
    }
}

#[must_use]
pub fn contract_acl_name(contract_key: &str) -> String {
    format!("{CONTRACT_ACL_PREFIX}{contract_key}")
}
#[must_use]
pub fn taboo_acl_name(taboo_key: &str) -> String {
    format!("{TABOO_ACL_PREFIX}{taboo_key}")
}
/// Name of the policy composed for one direction of an EPG. Characters other than
/// alphanumerics, `:`, `_` and `-` are replaced.
#[must_use]
pub fn epg_policy_acl_name(epg_key: &str, direction: Direction) -> String {
    let sanitized: String = epg_key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, ':' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{EPG_POLICY_ACL_PREFIX}{sanitized}~{}", direction.suffix())
}

/// Match of one subject filter reference. The tenant filter supplies the match: its
/// only entry, or any of its entries. A reference to a missing filter falls back to
/// the match fields carried by the reference.
fn filter_ref_match(
    graph: &PolicyGraph,
    fref: &FilterRef,
    origin: &str,
    diags: &mut Diagnostics,
) -> MatchExpr {
    let Some(filter) = graph.filters().resolve(&fref.filter) else {
        diags.warn(
            TAG,
            format!(
                "{origin}: filter {} is not defined, matching on the fields of the reference",
                fref.filter.key()
            ),
        );
        return EntryCompiler::new(origin, diags).compile(&fref.fields);
    };
    if filter.entries.is_empty() {
        return MatchExpr::True;
    }
    let matches: Vec<MatchExpr> = filter
        .entries
        .iter()
        .map(|entry| {
            let origin = format!("{origin} entry {}", entry.name);
            EntryCompiler::new(&origin, diags).compile(&entry.fields)
        })
        .collect();
    MatchExpr::or(matches)
}

/// One line per subject filter reference, in subject then filter order, and a final deny.
/// Lines of a taboo contract all match-permit: the composed EPG policy turns them into denies.
fn compile_acl<C: ContractLike>(
    graph: &PolicyGraph,
    contract: &C,
    name: &str,
    kind: &str,
    diags: &mut Diagnostics,
) -> Acl {
    let mut acl = Acl::new(name);
    for subject in contract.subjects() {
        for fref in &subject.filters {
            let line_name = format!("{}/{}", subject.name, fref.name());
            let origin = format!("{kind} {} line {line_name}", contract.key());
            let matcher = filter_ref_match(graph, fref, &origin, diags);
            let action = match fref.action {
                FilterAction::Deny if kind == "Contract" => LineAction::Deny,
                _ => LineAction::Permit,
            };
            acl.add_line(AclLine::new(&line_name, action, matcher));
        }
    }
    acl.add_line(AclLine::deny("default-deny", MatchExpr::True));
    debug!("Compiled {name} with {} lines", acl.len());
    acl
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
/// The access lists filtering the interfaces of an EPG
pub struct EpgFilters {
    pub incoming: Option<String>,
    pub outgoing: Option<String>,
}

#[derive(Debug, Default)]
/// Fabric-wide access lists: one per contract or taboo contract with at least one
/// subject, and the policies composed per EPG direction
pub struct PolicyAcls {
    acls: BTreeMap<String, Acl>,
    epg_filters: BTreeMap<String, EpgFilters>,
}

impl PolicyAcls {
    /// Compile every contract and taboo contract of `graph`, then compose the filters of every EPG
    pub fn compile(graph: &PolicyGraph, diags: &mut Diagnostics) -> Self {
        let mut policy = Self::default();
        for contract in graph.contracts().values() {
            if contract.subjects.is_empty() {
                debug!("Contract {} has no subjects, no access list", contract.key);
                continue;
            }
            let name = contract_acl_name(&contract.key);
            let acl = compile_acl(graph, contract, &name, "Contract", diags);
            policy.acls.insert(name, acl);
        }
        for taboo in graph.taboos().values() {
            if taboo.subjects.is_empty() {
                debug!("Taboo contract {} has no subjects, no access list", taboo.key);
                continue;
            }
            let name = taboo_acl_name(&taboo.key);
            let acl = compile_acl(graph, taboo, &name, "Taboo contract", diags);
            policy.acls.insert(name, acl);
        }
        for epg in graph.epgs().values() {
            let filters = policy.compose(graph, &epg.key, &epg.relations, diags);
            if filters != EpgFilters::default() {
                policy.epg_filters.insert(epg.key.clone(), filters);
            }
        }
        policy
    }

    /// Access lists in name order
    pub fn acls(&self) -> impl Iterator<Item = &Acl> {
        self.acls.values()
    }
    #[must_use]
    pub fn acl(&self, name: &str) -> Option<&Acl> {
        self.acls.get(name)
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.acls.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.acls.is_empty()
    }
    /// Filters of the EPG with key `epg_key`, if it references any contract or taboo
    #[must_use]
    pub fn epg_filters(&self, epg_key: &str) -> Option<&EpgFilters> {
        self.epg_filters.get(epg_key)
    }

    /// Access lists of the contracts an EPG provides or consumes, directly or through
    /// contract interfaces, without duplicates
    fn contract_acls(
        &self,
        graph: &PolicyGraph,
        provided: bool,
        relations: &ContractRelations,
        owner: &str,
        diags: &mut Diagnostics,
    ) -> OrderSet<String> {
        let (contracts, interfaces) = if provided {
            (&relations.provided, &relations.provided_interfaces)
        } else {
            (&relations.consumed, &relations.consumed_interfaces)
        };
        let direct = contracts.iter().filter_map(|r| graph.contracts().resolve(r));
        let exported = interfaces
            .iter()
            .filter_map(|r| graph.contract_interfaces().resolve(r))
            .filter_map(|cpif| cpif.exported.as_ref())
            .filter_map(|r| graph.contracts().resolve(r));

        let mut names = OrderSet::new();
        for contract in direct.chain(exported) {
            let name = contract_acl_name(&contract.key);
            if self.acls.contains_key(&name) {
                names.insert(name);
            } else {
                diags.warn(
                    TAG,
                    format!(
                        "{owner} references contract {} which has no subjects, ignoring it",
                        contract.key
                    ),
                );
            }
        }
        names
    }

    fn compose(
        &mut self,
        graph: &PolicyGraph,
        epg_key: &str,
        relations: &ContractRelations,
        diags: &mut Diagnostics,
    ) -> EpgFilters {
        let owner = format!("EPG {epg_key}");
        let provided = self.contract_acls(graph, true, relations, &owner, diags);
        let consumed = self.contract_acls(graph, false, relations, &owner, diags);
        let taboos: Vec<String> = relations
            .taboos
            .iter()
            .filter_map(|r| graph.taboos().resolve(r))
            .map(|taboo| taboo_acl_name(&taboo.key))
            .filter(|name| self.acls.contains_key(name))
            .collect();
        EpgFilters {
            incoming: self.direction_filter(epg_key, Direction::Incoming, &provided, &taboos),
            outgoing: self.direction_filter(epg_key, Direction::Outgoing, &consumed, &taboos),
        }
    }

    /// The filter of one direction: nothing without references, the contract access list
    /// itself for a single contract, a composed policy otherwise. Taboo denies come first.
    fn direction_filter(
        &mut self,
        epg_key: &str,
        direction: Direction,
        contracts: &OrderSet<String>,
        taboos: &[String],
    ) -> Option<String> {
        if taboos.is_empty() && contracts.len() <= 1 {
            return contracts.iter().next().cloned();
        }
        let name = epg_policy_acl_name(epg_key, direction);
        let mut acl = Acl::new(&name);
        for taboo in taboos {
            acl.add_line(AclLine::deny(
                &format!("taboo {taboo}"),
                MatchExpr::PermittedByAcl(taboo.clone()),
            ));
        }
        for contract in contracts {
            acl.add_line(AclLine::permit(
                &format!("contract {contract}"),
                MatchExpr::PermittedByAcl(contract.clone()),
            ));
        }
        if contracts.is_empty() {
            acl.add_line(AclLine::permit("default-permit", MatchExpr::True));
        } else {
            acl.add_line(AclLine::deny("default-deny", MatchExpr::True));
        }
        debug!("Composed {name} with {} lines", acl.len());
        self.acls.insert(name.clone(), acl);
        Some(name)
    }
}
