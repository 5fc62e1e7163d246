// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The frozen policy graph: arenas of entities addressed by typed indices,
//! with name references already resolved.

use ordermap::OrderSet;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::objects::{
    ApplicationProfile, BridgeDomain, Contract, ContractInterface, Epg, FabricNode, Filter, L2Out,
    L3Out, PathAttachment, TabooContract, Tenant, VpcPair, Vrf,
};

/// Index of an entity of type `T` in its [`Table`]
pub struct Idx<T> {
    raw: usize,
    _marker: PhantomData<fn() -> T>,
}
impl<T> Idx<T> {
    pub(crate) fn new(raw: usize) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }
    #[must_use]
    pub fn raw(self) -> usize {
        self.raw
    }
}
impl<T> Clone for Idx<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Idx<T> {}
impl<T> PartialEq for Idx<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}
impl<T> Eq for Idx<T> {}
impl<T> PartialOrd for Idx<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<T> Ord for Idx<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}
impl<T> Hash for Idx<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}
impl<T> Debug for Idx<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.raw)
    }
}

/// A reference by name to an entity of type `T`. The name is kept as written; the
/// composite key and the target are filled in when the graph is finalized. An
/// unresolved reference keeps its name and has no target.
pub struct Ref<T> {
    name: String,
    key: Option<String>,
    target: Option<Idx<T>>,
}
impl<T> Ref<T> {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            key: None,
            target: None,
        }
    }
    /// The name as it appeared in the input
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
    /// The composite key this reference was qualified to, or the raw name before finalize
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }
    #[must_use]
    pub fn target(&self) -> Option<Idx<T>> {
        self.target
    }
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }
    pub(crate) fn bind(&mut self, key: String, target: Option<Idx<T>>) {
        self.key = Some(key);
        self.target = target;
    }
}
impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            key: self.key.clone(),
            target: self.target,
        }
    }
}
impl<T> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.key == other.key && self.target == other.target
    }
}
impl<T> Eq for Ref<T> {}
impl<T> Debug for Ref<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.target {
            Some(idx) => write!(f, "{}->{idx:?}", self.key()),
            None => write!(f, "{}(unresolved)", self.key()),
        }
    }
}

#[derive(Debug)]
/// An arena of entities ordered by composite key
pub struct Table<T> {
    entries: Vec<T>,
    index: BTreeMap<String, Idx<T>>,
}
impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            entries: vec![],
            index: BTreeMap::new(),
        }
    }
}
impl<T> Table<T> {
    pub(crate) fn from_map(map: BTreeMap<String, T>) -> Self {
        let mut table = Self::default();
        for (key, entity) in map {
            let idx = Idx::new(table.entries.len());
            table.entries.push(entity);
            table.index.insert(key, idx);
        }
        table
    }
    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut()
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    #[must_use]
    pub fn get(&self, idx: Idx<T>) -> Option<&T> {
        self.entries.get(idx.raw)
    }
    #[must_use]
    pub fn by_key(&self, key: &str) -> Option<&T> {
        self.index.get(key).and_then(|idx| self.get(*idx))
    }
    #[must_use]
    pub fn idx_of(&self, key: &str) -> Option<Idx<T>> {
        self.index.get(key).copied()
    }
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }
    /// Follow a reference to its target, if it was resolved
    #[must_use]
    pub fn resolve(&self, reference: &Ref<T>) -> Option<&T> {
        reference.target().and_then(|idx| self.get(idx))
    }
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.index.keys()
    }
    /// Entities in key order
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
    pub fn iter(&self) -> impl Iterator<Item = (&String, &T)> {
        self.index
            .iter()
            .filter_map(|(key, idx)| self.get(*idx).map(|entity| (key, entity)))
    }
}

#[derive(Debug)]
/// The policy graph after finalize. It can only be read.
pub struct PolicyGraph {
    pub(crate) name: String,
    pub(crate) source: String,
    pub(crate) tenants: Table<Tenant>,
    pub(crate) vrfs: Table<Vrf>,
    pub(crate) bridge_domains: Table<BridgeDomain>,
    pub(crate) application_profiles: Table<ApplicationProfile>,
    pub(crate) epgs: Table<Epg>,
    pub(crate) contracts: Table<Contract>,
    pub(crate) taboos: Table<TabooContract>,
    pub(crate) filters: Table<Filter>,
    pub(crate) contract_interfaces: Table<ContractInterface>,
    pub(crate) l3outs: Table<L3Out>,
    pub(crate) l2outs: Table<L2Out>,
    pub(crate) fabric_nodes: Table<FabricNode>,
    pub(crate) vpc_pairs: Vec<VpcPair>,
    pub(crate) path_attachments: BTreeMap<String, BTreeMap<String, PathAttachment>>, /* node id -> interface -> attachment */
    pub(crate) node_interfaces: BTreeMap<String, OrderSet<String>>, /* node id -> interfaces */
}

impl PolicyGraph {
    /// Top-level name of the policy universe
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Name of the input this graph was built from
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
    #[must_use]
    pub fn tenants(&self) -> &Table<Tenant> {
        &self.tenants
    }
    #[must_use]
    pub fn vrfs(&self) -> &Table<Vrf> {
        &self.vrfs
    }
    #[must_use]
    pub fn bridge_domains(&self) -> &Table<BridgeDomain> {
        &self.bridge_domains
    }
    #[must_use]
    pub fn application_profiles(&self) -> &Table<ApplicationProfile> {
        &self.application_profiles
    }
    #[must_use]
    pub fn epgs(&self) -> &Table<Epg> {
        &self.epgs
    }
    #[must_use]
    pub fn contracts(&self) -> &Table<Contract> {
        &self.contracts
    }
    #[must_use]
    pub fn taboos(&self) -> &Table<TabooContract> {
        &self.taboos
    }
    #[must_use]
    pub fn filters(&self) -> &Table<Filter> {
        &self.filters
    }
    #[must_use]
    pub fn contract_interfaces(&self) -> &Table<ContractInterface> {
        &self.contract_interfaces
    }
    #[must_use]
    pub fn l3outs(&self) -> &Table<L3Out> {
        &self.l3outs
    }
    #[must_use]
    pub fn l2outs(&self) -> &Table<L2Out> {
        &self.l2outs
    }
    #[must_use]
    pub fn fabric_nodes(&self) -> &Table<FabricNode> {
        &self.fabric_nodes
    }
    #[must_use]
    pub fn vpc_pairs(&self) -> &[VpcPair] {
        &self.vpc_pairs
    }
    /// Path attachments of a node, by interface name
    #[must_use]
    pub fn path_attachments(&self, node_id: &str) -> Option<&BTreeMap<String, PathAttachment>> {
        self.path_attachments.get(node_id)
    }
    pub fn all_path_attachments(&self) -> impl Iterator<Item = (&String, &PathAttachment)> {
        self.path_attachments
            .iter()
            .flat_map(|(node, atts)| atts.values().map(move |att| (node, att)))
    }
    /// Names of the interfaces known on a node, in discovery order
    #[must_use]
    pub fn node_interfaces(&self, node_id: &str) -> Option<&OrderSet<String>> {
        self.node_interfaces.get(node_id)
    }
    /// The vPC peer of a node, if it belongs to a vPC pair
    #[must_use]
    pub fn vpc_peer(&self, node_id: &str) -> Option<&str> {
        self.vpc_pairs.iter().find_map(|pair| pair.peer_of(node_id))
    }
}
