// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Policy entities

pub mod contract;
pub mod external;
pub mod fabric;
pub mod filter;
pub mod tenant;

pub use contract::{
    Contract, ContractInterface, ContractLike, FilterAction, FilterRef, Subject, TabooContract,
};
pub use external::{
    BgpConfig, BgpPeer, ExternalEpg, L2Out, L3Out, L3OutNode, L3OutPath, L3StaticRoute, OspfConfig,
};
pub use fabric::{
    FabricNode, ManagementInfo, NodeInterface, NodeRole, PathAttachment, PathTarget, PortKind,
    VpcPair,
};
pub use filter::{EntryFields, Filter, FilterEntry};
pub use tenant::{ApplicationProfile, BridgeDomain, ContractRelations, Epg, Tenant, Vrf};
