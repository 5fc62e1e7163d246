// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Contracts, taboo contracts, their subjects and filter references

use crate::attributes::Attributes;
use crate::graph::Ref;
use crate::keys::compose;
use crate::objects::filter::{EntryFields, Filter};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FilterAction {
    #[default]
    Permit,
    Deny,
}
impl FilterAction {
    #[must_use]
    pub fn from_attr(action: Option<&str>) -> Self {
        match action {
            Some(a) if a.eq_ignore_ascii_case("deny") => FilterAction::Deny,
            _ => FilterAction::Permit,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// A subject's reference to a tenant filter. Match fields found on the reference
/// itself are kept for filters that cannot be resolved.
pub struct FilterRef {
    pub filter: Ref<Filter>,
    pub action: FilterAction,
    pub fields: EntryFields,
}
impl FilterRef {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            filter: Ref::new(name),
            action: FilterAction::Permit,
            fields: EntryFields::default(),
        }
    }
    #[must_use]
    pub fn name(&self) -> &str {
        self.filter.name()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Subject {
    pub name: String,
    pub description: Option<String>,
    pub reverse_ports: bool,
    pub filters: Vec<FilterRef>,
}
impl Subject {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            description: None,
            reverse_ports: false,
            filters: vec![],
        }
    }
}

/// What contracts and taboo contracts have in common
pub trait ContractLike {
    fn key(&self) -> &str;
    fn tenant(&self) -> &str;
    fn subjects(&self) -> &[Subject];
    fn subjects_mut(&mut self) -> &mut Vec<Subject>;

    /// The subject named `name`, created at the end of the subject list if missing
    fn subject_mut(&mut self, name: &str) -> &mut Subject {
        let subjects = self.subjects_mut();
        let pos = match subjects.iter().position(|s| s.name == name) {
            Some(pos) => pos,
            None => {
                subjects.push(Subject::new(name));
                subjects.len() - 1
            }
        };
        &mut subjects[pos]
    }
    /// Number of filter references over all subjects
    fn filter_count(&self) -> usize {
        self.subjects().iter().map(|s| s.filters.len()).sum()
    }
}

macro_rules! contract_entity {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name {
            pub key: String,
            pub name: String,
            pub tenant: String,
            pub description: Option<String>,
            pub scope: Option<String>,
            pub subjects: Vec<Subject>,
            pub attrs: Attributes,
        }
        impl $name {
            #[must_use]
            pub fn new(tenant: &str, name: &str) -> Self {
                Self {
                    key: compose(tenant, name),
                    name: name.to_owned(),
                    tenant: tenant.to_owned(),
                    description: None,
                    scope: None,
                    subjects: vec![],
                    attrs: Attributes::new(),
                }
            }
        }
        impl ContractLike for $name {
            fn key(&self) -> &str {
                &self.key
            }
            fn tenant(&self) -> &str {
                &self.tenant
            }
            fn subjects(&self) -> &[Subject] {
                &self.subjects
            }
            fn subjects_mut(&mut self) -> &mut Vec<Subject> {
                &mut self.subjects
            }
        }
    };
}

contract_entity!(
    /// A contract: traffic its subjects' filters match is permitted between providers and consumers
    Contract
);
contract_entity!(
    /// A taboo contract: traffic its filters match is denied to the EPGs it protects,
    /// whatever contracts permit
    TabooContract
);

#[derive(Clone, Debug, PartialEq)]
/// A contract interface, exporting a contract to other tenants
pub struct ContractInterface {
    pub key: String,
    pub name: String,
    pub tenant: String,
    pub description: Option<String>,
    pub exported: Option<Ref<Contract>>,
}
impl ContractInterface {
    #[must_use]
    pub fn new(tenant: &str, name: &str) -> Self {
        Self {
            key: compose(tenant, name),
            name: name.to_owned(),
            tenant: tenant.to_owned(),
            description: None,
            exported: None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Contract, ContractLike, FilterAction, FilterRef, TabooContract};

    #[test]
    fn test_subjects_get_or_create() {
        let mut contract = Contract::new("T", "C");
        contract.subject_mut("s1").filters.push(FilterRef::new("http"));
        contract.subject_mut("s2").filters.push(FilterRef::new("https"));
        contract.subject_mut("s1").filters.push(FilterRef::new("dns"));
        assert_eq!(contract.subjects.len(), 2);
        assert_eq!(contract.filter_count(), 3);
        assert_eq!(contract.key(), "T:C");

        let taboo = TabooContract::new("T", "X");
        assert_eq!(taboo.filter_count(), 0);
    }

    #[test]
    fn test_filter_action() {
        assert_eq!(FilterAction::from_attr(Some("DENY")), FilterAction::Deny);
        assert_eq!(FilterAction::from_attr(Some("permit")), FilterAction::Permit);
        assert_eq!(FilterAction::from_attr(None), FilterAction::Permit);
    }
}
