// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The attribute bag carried by every policy node

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
/// Key/value attributes of a policy node. Every key is retained, including the ones
/// no handler understands. Scalars that are not strings are kept in their JSON text form.
pub struct Attributes(BTreeMap<String, String>);

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn from_json(map: &Map<String, Value>) -> Self {
        let attrs = map
            .iter()
            .filter_map(|(key, value)| {
                let value = match value {
                    Value::Null => return None,
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Some((key.clone(), value))
            })
            .collect();
        Self(attrs)
    }
    #[must_use]
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.insert(key, value);
        self
    }
    pub fn insert(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_owned(), value.to_owned());
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    /// Raw value of `key`, possibly empty
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
    /// Value of `key`, trimmed, if present and not blank
    #[must_use]
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }
    /// The first of `keys` that has a non-blank value
    #[must_use]
    pub fn first_non_empty(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|k| self.non_empty(k))
    }
    /// True if `key` holds `yes` or `true` (any case)
    #[must_use]
    pub fn is_yes(&self, key: &str) -> bool {
        self.non_empty(key)
            .is_some_and(|v| v.eq_ignore_ascii_case("yes") || v.eq_ignore_ascii_case("true"))
    }
    #[must_use]
    pub fn owned(&self, key: &str) -> Option<String> {
        self.non_empty(key).map(str::to_owned)
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.non_empty("name")
    }
    #[must_use]
    pub fn descr(&self) -> Option<&str> {
        self.non_empty("descr")
    }
    #[must_use]
    pub fn dn(&self) -> Option<&str> {
        self.non_empty("dn")
    }
    #[must_use]
    pub fn name_alias(&self) -> Option<&str> {
        self.non_empty("nameAlias")
    }
    #[must_use]
    pub fn owner_key(&self) -> Option<&str> {
        self.non_empty("ownerKey")
    }
    #[must_use]
    pub fn owner_tag(&self) -> Option<&str> {
        self.non_empty("ownerTag")
    }
    #[must_use]
    pub fn annotation(&self) -> Option<&str> {
        self.non_empty("annotation")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // valid in tests
mod test {
    use super::Attributes;
    use serde_json::json;

    #[test]
    fn test_unknown_keys_preserved() {
        let value = json!({
            "name": "web",
            "descr": "",
            "ownerKey": "k",
            "ownerTag": " ",
            "futureKnob": "enabled",
            "mtu": 9000,
            "isAttrBasedEPg": false,
            "ignored": null
        });
        let attrs = Attributes::from_json(value.as_object().unwrap());
        assert_eq!(attrs.name(), Some("web"));
        assert_eq!(attrs.descr(), None);
        assert_eq!(attrs.get("descr"), Some(""));
        assert_eq!(attrs.owner_key(), Some("k"));
        assert_eq!(attrs.owner_tag(), None);
        assert_eq!(attrs.get("futureKnob"), Some("enabled"));
        assert_eq!(attrs.get("mtu"), Some("9000"));
        assert_eq!(attrs.get("isAttrBasedEPg"), Some("false"));
        assert_eq!(attrs.get("ignored"), None);
        assert_eq!(attrs.len(), 7);
    }

    #[test]
    fn test_first_non_empty() {
        let attrs = Attributes::new().with("nodeId", "").with("id", "101");
        assert_eq!(attrs.first_non_empty(&["nodeId", "id"]), Some("101"));
        assert_eq!(attrs.first_non_empty(&["name"]), None);
        assert!(Attributes::new().with("stateful", "YES").is_yes("stateful"));
        assert!(!Attributes::new().with("stateful", "no").is_yes("stateful"));
    }
}
