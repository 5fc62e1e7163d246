// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Composite keys: `tenant`, `tenant:resource` or `tenant:parent:resource`

pub const KEY_SEPARATOR: char = ':';

/// Tenant whose objects are visible from every other tenant
pub const COMMON_TENANT: &str = "common";

/// Key of `local` under the parent key `parent`
#[must_use]
pub fn compose(parent: &str, local: &str) -> String {
    format!("{parent}{KEY_SEPARATOR}{local}")
}

/// True if `name` already carries a tenant qualifier
#[must_use]
pub fn is_qualified(name: &str) -> bool {
    name.contains(KEY_SEPARATOR)
}

/// Qualify a reference `name` with `tenant` unless it is already qualified
#[must_use]
pub fn qualify(tenant: &str, name: &str) -> String {
    if is_qualified(name) {
        name.to_owned()
    } else {
        compose(tenant, name)
    }
}

/// The last component of a composite key
#[must_use]
pub fn local_name(key: &str) -> &str {
    key.rsplit(KEY_SEPARATOR).next().unwrap_or(key)
}

/// The first component (the tenant) of a composite key
#[must_use]
pub fn tenant_of(key: &str) -> &str {
    key.split(KEY_SEPARATOR).next().unwrap_or(key)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_compose_and_split() {
        assert_eq!(compose("T", "BD"), "T:BD");
        assert_eq!(compose(&compose("T", "A"), "E"), "T:A:E");
        assert_eq!(local_name("T:A:E"), "E");
        assert_eq!(tenant_of("T:A:E"), "T");
        assert_eq!(local_name("T"), "T");
        assert_eq!(qualify("T", "C"), "T:C");
        assert_eq!(qualify("T", "common:C"), "common:C");
    }

    #[test]
    fn test_compose_property() {
        bolero::check!()
            .with_type()
            .cloned()
            .for_each(|(parent, local): (String, String)| {
                let key = compose(&parent, &local);
                assert_eq!(key, format!("{parent}:{local}"));
                assert!(key.starts_with(&parent));
                if !local.contains(KEY_SEPARATOR) {
                    assert_eq!(local_name(&key), local);
                }
                // composition is deterministic
                assert_eq!(key, compose(&parent, &local));
            });
    }
}
