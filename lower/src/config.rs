// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Lowering parameters

use derive_builder::Builder;

pub const DEFAULT_MGMT_INTERFACE: &str = "mgmt0";
pub const DEFAULT_LOOPBACK_INTERFACE: &str = "loopback0";
pub const DEFAULT_PEER_LINK_INTERFACE: &str = "port-channel1";
pub const DEFAULT_MTU: u16 = 9216;

/// Names and defaults used when synthesizing device interfaces. N.B we derive a builder
/// type `LowerConfigBuilder`; every field has a default.
#[derive(Builder, Clone, Debug, PartialEq)]
pub struct LowerConfig {
    #[builder(setter(into), default = DEFAULT_MGMT_INTERFACE.to_string())]
    pub mgmt_interface: String,

    #[builder(setter(into), default = DEFAULT_LOOPBACK_INTERFACE.to_string())]
    pub loopback_interface: String,

    #[builder(setter(into), default = DEFAULT_PEER_LINK_INTERFACE.to_string())]
    pub peer_link_interface: String,

    #[builder(default = DEFAULT_MTU)]
    pub mtu: u16,

    /// Hostname of the single device emitted for a graph without fabric nodes.
    /// The graph name is used when unset.
    #[builder(setter(into, strip_option), default)]
    pub synthetic_hostname: Option<String>,
}

impl Default for LowerConfig {
    fn default() -> Self {
        Self {
            mgmt_interface: DEFAULT_MGMT_INTERFACE.to_string(),
            loopback_interface: DEFAULT_LOOPBACK_INTERFACE.to_string(),
            peer_link_interface: DEFAULT_PEER_LINK_INTERFACE.to_string(),
            mtu: DEFAULT_MTU,
            synthetic_hostname: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // valid in tests
mod test {
    use super::{LowerConfig, LowerConfigBuilder};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder_defaults() {
        let built = LowerConfigBuilder::default().build().unwrap();
        assert_eq!(built, LowerConfig::default());
        assert_eq!(built.mgmt_interface, "mgmt0");
        assert_eq!(built.mtu, 9216);
        assert!(built.synthetic_hostname.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let config = LowerConfigBuilder::default()
            .mgmt_interface("oob0")
            .mtu(1500)
            .synthetic_hostname("fabric")
            .build()
            .unwrap();
        assert_eq!(config.mgmt_interface, "oob0");
        assert_eq!(config.loopback_interface, "loopback0");
        assert_eq!(config.mtu, 1500);
        assert_eq!(config.synthetic_hostname.as_deref(), Some("fabric"));
    }
}
