// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Undirected links between devices

use serde::Serialize;

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
/// An undirected link between two devices, identified by hostname.
/// Endpoints are stored in lexicographic order so that `Link::new(a, b) == Link::new(b, a)`.
pub struct Link {
    node_a: String,
    node_b: String,
}

impl Link {
    #[must_use]
    pub fn new(node_a: &str, node_b: &str) -> Self {
        let (a, b) = if node_a <= node_b {
            (node_a, node_b)
        } else {
            (node_b, node_a)
        };
        Self {
            node_a: a.to_owned(),
            node_b: b.to_owned(),
        }
    }
    #[must_use]
    pub fn node_a(&self) -> &str {
        &self.node_a
    }
    #[must_use]
    pub fn node_b(&self) -> &str {
        &self.node_b
    }
    #[must_use]
    pub fn connects(&self, node: &str) -> bool {
        self.node_a == node || self.node_b == node
    }
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.node_a == self.node_b
    }
}

#[cfg(test)]
mod test {
    use super::Link;

    #[test]
    fn test_link_is_undirected() {
        assert_eq!(Link::new("spine1", "leaf1"), Link::new("leaf1", "spine1"));
        let link = Link::new("spine1", "leaf1");
        assert_eq!(link.node_a(), "leaf1");
        assert!(link.connects("spine1"));
        assert!(!link.connects("leaf2"));
        assert!(!link.is_self_loop());
    }
}
