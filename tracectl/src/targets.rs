// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Link-time registry of tracing targets

use crate::LevelFilter;
use linkme::distributed_slice;

/// A tracing target as declared by [`trace_target!`](crate::trace_target)
#[derive(Debug)]
pub struct TargetDecl {
    pub(crate) module: &'static str,
    pub(crate) name: &'static str,
    pub(crate) level: LevelFilter,
    pub(crate) tags: &'static [&'static str],
}
impl TargetDecl {
    #[must_use]
    pub const fn new(
        module: &'static str,
        name: &'static str,
        level: LevelFilter,
        tags: &'static [&'static str],
    ) -> Self {
        Self {
            module,
            name,
            level,
            tags,
        }
    }
}

#[allow(unsafe_code)] // linkme emits link_section statics
#[distributed_slice]
pub static TARGET_DECLS: [TargetDecl];

#[macro_export]
/// Declare the tracing target of the calling module, with a name, a default level and tags.
/// The target name can always be used as a tag.
macro_rules! trace_target {
    ($name:expr, $level:expr, $tags:expr) => {
        const _: () = {
            use $crate::linkme_reexport::distributed_slice;
            use $crate::targets::{TARGET_DECLS, TargetDecl};

            #[allow(unsafe_code)]
            #[distributed_slice(TARGET_DECLS)]
            #[linkme(crate = $crate::linkme_reexport)]
            static TARGET: TargetDecl = TargetDecl::new(module_path!(), $name, $level, $tags);
        };
    };
}
