// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Link-time registry of the tracing targets declared by every crate in the binary

use crate::LevelFilter;
use linkme::distributed_slice;

/// A tracing target, as declared by [`trace_target!`](crate::trace_target) or
/// [`custom_target!`](crate::custom_target)
pub struct STarget {
    pub(crate) target: &'static str,
    pub(crate) name: &'static str,
    pub(crate) level: LevelFilter,
    pub(crate) tags: &'static [&'static str],
    pub(crate) custom: bool,
}
impl STarget {
    #[must_use]
    pub const fn new(
        target: &'static str,
        name: &'static str,
        level: LevelFilter,
        tags: &'static [&'static str],
        custom: bool,
    ) -> Self {
        Self {
            target,
            name,
            level,
            tags,
            custom,
        }
    }
}

#[allow(unsafe_code)] // linkme places the slice in a dedicated link section
#[distributed_slice]
pub static TRACING_TARGETS: [STarget];

#[doc(hidden)]
#[macro_export]
macro_rules! trace_target_deps {
    () => {
        use linkme::distributed_slice;
        use $crate::LevelFilter;
        use $crate::targets::{STarget, TRACING_TARGETS};
    };
}

/// Declare the tracing target of the calling module with a name, a default level and tags.
///
/// The expansion lives in an anonymous const scope so that the macro may be used several
/// times in one crate without clashing statics.
#[macro_export]
macro_rules! trace_target {
    ($name:expr, $level:expr, $tags:expr) => {
        const _: () = {
            $crate::trace_target_deps!();

            #[allow(unsafe_code)]
            #[distributed_slice(TRACING_TARGETS)]
            static TRACE_TGT: STarget = STarget::new(module_path!(), $name, $level, $tags, false);
        };
    };
}

/// Declare a tracing target that is not a module path (e.g. a third-party crate)
#[macro_export]
macro_rules! custom_target {
    ($target:expr, $level:expr, $tags:expr) => {
        const _: () = {
            $crate::trace_target_deps!();

            #[allow(unsafe_code)]
            #[distributed_slice(TRACING_TARGETS)]
            static TRACE_TGT: STarget = STarget::new($target, $target, $level, $tags, true);
        };
    };
}
