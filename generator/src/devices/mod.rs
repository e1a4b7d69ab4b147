// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Built-in router descriptors

mod mikrotik;
mod tplink;
mod ubnt;

use cgm::{Catalog, CgmResult, RouterDescriptor};
use tracing::debug;

use crate::openwrt::OPENWRT;

/// The built-in routers, in registration order
pub fn routers() -> CgmResult<Vec<RouterDescriptor>> {
    let mut routers = tplink::routers()?;
    routers.extend(ubnt::routers()?);
    routers.extend(mikrotik::routers()?);
    Ok(routers)
}

pub(crate) fn register(catalog: &mut Catalog) -> CgmResult<()> {
    for router in routers()? {
        debug!("Registering router {}", router.identifier);
        catalog.register_router(OPENWRT, router)?;
    }
    tplink::register_modules(catalog)
}
