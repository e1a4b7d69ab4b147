// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Display implementations

use crate::control::{TargetCfg, TargetCfgDb};
use std::fmt::{Display, Formatter, Result};

macro_rules! TARGET_FMT {
    () => {
        "{:>40} │ {:>8} │ {}"
    };
}

impl Display for TargetCfg {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            TARGET_FMT!(),
            self.target,
            self.level,
            self.tags.join(",")
        )
    }
}

impl Display for TargetCfgDb {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f)?;
        writeln!(f, "{:>56}", "──── Tracing targets ────")?;
        writeln!(f, TARGET_FMT!(), "TARGET", "LEVEL", "TAGS")?;
        for target in self.targets.values() {
            writeln!(f, "{target}")?;
        }
        write!(f, TARGET_FMT!(), "(default)", self.level, "--")
    }
}

pub(crate) struct TargetCfgDbByTag<'a>(pub(crate) &'a TargetCfgDb);
impl Display for TargetCfgDbByTag<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let db = self.0;
        writeln!(f)?;
        writeln!(f, "{:>56}", "──── Tracing targets by tag ────")?;
        for tag in db.tags.values() {
            writeln!(f, " {}:", tag.tag)?;
            for target in db
                .targets
                .values()
                .filter(|t| tag.targets.contains(t.target))
            {
                writeln!(f, "      {:<40} : {}", target.target, target.level)?;
            }
        }
        Ok(())
    }
}
