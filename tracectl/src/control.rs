// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Runtime control of tracing levels.

use ordermap::OrderMap;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use thiserror::Error;
#[allow(unused)]
use tracing::{debug, error, info, warn};
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::{EnvFilter, Registry, prelude::*, reload};

use crate::display::TargetCfgDbByTag;
use crate::targets::TRACING_TARGETS;
use crate::{DEFAULT_LOGLEVEL, trace_target};

trace_target!("tracectl", LevelFilter::INFO, &[]);

#[derive(Debug, Error, PartialEq)]
pub enum TraceCtlError {
    #[error("Invalid tracing config item '{0}': expected tag=level")]
    Syntax(String),
    #[error("Invalid log level '{0}'")]
    BadLevel(String),
    #[error("Unknown tracing tag '{0}'")]
    UnknownTag(String),
}

#[derive(Debug, Clone)]
pub struct TargetCfg {
    pub(crate) target: &'static str,
    pub(crate) name: &'static str,
    pub(crate) level: LevelFilter,
    pub(crate) tags: Vec<&'static str>,
    pub(crate) custom: bool,
}
impl TargetCfg {
    fn new(
        target: &'static str,
        name: &'static str,
        level: LevelFilter,
        tags: &'static [&'static str],
        custom: bool,
    ) -> Self {
        // a target can always be addressed by its own name
        let mut tags = tags.to_vec();
        if !tags.contains(&name) {
            tags.push(name);
        }
        Self {
            target,
            name,
            level,
            tags,
            custom,
        }
    }
    #[must_use]
    pub fn target(&self) -> &'static str {
        self.target
    }
    #[must_use]
    pub fn level(&self) -> LevelFilter {
        self.level
    }
    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.custom
    }
}

#[derive(Debug, Clone)]
pub struct Tag {
    pub(crate) tag: &'static str,
    pub(crate) targets: HashSet<&'static str>,
}

#[derive(Debug)]
pub(crate) struct TargetCfgDb {
    pub(crate) level: LevelFilter,
    pub(crate) targets: OrderMap<&'static str, TargetCfg>,
    pub(crate) tags: OrderMap<&'static str, Tag>,
}
impl TargetCfgDb {
    fn new(level: LevelFilter) -> Self {
        let mut db = Self {
            level,
            targets: OrderMap::new(),
            tags: OrderMap::new(),
        };
        for t in TRACING_TARGETS {
            db.register(t.target, t.name, t.level, t.tags, t.custom);
        }
        db
    }
    fn register(
        &mut self,
        target: &'static str,
        name: &'static str,
        level: LevelFilter,
        tags: &'static [&'static str],
        custom: bool,
    ) {
        let tcfg = TargetCfg::new(target, name, level, tags, custom);
        for tag in tcfg.tags.iter().copied() {
            self.tags
                .entry(tag)
                .or_insert_with(|| Tag {
                    tag,
                    targets: HashSet::new(),
                })
                .targets
                .insert(target);
        }
        if let Some(prior) = self.targets.insert(target, tcfg) {
            warn!("Tracing target {} was declared more than once", prior.target);
        }
    }
    fn env_filter(&self) -> EnvFilter {
        self.targets
            .values()
            .filter_map(|t| format!("{}={}", t.target, t.level).parse::<Directive>().ok())
            .fold(EnvFilter::new(self.level.to_string()), |f, directive| {
                f.add_directive(directive)
            })
    }
    fn targets_with_tag(&self, tag: &str) -> Vec<&'static str> {
        self.tags
            .get(tag)
            .map(|t| t.targets.iter().copied().collect())
            .unwrap_or_default()
    }
    fn as_config_string(&self) -> String {
        let mut out = format!("default={}", self.level);
        for target in self.targets.values() {
            out += &format!(",{}={}", target.name, target.level);
        }
        out
    }
}

/// Process-wide tracing control. Obtain it with [`get_trace_ctl`].
#[derive(Debug)]
pub struct TracingControl {
    db: Mutex<TargetCfgDb>,
    reload_filter: reload::Handle<EnvFilter, Registry>,
}

static TRACING_CTL: OnceLock<TracingControl> = OnceLock::new();

/// Get the process-wide [`TracingControl`], installing the subscriber on first use
pub fn get_trace_ctl() -> &'static TracingControl {
    TRACING_CTL.get_or_init(TracingControl::new)
}

impl TracingControl {
    fn new() -> Self {
        let db = TargetCfgDb::new(DEFAULT_LOGLEVEL);
        let (filter, reload_filter) = reload::Layer::new(db.env_filter());
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_line_number(true)
            .with_target(true)
            .with_thread_names(true)
            .with_level(true);

        // a subscriber may already be installed (e.g. by tracing-test); levels are then
        // tracked here but have no effect on the output
        if tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .is_err()
        {
            debug!("A global tracing subscriber was already installed");
        }
        Self {
            db: Mutex::new(db),
            reload_filter,
        }
    }
    fn lock(&self) -> MutexGuard<'_, TargetCfgDb> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }
    fn reload(&self, db: &TargetCfgDb) {
        if let Err(e) = self.reload_filter.reload(db.env_filter()) {
            error!("Failed to reload tracing filter: {e}");
        }
    }
    pub fn init() {
        get_trace_ctl();
    }
    pub fn set_default_level(&self, level: LevelFilter) {
        let mut db = self.lock();
        if db.level != level {
            db.level = level;
            self.reload(&db);
            info!("Default log level set to {level}");
        }
    }
    #[must_use]
    pub fn get_default_level(&self) -> LevelFilter {
        self.lock().level
    }
    pub fn set_level_all(&self, level: LevelFilter) {
        let mut db = self.lock();
        db.targets.values_mut().for_each(|t| t.level = level);
        self.reload(&db);
    }
    /// Set the level of all the targets having the given tag. Returns how many changed.
    pub fn set_tag_level(&self, tag: &str, level: LevelFilter) -> usize {
        let mut db = self.lock();
        let mut changed = 0;
        for target in db.targets_with_tag(tag) {
            if let Some(t) = db.targets.get_mut(target)
                && t.level != level
            {
                t.level = level;
                changed += 1;
            }
        }
        if changed > 0 {
            self.reload(&db);
        }
        debug!("Log level for tag '{tag}' set to {level} ({changed} targets changed)");
        changed
    }
    /// Fail if any of the given tags is unknown
    pub fn check_tags(&self, tags: &[&str]) -> Result<(), TraceCtlError> {
        let db = self.lock();
        match tags
            .iter()
            .find(|tag| !matches!(**tag, "default" | "all") && !db.tags.contains_key(**tag))
        {
            Some(unknown) => Err(TraceCtlError::UnknownTag((*unknown).to_string())),
            None => Ok(()),
        }
    }

    /// Parse a comma-separated sequence of tag=level
    pub fn parse_tracing_config(input: &str) -> Result<OrderMap<String, LevelFilter>, TraceCtlError> {
        let mut result = OrderMap::new();
        for item in input.split(',').map(str::trim).filter(|i| !i.is_empty()) {
            let Some((tag, level)) = item.split_once('=') else {
                return Err(TraceCtlError::Syntax(item.to_string()));
            };
            let level = LevelFilter::from_str(level.trim())
                .map_err(|_| TraceCtlError::BadLevel(level.trim().to_string()))?;
            result.insert(tag.trim().to_string(), level);
        }
        Ok(result)
    }

    /// Apply a tracing config string. `default=level` sets the default level and
    /// `all=level` sets every target; any other entry applies to a tag and may override `all`.
    pub fn setup_from_string(&self, input: &str) -> Result<(), TraceCtlError> {
        let config = Self::parse_tracing_config(input)?;
        if let Some(level) = config.get("default") {
            self.set_default_level(*level);
        }
        if let Some(level) = config.get("all") {
            self.set_level_all(*level);
        }
        for (tag, level) in config.iter().filter(|(t, _)| !matches!(t.as_str(), "default" | "all")) {
            self.set_tag_level(tag, *level);
        }
        Ok(())
    }

    #[must_use]
    pub fn get_target(&self, target: &str) -> Option<TargetCfg> {
        self.lock().targets.get(target).cloned()
    }
    #[must_use]
    pub fn get_targets_by_tag(&self, tag: &str) -> Vec<TargetCfg> {
        let db = self.lock();
        db.targets_with_tag(tag)
            .into_iter()
            .filter_map(|t| db.targets.get(t).cloned())
            .collect()
    }
    #[must_use]
    pub fn as_config_string(&self) -> String {
        self.lock().as_config_string()
    }
    pub fn dump(&self) {
        let db = self.lock();
        info!("{db}");
    }
    pub fn dump_targets_by_tag(&self) {
        let db = self.lock();
        info!("{}", TargetCfgDbByTag(&db));
    }
    #[cfg(test)]
    fn register(
        &self,
        target: &'static str,
        level: LevelFilter,
        tags: &'static [&'static str],
    ) {
        let mut db = self.lock();
        db.register(target, target, level, tags, true);
        self.reload(&db);
    }
}
