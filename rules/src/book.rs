// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Rule sets, registered per configuration profile

use ordermap::OrderMap;
use tracing::debug;

use crate::errors::{RuleError, RuleResult};
use crate::rule::Rule;
use crate::scope::Scope;

/// A function defining a set of rules with the given scope
pub type RuleSetFn = fn(Scope) -> Vec<Rule>;

#[derive(Debug, Default)]
pub struct RuleBook {
    profiles: OrderMap<String, Vec<RuleSetFn>>,
}

impl RuleBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Add a rule set to a profile. The rule sets of a profile are evaluated in the
    /// order they were added.
    pub fn register(&mut self, profile: &str, rules: RuleSetFn) {
        debug!("Adding rule set to profile '{profile}'");
        self.profiles.entry(profile.to_owned()).or_default().push(rules);
    }
    pub fn profiles(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
    /// Build the rules of a profile
    pub fn rules(&self, profile: &str, scope: &Scope) -> RuleResult<Vec<Rule>> {
        let sets = self
            .profiles
            .get(profile)
            .ok_or_else(|| RuleError::UnknownProfile(profile.to_owned()))?;
        Ok(sets.iter().flat_map(|set| set(scope.clone())).collect())
    }
}
