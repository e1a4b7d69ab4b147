// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Rules: a condition and the steps run when it holds

use cgm::Catalog;
use ordermap::OrderMap;
use registry::{RegistrationPoint, StagedView};
use tracing::debug;

use crate::action::Action;
use crate::errors::RuleResult;
use crate::expr::{EvalContext, Expr};

/// What a rule does when its condition holds: run an action or evaluate a nested rule
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Action(Action),
    Rule(Rule),
}
impl From<Action> for Step {
    fn from(value: Action) -> Self {
        Step::Action(value)
    }
}
impl From<Rule> for Step {
    fn from(value: Rule) -> Self {
        Step::Rule(value)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub condition: Expr,
    pub steps: Vec<Step>,
}

/// Build a rule
pub fn rule(condition: Expr, steps: impl IntoIterator<Item = Step>) -> Rule {
    Rule {
        condition,
        steps: steps.into_iter().collect(),
    }
}

impl Rule {
    /// Type-check the condition, the actions and the nested rules, whether they would
    /// be evaluated or not
    pub(crate) fn check(&self, point: &RegistrationPoint) -> RuleResult<()> {
        self.condition.check_bool(point)?;
        for step in &self.steps {
            match step {
                Step::Action(action) => action.check(point)?,
                Step::Rule(rule) => rule.check(point)?,
            }
        }
        Ok(())
    }

    /// Evaluate the rule against the staged view. The value of the condition is recorded
    /// under `mark`; nested rules are marked `<mark>.rule<n>`.
    pub(crate) fn evaluate(
        &self,
        mark: &str,
        view: &mut StagedView<'_>,
        catalog: &Catalog,
        marks: &mut OrderMap<String, bool>,
    ) -> RuleResult<()> {
        let holds = self.condition.holds(&EvalContext {
            view: &*view,
            catalog,
        })?;
        debug!("{mark}: {} is {holds}", self.condition);
        marks.insert(mark.to_owned(), holds);
        if !holds {
            return Ok(());
        }
        let mut nested = 0;
        for step in &self.steps {
            match step {
                Step::Action(action) => action.execute(view, catalog)?,
                Step::Rule(rule) => {
                    rule.evaluate(&format!("{mark}.rule{nested}"), view, catalog, marks)?;
                    nested += 1;
                }
            }
        }
        Ok(())
    }
}
