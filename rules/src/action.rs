// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Rule actions: mutations of the staged configuration

use cgm::Catalog;
use registry::{Fields, RegistrationPoint, RegistryError, StagedView};
use std::fmt::Display;
use tracing::debug;

use crate::errors::{RuleError, RuleResult};
use crate::expr::{EvalContext, Expr};
use crate::scope::Target;

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Append an entry at the end of the target
    Append {
        target: Target,
        fields: Vec<(String, Expr)>,
    },
    /// Remove every entry of the target
    Clear { target: Target },
    /// Update fields of the n-th entry of the target
    Assign {
        target: Target,
        index: usize,
        fields: Vec<(String, Expr)>,
    },
    /// Remove the entries of the target whose fields match
    Remove { target: Target, filter: Fields },
}

fn eval_fields(fields: &[(String, Expr)], ctx: &EvalContext<'_, '_>) -> RuleResult<Fields> {
    fields
        .iter()
        .map(|(name, expr)| Ok((name.clone(), expr.eval(ctx)?)))
        .collect()
}

impl Action {
    /// Check that the target is registered and that the field values are well typed
    pub(crate) fn check(&self, point: &RegistrationPoint) -> RuleResult<()> {
        match self {
            Action::Append { target, fields }
            | Action::Assign { target, fields, .. } => {
                target.check(point)?;
                for (_, expr) in fields {
                    expr.kind(point)?;
                }
            }
            Action::Clear { target } | Action::Remove { target, .. } => target.check(point)?,
        }
        Ok(())
    }

    pub(crate) fn execute(&self, view: &mut StagedView<'_>, catalog: &Catalog) -> RuleResult<()> {
        debug!("Executing {self}");
        match self {
            Action::Append { target, fields } => {
                let fields = eval_fields(fields, &EvalContext {
                    view: &*view,
                    catalog,
                })?;
                view.append(target.path(), target.variant.as_deref(), fields)?;
            }
            Action::Clear { target } => match &target.variant {
                Some(variant) => {
                    target.check(view.point())?;
                    view.remove(target.path(), Some(variant.as_str()), &Fields::new())?;
                }
                None => {
                    view.clear(target.path())?;
                }
            },
            Action::Assign {
                target,
                index,
                fields,
            } => {
                target.check(view.point())?;
                // the index counts the entries of the target only
                let positions: Vec<usize> = view
                    .current()
                    .get(target.path())
                    .iter()
                    .enumerate()
                    .filter(|(_, item)| target.variant.as_ref().is_none_or(|v| &item.variant == v))
                    .map(|(n, _)| n)
                    .collect();
                let Some(position) = positions.get(*index).copied() else {
                    return Err(RuleError::IndexOutOfRange {
                        path: target.path().to_owned(),
                        index: *index,
                        len: positions.len(),
                    });
                };
                let fields = eval_fields(fields, &EvalContext {
                    view: &*view,
                    catalog,
                })?;
                view.assign(target.path(), position, fields)
                    .map_err(|e| match e {
                        RegistryError::NoSuchEntry { path, index, len } => {
                            RuleError::IndexOutOfRange { path, index, len }
                        }
                        other => other.into(),
                    })?;
            }
            Action::Remove { target, filter } => {
                target.check(view.point())?;
                view.remove(target.path(), target.variant.as_deref(), filter)?;
            }
        }
        Ok(())
    }
}

fn fields_fmt(f: &mut std::fmt::Formatter<'_>, fields: &[(String, Expr)]) -> std::fmt::Result {
    for (name, expr) in fields {
        write!(f, ", {name}={expr}")?;
    }
    Ok(())
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Append { target, fields } => {
                write!(f, "append({target}")?;
                fields_fmt(f, fields)?;
                write!(f, ")")
            }
            Action::Clear { target } => write!(f, "clear_config({target})"),
            Action::Assign {
                target,
                index,
                fields,
            } => {
                write!(f, "assign({target}, {index}")?;
                fields_fmt(f, fields)?;
                write!(f, ")")
            }
            Action::Remove { target, filter } => {
                write!(f, "remove({target}")?;
                for (name, value) in filter {
                    write!(f, ", {name}={value}")?;
                }
                write!(f, ")")
            }
        }
    }
}
