// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Predicate expressions over a node's staged configuration.
//!
//! Expressions are typed with the kinds declared by the registry schemas: comparing
//! a string field with an integer is an invalid predicate, detected before anything
//! is evaluated.

use cgm::{Catalog, CgmError, RouterDescriptor};
use registry::{Location, RegistrationPoint, StagedView, Value, ValueKind};
use std::fmt::Display;

use crate::errors::{RuleError, RuleResult};
use crate::scope::Target;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}
impl CmpOp {
    fn is_ordering(self) -> bool {
        !matches!(self, CmpOp::Eq | CmpOp::Ne)
    }
}
impl Display for CmpOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        };
        write!(f, "{op}")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Value),
    /// the value of a field of the single entry of a target
    Field(Target),
    /// the number of entries of a target
    Count(Target),
    /// whether a target differs from its stored content
    Changed(Target),
    /// whether any entry of a target has a field set to a value
    Contains(Target, Value),
    /// an attribute of the node's router descriptor
    Router(String),
    Compare(Box<Expr>, CmpOp, Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
}

/// A literal expression
pub fn literal(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Literal(value)
    }
}
impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        literal(value)
    }
}
impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        literal(value)
    }
}
impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        literal(value)
    }
}
impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        literal(value)
    }
}

fn router_attribute_kind(attribute: &str) -> Option<ValueKind> {
    match attribute {
        "identifier" | "name" | "manufacturer" | "url" | "architecture" => Some(ValueKind::Str),
        "radios" | "ports" | "antennas" => Some(ValueKind::Int),
        other => {
            let radio = other.strip_prefix("radio.")?;
            let index = radio.strip_suffix(".protocol").unwrap_or(radio);
            index.parse::<usize>().ok().map(|_| ValueKind::Str)
        }
    }
}

/// What expressions are evaluated against
pub(crate) struct EvalContext<'a, 'p> {
    pub(crate) view: &'a StagedView<'p>,
    pub(crate) catalog: &'a Catalog,
}

impl<'a> EvalContext<'a, '_> {
    // the router of the node, as currently staged
    fn router(&self) -> RuleResult<Option<&'a RouterDescriptor>> {
        let platform = self.view.value(&Location::field("core.general", "platform"))?;
        let router = self.view.value(&Location::field("core.general", "router"))?;
        let (Some(platform), Some(router)) = (platform.as_str(), router.as_str()) else {
            return Ok(None);
        };
        match self.catalog.lookup_router(platform, router) {
            Ok(descriptor) => Ok(Some(descriptor)),
            Err(CgmError::UnknownDevice { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl Expr {
    fn compare(self, op: CmpOp, other: impl Into<Expr>) -> Expr {
        Expr::Compare(Box::new(self), op, Box::new(other.into()))
    }
    #[must_use]
    pub fn equals(self, other: impl Into<Expr>) -> Expr {
        self.compare(CmpOp::Eq, other)
    }
    #[must_use]
    pub fn not_equals(self, other: impl Into<Expr>) -> Expr {
        self.compare(CmpOp::Ne, other)
    }
    #[must_use]
    pub fn less_than(self, other: impl Into<Expr>) -> Expr {
        self.compare(CmpOp::Lt, other)
    }
    #[must_use]
    pub fn at_most(self, other: impl Into<Expr>) -> Expr {
        self.compare(CmpOp::Le, other)
    }
    #[must_use]
    pub fn greater_than(self, other: impl Into<Expr>) -> Expr {
        self.compare(CmpOp::Gt, other)
    }
    #[must_use]
    pub fn at_least(self, other: impl Into<Expr>) -> Expr {
        self.compare(CmpOp::Ge, other)
    }
    #[must_use]
    pub fn and(self, other: Expr) -> Expr {
        match self {
            Expr::And(mut operands) => {
                operands.push(other);
                Expr::And(operands)
            }
            this => Expr::And(vec![this, other]),
        }
    }
    #[must_use]
    pub fn or(self, other: Expr) -> Expr {
        match self {
            Expr::Or(mut operands) => {
                operands.push(other);
                Expr::Or(operands)
            }
            this => Expr::Or(vec![this, other]),
        }
    }

    fn invalid(&self, reason: &str) -> RuleError {
        RuleError::InvalidPredicate(format!("{reason} in '{self}'"))
    }

    /// Type-check a condition: it must be a well-typed boolean expression
    pub(crate) fn check_bool(&self, point: &RegistrationPoint) -> RuleResult<()> {
        match self.kind(point)? {
            Some(ValueKind::Bool) => Ok(()),
            Some(kind) => Err(self.invalid(&format!("expected a boolean, got {kind}"))),
            None => Err(self.invalid("expected a boolean, got null")),
        }
    }

    /// The kind of the value of the expression. `None` for the null literal, which
    /// compares with anything.
    pub(crate) fn kind(&self, point: &RegistrationPoint) -> RuleResult<Option<ValueKind>> {
        let kind = match self {
            Expr::Literal(value) => value.kind(),
            Expr::Field(target) => Some(target.field_kind(point)?),
            Expr::Count(target) => {
                target.check(point)?;
                Some(ValueKind::Int)
            }
            Expr::Changed(target) => {
                target.check(point)?;
                Some(ValueKind::Bool)
            }
            Expr::Contains(target, value) => {
                let declared = target.field_kind(point)?;
                if let Some(found) = value.kind()
                    && found != declared
                {
                    return Err(self.invalid(&format!("{target} holds {declared} values, not {found}")));
                }
                Some(ValueKind::Bool)
            }
            Expr::Router(attribute) => match router_attribute_kind(attribute) {
                Some(kind) => Some(kind),
                None => return Err(self.invalid(&format!("unknown router attribute '{attribute}'"))),
            },
            Expr::Compare(lhs, op, rhs) => {
                let (left, right) = (lhs.kind(point)?, rhs.kind(point)?);
                if let (Some(l), Some(r)) = (left, right)
                    && l != r
                {
                    return Err(self.invalid(&format!("cannot compare {l} with {r}")));
                }
                if op.is_ordering()
                    && let Some(kind) = left.or(right)
                    && kind != ValueKind::Int
                {
                    return Err(self.invalid(&format!("{kind} values are not ordered")));
                }
                Some(ValueKind::Bool)
            }
            Expr::And(operands) | Expr::Or(operands) => {
                for operand in operands {
                    operand.check_bool(point)?;
                }
                Some(ValueKind::Bool)
            }
            Expr::Not(operand) => {
                operand.check_bool(point)?;
                Some(ValueKind::Bool)
            }
        };
        Ok(kind)
    }

    fn truth(&self, ctx: &EvalContext<'_, '_>) -> RuleResult<bool> {
        Ok(self.eval(ctx)? == Value::Bool(true))
    }

    /// Evaluate the expression. It should have been type-checked with [`Expr::kind`].
    pub(crate) fn eval(&self, ctx: &EvalContext<'_, '_>) -> RuleResult<Value> {
        let value = match self {
            Expr::Literal(value) => value.clone(),
            Expr::Field(target) => target.value(ctx.view)?,
            Expr::Count(target) => {
                Value::Int(i64::try_from(target.count(ctx.view)?).unwrap_or(i64::MAX))
            }
            Expr::Changed(target) => Value::Bool(target.changed(ctx.view)?),
            Expr::Contains(target, value) => Value::Bool(target.values(ctx.view)?.contains(value)),
            Expr::Router(attribute) => ctx
                .router()?
                .and_then(|router| router.attribute(attribute))
                .unwrap_or(Value::Null),
            Expr::Compare(lhs, op, rhs) => {
                let (left, right) = (lhs.eval(ctx)?, rhs.eval(ctx)?);
                let result = match op {
                    CmpOp::Eq => left == right,
                    CmpOp::Ne => left != right,
                    ordering => match (left.as_int(), right.as_int()) {
                        (Some(l), Some(r)) => match ordering {
                            CmpOp::Lt => l < r,
                            CmpOp::Le => l <= r,
                            CmpOp::Gt => l > r,
                            _ => l >= r,
                        },
                        // null is not ordered
                        _ => false,
                    },
                };
                Value::Bool(result)
            }
            Expr::And(operands) => {
                for operand in operands {
                    if !operand.truth(ctx)? {
                        return Ok(Value::Bool(false));
                    }
                }
                Value::Bool(true)
            }
            Expr::Or(operands) => {
                for operand in operands {
                    if operand.truth(ctx)? {
                        return Ok(Value::Bool(true));
                    }
                }
                Value::Bool(false)
            }
            Expr::Not(operand) => Value::Bool(!operand.truth(ctx)?),
        };
        Ok(value)
    }

    /// Type-check and evaluate a condition
    pub(crate) fn holds(&self, ctx: &EvalContext<'_, '_>) -> RuleResult<bool> {
        self.check_bool(ctx.view.point())?;
        self.truth(ctx)
    }
}

impl std::ops::Not for Expr {
    type Output = Expr;
    fn not(self) -> Self::Output {
        Expr::Not(Box::new(self))
    }
}

fn join(f: &mut std::fmt::Formatter<'_>, operands: &[Expr], op: &str) -> std::fmt::Result {
    write!(f, "(")?;
    for (n, operand) in operands.iter().enumerate() {
        if n > 0 {
            write!(f, " {op} ")?;
        }
        write!(f, "{operand}")?;
    }
    write!(f, ")")
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Literal(Value::Str(s)) => write!(f, "\"{s}\""),
            Expr::Literal(value) => write!(f, "{value}"),
            Expr::Field(target) => write!(f, "value({target})"),
            Expr::Count(target) => write!(f, "count({target})"),
            Expr::Changed(target) => write!(f, "changed({target})"),
            Expr::Contains(target, value) => write!(f, "contains({target}, {value})"),
            Expr::Router(attribute) => write!(f, "router({attribute})"),
            Expr::Compare(lhs, op, rhs) => write!(f, "{lhs} {op} {rhs}"),
            Expr::And(operands) => join(f, operands, "and"),
            Expr::Or(operands) => join(f, operands, "or"),
            Expr::Not(operand) => write!(f, "not {operand}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{EvalContext, literal};
    use crate::errors::RuleError;
    use crate::scope::Scope;
    use cgm::devices::Port;
    use cgm::{Catalog, RouterDescriptorBuilder};
    use registry::{ItemSchema, RegistryItem, RegistryMeta, Snapshot, StagedView, ValueKind};

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .register_item(
                "node.config",
                ItemSchema::new("core.general", RegistryMeta::new("General", 0)).variant(
                    "GeneralConfig",
                    &[
                        ("name", ValueKind::Str),
                        ("platform", ValueKind::Str),
                        ("router", ValueKind::Str),
                    ],
                ),
            )
            .unwrap();
        catalog
            .register_item(
                "node.config",
                ItemSchema::new("core.vpn.server", RegistryMeta::new("VPN", 30).multiple())
                    .variant(
                        "VpnServerConfig",
                        &[("hostname", ValueKind::Str), ("port", ValueKind::Int)],
                    ),
            )
            .unwrap();
        catalog.register_platform("openwrt", "OpenWrt").unwrap();
        catalog
            .register_router(
                "openwrt",
                RouterDescriptorBuilder::default()
                    .identifier("r1")
                    .name("R1")
                    .manufacturer("Acme")
                    .architecture("ath79")
                    .port(Port::ethernet("lan0", "Lan0"))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        catalog
    }

    fn snapshot() -> Snapshot {
        Snapshot::new()
            .with(
                "core.general",
                RegistryItem::new("GeneralConfig")
                    .with("name", "node-1")
                    .with("platform", "openwrt")
                    .with("router", "r1"),
            )
            .with(
                "core.vpn.server",
                RegistryItem::new("VpnServerConfig")
                    .with("hostname", "a.example.net")
                    .with("port", 8942),
            )
    }

    #[test]
    fn typed_comparisons() {
        let catalog = catalog();
        let view = StagedView::new(catalog.point("node.config").unwrap(), snapshot());
        let ctx = EvalContext {
            view: &view,
            catalog: &catalog,
        };
        let s = Scope::standard();

        assert!(s.value("name").equals("node-1").holds(&ctx).unwrap());
        assert!(s.count("vpn").at_least(1).holds(&ctx).unwrap());
        assert!(!s.count("vpn").greater_than(1).holds(&ctx).unwrap());
        assert!(s.value("core.vpn.server#port").equals(8942).holds(&ctx).unwrap());
        assert!(s.contains("core.vpn.server#hostname", "a.example.net").holds(&ctx).unwrap());
        assert!((!s.changed("vpn")).holds(&ctx).unwrap());

        let mismatch = s.value("core.vpn.server#port").equals("8942");
        assert!(matches!(
            mismatch.holds(&ctx),
            Err(RuleError::InvalidPredicate(_))
        ));
        assert!(matches!(
            s.value("name").less_than("z").holds(&ctx),
            Err(RuleError::InvalidPredicate(_))
        ));
        assert!(matches!(
            s.count("vpn").holds(&ctx),
            Err(RuleError::InvalidPredicate(_))
        ));
        assert!(matches!(
            s.contains("core.vpn.server#port", "x").holds(&ctx),
            Err(RuleError::InvalidPredicate(_))
        ));
        // null compares with anything
        assert!(
            s.value("name")
                .not_equals(literal(registry::Value::Null))
                .holds(&ctx)
                .unwrap()
        );
    }

    #[test]
    fn router_and_combinators() {
        let catalog = catalog();
        let view = StagedView::new(catalog.point("node.config").unwrap(), snapshot());
        let ctx = EvalContext {
            view: &view,
            catalog: &catalog,
        };
        let s = Scope::standard();

        let acme = s.router("manufacturer").equals("Acme");
        let one_port = s.router("ports").equals(1);
        assert!(acme.clone().and(one_port.clone()).holds(&ctx).unwrap());
        assert!((!acme.clone()).or(one_port).holds(&ctx).unwrap());
        assert!(!(!acme).holds(&ctx).unwrap());
        assert!(
            s.router("radio.0")
                .equals(literal(registry::Value::Null))
                .holds(&ctx)
                .unwrap()
        );
        assert!(matches!(
            s.router("colour").equals("red").holds(&ctx),
            Err(RuleError::InvalidPredicate(_))
        ));
        assert_eq!(
            s.value("router").equals("r1").and(s.changed("vpn")).to_string(),
            "(value(core.general#router) == \"r1\" and changed(core.vpn.server))"
        );
    }
}
