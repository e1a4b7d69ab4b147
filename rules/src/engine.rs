// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Rule evaluation

use cgm::Catalog;
use ordermap::OrderMap;
use registry::{Mutation, RegistrationPoint, StagedView};
use tracing::{debug, info};

use crate::book::RuleBook;
use crate::errors::RuleResult;
use crate::rule::Rule;
use crate::scope::Scope;

/// The outcome of one evaluation
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultSet {
    /// the mutations made by the actions, in order
    pub mutations: Vec<Mutation>,
    /// the value of every evaluated condition, by rule position (`rule0`, `rule0.rule1`, ...)
    pub marks: OrderMap<String, bool>,
}
impl ResultSet {
    #[must_use]
    pub fn mark(&self, rule: &str) -> Option<bool> {
        self.marks.get(rule).copied()
    }
}

#[derive(Debug, Default)]
pub struct Engine {
    rules: Vec<Rule>,
}

impl Engine {
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
    /// An engine for the rules of a profile, checked against the schemas of `point`
    pub fn from_book(
        book: &RuleBook,
        profile: &str,
        scope: &Scope,
        point: &RegistrationPoint,
    ) -> RuleResult<Self> {
        let engine = Self::new(book.rules(profile, scope)?);
        engine.check(point)?;
        debug!("Rules of profile '{profile}' checked");
        Ok(engine)
    }
    /// Type-check every rule, nested ones included. A rule set that fails this is
    /// broken whatever the node's configuration.
    pub fn check(&self, point: &RegistrationPoint) -> RuleResult<()> {
        self.rules.iter().try_for_each(|rule| rule.check(point))
    }
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Evaluate the rules in order against a staged view. Each condition sees the
    /// mutations made by the rules evaluated before it. Any error aborts the evaluation;
    /// the view should then be dropped.
    pub fn evaluate(&self, view: &mut StagedView<'_>, catalog: &Catalog) -> RuleResult<ResultSet> {
        let start = view.mutations().len();
        let mut marks = OrderMap::new();
        for (n, rule) in self.rules.iter().enumerate() {
            rule.evaluate(&format!("rule{n}"), view, catalog, &mut marks)?;
        }
        let mutations = view.mutations()[start..].to_vec();
        debug!(
            "Rules held: {:?}",
            marks
                .iter()
                .filter(|(_, held)| **held)
                .map(|(mark, _)| mark)
                .collect::<Vec<_>>()
        );
        info!(
            "Evaluated {} rule(s): {} mutation(s)",
            self.rules.len(),
            mutations.len()
        );
        Ok(ResultSet { mutations, marks })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::Engine;
    use crate::book::RuleBook;
    use crate::errors::RuleError;
    use crate::expr::literal;
    use crate::rule::{Step, rule};
    use crate::scope::Scope;
    use cgm::Catalog;
    use pretty_assertions::assert_eq;
    use registry::{
        ItemSchema, Location, RegistryError, RegistryItem, RegistryMeta, Snapshot, StagedView,
        Value, ValueKind,
    };
    use tracing_test::traced_test;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        let schemas = [
            ItemSchema::new("core.general", RegistryMeta::new("General", 0)).variant(
                "GeneralConfig",
                &[
                    ("name", ValueKind::Str),
                    ("platform", ValueKind::Str),
                    ("router", ValueKind::Str),
                ],
            ),
            ItemSchema::new("core.project", RegistryMeta::new("Project", 1))
                .variant("ProjectConfig", &[("project", ValueKind::Str)]),
            ItemSchema::new("core.interfaces", RegistryMeta::new("Interfaces", 10).multiple())
                .variant("EthernetInterfaceConfig", &[("eth_port", ValueKind::Str)])
                .variant(
                    "WifiRadioDeviceConfig",
                    &[("wifi_radio", ValueKind::Str), ("channel", ValueKind::Int)],
                ),
            ItemSchema::new("core.vpn.server", RegistryMeta::new("VPN servers", 30).multiple())
                .variant(
                    "VpnServerConfig",
                    &[
                        ("protocol", ValueKind::Str),
                        ("hostname", ValueKind::Str),
                        ("port", ValueKind::Int),
                    ],
                ),
        ];
        for schema in schemas {
            catalog.register_item("node.config", schema).unwrap();
        }
        for (value, label) in [("openvpn", "OpenVPN"), ("tunneldigger", "Tunneldigger")] {
            catalog.register_choice("node.config", "core.vpn.server#protocol", value, label);
        }
        catalog
    }

    fn snapshot(project: &str) -> Snapshot {
        Snapshot::new()
            .with(
                "core.general",
                RegistryItem::new("GeneralConfig").with("name", "node-1"),
            )
            .with(
                "core.project",
                RegistryItem::new("ProjectConfig").with("project", project),
            )
            .with(
                "core.vpn.server",
                RegistryItem::new("VpnServerConfig")
                    .with("protocol", "tunneldigger")
                    .with("hostname", "old.example.net")
                    .with("port", 53),
            )
            .with(
                "core.interfaces",
                RegistryItem::new("EthernetInterfaceConfig").with("eth_port", "lan0"),
            )
    }

    fn ljubljana(s: &Scope) -> Engine {
        Engine::new(vec![rule(
            s.value("project").equals("Ljubljana"),
            [
                s.clear_config("vpn"),
                s.append(
                    "vpn",
                    [
                        ("protocol", literal("openvpn")),
                        ("hostname", literal("46.54.226.43")),
                        ("port", literal(9999)),
                    ],
                ),
                s.append(
                    "vpn",
                    [
                        ("protocol", literal("openvpn")),
                        ("hostname", literal("46.182.42.250")),
                        ("port", literal(9999)),
                    ],
                ),
            ],
        )])
    }

    #[traced_test]
    #[test]
    fn project_vpn_servers() {
        let catalog = catalog();
        let point = catalog.point("node.config").unwrap();
        let engine = ljubljana(&Scope::standard());

        let mut view = StagedView::new(point, snapshot("Ljubljana"));
        let result = engine.evaluate(&mut view, &catalog).unwrap();
        assert_eq!(result.mark("rule0"), Some(true));
        assert_eq!(result.mutations.len(), 3);
        let hosts = view
            .values(&Location::from("core.vpn.server#hostname"))
            .unwrap();
        assert_eq!(
            hosts,
            vec![Value::from("46.54.226.43"), Value::from("46.182.42.250")]
        );
        assert!(logs_contain("Evaluated 1 rule(s): 3 mutation(s)"));

        let mut view = StagedView::new(point, snapshot("Maribor"));
        let result = engine.evaluate(&mut view, &catalog).unwrap();
        assert_eq!(result.mark("rule0"), Some(false));
        assert!(result.mutations.is_empty());
        assert_eq!(view.count("core.vpn.server").unwrap(), 1);
    }

    #[test]
    fn deterministic() {
        let catalog = catalog();
        let point = catalog.point("node.config").unwrap();
        let engine = ljubljana(&Scope::standard());
        let stored = snapshot("Ljubljana");

        let mut first = StagedView::new(point, stored.clone());
        let mut second = StagedView::new(point, stored);
        let first = engine.evaluate(&mut first, &catalog).unwrap();
        let second = engine.evaluate(&mut second, &catalog).unwrap();
        assert_eq!(first, second);
        let render = |r: &super::ResultSet| {
            r.mutations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n")
        };
        assert_eq!(render(&first), render(&second));
    }

    #[test]
    fn clear_then_count() {
        let catalog = catalog();
        let point = catalog.point("node.config").unwrap();
        let s = Scope::standard();
        let engine = Engine::new(vec![
            rule(s.count("vpn").equals(1), [s.clear_config("vpn")]),
            rule(s.count("vpn").equals(0), [s.clear_config("radios")]),
        ]);
        let mut view = StagedView::new(point, snapshot("x"));
        let result = engine.evaluate(&mut view, &catalog).unwrap();
        // the second rule sees the first one's mutation
        assert_eq!(result.mark("rule1"), Some(true));
        assert_eq!(view.count("core.vpn.server").unwrap(), 0);
        // clearing the radios leaves the other interfaces
        assert_eq!(view.count("core.interfaces").unwrap(), 1);
    }

    #[test]
    fn append_then_assign() {
        let catalog = catalog();
        let point = catalog.point("node.config").unwrap();
        let s = Scope::standard();
        let append = |host: &'static str| {
            s.append(
                "vpn",
                [("hostname", literal(host)), ("port", literal(1))],
            )
        };
        let always = || s.count("vpn").at_least(0);

        let engine = Engine::new(vec![rule(
            always(),
            [
                s.clear_config("vpn"),
                append("a"),
                append("b"),
                append("c"),
                s.assign("vpn", 2, [("port", literal(443))]),
            ],
        )]);
        let mut view = StagedView::new(point, snapshot("x"));
        engine.evaluate(&mut view, &catalog).unwrap();
        let ports = view.values(&Location::from("core.vpn.server#port")).unwrap();
        assert_eq!(ports, vec![Value::Int(1), Value::Int(1), Value::Int(443)]);

        let engine = Engine::new(vec![rule(
            always(),
            [
                s.clear_config("vpn"),
                append("a"),
                append("b"),
                append("c"),
                s.assign("vpn", 3, [("port", literal(443))]),
            ],
        )]);
        let mut view = StagedView::new(point, snapshot("x"));
        assert_eq!(
            engine.evaluate(&mut view, &catalog).unwrap_err(),
            RuleError::IndexOutOfRange {
                path: "core.vpn.server".to_owned(),
                index: 3,
                len: 3
            }
        );
    }

    #[test]
    fn nested_rules() {
        let catalog = catalog();
        let point = catalog.point("node.config").unwrap();
        let s = Scope::standard();
        let engine = Engine::new(vec![
            rule(
                s.value("name").equals("node-1"),
                [
                    rule(s.changed("vpn"), [s.clear_config("vpn")]).into(),
                    s.remove("vpn", [("port", Value::Int(53))]),
                    rule(s.changed("vpn"), [s.append("radios", [("channel", literal(6))])]).into(),
                ],
            ),
            rule(!s.value("name").equals("node-1"), [s.clear_config("vpn")]),
        ]);
        let mut view = StagedView::new(point, snapshot("x"));
        let result = engine.evaluate(&mut view, &catalog).unwrap();
        let marks: Vec<(&str, bool)> = result.marks.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(
            marks,
            vec![
                ("rule0", true),
                ("rule0.rule0", false),
                ("rule0.rule1", true),
                ("rule1", false)
            ]
        );
        assert_eq!(
            view.items("core.interfaces").unwrap()[1],
            RegistryItem::new("WifiRadioDeviceConfig").with("channel", 6)
        );
    }

    #[allow(clippy::needless_pass_by_value)]
    fn unreachable_typo(s: Scope) -> Vec<crate::rule::Rule> {
        vec![rule(
            s.value("name").equals("no-such-node"),
            [Step::Rule(rule(
                s.value("core.vpn.server#port").equals("8942"),
                [s.clear_config("vpn")],
            ))],
        )]
    }

    #[test]
    fn rules_are_checked_up_front() {
        let catalog = catalog();
        let point = catalog.point("node.config").unwrap();
        let s = Scope::standard();

        // the outer condition does not hold: evaluation never sees the nested predicate
        let engine = Engine::new(unreachable_typo(s.clone()));
        let mut view = StagedView::new(point, snapshot("x"));
        assert_eq!(engine.evaluate(&mut view, &catalog).unwrap().mark("rule0"), Some(false));
        assert!(matches!(
            engine.check(point),
            Err(RuleError::InvalidPredicate(_))
        ));

        let mut book = RuleBook::new();
        book.register("default", unreachable_typo);
        assert!(matches!(
            Engine::from_book(&book, "default", &s, point),
            Err(RuleError::InvalidPredicate(_))
        ));

        // actions on unregistered locations are caught too
        let engine = Engine::new(vec![rule(
            s.value("name").equals("no-such-node"),
            [s.clear_config("core.nowhere")],
        )]);
        assert!(matches!(
            engine.check(point),
            Err(RuleError::Registry(RegistryError::UnknownLocation(_)))
        ));
        assert!(ljubljana(&s).check(point).is_ok());
    }

    #[test]
    fn invalid_rules_abort() {
        let catalog = catalog();
        let point = catalog.point("node.config").unwrap();
        let s = Scope::standard();

        let engine = Engine::new(vec![
            rule(s.count("vpn").at_least(0), [s.clear_config("vpn")]),
            rule(s.value("project").equals(42), [s.clear_config("vpn")]),
        ]);
        let mut view = StagedView::new(point, snapshot("x"));
        assert!(matches!(
            engine.evaluate(&mut view, &catalog),
            Err(RuleError::InvalidPredicate(_))
        ));

        let engine = Engine::new(vec![rule(
            s.count("vpn").at_least(0),
            [s.append("vpn", [("protocol", literal("pptp"))])],
        )]);
        let mut view = StagedView::new(point, snapshot("x"));
        assert!(matches!(
            engine.evaluate(&mut view, &catalog),
            Err(RuleError::Registry(RegistryError::UnknownChoice { .. }))
        ));

        let engine = Engine::new(vec![rule(
            s.count("vpn").at_least(0),
            [s.clear_config("project")],
        )]);
        let mut view = StagedView::new(point, snapshot("x"));
        assert!(matches!(
            engine.evaluate(&mut view, &catalog),
            Err(RuleError::Registry(RegistryError::NotMultiple(_)))
        ));
    }
}
