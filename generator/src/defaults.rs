// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Built-in rule sets

use rules::{Rule, RuleBook, Scope, literal, rule};

use crate::config::DEFAULT_PROFILE;

/// When the router changes on a node without radios, configure the router's first radio
/// with its first protocol.
#[allow(clippy::needless_pass_by_value)]
fn radio_defaults(s: Scope) -> Vec<Rule> {
    vec![rule(
        s.changed("router")
            .and(s.count("radios").equals(0))
            .and(s.router("radios").at_least(1)),
        [s.append(
            "radios",
            [
                ("wifi_radio", s.router("radio.0")),
                ("protocol", s.router("radio.0.protocol")),
                ("enabled", literal(true)),
            ],
        )],
    )]
}

/// The rule book with the built-in profiles
#[must_use]
pub fn rule_book() -> RuleBook {
    let mut book = RuleBook::new();
    book.register(DEFAULT_PROFILE, radio_defaults);
    book
}
