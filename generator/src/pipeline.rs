// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration generation pipeline: rules first, then the configuration generating
//! modules, on one staged view of the node's configuration.

use cgm::catalog::CONFIG_POINT;
use cgm::{Catalog, Dispatcher, OutputConfigTree};
use registry::{Mutation, Node, RegistryStore, StagedView};
use rules::{Engine, ResultSet, RuleBook, Scope};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::GeneratorConfig;
use crate::errors::PipelineResult;

/// What a successful run produced
#[derive(Debug)]
pub struct Generated {
    pub tree: OutputConfigTree,
    /// what the rules did
    pub rules: ResultSet,
    /// the mutations committed to the store, if any
    pub committed: Vec<Mutation>,
}

/// Runs are independent of each other: a pipeline can be shared by threads generating
/// the configuration of different nodes.
pub struct Pipeline {
    catalog: Arc<Catalog>,
    book: Arc<RuleBook>,
    store: Arc<dyn RegistryStore>,
    config: GeneratorConfig,
}

impl Pipeline {
    #[must_use]
    pub fn new(
        catalog: Arc<Catalog>,
        book: Arc<RuleBook>,
        store: Arc<dyn RegistryStore>,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            catalog,
            book,
            store,
            config,
        }
    }
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn evaluate(
        &self,
        node: &Node,
        view: &mut StagedView<'_>,
        edits: Vec<Mutation>,
    ) -> PipelineResult<ResultSet> {
        for edit in edits {
            debug!("Staging edit of node {node}: {edit}");
            view.stage(edit)?;
        }
        let engine = Engine::from_book(
            &self.book,
            &self.config.profile,
            &Scope::standard(),
            view.point(),
        )?;
        Ok(engine.evaluate(view, &self.catalog)?)
    }

    /// Generate the configuration of a node.
    ///
    /// The pending `edits` are staged on top of the stored configuration, the rules of the
    /// configured profile adjust it, and the platform modules generate the output tree from
    /// the adjusted view. The staged mutations are committed only when a build succeeds
    /// (and committing is enabled); on any failure, and when only validating, they are
    /// dropped with the view.
    pub fn run(
        &self,
        node: &Node,
        edits: Vec<Mutation>,
        only_validate: bool,
    ) -> PipelineResult<Generated> {
        let mode = if only_validate { "validation" } else { "build" };
        info!("Starting {mode} of node {node}");
        let result = self.generate(node, edits, only_validate);
        match &result {
            Ok(generated) => info!(
                "Finished {mode} of node {node}: {} package(s), {} mutation(s) committed",
                generated.tree.packages().len(),
                generated.committed.len()
            ),
            Err(e) if e.is_validation() => {
                warn!("Node {node} failed validation: {e}");
            }
            Err(e) => error!("Aborted {mode} of node {node}, staged changes dropped: {e}"),
        }
        result
    }

    fn generate(
        &self,
        node: &Node,
        edits: Vec<Mutation>,
        only_validate: bool,
    ) -> PipelineResult<Generated> {
        let point = self.catalog.point(CONFIG_POINT)?;
        let snapshot = self.store.load(node.id, CONFIG_POINT)?;
        let mut view = StagedView::load(point, snapshot)?;

        let rules = self.evaluate(node, &mut view, edits)?;
        let tree = Dispatcher::new(&self.catalog, only_validate).generate(node, &view)?;

        let mut committed = vec![];
        if !only_validate && self.config.commit {
            committed = view.into_mutations();
            self.store.commit(node.id, CONFIG_POINT, &committed)?;
        }
        Ok(Generated {
            tree,
            rules,
            committed,
        })
    }

    /// Check a node's configuration with its pending edits, reporting every validation
    /// failure at once. Nothing is committed.
    pub fn validate(&self, node: &Node, edits: Vec<Mutation>) -> PipelineResult<()> {
        self.run(node, edits, true).map(|_| ())
    }

    /// Build the configuration of a node, stopping at the first failure
    pub fn build(&self, node: &Node, edits: Vec<Mutation>) -> PipelineResult<Generated> {
        self.run(node, edits, false)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("catalog", &self.catalog)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
