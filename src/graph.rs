//! The dependency graph between units of work.
//!
//! Vertices are [`UnitType`]s, an edge `a -> b` means "`a` depends on `b`",
//! so `b` has to run before `a`. Both directions are queryable:
//!
//! * [`DependencyGraph::dependencies`] walks outgoing edges (what a unit needs),
//! * [`DependencyGraph::dependents`] walks incoming edges (who needs a unit).
//!
//! A single petgraph map backs both, which keeps them consistent by
//! construction. Vertices iterate in insertion order.
//!
//! Interception wrappers never become vertices of their own: every unit is
//! normalized to its declaring type on the way in and on every query.

use petgraph::Direction;
use petgraph::graphmap::DiGraphMap;

use crate::adapter::DataAdapterRegistry;
use crate::collect::DataDependencyMap;
use crate::error::{FlowError, FlowResult};
use crate::unit::UnitType;

/// How an edge entered the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Prerequisite passed at registration.
    Explicit,
    /// Prerequisite declared by the unit type.
    Declared,
    /// Producer of a data item the unit requires.
    Data,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Explicit => "explicit",
            EdgeKind::Declared => "declared",
            EdgeKind::Data => "data",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraphMap<UnitType, EdgeKind>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a unit, returns `false` if it was already known.
    pub(crate) fn add_unit(&mut self, unit: UnitType) -> bool {
        let unit = unit.declaring();
        if self.graph.contains_node(unit) {
            return false;
        }
        self.graph.add_node(unit);
        true
    }

    /// Records that `unit` depends on `prerequisite`, registering both. An
    /// edge that already exists keeps the kind it was first added with.
    pub(crate) fn add_dependency(
        &mut self,
        unit: UnitType,
        prerequisite: UnitType,
        kind: EdgeKind,
    ) {
        let (unit, prerequisite) = (unit.declaring(), prerequisite.declaring());
        if self.graph.contains_edge(unit, prerequisite) {
            return;
        }
        self.graph.add_edge(unit, prerequisite, kind);
    }

    pub fn contains(&self, unit: UnitType) -> bool {
        self.graph.contains_node(unit.declaring())
    }

    /// Known units, in the order they were first registered.
    pub fn units(&self) -> impl Iterator<Item = UnitType> + '_ {
        self.graph.nodes()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Units which have to run before `unit`.
    pub fn dependencies(&self, unit: UnitType) -> impl Iterator<Item = UnitType> + '_ {
        self.graph
            .neighbors_directed(unit.declaring(), Direction::Outgoing)
    }

    /// Units which have to wait for `unit`.
    pub fn dependents(&self, unit: UnitType) -> impl Iterator<Item = UnitType> + '_ {
        self.graph
            .neighbors_directed(unit.declaring(), Direction::Incoming)
    }

    pub fn edge_kind(&self, unit: UnitType, prerequisite: UnitType) -> Option<EdgeKind> {
        self.graph
            .edge_weight(unit.declaring(), prerequisite.declaring())
            .copied()
    }

    /// Every edge as `(unit, prerequisite, kind)`.
    pub fn edges(&self) -> impl Iterator<Item = (UnitType, UnitType, EdgeKind)> + '_ {
        self.graph
            .all_edges()
            .map(|(unit, prerequisite, kind)| (unit, prerequisite, *kind))
    }
}

/// Turns every data requirement into an edge from the consuming unit to the
/// unit producing the data, failing on the first requirement without one.
pub(crate) fn assemble(
    graph: &mut DependencyGraph,
    requirements: &DataDependencyMap,
    adapters: &DataAdapterRegistry,
) -> FlowResult<()> {
    let consumers: Vec<UnitType> = graph.units().collect();

    for consumer in consumers {
        for key in requirements.requirements(consumer) {
            let Some(producer) = adapters.producer(key) else {
                return Err(FlowError::UnresolvedDataDependency {
                    consumer,
                    key: key.clone(),
                });
            };

            tracing::trace!(%consumer, %producer, %key, "resolved data dependency");
            graph.add_dependency(consumer, producer, EdgeKind::Data);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::EmittedKeyResolver;
    use crate::unit::{Bizlogic, DataKey, Declarations};

    struct Basket;

    struct A;
    struct B;
    struct C;

    impl Bizlogic for A {}
    impl Bizlogic for B {}
    impl Bizlogic for C {}

    struct BasketAdapter;

    impl Bizlogic for BasketAdapter {
        fn declare(decl: &mut Declarations) {
            decl.emits::<Basket>();
        }
    }

    struct BasketConsumer;

    impl Bizlogic for BasketConsumer {
        fn declare(decl: &mut Declarations) {
            decl.inject::<Basket>();
        }
    }

    fn unit<T: Bizlogic>() -> UnitType {
        UnitType::of::<T>()
    }

    #[test]
    fn test_both_directions_agree() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency(unit::<A>(), unit::<B>(), EdgeKind::Explicit);
        graph.add_dependency(unit::<A>(), unit::<C>(), EdgeKind::Explicit);
        graph.add_dependency(unit::<B>(), unit::<C>(), EdgeKind::Declared);

        for (from, to, _) in graph.edges() {
            assert!(graph.dependents(to).any(|u| u == from));
            assert!(graph.dependencies(from).any(|u| u == to));
        }

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.dependencies(unit::<A>()).count(), 2);
        assert_eq!(graph.dependents(unit::<C>()).count(), 2);
        assert_eq!(graph.dependents(unit::<A>()).count(), 0);
    }

    #[test]
    fn test_duplicates_are_noops() {
        let mut graph = DependencyGraph::new();
        assert!(graph.add_unit(unit::<A>()));
        assert!(!graph.add_unit(unit::<A>()));

        graph.add_dependency(unit::<A>(), unit::<B>(), EdgeKind::Explicit);
        graph.add_dependency(unit::<A>(), unit::<B>(), EdgeKind::Declared);

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(
            graph.edge_kind(unit::<A>(), unit::<B>()),
            Some(EdgeKind::Explicit)
        );
    }

    struct BasketAdapterProxy;

    impl Bizlogic for BasketAdapterProxy {
        fn declare(decl: &mut Declarations) {
            decl.intercepts::<BasketAdapter>();
        }
    }

    #[test]
    fn test_wrapper_shares_vertex_with_declaring_type() {
        let mut graph = DependencyGraph::new();
        assert!(graph.add_unit(unit::<BasketAdapter>()));
        assert!(!graph.add_unit(unit::<BasketAdapterProxy>()));

        graph.add_dependency(unit::<A>(), unit::<BasketAdapterProxy>(), EdgeKind::Explicit);

        assert_eq!(graph.len(), 2);
        assert!(graph.contains(unit::<BasketAdapterProxy>()));
        assert_eq!(
            graph.dependencies(unit::<A>()).collect::<Vec<_>>(),
            vec![unit::<BasketAdapter>()]
        );
        assert_eq!(graph.dependents(unit::<BasketAdapterProxy>()).count(), 1);
        assert_eq!(
            graph.edge_kind(unit::<A>(), unit::<BasketAdapter>()),
            Some(EdgeKind::Explicit)
        );
    }

    #[test]
    fn test_units_keep_insertion_order() {
        let mut graph = DependencyGraph::new();
        graph.add_unit(unit::<C>());
        graph.add_unit(unit::<A>());
        graph.add_unit(unit::<B>());

        let order: Vec<_> = graph.units().collect();
        assert_eq!(order, vec![unit::<C>(), unit::<A>(), unit::<B>()]);
    }

    #[test]
    fn test_assemble_adds_data_edge() {
        let mut graph = DependencyGraph::new();
        graph.add_unit(unit::<BasketConsumer>());
        graph.add_unit(unit::<BasketAdapter>());

        let requirements = DataDependencyMap::scan(&graph);
        let mut adapters = DataAdapterRegistry::new();
        adapters
            .populate(graph.units(), &EmittedKeyResolver::new())
            .unwrap();

        assemble(&mut graph, &requirements, &adapters).unwrap();

        assert_eq!(
            graph.edge_kind(unit::<BasketConsumer>(), unit::<BasketAdapter>()),
            Some(EdgeKind::Data)
        );
    }

    #[test]
    fn test_assemble_reports_missing_producer() {
        let mut graph = DependencyGraph::new();
        graph.add_unit(unit::<BasketConsumer>());

        let requirements = DataDependencyMap::scan(&graph);
        let adapters = DataAdapterRegistry::new();

        let err = assemble(&mut graph, &requirements, &adapters).unwrap_err();
        match err {
            FlowError::UnresolvedDataDependency { consumer, key } => {
                assert_eq!(consumer, unit::<BasketConsumer>());
                assert_eq!(key, DataKey::of::<Basket>());
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
