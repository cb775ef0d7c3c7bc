use crate::adapter::DataAdapterRegistry;
use crate::collect::{DataDependencyMap, expand_declared};
use crate::emit::EmittedKeyResolver;
use crate::error::FlowResult;
use crate::flow::Flow;
use crate::graph::{DependencyGraph, EdgeKind, assemble};
use crate::unit::{Bizlogic, UnitType};

/// Collects units of work and the dependencies between them, then turns them
/// into a [`Flow`].
///
/// Dependencies come from three places:
/// 1. prerequisites passed when registering a unit,
/// 2. the prerequisite a unit type declares with
///    [`Declarations::depends_on`](crate::Declarations::depends_on),
/// 3. data a unit requires, which makes it depend on the unit emitting it.
///
/// Registration only accumulates units and explicit edges. Everything else
/// is resolved by [`FlowBuilder::build`].
///
/// # Example
///
/// ```rust
/// use bizflow::{Bizlogic, Declarations, FlowBuilder, UnitType};
///
/// struct Cart;
///
/// struct LoadCart;
///
/// impl Bizlogic for LoadCart {
///     fn declare(decl: &mut Declarations) {
///         decl.emits::<Cart>();
///     }
/// }
///
/// struct Checkout;
///
/// impl Bizlogic for Checkout {
///     fn declare(decl: &mut Declarations) {
///         decl.inject::<Cart>();
///     }
/// }
///
/// let mut builder = FlowBuilder::new();
/// builder.add::<Checkout>().add::<LoadCart>();
///
/// let flow = builder.build().unwrap();
/// assert_eq!(
///     flow.units(),
///     &[UnitType::of::<LoadCart>(), UnitType::of::<Checkout>()]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct FlowBuilder {
    graph: DependencyGraph,
    data_dependencies: DataDependencyMap,
    data_adapters: DataAdapterRegistry,
    resolver: EmittedKeyResolver,
}

impl FlowBuilder {
    /// Creates a builder backed by the process-wide emitted name cache.
    pub fn new() -> Self {
        Self::with_resolver(EmittedKeyResolver::shared())
    }

    pub fn with_resolver(resolver: EmittedKeyResolver) -> Self {
        Self {
            graph: DependencyGraph::new(),
            data_dependencies: DataDependencyMap::default(),
            data_adapters: DataAdapterRegistry::new(),
            resolver,
        }
    }

    /// Registers a unit. Registering a known unit again changes nothing.
    pub fn register(&mut self, unit: UnitType) -> &mut Self {
        self.graph.add_unit(unit);
        self
    }

    /// Registers a unit which has to run after all of `prerequisites`. The
    /// prerequisites are registered as well.
    pub fn register_after(
        &mut self,
        unit: UnitType,
        prerequisites: impl IntoIterator<Item = UnitType>,
    ) -> &mut Self {
        self.graph.add_unit(unit);
        for prerequisite in prerequisites {
            self.graph
                .add_dependency(unit, prerequisite, EdgeKind::Explicit);
        }
        self
    }

    pub fn add<T: Bizlogic>(&mut self) -> &mut Self {
        self.register(UnitType::of::<T>())
    }

    pub fn add_after<T: Bizlogic>(
        &mut self,
        prerequisites: impl IntoIterator<Item = UnitType>,
    ) -> &mut Self {
        self.register_after(UnitType::of::<T>(), prerequisites)
    }

    /// Resolves every dependency and orders the units.
    ///
    /// This will:
    /// 1. Follow declared prerequisites until no new unit is discovered.
    /// 2. Read the data requirements of every unit.
    /// 3. Register data-producing units, rejecting two producers of one item.
    /// 4. Link each requirement to its producer.
    /// 5. Order the graph stage by stage.
    pub fn build(&mut self) -> FlowResult<Flow> {
        let result = self.try_build();

        if let Err(err) = &result {
            tracing::warn!(error = %err, "could not build flow");
        }

        result
    }

    fn try_build(&mut self) -> FlowResult<Flow> {
        let discovered = expand_declared(&mut self.graph);
        tracing::debug!(
            units = self.graph.len(),
            discovered,
            "expanded declared dependencies"
        );

        self.data_dependencies = DataDependencyMap::scan(&self.graph);
        self.data_adapters
            .populate(self.graph.units(), &self.resolver)?;
        tracing::debug!(
            consumers = self.data_dependencies.len(),
            adapters = self.data_adapters.len(),
            "collected data dependencies"
        );

        assemble(&mut self.graph, &self.data_dependencies, &self.data_adapters)?;

        let stages = crate::solver::solve(&self.graph)?;
        let flow = Flow::new(stages, self.graph.clone());

        tracing::info!(
            units = flow.len(),
            stages = flow.stages().len(),
            "flow built"
        );

        Ok(flow)
    }

    /// Known units, in registration order.
    pub fn units(&self) -> impl Iterator<Item = UnitType> + '_ {
        self.graph.units()
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn contains(&self, unit: UnitType) -> bool {
        self.graph.contains(unit)
    }

    pub fn dependency_graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Data requirements found by the last build.
    pub fn data_dependencies(&self) -> &DataDependencyMap {
        &self.data_dependencies
    }

    /// Data producers registered by the last build.
    pub fn data_adapters(&self) -> &DataAdapterRegistry {
        &self.data_adapters
    }

    pub fn resolver(&self) -> &EmittedKeyResolver {
        &self.resolver
    }
}

impl Default for FlowBuilder {
    fn default() -> Self {
        Self::new()
    }
}
