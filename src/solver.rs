//! Staged topological ordering of the dependency graph.
//!
//! This is Kahn's algorithm run in rounds. Every unit starts with a count of
//! its unmet dependencies. Each round collects all units whose count dropped
//! to zero into one stage, appends the stage to the order, and decrements the
//! counts of the units depending on them.
//!
//! A round that collects nothing while units remain means the graph cannot be
//! ordered, and which round stalled decides the error:
//! * the first round: no unit is free of prerequisites, so there is no start,
//! * a later round: progress was made, the remaining units form a cycle.

use std::collections::HashMap;

use crate::error::{FlowError, FlowResult};
use crate::graph::DependencyGraph;
use crate::unit::UnitType;

/// Orders `graph` into stages. Within a stage units keep registration order.
pub(crate) fn solve(graph: &DependencyGraph) -> FlowResult<Vec<Vec<UnitType>>> {
    let mut remaining: HashMap<UnitType, usize> = graph
        .units()
        .map(|unit| (unit, graph.dependencies(unit).count()))
        .collect();

    let mut pending: Vec<UnitType> = graph.units().collect();
    let mut stages: Vec<Vec<UnitType>> = Vec::new();

    while !pending.is_empty() {
        let (stage, rest): (Vec<_>, Vec<_>) = pending
            .into_iter()
            .partition(|unit| remaining.get(unit).copied() == Some(0));

        if stage.is_empty() {
            return Err(if stages.is_empty() {
                FlowError::StartNotFound
            } else {
                FlowError::CycleDetected { unresolved: rest }
            });
        }

        for unit in &stage {
            for dependent in graph.dependents(*unit) {
                if let Some(count) = remaining.get_mut(&dependent) {
                    *count = count.saturating_sub(1);
                }
            }
        }

        tracing::debug!(
            stage = stages.len(),
            units = ?stage.iter().map(UnitType::name).collect::<Vec<_>>(),
            "resolved stage"
        );

        stages.push(stage);
        pending = rest;
    }

    Ok(stages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeKind;
    use crate::unit::Bizlogic;

    struct A;
    struct B;
    struct C;
    struct D;

    impl Bizlogic for A {}
    impl Bizlogic for B {}
    impl Bizlogic for C {}
    impl Bizlogic for D {}

    fn unit<T: Bizlogic>() -> UnitType {
        UnitType::of::<T>()
    }

    fn depends(graph: &mut DependencyGraph, from: UnitType, to: UnitType) {
        graph.add_dependency(from, to, EdgeKind::Explicit);
    }

    #[test]
    fn test_empty_graph() {
        assert!(solve(&DependencyGraph::new()).unwrap().is_empty());
    }

    #[test]
    fn test_chain() {
        let mut graph = DependencyGraph::new();
        depends(&mut graph, unit::<A>(), unit::<B>());
        depends(&mut graph, unit::<B>(), unit::<C>());

        let stages = solve(&graph).unwrap();
        assert_eq!(
            stages,
            vec![vec![unit::<C>()], vec![unit::<B>()], vec![unit::<A>()]]
        );
    }

    #[test]
    fn test_stage_keeps_registration_order() {
        let mut graph = DependencyGraph::new();
        graph.add_unit(unit::<D>());
        depends(&mut graph, unit::<A>(), unit::<B>());
        depends(&mut graph, unit::<A>(), unit::<C>());

        let stages = solve(&graph).unwrap();
        assert_eq!(
            stages,
            vec![vec![unit::<D>(), unit::<B>(), unit::<C>()], vec![unit::<A>()]]
        );
    }

    #[test]
    fn test_no_start() {
        let mut graph = DependencyGraph::new();
        depends(&mut graph, unit::<A>(), unit::<B>());
        depends(&mut graph, unit::<B>(), unit::<A>());

        assert!(matches!(solve(&graph), Err(FlowError::StartNotFound)));
    }

    #[test]
    fn test_self_loop_has_no_start() {
        let mut graph = DependencyGraph::new();
        depends(&mut graph, unit::<A>(), unit::<A>());

        assert!(matches!(solve(&graph), Err(FlowError::StartNotFound)));
    }

    #[test]
    fn test_cycle_after_progress() {
        let mut graph = DependencyGraph::new();
        graph.add_unit(unit::<C>());
        depends(&mut graph, unit::<A>(), unit::<B>());
        depends(&mut graph, unit::<B>(), unit::<A>());

        match solve(&graph) {
            Err(FlowError::CycleDetected { unresolved }) => {
                assert_eq!(unresolved, vec![unit::<A>(), unit::<B>()]);
            }
            other => panic!("expected a cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_cycle_downstream_of_start() {
        // C is free, B waits on C and A, A waits on B
        let mut graph = DependencyGraph::new();
        depends(&mut graph, unit::<B>(), unit::<C>());
        depends(&mut graph, unit::<B>(), unit::<A>());
        depends(&mut graph, unit::<A>(), unit::<B>());

        assert!(matches!(
            solve(&graph),
            Err(FlowError::CycleDetected { .. })
        ));
    }
}
